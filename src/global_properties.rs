//! Global properties are read-only values shared by every module of a model,
//! typically its parameters.
//!
//! A property is declared with `define_global_property!`, which creates a
//! zero-sized key type and binds it to a value type. Values can be set from
//! code or loaded from a JSON file, and are validated before they are stored:
//!
//! ```ignore
//! define_global_property!(Params, Parameters, Parameters::validate);
//!
//! context.load_global_property_from_file(Params, Path::new("config.json"))?;
//! let params = context.get_global_property_value(Params).unwrap();
//! ```
use std::any::{Any, TypeId};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::trace;
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;

use crate::context::Context;
use crate::define_data_plugin;
use crate::error::EpiError;

/// Defines a global property with the following parameters:
/// * `$global_property`: Name for the identifier type of the global property
/// * `$value`: The type of the property's value
/// * `$validate`: A function (or closure) that checks the validity of the property (optional)
#[macro_export]
macro_rules! define_global_property {
    ($global_property:ident, $value:ty, $validate: expr) => {
        #[derive(Copy, Clone)]
        pub struct $global_property;

        impl $crate::global_properties::GlobalProperty for $global_property {
            type Value = $value;

            fn name() -> &'static str {
                stringify!($global_property)
            }

            fn validate(val: &$value) -> Result<(), $crate::error::EpiError> {
                $validate(val)
            }
        }
    };

    ($global_property: ident, $value: ty) => {
        $crate::define_global_property!($global_property, $value, |_| { Ok(()) });
    };
}
pub use define_global_property;

pub trait GlobalProperty: Any {
    type Value: Any;

    fn name() -> &'static str;

    /// Checks a candidate value before it is stored.
    ///
    /// # Errors
    ///
    /// Returns `EpiError::ConfigError` describing why the value is rejected.
    fn validate(value: &Self::Value) -> Result<(), EpiError>;
}

struct GlobalPropertiesDataContainer {
    global_property_container: FxHashMap<TypeId, Box<dyn Any>>,
}

define_data_plugin!(
    GlobalPropertiesPlugin,
    GlobalPropertiesDataContainer,
    GlobalPropertiesDataContainer {
        global_property_container: FxHashMap::default(),
    }
);

pub trait ContextGlobalPropertiesExt {
    /// Validates and stores `value`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns the validation error if `value` is rejected; the previous
    /// value (if any) is kept.
    fn set_global_property_value<T: GlobalProperty>(
        &mut self,
        property: T,
        value: T::Value,
    ) -> Result<(), EpiError>;

    /// Returns the stored value, or `None` if it has never been set.
    fn get_global_property_value<T: GlobalProperty>(&self, property: T) -> Option<&T::Value>;

    /// Reads `path` as JSON, validates it and stores it.
    ///
    /// # Errors
    ///
    /// Returns an `EpiError` if the file can't be opened, does not decode
    /// into `T::Value`, or fails validation.
    fn load_global_property_from_file<T>(&mut self, property: T, path: &Path) -> Result<(), EpiError>
    where
        T: GlobalProperty,
        T::Value: DeserializeOwned;
}

impl ContextGlobalPropertiesExt for Context {
    fn set_global_property_value<T: GlobalProperty>(
        &mut self,
        _property: T,
        value: T::Value,
    ) -> Result<(), EpiError> {
        T::validate(&value)?;
        trace!("setting global property {}", T::name());
        self.get_data_container_mut(GlobalPropertiesPlugin)
            .global_property_container
            .insert(TypeId::of::<T>(), Box::new(value));
        Ok(())
    }

    fn get_global_property_value<T: GlobalProperty>(&self, _property: T) -> Option<&T::Value> {
        self.get_data_container(GlobalPropertiesPlugin)?
            .global_property_container
            .get(&TypeId::of::<T>())?
            .downcast_ref::<T::Value>()
    }

    fn load_global_property_from_file<T>(&mut self, property: T, path: &Path) -> Result<(), EpiError>
    where
        T: GlobalProperty,
        T::Value: DeserializeOwned,
    {
        trace!("loading global property {} from {}", T::name(), path.display());
        let reader = BufReader::new(File::open(path)?);
        let value: T::Value = serde_json::from_reader(reader)?;
        self.set_global_property_value(property, value)
    }
}
