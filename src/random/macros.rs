/// Declares a named random number generator: a zero-sized key passed to
/// `Context::sample`. Each name gets its own stream, a `SmallRng` unless a
/// generator type is given:
///
/// ```ignore
/// define_rng!(EpidemicRng);
/// define_rng!(AuditRng, rand::rngs::StdRng);
/// ```
///
/// Names must be unique across the whole program; a second `define_rng!`
/// with the same name fails to link.
#[macro_export]
macro_rules! define_rng {
    ($name:ident) => {
        $crate::define_rng!($name, $crate::rand::rngs::SmallRng);
    };
    ($name:ident, $generator:ty) => {
        #[derive(Copy, Clone)]
        struct $name;

        impl $crate::random::RngId for $name {
            type RngType = $generator;

            fn get_name() -> &'static str {
                stringify!($name)
            }
        }

        $crate::paste::paste! {
            #[doc(hidden)]
            #[no_mangle]
            #[allow(non_upper_case_globals)]
            pub static [<stream_name_guard_ $name>]: () = ();
        }
    };
}
pub use define_rng;
