//! CSV reports.
//!
//! A report is a `Serialize` struct registered with `define_report!`. Each
//! report type is bound to one CSV file by `add_report`, and every call to
//! `send_report` appends one row. Where the files go is controlled by the
//! `ReportOptions` returned from `Context::report_options`.
use std::any::TypeId;
use std::cell::RefCell;
use std::fs::{create_dir_all, File};
use std::path::{Path, PathBuf};

use csv::Writer;
use log::{error, trace};
use rustc_hash::FxHashMap;

use crate::context::Context;
use crate::define_data_plugin;
use crate::error::EpiError;

pub trait Report: 'static {
    // Returns report type
    fn type_id(&self) -> TypeId;
    // Serializes the data with the correct writer
    fn serialize(&self, writer: &mut Writer<File>) -> Result<(), csv::Error>;
}

/// Use this macro to define a unique report type
#[macro_export]
macro_rules! define_report {
    ($name:ident) => {
        impl $crate::report::Report for $name {
            fn type_id(&self) -> std::any::TypeId {
                std::any::TypeId::of::<$name>()
            }

            fn serialize(
                &self,
                writer: &mut $crate::csv::Writer<std::fs::File>,
            ) -> Result<(), $crate::csv::Error> {
                writer.serialize(self)
            }
        }
    };
}
pub use define_report;

/// Where report files are written and whether existing files may be replaced.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub file_prefix: String,
    pub directory: PathBuf,
    pub overwrite: bool,
}

impl ReportOptions {
    /// Creates a new `ReportOptions` with default values: no prefix, the
    /// current directory, no overwriting.
    #[must_use]
    pub fn new() -> ReportOptions {
        ReportOptions {
            file_prefix: String::new(),
            directory: PathBuf::from("."),
            overwrite: false,
        }
    }

    /// Sets the file prefix option (e.g., "baseline_")
    pub fn file_prefix(&mut self, file_prefix: String) -> &mut ReportOptions {
        self.file_prefix = file_prefix;
        self
    }

    /// Sets the directory where reports will be output
    pub fn directory(&mut self, directory: PathBuf) -> &mut ReportOptions {
        self.directory = directory;
        self
    }

    /// Sets whether existing report files may be overwritten
    pub fn overwrite(&mut self, overwrite: bool) -> &mut ReportOptions {
        self.overwrite = overwrite;
        self
    }

    /// The path a report with `short_name` is written to.
    #[must_use]
    pub fn path_for(&self, short_name: &str) -> PathBuf {
        self.directory
            .join(format!("{}{}.csv", self.file_prefix, short_name))
    }
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self::new()
    }
}

struct ReportData {
    file_writers: RefCell<FxHashMap<TypeId, Writer<File>>>,
    config: ReportOptions,
}

// Registers a data container that stores
// * file_writers: Maps report type to file writer
// * config: Contains all the customizable filename options that the user supplies
define_data_plugin!(
    ReportPlugin,
    ReportData,
    ReportData {
        file_writers: RefCell::new(FxHashMap::default()),
        config: ReportOptions::new(),
    }
);

fn create_report_file(path: &Path, overwrite: bool) -> Result<File, EpiError> {
    if path.exists() && !overwrite {
        return Err(EpiError::ReportError(format!(
            "File already exists: {}. Please set `overwrite` to true in the report options or \
             use a different file prefix.",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    Ok(File::create(path)?)
}

pub trait ContextReportExt {
    /// Returns the mutable report options; set them before `add_report`.
    fn report_options(&mut self) -> &mut ReportOptions;

    /// Binds report type `T` to `<directory>/<prefix><short_name>.csv`.
    ///
    /// # Errors
    ///
    /// Returns an `EpiError` if the file exists and overwriting is disabled,
    /// or if the directory or file can't be created.
    fn add_report<T: Report + 'static>(&mut self, short_name: &str) -> Result<(), EpiError>;

    /// Write a new row with columns following items in the report struct
    /// to the report file associated with the report type struct.
    ///
    /// # Panics
    ///
    /// Panics if `add_report` was not called for this report type.
    fn send_report<T: Report>(&self, report: T);
}

impl ContextReportExt for Context {
    fn report_options(&mut self) -> &mut ReportOptions {
        &mut self.get_data_container_mut(ReportPlugin).config
    }

    fn add_report<T: Report + 'static>(&mut self, short_name: &str) -> Result<(), EpiError> {
        let data_container = self.get_data_container_mut(ReportPlugin);
        let path = data_container.config.path_for(short_name);
        trace!("adding report {short_name} at {}", path.display());
        let file = create_report_file(&path, data_container.config.overwrite)?;
        data_container
            .file_writers
            .get_mut()
            .insert(TypeId::of::<T>(), Writer::from_writer(file));
        Ok(())
    }

    fn send_report<T: Report>(&self, report: T) {
        let data_container = self
            .get_data_container(ReportPlugin)
            .expect("No writer found for the report type");
        let mut writers = data_container.file_writers.borrow_mut();
        let writer = writers
            .get_mut(&report.type_id())
            .expect("No writer found for the report type");
        let result = report
            .serialize(writer)
            .and_then(|()| writer.flush().map_err(csv::Error::from));
        if let Err(e) = result {
            error!("failed to write report row: {e}");
        }
    }
}

#[cfg(test)]
mod test {
    use serde::{Deserialize, Serialize};
    use tempfile::tempdir;

    use super::*;

    #[derive(Serialize, Deserialize)]
    struct SampleReport {
        id: u32,
        value: String,
    }

    define_report!(SampleReport);

    #[test]
    fn add_and_send_report() {
        let mut context = Context::new();
        let temp_dir = tempdir().unwrap();
        context
            .report_options()
            .directory(temp_dir.path().to_path_buf())
            .file_prefix("run1_".to_string());
        context.add_report::<SampleReport>("sample").unwrap();
        context.send_report(SampleReport {
            id: 1,
            value: "Value,1".to_string(),
        });
        context.send_report(SampleReport {
            id: 2,
            value: "Value 2".to_string(),
        });

        let file_path = temp_dir.path().join("run1_sample.csv");
        assert!(file_path.exists(), "CSV file should exist");

        let mut reader = csv::Reader::from_path(file_path).unwrap();
        let records: Vec<SampleReport> = reader.deserialize().map(Result::unwrap).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 1);
        assert_eq!(records[0].value, "Value,1");
        assert_eq!(records[1].id, 2);
    }

    #[test]
    fn creates_missing_directories() {
        let mut context = Context::new();
        let temp_dir = tempdir().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        context.report_options().directory(nested.clone());
        context.add_report::<SampleReport>("sample").unwrap();
        assert!(nested.join("sample.csv").exists());
    }

    #[test]
    fn refuses_to_overwrite_by_default() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("sample.csv");
        File::create(&path).unwrap();

        let mut context = Context::new();
        context
            .report_options()
            .directory(temp_dir.path().to_path_buf());
        let result = context.add_report::<SampleReport>("sample");
        assert!(matches!(result, Err(EpiError::ReportError(_))));

        context.report_options().overwrite(true);
        assert!(context.add_report::<SampleReport>("sample").is_ok());
    }

    #[test]
    #[should_panic(expected = "No writer found for the report type")]
    fn send_report_without_adding_report() {
        let context = Context::new();
        context.send_report(SampleReport {
            id: 1,
            value: "Test Value".to_string(),
        });
    }
}
