//! CSV output for derived records.
use crate::classifier::derive::DerivedRecord;
use crate::classifier::derive::OutputField;
use crate::error::ImportError;
use crate::error::ResultMessage;
use csv::Writer;
use std::fs;
use std::fs::File;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;

/// Suffix of every import file name.
pub(crate) const IMPORT_SUFFIX: &str = "_Zephyr_Import.csv";

/// An import file being written. Rows are flushed on [`CsvSink::close`].
pub(crate) struct CsvSink {
    path: PathBuf,
    fields: Vec<OutputField>,
    writer: Writer<File>,
    records: usize,
}

impl CsvSink {
    /// Creates (or truncates) `path`, creating its directory first.
    pub(crate) fn open(path: &Path, fields: Vec<OutputField>) -> Result<CsvSink, ImportError> {
        let display = path.display().to_string();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(ImportError::from)
                .with_prefix(&display)?;
        }
        let writer = Writer::from_path(path)
            .map_err(ImportError::from)
            .with_prefix(&display)?;
        Ok(CsvSink {
            path: path.to_owned(),
            fields,
            writer,
            records: 0,
        })
    }

    pub(crate) fn write_header(&mut self) -> Result<(), ImportError> {
        self.writer
            .write_record(self.fields.iter().map(OutputField::header))?;
        Ok(())
    }

    pub(crate) fn append(&mut self, record: &DerivedRecord) -> Result<(), ImportError> {
        self.writer.write_record(record.values(&self.fields))?;
        self.records += 1;
        Ok(())
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes the file and returns the number of records written.
    pub(crate) fn close(mut self) -> Result<usize, ImportError> {
        self.writer.flush()?;
        debug!(path = %self.path.display(), records = self.records, "closed output");
        Ok(self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, objective: &str) -> DerivedRecord {
        DerivedRecord {
            label: None,
            name: name.to_owned(),
            objective: objective.to_owned(),
            owner: "u1".to_owned(),
            priority: "Normal",
            status: "Draft",
            estimate: "1:00",
            folder: "Pout: Power".to_owned(),
            component: None,
            precondition: None,
        }
    }

    #[test]
    fn writes_header_then_records_without_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan").join("plan_Zephyr_Import.csv");
        let fields = vec![OutputField::Name, OutputField::Objective, OutputField::Folder];

        let mut sink = CsvSink::open(&path, fields).unwrap();
        sink.write_header().unwrap();
        sink.append(&record("Pout_Power1_U1_3.3_25", "Measure Pout_Power, \"quoted\"")).unwrap();
        sink.append(&record("Pout_Power2_U1_5_25", "plain")).unwrap();
        assert_eq!(sink.path(), path.as_path());
        assert_eq!(sink.close().unwrap(), 2);

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "Name,Objective,Folder\n\
             Pout_Power1_U1_3.3_25,\"Measure Pout_Power, \"\"quoted\"\"\",Pout: Power\n\
             Pout_Power2_U1_5_25,plain,Pout: Power\n"
        );
        assert!(!content.contains("\n\n"));
    }

    #[test]
    fn reopening_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, "stale\n").unwrap();

        let mut sink = CsvSink::open(&path, vec![OutputField::Name]).unwrap();
        sink.write_header().unwrap();
        sink.close().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "Name\n");
    }
}
