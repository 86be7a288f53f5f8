//! Output sinks for fields.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use aim_core::{Error, Result};

use crate::field::Field;
use crate::format::FieldWriter;

/// What an output did once finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSummary {
    /// Fields passed to [`Output::write`].
    pub fields_written: usize,
    /// File written, for file-based outputs.
    pub path: Option<PathBuf>,
}

/// Receives fields one by one.
pub trait Output {
    /// Send one field to the output.
    fn write(&mut self, field: &Field) -> Result<()>;

    /// Flush and close the output.
    fn finish(self: Box<Self>) -> Result<OutputSummary>;
}

/// Writes fields to a field file.
pub struct FileOutput {
    path: PathBuf,
    writer: FieldWriter<BufWriter<File>>,
}

impl FileOutput {
    /// Create the file (and missing parent directories); format follows the extension.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let writer = FieldWriter::create(&path)?;
        Ok(Self { path, writer })
    }
}

impl Output for FileOutput {
    fn write(&mut self, field: &Field) -> Result<()> {
        self.writer.write(field)
    }

    fn finish(self: Box<Self>) -> Result<OutputSummary> {
        let fields_written = self.writer.count();
        self.writer.finish()?;
        log::info!("Wrote {fields_written} field(s) to {}", self.path.display());
        Ok(OutputSummary {
            fields_written,
            path: Some(self.path),
        })
    }
}

/// Discards fields, only counting them. Useful for dry runs.
#[derive(Debug, Default)]
pub struct NoneOutput {
    count: usize,
}

impl Output for NoneOutput {
    fn write(&mut self, field: &Field) -> Result<()> {
        log::trace!("Discarding {}", field.metadata);
        self.count += 1;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<OutputSummary> {
        Ok(OutputSummary {
            fields_written: self.count,
            path: None,
        })
    }
}

/// Names of the built-in outputs.
pub fn available_outputs() -> Vec<&'static str> {
    vec!["file", "none"]
}

/// Build an output by name. `file` needs a path.
pub fn get_output(name: &str, path: Option<PathBuf>) -> Result<Box<dyn Output>> {
    match name {
        "file" => {
            let path = path
                .ok_or_else(|| Error::config("The 'file' output requires a path (--output)"))?;
            Ok(Box::new(FileOutput::create(path)?))
        }
        "none" => Ok(Box::new(NoneOutput::default())),
        other => Err(Error::not_found("output", other)),
    }
}
