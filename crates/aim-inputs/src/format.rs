//! Field files.
//!
//! Two encodings are supported, chosen by file extension:
//!
//! - `.json`: a single JSON array of fields
//! - `.jsonl` / `.ndjson`: one JSON field per line (blank lines are skipped)
//!
//! Each field is an object with its metadata keys next to a `values` array:
//!
//! ```json
//! {"param": "t", "levtype": "pl", "level": 850, "shape": [2, 2], "values": [271.3, 272.0, 270.8, 269.9]}
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use aim_core::util::paths::extension_lowercase;
use aim_core::{Error, Result};

use crate::field::{Field, FieldList};

/// Encoding of a field file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFormat {
    /// One JSON array.
    Json,
    /// One JSON object per line.
    JsonLines,
}

impl FieldFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match extension_lowercase(path).as_deref() {
            Some("json") => Ok(Self::Json),
            Some("jsonl") | Some("ndjson") => Ok(Self::JsonLines),
            Some(other) => Err(Error::config(format!(
                "Unsupported field file extension '.{other}' for {} (expected .json, .jsonl or .ndjson)",
                path.display()
            ))),
            None => Err(Error::config(format!(
                "Cannot tell the field file format of {} without an extension",
                path.display()
            ))),
        }
    }
}

/// Read and validate every field in a file.
pub fn read_fields(path: impl AsRef<Path>) -> Result<FieldList> {
    let path = path.as_ref();
    let format = FieldFormat::from_path(path)?;
    let file = File::open(path).map_err(|e| Error::io_with_path(e, path))?;
    let reader = BufReader::new(file);

    let fields = match format {
        FieldFormat::Json => {
            let fields: Vec<Field> = serde_json::from_reader(reader)
                .map_err(|e| Error::parse(format!("{}: {e}", path.display())))?;
            fields
        }
        FieldFormat::JsonLines => {
            let mut fields = Vec::new();
            for (index, line) in reader.lines().enumerate() {
                let line = line.map_err(|e| Error::io_with_path(e, path))?;
                if line.trim().is_empty() {
                    continue;
                }
                let field: Field = serde_json::from_str(&line).map_err(|e| {
                    Error::parse(format!("{}:{}: {e}", path.display(), index + 1))
                })?;
                fields.push(field);
            }
            fields
        }
    };

    for field in &fields {
        field.validate()?;
    }

    log::debug!("Read {} field(s) from {}", fields.len(), path.display());
    Ok(FieldList::new(fields))
}

/// Write a whole field list to `path`, replacing any existing file.
pub fn write_fields(path: impl AsRef<Path>, fields: &FieldList) -> Result<()> {
    let path = path.as_ref();
    let mut writer = FieldWriter::create(path)?;
    for field in fields {
        writer.write(field)?;
    }
    writer.finish()?;
    Ok(())
}

/// Streams fields into a writer in either format.
pub struct FieldWriter<W: Write> {
    inner: W,
    format: FieldFormat,
    count: usize,
}

impl FieldWriter<BufWriter<File>> {
    /// Create (or truncate) a file, with the format taken from its extension.
    pub fn create(path: &Path) -> Result<Self> {
        let format = FieldFormat::from_path(path)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
        }
        let file = File::create(path).map_err(|e| Error::io_with_path(e, path))?;
        Ok(Self::new(BufWriter::new(file), format))
    }
}

impl<W: Write> FieldWriter<W> {
    /// Wrap a writer. Nothing is written until the first field.
    pub fn new(inner: W, format: FieldFormat) -> Self {
        Self {
            inner,
            format,
            count: 0,
        }
    }

    /// Number of fields written so far.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Encode one field.
    pub fn write(&mut self, field: &Field) -> Result<()> {
        match self.format {
            FieldFormat::Json => {
                let separator: &[u8] = if self.count == 0 { b"[\n" } else { b",\n" };
                self.inner.write_all(separator)?;
                serde_json::to_writer(&mut self.inner, field)?;
            }
            FieldFormat::JsonLines => {
                serde_json::to_writer(&mut self.inner, field)?;
                self.inner.write_all(b"\n")?;
            }
        }
        self.count += 1;
        Ok(())
    }

    /// Close the encoding and flush. Returns the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        if self.format == FieldFormat::Json {
            let closing: &[u8] = if self.count == 0 { b"[]\n" } else { b"\n]\n" };
            self.inner.write_all(closing)?;
        }
        self.inner.flush()?;
        Ok(self.inner)
    }
}
