//! Input sources.
//!
//! An [`Input`] provides the initial conditions of a model run as a
//! [`FieldList`], with convenience selections per level type.
//! [`FileInput`] reads a field file and fills in parameters the models need
//! but the file lacks.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock};

use aim_core::Result;

use crate::compute::{make_rh_from_t_and_q, make_tcwv_from_q};
use crate::field::{FieldList, LevType};
use crate::format::read_fields;

/// A source of input fields.
pub trait Input: Send + Sync {
    /// Registry name of this input kind.
    fn name(&self) -> &str;

    /// Every field the input provides.
    fn all_fields(&self) -> Result<&FieldList>;

    /// Surface fields.
    fn fields_sfc(&self) -> Result<FieldList> {
        Ok(self.all_fields()?.sel_levtype(&LevType::Sfc))
    }

    /// Pressure-level fields.
    fn fields_pl(&self) -> Result<FieldList> {
        Ok(self.all_fields()?.sel_levtype(&LevType::Pl))
    }

    /// Model-level fields.
    fn fields_ml(&self) -> Result<FieldList> {
        Ok(self.all_fields()?.sel_levtype(&LevType::Ml))
    }
}

/// Fields read from a local field file.
///
/// The file is read once, on first access, and kept for the lifetime of the
/// input. Concurrent first callers wait for that single load. Unless
/// disabled, `tcwv` and `r` are derived from `q` (and `t`) when the file
/// does not contain them.
#[derive(Debug)]
pub struct FileInput {
    path: PathBuf,
    derive_missing: bool,
    fields: OnceLock<FieldList>,
    load_lock: Mutex<()>,
    loads: AtomicUsize,
}

impl FileInput {
    /// An input reading `path`, with derivation enabled.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            derive_missing: true,
            fields: OnceLock::new(),
            load_lock: Mutex::new(()),
            loads: AtomicUsize::new(0),
        }
    }

    /// Enable or disable derivation of missing parameters.
    pub fn with_derive_missing(mut self, derive_missing: bool) -> Self {
        self.derive_missing = derive_missing;
        self
    }

    /// The field file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// How many times the file has been read.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    fn load(&self) -> Result<FieldList> {
        self.loads.fetch_add(1, Ordering::Relaxed);
        let mut fields = read_fields(&self.path)?;
        if !self.derive_missing {
            return Ok(fields);
        }

        if !fields.has_param("tcwv") && fields.has_param("q") {
            log::warn!(
                "Parameter 'tcwv' on surface levels is not available, computing it from 'q' instead"
            );
            fields = make_tcwv_from_q(fields)?;
        }
        if !fields.has_param("r") && fields.has_param("q") {
            log::warn!(
                "Parameter 'r' on pressure levels is not available, computing it from 't' and 'q' instead"
            );
            fields = make_rh_from_t_and_q(fields)?;
        }
        Ok(fields)
    }
}

impl Input for FileInput {
    fn name(&self) -> &str {
        "file"
    }

    fn all_fields(&self) -> Result<&FieldList> {
        if let Some(fields) = self.fields.get() {
            return Ok(fields);
        }

        let _guard = self
            .load_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(fields) = self.fields.get() {
            return Ok(fields);
        }
        let loaded = self.load()?;
        log::info!(
            "Loaded {} field(s) from {}",
            loaded.len(),
            self.path.display()
        );
        Ok(self.fields.get_or_init(|| loaded))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::field::{Field, FieldMetadata};
    use crate::format::write_fields;

    fn write_sample(dir: &Path, name: &str, fields: Vec<Field>) -> PathBuf {
        let path = dir.join(name);
        write_fields(&path, &FieldList::new(fields)).unwrap();
        path
    }

    fn pl(param: &str, level: i64, value: f64) -> Field {
        Field::new(
            FieldMetadata::new(param, LevType::Pl).with_level(level),
            vec![value],
        )
        .unwrap()
    }

    #[test]
    fn test_derives_tcwv_and_r() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_sample(
            dir.path(),
            "in.json",
            vec![
                pl("q", 500, 0.001),
                pl("q", 850, 0.006),
                pl("t", 500, 255.0),
                pl("t", 850, 280.0),
            ],
        );

        let input = FileInput::new(&path);
        let all = input.all_fields().unwrap();
        assert_eq!(all.len(), 4 + 1 + 2);
        assert_eq!(input.fields_sfc().unwrap().params(), vec!["tcwv"]);
        assert_eq!(input.fields_pl().unwrap().sel_param("r").len(), 2);
        assert!(input.fields_ml().unwrap().is_empty());
    }

    #[test]
    fn test_no_derivation_when_present() {
        let dir = tempfile::TempDir::new().unwrap();
        let tcwv = Field::new(FieldMetadata::new("TCWV", LevType::Sfc), vec![20.0]).unwrap();
        let path = write_sample(
            dir.path(),
            "in.jsonl",
            vec![pl("q", 850, 0.006), pl("r", 850, 70.0), tcwv],
        );

        let input = FileInput::new(&path);
        assert_eq!(input.all_fields().unwrap().len(), 3);
    }

    #[test]
    fn test_derivation_can_be_disabled() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_sample(dir.path(), "in.json", vec![pl("q", 850, 0.006)]);

        let input = FileInput::new(&path).with_derive_missing(false);
        assert_eq!(input.all_fields().unwrap().params(), vec!["q"]);
    }

    #[test]
    fn test_loaded_once() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_sample(dir.path(), "in.json", vec![pl("t", 850, 280.0)]);

        let input = FileInput::new(&path);
        assert_eq!(input.all_fields().unwrap().len(), 1);

        std::fs::remove_file(&path).unwrap();
        assert_eq!(input.all_fields().unwrap().len(), 1);
        assert_eq!(input.load_count(), 1);
    }

    #[test]
    fn test_concurrent_first_access_loads_once() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_sample(
            dir.path(),
            "in.json",
            vec![pl("q", 500, 0.001), pl("q", 850, 0.006), pl("t", 850, 280.0)],
        );

        let input = FileInput::new(&path);
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    assert_eq!(input.all_fields().unwrap().len(), 3 + 1 + 1);
                });
            }
        });
        assert_eq!(input.load_count(), 1);
    }

    #[test]
    fn test_missing_file_is_error() {
        let input = FileInput::new("/nonexistent/in.json");
        assert!(input.all_fields().unwrap_err().is_io());
        assert_eq!(input.name(), "file");
    }
}
