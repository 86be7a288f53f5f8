//! Meteorological fields and field lists.
//!
//! A [`Field`] is one horizontal slice of one parameter: values on a grid
//! plus the metadata that identifies it (`param`, `levtype`, `level`, date,
//! time and step). A [`FieldList`] is an ordered collection of fields, as
//! read from a file or produced by a derivation.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Add;

use aim_core::{Error, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

// ============================================================================
// LevType
// ============================================================================

/// Vertical level type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LevType {
    /// Surface and single-level parameters.
    Sfc,
    /// Pressure levels, `level` in hPa.
    Pl,
    /// Model levels, `level` is the model level number.
    Ml,
    /// Anything else, kept verbatim.
    Other(String),
}

impl LevType {
    /// Short name as written in field files (`sfc`, `pl`, `ml`).
    pub fn as_str(&self) -> &str {
        match self {
            Self::Sfc => "sfc",
            Self::Pl => "pl",
            Self::Ml => "ml",
            Self::Other(other) => other,
        }
    }
}

impl From<String> for LevType {
    fn from(value: String) -> Self {
        match value.to_lowercase().as_str() {
            "sfc" => Self::Sfc,
            "pl" => Self::Pl,
            "ml" => Self::Ml,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for LevType {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<LevType> for String {
    fn from(value: LevType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for LevType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// FieldMetadata
// ============================================================================

/// Identifies a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMetadata {
    /// Parameter short name (`t`, `q`, `gh`, `tcwv`, ...).
    pub param: String,
    /// Vertical level type.
    pub levtype: LevType,
    /// Level value; absent for surface fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<i64>,
    /// Base date of the data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// Base time as `HHMM` (e.g. `1200`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<u32>,
    /// Forecast step in hours.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<u32>,
    /// Grid shape, e.g. `[nlat, nlon]`. When present, the number of values
    /// must equal its product.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Vec<usize>>,
}

impl FieldMetadata {
    /// Metadata for a new field with only a parameter and level type.
    pub fn new(param: impl Into<String>, levtype: LevType) -> Self {
        Self {
            param: param.into(),
            levtype,
            level: None,
            date: None,
            time: None,
            step: None,
            shape: None,
        }
    }

    /// Set the level.
    pub fn with_level(mut self, level: i64) -> Self {
        self.level = Some(level);
        self
    }

    /// Set the grid shape.
    pub fn with_shape(mut self, shape: Vec<usize>) -> Self {
        self.shape = Some(shape);
        self
    }

    /// Set the base date and `HHMM` time.
    pub fn with_datetime(mut self, date: NaiveDate, time: u32) -> Self {
        self.date = Some(date);
        self.time = Some(time);
        self
    }

    /// Set the forecast step in hours.
    pub fn with_step(mut self, step: u32) -> Self {
        self.step = Some(step);
        self
    }

    /// Lower-cased parameter name, used for all parameter matching.
    pub fn param_key(&self) -> String {
        self.param.to_lowercase()
    }

    /// Base date and time, when both are known and the time is a valid `HHMM`.
    pub fn base_datetime(&self) -> Option<NaiveDateTime> {
        let date = self.date?;
        let time = self.time.unwrap_or(0);
        let time = NaiveTime::from_hms_opt(time / 100, time % 100, 0)?;
        Some(date.and_time(time))
    }

    /// Base date-time plus step.
    pub fn valid_datetime(&self) -> Option<NaiveDateTime> {
        let base = self.base_datetime()?;
        Some(base + Duration::hours(i64::from(self.step.unwrap_or(0))))
    }
}

impl fmt::Display for FieldMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.param, self.levtype)?;
        if let Some(level) = self.level {
            write!(f, "/{level}")?;
        }
        if let Some(valid) = self.valid_datetime() {
            write!(f, " @ {}", valid.format("%Y-%m-%d %H:%M"))?;
        }
        Ok(())
    }
}

// ============================================================================
// Field
// ============================================================================

/// A single field: metadata and one value per grid point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Identifying metadata, stored inline next to `values`.
    #[serde(flatten)]
    pub metadata: FieldMetadata,
    /// Grid values. Missing values are NaN in memory and `null` on disk.
    #[serde(with = "missing_as_null")]
    pub values: Vec<f64>,
}

/// Field files store missing values as `null`, which JSON numbers cannot express.
mod missing_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(|v| v.is_finite().then_some(*v)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        let values = Vec::<Option<f64>>::deserialize(deserializer)?;
        Ok(values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    }
}

impl Field {
    /// Create a field, checking that values and shape agree.
    pub fn new(metadata: FieldMetadata, values: Vec<f64>) -> Result<Self> {
        let field = Self { metadata, values };
        field.validate()?;
        Ok(field)
    }

    /// A new field that copies `template`'s metadata under a new parameter.
    ///
    /// Used when writing derived parameters: date, time, step, shape and
    /// level information come from the field the values were computed from.
    pub fn from_template(template: &Field, param: &str, values: Vec<f64>) -> Self {
        let mut metadata = template.metadata.clone();
        metadata.param = param.to_string();
        Self { metadata, values }
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<()> {
        if self.metadata.param.trim().is_empty() {
            return Err(Error::validation_field("param", "must not be empty"));
        }
        if let Some(shape) = &self.metadata.shape {
            let expected = shape
                .iter()
                .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
                .ok_or_else(|| {
                    Error::validation_field(
                        "shape",
                        format!("{}: shape {shape:?} is too large", self.metadata),
                    )
                })?;
            if expected != self.values.len() {
                return Err(Error::validation_field(
                    "values",
                    format!(
                        "{}: shape {shape:?} needs {expected} values, found {}",
                        self.metadata,
                        self.values.len()
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Parameter short name, as written.
    pub fn param(&self) -> &str {
        &self.metadata.param
    }

    /// Level, if the level type has one.
    pub fn level(&self) -> Option<i64> {
        self.metadata.level
    }

    /// Level type.
    pub fn levtype(&self) -> &LevType {
        &self.metadata.levtype
    }

    /// Number of grid points.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the field has no grid points.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Minimum, maximum and mean of the non-NaN values.
    pub fn statistics(&self) -> Option<(f64, f64, f64)> {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in self.values.iter().filter(|v| !v.is_nan()) {
            count += 1;
            sum += v;
            min = min.min(v);
            max = max.max(v);
        }
        (count > 0).then(|| (min, max, sum / count as f64))
    }
}

// ============================================================================
// FieldList
// ============================================================================

/// Ordered collection of fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldList {
    fields: Vec<Field>,
}

impl FieldList {
    /// Wrap fields, keeping their order.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when there are no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over fields in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    /// Append a field.
    pub fn push(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Unwrap into the underlying vector.
    pub fn into_vec(self) -> Vec<Field> {
        self.fields
    }

    /// Fields of one level type, in order.
    pub fn sel_levtype(&self, levtype: &LevType) -> FieldList {
        self.filter(|f| f.levtype() == levtype)
    }

    /// Fields of one parameter (case-insensitive), in order.
    pub fn sel_param(&self, param: &str) -> FieldList {
        let param = param.to_lowercase();
        self.filter(|f| f.metadata.param_key() == param)
    }

    /// Fields matching a predicate, in order.
    pub fn filter(&self, predicate: impl Fn(&Field) -> bool) -> FieldList {
        self.fields
            .iter()
            .filter(|f| predicate(f))
            .cloned()
            .collect()
    }

    /// Parameter name of every field, lower-cased, in order (with repeats).
    pub fn params(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.metadata.param_key()).collect()
    }

    /// Does any field carry `param` (case-insensitive)?
    pub fn has_param(&self, param: &str) -> bool {
        let param = param.to_lowercase();
        self.fields.iter().any(|f| f.metadata.param_key() == param)
    }

    /// Distinct parameters, sorted.
    pub fn unique_params(&self) -> Vec<String> {
        self.params()
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct levels, ascending.
    pub fn levels(&self) -> Vec<i64> {
        self.fields
            .iter()
            .filter_map(Field::level)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Append all fields of `other`.
    pub fn concat(mut self, other: FieldList) -> FieldList {
        self.fields.extend(other.fields);
        self
    }
}

impl Add for FieldList {
    type Output = FieldList;

    fn add(self, rhs: FieldList) -> FieldList {
        self.concat(rhs)
    }
}

impl FromIterator<Field> for FieldList {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl Extend<Field> for FieldList {
    fn extend<I: IntoIterator<Item = Field>>(&mut self, iter: I) {
        self.fields.extend(iter);
    }
}

impl IntoIterator for FieldList {
    type Item = Field;
    type IntoIter = std::vec::IntoIter<Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldList {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pl(param: &str, level: i64, values: Vec<f64>) -> Field {
        Field::new(FieldMetadata::new(param, LevType::Pl).with_level(level), values).unwrap()
    }

    fn sfc(param: &str, values: Vec<f64>) -> Field {
        Field::new(FieldMetadata::new(param, LevType::Sfc), values).unwrap()
    }

    #[test]
    fn test_levtype_parsing() {
        assert_eq!(LevType::from("SFC"), LevType::Sfc);
        assert_eq!(LevType::from("pl"), LevType::Pl);
        assert_eq!(LevType::from("ml"), LevType::Ml);
        assert_eq!(LevType::from("pt"), LevType::Other("pt".into()));
        assert_eq!(LevType::Other("pt".into()).to_string(), "pt");
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let meta = FieldMetadata::new("t", LevType::Pl)
            .with_level(850)
            .with_shape(vec![2, 2]);
        let err = Field::new(meta, vec![1.0, 2.0, 3.0]).unwrap_err();
        assert!(err.to_string().contains("needs 4 values, found 3"));
    }

    #[test]
    fn test_empty_param_rejected() {
        assert!(Field::new(FieldMetadata::new(" ", LevType::Sfc), vec![]).is_err());
    }

    #[test]
    fn test_from_template() {
        let q = pl("q", 850, vec![0.1, 0.2]);
        let r = Field::from_template(&q, "r", vec![50.0, 60.0]);
        assert_eq!(r.param(), "r");
        assert_eq!(r.level(), Some(850));
        assert_eq!(r.levtype(), &LevType::Pl);
    }

    #[test]
    fn test_valid_datetime() {
        let meta = FieldMetadata::new("2t", LevType::Sfc)
            .with_datetime(NaiveDate::from_ymd_opt(2023, 8, 30).unwrap(), 1800)
            .with_step(12);
        let valid = meta.valid_datetime().unwrap();
        assert_eq!(valid.to_string(), "2023-08-31 06:00:00");
        assert_eq!(meta.to_string(), "2t/sfc @ 2023-08-31 06:00");
    }

    #[test]
    fn test_invalid_time_has_no_datetime() {
        let meta = FieldMetadata::new("2t", LevType::Sfc)
            .with_datetime(NaiveDate::from_ymd_opt(2023, 8, 30).unwrap(), 2575);
        assert!(meta.base_datetime().is_none());
    }

    #[test]
    fn test_selection() {
        let list = FieldList::new(vec![
            sfc("2t", vec![280.0]),
            pl("t", 850, vec![270.0]),
            pl("Q", 500, vec![0.001]),
            pl("t", 500, vec![250.0]),
        ]);

        assert_eq!(list.sel_levtype(&LevType::Sfc).len(), 1);
        assert_eq!(list.sel_levtype(&LevType::Pl).len(), 3);
        assert!(list.sel_levtype(&LevType::Ml).is_empty());
        assert_eq!(list.sel_param("t").len(), 2);
        assert!(list.has_param("q"));
        assert_eq!(list.params(), vec!["2t", "t", "q", "t"]);
        assert_eq!(list.unique_params(), vec!["2t", "q", "t"]);
        assert_eq!(list.levels(), vec![500, 850]);
    }

    #[test]
    fn test_concat_keeps_order() {
        let a = FieldList::new(vec![sfc("msl", vec![1.0])]);
        let b = FieldList::new(vec![sfc("tcwv", vec![2.0])]);
        let joined = a + b;
        assert_eq!(joined.params(), vec!["msl", "tcwv"]);
    }

    #[test]
    fn test_statistics_skip_nan() {
        let f = sfc("2t", vec![1.0, f64::NAN, 3.0]);
        assert_eq!(f.statistics(), Some((1.0, 3.0, 2.0)));
        assert_eq!(sfc("2t", vec![f64::NAN]).statistics(), None);
    }

    #[test]
    fn test_field_json_shape() {
        let f = pl("t", 850, vec![1.5]);
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["param"], "t");
        assert_eq!(json["levtype"], "pl");
        assert_eq!(json["level"], 850);
        assert!(json.get("date").is_none());
    }
}
