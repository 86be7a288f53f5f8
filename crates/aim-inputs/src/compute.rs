//! Derived parameters.
//!
//! Models expect a fixed set of input parameters. When a data source does
//! not provide one of them it can often be computed from what is there:
//!
//! - geopotential `z` from geopotential height `gh`
//! - total column water vapour `tcwv` from specific humidity `q` on
//!   pressure levels
//! - relative humidity `r` from `q` and temperature `t` on pressure levels
//!
//! The `make_*` functions take a field list and return a new list with the
//! derived fields added (or, for `z`, substituted).

use std::collections::BTreeMap;

use aim_core::{Error, Result};

use crate::field::{Field, FieldList, LevType};

/// Standard gravity, m s⁻².
pub const G: f64 = 9.80665;

/// Water vapour to dry air molar mass ratio.
const EPSILON: f64 = 0.622;

/// 0 °C in Kelvin.
const ZERO_CELSIUS: f64 = 273.15;

// ============================================================================
// Geopotential
// ============================================================================

/// Replace every `gh` field by a `z` field (`z = gh · G`).
///
/// Fields other than `gh` keep their order and come first; the new `z`
/// fields follow in the order their `gh` fields appeared.
pub fn make_z_from_gh(fields: FieldList) -> FieldList {
    let (gh, mut other): (Vec<Field>, Vec<Field>) = fields
        .into_iter()
        .partition(|f| f.metadata.param_key() == "gh");

    other.extend(gh.into_iter().map(|f| {
        let values = f.values.iter().map(|v| v * G).collect();
        Field::from_template(&f, "z", values)
    }));

    FieldList::new(other)
}

// ============================================================================
// Total column water vapour
// ============================================================================

/// Vertically integrate specific humidity.
///
/// `q_levels[i]` holds the humidity on pressure `p_levels[i]` (Pa), levels
/// ascending. Layer thicknesses are `dp[i] = p[i] - p[i-1]` with
/// `dp[0] = 0`, so the top level only bounds the first layer. Result is in
/// kg m⁻² per grid point.
pub fn compute_tcwv(q_levels: &[&[f64]], p_levels: &[f64]) -> Result<Vec<f64>> {
    if q_levels.len() != p_levels.len() {
        return Err(Error::validation(format!(
            "{} humidity levels but {} pressures",
            q_levels.len(),
            p_levels.len()
        )));
    }
    let Some(first) = q_levels.first() else {
        return Ok(Vec::new());
    };
    let points = first.len();
    if let Some(bad) = q_levels.iter().find(|q| q.len() != points) {
        return Err(Error::validation_field(
            "q",
            format!("levels have different sizes ({points} and {})", bad.len()),
        ));
    }

    let mut tcwv = vec![0.0; points];
    let mut previous = p_levels[0];
    for (q, &p) in q_levels.iter().zip(p_levels) {
        let dp = p - previous;
        previous = p;
        for (acc, &value) in tcwv.iter_mut().zip(q.iter()) {
            *acc += value * dp;
        }
    }
    for acc in &mut tcwv {
        *acc /= G;
    }
    Ok(tcwv)
}

/// Add a `tcwv` field computed from the pressure-level `q` fields.
///
/// When several `q` fields share a level, the last one wins. The result is
/// a surface field that copies the first `q` field's date, time, step and
/// shape. Without any `q` on pressure levels the list is returned as is.
pub fn make_tcwv_from_q(fields: FieldList) -> Result<FieldList> {
    let mut template: Option<&Field> = None;
    let mut q_by_level: BTreeMap<i64, &Field> = BTreeMap::new();
    for field in fields.iter().filter(|f| is_pl_param(f, "q")) {
        let Some(level) = field.level() else {
            continue;
        };
        template.get_or_insert(field);
        q_by_level.insert(level, field);
    }

    let Some(template) = template else {
        return Ok(fields);
    };

    let pressures: Vec<f64> = q_by_level.keys().map(|&hpa| hpa as f64 * 100.0).collect();
    let q_levels: Vec<&[f64]> = q_by_level.values().map(|f| f.values.as_slice()).collect();
    let values = compute_tcwv(&q_levels, &pressures)?;

    let mut tcwv = Field::from_template(template, "tcwv", values);
    tcwv.metadata.levtype = LevType::Sfc;
    tcwv.metadata.level = None;

    log::debug!(
        "Computed tcwv from q on {} pressure level(s)",
        q_by_level.len()
    );
    let mut fields = fields;
    fields.push(tcwv);
    Ok(fields)
}

// ============================================================================
// Relative humidity
// ============================================================================

/// Relative humidity in percent from specific humidity (kg kg⁻¹),
/// temperature (°C) and pressure (hPa).
///
/// Uses the Bolton (1980) saturation vapour pressure. Results are clipped
/// to `[0, 100]`.
pub fn compute_rh(q: &[f64], t_celsius: &[f64], p_hpa: f64) -> Result<Vec<f64>> {
    if q.len() != t_celsius.len() {
        return Err(Error::validation(format!(
            "q has {} values but t has {}",
            q.len(),
            t_celsius.len()
        )));
    }

    Ok(q.iter()
        .zip(t_celsius)
        .map(|(&q, &t)| {
            let e = q * p_hpa / (EPSILON + q);
            let es = 6.112 * ((17.67 * t) / (t + 243.5)).exp();
            (100.0 * e / es).clamp(0.0, 100.0)
        })
        .collect())
}

/// Add an `r` field for every pressure level that has both `q` and `t`.
///
/// Temperatures are read in Kelvin. New fields are appended in ascending
/// level order and copy the metadata of the `q` field at that level.
pub fn make_rh_from_t_and_q(fields: FieldList) -> Result<FieldList> {
    let mut q_by_level: BTreeMap<i64, &Field> = BTreeMap::new();
    let mut t_by_level: BTreeMap<i64, &Field> = BTreeMap::new();
    for field in fields.iter().filter(|f| f.levtype() == &LevType::Pl) {
        let Some(level) = field.level() else {
            continue;
        };
        match field.metadata.param_key().as_str() {
            "q" => {
                q_by_level.insert(level, field);
            }
            "t" => {
                t_by_level.insert(level, field);
            }
            _ => {}
        }
    }

    let mut derived = Vec::new();
    for (level, q) in &q_by_level {
        let Some(t) = t_by_level.get(level) else {
            continue;
        };
        let t_celsius: Vec<f64> = t.values.iter().map(|k| k - ZERO_CELSIUS).collect();
        let rh = compute_rh(&q.values, &t_celsius, *level as f64).map_err(|e| {
            Error::validation_field("r", format!("level {level}: {e}"))
        })?;
        derived.push(Field::from_template(q, "r", rh));
    }

    log::debug!("Computed r on {} pressure level(s)", derived.len());
    let mut fields = fields;
    fields.extend(derived);
    Ok(fields)
}

fn is_pl_param(field: &Field, param: &str) -> bool {
    field.levtype() == &LevType::Pl && field.metadata.param_key() == param
}
