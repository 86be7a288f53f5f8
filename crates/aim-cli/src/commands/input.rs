//! `aim input list`, `aim input inspect` and `aim input derive`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use aim_core::Result;
use aim_inputs::compute::make_z_from_gh;
use aim_inputs::{
    FieldList, Input, InputArgs, OutputSummary, available_inputs, available_outputs, get_input,
    get_output,
};

use crate::cli::InputOpts;
use crate::config::InputsConfig;

/// Per-parameter summary printed by `aim input inspect`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSummary {
    pub levtype: String,
    pub param: String,
    pub fields: usize,
    pub levels: Vec<i64>,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Group fields by level type and parameter, sorted by both.
pub fn summarize(fields: &FieldList) -> Vec<ParamSummary> {
    let mut groups: BTreeMap<(String, String), FieldList> = BTreeMap::new();
    for field in fields {
        groups
            .entry((field.levtype().to_string(), field.metadata.param_key()))
            .or_default()
            .push(field.clone());
    }

    groups
        .into_iter()
        .map(|((levtype, param), group)| {
            let stats: Vec<(f64, f64, f64)> = group.iter().filter_map(|f| f.statistics()).collect();
            let (min, max, mean) = if stats.is_empty() {
                (f64::NAN, f64::NAN, f64::NAN)
            } else {
                (
                    stats.iter().map(|s| s.0).fold(f64::INFINITY, f64::min),
                    stats.iter().map(|s| s.1).fold(f64::NEG_INFINITY, f64::max),
                    stats.iter().map(|s| s.2).sum::<f64>() / stats.len() as f64,
                )
            };
            ParamSummary {
                levtype,
                param,
                fields: group.len(),
                levels: group.levels(),
                min,
                max,
                mean,
            }
        })
        .collect()
}

fn open_input(opts: InputOpts, config: &InputsConfig) -> Result<Box<dyn Input>> {
    let name = opts.input.unwrap_or_else(|| config.default_input.clone());
    let args = InputArgs {
        file: opts.file,
        derive_missing: config.derive_missing && !opts.no_derive,
    };
    tracing::debug!(input = %name, "Opening input");
    get_input(&name, &args)
}

/// `aim input list`.
pub fn cmd_input_list() {
    println!("Inputs:");
    for name in available_inputs() {
        println!("  {name}");
    }
    println!("Outputs:");
    for name in available_outputs() {
        println!("  {name}");
    }
}

/// `aim input inspect`.
pub fn cmd_input_inspect(opts: InputOpts, config: &InputsConfig) -> Result<()> {
    let input = open_input(opts, config)?;
    let fields = input.all_fields()?;

    println!("{} field(s) from input '{}'", fields.len(), input.name());
    println!(
        "{:<6} {:<8} {:>6} {:>14} {:>14} {:>14}  levels",
        "type", "param", "count", "min", "max", "mean"
    );
    for summary in summarize(fields) {
        let levels = summary
            .levels
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        println!(
            "{:<6} {:<8} {:>6} {:>14.4} {:>14.4} {:>14.4}  {levels}",
            summary.levtype, summary.param, summary.fields, summary.min, summary.max, summary.mean
        );
    }
    Ok(())
}

/// Read an input, add derived parameters, and send every field to an output.
///
/// Geopotential height (`gh`) is turned into geopotential (`z`) when the
/// input has no `z` of its own.
pub fn derive_fields(
    opts: InputOpts,
    output: Option<PathBuf>,
    output_kind: Option<String>,
    config: &InputsConfig,
) -> Result<OutputSummary> {
    let input = open_input(opts, config)?;
    let mut fields = input.all_fields()?.clone();

    if fields.has_param("gh") && !fields.has_param("z") {
        log::warn!("Parameter 'z' is not available, computing it from 'gh' instead");
        fields = make_z_from_gh(fields);
    }

    let kind = output_kind.unwrap_or_else(|| config.default_output.clone());
    let mut sink = get_output(&kind, output)?;
    for field in &fields {
        sink.write(field)?;
    }
    sink.finish()
}

/// `aim input derive`.
pub fn cmd_input_derive(
    opts: InputOpts,
    output: Option<PathBuf>,
    output_kind: Option<String>,
    config: &InputsConfig,
) -> Result<()> {
    let summary = derive_fields(opts, output, output_kind, config)?;
    match &summary.path {
        Some(path) => println!("Wrote {} field(s) to {}", summary.fields_written, path.display()),
        None => println!("Processed {} field(s)", summary.fields_written),
    }
    Ok(())
}
