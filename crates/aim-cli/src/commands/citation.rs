//! `aim citation validate` and `aim citation show`.

use std::path::{Path, PathBuf};

use aim_citation::render::{to_apa, to_bibtex};
use aim_citation::{
    CITATION_FILE_NAME, CitationDocument, ValidationPolicy, ValidationReport, parse_str,
};
use aim_core::{Error, Result, find_file_upwards};
use futures::future::join_all;
use serde::Serialize;

use crate::cli::ShowFormat;
use crate::config::CitationConfig;

/// Validation outcome for one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    /// Set when the file could not be read or parsed at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub valid: bool,
    pub report: ValidationReport,
}

impl FileReport {
    fn failed(path: PathBuf, error: impl ToString) -> Self {
        Self {
            path,
            error: Some(error.to_string()),
            valid: false,
            report: ValidationReport::default(),
        }
    }
}

/// Citation file to use when a command is given none.
///
/// The configured `citation.path` wins; otherwise the nearest
/// `CITATION.cff` from the current directory upwards.
pub fn default_citation_path(config: &CitationConfig) -> Result<PathBuf> {
    if let Some(path) = &config.path {
        return Ok(aim_core::expand_tilde(path));
    }
    let cwd = std::env::current_dir()?;
    find_file_upwards(&cwd, CITATION_FILE_NAME)
        .ok_or_else(|| Error::not_found("citation file", CITATION_FILE_NAME))
}

/// Read and validate several files concurrently.
///
/// Reports come back in the order the paths were given.
pub async fn validate_files(paths: &[PathBuf], policy: &ValidationPolicy) -> Vec<FileReport> {
    let reads = paths.iter().map(|path| async move {
        let content = tokio::fs::read_to_string(path).await;
        (path.clone(), content)
    });

    join_all(reads)
        .await
        .into_iter()
        .map(|(path, content)| match content {
            Ok(content) => validate_content(path, &content, policy),
            Err(e) => FileReport::failed(path.clone(), Error::io_with_path(e, &path)),
        })
        .collect()
}

fn validate_content(path: PathBuf, content: &str, policy: &ValidationPolicy) -> FileReport {
    match parse_str(content) {
        Ok(doc) => {
            let report = doc.validate(policy);
            log::debug!(
                "{}: {} error(s), {} warning(s)",
                path.display(),
                report.error_count(),
                report.warning_count()
            );
            FileReport {
                path,
                error: None,
                valid: report.is_valid(),
                report,
            }
        }
        Err(e) => FileReport::failed(path, e),
    }
}

/// Print validation results as text or JSON.
pub fn print_reports(reports: &[FileReport], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(reports)?);
        return Ok(());
    }

    for file in reports {
        let path = file.path.display();
        if let Some(error) = &file.error {
            println!("{path}: {error}");
            continue;
        }
        for issue in file.report.issues() {
            println!("{path}: {issue}");
        }
        let status = if file.valid { "ok" } else { "invalid" };
        println!(
            "{path}: {status} ({} error(s), {} warning(s))",
            file.report.error_count(),
            file.report.warning_count()
        );
    }
    Ok(())
}

/// `aim citation validate`. Returns whether every file is valid.
pub async fn cmd_citation_validate(
    paths: Vec<PathBuf>,
    json: bool,
    schema_only: bool,
    config: &CitationConfig,
) -> Result<bool> {
    let paths = if paths.is_empty() {
        vec![default_citation_path(config)?]
    } else {
        paths
    };
    let policy = if schema_only {
        ValidationPolicy::schema_only()
    } else {
        config.policy()
    };

    let reports = validate_files(&paths, &policy).await;
    print_reports(&reports, json)?;
    Ok(reports.iter().all(|r| r.valid))
}

/// Render a document in the requested format.
pub fn render_document(doc: &CitationDocument, format: ShowFormat) -> Result<String> {
    match format {
        ShowFormat::Yaml => serde_yaml::to_string(doc.value())
            .map_err(|e| Error::parse(format!("Failed to serialize citation: {e}"))),
        ShowFormat::Apa => Ok(to_apa(&doc.deserialize()?)),
        ShowFormat::Bibtex => Ok(to_bibtex(&doc.deserialize()?)),
    }
}

/// `aim citation show`.
pub fn cmd_citation_show(
    path: Option<&Path>,
    format: ShowFormat,
    config: &CitationConfig,
) -> Result<()> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => default_citation_path(config)?,
    };
    let doc = aim_citation::load(&path)?;

    let report = doc.validate(&config.policy());
    for issue in report.issues() {
        log::warn!("{}: {issue}", path.display());
    }

    let rendered = render_document(&doc, format)?;
    println!("{}", rendered.trim_end());
    Ok(())
}
