//! Command-line definitions.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

/// Citation metadata and input field tooling for AI weather models.
#[derive(Parser, Debug)]
#[command(name = "aim", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// CITATION.cff operations
    Citation {
        #[command(subcommand)]
        action: CitationAction,
    },
    /// Input field operations
    Input {
        #[command(subcommand)]
        action: InputAction,
    },
    /// Configuration file management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// `aim citation ...`
#[derive(Subcommand, Debug)]
pub enum CitationAction {
    /// Validate one or more CFF files
    Validate {
        /// Files to check (defaults to the nearest CITATION.cff)
        paths: Vec<PathBuf>,

        /// Print the reports as JSON
        #[arg(long)]
        json: bool,

        /// Only enforce what the CFF schema requires
        #[arg(long)]
        schema_only: bool,
    },
    /// Render a CFF file as a reference
    Show {
        /// File to render (defaults to the nearest CITATION.cff)
        path: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = ShowFormat::Apa)]
        format: ShowFormat,
    },
}

/// Output formats of `aim citation show`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowFormat {
    Apa,
    Bibtex,
    Yaml,
}

/// Options shared by the commands that open an input.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct InputOpts {
    /// Input source (defaults to `inputs.default_input`)
    #[arg(short, long)]
    pub input: Option<String>,

    /// Field file for the `file` input
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Do not compute missing tcwv / r
    #[arg(long)]
    pub no_derive: bool,
}

/// `aim input ...`
#[derive(Subcommand, Debug)]
pub enum InputAction {
    /// List available inputs and outputs
    List,
    /// Summarise the fields an input provides
    Inspect {
        #[command(flatten)]
        opts: InputOpts,
    },
    /// Read an input, derive missing parameters, and write the result
    Derive {
        #[command(flatten)]
        opts: InputOpts,

        /// Destination field file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output kind (defaults to `inputs.default_output`)
        #[arg(long)]
        output_kind: Option<String>,
    },
}

/// `aim config ...`
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path
    Path,
    /// Print a value by dotted key
    Get { key: String },
    /// Set a value by dotted key
    Set { key: String, value: String },
    /// Write a default config file
    Init {
        /// Where to write it (defaults to the platform config dir)
        #[arg(long)]
        file: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_validate() {
        let cli = Cli::try_parse_from(["aim", "citation", "validate", "a.cff", "b.cff", "--json"])
            .unwrap();
        match cli.command {
            Command::Citation {
                action: CitationAction::Validate { paths, json, schema_only },
            } => {
                assert_eq!(paths.len(), 2);
                assert!(json);
                assert!(!schema_only);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_show_format() {
        let cli = Cli::try_parse_from(["aim", "citation", "show", "--format", "bibtex"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Citation {
                action: CitationAction::Show { path: None, format: ShowFormat::Bibtex }
            }
        ));
    }

    #[test]
    fn test_parse_derive() {
        let cli = Cli::try_parse_from([
            "aim", "-vv", "input", "derive", "--file", "in.json", "--output", "out.jsonl",
            "--output-kind", "none",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Input {
                action: InputAction::Derive { opts, output, output_kind },
            } => {
                assert_eq!(opts.file, Some(PathBuf::from("in.json")));
                assert_eq!(output, Some(PathBuf::from("out.jsonl")));
                assert_eq!(output_kind.as_deref(), Some("none"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["aim", "config", "path", "--config", "/tmp/aim.toml"])
            .unwrap();
        assert_eq!(cli.config.as_deref(), Some("/tmp/aim.toml"));
    }
}
