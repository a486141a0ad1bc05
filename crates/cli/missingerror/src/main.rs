//! missingerror CLI
//!
//! Reports error values that are assigned but never returned

use anyhow::Result;
use clap::{Parser, Subcommand};
use me_lint::missing_error::{DEFAULT_WRAPPERS, DOC};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Once;

mod check;
mod config;

#[derive(Parser)]
#[command(name = "missingerror")]
#[command(about = "Find errors which are not returned from function", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check unit fact files
    Check {
        /// Fact files or directories containing them
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Comma-separated list of functions which wrap error
        #[arg(long)]
        wrappers: Option<String>,

        /// Configuration file (defaults to missingerror.toml when present)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Describe what the analysis reports
    Explain,
}

static TRACING_INIT: Once = Once::new();

/// Install a subscriber when `RUST_LOG` is set
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            paths,
            wrappers,
            config,
            format,
        } => {
            let wrappers = config::resolve_wrappers(wrappers, config.as_deref())?;
            let findings = check::run_check(&paths, &wrappers, &format)?;
            Ok(ExitCode::from(exit_status(findings)))
        }
        Commands::Explain => {
            println!("{}", explain_text());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Process status for a check: 1 when anything was reported
fn exit_status(findings: usize) -> u8 {
    u8::from(findings > 0)
}

fn explain_text() -> String {
    format!("{DOC}\n\ndefault wrappers: {DEFAULT_WRAPPERS}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_status_reflects_findings() {
        assert_eq!(exit_status(0), 0);
        assert_eq!(exit_status(1), 1);
        assert_eq!(exit_status(12), 1);
    }

    #[test]
    fn test_explain_lists_default_wrappers() {
        let text = explain_text();
        assert!(text.starts_with(DOC));
        assert!(text.ends_with("default wrappers: fmt.Errorf"));
    }

    #[test]
    fn test_cli_parses_check_options() {
        let cli = Cli::try_parse_from([
            "missingerror",
            "check",
            "facts",
            "--wrappers",
            "fmt.Errorf,a/helper.Wrap",
            "--format",
            "json",
        ])
        .expect("arguments parse");

        match cli.command {
            Commands::Check {
                paths,
                wrappers,
                config,
                format,
            } => {
                assert_eq!(paths, vec![PathBuf::from("facts")]);
                assert_eq!(wrappers.as_deref(), Some("fmt.Errorf,a/helper.Wrap"));
                assert_eq!(config, None);
                assert_eq!(format, "json");
            }
            Commands::Explain => panic!("expected check"),
        }
    }

    #[test]
    fn test_check_defaults_to_current_directory() {
        let cli = Cli::try_parse_from(["missingerror", "check"]).expect("arguments parse");
        match cli.command {
            Commands::Check { paths, format, .. } => {
                assert_eq!(paths, vec![PathBuf::from(".")]);
                assert_eq!(format, "text");
            }
            Commands::Explain => panic!("expected check"),
        }
    }
}
