//! `bam-lint`: parse a rule document file and report, per document, whether
//! it requires BAM-side enforcement or can stay legacy AutoModerator YAML.
//!
//! ```bash
//! bam-lint rules.yaml
//! bam-lint --format json rules.yaml
//! ```

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use bam_engine::rule::parse_rule;
use clap::{Parser, ValueEnum};
use serde::Deserialize;

#[derive(Parser)]
#[command(name = "bam-lint")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Classify rule documents as BAM-required or legacy-AutoModerator-renderable")]
struct Cli {
    /// Path to a file containing one or more `---`-separated rule documents
    path: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(serde::Serialize)]
struct DocumentReport {
    index: usize,
    requires_bam: bool,
    kind: Option<String>,
    error: Option<String>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let raw = match fs::read_to_string(&cli.path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("bam-lint: could not read {}: {e}", cli.path.display());
            return ExitCode::FAILURE;
        }
    };

    let mut reports = Vec::new();
    let mut had_error = false;

    for (index, doc) in serde_yaml::Deserializer::from_str(&raw).enumerate() {
        let report = match serde_yaml::Value::deserialize(doc) {
            Err(e) => Err(e.to_string()),
            Ok(value) => parse_rule(value).map_err(|e| e.to_string()),
        };
        let report = match report {
            Ok(rule) => DocumentReport {
                index,
                requires_bam: rule.requires_bam,
                kind: Some(format!("{:?}", rule.kind)),
                error: None,
            },
            Err(e) => {
                had_error = true;
                DocumentReport {
                    index,
                    requires_bam: false,
                    kind: None,
                    error: Some(e),
                }
            }
        };
        reports.push(report);
    }

    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&reports).unwrap_or_default());
        }
        OutputFormat::Text => {
            for r in &reports {
                match &r.error {
                    Some(e) => println!("document {}: PARSE ERROR: {e}", r.index),
                    None => println!(
                        "document {}: kind={} requires_bam={}",
                        r.index,
                        r.kind.as_deref().unwrap_or("?"),
                        r.requires_bam
                    ),
                }
            }
        }
    }

    if had_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
