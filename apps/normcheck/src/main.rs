//! normcheck: manuscript formatting check
//!
//! Reads a PDF together with its extracted page layout, runs every check,
//! prints the digest and writes an annotated copy next to the input.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use clap::Parser;
use compliance_engine::{checked_copy_name, ComplianceConfig, ComplianceEngine, DocumentModel, LayoutTables};
use shared_pdf::AnnotatedPdf;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "normcheck")]
#[command(version, about = "Check a manuscript PDF against GOST 7.32 formatting rules")]
struct Args {
    /// PDF file to check
    pdf: PathBuf,

    /// Page layout extracted from the PDF (JSON)
    #[arg(short, long)]
    layout: PathBuf,

    /// Rule thresholds (TOML); defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for the annotated copy (defaults to the PDF's directory)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Also print the detailed admin log
    #[arg(long)]
    admin: bool,

    /// Print the whole run as JSON instead of text
    #[arg(long)]
    json: bool,
}

/// Where the annotated copy of `pdf` goes
fn output_path(pdf: &Path, out_dir: Option<&Path>, at: &NaiveDateTime) -> PathBuf {
    let stem = pdf
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let dir = out_dir
        .map(Path::to_path_buf)
        .or_else(|| pdf.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    dir.join(checked_copy_name(&stem, at))
}

fn main() -> Result<()> {
    let args = Args::parse();

    // stdout carries the report, logs go to stderr
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("normcheck v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => ComplianceConfig::from_file(path)?,
        None => ComplianceConfig::default(),
    };

    let mut document = AnnotatedPdf::open(&args.pdf, &args.layout).with_context(|| {
        format!(
            "Failed to open {} with layout {}",
            args.pdf.display(),
            args.layout.display()
        )
    })?;
    tracing::info!(pages = document.page_count(), "document loaded");

    let detector = LayoutTables::from_document(document.layout());
    let run = ComplianceEngine::new(config)
        .with_table_detector(detector)
        .run(&mut document)
        .context("Compliance check failed")?;

    let out = output_path(
        &args.pdf,
        args.out_dir.as_deref(),
        &Local::now().naive_local(),
    );
    document
        .save(&out)
        .with_context(|| format!("Failed to write {}", out.display()))?;
    tracing::info!(path = %out.display(), "annotated copy written");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&run)?);
    } else {
        println!("{}", run.report.user_summary);
        if args.admin {
            println!("\n{}", run.report.admin_details);
        }
        println!("\nПроверенный файл: {}", out.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .and_then(|d| d.and_hms_opt(14, 30, 0))
            .unwrap()
    }

    #[test]
    fn test_output_next_to_input() {
        let path = output_path(Path::new("/tmp/work/thesis.pdf"), None, &at());
        assert_eq!(
            path,
            PathBuf::from("/tmp/work/thesis_Проверено_01.06.2025_в_14-30.pdf")
        );
    }

    #[test]
    fn test_output_in_requested_dir() {
        let path = output_path(Path::new("thesis.pdf"), Some(Path::new("/out")), &at());
        assert_eq!(path, PathBuf::from("/out/thesis_Проверено_01.06.2025_в_14-30.pdf"));
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "normcheck",
            "thesis.pdf",
            "--layout",
            "thesis.json",
            "--admin",
        ])
        .unwrap();
        assert_eq!(args.pdf, PathBuf::from("thesis.pdf"));
        assert!(args.admin);
        assert!(!args.json);
        assert!(args.config.is_none());
    }
}
