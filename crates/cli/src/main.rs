//! CLI tool for extracting text and images from PDF and PPTX files.

use anyhow::{Context, Result};
use clap::Parser;
use doc_extract_core::{DocumentFormat, Error};
use doc_extract_pdf::PdfParser;
use doc_extract_pptx::PptxParser;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Extract document content as the same JSON the extraction service returns.
#[derive(Parser, Debug)]
#[command(name = "doc-extract")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input document(s) (.pdf or .pptx)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Write `<name>.json` files to this directory instead of printing
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print JSON
    #[arg(long)]
    pretty: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let mut failures = 0;
    for input_path in &args.input {
        log::debug!("Processing: {}", input_path.display());

        let result = process_file(input_path, args.pretty).and_then(|json| match &args.output {
            Some(dir) => {
                let output_path = get_output_path(input_path, dir)?;
                fs::write(&output_path, json.as_bytes())
                    .with_context(|| format!("Failed to write {}", output_path.display()))?;
                log::debug!("Written to: {}", output_path.display());
                Ok(())
            }
            None => {
                println!("{}", json);
                Ok(())
            }
        });

        if let Err(e) = result {
            eprintln!("Error processing {}: {:#}", input_path.display(), e);
            failures += 1;
        }
    }

    if failures > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Extract a single document and render it as JSON.
fn process_file(input_path: &Path, pretty: bool) -> Result<String> {
    let data = fs::read(input_path)
        .map_err(Error::from)
        .with_context(|| format!("Failed to open {}", input_path.display()))?;

    let filename = input_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown");

    let format = DocumentFormat::detect(&data, filename)
        .ok_or_else(|| Error::UnsupportedFormat(filename.to_string()))?;

    let value = match format {
        DocumentFormat::Pdf => {
            log::debug!("Parsing as PDF");
            let pdf = PdfParser::new().parse(&data)?;
            serde_json::to_value(pdf)?
        }
        DocumentFormat::Pptx => {
            log::debug!("Parsing as PPTX");
            let deck = PptxParser::new().parse_bytes(&data)?;
            log::debug!("  Found {} slides", deck.slides.len());
            serde_json::to_value(deck)?
        }
    };

    let json = if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };

    Ok(json)
}

/// Determine the output path for a processed file.
fn get_output_path(input_path: &Path, output_dir: &Path) -> Result<PathBuf> {
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    Ok(output_dir.join(format!("{}.json", stem)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreadable_input_is_io_error() {
        let missing = std::env::temp_dir().join("doc-extract-no-such-file.pptx");
        let err = process_file(&missing, false).unwrap_err();

        let core = err.downcast_ref::<Error>().expect("core error in chain");
        assert!(matches!(core, Error::IoError(_)));
        assert!(!core.is_parse_error());
    }

    #[test]
    fn test_output_path_uses_stem() {
        let dir = std::env::temp_dir().join("doc-extract-cli-out");
        let path = get_output_path(Path::new("decks/intro.pptx"), &dir).unwrap();
        assert_eq!(path, dir.join("intro.json"));
    }
}
