use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use fpdec_tools::{
    code_table, decode_chunk, format_code_table, format_decode_text, DecodeOptions, DecodeReport,
};
use glob::Pattern;

#[derive(Parser)]
#[command(
    name = "fpdec-tools",
    version,
    about = "Field-path chunk inspection tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode the field-path chunk in a capture file.
    Decode {
        /// Path to the chunk bytes, or a directory of captures.
        path: PathBuf,
        /// Bit offset of the chunk within each file.
        #[arg(long, default_value_t = 0)]
        offset_bits: usize,
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Optional glob filter when decoding a directory.
        #[arg(long)]
        glob: Option<String>,
        /// Log every operation at trace level.
        #[arg(long)]
        trace: bool,
    },
    /// Print the operation table and its Huffman codes.
    Codes {
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let trace = matches!(cli.command, Command::Decode { trace: true, .. });
    let default_filter = if trace { "fieldpath=trace" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Command::Decode {
            path,
            offset_bits,
            format,
            glob,
            trace,
        } => {
            let options = DecodeOptions {
                offset_bits,
                trace,
                ..DecodeOptions::default()
            };
            if path.is_dir() {
                for file in collect_capture_files(&path, glob.as_deref())? {
                    println!("== {} ==", file.display());
                    let report = decode_file(&file, &options)?;
                    print_report(&report, format)?;
                }
            } else {
                let report = decode_file(&path, &options)?;
                print_report(&report, format)?;
            }
        }
        Command::Codes { format } => {
            let table = code_table();
            match format {
                OutputFormat::Json => {
                    let json = serde_json::to_string_pretty(&table).context("serialize json")?;
                    println!("{json}");
                }
                OutputFormat::Text => print!("{}", format_code_table(&table)),
            }
        }
    }
    Ok(())
}

fn decode_file(path: &Path, options: &DecodeOptions) -> Result<DecodeReport> {
    let bytes = fs::read(path).with_context(|| format!("read capture {}", path.display()))?;
    log::info!("decoding {} ({} bytes)", path.display(), bytes.len());
    decode_chunk(&bytes, options).with_context(|| format!("decode {}", path.display()))
}

fn print_report(report: &DecodeReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report).context("serialize json")?;
            println!("{json}");
        }
        OutputFormat::Text => print!("{}", format_decode_text(report)),
    }
    Ok(())
}

fn collect_capture_files(dir: &Path, glob: Option<&str>) -> Result<Vec<PathBuf>> {
    let pattern = match glob {
        Some(value) => Some(Pattern::new(value).context("invalid glob pattern")?),
        None => None,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(pattern) = &pattern {
            let matches_path = pattern.matches_path(&path);
            let matches_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.matches(name));
            if !matches_path && !matches_name {
                continue;
            }
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}
