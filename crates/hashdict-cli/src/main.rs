#![allow(clippy::doc_markdown)]
//! `hashdict` CLI: load a complex-key dictionary from CSV and query it.
//!
//! Usage:
//!   `hashdict -c vat.toml -d vat.csv get rate --key FR,1 --key DE,1`
//!   `hashdict -c vat.toml -d vat.csv has --key FR,1`
//!   `hashdict -c vat.toml -d vat.csv dump --format csv`
//!   `hashdict -c vat.toml -d vat.csv stats --format json`

mod csv_source;
mod keys;
#[cfg(test)]
mod keys_tests;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hashdict_core::{DictionaryConfig, HashedDictionary, LoggingConfig, Value};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::csv_source::CsvSource;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "hashdict")]
#[command(author, version, about = "hashdict CLI - composite-key dictionary lookups")]
#[command(propagate_version = true)]
struct Cli {
    /// Dictionary configuration (TOML)
    #[arg(short, long, env = "HASHDICT_CONFIG")]
    config: PathBuf,

    /// Data file (CSV): key columns, then attributes
    #[arg(short, long, env = "HASHDICT_DATA")]
    data: PathBuf,

    /// The data file has no header line
    #[arg(long)]
    no_header: bool,

    /// Field delimiter of the data file
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Rows per block read from the data file
    #[arg(long, default_value_t = csv_source::DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up one attribute for each key
    Get {
        /// Attribute name
        attribute: String,

        /// Key tuple as a CSV record, e.g. `FR,1` (repeatable)
        #[arg(short, long = "key", required = true)]
        keys: Vec<String>,

        /// Value for missing keys instead of the attribute's null value
        #[arg(long)]
        default: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Check which keys are present
    Has {
        /// Key tuple as a CSV record (repeatable)
        #[arg(short, long = "key", required = true)]
        keys: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Print the whole dictionary
    Dump {
        /// Rows per block read from the dictionary
        #[arg(long, default_value = "1024")]
        block_size: usize,

        /// Stop after this many rows
        #[arg(long)]
        limit: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show dictionary statistics
    Stats {
        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn load(cli: &Cli, config: &DictionaryConfig) -> Result<HashedDictionary> {
    let delimiter = u8::try_from(cli.delimiter)
        .with_context(|| format!("delimiter '{}' is not a single-byte character", cli.delimiter))?;
    let source = CsvSource::new(&cli.data, config.structure.column_types())
        .with_headers(!cli.no_header)
        .with_delimiter(delimiter)
        .with_batch_size(cli.batch_size);
    tracing::info!(
        dictionary = %config.name,
        data = %source.path().display(),
        "loading dictionary"
    );
    HashedDictionary::from_config(config, Box::new(source))
        .with_context(|| format!("failed to load dictionary '{}'", config.name))
}

fn run(cli: &Cli) -> Result<String> {
    let config = DictionaryConfig::load_from_path(&cli.config)
        .with_context(|| format!("failed to read {}", cli.config.display()))?;
    init_logging(&config.logging);
    let dictionary = load(cli, &config)?;

    match &cli.command {
        Commands::Get {
            attribute,
            keys,
            default,
            format,
        } => {
            let key_columns = crate::keys::parse_keys(keys, dictionary.structure())?;
            let values = match default {
                Some(text) => dictionary.get_column_or(attribute, &key_columns, &Value::from(text.as_str()))?,
                None => dictionary.get_column(attribute, &key_columns)?,
            };
            let rows: Vec<Vec<Value>> = keys
                .iter()
                .enumerate()
                .map(|(row, key)| {
                    vec![
                        Value::from(key.as_str()),
                        values.get(row).unwrap_or_else(|| Value::from("")),
                    ]
                })
                .collect();
            output::render_rows(&["key".to_string(), attribute.clone()], &rows, *format)
        }
        Commands::Has { keys, format } => {
            let key_columns = crate::keys::parse_keys(keys, dictionary.structure())?;
            let found = dictionary.has(&key_columns)?;
            let rows: Vec<Vec<Value>> = keys
                .iter()
                .zip(found)
                .map(|(key, present)| vec![Value::from(key.as_str()), Value::UInt8(u8::from(present))])
                .collect();
            output::render_rows(&["key".to_string(), "present".to_string()], &rows, *format)
        }
        Commands::Dump {
            block_size,
            limit,
            format,
        } => {
            let blocks = dictionary.iterate_all(*block_size);
            let names: Vec<String> = blocks.column_names().into_iter().map(str::to_string).collect();
            let limit = limit.unwrap_or(usize::MAX);
            let mut rows = Vec::new();
            for block in blocks {
                if rows.len() >= limit {
                    break;
                }
                rows.extend(output::block_rows(&block?));
            }
            rows.truncate(limit);
            output::render_rows(&names, &rows, *format)
        }
        Commands::Stats { format } => output::render_stats(&dictionary.stats(), *format),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let rendered = run(&cli)?;
    print!("{rendered}");
    if !rendered.ends_with('\n') {
        println!();
    }
    Ok(())
}
