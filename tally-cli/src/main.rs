use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use tally_core::parse_flexible_date;
use tally_ingest::{
    format_for_import, CreditCardParser, ExtractedTransaction, FormatRegistry, ParsedStatement,
    ProviderConfig, StatementParser,
};

mod config;
mod state;

#[derive(Parser, Debug)]
#[command(name = "tally", version, about = "Tally statement extraction CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a statement PDF and print the extracted result as JSON
    Parse {
        /// Statement file (PDF, or pre-extracted text with --text)
        file: PathBuf,

        /// Force a format key instead of auto-detecting
        #[arg(long)]
        format: Option<String>,

        /// Parse as a credit-card statement (best-score provider detection)
        #[arg(long)]
        credit_card: bool,

        /// Treat the input file as already-extracted text
        #[arg(long)]
        text: bool,

        /// Write extracted transactions to a CSV file
        #[arg(long)]
        csv_out: Option<PathBuf>,
    },

    /// Manage statement format configs
    Formats {
        #[command(subcommand)]
        command: FormatsCommand,
    },

    /// Write the default config to ~/.tally/config.toml
    Init,
}

#[derive(Subcommand, Debug)]
enum FormatsCommand {
    /// List registered format keys
    List {
        /// List credit-card providers instead of statement formats
        #[arg(long)]
        credit_card: bool,
    },

    /// Show one format config as JSON
    Show {
        key: String,

        #[arg(long)]
        credit_card: bool,
    },

    /// Register a custom format from a JSON file and persist it
    Add {
        key: String,

        /// JSON file containing a single provider config object
        #[arg(long)]
        file: PathBuf,

        #[arg(long)]
        credit_card: bool,
    },
}

fn main() -> Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    let cfg = config::load_config()?;

    match cli.command {
        Command::Parse {
            file,
            format,
            credit_card,
            text,
            csv_out,
        } => {
            if credit_card {
                parse_credit_card(&cfg, &file, text, csv_out.as_deref())?;
            } else {
                parse_statement(&cfg, &file, format.as_deref(), text, csv_out.as_deref())?;
            }
        }

        Command::Formats { command } => match command {
            FormatsCommand::List { credit_card } => {
                let registry = load_registry(&cfg, credit_card);
                if registry.is_empty() {
                    println!("No formats registered (check source paths in config.toml)");
                }
                for key in registry.keys() {
                    if let Some(format) = registry.get(key) {
                        println!("{key}  {}  [{:?}]", format.name, format.kind);
                    }
                }
            }

            FormatsCommand::Show { key, credit_card } => {
                let registry = load_registry(&cfg, credit_card);
                let Some(format) = registry.get(&key) else {
                    bail!("Unknown format: {key}");
                };
                println!("{}", serde_json::to_string_pretty(format)?);
            }

            FormatsCommand::Add {
                key,
                file,
                credit_card,
            } => {
                let raw = fs::read_to_string(&file)
                    .with_context(|| format!("read {}", file.display()))?;
                let format: ProviderConfig = serde_json::from_str(&raw)
                    .with_context(|| format!("parse {}", file.display()))?;

                let mut registry = load_registry(&cfg, credit_card);
                registry
                    .add(key.as_str(), format)
                    .with_context(|| format!("register format '{key}'"))?;
                println!("Registered format '{key}'");
            }
        },

        Command::Init => {
            config::init_config()?;
        }
    }

    Ok(())
}

fn load_registry(cfg: &config::Config, credit_card: bool) -> FormatRegistry {
    if credit_card {
        FormatRegistry::load(&cfg.formats.credit_card_sources)
    } else {
        FormatRegistry::load(&cfg.formats.statement_sources)
    }
}

fn parse_credit_card(
    cfg: &config::Config,
    file: &Path,
    text: bool,
    csv_out: Option<&Path>,
) -> Result<()> {
    let parser = CreditCardParser::new(load_registry(cfg, true));

    let statement = if text {
        let raw = fs::read_to_string(file).with_context(|| format!("read {}", file.display()))?;
        parser.parse_text(&raw)
    } else {
        match parser.parse_file(file) {
            Ok(statement) => statement,
            Err(e) => return print_error(e),
        }
    };

    let summary = format_for_import(&statement);
    println!("{}", serde_json::to_string_pretty(&summary)?);
    println!(
        "\nParsed {} transactions from {} ({})",
        summary.total_transactions,
        file.display(),
        summary.provider
    );

    if let Some(csv_path) = csv_out {
        write_transactions_csv(csv_path, &statement.transactions)?;
        println!("Wrote {} rows to {}", statement.transactions.len(), csv_path.display());
    }
    Ok(())
}

fn parse_statement(
    cfg: &config::Config,
    file: &Path,
    format: Option<&str>,
    text: bool,
    csv_out: Option<&Path>,
) -> Result<()> {
    let parser = StatementParser::new(load_registry(cfg, false));

    let parsed = if text {
        let raw = fs::read_to_string(file).with_context(|| format!("read {}", file.display()))?;
        parser.parse_text(&raw, format)
    } else {
        match parser.parse_file(file, format) {
            Ok(parsed) => parsed,
            Err(e) => return print_error(e),
        }
    };

    println!("{}", serde_json::to_string_pretty(&parsed)?);

    if let Some(csv_path) = csv_out {
        match &parsed {
            ParsedStatement::Banking(statement) => {
                write_transactions_csv(csv_path, &statement.transactions)?;
                println!(
                    "Wrote {} rows to {}",
                    statement.transactions.len(),
                    csv_path.display()
                );
            }
            ParsedStatement::Investment(_) => {
                println!("No transactions to export (investment statement)");
            }
        }
    }
    Ok(())
}

/// Mirror the engine's error contract on stdout: consumers scripting the CLI
/// get either a structured result or a single error record.
fn print_error(e: tally_ingest::IngestError) -> Result<()> {
    println!("{}", serde_json::json!({ "error": e.to_string() }));
    std::process::exit(1);
}

/// Write transactions as CSV for the downstream import layer, normalizing
/// dates to ISO where the shape allows.
fn write_transactions_csv(path: &Path, transactions: &[ExtractedTransaction]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("open {}", path.display()))?;
    writer.write_record(["date", "description", "amount"])?;

    for transaction in transactions {
        let date = parse_flexible_date(&transaction.date)
            .map(|d| d.to_string())
            .unwrap_or_else(|| transaction.date.clone());
        writer.write_record([
            date.as_str(),
            transaction.description.as_str(),
            transaction.amount.as_str(),
        ])?;
    }

    writer.flush().context("flush csv")?;
    Ok(())
}
