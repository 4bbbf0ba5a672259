use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tally_core::TransactionTable;
use tally_finance::{
    FinancialSummary, categorize_table, cumulative_cash_flow, expense_by_category, format_money,
    render_bars, render_pdf_report, write_statements_csv, write_summary_json,
    write_transactions_csv,
};
use tally_ingest::{IngestError, Ingestor, PdfStrategy};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod state;

use config::Config;

const CHART_WIDTH: usize = 40;

#[derive(Parser, Debug)]
#[command(
    name = "tally",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TALLY_BUILD_SHA"), ")"),
    about = "Turn bank statements into a transaction table and simple financial statements"
)]
struct Cli {
    /// Log progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct IngestArgs {
    /// Statement file (.csv, .xls, .xlsx, .xlsm, .ods, .pdf)
    file: PathBuf,

    /// How PDF text is turned into rows: lines | table
    #[arg(long)]
    strategy: Option<PdfStrategy>,

    /// Require Date, Description and Amount columns
    #[arg(long)]
    strict: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the transaction table from a statement
    Ingest {
        #[command(flatten)]
        args: IngestArgs,

        /// Print the table as JSON
        #[arg(long)]
        json: bool,
    },

    /// Categorize transactions and print statements, ratios and valuation
    Report {
        #[command(flatten)]
        args: IngestArgs,

        /// Write the one-page PDF report here
        #[arg(long)]
        pdf: Option<PathBuf>,

        /// Write transactions.csv, statements.csv and summary.json here
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage ~/.tally/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "tally=info" } else { "tally=warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // ingest failures stop the request with their own message
            match err.downcast_ref::<IngestError>() {
                Some(ingest_err) => eprintln!("Error: {ingest_err}"),
                None => eprintln!("Error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Ingest { args, json } => {
            let cfg = config::load_config()?;
            let table = ingest(&cfg, &args)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&table)?);
            } else {
                print_table(&table);
            }
        }

        Command::Report {
            args,
            pdf,
            out_dir,
            json,
        } => {
            let cfg = config::load_config()?;
            let mut table = ingest(&cfg, &args)?;
            categorize_table(&mut table);
            let summary = FinancialSummary::from_table(&table, &cfg.valuation);

            if json {
                write_summary_json(&summary, std::io::stdout().lock())?;
                println!();
            } else {
                print_report(&table, &summary);
            }

            if let Some(path) = pdf {
                let bytes = render_pdf_report(&summary)?;
                fs::write(&path, bytes).with_context(|| format!("write {}", path.display()))?;
                eprintln!("Wrote {}", path.display());
            }
            if let Some(dir) = out_dir {
                write_exports(&dir, &table, &summary)?;
                eprintln!("Wrote exports to {}", dir.display());
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },
    }

    Ok(())
}

fn ingest(cfg: &Config, args: &IngestArgs) -> Result<TransactionTable> {
    let mut section = cfg.ingest.clone();
    if let Some(strategy) = args.strategy {
        section.pdf_strategy = strategy;
    }
    if args.strict {
        section.strict_columns = true;
    }

    let ingestor = Ingestor::new(section.to_options());
    let table = ingestor.ingest_path(&args.file)?;
    info!(rows = table.len(), file = %args.file.display(), "ingested statement");
    Ok(table)
}

fn print_table(table: &TransactionTable) {
    let desc_width = table
        .iter()
        .map(|t| t.description.chars().count())
        .max()
        .unwrap_or(0)
        .clamp(11, 48);

    let mut header = format!("{:<10}  {:<desc_width$}  {:>14}", "Date", "Description", "Amount");
    for extra in &table.extra_headers {
        header.push_str(&format!("  {extra}"));
    }
    println!("{header}");

    for txn in table.iter() {
        let desc: String = txn.description.chars().take(desc_width).collect();
        let amount = txn.amount.map(format_money).unwrap_or_else(|| "-".to_string());
        let mut line = format!(
            "{:<10}  {:<desc_width$}  {:>14}",
            txn.date.format("%Y-%m-%d"),
            desc,
            amount
        );
        for extra in &txn.extras {
            line.push_str(&format!("  {extra}"));
        }
        println!("{line}");
    }
    println!("\n{} transactions", table.len());
}

fn print_section(title: &str, rows: &[(&str, f64)]) {
    println!("## {title}\n");
    for (label, value) in rows {
        println!("{label:<24}{:>16}", format_money(*value));
    }
    println!();
}

fn print_report(table: &TransactionTable, summary: &FinancialSummary) {
    let metrics = summary.metrics();
    println!("# Financial Report\n");
    println!("{} transactions\n", table.len());
    print_section("Income Statement", &metrics[0..3]);
    print_section("Balance Sheet", &metrics[3..6]);
    print_section("Ratios", &summary.ratios.rows());
    print_section("Valuation", &metrics[6..9]);

    println!("## Expenses by Category\n");
    let by_category = expense_by_category(table);
    if by_category.is_empty() {
        println!("(no expenses)\n");
    } else {
        let bars = render_bars(
            by_category.iter().map(|(cat, v)| (cat.label(), *v)),
            CHART_WIDTH,
        );
        println!("{bars}");
    }

    if let Some((date, balance)) = cumulative_cash_flow(table).last() {
        println!("Cumulative cash flow through {date}: {}", format_money(*balance));
    }
}

fn write_exports(dir: &Path, table: &TransactionTable, summary: &FinancialSummary) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;

    let create = |name: &str| {
        let p = dir.join(name);
        fs::File::create(&p).with_context(|| format!("create {}", p.display()))
    };
    write_transactions_csv(table, create("transactions.csv")?)?;
    write_statements_csv(summary, create("statements.csv")?)?;
    write_summary_json(summary, create("summary.json")?)?;
    Ok(())
}
