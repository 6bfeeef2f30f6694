use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use finmath_core::{assign_vendors, RegexVendorExtractor, Transaction};
use finmath_finance::{
    backfill, category_sums, cluster_sums, write_categorized, LabelTable, TextClassifier,
};
use finmath_ingest::load_transactions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

mod chart;
mod config;
mod logging;
mod report;
mod state;

use config::Config;
use report::SummaryOptions;

#[derive(Parser, Debug)]
#[command(
    name = "finmath",
    version,
    about = "Spending summary and booking-text classification for bank exports"
)]
struct Cli {
    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Overview statistics, top vendors, and category shares
    Summary {
        /// Bank export (defaults to input.csv from the config)
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Number of vendors listed (default: report.top_vendors)
        #[arg(long)]
        top: Option<usize>,

        /// Skip the terminal pie chart
        #[arg(long)]
        no_chart: bool,
    },

    /// Cluster uncategorized booking texts and back-fill their categories
    Classify {
        /// Bank export (defaults to input.csv from the config)
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Number of clusters; the label table must match
        #[arg(long)]
        clusters: Option<usize>,

        #[arg(long)]
        seed: Option<u64>,

        /// Label table TOML replacing the built-in one
        #[arg(long)]
        labels: Option<PathBuf>,

        /// Write the back-filled dataset as a `;`-delimited CSV
        #[arg(long)]
        output: Option<PathBuf>,

        /// Skip the terminal pie chart
        #[arg(long)]
        no_chart: bool,
    },

    /// Manage ~/.finmath/config.toml
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

struct ClassifyArgs {
    csv: Option<PathBuf>,
    clusters: Option<usize>,
    seed: Option<u64>,
    labels: Option<PathBuf>,
    output: Option<PathBuf>,
    no_chart: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Command::Summary { csv, top, no_chart } => {
            let cfg = config::load_config()?;
            run_summary(&cfg, csv, top, no_chart)?;
        }

        Command::Classify {
            csv,
            clusters,
            seed,
            labels,
            output,
            no_chart,
        } => {
            let cfg = config::load_config()?;
            run_classify(
                &cfg,
                ClassifyArgs {
                    csv,
                    clusters,
                    seed,
                    labels,
                    output,
                    no_chart,
                },
            )?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },
    }

    Ok(())
}

fn load_with_vendors(path: &Path) -> Result<Vec<Transaction>> {
    let mut records =
        load_transactions(path).with_context(|| format!("loading {}", path.display()))?;
    assign_vendors(&mut records, &RegexVendorExtractor::sepa()?);
    Ok(records)
}

fn run_summary(cfg: &Config, csv: Option<PathBuf>, top: Option<usize>, no_chart: bool) -> Result<()> {
    let path = csv.unwrap_or_else(|| cfg.input.csv.clone());
    let records = load_with_vendors(&path)?;

    let opts = SummaryOptions {
        head_rows: cfg.report.head_rows,
        top_vendors: top.unwrap_or(cfg.report.top_vendors),
    };
    let mut out = io::stdout().lock();
    report::write_summary(&mut out, &records, &opts)?;
    out.flush()?;

    if !no_chart {
        let chart = chart::category_chart(&category_sums(&records));
        chart::show_charts(&[chart])?;
    }
    Ok(())
}

fn run_classify(cfg: &Config, args: ClassifyArgs) -> Result<()> {
    let path = args.csv.unwrap_or_else(|| cfg.input.csv.clone());
    let records = load_with_vendors(&path)?;

    let labels = match args.labels.or_else(|| cfg.classifier.labels.clone()) {
        Some(p) => LabelTable::load(&p).with_context(|| format!("label table {}", p.display()))?,
        None => LabelTable::embedded()?,
    };

    let mut classifier_cfg = cfg.classifier.to_classifier_config();
    if let Some(k) = args.clusters {
        classifier_cfg.n_clusters = k;
    }
    if let Some(seed) = args.seed {
        classifier_cfg.seed = seed;
    }
    info!(
        clusters = classifier_cfg.n_clusters,
        seed = classifier_cfg.seed,
        "classifying {}",
        path.display()
    );

    let classifier = TextClassifier::new(classifier_cfg, labels)?;
    let classification = classifier.classify(&records)?;
    let categorized = backfill(&records, &classification);

    let mut out = io::stdout().lock();
    report::write_classification(&mut out, &classification, &categorized)?;

    if let Some(output) = &args.output {
        write_categorized(output, &categorized)?;
        writeln!(out, "Wrote {}", output.display())?;
    }
    out.flush()?;

    if !args.no_chart {
        let chart = chart::cluster_chart(&cluster_sums(&records, &classification.rows));
        chart::show_charts(&[chart])?;
    }
    Ok(())
}
