use clap::{Parser, Subcommand};
use tracing::info;

use review_explorer::{Result, normalize, record, report};

#[derive(Parser)]
#[command(name = "review-explorer")]
#[command(about = "Review dataset normalizer and descriptive statistics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a review file and compute the summary battery.
    Report {
        /// Newline-delimited JSON review file.
        #[arg(long, default_value = "data/reviews.json")]
        input: String,

        /// Where to write the JSON summary; stdout when omitted.
        #[arg(short = 'o', long)]
        out: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Report { input, out } => {
            // 1) Parse: every non-blank line must be a valid record, or the
            //    whole load aborts.
            let records = record::parse_records(&input)?;
            info!(records = records.len(), file = %input, "parsed input");

            // 2) Normalize into the canonical table.
            let table = normalize::normalize(&records)?;
            info!(
                rows = table.row_count(),
                columns = table.columns().len(),
                "built canonical table"
            );

            // 3) Aggregate.
            let summary = report::build_summary(&table)?;

            // 4) Emit.
            let json = serde_json::to_string_pretty(&summary)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    println!("Wrote {}", path);
                }
                None => println!("{}", json),
            }
        }
    }

    Ok(())
}
