mod db;
mod error;
mod export;
mod parser;
mod pipeline;
mod settings;
mod sink;
mod source;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use indicatif::HumanDuration;
use tracing::info;

use pipeline::{page_source, publish};
use settings::Settings;
use sink::{read_query, Sink};

#[derive(Parser)]
#[command(
    name = "stadium_flow",
    about = "Football stadiums by capacity: scrape, clean, load, query"
)]
struct Cli {
    /// Settings file (default: stadium_flow.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, clean, write CSV, load the database, run the query and export it
    Run {
        /// Read the page from a local HTML file instead of fetching it
        #[arg(long)]
        html: Option<PathBuf>,
    },
    /// Fetch, clean and write the CSV only
    Extract {
        /// Read the page from a local HTML file instead of fetching it
        #[arg(long)]
        html: Option<PathBuf>,
    },
    /// Run the query file against the loaded table and export the result
    Query,
    /// Show table statistics
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    let result = match cli.command {
        Commands::Run { html } => {
            let out = publish(&settings, &page_source(&settings, html), true).await?;
            println!("Saved {} records to {}", out.records, out.output_csv.display());
            if let Some(loaded) = out.loaded {
                println!("Loaded {} rows into stadiums", loaded);
            }
            run_query(&settings, &out.sink)
        }
        Commands::Extract { html } => {
            let out = publish(&settings, &page_source(&settings, html), false).await?;
            println!("Saved {} records to {}", out.records, out.output_csv.display());
            Ok(())
        }
        Commands::Query => {
            let sink = Sink::open(&settings)?;
            run_query(&settings, &sink)
        }
        Commands::Stats => {
            let sink = Sink::open(&settings)?;
            let s = sink.stats()?;
            println!("Stadiums:  {}", s.total);
            println!("Countries: {}", s.countries);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", HumanDuration(elapsed));
    }

    result
}

fn run_query(settings: &Settings, sink: &Sink) -> anyhow::Result<()> {
    let sql = read_query(&settings.query_path)?;
    let result = sink.run_query(&sql)?;
    info!("Query columns: {}", result.columns.join(", "));
    let path = sink.export_results(&result.rows)?;

    if result.rows.is_empty() {
        println!("Query returned no rows.");
    } else {
        println!("{:>3} | {:<32} | {:>10} | {:<20}", "#", "Stadium", "Capacity", "Country");
        println!("{}", "-".repeat(74));
        for (i, row) in result.rows.iter().take(20).enumerate() {
            let cell = |n: usize| row.get(n).map(String::as_str).unwrap_or("");
            println!(
                "{:>3} | {:<32} | {:>10} | {:<20}",
                i + 1,
                clip(cell(1), 32),
                cell(2),
                clip(cell(4), 20)
            );
        }
    }
    println!(
        "\n{} query rows saved to {}",
        result.rows.len(),
        path.display()
    );
    Ok(())
}

/// Shorten `s` to `width` characters, marking the cut with an ellipsis.
fn clip(s: &str, width: usize) -> String {
    match s.char_indices().nth(width) {
        Some((cut, _)) => format!("{}…", &s[..cut]),
        None => s.to_string(),
    }
}
