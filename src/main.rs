use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use slot_rebalance::clipboard::copy_to_clipboard;
use slot_rebalance::config::Config;
use slot_rebalance::display::{format_moves_with, print_plan, write_moves_to_file};
use slot_rebalance::parser::{extract_sku, load_snapshot, LoadedSnapshot};
use slot_rebalance::rebalance::{clear_defaults, rebalance, ClearOutcome, MoveRecord, Snapshot};

#[derive(Parser)]
#[command(name = "slot-rebalance")]
#[command(about = "Plan stock moves that close slot shortfalls for a SKU")]
struct Cli {
    /// Tier configuration file (TOML)
    #[arg(long, global = true, env = "SLOT_REBALANCE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct SnapshotArgs {
    /// Snapshot file (.csv or .json)
    snapshot: PathBuf,
    /// SKU the snapshot belongs to
    #[arg(long)]
    sku: Option<String>,
    /// Product card title to take the SKU from
    #[arg(long)]
    title: Option<String>,
    /// Copy the move lines to the clipboard
    #[arg(long)]
    copy: bool,
    /// Also write the move lines to this file
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan moves that resolve every shortfall in the snapshot
    Plan {
        #[command(flatten)]
        args: SnapshotArgs,
        /// Print the allocation as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Move all stock in default locations into the first primary slot
    Clear {
        #[command(flatten)]
        args: SnapshotArgs,
        /// Exact default-location names, overriding the configured exact-name tier
        #[arg(long = "target-exact")]
        target_exact: Vec<String>,
    },
    /// Serve the planner over HTTP
    Serve {
        #[arg(long, env = "SLOT_REBALANCE_PORT", default_value_t = 8080)]
        port: u16,
    },
}

fn load(args: &SnapshotArgs) -> Result<Snapshot> {
    let LoadedSnapshot { sku, entries, report } = load_snapshot(&args.snapshot)
        .with_context(|| format!("Failed to load snapshot {:?}", args.snapshot))?;

    if report.rows_dropped > 0 {
        warn!(dropped = report.rows_dropped, "Some snapshot rows were skipped");
    }
    info!(entries = entries.len(), "Loaded snapshot");

    let sku = args
        .sku
        .clone()
        .or_else(|| args.title.as_deref().and_then(extract_sku))
        .or(sku);
    let Some(sku) = sku else {
        bail!("No SKU given: pass --sku, --title, or a JSON snapshot with a sku field");
    };

    Ok(Snapshot { sku, entries })
}

fn deliver(moves: &[MoveRecord], args: &SnapshotArgs, config: &Config) -> Result<()> {
    let formatted = format_moves_with(moves, &config.delimiter);
    if formatted.is_empty() {
        return Ok(());
    }
    if args.copy {
        // the plan stands even if the clipboard is unavailable
        if let Err(err) = copy_to_clipboard(formatted.text()) {
            warn!("Could not copy to clipboard: {}", err);
        }
    }
    if let Some(path) = args.output.as_ref().or(config.output.as_ref()) {
        write_moves_to_file(moves, &config.delimiter, path)?;
        println!("Moves saved to {}", path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("slot_rebalance=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load_or_default(cli.config.as_deref()).context("Failed to load config")?;

    match cli.command {
        Commands::Plan { args, json } => {
            let snapshot = load(&args)?;
            let allocation = rebalance(&snapshot, &config.tier_config());

            if json {
                println!("{}", serde_json::to_string_pretty(&allocation)?);
            } else {
                print_plan(&snapshot.sku, &allocation, &config.delimiter);
            }

            deliver(&allocation.moves, &args, &config)?;
        }
        Commands::Clear { args, target_exact } => {
            let snapshot = load(&args)?;
            let exact_names = if target_exact.is_empty() {
                config.tier_config().default_exact_names()
            } else {
                target_exact.into_iter().collect()
            };

            match clear_defaults(&snapshot.entries, &exact_names, &snapshot.sku)? {
                ClearOutcome::NothingToMove => println!("Nothing to clear."),
                ClearOutcome::Cleared(moves) => {
                    println!("\n=== Clearing default locations for SKU {} ===", snapshot.sku);
                    println!("{}", format_moves_with(&moves, &config.delimiter).text());
                    deliver(&moves, &args, &config)?;
                }
            }
        }
        Commands::Serve { port } => {
            println!("Access the planner at http://localhost:{}", port);
            slot_rebalance::web::start_server(port, config.tier_config(), config.delimiter.clone()).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_target_exact_flag() {
        let cli = Cli::try_parse_from([
            "slot-rebalance",
            "clear",
            "snap.csv",
            "--target-exact",
            "CAMP0000",
            "--target-exact",
            "FISH0001",
        ])
        .unwrap();

        match cli.command {
            Commands::Clear { args, target_exact } => {
                assert_eq!(args.snapshot, PathBuf::from("snap.csv"));
                assert_eq!(target_exact, vec!["CAMP0000", "FISH0001"]);
            }
            _ => panic!("expected the clear subcommand"),
        }
    }

    #[test]
    fn test_clear_without_override() {
        let cli = Cli::try_parse_from(["slot-rebalance", "clear", "snap.json"]).unwrap();
        assert!(matches!(cli.command, Commands::Clear { target_exact, .. } if target_exact.is_empty()));
    }

    #[test]
    fn test_old_default_location_flag_is_rejected() {
        let result =
            Cli::try_parse_from(["slot-rebalance", "clear", "snap.csv", "--default-location", "X"]);
        assert!(result.is_err());
    }
}
