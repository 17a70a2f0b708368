// ============================================================================
// travel-admin — CLI for the travel admin backend
// ============================================================================
// Usage:
//   travel-admin show                               Print the reward configuration
//   travel-admin seed                               Create the default configuration
//   travel-admin update --patch JSON | --file PATH  Apply a partial update
//   travel-admin add-redemption --points N --reward LABEL --value N
//   travel-admin tier --points N                    Tier and discount for a balance
//   travel-admin gate --path P [--cookie C] [--authorization A]
//   travel-admin serve [--bind ADDR]                Run the gated admin endpoint
// ============================================================================

use anyhow::{Context, Result};
use chrono::SecondsFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use travel_core::server::request_path;
use travel_core::{
    AccessGate, AdminDb, AdminServer, AppConfig, GateDecision, PartialRewardConfiguration,
    RedemptionOption, RewardError, RewardRepository,
};

/// Travel admin backend tool
#[derive(Parser)]
#[command(
    name = "travel-admin",
    version,
    about = "Manage loyalty rewards and the admin access gate"
)]
struct Cli {
    /// Path to the database file (default: ~/.travel-admin/admin.redb)
    #[arg(long, global = true)]
    db_path: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current reward configuration as JSON
    Show,

    /// Create the default reward configuration if none exists
    Seed,

    /// Apply a partial update (camelCase JSON, nested objects merge per field)
    Update {
        /// Patch document inline
        #[arg(long, conflicts_with = "file")]
        patch: Option<String>,

        /// Read the patch document from a file
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Append a row to the redemption catalog
    AddRedemption {
        /// Points the reward costs
        #[arg(long)]
        points: f64,

        /// Reward label shown to customers
        #[arg(long)]
        reward: String,

        /// Monetary value of the reward
        #[arg(long)]
        value: f64,

        /// Add the row disabled
        #[arg(long)]
        inactive: bool,
    },

    /// Show the tier and discount a point balance earns
    Tier {
        #[arg(long)]
        points: f64,
    },

    /// Evaluate the admin access gate for a request
    Gate {
        /// Request target, e.g. /admin/dashboard/bookings?tab=hotels
        #[arg(long)]
        path: String,

        /// Raw Cookie header value
        #[arg(long)]
        cookie: Option<String>,

        /// Raw Authorization header value
        #[arg(long)]
        authorization: Option<String>,
    },

    /// Run the gated admin HTTP endpoint
    Serve {
        /// Bind address (default: TRAVEL_ADMIN_BIND or 127.0.0.1:8787)
        #[arg(long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: Could not load .env file: {}", e);
    }

    // Logs go to stderr so JSON output on stdout stays clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("travel_core=info".parse()?)
                .add_directive("travel_admin=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::default();

    // The gate needs no database
    if let Commands::Gate { path, cookie, authorization } = &cli.command {
        return cmd_gate(&config, path, cookie.as_deref(), authorization.as_deref());
    }

    let db = AdminDb::open(cli.db_path.as_deref())?.with_policy(config.validation_policy());

    match cli.command {
        Commands::Show => cmd_show(&db).await,
        Commands::Seed => cmd_seed(&db).await,
        Commands::Update { patch, file } => cmd_update(&db, patch, file).await,
        Commands::AddRedemption {
            points,
            reward,
            value,
            inactive,
        } => cmd_add_redemption(&db, points, reward, value, inactive).await,
        Commands::Tier { points } => cmd_tier(&db, points).await,
        Commands::Serve { bind } => cmd_serve(db, &config, bind).await,
        Commands::Gate { .. } => Ok(()),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn report(err: RewardError) -> anyhow::Error {
    match err {
        RewardError::Validation(errors) => {
            let mut msg = String::from("Update rejected, nothing was changed:");
            for violation in &errors.violations {
                msg.push_str(&format!("\n  - {}", violation));
            }
            anyhow::anyhow!(msg)
        }
        other => other.into(),
    }
}

async fn cmd_show(db: &AdminDb) -> Result<()> {
    let config = db.get().await?;
    print_json(&config)
}

async fn cmd_seed(db: &AdminDb) -> Result<()> {
    let existed = db.load_rewards()?.is_some();
    let config = db.get().await?;

    if existed {
        let stamp = config.last_updated.to_rfc3339_opts(SecondsFormat::Secs, true);
        println!("Reward configuration already exists (last updated {})", stamp);
    } else {
        println!("Created default reward configuration in {}", db.path().display());
    }
    Ok(())
}

async fn cmd_update(db: &AdminDb, patch: Option<String>, file: Option<PathBuf>) -> Result<()> {
    let raw = match (patch, file) {
        (Some(inline), _) => inline,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read patch file {}", path.display()))?,
        (None, None) => anyhow::bail!("Provide a patch with --patch JSON or --file PATH"),
    };

    let patch: PartialRewardConfiguration =
        serde_json::from_str(&raw).context("Patch is not a valid reward configuration document")?;
    if patch.is_empty() {
        anyhow::bail!("Patch does not set any field");
    }

    let config = db.update(patch).await.map_err(report)?;
    print_json(&config)
}

async fn cmd_add_redemption(
    db: &AdminDb,
    points: f64,
    reward: String,
    value: f64,
    inactive: bool,
) -> Result<()> {
    let mut options = db.get().await?.redemption_options;
    options.push(RedemptionOption {
        is_active: !inactive,
        ..RedemptionOption::new(points, reward, value)
    });

    let patch = PartialRewardConfiguration {
        redemption_options: Some(options),
        ..Default::default()
    };
    let config = db.update(patch).await.map_err(report)?;

    info!("Redemption catalog now has {} rows", config.redemption_options.len());
    print_json(&config.redemption_options)
}

async fn cmd_tier(db: &AdminDb, points: f64) -> Result<()> {
    let config = db.get().await?;

    match config.tier_for_points(points) {
        Some(tier) => {
            println!("Tier:      {}", tier.display_name());
            println!("Discount:  {}%", config.discount_for(tier));
            println!("Priority:  {}", config.has_priority(tier));
        }
        None => {
            println!(
                "No tier yet: {} more points needed for Silver",
                config.tier_requirements.silver - points
            );
        }
    }

    let affordable = config.affordable_redemptions(points);
    println!("Redeemable rewards: {}", affordable.len());
    for option in affordable {
        println!("  {:>8} pts  {}  (value {})", option.points, option.reward, option.value);
    }
    Ok(())
}

fn cmd_gate(
    config: &AppConfig,
    target: &str,
    cookie: Option<&str>,
    authorization: Option<&str>,
) -> Result<()> {
    match gate_decision(config, target, cookie, authorization) {
        GateDecision::Redirect { target } => println!("redirect {}", target),
        GateDecision::PassThrough => println!("pass-through"),
    }
    Ok(())
}

/// Gate a raw request target the way the server does: query stripped, dot
/// segments resolved
fn gate_decision(
    config: &AppConfig,
    target: &str,
    cookie: Option<&str>,
    authorization: Option<&str>,
) -> GateDecision {
    let gate = AccessGate::new(config.gate_config());
    gate.evaluate_request(&request_path(target), cookie, authorization)
}

async fn cmd_serve(db: AdminDb, config: &AppConfig, bind: Option<String>) -> Result<()> {
    let bind_addr = bind.unwrap_or_else(|| config.bind_addr.clone());
    let server = Arc::new(AdminServer::new(AccessGate::new(config.gate_config()), Arc::new(db)));

    info!("Serving rewards at {}", server.rewards_route());
    server.serve(&bind_addr).await
}
