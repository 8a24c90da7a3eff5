use clap::Parser;
use tradetrail::application::evaluate::EvaluationRequest;
use tradetrail::cli::commands::{Cli, Commands};
use tradetrail::domain::ports::plan_repository::PlanFilter;
use tradetrail::domain::values::close_reason::ClosedReason;
use tradetrail::domain::values::pattern::PatternId;
use tradetrail::domain::entities::trade_plan::PlanStatus;
use tradetrail::domain::values::timeframe::Timeframe;
use tradetrail::TradeTrail;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tradetrail=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let db_path = std::env::var("TRADETRAIL_DB").unwrap_or_else(|_| "./tradetrail.db".into());

    let tt = match TradeTrail::new(&db_path) {
        Ok(tt) => tt,
        Err(e) => {
            eprintln!("Error initializing tradetrail: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_command(tt, cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_command(tt: TradeTrail, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Evaluate {
            address,
            chain,
            timeframe,
            equity,
            risk,
        } => {
            let timeframe: Timeframe = timeframe.parse().map_err(|e: String| e)?;
            let report = tt
                .evaluate(&EvaluationRequest {
                    address,
                    chain,
                    timeframe,
                    account_equity: equity,
                    risk_percent: risk,
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Plans {
            status,
            pattern,
            limit,
        } => {
            let status: Option<PlanStatus> =
                status.map(|s| s.parse()).transpose().map_err(|e: String| e)?;
            let pattern: Option<PatternId> =
                pattern.map(|p| p.parse()).transpose().map_err(|e: String| e)?;
            let plans = tt.plans(&PlanFilter {
                status,
                pattern,
                limit: Some(limit),
            })?;
            println!("{}", serde_json::to_string_pretty(&plans)?);
        }
        Commands::Activate { id } => {
            let plan = tt.activate_plan(&id)?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Commands::Close {
            id,
            exit_price,
            reason,
        } => {
            let reason: ClosedReason = reason.parse().map_err(|e: String| e)?;
            let (plan, outcome) = tt.close_plan(&id, exit_price, reason)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "plan": plan,
                    "outcome": outcome,
                }))?
            );
        }
        Commands::Cancel { id } => {
            let plan = tt.cancel_plan(&id)?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Commands::Nodes { plan_id } => {
            let nodes = tt.plan_nodes(&plan_id)?;
            println!("{}", serde_json::to_string_pretty(&nodes)?);
        }
        Commands::Replay { plan_id } => {
            let summary = tt.replay(&plan_id)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Signals { pattern, limit } => {
            let pattern: PatternId = pattern.parse().map_err(|e: String| e)?;
            let signals = tt.signals_for_pattern(pattern, limit)?;
            println!("{}", serde_json::to_string_pretty(&signals)?);
        }
        Commands::Lessons => {
            let lessons = tt.lessons()?;
            println!("{}", serde_json::to_string_pretty(&lessons)?);
        }
        Commands::ExtractLessons => {
            let lessons = tt.extract_lessons()?;
            println!("{}", serde_json::to_string_pretty(&lessons)?);
        }
    }
    Ok(())
}
