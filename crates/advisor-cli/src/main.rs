//! Fraud Expert - Main Entry Point

use advisor_cli::{demo_transaction, init_logging, run_session, LineAnswers};
use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use fraud_advisor::{AdvisorConfig, FraudAdvisor, FraudCatalog};
use rule_engine::{Facts, RuleSet};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// Interactive fraud detection expert system
#[derive(Debug, Parser)]
#[command(name = "fraud-expert", version, about)]
struct Args {
    /// Transaction facts as a JSON object (defaults to a built-in demo)
    #[arg(short, long)]
    transaction: Option<PathBuf>,

    /// Pre-supplied answers as a JSON object of question fact to boolean
    #[arg(short, long)]
    answers: Option<PathBuf>,

    /// Alternate rule table as a JSON array
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Advisor configuration file (TOML, JSON or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the question budget
    #[arg(long)]
    max_questions: Option<usize>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.log_json)?;

    info!("=== Fraud Expert v{} ===", env!("CARGO_PKG_VERSION"));

    let mut config = AdvisorConfig::load(args.config.as_deref())?;
    if let Some(max_questions) = args.max_questions {
        config.max_questions = max_questions;
    }

    let catalog = match &args.rules {
        Some(path) => {
            let text =
                fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            FraudCatalog::with_rules(RuleSet::from_json(&text)?)
        }
        None => FraudCatalog::builtin()?,
    };

    let transaction: Facts = match &args.transaction {
        Some(path) => read_json(path)?,
        None => demo_transaction(),
    };
    let auto_answers: HashMap<String, bool> = match &args.answers {
        Some(path) => read_json(path)?,
        None => HashMap::new(),
    };

    let max_questions = config.max_questions;
    let mut advisor = FraudAdvisor::new(&catalog, config);
    let mut source = LineAnswers::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let outcome = run_session(
        &mut advisor,
        &transaction,
        &auto_answers,
        &mut source,
        max_questions,
        &mut out,
    )?;

    info!(
        "Decision {} ({:.2}) after {} questions",
        outcome.decision.action, outcome.decision.confidence, outcome.questions_asked
    );
    Ok(())
}
