// ABOUTME: Meal planner CLI generating a weekly plan from JSON catalog, profile and history files
// ABOUTME: Prints the plan outcome as JSON on stdout or writes it to a file
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors
//!
//! Usage:
//! ```bash
//! # Solver-first plan with a fixed daily target
//! mealplan generate --catalog recipes.json --profile profile.json --target target.json
//!
//! # Hybrid-first plan with targets calculated from the profile's body metrics
//! mealplan generate --catalog recipes.json --profile profile.json \
//!     --history history.json --calculate-target --policy hybrid
//!
//! # Fill the empty slots of an existing plan
//! mealplan repair --plan plan.json --profile profile.json --output repaired.json
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mealplan::catalog::JsonFileCatalog;
use mealplan::config::{ServiceConfig, DEFAULT_AUTO_MIN_LIKED};
use mealplan::logging::LoggingConfig;
use mealplan::planner::{PathPolicy, PlanGenerator, PlanOutcome, PlanRequest};
use mealplan::synthesizer::synthesizer_from_settings;
use mealplan::targets::{
    target_provider_from_settings, CalculatedTargetProvider, FixedTargetProvider,
    MacroTargetProvider,
};
use mealplan_core::models::{MacroTarget, PreferenceProfile, UserHistory, WeeklyPlan};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::fs;
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "mealplan",
    about = "Weekly meal plan generator",
    long_about = "Builds a seven-day meal plan from a recipe catalog, a preference profile and a ratings history."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Generate a weekly plan
    Generate {
        /// JSON array of recipes
        #[arg(long)]
        catalog: PathBuf,

        /// JSON preference profile
        #[arg(long)]
        profile: PathBuf,

        /// JSON history with liked, disliked and last_week id lists
        #[arg(long)]
        history: Option<PathBuf>,

        /// JSON daily target (`calorieTarget`, `macroTargets`)
        #[arg(long, conflicts_with = "calculate_target")]
        target: Option<PathBuf>,

        /// Calculate the daily target from the profile's body metrics
        #[arg(long)]
        calculate_target: bool,

        /// Path policy: solver, hybrid or auto (defaults to `MEALPLAN_PATH_POLICY`)
        #[arg(long)]
        policy: Option<String>,

        /// Write the outcome here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Fill the empty slots of an existing plan
    Repair {
        /// JSON weekly plan
        #[arg(long)]
        plan: PathBuf,

        /// JSON preference profile
        #[arg(long)]
        profile: PathBuf,

        /// Write the repaired plan here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if cli.verbose {
        logging.level = "debug".to_owned();
    }
    logging.init()?;

    let config = ServiceConfig::from_env()?;

    match cli.command {
        Command::Generate {
            catalog,
            profile,
            history,
            target,
            calculate_target,
            policy,
            output,
        } => {
            let profile: PreferenceProfile = read_json(&profile, "profile").await?;
            let history: UserHistory = match history {
                Some(path) => read_json(&path, "history").await?,
                None => UserHistory::default(),
            };
            let policy = match policy {
                Some(name) => PathPolicy::parse(&name, auto_min_liked(config.default_policy))?,
                None => config.default_policy,
            };
            let targets: Arc<dyn MacroTargetProvider> = match target {
                Some(path) => {
                    let fixed: MacroTarget = read_json(&path, "target").await?;
                    Arc::new(FixedTargetProvider::new(fixed))
                }
                None if calculate_target => Arc::new(CalculatedTargetProvider::new(
                    config.planner.targets.clone(),
                )),
                None => target_provider_from_settings(&config.llm, config.planner.targets.clone())?,
            };
            let recipes = JsonFileCatalog::new(catalog).load().await?;

            let outcome = match targets.target_for(&profile).await {
                Ok(target) => {
                    let generator = PlanGenerator::new(
                        config.planner.clone(),
                        synthesizer_from_settings(&config.llm)?,
                    );
                    let request = PlanRequest {
                        profile,
                        history,
                        target,
                        policy,
                    };
                    generator.generate(&recipes, request).await
                }
                Err(e) => {
                    warn!(provider = targets.name(), error = %e, "Daily targets unavailable");
                    PlanOutcome::targets_unavailable(&e)
                }
            };

            emit(&outcome, output.as_deref()).await?;
            Ok(if outcome.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Repair {
            plan,
            profile,
            output,
        } => {
            let mut weekly: WeeklyPlan = read_json(&plan, "plan").await?;
            let profile: PreferenceProfile = read_json(&profile, "profile").await?;
            let generator =
                PlanGenerator::new(config.planner.clone(), synthesizer_from_settings(&config.llm)?);
            let report = generator.repair(&mut weekly, &profile).await?;
            info!(
                filled_slots = report.filled_slots,
                repaired_days = report.repaired_days,
                "Repair finished"
            );
            emit(&weekly, output.as_deref()).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Liked-recipe threshold for `--policy auto`
const fn auto_min_liked(default_policy: PathPolicy) -> usize {
    match default_policy {
        PathPolicy::Auto { min_liked } => min_liked,
        PathPolicy::SolverFirst | PathPolicy::HybridFirst => DEFAULT_AUTO_MIN_LIKED,
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {what} file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid {what} JSON in {}", path.display()))
}

async fn emit<T: Serialize + Sync>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            fs::write(path, json)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "Outcome written");
        }
        None => println!("{json}"),
    }
    Ok(())
}
