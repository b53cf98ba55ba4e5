// ABOUTME: FitCoach CLI - command-line front end for the assistant core
// ABOUTME: Sends chat turns, requests diet plans and injury analyses, inspects history
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Intelligence
//!
//! Usage:
//! ```bash
//! # One chat turn
//! fitcoach chat "How do I warm up for squats?"
//!
//! # Generate a diet plan
//! fitcoach diet --age 30 --gender male --weight-kg 70 --height-cm 175 --goal weight-loss
//!
//! # Analyze a training complaint, optionally with a photo
//! fitcoach injury "sharp pain in left knee when squatting" --image knee.jpg
//!
//! # Inspect and clear persisted history
//! fitcoach history chat
//! fitcoach clear diet
//! ```

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};

use fitcoach_assistant::assistant::Assistant;
use fitcoach_assistant::config::AssistantConfig;
use fitcoach_assistant::errors::{AppError, AppResult};
use fitcoach_assistant::models::{BiometricInput, Gender, Goal, InlineImage, Message};
use fitcoach_assistant::store::FileBackend;

#[derive(Parser)]
#[command(
    name = "fitcoach",
    about = "FitCoach assistant CLI",
    long_about = "Command-line front end for the FitCoach chat and diet-plan assistant core."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Data directory override
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Send one free-text chat turn
    Chat {
        /// The message to send
        text: String,
    },

    /// Request a fresh diet plan
    Diet {
        /// Age in years
        #[arg(long)]
        age: u32,
        /// Gender for the metabolic formula
        #[arg(long, value_enum)]
        gender: GenderArg,
        /// Body weight in kilograms
        #[arg(long)]
        weight_kg: f64,
        /// Height in centimeters
        #[arg(long)]
        height_cm: f64,
        /// Dietary goal
        #[arg(long, value_enum)]
        goal: GoalArg,
        /// Medical conditions to respect
        #[arg(long)]
        conditions: Option<String>,
    },

    /// Request an injury analysis
    Injury {
        /// Description of the complaint
        description: String,
        /// Path to a JPEG or PNG of the affected area
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Print a persisted history
    History {
        /// Which history to print
        #[arg(value_enum)]
        feature: FeatureArg,
    },

    /// Clear a persisted history
    Clear {
        /// Which history to clear
        #[arg(value_enum)]
        feature: FeatureArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum GenderArg {
    Male,
    Other,
}

#[derive(Clone, Copy, ValueEnum)]
enum GoalArg {
    WeightLoss,
    WeightGain,
}

#[derive(Clone, Copy, ValueEnum)]
enum FeatureArg {
    Chat,
    Diet,
}

#[tokio::main]
async fn main() -> AppResult<()> {
    fitcoach_assistant::logging::init();

    let cli = Cli::parse();
    let mut config = AssistantConfig::from_env()?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    let backend = Arc::new(FileBackend::new(&config.data_dir)?);
    let assistant = Assistant::new(&config, backend);

    match cli.command {
        Command::Chat { text } => {
            match assistant.send_chat(&text).await? {
                Some(reply) => println!("{}", reply.content),
                None => println!("(nothing to send)"),
            }
        }
        Command::Diet {
            age,
            gender,
            weight_kg,
            height_cm,
            goal,
            conditions,
        } => {
            let input = BiometricInput {
                age,
                gender: match gender {
                    GenderArg::Male => Gender::Male,
                    GenderArg::Other => Gender::Other,
                },
                weight_kg,
                height_cm,
                goal: match goal {
                    GoalArg::WeightLoss => Goal::WeightLoss,
                    GoalArg::WeightGain => Goal::WeightGain,
                },
                medical_conditions: conditions,
            };
            let outcome = assistant.request_diet_plan(&input).await?;
            println!("{}", outcome.message.content);
        }
        Command::Injury { description, image } => {
            let inline = match image {
                Some(path) => Some(load_image(&path)?),
                None => None,
            };
            let outcome = assistant.request_injury_analysis(&description, inline).await?;
            println!("{}", outcome.message.content);
        }
        Command::History { feature } => {
            let messages = match feature {
                FeatureArg::Chat => assistant.chat_history()?,
                FeatureArg::Diet => assistant.diet_history()?,
            };
            print_history(&messages);
        }
        Command::Clear { feature } => {
            match feature {
                FeatureArg::Chat => assistant.clear_chat_history()?,
                FeatureArg::Diet => assistant.clear_diet_history()?,
            }
            println!("cleared");
        }
    }

    Ok(())
}

fn load_image(path: &PathBuf) -> AppResult<InlineImage> {
    let bytes = fs::read(path)
        .map_err(|e| AppError::invalid_input(format!("cannot read {}: {e}", path.display())))?;
    let mime = match path.extension().and_then(|e| e.to_str()) {
        Some("png") => "image/png",
        _ => "image/jpeg",
    };
    Ok(InlineImage::from_bytes(mime, &bytes))
}

fn print_history(messages: &[Message]) {
    if messages.is_empty() {
        println!("(empty)");
        return;
    }
    for message in messages {
        println!(
            "[{}] {}: {}",
            message.timestamp.format("%Y-%m-%d %H:%M"),
            message.role.as_str(),
            message.content
        );
    }
}
