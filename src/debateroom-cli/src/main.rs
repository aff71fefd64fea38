//! DebateRoom CLI - timed debate agent
//!
//! Runs one room's debate between a human and an AI persona. Parameters
//! come from the `ROOM_METADATA` JSON record and/or command-line flags.

mod console;

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use debateroom_core::{
    Config, DebateEvent, DebateSupervisor, PersonaRegistry, RawDebateParameters, SessionState,
    default_config, resolve,
};
use tracing::warn;

use crate::console::ConsolePlatform;

#[derive(Parser)]
#[command(
    name = "debateroom",
    version,
    about = "Timed debate against an AI persona",
    long_about = "Runs a structured, timed debate between you and an AI persona. \
                  Debate parameters are read from ROOM_METADATA (JSON) and can be overridden by flags."
)]
struct Cli {
    /// Room identifier
    #[arg(long, value_name = "ROOM")]
    room: Option<String>,

    /// The topic to debate
    #[arg(long, value_name = "TOPIC")]
    topic: Option<String>,

    /// Persona key (e.g. socrates, einstein, jobs)
    #[arg(short, long, value_name = "PERSONA")]
    persona: Option<String>,

    /// Your stance: pro or con (the AI takes the other side)
    #[arg(short, long, value_name = "STANCE")]
    stance: Option<String>,

    /// Minutes per turn
    #[arg(short = 't', long, value_name = "MINUTES")]
    turn_duration: Option<u32>,

    /// Number of AI/human rounds
    #[arg(short, long, value_name = "ROUNDS")]
    rounds: Option<u32>,

    /// TOML settings file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// List the available personas and exit
    #[arg(long)]
    list_personas: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings: Config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => default_config(),
    };
    settings.apply_env(|key| env::var(key).ok());

    if cli.list_personas {
        for profile in PersonaRegistry::new(settings.voices.clone()).known() {
            println!(
                "  {:<12} {}",
                profile.persona.key().bright_cyan(),
                profile.display_name
            );
        }
        return Ok(());
    }

    if settings.reasoning_endpoint().1.is_empty() {
        warn!("OPENAI_API_KEY not set. API calls may fail.");
    }

    let metadata = match env::var("ROOM_METADATA") {
        Ok(json) if !json.trim().is_empty() => RawDebateParameters::from_json(&json)?,
        _ => RawDebateParameters::default(),
    };
    let raw = metadata.merge(RawDebateParameters {
        room: cli.room,
        topic: cli.topic,
        persona: cli.persona,
        stance: cli.stance,
        turn_duration_min: cli.turn_duration,
        total_rounds: cli.rounds,
    });
    let configuration = resolve(&raw)?;
    let persona = PersonaRegistry::new(settings.voices.clone()).lookup(configuration.persona_id());

    // Print header
    println!();
    println!("{}", "═".repeat(70).bright_blue());
    println!(
        "{}",
        format!("  {} - {}", "DebateRoom".bold(), persona.display_name)
            .bright_blue()
            .bold()
    );
    println!("{}", "═".repeat(70).bright_blue());
    println!();
    println!("{} {}", "Topic:".bold(), configuration.topic().bright_white());
    println!(
        "{} you argue {}, {} argues {}",
        "Stances:".bold(),
        configuration.human_stance().display_name().yellow(),
        persona.display_name.bright_cyan(),
        configuration.ai_stance().display_name().yellow()
    );
    println!(
        "{} {} rounds, {} minute(s) per turn",
        "Format:".bold(),
        configuration.total_rounds(),
        configuration.turn_duration_secs() / 60
    );
    println!("{}", "─".repeat(70).dimmed());

    let room = configuration.room().to_string();
    let mut supervisor = DebateSupervisor::new(Arc::new(ConsolePlatform), settings);
    let cancel = supervisor.launch(configuration, Some(create_console_callback()))?;

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("{}", "Interrupted: closing the debate...".yellow());
            cancel.cancel();
        }
    });

    let outcome = supervisor
        .join(&room)
        .await
        .ok_or_else(|| format!("No debate running for room '{}'", room))??;

    println!();
    println!("{}", "═".repeat(70).bright_blue());
    let summary = if outcome.cancelled {
        format!(
            "  Debate stopped after {} round(s).",
            outcome.rounds_completed
        )
        .yellow()
        .bold()
    } else {
        "  Debate concluded.".bright_green().bold()
    };
    println!("{}", summary);
    if outcome.relay_failures > 0 {
        println!(
            "  {}",
            format!("{} chat message(s) could not be delivered.", outcome.relay_failures).dimmed()
        );
    }
    println!("{}", "═".repeat(70).bright_blue());
    println!();

    Ok(())
}

/// Create a callback that prints debate progress to the console.
fn create_console_callback() -> Box<dyn Fn(DebateEvent) + Send + Sync> {
    Box::new(move |event| match event {
        DebateEvent::StateChanged {
            state: SessionState::AiTurn,
            round,
        } => {
            println!();
            println!(
                "{}",
                format!("  ROUND {}", round + 1).bright_magenta().bold()
            );
            println!();
        }
        DebateEvent::StateChanged {
            state: SessionState::Closing,
            ..
        } => {
            println!("{}", "  Closing the debate session...".dimmed());
        }
        DebateEvent::Utterance {
            event,
            delivered: false,
        } => {
            eprintln!(
                "{}",
                format!("  [chat] message from {} was not delivered", event.sender.label())
                    .yellow()
            );
        }
        _ => {}
    })
}
