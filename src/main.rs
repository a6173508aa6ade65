//! `lingo` command-line front-end.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] (defaults on first run, or `--config`).
//! 3. Load the JSON store snapshot (`--store`, default in the data dir).
//! 4. Run the subcommand; commands that write records save the snapshot.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use lingo_engine::{
    anki::{AnkiClient, DeckCache},
    chat::{presets, ChatOrchestrator, Conversation, ConversationType, ReplyKind},
    config::{AppConfig, AppPaths},
    export::{RecordingExporter, TargetType},
    llm::BackendResolver,
    prompt::PromptAssembler,
    provider,
    speech::{AzureSynthesizer, SpeechService, VoiceRoster},
    store::{ConversationStore, MemoryStore},
};

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(Debug, Parser)]
#[command(name = "lingo", version, about = "Language-learning conversation engine")]
struct Cli {
    /// Settings file (defaults to the platform config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON store snapshot (defaults to the platform data directory).
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List conversation presets and completion providers.
    Presets,
    /// Create a conversation from a preset and print its id.
    New {
        #[arg(long)]
        preset: String,
    },
    /// Send one message to a conversation and print the replies.
    Chat {
        #[arg(long)]
        conversation: String,
        message: String,
    },
    /// Export the best attempt of every sentence of a target.
    Export {
        #[arg(long)]
        target: String,
        #[arg(long = "type", value_enum, default_value = "audio")]
        target_type: TargetKind,
    },
    /// Show per-sentence recording statistics of a target.
    Stats {
        #[arg(long)]
        target: String,
        #[arg(long = "type", value_enum, default_value = "audio")]
        target_type: TargetKind,
    },
    /// Summarise recording activity over the last few days.
    Activity {
        #[arg(long, default_value_t = 7)]
        days: i64,
    },
    /// Synchronise the flashcard collection with its remote account.
    AnkiSync,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TargetKind {
    Audio,
    Video,
}

impl From<TargetKind> for TargetType {
    fn from(kind: TargetKind) -> Self {
        match kind {
            TargetKind::Audio => TargetType::Audio,
            TargetKind::Video => TargetType::Video,
        }
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn print_presets() {
    println!("Presets:");
    for preset in presets::presets() {
        let kind = match preset.conversation_type {
            ConversationType::Gpt => "gpt",
            ConversationType::Tts => "tts",
        };
        println!(
            "  {:<20} {:<28} {} ({kind})",
            preset.key, preset.name, preset.engine
        );
    }

    println!("\nProviders:");
    for info in provider::providers() {
        let models = if info.available_models.is_empty() {
            "any local model".to_string()
        } else {
            info.available_models.join(", ")
        };
        println!("  {:<10} {:<10} {models}", info.engine.id(), info.display_name);
    }
}

async fn new_conversation(store: &MemoryStore, key: &str) -> Result<()> {
    let preset = presets::find(key).ok_or_else(|| anyhow!("unknown preset {key:?}"))?;
    let conversation = Conversation::from_preset(preset);
    println!("{}", conversation.id);
    store.save_conversation(conversation).await?;
    Ok(())
}

async fn chat(
    config: &AppConfig,
    store: Arc<MemoryStore>,
    conversation_id: &str,
    message: &str,
) -> Result<()> {
    let conversation = store
        .conversation(conversation_id)
        .await?
        .ok_or_else(|| anyhow!("conversation {conversation_id} not found"))?;

    let decks = Arc::new(DeckCache::from_config(&config.anki));
    let prompts = PromptAssembler::new(decks, config.learning_language.clone());
    let resolver = Arc::new(BackendResolver::from_config(&config.providers));
    let mut orchestrator = ChatOrchestrator::new(store.clone(), resolver, prompts);

    if conversation.conversation_type == ConversationType::Tts {
        let synthesizer = AzureSynthesizer::new(reqwest::Client::new(), &config.azure);
        orchestrator = orchestrator.with_speech(SpeechService::new(
            Arc::new(synthesizer),
            store.clone(),
            VoiceRoster::new(config.speech.voices.clone()),
            config.learning_language.clone(),
        ));
    }

    let replies = orchestrator.chat(&conversation, message).await?;
    for reply in &replies {
        if reply.kind == ReplyKind::Degraded {
            eprintln!("(backend unavailable, showing the prompt instead)");
        }
        println!("{}", reply.message.content);
        if let Some(speech) = &reply.speech {
            eprintln!("(speech {} saved, {} bytes)", speech.id, speech.audio.len());
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("lingo {} starting up", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let paths = AppPaths::new();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => AppConfig::load().unwrap_or_else(|e| {
            log::warn!("Failed to load config ({e}); using defaults");
            AppConfig::default()
        }),
    };

    let store_path = cli.store.clone().unwrap_or(paths.store_file);
    let store = Arc::new(
        MemoryStore::load_from(&store_path)
            .with_context(|| format!("loading {}", store_path.display()))?,
    );

    match cli.command {
        Command::Presets => print_presets(),
        Command::New { preset } => {
            new_conversation(&store, &preset).await?;
            store.save_to(&store_path)?;
        }
        Command::Chat {
            conversation,
            message,
        } => {
            chat(&config, store.clone(), &conversation, &message).await?;
            store.save_to(&store_path)?;
        }
        Command::Export {
            target,
            target_type,
        } => {
            let exporter = RecordingExporter::from_config(store.clone(), &config.library);
            let url = exporter.export(&target, target_type.into()).await?;
            println!("{url}");
        }
        Command::Stats {
            target,
            target_type,
        } => {
            let exporter = RecordingExporter::from_config(store.clone(), &config.library);
            for row in exporter.stats(&target, target_type.into()).await? {
                let score = row
                    .best_score
                    .map(|s| format!("{s:.1}"))
                    .unwrap_or_else(|| "-".into());
                println!(
                    "{:>5}  {:>3}x  {:>7} ms  best {:>5}  {}",
                    row.reference_id, row.count, row.total_duration, score, row.reference_text
                );
            }
        }
        Command::Activity { days } => {
            let exporter = RecordingExporter::from_config(store.clone(), &config.library);
            let to = chrono::Utc::now();
            let activity = exporter.activity(to - chrono::Duration::days(days), to).await?;
            println!(
                "{} recordings, {:.1} min",
                activity.totals.count,
                activity.totals.total_duration as f64 / 60_000.0
            );
            for day in &activity.daily {
                println!("  {}  {:>3}", day.date, day.count);
            }
            for row in &activity.by_target {
                println!(
                    "  {}  {:<5} {:<36} {:>3}x  {:>7} ms",
                    row.date, row.target_type, row.target_id, row.count, row.total_duration
                );
            }
        }
        Command::AnkiSync => {
            AnkiClient::from_config(&config.anki).sync().await?;
            log::info!("flashcard collection synchronised");
        }
    }

    Ok(())
}
