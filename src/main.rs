use std::path::Path;
use std::sync::Arc;

use futures::StreamExt;

use lumo_bot::channels::{Channel, CliChannel, TelegramChannel};
use lumo_bot::config::BotConfig;
use lumo_bot::dispatch::Dispatcher;
use lumo_bot::engagement::affirmations::RandomAffirmations;
use lumo_bot::engagement::messages;
use lumo_bot::engagement::model::Challenge;
use lumo_bot::store::{LibSqlStore, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let channel_kind = std::env::var("LUMO_CHANNEL").unwrap_or_else(|_| "telegram".to_string());
    let db_path = std::env::var("LUMO_DB_PATH").unwrap_or_else(|_| "./data/lumo.db".to_string());

    eprintln!("🌸 Lumo Bot v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Channel: {channel_kind}");
    eprintln!("   Database: {db_path}");

    // ── Store ────────────────────────────────────────────────────────────
    let store: Arc<dyn Store> = Arc::new(LibSqlStore::new_local(Path::new(&db_path)).await?);

    // Optional catalog seeding from a JSON file of { id, text } entries.
    if let Ok(seed_path) = std::env::var("LUMO_SEED_FILE") {
        seed_catalog(store.as_ref(), Path::new(&seed_path)).await?;
    }

    let count = store.challenge_count().await?;
    tracing::info!(challenges = count, "Catalog ready");
    if count == 0 {
        tracing::warn!("Catalog is empty; /reto will report it as exhausted");
    }

    // ── Channel ──────────────────────────────────────────────────────────
    let channel: Arc<dyn Channel> = match channel_kind.as_str() {
        "cli" => Arc::new(CliChannel::new()),
        "telegram" => {
            let token = std::env::var("LUMO_TELEGRAM_TOKEN").unwrap_or_else(|_| {
                eprintln!("Error: LUMO_TELEGRAM_TOKEN not set");
                eprintln!("  export LUMO_TELEGRAM_TOKEN=123456:ABC-...");
                std::process::exit(1);
            });
            Arc::new(TelegramChannel::new(token))
        }
        other => anyhow::bail!("Unknown LUMO_CHANNEL value: {other}"),
    };

    channel.health_check().await?;

    // ── Dispatch loop ────────────────────────────────────────────────────
    let dispatcher = Arc::new(Dispatcher::new(
        Arc::clone(&store),
        BotConfig::default(),
        Arc::new(RandomAffirmations),
    ));

    let mut stream = channel.start().await?;
    tracing::info!("Lumo is listening");

    while let Some(msg) = stream.next().await {
        let dispatcher = Arc::clone(&dispatcher);
        let channel = Arc::clone(&channel);

        // Distinct users proceed concurrently; the dispatcher serializes
        // events for the same user id.
        tokio::spawn(async move {
            let response = match dispatcher.handle(&msg).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!(user_id = %msg.user_id, "Dispatch failed: {e}");
                    lumo_bot::channels::OutgoingResponse::new(messages::GENERIC_FAILURE, false)
                }
            };

            if let Err(e) = channel.respond(&msg, response).await {
                tracing::error!(user_id = %msg.user_id, "Reply delivery failed: {e}");
            }
        });
    }

    channel.shutdown().await?;
    Ok(())
}

/// Load catalog entries from a JSON seed file, skipping ids already present.
async fn seed_catalog(store: &dyn Store, path: &Path) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(path).await?;
    let challenges: Vec<Challenge> = serde_json::from_str(&raw)?;

    let mut inserted = 0;
    for challenge in &challenges {
        anyhow::ensure!(
            challenge.id > 0,
            "Seed file contains non-positive challenge id {}",
            challenge.id
        );
        if store.insert_challenge(challenge).await? {
            inserted += 1;
        }
    }

    tracing::info!(
        total = challenges.len(),
        inserted,
        path = %path.display(),
        "Catalog seeded"
    );
    Ok(())
}
