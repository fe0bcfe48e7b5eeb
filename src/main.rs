use std::sync::Arc;

use decimate::cli::Repl;
use decimate::config::{AppConfig, HistoryLimit};
use decimate::decision::{DecisionService, HistoryManager, RecommendationClient};
use decimate::llm::{LlmConfig, create_provider};
use decimate::preferences::PreferenceStore;
use decimate::store::{KeyValueStore, LibSqlBackend};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export GEMINI_API_KEY=...");
        std::process::exit(1);
    });

    eprintln!("🧠 DeciMate v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.model);

    let llm = create_provider(&LlmConfig::from_app_config(&config))?;

    // ── Storage ──────────────────────────────────────────────────────────
    let store: Arc<dyn KeyValueStore> = Arc::new(
        LibSqlBackend::new_local(&config.db_path)
            .await
            .unwrap_or_else(|e| {
                eprintln!(
                    "Error: Failed to open database at {}: {}",
                    config.db_path.display(),
                    e
                );
                std::process::exit(1);
            }),
    );
    eprintln!("   Database: {}", config.db_path.display());
    match config.history_limit {
        HistoryLimit::Unbounded => eprintln!("   History: unbounded"),
        HistoryLimit::Capped(n) => eprintln!("   History: last {n} decisions"),
    }

    let prefs = PreferenceStore::new(store);
    let history = Arc::new(HistoryManager::load(prefs.clone(), config.history_limit).await);
    let client = RecommendationClient::new(llm, config.recommendation.clone());
    let service = Arc::new(DecisionService::new(prefs.clone(), client, history));

    Repl::new(service, prefs).run_stdin().await?;

    Ok(())
}
