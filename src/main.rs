use std::sync::Arc;

use support_router::config::{ClassifierStrategy, RouterConfig};
use support_router::error::Result;
use support_router::pipeline::Dispatcher;
use support_router::repl;
use support_router::store::{LibSqlBackend, TicketStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = RouterConfig::from_env()?;

    eprintln!("📨 Support Router v{}", env!("CARGO_PKG_VERSION"));
    match config.classifier {
        ClassifierStrategy::External => eprintln!("   Classifier: external ({})", config.model),
        ClassifierStrategy::Heuristic => eprintln!("   Classifier: keyword heuristic"),
    }

    // ── Database ─────────────────────────────────────────────────────────
    let db_path = std::path::Path::new(&config.db_path);
    let store: Arc<dyn TicketStore> = Arc::new(LibSqlBackend::new_local(db_path).await.map_err(
        |e| {
            eprintln!("Error: Failed to open database at {}: {}", config.db_path, e);
            e
        },
    )?);
    eprintln!("   Database: {}", config.db_path);

    // ── Dispatcher ───────────────────────────────────────────────────────
    let dispatcher = Dispatcher::from_config(&config, store).map_err(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export OPENAI_API_KEY=sk-...  (or SUPPORT_ROUTER_CLASSIFIER=heuristic)");
        e
    })?;

    eprintln!("   Type a message and press Enter. /help for commands, /quit to exit.\n");
    repl::run(&dispatcher).await?;

    let total = dispatcher.log().len().await;
    tracing::info!(dispatched = total, "Shutting down");
    Ok(())
}
