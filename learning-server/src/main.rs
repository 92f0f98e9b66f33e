//! Learning server - HTTP API with background model loading.

use std::env;
use std::sync::Arc;

use learning_server::config::{Config, LoadMode};
use learning_server::engine::{ModelEngine, OllamaEngine};
use learning_server::loader::ModelLoader;
use learning_server::state::{registry_from_config, AppState};
use learning_server::store::LearningStore;
use learning_server::{app, logging};
use tokio::net::TcpListener;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_version() {
    println!("learning-server {}", VERSION);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle --version / -V
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--version" || a == "-V") {
        print_version();
        return Ok(());
    }

    let mut config = Config::load().map_err(|e| {
        format!(
            "Failed to load configuration: {}. \
             Check config.toml or the LEARNING__* environment variables.",
            e
        )
    })?;
    if args.iter().any(|a| a == "--preload") {
        config.models.load_mode = LoadMode::Preload;
    }

    logging::init_tracing(&config.logging.level);
    tracing::info!("Starting learning-server {}", VERSION);

    let registry = Arc::new(registry_from_config(&config));

    let store = match LearningStore::open(&config.database.url) {
        Ok(store) => {
            tracing::info!("Learning store opened at {}", config.database.url);
            Some(Arc::new(store))
        }
        Err(e) => {
            tracing::warn!(
                "Could not open learning store at {}, storage endpoints disabled: {}",
                config.database.url,
                e
            );
            None
        }
    };

    let engine: Option<Arc<dyn ModelEngine>> = match config.models.ollama {
        Some(ref ollama_config) if ollama_config.enabled => {
            tracing::info!("Using Ollama engine at {}", ollama_config.base_url);
            let engine: Arc<dyn ModelEngine> = Arc::new(OllamaEngine::new(ollama_config));
            Some(engine)
        }
        _ => {
            tracing::info!("No model engine configured, serving heuristic results");
            None
        }
    };

    match (config.models.load_mode, engine) {
        (LoadMode::Disabled, _) => {
            tracing::info!("Model loading disabled");
        }
        (_, None) => {
            tracing::warn!("Model loading requested but no engine is enabled");
        }
        (LoadMode::Background, Some(engine)) => {
            // Detached: the server starts accepting requests immediately.
            let _loader = ModelLoader::new(registry.clone(), engine).spawn();
        }
        (LoadMode::Preload, Some(engine)) => {
            tracing::info!("Preloading models before serving");
            let report = ModelLoader::new(registry.clone(), engine).spawn().wait().await;
            if !report.all_ready() {
                tracing::warn!("Preload finished with failures: {:?}", report.failed());
            }
        }
    }

    let state = Arc::new(AppState::new(config.clone(), registry, store));

    let addr = format!("{}:{}", config.api.host, config.api.port);
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
