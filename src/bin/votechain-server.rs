#![forbid(unsafe_code)]
//! VoteChain server: boots the registry and the ledger, then serves the API.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use votechain::api::{run_server, AppState};
use votechain::config::load_config;
use votechain::store::{CredentialStore, VoterRegistry};
use votechain::voting::VotingService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = load_config()?;
    info!("Starting VoteChain server (db = {})", config.database.path);

    // Ensure the data directory (parent of the DB path) exists.
    let db_path = Path::new(&config.database.path);
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create data dir {:?}: {}", parent, e))?;
        }
    }

    let registry = match VoterRegistry::open(&config.database.path) {
        Ok(registry) => registry,
        Err(e) => {
            warn!(
                "Failed to open registry at {}: {}. Falling back to in-memory registry.",
                config.database.path, e
            );
            VoterRegistry::open_in_memory()?
        }
    };
    let registry = Arc::new(registry);

    for candidate in &config.election.candidates {
        registry.add_candidate(candidate)?;
    }
    if config.election.candidates.is_empty() {
        warn!("No candidates configured; /candidates will be empty");
    }

    let service = Arc::new(VotingService::new(
        registry.clone() as Arc<dyn CredentialStore>
    ));
    service.initialize_ledger().await;
    info!("Ledger initialized with genesis block");

    let state = AppState { service, registry };
    run_server(state, config.network.api_port).await
}
