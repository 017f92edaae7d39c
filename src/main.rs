use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use stationflow::config::load_config;
use stationflow::persistence::{PersistencePort, PersistenceService, SledStore};
use stationflow::proxy::StationProxy;
use stationflow::utils::logging;

/// Runs the pipeline under a minimal supervisor: poll the persistence service
/// for delayed worker failures, and stop cleanly on ctrl-c. A worker failure
/// is treated as fatal; restarting with replay would re-run messages whose
/// outcome is unknown, so the decision is left to whoever restarts the
/// process.
#[tokio::main]
async fn main() -> ExitCode {
    let config = load_config().expect("Failed to load configuration");
    logging::init(&config.ingest.log_level);

    let proxy = Arc::new(StationProxy::with_timeout(config.ingest.ack_timeout()));

    let path = config.storage.path.clone();
    let flush = config.storage.flush_on_store;
    let service = PersistenceService::start(move || {
        SledStore::open(&path).map(|store| store.flush_on_store(flush))
    });

    service.register_observer(proxy.clone());
    proxy.register_listener(service.clone());

    info!(path = %config.storage.path, "ingestion pipeline ready");

    let mut poll = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            _ = poll.tick() => {
                if let Err(err) = service.check_for_exceptions() {
                    error!("storage worker failed: {err}");
                    return ExitCode::FAILURE;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                return match service.stop().await {
                    Ok(()) => ExitCode::SUCCESS,
                    Err(err) => {
                        error!("failure during shutdown: {err}");
                        ExitCode::FAILURE
                    }
                };
            }
        }
    }
}
