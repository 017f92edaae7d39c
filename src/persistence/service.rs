use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, error::TryRecvError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::message::{MessageId, WeatherMessage};
use crate::persistence::backend::StorageBackend;
use crate::persistence::failure::DelayedFailure;
use crate::persistence::port::PersistencePort;
use crate::persistence::worker::{self, WorkItem};
use crate::proxy::listener::{AckObserver, DataListener, ListenerId};
use crate::utils::error::{EnqueueError, PipelineError, StorageError};

type ObserverMap = Arc<Mutex<HashMap<ListenerId, Arc<dyn AckObserver>>>>;

/// Queued [`PersistencePort`]: owns a storage worker and the channels that
/// connect it to the rest of the pipeline.
///
/// [`start`](PersistenceService::start) spawns the worker on the blocking
/// thread pool together with an async forwarder that turns the worker's raw
/// acknowledgments into [`AckObserver`] callbacks. `add_data` only enqueues;
/// nothing on the ingestion side ever waits for a write.
///
/// The service also implements [`DataListener`], so it can be registered
/// directly on a [`StationProxy`](crate::proxy::StationProxy): accepted
/// messages are forwarded straight onto the inbound queue.
///
/// A worker failure is not raised anywhere by itself. The owner of the service
/// must poll [`check_for_exceptions`](PersistenceService::check_for_exceptions)
/// (and call [`stop`](PersistenceService::stop) on teardown, which performs a
/// final check) or a crash goes unnoticed.
pub struct PersistenceService {
    inbound_tx: UnboundedSender<WorkItem>,
    fault_rx: Mutex<UnboundedReceiver<DelayedFailure>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    observers: ObserverMap,
}

impl PersistenceService {
    /// Starts the worker and returns the running service.
    ///
    /// `open_backend` runs inside the worker's own execution context, so a
    /// backend that fails to open surfaces through `check_for_exceptions`
    /// exactly like a failed write, not as a panic here.
    pub fn start<B, F>(open_backend: F) -> Arc<Self>
    where
        B: StorageBackend + 'static,
        F: FnOnce() -> Result<B, StorageError> + Send + 'static,
    {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (ack_tx, mut ack_rx) = mpsc::unbounded_channel::<MessageId>();
        let (fault_tx, fault_rx) = mpsc::unbounded_channel();

        let worker =
            tokio::task::spawn_blocking(move || worker::run_worker(open_backend, inbound_rx, ack_tx, fault_tx));

        let observers: ObserverMap = Arc::new(Mutex::new(HashMap::new()));
        let forward_to = observers.clone();
        tokio::spawn(async move {
            while let Some(message_id) = ack_rx.recv().await {
                debug!(message_id, "durable commit confirmed");
                let snapshot: Vec<Arc<dyn AckObserver>> = {
                    let observers = forward_to.lock().expect("observer map lock poisoned");
                    observers.values().cloned().collect()
                };
                for observer in snapshot {
                    observer.acknowledge_persistence(message_id);
                }
            }
            debug!("acknowledgment forwarder exited");
        });

        info!("persistence service started");
        Arc::new(Self {
            inbound_tx,
            fault_rx: Mutex::new(fault_rx),
            worker: Mutex::new(Some(worker)),
            observers,
        })
    }

    /// Polls the exception channel without blocking and re-raises any pending
    /// worker failure in the calling context, original cause chain intact.
    pub fn check_for_exceptions(&self) -> Result<(), PipelineError> {
        let mut fault_rx = self.fault_rx.lock().expect("exception channel lock poisoned");
        match fault_rx.try_recv() {
            Ok(failure) => {
                error!(
                    context = failure.context(),
                    captured_at = %failure.captured_at(),
                    "surfacing delayed worker failure"
                );
                Err(failure.into_error())
            }
            // Disconnected means the worker exited and dropped its sender
            // without reporting anything, i.e. a clean shutdown.
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => Ok(()),
        }
    }

    /// Stops the worker and waits for it to exit.
    ///
    /// Messages enqueued before the stop are drained and persisted first;
    /// anything enqueued afterwards is never processed. Ends with a final
    /// exception check so a failure during the drain is not lost.
    pub async fn stop(&self) -> Result<(), PipelineError> {
        // Send may fail if the worker is already gone; the join below still
        // reaps it and the final check surfaces why.
        let _ = self.inbound_tx.send(WorkItem::Stop);

        let handle = self
            .worker
            .lock()
            .expect("worker handle lock poisoned")
            .take();
        if let Some(handle) = handle {
            if let Err(join_err) = handle.await {
                error!("storage worker task aborted abnormally: {join_err}");
            }
        }

        info!("persistence service stopped");
        self.check_for_exceptions()
    }
}

impl PersistencePort for PersistenceService {
    fn add_data(&self, message: WeatherMessage) -> Result<(), PipelineError> {
        self.inbound_tx
            .send(WorkItem::Data(message))
            .map_err(|_| EnqueueError::WorkerUnavailable.into())
    }

    fn register_observer(&self, observer: Arc<dyn AckObserver>) -> ListenerId {
        let id = Uuid::new_v4();
        self.observers
            .lock()
            .expect("observer map lock poisoned")
            .insert(id, observer);
        id
    }

    fn unregister_observer(&self, id: ListenerId) {
        self.observers
            .lock()
            .expect("observer map lock poisoned")
            .remove(&id);
    }
}

impl DataListener for PersistenceService {
    /// Non-blocking hand-off from the proxy's fan-out onto the inbound queue.
    fn accept(&self, message: WeatherMessage) {
        let message_id = message.message_id();
        if let Err(err) = self.add_data(message) {
            error!(message_id, "dropping message: {err}");
        }
    }
}

impl std::fmt::Debug for PersistenceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let observers = self
            .observers
            .lock()
            .map(|o| o.len())
            .unwrap_or_default();
        f.debug_struct("PersistenceService")
            .field("observers", &observers)
            .finish()
    }
}
