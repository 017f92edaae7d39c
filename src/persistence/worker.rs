use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, warn};

use crate::message::{MessageId, WeatherMessage};
use crate::persistence::backend::StorageBackend;
use crate::persistence::failure::DelayedFailure;
use crate::utils::error::StorageError;

/// One entry on the storage worker's inbound queue.
///
/// `Stop` is an explicit variant rather than a sentinel value, so it can never
/// be confused with a legitimate (if empty) message.
#[derive(Debug)]
pub enum WorkItem {
    Data(WeatherMessage),
    Stop,
}

/// The storage worker loop.
///
/// Opens the backend once, then drains the inbound queue: each message is
/// persisted keyed by its station id and, on success, its identity is emitted
/// on the acknowledgment channel. `Stop` (or a closed queue) ends the loop
/// cleanly after everything enqueued before it has been processed.
///
/// Failure policy is fail-fast: any error during setup or persistence is
/// captured as a [`DelayedFailure`] with its origin context, pushed onto the
/// exception channel, and terminates the worker. The backend's state after a
/// failed write is not assumed consistent, so the loop never resumes past an
/// error; the supervising service decides what happens next.
pub(crate) fn run_worker<B, F>(
    open_backend: F,
    mut inbound: UnboundedReceiver<WorkItem>,
    ack_tx: UnboundedSender<MessageId>,
    fault_tx: UnboundedSender<DelayedFailure>,
) where
    B: StorageBackend,
    F: FnOnce() -> Result<B, StorageError>,
{
    let mut backend = match open_backend() {
        Ok(backend) => backend,
        Err(cause) => {
            report(&fault_tx, DelayedFailure::capture(cause, "opening the storage backend"));
            return;
        }
    };

    while let Some(item) = inbound.blocking_recv() {
        let message = match item {
            WorkItem::Data(message) => message,
            WorkItem::Stop => {
                debug!("stop requested, storage worker draining no further messages");
                break;
            }
        };

        match backend.store_reading(message.station_id(), message.payload()) {
            Ok(()) => {
                if ack_tx.send(message.message_id()).is_err() {
                    warn!("acknowledgment channel closed, storage worker exiting");
                    break;
                }
            }
            Err(cause) => {
                let context = format!(
                    "persisting message {} for station {}",
                    message.message_id(),
                    message.station_id()
                );
                report(&fault_tx, DelayedFailure::capture(cause, context));
                return;
            }
        }
    }

    debug!("storage worker exited cleanly");
}

fn report(fault_tx: &UnboundedSender<DelayedFailure>, failure: DelayedFailure) {
    error!(
        context = failure.context(),
        cause = %failure.cause(),
        "storage worker failed"
    );
    if fault_tx.send(failure).is_err() {
        error!("exception channel closed, worker failure is lost");
    }
}
