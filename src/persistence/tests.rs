use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, error::TryRecvError};
use tokio::time::timeout;

use super::backend::{MemoryStore, StorageBackend};
use super::direct::DirectService;
use super::port::PersistencePort;
use super::service::PersistenceService;
use super::sled_store::SledStore;
use crate::message::{MessageId, SensorPayload, SensorSlot, TempHumidityReading, WeatherMessage};
use crate::proxy::listener::AckObserver;
use crate::utils::error::{PipelineError, StorageError};

const STATION: &str = "TES2";

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
}

/// A valid payload `offset_secs` after the base time.
fn payload_at(offset_secs: i64) -> SensorPayload {
    let mut payload = SensorPayload::new(base_time() + ChronoDuration::seconds(offset_secs));
    payload.pressure = Some(1010.0 + offset_secs as f64);
    payload.with_sensor(
        SensorSlot::Out1,
        TempHumidityReading::new(Some(18.0), Some(55.0)),
    )
}

fn message(id: MessageId, offset_secs: i64) -> WeatherMessage {
    WeatherMessage::new(id, STATION, payload_at(offset_secs))
}

/// Forwards acknowledgments into a channel the test can await.
struct ChannelObserver(UnboundedSender<MessageId>);

impl AckObserver for ChannelObserver {
    fn acknowledge_persistence(&self, message_id: MessageId) {
        let _ = self.0.send(message_id);
    }
}

fn observed_service(
    service: &Arc<PersistenceService>,
) -> UnboundedReceiver<MessageId> {
    let (tx, rx) = mpsc::unbounded_channel();
    service.register_observer(Arc::new(ChannelObserver(tx)));
    rx
}

async fn next_ack(rx: &mut UnboundedReceiver<MessageId>) -> MessageId {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for acknowledgment")
        .expect("acknowledgment channel closed")
}

#[test]
fn test_memory_store_keeps_readings_per_station() {
    let mut store = MemoryStore::new();
    store.store_reading("TES1", &payload_at(0)).unwrap();
    store.store_reading("TES2", &payload_at(0)).unwrap();
    store.store_reading("TES2", &payload_at(60)).unwrap();

    assert_eq!(store.station_count(), 2);
    assert_eq!(store.readings("TES1").len(), 1);
    assert_eq!(store.readings("TES2").len(), 2);
    assert!(store.readings("TES3").is_empty());
}

#[test]
fn test_memory_store_rejects_stale_timestamp() {
    let mut store = MemoryStore::new();
    store.store_reading(STATION, &payload_at(60)).unwrap();

    let err = store.store_reading(STATION, &payload_at(60)).unwrap_err();
    assert!(matches!(err, StorageError::NonMonotonicReading { .. }));

    let err = store.store_reading(STATION, &payload_at(0)).unwrap_err();
    assert!(matches!(err, StorageError::NonMonotonicReading { .. }));

    // The failed writes left nothing behind.
    assert_eq!(store.readings(STATION).len(), 1);
}

#[test]
fn test_sled_store_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = SledStore::open(dir.path().to_str().unwrap()).unwrap();

    let first = payload_at(0);
    let second = payload_at(60);
    store.store_reading(STATION, &second).unwrap();
    store.store_reading(STATION, &first).unwrap();

    // Keyed by timestamp, so iteration comes back in time order regardless
    // of insertion order.
    let readings = store.readings(STATION).unwrap();
    assert_eq!(readings, vec![first, second]);
}

#[test]
fn test_sled_store_rejects_duplicate_timestamp() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = SledStore::open(dir.path().to_str().unwrap()).unwrap();

    store.store_reading(STATION, &payload_at(0)).unwrap();
    let err = store.store_reading(STATION, &payload_at(0)).unwrap_err();
    assert!(matches!(err, StorageError::DuplicateReading { .. }));
    assert_eq!(store.readings(STATION).unwrap().len(), 1);
}

#[tokio::test]
async fn test_messages_acknowledged_in_enqueue_order() {
    let store = MemoryStore::new();
    let worker_store = store.clone();
    let service = PersistenceService::start(move || Ok(worker_store));
    let mut acks = observed_service(&service);

    for (id, offset) in [(1, 0), (2, 60), (3, 120)] {
        service.add_data(message(id, offset)).unwrap();
    }

    for expected in [1, 2, 3] {
        assert_eq!(next_ack(&mut acks).await, expected);
    }

    service.stop().await.unwrap();
    assert_eq!(store.readings(STATION).len(), 3);
}

#[tokio::test]
async fn test_backend_constraint_kills_worker_fail_fast() {
    let store = MemoryStore::new();
    let worker_store = store.clone();
    let service = PersistenceService::start(move || Ok(worker_store));
    let mut acks = observed_service(&service);

    service.add_data(message(1, 60)).unwrap();
    // Same timestamp as message 1: violates the monotonic constraint.
    service.add_data(message(2, 60)).unwrap();
    service.add_data(message(3, 120)).unwrap();

    assert_eq!(next_ack(&mut acks).await, 1);

    // stop() joins the (already dead) worker and surfaces the failure.
    let err = service.stop().await.unwrap_err();
    let text = err.to_string();
    assert!(text.contains("message 2"), "unexpected error: {text}");
    assert!(matches!(
        err,
        PipelineError::WorkerFailure {
            source: StorageError::NonMonotonicReading { .. },
            ..
        }
    ));

    // No acknowledgment for the failing message or anything after it, and
    // message 3 was never persisted.
    assert!(matches!(acks.try_recv(), Err(TryRecvError::Empty)));
    assert_eq!(store.readings(STATION).len(), 1);
}

#[tokio::test]
async fn test_stop_drains_prior_messages_and_nothing_after() {
    let store = MemoryStore::new();
    let worker_store = store.clone();
    let service = PersistenceService::start(move || Ok(worker_store));
    let mut acks = observed_service(&service);

    service.add_data(message(1, 0)).unwrap();
    service.add_data(message(2, 60)).unwrap();
    service.stop().await.unwrap();

    // Everything enqueued before the stop was persisted and acknowledged.
    assert_eq!(next_ack(&mut acks).await, 1);
    assert_eq!(next_ack(&mut acks).await, 2);
    assert_eq!(store.readings(STATION).len(), 2);

    // The worker is gone; a late message is a transient enqueue error and is
    // never processed.
    let err = service.add_data(message(3, 120)).unwrap_err();
    assert!(matches!(err, PipelineError::Enqueue(_)));
    assert_eq!(store.readings(STATION).len(), 2);
}

#[tokio::test]
async fn test_backend_open_failure_surfaces_on_check() {
    let service = PersistenceService::start(|| {
        Err::<MemoryStore, _>(StorageError::Open {
            path: "/nonexistent/weather_db".into(),
            source: sled::Error::Io(std::io::Error::other("disk gone")),
        })
    });

    let err = service.stop().await.unwrap_err();
    let text = err.to_string();
    assert!(
        text.contains("opening the storage backend"),
        "unexpected error: {text}"
    );
    assert!(text.contains("disk gone"), "unexpected error: {text}");
}

#[tokio::test]
async fn test_check_for_exceptions_is_quiet_while_healthy() {
    let service = PersistenceService::start(|| Ok(MemoryStore::new()));
    assert!(service.check_for_exceptions().is_ok());

    service.add_data(message(1, 0)).unwrap();
    // Failure channel stays quiet through normal operation and clean stop.
    assert!(service.check_for_exceptions().is_ok());
    service.stop().await.unwrap();
    assert!(service.check_for_exceptions().is_ok());
}

#[tokio::test]
async fn test_unregistered_observer_gets_no_acks() {
    let service = PersistenceService::start(|| Ok(MemoryStore::new()));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let id = service.register_observer(Arc::new(ChannelObserver(tx)));
    service.unregister_observer(id);

    service.add_data(message(1, 0)).unwrap();
    service.stop().await.unwrap();

    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_direct_service_acknowledges_inline() {
    let store = MemoryStore::new();
    let service = DirectService::new(store.clone());
    let (tx, mut rx) = mpsc::unbounded_channel();
    service.register_observer(Arc::new(ChannelObserver(tx)));

    service.add_data(message(1, 0)).unwrap();

    // No worker in between: the acknowledgment is already there.
    assert_eq!(rx.try_recv().unwrap(), 1);
    assert_eq!(store.readings(STATION).len(), 1);
}

#[tokio::test]
async fn test_direct_service_returns_storage_errors() {
    let service = DirectService::new(MemoryStore::new());
    service.add_data(message(1, 60)).unwrap();

    let err = service.add_data(message(2, 60)).unwrap_err();
    match err {
        PipelineError::Storage { message_id, .. } => assert_eq!(message_id, 2),
        other => panic!("expected storage error, got: {other}"),
    }
}

#[tokio::test]
async fn test_port_variants_are_interchangeable() {
    let queued: Arc<dyn PersistencePort> =
        PersistenceService::start(|| Ok(MemoryStore::new()));
    let direct: Arc<dyn PersistencePort> = Arc::new(DirectService::new(MemoryStore::new()));

    for port in [&queued, &direct] {
        let (tx, mut rx) = mpsc::unbounded_channel();
        port.register_observer(Arc::new(ChannelObserver(tx)));
        port.add_data(message(1, 0)).unwrap();
        assert_eq!(next_ack(&mut rx).await, 1);
    }
}
