//! Weather list backend: async gateway calls.
//! All network work runs as runtime tasks; results are sent back via mpsc
//! and applied by `WeatherListModel` one message at a time.

use std::future::Future;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use weatherlist_core::{LookupError, NetworkError, WriteError, WriteOp};
use weatherlist_services::{RecordId, WeatherDraft, WeatherGateway, WeatherRecord};

/// Orders requests that replace the whole collection.
pub type RequestSeq = u64;

/// Messages sent from async operations back to the list model
#[derive(Debug)]
pub enum WeatherServiceMessage {
    /// Result of fetching the full collection
    FetchAllDone {
        seq: RequestSeq,
        result: Result<Vec<WeatherRecord>, NetworkError>,
    },
    /// Result of a city search
    SearchDone {
        seq: RequestSeq,
        query: String,
        result: Result<WeatherRecord, LookupError>,
    },
    /// Result of a condition-text search
    ConditionSearchDone {
        seq: RequestSeq,
        text: String,
        result: Result<Vec<WeatherRecord>, LookupError>,
    },
    /// Result of a temperature search
    TemperatureSearchDone {
        seq: RequestSeq,
        temperature: f64,
        result: Result<Vec<WeatherRecord>, LookupError>,
    },
    /// Result of re-reading one record
    RefreshDone {
        id: RecordId,
        result: Result<WeatherRecord, LookupError>,
    },
    /// Result of creating a record from the draft buffer
    CreateDone {
        sent: WeatherDraft,
        result: Result<WeatherRecord, WriteError>,
    },
    /// Result of a bulk create
    BulkCreateDone {
        result: Result<Vec<WeatherRecord>, WriteError>,
    },
    /// Result of committing a record
    UpdateDone {
        id: RecordId,
        sent: WeatherRecord,
        result: Result<WeatherRecord, WriteError>,
    },
    /// Result of deleting a record
    DeleteDone {
        id: RecordId,
        result: Result<(), WriteError>,
    },
}

/// Run `call` on its own task and always send exactly one message for it.
///
/// A panicked or cancelled call reaches `done` as `NetworkError::Aborted`.
fn spawn_reported<T, F, D>(
    tx: &UnboundedSender<WeatherServiceMessage>,
    runtime: &Handle,
    call: F,
    done: D,
) where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
    D: FnOnce(Result<T, NetworkError>) -> WeatherServiceMessage + Send + 'static,
{
    let tx = tx.clone();
    let task = runtime.spawn(call);
    runtime.spawn(async move {
        let outcome = task.await.map_err(|e| {
            tracing::error!("Weather request task failed: {}", e);
            NetworkError::Aborted(e.to_string())
        });
        let _ = tx.send(done(outcome));
    });
}

fn lookup_outcome<T>(
    query: &str,
    outcome: Result<Result<T, LookupError>, NetworkError>,
) -> Result<T, LookupError> {
    outcome.unwrap_or_else(|source| {
        Err(LookupError::Failed {
            query: query.to_string(),
            source,
        })
    })
}

fn write_outcome<T>(
    op: WriteOp,
    outcome: Result<Result<T, WriteError>, NetworkError>,
) -> Result<T, WriteError> {
    outcome.unwrap_or_else(|source| Err(WriteError::new(op, source)))
}

/// Request the full collection.
/// Sends `FetchAllDone` on the channel when complete.
pub fn request_fetch_all(
    tx: &UnboundedSender<WeatherServiceMessage>,
    runtime: &Handle,
    gateway: Arc<dyn WeatherGateway>,
    seq: RequestSeq,
) {
    spawn_reported(
        tx,
        runtime,
        async move { gateway.fetch_all().await },
        move |outcome| WeatherServiceMessage::FetchAllDone {
            seq,
            result: outcome.and_then(|result| result),
        },
    );
}

/// Request the record for a city.
/// Sends `SearchDone` on the channel when complete.
pub fn request_search(
    tx: &UnboundedSender<WeatherServiceMessage>,
    runtime: &Handle,
    gateway: Arc<dyn WeatherGateway>,
    seq: RequestSeq,
    query: String,
) {
    let key = query.clone();
    spawn_reported(
        tx,
        runtime,
        async move { gateway.fetch_by_key(&key).await },
        move |outcome| WeatherServiceMessage::SearchDone {
            seq,
            result: lookup_outcome(&query, outcome),
            query,
        },
    );
}

/// Request every record with the given condition text.
/// Sends `ConditionSearchDone` on the channel when complete.
pub fn request_condition_search(
    tx: &UnboundedSender<WeatherServiceMessage>,
    runtime: &Handle,
    gateway: Arc<dyn WeatherGateway>,
    seq: RequestSeq,
    text: String,
) {
    let key = text.clone();
    spawn_reported(
        tx,
        runtime,
        async move { gateway.find_by_condition(&key).await },
        move |outcome| WeatherServiceMessage::ConditionSearchDone {
            seq,
            result: lookup_outcome(&text, outcome),
            text,
        },
    );
}

/// Request every record at the given temperature.
/// Sends `TemperatureSearchDone` on the channel when complete.
pub fn request_temperature_search(
    tx: &UnboundedSender<WeatherServiceMessage>,
    runtime: &Handle,
    gateway: Arc<dyn WeatherGateway>,
    seq: RequestSeq,
    temperature: f64,
) {
    spawn_reported(
        tx,
        runtime,
        async move { gateway.find_by_temperature(temperature).await },
        move |outcome| WeatherServiceMessage::TemperatureSearchDone {
            seq,
            temperature,
            result: lookup_outcome(&temperature.to_string(), outcome),
        },
    );
}

/// Re-read one record.
/// Sends `RefreshDone` on the channel when complete.
pub fn request_refresh(
    tx: &UnboundedSender<WeatherServiceMessage>,
    runtime: &Handle,
    gateway: Arc<dyn WeatherGateway>,
    id: RecordId,
) {
    spawn_reported(
        tx,
        runtime,
        async move { gateway.fetch_by_id(id).await },
        move |outcome| WeatherServiceMessage::RefreshDone {
            id,
            result: lookup_outcome(&id.to_string(), outcome),
        },
    );
}

/// Create a record from a draft snapshot.
/// Sends `CreateDone` on the channel when complete.
pub fn request_create(
    tx: &UnboundedSender<WeatherServiceMessage>,
    runtime: &Handle,
    gateway: Arc<dyn WeatherGateway>,
    draft: WeatherDraft,
) {
    let sent = draft.clone();
    spawn_reported(
        tx,
        runtime,
        async move { gateway.create(&draft).await },
        move |outcome| WeatherServiceMessage::CreateDone {
            sent,
            result: write_outcome(WriteOp::Create, outcome),
        },
    );
}

/// Create several records at once.
/// Sends `BulkCreateDone` on the channel when complete.
pub fn request_create_bulk(
    tx: &UnboundedSender<WeatherServiceMessage>,
    runtime: &Handle,
    gateway: Arc<dyn WeatherGateway>,
    drafts: Vec<WeatherDraft>,
) {
    spawn_reported(
        tx,
        runtime,
        async move { gateway.create_bulk(&drafts).await },
        move |outcome| WeatherServiceMessage::BulkCreateDone {
            result: write_outcome(WriteOp::Create, outcome),
        },
    );
}

/// Persist a record snapshot.
/// Sends `UpdateDone` on the channel when complete.
pub fn request_update(
    tx: &UnboundedSender<WeatherServiceMessage>,
    runtime: &Handle,
    gateway: Arc<dyn WeatherGateway>,
    record: WeatherRecord,
) {
    let sent = record.clone();
    spawn_reported(
        tx,
        runtime,
        async move { gateway.update(&record).await },
        move |outcome| WeatherServiceMessage::UpdateDone {
            id: sent.id,
            result: write_outcome(WriteOp::Update, outcome),
            sent,
        },
    );
}

/// Delete a record.
/// Sends `DeleteDone` on the channel when complete.
pub fn request_delete(
    tx: &UnboundedSender<WeatherServiceMessage>,
    runtime: &Handle,
    gateway: Arc<dyn WeatherGateway>,
    id: RecordId,
) {
    spawn_reported(
        tx,
        runtime,
        async move { gateway.delete(id).await },
        move |outcome| WeatherServiceMessage::DeleteDone {
            id,
            result: write_outcome(WriteOp::Delete, outcome),
        },
    );
}
