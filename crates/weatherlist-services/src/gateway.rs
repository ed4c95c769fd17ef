//! The call/response boundary between the list model and the weather service.

use async_trait::async_trait;
use weatherlist_core::{LookupError, NetworkError, WriteError};

use crate::record::{RecordId, WeatherDraft, WeatherRecord};

/// Remote weather collection.
///
/// Every call is a single attempt with no retry; callers decide what a failure
/// means for their own state. Implementations hold no list state of their own.
#[async_trait]
pub trait WeatherGateway: Send + Sync {
    /// Fetch the whole collection in service order.
    async fn fetch_all(&self) -> Result<Vec<WeatherRecord>, NetworkError>;

    /// Fetch the record for a city name.
    ///
    /// # Errors
    /// `LookupError::NotFound` when the service has no such city.
    async fn fetch_by_key(&self, query: &str) -> Result<WeatherRecord, LookupError>;

    /// Fetch one record by id.
    async fn fetch_by_id(&self, id: RecordId) -> Result<WeatherRecord, LookupError>;

    /// All records whose condition text matches.
    async fn find_by_condition(&self, text: &str) -> Result<Vec<WeatherRecord>, LookupError>;

    /// All records at exactly this temperature.
    async fn find_by_temperature(&self, temperature: f64) -> Result<Vec<WeatherRecord>, LookupError>;

    /// Create a record and return it with its server-assigned id.
    async fn create(&self, draft: &WeatherDraft) -> Result<WeatherRecord, WriteError>;

    /// Create several records in one call.
    async fn create_bulk(&self, drafts: &[WeatherDraft]) -> Result<Vec<WeatherRecord>, WriteError>;

    /// Persist a full record and return the server's canonical copy.
    async fn update(&self, record: &WeatherRecord) -> Result<WeatherRecord, WriteError>;

    async fn delete(&self, id: RecordId) -> Result<(), WriteError>;
}
