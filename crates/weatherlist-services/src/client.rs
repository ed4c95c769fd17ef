//! HTTP client for the weather service REST API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;
use weatherlist_core::{
    LookupError, NetworkError, ReqwestErrorExt, ServiceConfig, WriteError, WriteOp,
};

use crate::gateway::WeatherGateway;
use crate::record::{RecordId, WeatherDraft, WeatherRecord};

const USER_AGENT: &str = "weatherlist/0.1.0";

/// reqwest-backed [`WeatherGateway`].
#[derive(Debug, Clone)]
pub struct WeatherClient {
    base_url: Url,
    client: Arc<Client>,
}

impl WeatherClient {
    /// Create a client for the service rooted at `base_url`.
    ///
    /// # Errors
    /// Fails when the URL does not parse or the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        // `Url::join` drops the last segment unless the path ends in a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            base_url,
            client: Arc::new(client),
        })
    }

    pub fn from_config(config: &ServiceConfig) -> anyhow::Result<Self> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `<base>/weather/<segments...>` with each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url, NetworkError> {
        let mut url = self
            .base_url
            .join("weather")
            .map_err(|e| NetworkError::InvalidResponse(format!("Bad service URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| NetworkError::InvalidResponse("Service URL cannot be a base".into()))?
            .extend(segments);
        Ok(url)
    }

    /// Send a request and decode a JSON body from a 2xx response.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, NetworkError> {
        let response = self.send(request).await?;
        response
            .json()
            .await
            .map_err(|e| NetworkError::InvalidResponse(format!("JSON parse error: {}", e)))
    }

    /// Send a request and turn any non-2xx status into `NetworkError::ServerError`.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, NetworkError> {
        let response = request
            .send()
            .await
            .map_err(ReqwestErrorExt::into_network_error)?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(NetworkError::ServerError {
                status: status.as_u16(),
                message,
            })
        }
    }

    fn lookup_error(query: &str, err: NetworkError) -> LookupError {
        if err.status() == Some(StatusCode::NOT_FOUND.as_u16()) {
            LookupError::NotFound(query.to_string())
        } else {
            LookupError::Failed {
                query: query.to_string(),
                source: err,
            }
        }
    }
}

#[async_trait]
impl WeatherGateway for WeatherClient {
    #[instrument(skip(self), level = "debug")]
    async fn fetch_all(&self) -> Result<Vec<WeatherRecord>, NetworkError> {
        let url = self.url(&[])?;
        let records: Vec<WeatherRecord> = self.send_json(self.client.get(url)).await?;
        tracing::info!("Fetched {} weather records", records.len());
        Ok(records)
    }

    #[instrument(skip(self), level = "debug")]
    async fn fetch_by_key(&self, query: &str) -> Result<WeatherRecord, LookupError> {
        let url = self
            .url(&["city", query])
            .map_err(|e| Self::lookup_error(query, e))?;
        self.send_json(self.client.get(url))
            .await
            .map_err(|e| Self::lookup_error(query, e))
    }

    #[instrument(skip(self), level = "debug")]
    async fn fetch_by_id(&self, id: RecordId) -> Result<WeatherRecord, LookupError> {
        let key = id.to_string();
        let url = self.url(&[&key]).map_err(|e| Self::lookup_error(&key, e))?;
        self.send_json(self.client.get(url))
            .await
            .map_err(|e| Self::lookup_error(&key, e))
    }

    #[instrument(skip(self), level = "debug")]
    async fn find_by_condition(&self, text: &str) -> Result<Vec<WeatherRecord>, LookupError> {
        let url = self
            .url(&["citiesC", text])
            .map_err(|e| Self::lookup_error(text, e))?;
        let records: Vec<WeatherRecord> = self
            .send_json(self.client.get(url))
            .await
            .map_err(|e| Self::lookup_error(text, e))?;
        tracing::info!("Found {} records with condition '{}'", records.len(), text);
        Ok(records)
    }

    #[instrument(skip(self), level = "debug")]
    async fn find_by_temperature(&self, temperature: f64) -> Result<Vec<WeatherRecord>, LookupError> {
        let key = temperature.to_string();
        let url = self
            .url(&["citiesT", &key])
            .map_err(|e| Self::lookup_error(&key, e))?;
        let records: Vec<WeatherRecord> = self
            .send_json(self.client.get(url))
            .await
            .map_err(|e| Self::lookup_error(&key, e))?;
        tracing::info!("Found {} records at {} degrees", records.len(), key);
        Ok(records)
    }

    #[instrument(skip(self), level = "debug")]
    async fn create(&self, draft: &WeatherDraft) -> Result<WeatherRecord, WriteError> {
        let write_err = |e| WriteError::new(WriteOp::Create, e);
        let url = self.url(&[]).map_err(write_err)?;
        let record: WeatherRecord = self
            .send_json(self.client.post(url).json(draft))
            .await
            .map_err(write_err)?;
        tracing::info!("Created weather record {} ({})", record.id, record.city);
        Ok(record)
    }

    #[instrument(skip(self, drafts), fields(count = drafts.len()), level = "debug")]
    async fn create_bulk(&self, drafts: &[WeatherDraft]) -> Result<Vec<WeatherRecord>, WriteError> {
        let write_err = |e| WriteError::new(WriteOp::Create, e);
        let url = self.url(&["bulk"]).map_err(write_err)?;
        let records: Vec<WeatherRecord> = self
            .send_json(self.client.post(url).json(drafts))
            .await
            .map_err(write_err)?;
        tracing::info!("Created {} weather records in bulk", records.len());
        Ok(records)
    }

    #[instrument(skip(self, record), fields(id = record.id), level = "debug")]
    async fn update(&self, record: &WeatherRecord) -> Result<WeatherRecord, WriteError> {
        let write_err = |e| WriteError::new(WriteOp::Update, e);
        let url = self.url(&[&record.id.to_string()]).map_err(write_err)?;
        let updated: WeatherRecord = self
            .send_json(self.client.put(url).json(record))
            .await
            .map_err(write_err)?;
        tracing::info!("Updated weather record {}", updated.id);
        Ok(updated)
    }

    #[instrument(skip(self), level = "debug")]
    async fn delete(&self, id: RecordId) -> Result<(), WriteError> {
        let write_err = |e| WriteError::new(WriteOp::Delete, e);
        let url = self.url(&[&id.to_string()]).map_err(write_err)?;
        // 204 No Content on success, nothing to decode
        self.send(self.client.delete(url)).await.map_err(write_err)?;
        tracing::info!("Deleted weather record {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> WeatherClient {
        WeatherClient::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_url_building_keeps_base_path() {
        let c = client("http://localhost:8080/api");
        assert_eq!(c.url(&[]).unwrap().as_str(), "http://localhost:8080/api/weather");
        assert_eq!(
            c.url(&["12"]).unwrap().as_str(),
            "http://localhost:8080/api/weather/12"
        );
    }

    #[test]
    fn test_url_segments_are_percent_encoded() {
        let c = client("http://localhost:8080");
        assert_eq!(
            c.url(&["city", "New York/North"]).unwrap().as_str(),
            "http://localhost:8080/weather/city/New%20York%2FNorth"
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        assert!(WeatherClient::new("not a url", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_lookup_error_mapping() {
        let not_found = WeatherClient::lookup_error(
            "Berlin",
            NetworkError::ServerError {
                status: 404,
                message: String::new(),
            },
        );
        assert_eq!(not_found, LookupError::NotFound("Berlin".into()));

        let failed = WeatherClient::lookup_error("Berlin", NetworkError::Timeout);
        assert!(matches!(failed, LookupError::Failed { .. }));
    }
}
