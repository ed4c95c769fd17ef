//! Weather service access for WeatherList.
//!
//! [`WeatherGateway`] is the contract the list model talks to;
//! [`WeatherClient`] implements it over HTTP.

pub mod client;
pub mod gateway;
pub mod record;

pub use client::WeatherClient;
pub use gateway::WeatherGateway;
pub use record::{Condition, RecordField, RecordId, WeatherDraft, WeatherRecord};
