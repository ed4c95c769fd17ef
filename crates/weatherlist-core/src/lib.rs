pub mod config;
pub mod error;

pub use config::{
    Config, NotificationConfig, ServiceConfig, TimerPolicy, ValidationResult, ViewConfig,
    DEFAULT_ITEMS_PER_PAGE, DEFAULT_NOTIFICATION_MS,
};
pub use error::{
    AppError, LookupError, NetworkError, ReqwestErrorExt, WriteError, WriteOp,
};

use anyhow::Result;

/// Initialize logging for the application
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::info!("WeatherList core initialized");
    Ok(())
}
