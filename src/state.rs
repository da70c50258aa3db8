use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::payments::gateway::{PaymentGateway, StripeGateway};
use crate::storage::{MediaStore, S3MediaStore};

/// Everything a handler needs, built once at startup and passed by clone.
/// No ambient singletons: the pool and the external clients live here.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub media: Arc<dyn MediaStore>,
    pub payments: Arc<dyn PaymentGateway>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        let media =
            Arc::new(S3MediaStore::new(&config.storage).await?) as Arc<dyn MediaStore>;

        let payments = Arc::new(StripeGateway::new(
            &config.stripe_api_base,
            &config.stripe_secret_key,
        )) as Arc<dyn PaymentGateway>;

        Ok(Self {
            db,
            config,
            media,
            payments,
        })
    }

    pub fn from_parts(
        db: PgPool,
        config: Arc<AppConfig>,
        media: Arc<dyn MediaStore>,
        payments: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            db,
            config,
            media,
            payments,
        }
    }
}
