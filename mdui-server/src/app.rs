use std::{ops::Deref, sync::Arc};

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::info;

use mdui_flow::MetadataUiParserAction;
use mdui_slo::errors;
use mdui_storage::{
    ServiceRegistry, StaticMetadataUiLocator, WebApplicationServiceFactory,
};

use crate::AppConfig;

pub type LoginAction = MetadataUiParserAction<
    WebApplicationServiceFactory,
    Arc<ServiceRegistry>,
    StaticMetadataUiLocator,
>;

pub struct App {
    pub config: AppConfig,
    pub registry: Arc<ServiceRegistry>,
    pub action: LoginAction,
}

impl App {
    pub async fn new(config: AppConfig) -> Result<Self> {
        info!("initializing service registry and metadata catalogue...");

        let registry = ServiceRegistry::from_path(
            &config.services_path,
            config.cache_size,
        )
        .await
        .context("could not load registered services")?;

        let locator = match &config.metadata_path {
            Some(path) => StaticMetadataUiLocator::from_path(path)
                .await
                .context("could not load mdui catalogue")?,
            None => StaticMetadataUiLocator::default(),
        }
        .with_service_fallback(config.mdui_service_fallback);

        info!("feature services successfully initialized!");
        Ok(Self::with_parts(config, Arc::new(registry), locator))
    }

    pub fn with_parts(
        config: AppConfig,
        registry: Arc<ServiceRegistry>,
        locator: StaticMetadataUiLocator,
    ) -> Self {
        let action = MetadataUiParserAction::new(
            config.entity_id_parameter.clone(),
            WebApplicationServiceFactory,
            Arc::clone(&registry),
            locator,
        );
        Self {
            config,
            registry,
            action,
        }
    }
}

#[derive(Clone)]
pub struct AppState(pub Arc<App>);

// deref so you can still access the inner fields easily
impl Deref for AppState {
    type Target = App;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AppState
where
    Self: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = errors::WithBacktrace;
    async fn from_request_parts(
        _: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self::from_ref(state))
    }
}
