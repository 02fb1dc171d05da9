use std::{
    path::{Path, PathBuf},
    sync::RwLock,
};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use mdui_connect::{RegisteredService, ServiceDirectory, ServiceIdentity};
use mdui_slo::{errors, Result};

use crate::matcher::Regexp;

/// A service definition file holds either one service or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum Document {
    Many(Vec<RegisteredService>),
    One(Box<RegisteredService>),
}

/// ServiceRegistry keeps registered services in memory, ordered by
/// evaluation order, and answers lookups by pattern.
///
/// When built from a path it can be reloaded; the reload replaces the whole
/// set at once, so a lookup never sees half of an update.
#[derive(Debug)]
pub struct ServiceRegistry {
    source: Option<PathBuf>,
    services: RwLock<Vec<RegisteredService>>,
    matcher: Regexp,
}

impl ServiceRegistry {
    pub fn from_services(
        services: Vec<RegisteredService>,
        cache_size: usize,
    ) -> Result<Self> {
        Ok(Self {
            source: None,
            services: RwLock::new(prepare(services)?),
            matcher: Regexp::new(cache_size),
        })
    }

    /// Loads every `*.json` file of a directory, or a single JSON file.
    pub async fn from_path(
        path: impl Into<PathBuf>,
        cache_size: usize,
    ) -> Result<Self> {
        let path = path.into();
        let services = prepare(load_services(&path).await?)?;
        info!(
            "loaded {} registered services from {}",
            services.len(),
            path.display()
        );
        Ok(Self {
            source: Some(path),
            services: RwLock::new(services),
            matcher: Regexp::new(cache_size),
        })
    }

    /// Re-reads the source the registry was built from and returns the
    /// number of services now registered. A failed reload keeps the
    /// previous set.
    pub async fn reload(&self) -> Result<usize> {
        let Some(path) = &self.source else {
            return self.len();
        };
        let services = prepare(load_services(path).await?)?;
        let count = services.len();
        {
            let mut wservices = self.services.write().map_err(errors::any)?;
            *wservices = services;
        };
        info!("reloaded {} registered services from {}", count, path.display());
        Ok(count)
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.services.read().map_err(errors::any)?.len())
    }

    fn lookup(
        &self,
        identity: &ServiceIdentity,
    ) -> Result<Option<RegisteredService>> {
        let rservices = self.services.read().map_err(errors::any)?;
        for service in rservices.iter() {
            if self.matcher.matches(&service.service_id, &identity.id)? {
                debug!(
                    "service [{}] matched registered service [{}]",
                    identity.id, service.name
                );
                return Ok(Some(service.clone()));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl ServiceDirectory for ServiceRegistry {
    async fn find_by_identity(
        &self,
        identity: &ServiceIdentity,
    ) -> Result<Option<RegisteredService>> {
        self.lookup(identity)
    }
}

fn prepare(
    mut services: Vec<RegisteredService>,
) -> Result<Vec<RegisteredService>> {
    for service in services.iter() {
        Regexp::compile(&service.service_id).map_err(|err| {
            errors::bad_request(&format!(
                "registered service {} has an invalid service id: {}",
                service.id, err
            ))
        })?;
    }
    services.sort_by_key(|service| (service.evaluation_order, service.id));
    Ok(services)
}

async fn load_services(path: &Path) -> Result<Vec<RegisteredService>> {
    let metadata = tokio::fs::metadata(path).await.map_err(errors::any)?;
    if !metadata.is_dir() {
        return load_file(path).await;
    }

    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(path).await.map_err(errors::any)?;
    while let Some(entry) = entries.next_entry().await.map_err(errors::any)? {
        let file = entry.path();
        if file.extension().is_some_and(|ext| ext == "json") {
            files.push(file);
        }
    }
    files.sort();

    let mut services = Vec::new();
    for file in files {
        services.extend(load_file(&file).await?);
    }
    Ok(services)
}

async fn load_file(path: &Path) -> Result<Vec<RegisteredService>> {
    let content = tokio::fs::read(path).await.map_err(errors::any)?;
    let document: Document =
        serde_json::from_slice(&content).map_err(|err| {
            errors::bad_request(&format!(
                "could not parse {}: {}",
                path.display(),
                err
            ))
        })?;
    Ok(match document {
        Document::Many(services) => services,
        Document::One(service) => vec![*service],
    })
}
