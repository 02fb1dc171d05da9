use std::{collections::HashMap, path::Path};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, trace};

use mdui_connect::{Logo, MetadataUiLocator, RegisteredService, UiMetadata};
use mdui_slo::{errors, Result};

/// MduiEntry is the UI information declared for one entity id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MduiEntry {
    pub entity_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub information_url: Option<String>,
    #[serde(default)]
    pub privacy_statement_url: Option<String>,
    #[serde(default)]
    pub logo: Option<Logo>,
}

#[derive(Deserialize)]
struct Catalogue {
    #[serde(default)]
    entity: Vec<MduiEntry>,
}

/// StaticMetadataUiLocator serves MDUI entries from a catalogue loaded up
/// front. Fields an entry leaves out are taken from the registered service.
#[derive(Debug, Default)]
pub struct StaticMetadataUiLocator {
    entries: HashMap<String, MduiEntry>,
    service_fallback: bool,
}

impl StaticMetadataUiLocator {
    pub fn new(entries: Vec<MduiEntry>) -> Result<Self> {
        let mut indexed = HashMap::with_capacity(entries.len());
        for entry in entries {
            if indexed.contains_key(&entry.entity_id) {
                return Err(errors::bad_request(&format!(
                    "duplicate mdui entry for entity {}",
                    entry.entity_id
                )));
            }
            indexed.insert(entry.entity_id.clone(), entry);
        }
        Ok(Self {
            entries: indexed,
            service_fallback: false,
        })
    }

    /// When enabled, entities without an entry still get UI metadata built
    /// from their registered service.
    pub fn with_service_fallback(mut self, service_fallback: bool) -> Self {
        self.service_fallback = service_fallback;
        self
    }

    /// Parses a catalogue of `[[entity]]` tables.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let catalogue: Catalogue =
            toml::from_str(content).map_err(|err| errors::bad_request(&err))?;
        Self::new(catalogue.entity)
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = tokio::fs::read_to_string(path.as_ref())
            .await
            .map_err(errors::any)?;
        Self::from_toml_str(&content)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl MetadataUiLocator for StaticMetadataUiLocator {
    async fn locate(
        &self,
        entity_id: &str,
        registered_service: &RegisteredService,
    ) -> Result<Option<UiMetadata>> {
        match self.entries.get(entity_id) {
            Some(entry) => {
                trace!("located mdui entry for entity [{}]", entity_id);
                Ok(Some(merge(entry, registered_service)))
            }
            None if self.service_fallback => {
                debug!(
                    "no mdui entry for entity [{}], using registered service [{}]",
                    entity_id, registered_service.name
                );
                Ok(Some(from_service(registered_service)))
            }
            None => {
                debug!("no mdui entry for entity [{}]", entity_id);
                Ok(None)
            }
        }
    }
}

fn merge(entry: &MduiEntry, service: &RegisteredService) -> UiMetadata {
    let fallback = from_service(service);
    UiMetadata {
        display_name: entry.display_name.clone().or(fallback.display_name),
        description: entry.description.clone().or(fallback.description),
        logo: entry.logo.clone().or(fallback.logo),
        information_url: entry
            .information_url
            .clone()
            .or(fallback.information_url),
        privacy_statement_url: entry
            .privacy_statement_url
            .clone()
            .or(fallback.privacy_statement_url),
    }
}

fn from_service(service: &RegisteredService) -> UiMetadata {
    UiMetadata {
        display_name: Some(service.name.clone())
            .filter(|name| !name.is_empty()),
        description: service.description.clone(),
        logo: service.logo.clone().map(|url| Logo {
            url,
            ..Default::default()
        }),
        information_url: service.information_url.clone(),
        privacy_statement_url: service.privacy_url.clone(),
    }
}
