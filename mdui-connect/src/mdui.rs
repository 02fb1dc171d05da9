use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};

use mdui_slo::Result;

use crate::registry::RegisteredService;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Logo {
    pub url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

/// UiMetadata is the MDUI bundle a login page renders for a service
/// provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct UiMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<Logo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub information_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_statement_url: Option<String>,
}

/// MetadataUiLocator finds the UI metadata published for an entity id.
///
/// `Ok(None)` is the ordinary case of a service provider whose metadata
/// carries no MDUI extension.
#[automock]
#[async_trait]
pub trait MetadataUiLocator: Send + Sync {
    async fn locate(
        &self,
        entity_id: &str,
        registered_service: &RegisteredService,
    ) -> Result<Option<UiMetadata>>;
}
