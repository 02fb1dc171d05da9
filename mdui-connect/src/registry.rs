use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};

use mdui_slo::Result;

use crate::identity::ServiceIdentity;

/// AccessStrategy decides whether a registered service may take part in
/// single sign-on at all.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AccessStrategy {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Where to send the browser when access is refused.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unauthorized_redirect_url: Option<String>,
}

impl Default for AccessStrategy {
    fn default() -> Self {
        Self {
            enabled: true,
            unauthorized_redirect_url: None,
        }
    }
}

impl AccessStrategy {
    pub fn is_service_access_allowed(&self) -> bool {
        self.enabled
    }
}

fn default_true() -> bool {
    true
}

/// RegisteredService is the authoritative registry entry for a relying
/// party.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RegisteredService {
    pub id: i64,
    /// Regular expression that must match the whole service identity id.
    pub service_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub information_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_url: Option<String>,
    #[serde(default)]
    pub evaluation_order: i32,
    #[serde(default)]
    pub access_strategy: AccessStrategy,
}

impl RegisteredService {
    pub fn is_access_allowed(&self) -> bool {
        self.access_strategy.is_service_access_allowed()
    }

    pub fn unauthorized_redirect_url(&self) -> Option<&str> {
        self.access_strategy.unauthorized_redirect_url.as_deref()
    }
}

/// ServiceDirectory finds the registered service governing an identity.
///
/// `Ok(None)` means the identity is unknown; `Err` is reserved for the
/// directory itself failing.
#[automock]
#[async_trait]
pub trait ServiceDirectory: Send + Sync {
    async fn find_by_identity(
        &self,
        identity: &ServiceIdentity,
    ) -> Result<Option<RegisteredService>>;
}

#[async_trait]
impl<T: ServiceDirectory + ?Sized> ServiceDirectory for Arc<T> {
    async fn find_by_identity(
        &self,
        identity: &ServiceIdentity,
    ) -> Result<Option<RegisteredService>> {
        (**self).find_by_identity(identity).await
    }
}
