use mockall::automock;
use serde::{Deserialize, Serialize};

/// ServiceIdentity is the resolved form of the application asking to
/// authenticate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServiceIdentity {
    /// Identifier matched against registered service patterns.
    pub id: String,
    /// The value exactly as it arrived on the request.
    pub original_url: String,
}

impl ServiceIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            original_url: id.clone(),
            id,
        }
    }
}

/// ServiceResolver turns a raw entity id into a service identity.
///
/// Resolution is total: a string that matches nothing still produces an
/// identity, it just won't be recognized by any directory.
#[automock]
pub trait ServiceResolver: Send + Sync {
    fn resolve(&self, entity_id: &str) -> ServiceIdentity;
}
