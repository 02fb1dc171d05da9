use std::collections::HashMap;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use mdui_connect::UiMetadata;
use mdui_slo::{errors, Result};

/// Flow scope key holding the URL to send the browser to after a denial.
pub const UNAUTHORIZED_REDIRECT_URL: &str = "unauthorizedRedirectUrl";
/// Flow scope key holding the service provider's MDUI bundle.
pub const SERVICE_UI_METADATA: &str = "serviceUserInterfaceMetadata";

/// FlowScope is the key-value state of a single in-flight login request.
///
/// It is owned by that request and handed to each step as `&mut`; nothing
/// in here outlives the request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowScope {
    attributes: HashMap<String, Value>,
}

impl FlowScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put<T: Serialize + ?Sized>(
        &mut self,
        key: &str,
        value: &T,
    ) -> Result<()> {
        let value = serde_json::to_value(value).map_err(errors::any)?;
        self.attributes.insert(key.to_owned(), value);
        Ok(())
    }

    /// Returns `None` when nothing was stored under `key`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.attributes
            .get(key)
            .map(|value| T::deserialize(value).map_err(errors::any))
            .transpose()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// Stores the redirect URL verbatim, an absent URL included.
pub fn put_unauthorized_redirect_url(
    scope: &mut FlowScope,
    url: Option<&str>,
) -> Result<()> {
    scope.put(UNAUTHORIZED_REDIRECT_URL, &url)
}

pub fn get_unauthorized_redirect_url(
    scope: &FlowScope,
) -> Result<Option<String>> {
    Ok(scope
        .get::<Option<String>>(UNAUTHORIZED_REDIRECT_URL)?
        .flatten())
}

pub fn put_service_ui_metadata(
    scope: &mut FlowScope,
    mdui: Option<&UiMetadata>,
) -> Result<()> {
    scope.put(SERVICE_UI_METADATA, &mdui)
}

pub fn get_service_ui_metadata(scope: &FlowScope) -> Result<Option<UiMetadata>> {
    Ok(scope.get::<Option<UiMetadata>>(SERVICE_UI_METADATA)?.flatten())
}
