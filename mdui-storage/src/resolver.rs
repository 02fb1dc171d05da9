use mdui_connect::{ServiceIdentity, ServiceResolver};

/// WebApplicationServiceFactory resolves entity ids the way web
/// applications are identified: the id is the URL with any servlet session
/// path parameter stripped.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebApplicationServiceFactory;

impl ServiceResolver for WebApplicationServiceFactory {
    fn resolve(&self, entity_id: &str) -> ServiceIdentity {
        ServiceIdentity {
            id: cleanup_url(entity_id),
            original_url: entity_id.to_owned(),
        }
    }
}

/// Removes a `;jsessionid=...` segment, keeping any query string after it.
pub fn cleanup_url(url: &str) -> String {
    let Some(jsession) = url.find(";jsession") else {
        return url.to_owned();
    };
    match url[jsession..].find('?') {
        Some(query) => {
            let mut cleaned = String::with_capacity(url.len());
            cleaned.push_str(&url[..jsession]);
            cleaned.push_str(&url[jsession + query..]);
            cleaned
        }
        None => url[..jsession].to_owned(),
    }
}
