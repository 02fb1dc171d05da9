mod matcher;
pub mod metadata;
pub mod registry;
pub mod resolver;

pub use matcher::Regexp;
pub use metadata::{MduiEntry, StaticMetadataUiLocator};
pub use registry::ServiceRegistry;
pub use resolver::WebApplicationServiceFactory;
