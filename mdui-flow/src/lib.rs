//! The login-flow step that authorizes a SAML service provider and hands its
//! MDUI branding to the login page.

pub mod action;
pub mod params;
pub mod scope;

pub use action::{
    Action, FlowOutcome, MetadataUiParserAction, UnauthorizedService,
    DEFAULT_ENTITY_ID_PARAMETER,
};
pub use params::RequestParameters;
pub use scope::{
    get_service_ui_metadata, get_unauthorized_redirect_url,
    put_service_ui_metadata, put_unauthorized_redirect_url, FlowScope,
    SERVICE_UI_METADATA, UNAUTHORIZED_REDIRECT_URL,
};
