use askama::Template;
use axum::{
    extract::Query,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use tracing::info;

use mdui_connect::UiMetadata;
use mdui_flow::{
    get_service_ui_metadata, get_unauthorized_redirect_url, Action,
    FlowOutcome, FlowScope,
};
use mdui_slo::{HtmlTemplate, Result};

use crate::AppState;

pub fn new_router(state: AppState) -> Router {
    Router::new()
        .route("/login", get(login_html))
        .with_state(state)
}

#[derive(Template, Default)]
#[template(path = "login.html")]
pub struct Login {
    pub post_url: String,
    pub username_prompt: String,
    pub mdui: Option<UiMetadata>,
}

/// Renders the login page, branded with the service provider's MDUI when
/// the request names one the registry lets in.
async fn login_html(
    app: AppState,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response> {
    let mut scope = FlowScope::new();
    match app.action.execute(&params, &mut scope).await? {
        FlowOutcome::Continue => Ok(HtmlTemplate(Login {
            post_url: "/login".to_string(),
            username_prompt: "Enter your username".to_string(),
            mdui: get_service_ui_metadata(&scope)?,
        })
        .into_response()),
        FlowOutcome::Unauthorized(denied) => {
            match get_unauthorized_redirect_url(&scope)?
                .filter(|url| !url.trim().is_empty())
            {
                Some(url) => {
                    info!(
                        "entity [{}] is not allowed, redirecting to {}",
                        denied.entity_id, url
                    );
                    Ok(Redirect::to(&url).into_response())
                }
                None => Err(denied.into()),
            }
        }
    }
}
