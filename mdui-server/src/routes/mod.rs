use anyhow::Result;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::{
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
    LatencyUnit,
};
use tracing::Level;

use crate::{controllers::login, AppState};

pub struct AppRouter;

impl AppRouter {
    pub fn build(state: AppState) -> Result<Router> {
        let router = Router::new()
            .nest_service("/static", ServeDir::new("static"))
            .merge(login::new_router(state))
            .layer(
                ServiceBuilder::new().layer(
                    TraceLayer::new_for_http()
                        .make_span_with(
                            DefaultMakeSpan::new().level(Level::INFO),
                        )
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(LatencyUnit::Micros),
                        ),
                ),
            );
        Ok(router)
    }
}
