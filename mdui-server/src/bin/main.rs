use std::{env, net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mdui_server::{
    load, shutdown_signal, version, App, AppConfig, AppRouter, AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = env::args().collect::<Vec<_>>();
    let config =
        if args.len() == 3 && (args[1] == "-c" || args[1] == "--config") {
            load(&args[2])?
        } else {
            AppConfig::parse()
        };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    debug!("{:#?}", &config);
    info!("{}", version());
    run_server(config).await
}

async fn run_server(config: AppConfig) -> Result<()> {
    info!("configuration parsed, loading registered services...");

    let app = Arc::new(App::new(config.clone()).await?);

    registry_reload(app.clone());

    let router = AppRouter::build(AppState(app))
        .context("could not initialize application routes")?;
    let host = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&host)
        .await
        .context("could not bind to endpoint")?;

    info!("login server, listening on {}", host);
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("error while starting API server")?;

    Ok(())
}

fn registry_reload(app: Arc<App>) {
    if app.config.reload_interval == 0 {
        info!("service registry reloading disabled");
        return;
    }
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(
            tokio::time::Duration::from_secs(app.config.reload_interval),
        );
        // the first tick fires immediately and the registry is fresh
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(err) = app.registry.reload().await {
                        error!("{}", err);
                    }
                },
                _ = shutdown_signal() => {
                    info!("stop registry reload...");
                    break;
                }
            }
        }
    });
}
