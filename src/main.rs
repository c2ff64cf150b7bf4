//! Insurance Advisor
//!
//! Serves the advisor landing page and the scripted chat widget behind it.
//! The widget asks which kind of insurance the visitor wants, walks them
//! through a short fixed questionnaire and answers with a canned
//! recommendation. Conversations live in memory only.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod assets;
mod config;
mod conversation;
mod core;
mod landing;
mod routes;
mod widget;

use config::{Config, SiteConfig};
use widget::WidgetRegistry;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub site: Arc<SiteConfig>,
    pub widgets: Arc<WidgetRegistry>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "insurance_advisor=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let site = config.load_site()?;
    match &config.site_config {
        Some(path) => tracing::info!("Loaded landing page copy from {}", path.display()),
        None => tracing::info!("Using built-in landing page copy"),
    }

    let widgets = Arc::new(WidgetRegistry::new(
        config.max_widgets,
        config.widget_idle_timeout(),
    ));
    let sweeper = tokio::spawn(widget::sweep_idle(widgets.clone()));

    let state_widgets = widgets.clone();
    let state = AppState {
        site: Arc::new(site),
        widgets,
    };

    let app = Router::new()
        .merge(routes::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!(
        max_widgets = config.max_widgets,
        idle_secs = config.widget_idle_secs,
        "Insurance Advisor running at http://{}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    tracing::info!("Shut down with {} widget(s) open", state_widgets.len().await);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
