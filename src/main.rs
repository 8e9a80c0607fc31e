mod action_data;
mod appstate;
mod auth;
mod config;
mod database;
mod homepage;
mod ident;
mod joke;
mod known_errors;
mod notfoundpage;
mod seed;
mod theme;
mod validate;

#[cfg(test)]
mod test_support;

use axum::Router;
use axum::routing::get;
use clap::Parser;
use dotenvy::dotenv;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::appstate::AppState;
use crate::config::Config;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(homepage::homepage))
        .route("/jokes.css", get(theme::serve_stylesheet))
        .merge(auth::router())
        .merge(joke::router())
        .fallback(notfoundpage::not_found_page)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::parse();

    let app_state = AppState::from_config(&config)
        .await
        .expect("Failed to initialize application state");

    if config.seed {
        seed::seed_dev_data(&app_state)
            .await
            .expect("Failed to seed dev data");
    }

    let app = app(app_state);

    tracing::info!("listening on http://{}", &config.site_addr);
    let listener = tokio::net::TcpListener::bind(&config.site_addr)
        .await
        .expect("failed to bind the tcp address");
    axum::serve(listener, app.into_make_service())
        .await
        .expect("failed to serve on the address");
}
