mod config;
mod error;
mod handlers;
mod models;
mod render;
mod services;
mod session;
mod state;
mod validation;

use actix_cors::Cors;
use actix_web::middleware::NormalizePath;
use actix_web::{web, App, HttpServer};
use tracing::{info, warn};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use services::submission;
use state::AppState;

/// `rust_log` overrides the default level; the fallback record target stays
/// enabled unless `rust_log` names it explicitly.
fn env_filter(development: bool, rust_log: Option<&str>) -> EnvFilter {
    let default_level = if development { "debug" } else { "info" };
    let filter = rust_log
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level));

    if rust_log.is_some_and(|s| s.contains(submission::FALLBACK_TARGET)) {
        return filter;
    }
    match format!("{}=warn", submission::FALLBACK_TARGET).parse::<Directive>() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}

/// Cross-origin reads without credentials only, so a foreign page can never
/// read a form rendered for this browser's cookies.
fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET"])
        .max_age(3600)
}

fn init_tracing(development: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = env_filter(development, rust_log.as_deref());
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    init_tracing(config.development);

    if config.session_secret == config::DEFAULT_SESSION_SECRET {
        warn!("SESSION_SECRET not set; using the development default");
    }

    let app_state = web::Data::new(AppState::from_config(&config));
    info!(
        port = config.port,
        development = config.development,
        store_configured = app_state.store.is_configured(),
        "starting {}",
        handlers::SERVICE_NAME
    );

    HttpServer::new(move || {
        App::new()
            .wrap(NormalizePath::trim())
            .wrap(cors())
            .app_data(app_state.clone())
            .configure(handlers::configure)
    })
    .bind(("0.0.0.0", config.port))?
    .run()
    .await
}
