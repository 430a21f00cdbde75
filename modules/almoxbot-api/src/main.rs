use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use almoxbot_common::Config;
use gemini_client::GeminiClient;
use sheets_client::SheetsClient;
use telegram_client::TelegramClient;

mod catalog;
mod dedup;
mod extraction;
mod ledger;
mod notify;
mod pipeline;
mod ports;
mod webhook;

use catalog::SheetCatalog;
use dedup::{DedupCache, DEDUP_CAPACITY};
use extraction::GeminiExtractor;
use ledger::SheetLedger;
use notify::TelegramNotifier;
use pipeline::Pipeline;
use webhook::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("almoxbot_api=info".parse()?))
        .init();

    let config = Config::from_env();

    let sheets = Arc::new(SheetsClient::new(&config.sheets_access_token));
    let catalog = SheetCatalog::new(sheets.clone(), config.sheet_id.clone());
    let ledger = SheetLedger::new(sheets, config.sheet_id.clone());
    let extractor = GeminiExtractor::new(GeminiClient::new(
        &config.gemini_api_key,
        &config.gemini_model,
    ));
    let notifier = TelegramNotifier::new(TelegramClient::new(&config.bot_token));

    let pipeline = Pipeline::new(
        Arc::new(catalog),
        Arc::new(extractor),
        Arc::new(ledger),
        Arc::new(notifier),
        DedupCache::new(DEDUP_CAPACITY),
    );
    let state = Arc::new(AppState { pipeline });

    let app = Router::new()
        .route("/", get(webhook::health))
        .route("/webhook", post(webhook::webhook))
        .with_state(state)
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        );

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!("Almoxbot webhook server starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
