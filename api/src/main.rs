use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, HttpServer};
use anyhow::Context;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use otp_api::handlers::json_error_handler;
use otp_api::{create_app, AppState};
use otp_core::repositories::{ChangeFeed, OtpRecordRepository};
use otp_core::services::{
    Clock, IssuanceService, IssuanceServiceConfig, NotificationDispatcher, OtpEmailTemplate,
    SystemClock, VerificationService, VerificationServiceConfig,
};
use otp_infra::{
    create_email_channel, InMemoryOtpStore, RedisChangeFeed, RedisClient, RedisOtpStore,
};
use otp_shared::config::{AppConfig, LogFormat, LoggingConfig, StoreBackend};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging);

    tracing::info!(
        environment = ?config.environment,
        store = ?config.store.backend,
        provider = %config.email.provider,
        "Starting OTP relay API server"
    );

    let (store, feed) = build_store(&config).await?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let issuance = Arc::new(IssuanceService::new(
        store.clone(),
        clock.clone(),
        IssuanceServiceConfig::from_settings(&config.otp, &config.store),
    ));
    let verification = Arc::new(VerificationService::new(
        store,
        clock,
        VerificationServiceConfig::from_settings(&config.store),
    ));

    let channel = create_email_channel(&config.email)
        .await
        .context("failed to create email channel")?;
    let template =
        OtpEmailTemplate::new(config.email.product_name.clone()).with_ttl_hint(config.otp.ttl_minutes);
    let dispatcher = NotificationDispatcher::new(
        channel,
        template,
        Duration::from_millis(config.dispatcher.poll_interval_ms),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let dispatcher_task = actix_web::rt::spawn(async move {
        dispatcher.run(feed, shutdown_rx).await;
    });

    let app_state = web::Data::new(AppState::new(issuance, verification));
    let bind_address = config.server.bind_address();
    let max_payload_size = config.server.max_payload_size;
    tracing::info!(address = %bind_address, "Server will bind");

    let mut server = HttpServer::new(move || {
        create_app(app_state.clone()).app_data(
            web::JsonConfig::default()
                .limit(max_payload_size)
                .error_handler(json_error_handler),
        )
    })
    .bind(&bind_address)
    .with_context(|| format!("failed to bind {}", bind_address))?;
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    let result = server.run().await;

    let _ = shutdown_tx.send(true);
    if let Err(e) = dispatcher_task.await {
        tracing::warn!(error = %e, "Notification dispatcher task ended abnormally");
    }

    result.context("HTTP server failed")
}

/// Record store and change feed for the configured backend
async fn build_store(
    config: &AppConfig,
) -> anyhow::Result<(Arc<dyn OtpRecordRepository>, Arc<dyn ChangeFeed>)> {
    match config.store.backend {
        StoreBackend::Redis => {
            let client = RedisClient::connect(&config.store.url, config.store.connect_retries)
                .await
                .context("failed to connect to Redis")?;
            let feed = RedisChangeFeed::new(client.clone(), &config.store, &config.dispatcher)
                .await
                .context("failed to prepare the change stream")?;
            let store: Arc<dyn OtpRecordRepository> =
                Arc::new(RedisOtpStore::new(client, config.store.clone()));
            let feed: Arc<dyn ChangeFeed> = Arc::new(feed);
            Ok((store, feed))
        }
        StoreBackend::Memory => {
            if config.environment.is_production() {
                tracing::warn!("In-memory record store selected in production");
            }
            tracing::warn!("Using the in-memory record store; records are lost on restart");
            let (store, feed) =
                InMemoryOtpStore::new(Arc::new(SystemClock), config.dispatcher.batch_size);
            let store: Arc<dyn OtpRecordRepository> = Arc::new(store);
            let feed: Arc<dyn ChangeFeed> = Arc::new(feed.with_redelivery_delay(
                Duration::from_millis(config.dispatcher.claim_idle_ms),
            ));
            Ok((store, feed))
        }
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(logging.source_location)
        .with_line_number(logging.source_location);

    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Compact => builder.compact().init(),
    }
}
