// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use filper_server::{
    api::router,
    auth::{PasswordHasher, TokenService},
    config::{Config, LogFormat, SecretSource, DEFAULT_LOG_FILTER},
    providers::n8n::N8nClient,
    state::AppState,
    storage::Store,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    if config.jwt_secret_source == SecretSource::Generated {
        warn!("JWT_SECRET is not set; using a random secret, sessions will not survive a restart");
    }

    let store = Store::open(&config.database_path())?;
    let tokens = TokenService::new(&config.jwt_secret, config.token_ttl);
    let passwords = PasswordHasher::new(config.bcrypt_cost)?;
    let bcrypt_cost = passwords.cost();
    let n8n = N8nClient::new(config.n8n_timeout)?;

    let state = AppState::new(store, tokens, passwords, n8n);
    let app = router(state, &config.cors_origins);

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    info!(
        address = %addr,
        data_dir = %config.data_dir.display(),
        bcrypt_cost,
        "Filper API listening (docs at /docs)"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().flatten_event(true))
            .init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT"),
        _ = terminate => info!("received SIGTERM"),
    }
}
