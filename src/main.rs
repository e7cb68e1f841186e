use std::{sync::Arc, time::Duration};

use versi::{
    app,
    auth::blacklist::spawn_purge_task,
    config::AppConfig,
    db,
    email::{worker, SmtpEmailSender},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "versi=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    let pool = db::connect(&config.database_url).await?;
    db::migrate(&pool).await?;
    tracing::info!("database migrated");

    let sender = Arc::new(SmtpEmailSender::new(&config.smtp));
    let purge_every = Duration::from_secs(config.blacklist_purge_secs.max(1));
    let bind_addr = config.bind_addr;
    let state = AppState::init(config, pool).await?;

    worker::spawn(state.email_queue.clone(), sender);
    spawn_purge_task(state.blacklist.clone(), purge_every);

    app::serve(app::build_app(state), bind_addr).await
}
