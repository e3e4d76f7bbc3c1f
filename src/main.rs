use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use account_service::config::Settings;
use account_service::http::{start_http_server, HttpServerState};
use account_service::provider::{GoTrueProvider, IdentityProvider};
use account_service::services::{AccountService, Reconciler, VerificationFlow};
use account_service::store::{PgUserStore, UserStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let settings = Settings::load()?;

    let pool = PgPoolOptions::new()
        .max_connections(settings.database.max_connections)
        .acquire_timeout(Duration::from_secs(settings.database.acquire_timeout_secs))
        .connect(&settings.database.url)
        .await
        .context("failed to connect to Postgres")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run database migrations")?;
    info!("database migrations applied");

    let store: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool));
    let provider: Arc<dyn IdentityProvider> = Arc::new(GoTrueProvider::new(settings.auth.clone()));

    let reconciler = Reconciler::new(store.clone());
    let state = HttpServerState {
        flow: VerificationFlow::new(provider.clone(), reconciler),
        account: AccountService::new(provider.clone(), store.clone()),
        store,
        provider,
        internal_api_key: settings.internal_api_key.clone(),
        default_redirect_url: settings.auth.default_redirect_url.clone(),
    };

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    start_http_server(&addr, state).await
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("account_service=info,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json())
        .init();
}
