use std::sync::Arc;

use redis::Client as RedisClient;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mealplan_api::{
    config::Config, db, error, routes, services::realtime::AdminBroadcast, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let config = Arc::new(config);
    error::set_expose_internal_errors(!config.is_production());

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    info!("Database connected and migrations applied");

    let redis_client = RedisClient::open(config.redis_url.as_str())?;

    let state = AppState {
        db: pool,
        redis_client,
        config: config.clone(),
        admin_broadcast: AdminBroadcast::new(),
    };

    let app = routes::router(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("Meal planner API listening on {} ({})", addr, config.app_env);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
