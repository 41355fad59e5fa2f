use canebar::{
    bot::{self, BotData},
    config::{database, store, users::RoleDirectory},
    core::bootstrap,
    errors::{Error, Result},
};
use dotenvy::dotenv;
use std::{env, sync::Arc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load store configuration, falling back to the built-in menu
    let config = store::load_default_config()
        .inspect(|_| info!("Loaded config.toml"))
        .unwrap_or_else(|e| {
            warn!("{}; using built-in store defaults", e);
            store::StoreConfig::default()
        });

    // 4. Connect and create tables
    let db = database::create_connection()
        .await
        .inspect(|_| info!("Connected to {}", database::get_database_url()))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database tables ready."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed menu, stock, accounts and settings on first start
    bootstrap::seed_initial_data(&db, &config)
        .await
        .inspect_err(|e| error!("Failed to seed initial data: {}", e))?;

    // 6. Run the bot
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {}", e))
        .map_err(Error::EnvVar)?;
    let roles = RoleDirectory::from_env();

    bot::run_bot(token, BotData::new(db, Arc::new(config), roles)).await
}
