use std::sync::Arc;

use color_eyre::eyre::Result;
use dotenv::dotenv;
use salon_api::config::ApiConfig;
use salon_db::{PgBookingStore, create_pool, schema::initialize_database};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();

    let config = ApiConfig::from_env()?;

    let db_pool = create_pool(&config.database_url).await?;
    initialize_database(&db_pool).await?;

    let store = Arc::new(PgBookingStore::new(db_pool));
    salon_api::start_server(config, store).await?;

    Ok(())
}
