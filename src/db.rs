use sqlx::MySqlPool;

use crate::error::StoreResult;

pub async fn init_db(database_url: &str) -> StoreResult<MySqlPool> {
    Ok(MySqlPool::connect(database_url).await?)
}

/// Applies the embedded `migrations/` directory.
pub async fn run_migrations(pool: &MySqlPool) -> StoreResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
