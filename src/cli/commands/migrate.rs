use crate::config;
use crate::database::DatabaseManager;

pub async fn handle() -> anyhow::Result<()> {
    DatabaseManager::init(&config::config().database).await?;
    let result = DatabaseManager::migrate().await;
    DatabaseManager::close().await;
    Ok(result?)
}
