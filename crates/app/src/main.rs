use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "valigia={level},telegram_bot={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let database = parse_database(&settings.database).await?;
    let ledger = engine::Ledger::new(database);

    let telegram = settings.telegram;
    tasks.spawn(async move {
        let mut builder = telegram_bot::Bot::builder()
            .token(&telegram.token)
            .ledger(ledger)
            .rate_access_key(&telegram.rate_access_key);
        if let Some(api) = telegram.rate_api.as_deref() {
            builder = builder.rate_api(api);
        }

        match builder.build() {
            Ok(bot) => bot.run().await,
            Err(err) => tracing::error!("failed to initialize telegram bot: {err}"),
        }
    });

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
