use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

use crate::{db::sqlite::run_migrations, SqliteDatabase};

/// Drops and recreates the database at `url`, runs the migrations, and returns a ready-to-use
/// handle. Each test should use its own [`random_db_path`] so that tests can run in parallel.
pub async fn prepare_test_env(url: &str) -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    if let Err(e) = Sqlite::drop_database(url).await {
        warn!("Error dropping database {url}: {e:?}");
    }
    Sqlite::create_database(url).await.expect("Error creating database");
    info!("Created Sqlite database {url}");
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating connection to database");
    run_migrations(db.pool()).await.expect("Error running DB migrations");
    db
}

pub fn random_db_path() -> String {
    format!("sqlite://../data/test_orders_{}.db", rand::random::<u64>())
}
