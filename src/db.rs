use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use std::str::FromStr;
use std::time::Duration;

/// Open the SQLite pool / 打开数据库连接池
///
/// File databases run in WAL mode with a busy timeout so concurrent writers
/// wait for the lock instead of failing.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    let mut options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(10));

    if !database_url.contains(":memory:") {
        options = options
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    tracing::info!("Database connected: {}", database_url);
    Ok(pool)
}

/// Run database migrations / 运行数据库迁移
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS staff (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            hospital TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 每个可搜索字段都带一个小写副本列（*_lower），在写入时由应用层计算，
    // 这样 SQL 与内存匹配使用同一套 Unicode 小写规则
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS patients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name_th TEXT NOT NULL DEFAULT '',
            middle_name_th TEXT NOT NULL DEFAULT '',
            last_name_th TEXT NOT NULL DEFAULT '',
            first_name_en TEXT NOT NULL DEFAULT '',
            middle_name_en TEXT NOT NULL DEFAULT '',
            last_name_en TEXT NOT NULL DEFAULT '',
            date_of_birth TEXT,
            patient_hn TEXT NOT NULL DEFAULT '',
            national_id TEXT NOT NULL UNIQUE,
            passport_id TEXT NOT NULL DEFAULT '',
            phone_number TEXT NOT NULL DEFAULT '',
            email TEXT NOT NULL DEFAULT '',
            gender TEXT NOT NULL,
            hospital TEXT NOT NULL,
            created_at TEXT NOT NULL,
            first_name_th_lower TEXT NOT NULL DEFAULT '',
            middle_name_th_lower TEXT NOT NULL DEFAULT '',
            last_name_th_lower TEXT NOT NULL DEFAULT '',
            first_name_en_lower TEXT NOT NULL DEFAULT '',
            middle_name_en_lower TEXT NOT NULL DEFAULT '',
            last_name_en_lower TEXT NOT NULL DEFAULT '',
            national_id_lower TEXT NOT NULL DEFAULT '',
            passport_id_lower TEXT NOT NULL DEFAULT '',
            phone_number_lower TEXT NOT NULL DEFAULT '',
            email_lower TEXT NOT NULL DEFAULT '',
            hospital_lower TEXT NOT NULL DEFAULT ''
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_patients_hospital ON patients(hospital_lower)")
        .execute(pool)
        .await?;

    Ok(())
}
