use sqlx::PgPool;

/// Create the chunks table and its indexes if they do not already exist.
pub async fn run_migrations(pool: &PgPool, table: &str) -> Result<(), sqlx::Error> {
    let create_table = format!(
        "
        CREATE TABLE IF NOT EXISTS {table} (
            id      BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
            title   TEXT NOT NULL,
            content TEXT NOT NULL,
            created TIMESTAMPTZ NOT NULL,
            expires TIMESTAMPTZ NOT NULL
        )
        "
    );

    sqlx::query(&create_table).execute(pool).await?;

    let indexes = [
        format!("CREATE INDEX IF NOT EXISTS idx_{table}_created ON {table} (created DESC)"),
        format!("CREATE INDEX IF NOT EXISTS idx_{table}_expires ON {table} (expires)"),
    ];

    for idx in &indexes {
        sqlx::query(idx).execute(pool).await?;
    }

    Ok(())
}
