use anyhow::{Context, Result};
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::Row;

use crate::config::{DbConfig, SelectionMode, TableConfig};

use super::{sql, MigratedRow, RecordStore, SourceRecord};

pub async fn connect(db: &DbConfig) -> Result<MySqlPool> {
    let opts = MySqlConnectOptions::new()
        .host(&db.host)
        .port(db.port)
        .username(&db.user)
        .password(&db.password)
        .database(&db.name)
        .charset("utf8mb4");

    let pool = MySqlPoolOptions::new()
        .max_connections(2)
        .connect_with(opts)
        .await
        .with_context(|| format!("connect to mysql://{}:{}/{}", db.host, db.port, db.name))?;
    Ok(pool)
}

pub struct MySqlStore {
    pool: MySqlPool,
    table: TableConfig,
    mode: SelectionMode,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool, table: TableConfig, mode: SelectionMode) -> Self {
        MySqlStore { pool, table, mode }
    }
}

impl RecordStore for MySqlStore {
    async fn select_records(&self) -> Result<Vec<SourceRecord>> {
        let query = sql::select_records(&self.table, self.mode);
        let rows = sqlx::query(&query)
            .bind(&self.table.where_value)
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("select records from {}", self.table.table))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(SourceRecord {
                id: row.try_get::<i64, _>("id")?,
                source_url: row.try_get::<String, _>("url")?,
                target_subdir: row.try_get::<Option<String>, _>("subdir")?.unwrap_or_default(),
            });
        }
        Ok(out)
    }

    async fn mark_migrated(&self, row: &MigratedRow<'_>) -> Result<u64> {
        let query = sql::update_migrated(&self.table);
        let res = sqlx::query(&query)
            .bind(&row.public_url)
            .bind(row.file_name)
            .bind(row.raw_url)
            .bind(row.id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("update record id={}", row.id))?;
        Ok(res.rows_affected())
    }
}
