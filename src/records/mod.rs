use anyhow::Result;

mod db;
pub mod sql;

pub use db::{connect, MySqlStore};

/// One row to migrate, read once at the start of the run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceRecord {
    pub id: i64,
    pub source_url: String,
    pub target_subdir: String,
}

/// Values written back to a row once its file is on local disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MigratedRow<'a> {
    pub id: i64,
    pub public_url: String,
    pub file_name: &'a str,
    pub raw_url: &'a str,
}

#[allow(async_fn_in_trait)]
pub trait RecordStore {
    async fn select_records(&self) -> Result<Vec<SourceRecord>>;
    async fn mark_migrated(&self, row: &MigratedRow<'_>) -> Result<u64>;
}

/// `{host}/{path}` as stored in the URL column after migration.
pub fn public_url(host: &str, path: &str) -> String {
    format!("{}/{}", host, path)
}
