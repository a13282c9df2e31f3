use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Failed,
}

/// Result of one record's migration attempt as it appears in the report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MigrationOutcome {
    pub id: i64,
    pub url: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl MigrationOutcome {
    pub fn success(id: i64, path: String) -> Self {
        MigrationOutcome { id, url: path, status: Status::Success, reason: None }
    }

    pub fn failed(id: i64, source_url: String, reason: &str) -> Self {
        MigrationOutcome { id, url: source_url, status: Status::Failed, reason: Some(reason.to_string()) }
    }
}

/// A file written to local disk for one record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Migrated {
    pub path: String,
    pub file_name: String,
}

// Plan envelope types
#[derive(Serialize)]
pub struct RecordSample { pub id: i64, pub url: String, pub subdir: String }

#[derive(Serialize)]
pub struct MigratePlan { pub records: usize, pub mode: String, pub on_access_denied: String, pub sample_records: Vec<RecordSample> }

// Apply/result envelope types
#[derive(Serialize)]
pub struct MigrateTotals { pub succeeded: usize, pub failed: usize, pub aborted: bool }
