use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const DEFAULT_REPORT_PATH: &str = "upload_results.json";

/// Load settings from `explicit` if given, otherwise from a `.env` found
/// upward from the working directory. Only an absent default `.env` is skipped.
pub fn load_env_file(explicit: Option<&Path>) -> anyhow::Result<()> {
    use anyhow::Context;

    match explicit {
        Some(path) => {
            dotenvy::from_path(path).with_context(|| format!("load env file {}", path.display()))?;
        }
        None => match dotenvy::dotenv() {
            Ok(_) => {}
            Err(dotenvy::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e).context("load .env"),
        },
    }
    Ok(())
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required configuration: {0}")]
    Missing(&'static str),
    #[error("invalid value for {var}: {value:?} ({reason})")]
    Invalid { var: &'static str, value: String, reason: String },
}

/// Which rows of the source table are candidates for migration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionMode {
    /// Every row whose URL column is set.
    ByNonNullUrl,
    /// Only rows whose file name column is still unset; safe to re-run.
    ByNullFilename,
}

/// What to do when a download resolves to an HTML page instead of a file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OnAccessDenied {
    SkipRecord,
    AbortRun,
}

#[derive(Clone, Debug)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct TableConfig {
    pub table: String,
    pub id_column: String,
    pub url_column: String,
    pub file_name_column: String,
    pub raw_url_column: String,
    pub where_column: String,
    pub where_value: String,
}

#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub directory_base: String,
    pub file_name_host: String,
    pub file_name_prefix: String,
}

#[derive(Clone, Debug)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub headers: Vec<(String, String)>,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub db: DbConfig,
    pub table: TableConfig,
    pub storage: StorageConfig,
    pub http: HttpConfig,
    pub selection_mode: SelectionMode,
    pub on_access_denied: OnAccessDenied,
    pub request_interval: Duration,
    pub report_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let port_raw = required("DB_PORT")?;
        let port = port_raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
            var: "DB_PORT",
            value: port_raw.clone(),
            reason: e.to_string(),
        })?;

        let db = DbConfig {
            host: required("DB_HOST")?,
            port,
            user: required("DB_USER")?,
            password: lookup("DB_PASS").unwrap_or_default(),
            name: required("DB_NAME")?,
        };

        let table = TableConfig {
            table: required("TABLE_NAME")?,
            id_column: get("ID_COLUMN_NAME").unwrap_or_else(|| "id".to_string()),
            url_column: required("URL_COLUMN_NAME")?,
            file_name_column: required("FILE_NAME_COLUMN_NAME")?,
            raw_url_column: required("RAW_URL_COLUMN_NAME")?,
            where_column: required("TABLE_WHERE_COLUMN")?,
            where_value: required("TABLE_WHERE_VALUE")?,
        };

        let storage = StorageConfig {
            directory_base: required("DIRECTORY_BASE")?,
            file_name_host: required("FILE_NAME_HOST")?,
            file_name_prefix: required("FILE_NAME_PREFIX")?,
        };

        let selection_mode = match get("SELECTION_MODE").as_deref() {
            None | Some("non-null-url") => SelectionMode::ByNonNullUrl,
            Some("null-filename") => SelectionMode::ByNullFilename,
            Some(other) => return Err(invalid("SELECTION_MODE", other, "expected non-null-url or null-filename")),
        };

        let on_access_denied = match get("ON_ACCESS_DENIED").as_deref() {
            None | Some("skip-record") => OnAccessDenied::SkipRecord,
            Some("abort-run") => OnAccessDenied::AbortRun,
            Some(other) => return Err(invalid("ON_ACCESS_DENIED", other, "expected skip-record or abort-run")),
        };

        let request_interval = Duration::from_millis(parse_u64(&get, "REQUEST_INTERVAL_MS", 5_000)?);
        let timeout = Duration::from_secs(parse_u64(&get, "HTTP_TIMEOUT_SECS", 60)?);

        let mut headers = vec![(
            "User-Agent".to_string(),
            get("HTTP_USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        )];
        if let Some(raw) = get("HTTP_HEADERS") {
            headers.extend(parse_headers(&raw)?);
        }

        Ok(Config {
            db,
            table,
            storage,
            http: HttpConfig { timeout, headers },
            selection_mode,
            on_access_denied,
            request_interval,
            report_path: PathBuf::from(get("REPORT_PATH").unwrap_or_else(|| DEFAULT_REPORT_PATH.to_string())),
        })
    }
}

fn invalid(var: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { var, value: value.to_string(), reason: reason.to_string() }
}

fn parse_u64<G>(get: &G, var: &'static str, default: u64) -> Result<u64, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        None => Ok(default),
        Some(v) => v.parse::<u64>().map_err(|e| invalid(var, &v, &e.to_string())),
    }
}

// "Name: value; Other: value"
fn parse_headers(raw: &str) -> Result<Vec<(String, String)>, ConfigError> {
    let mut out = Vec::new();
    for part in raw.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let Some((name, value)) = part.split_once(':') else {
            return Err(invalid("HTTP_HEADERS", part, "expected Name: value"));
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(invalid("HTTP_HEADERS", part, "empty header name"));
        }
        out.push((name.to_string(), value.trim().to_string()));
    }
    Ok(out)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    pub(crate) fn base_vars() -> HashMap<&'static str, String> {
        [
            ("DB_HOST", "127.0.0.1"),
            ("DB_PORT", "3306"),
            ("DB_USER", "root"),
            ("DB_NAME", "school"),
            ("TABLE_NAME", "students"),
            ("URL_COLUMN_NAME", "Foto"),
            ("FILE_NAME_COLUMN_NAME", "nama_file"),
            ("RAW_URL_COLUMN_NAME", "raw_foto"),
            ("TABLE_WHERE_COLUMN", "angkatan"),
            ("TABLE_WHERE_VALUE", "2020"),
            ("DIRECTORY_BASE", "uploads"),
            ("FILE_NAME_HOST", "https://files.example.com"),
            ("FILE_NAME_PREFIX", "foto"),
        ]
        .into_iter()
        .map(|(k, v)| (k, v.to_string()))
        .collect()
    }

    fn load(vars: &HashMap<&'static str, String>) -> Result<Config, ConfigError> {
        Config::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_apply_when_optional_vars_are_unset() {
        let cfg = load(&base_vars()).unwrap();
        assert_eq!(cfg.db.port, 3306);
        assert_eq!(cfg.db.password, "");
        assert_eq!(cfg.table.id_column, "id");
        assert_eq!(cfg.selection_mode, SelectionMode::ByNonNullUrl);
        assert_eq!(cfg.on_access_denied, OnAccessDenied::SkipRecord);
        assert_eq!(cfg.request_interval, Duration::from_secs(5));
        assert_eq!(cfg.http.timeout, Duration::from_secs(60));
        assert_eq!(cfg.http.headers, vec![("User-Agent".to_string(), DEFAULT_USER_AGENT.to_string())]);
        assert_eq!(cfg.report_path, PathBuf::from("upload_results.json"));
    }

    #[test]
    fn missing_required_var_is_reported_by_name() {
        let mut vars = base_vars();
        vars.remove("DIRECTORY_BASE");
        assert_eq!(load(&vars).unwrap_err(), ConfigError::Missing("DIRECTORY_BASE"));

        let mut vars = base_vars();
        vars.insert("TABLE_NAME", "   ".to_string());
        assert_eq!(load(&vars).unwrap_err(), ConfigError::Missing("TABLE_NAME"));
    }

    #[test]
    fn modes_and_headers_are_parsed() {
        let mut vars = base_vars();
        vars.insert("SELECTION_MODE", "null-filename".into());
        vars.insert("ON_ACCESS_DENIED", "abort-run".into());
        vars.insert("HTTP_USER_AGENT", "curl/8.0".into());
        vars.insert("HTTP_HEADERS", "Accept: image/*; Referer: https://drive.google.com/".into());
        vars.insert("REQUEST_INTERVAL_MS", "250".into());
        let cfg = load(&vars).unwrap();
        assert_eq!(cfg.selection_mode, SelectionMode::ByNullFilename);
        assert_eq!(cfg.on_access_denied, OnAccessDenied::AbortRun);
        assert_eq!(cfg.request_interval, Duration::from_millis(250));
        assert_eq!(cfg.http.headers.len(), 3);
        assert_eq!(cfg.http.headers[0].1, "curl/8.0");
        assert_eq!(cfg.http.headers[2], ("Referer".to_string(), "https://drive.google.com/".to_string()));
    }

    #[test]
    fn explicit_env_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_env_file(Some(&dir.path().join("prod.env"))).unwrap_err();
        assert!(format!("{:#}", err).contains("prod.env"));
    }

    #[test]
    fn explicit_env_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("migrate.env");
        std::fs::write(&path, "URL_MIGRATE_ENV_FILE_CHECK=loaded\n").unwrap();

        load_env_file(Some(&path)).unwrap();
        assert_eq!(env::var("URL_MIGRATE_ENV_FILE_CHECK").as_deref(), Ok("loaded"));
    }

    #[test]
    fn malformed_env_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.env");
        std::fs::write(&path, "NOT VALID 'LINE\n").unwrap();
        assert!(load_env_file(Some(&path)).is_err());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut vars = base_vars();
        vars.insert("DB_PORT", "mysql".into());
        assert!(matches!(load(&vars), Err(ConfigError::Invalid { var: "DB_PORT", .. })));

        let mut vars = base_vars();
        vars.insert("SELECTION_MODE", "everything".into());
        assert!(matches!(load(&vars), Err(ConfigError::Invalid { var: "SELECTION_MODE", .. })));

        let mut vars = base_vars();
        vars.insert("HTTP_HEADERS", "no-colon-here".into());
        assert!(matches!(load(&vars), Err(ConfigError::Invalid { var: "HTTP_HEADERS", .. })));
    }
}
