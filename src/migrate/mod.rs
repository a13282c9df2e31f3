pub mod extension;
pub mod fetch;
pub mod path;
pub mod throttle;
pub mod types;
mod write;

use std::time::Instant;

use anyhow::{bail, Context, Result};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::{Config, OnAccessDenied, SelectionMode};
use crate::error::MigrateError;
use crate::records::{public_url, MigratedRow, RecordStore, SourceRecord};
use crate::report::{self, Report};
use crate::telemetry::{self, ctx::LogCtx};
use crate::telemetry::emit::Meta;
use crate::telemetry::ops::migrate::{Migrate, Phase as MigratePhase};

use self::fetch::Downloader;
use self::throttle::Throttle;
use self::types::{MigratePlan, MigrateTotals, Migrated, MigrationOutcome, RecordSample};

#[derive(Clone, Copy, Debug)]
pub struct RunOptions {
    /// List the selected records and stop.
    pub plan: bool,
    pub plan_limit: usize,
}

/// What the record loop produced, including the error that stopped it early, if any.
#[derive(Debug)]
pub struct RunOutcome {
    pub report: Report,
    pub aborted: Option<MigrateError>,
}

pub async fn run<S, D>(cfg: &Config, store: &S, downloader: &D, opts: RunOptions) -> Result<()>
where
    S: RecordStore,
    D: Downloader,
{
    let log = telemetry::migrate();
    let run_id = Uuid::new_v4();
    let root = log.root_span_kv([
        ("run_id", run_id.to_string()),
        ("table", cfg.table.table.clone()),
        ("mode", mode_name(cfg.selection_mode).to_string()),
        ("on_access_denied", policy_name(cfg.on_access_denied).to_string()),
        ("interval_ms", cfg.request_interval.as_millis().to_string()),
        ("plan", opts.plan.to_string()),
    ]);

    execute(cfg, store, downloader, opts, &log, run_id).instrument(root).await
}

async fn execute<S, D>(
    cfg: &Config,
    store: &S,
    downloader: &D,
    opts: RunOptions,
    log: &LogCtx<Migrate>,
    run_id: Uuid,
) -> Result<()>
where
    S: RecordStore,
    D: Downloader,
{
    let t0 = Instant::now();
    let records = store
        .select_records()
        .instrument(log.span(&MigratePhase::Select))
        .await
        .context("fetch records to migrate")?;

    if opts.plan {
        emit_plan(log, cfg, &records, opts.plan_limit)?;
        return Ok(());
    }

    let outcome = migrate_all(cfg, store, downloader, &records, log).await;

    {
        let _s = log.span(&MigratePhase::Report).entered();
        if let Err(e) = report::write(&cfg.report_path, &outcome.report) {
            log.error_kv("failed to write report", [("path", cfg.report_path.display().to_string()), ("error", format!("{:#}", e))]);
        } else {
            log.info_kv("📝 report written", [("path", cfg.report_path.display().to_string())]);
        }
    }

    let succeeded = outcome.report.successful_uploads.len();
    let failed = outcome.report.failed_uploads.len();
    log.totals(succeeded, failed);

    if telemetry::config::json_mode() {
        let totals = MigrateTotals { succeeded, failed, aborted: outcome.aborted.is_some() };
        log.result(&totals, Some(Meta::timed(run_id, t0.elapsed().as_millis())))?;
    }

    if let Some(err) = outcome.aborted {
        bail!("run aborted after {} of {} records: {}", outcome.report.total(), records.len(), err);
    }
    Ok(())
}

/// Migrate every record in order, updating the store for each success.
pub async fn migrate_all<S, D>(
    cfg: &Config,
    store: &S,
    downloader: &D,
    records: &[SourceRecord],
    log: &LogCtx<Migrate>,
) -> RunOutcome
where
    S: RecordStore,
    D: Downloader,
{
    let mut report = Report::default();
    let mut throttle = Throttle::new(cfg.request_interval);
    let total = records.len();

    for (i, record) in records.iter().enumerate() {
        throttle.tick().await;
        let result = async {
            log.progress(i + 1, total, record.id, &record.source_url);
            match migrate_record(cfg, record, downloader, log).await {
                Ok(migrated) => update_source(cfg, store, record, migrated, log).await,
                Err(e) => Err(e),
            }
        }
        .instrument(log.span(&MigratePhase::Record))
        .await;

        match result {
            Ok(migrated) => {
                log.saved(record.id, &record.source_url, &migrated.path);
                report.push(MigrationOutcome::success(record.id, migrated.path));
            }
            Err(err) => {
                log.failed(record.id, &record.source_url, err.kind(), &err);
                report.push(MigrationOutcome::failed(record.id, record.source_url.clone(), err.kind()));
                if matches!(err, MigrateError::AccessDenied { .. }) && cfg.on_access_denied == OnAccessDenied::AbortRun {
                    log.warn(format!("⛔ access denied for id={}; aborting with {} record(s) left", record.id, total - i - 1));
                    return RunOutcome { report, aborted: Some(err) };
                }
            }
        }
    }

    RunOutcome { report, aborted: None }
}

/// Download one record's file and write it under the base directory.
pub async fn migrate_record<D: Downloader>(
    cfg: &Config,
    record: &SourceRecord,
    downloader: &D,
    log: &LogCtx<Migrate>,
) -> Result<Migrated, MigrateError> {
    let url = record.source_url.as_str();

    let download = downloader
        .download(url)
        .instrument(log.span(&MigratePhase::Download))
        .await?;
    if !(200..300).contains(&download.status) {
        log.warn_kv("non-success status", [("id", record.id.to_string()), ("status", download.status.to_string())]);
    }

    let ext = {
        let _s = log.span(&MigratePhase::Resolve).entered();
        let (ext, source) = extension::resolve(url, download.content_type.as_deref());
        tracing::debug!(id = record.id, ext = %ext, source = ?source, "resolved extension");
        ext
    };
    if ext.is_empty() {
        return Err(MigrateError::ExtensionUnresolvable { url: url.to_string() });
    }
    if extension::is_html(&ext) {
        return Err(MigrateError::AccessDenied { url: url.to_string(), detail: ext });
    }
    // a denial page served at a URL that carries its own extension
    if let Some(ct) = download.content_type.as_deref().filter(|ct| extension::is_html_content_type(ct)) {
        return Err(MigrateError::AccessDenied { url: url.to_string(), detail: ct.to_string() });
    }

    let file_name = path::file_name(&cfg.storage.file_name_prefix, record.id, &ext);
    let local = path::local_path(&cfg.storage.directory_base, &record.target_subdir, &file_name);

    write::save(&local, &download.body)
        .instrument(log.span(&MigratePhase::Write))
        .await?;

    Ok(Migrated { path: local, file_name })
}

async fn update_source<S: RecordStore>(
    cfg: &Config,
    store: &S,
    record: &SourceRecord,
    migrated: Migrated,
    log: &LogCtx<Migrate>,
) -> Result<Migrated, MigrateError> {
    let row = MigratedRow {
        id: record.id,
        public_url: public_url(&cfg.storage.file_name_host, &migrated.path),
        file_name: &migrated.file_name,
        raw_url: &record.source_url,
    };
    match store.mark_migrated(&row).instrument(log.span(&MigratePhase::Update)).await {
        Ok(0) => {
            log.warn_kv("update matched no rows", [("id", record.id.to_string())]);
            Ok(migrated)
        }
        Ok(_) => Ok(migrated),
        Err(e) => Err(MigrateError::UpdateFailed { id: record.id, source: e.into() }),
    }
}

fn emit_plan(log: &LogCtx<Migrate>, cfg: &Config, records: &[SourceRecord], limit: usize) -> Result<()> {
    let mode = mode_name(cfg.selection_mode);
    if telemetry::config::json_mode() {
        let samples: Vec<RecordSample> = records.iter().take(limit)
            .map(|r| RecordSample { id: r.id, url: r.source_url.clone(), subdir: r.target_subdir.clone() })
            .collect();
        let plan = MigratePlan {
            records: records.len(),
            mode: mode.to_string(),
            on_access_denied: policy_name(cfg.on_access_denied).to_string(),
            sample_records: samples,
        };
        log.plan(&plan)?;
    } else {
        log.info(format!("📝 Migrate plan — records={} mode={} base={}", records.len(), mode, cfg.storage.directory_base));
        for r in records.iter().take(limit) { log.info(format!("  id={} url={} subdir={:?}", r.id, r.source_url, r.target_subdir)); }
        if records.len() > limit { log.info(format!("  ... ({} more)", records.len() - limit)); }
        log.info("   Run without --plan to execute.");
    }
    Ok(())
}

fn mode_name(mode: SelectionMode) -> &'static str {
    match mode {
        SelectionMode::ByNonNullUrl => "non-null-url",
        SelectionMode::ByNullFilename => "null-filename",
    }
}

fn policy_name(policy: OnAccessDenied) -> &'static str {
    match policy {
        OnAccessDenied::SkipRecord => "skip-record",
        OnAccessDenied::AbortRun => "abort-run",
    }
}
