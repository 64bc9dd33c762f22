//! App table.

use std::path::Path;

use storelens_analysis::apps::{resolve_record, DroppedApp};
use storelens_core::errors::StorageError;
use storelens_core::types::AppRecord;

use crate::table::{opt, Table, TableWriter};

pub const APP_COLUMNS: [&str; 22] = [
    "app_key",
    "store",
    "id",
    "app_id",
    "title",
    "developer",
    "category",
    "installs_or_users",
    "rating_avg",
    "rating_count",
    "iap_min",
    "iap_max",
    "pricing_raw",
    "description",
    "website_url",
    "store_url",
    "icon_url",
    "version",
    "release_date",
    "last_update",
    "scraped_at",
    "relevance_score",
];

pub const DROP_REASON_COLUMN: &str = "drop_reason";

fn from_table(table: &Table) -> Vec<AppRecord> {
    let apps: Vec<AppRecord> = table.rows().map(|r| resolve_record(&r.to_raw())).collect();
    let keyless = apps.iter().filter(|a| a.app_key.is_empty()).count();
    if keyless > 0 {
        tracing::warn!(path = table.path(), keyless, "app rows without app_key");
    }
    apps
}

/// Read an App table. Columns follow the raw-dump alias lists, so both
/// normalized tables and scraper CSVs load.
pub fn read_apps(path: &Path) -> Result<Vec<AppRecord>, StorageError> {
    Ok(from_table(&Table::read(path)?))
}

pub fn read_apps_optional(path: &Path) -> Result<Option<Vec<AppRecord>>, StorageError> {
    Ok(Table::read_optional(path)?.map(|t| from_table(&t)))
}

fn app_cells(app: &AppRecord) -> Vec<String> {
    vec![
        app.app_key.to_string(),
        app.store.as_ref().map(|s| s.name().to_string()).unwrap_or_default(),
        opt(&app.id),
        opt(&app.app_id),
        opt(&app.title),
        opt(&app.developer),
        opt(&app.category),
        opt(&app.installs_or_users),
        opt(&app.rating_avg),
        opt(&app.rating_count),
        opt(&app.iap_min),
        opt(&app.iap_max),
        opt(&app.pricing_raw),
        opt(&app.description),
        opt(&app.website_url),
        opt(&app.store_url),
        opt(&app.icon_url),
        opt(&app.version),
        opt(&app.release_date),
        opt(&app.last_update),
        opt(&app.scraped_at),
        opt(&app.relevance_score),
    ]
}

pub fn write_apps(path: &Path, apps: &[AppRecord]) -> Result<usize, StorageError> {
    let mut w = TableWriter::create(path, APP_COLUMNS)?;
    for app in apps {
        w.write_row(app_cells(app))?;
    }
    w.finish()
}

/// Dropped rows with their comma-joined reasons in a trailing column.
pub fn write_dropped(path: &Path, dropped: &[DroppedApp]) -> Result<usize, StorageError> {
    let header = APP_COLUMNS.iter().copied().chain([DROP_REASON_COLUMN]);
    let mut w = TableWriter::create(path, header)?;
    for d in dropped {
        let mut cells = app_cells(&d.app);
        cells.push(d.drop_reason());
        w.write_row(cells)?;
    }
    w.finish()
}
