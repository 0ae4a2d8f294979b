//! CSV-backed catalog store.
//!
//! The file carries the header `category,service,price,billingCycle,scopeOfWork`
//! and never an id column. Appends are serialized through an async mutex and
//! land via a temp file renamed over the original, so readers never observe a
//! half-written catalog. Writers in other processes are not coordinated.

use std::fs::File;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::models::{Facets, NewService, ServiceFilter, ServiceRecord};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed catalog row {row}: {reason}")]
    Malformed { row: usize, reason: String },

    #[error("failed to persist catalog: {0}")]
    Persist(String),

    #[error("catalog task failed: {0}")]
    Task(String),
}

/// `lowercase(first three chars of category) + "-" + position` (1-based).
pub fn derive_id(category: &str, position: usize) -> String {
    let prefix: String = category.chars().take(3).collect();
    format!("{}-{}", prefix.to_lowercase(), position)
}

/// A row exactly as it sits in the file. Every cell may be absent.
#[derive(Debug, Deserialize)]
struct StoredRow {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    service: Option<String>,
    #[serde(default)]
    price: Option<String>,
    #[serde(default, rename = "billingCycle")]
    billing_cycle: Option<String>,
    #[serde(default, rename = "scopeOfWork")]
    scope_of_work: Option<String>,
}

#[derive(Debug, Serialize)]
struct WrittenRow<'a> {
    category: &'a str,
    service: &'a str,
    price: f64,
    #[serde(rename = "billingCycle")]
    billing_cycle: &'a str,
    #[serde(rename = "scopeOfWork")]
    scope_of_work: &'a str,
}

fn parse_price(raw: &str, row: usize) -> Result<f64, CatalogError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0.0);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|p| p.is_finite())
        .ok_or_else(|| CatalogError::Malformed {
            row,
            reason: format!("price {raw:?} is not a number"),
        })
}

/// Reads every row in file order. A missing file is an empty catalog.
fn read_records(path: &Path) -> Result<Vec<ServiceRecord>, CatalogError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut records = Vec::new();
    for (index, row) in reader.deserialize::<StoredRow>().enumerate() {
        let position = index + 1;
        let row = row?;
        let category = row.category.unwrap_or_default();
        records.push(ServiceRecord {
            id: derive_id(&category, position),
            price: parse_price(row.price.as_deref().unwrap_or_default(), position)?,
            category,
            service: row.service.unwrap_or_default(),
            billing_cycle: row.billing_cycle.unwrap_or_default(),
            scope_of_work: row.scope_of_work.unwrap_or_default(),
        });
    }
    Ok(records)
}

/// Rewrites the whole catalog through a temp file in the same directory.
fn write_records(path: &Path, records: &[ServiceRecord]) -> Result<(), CatalogError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = csv::Writer::from_writer(tmp.as_file_mut());
        for record in records {
            writer.serialize(WrittenRow {
                category: &record.category,
                service: &record.service,
                price: record.price,
                billing_cycle: &record.billing_cycle,
                scope_of_work: &record.scope_of_work,
            })?;
        }
        writer.flush()?;
    }
    tmp.as_file_mut().flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .map_err(|e| CatalogError::Persist(e.error.to_string()))?;
    Ok(())
}

async fn blocking<T, F>(f: F) -> Result<T, CatalogError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, CatalogError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CatalogError::Task(e.to_string()))?
}

pub struct CatalogStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CatalogStore {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// All records in file order with freshly derived ids.
    pub async fn list(&self) -> Result<Vec<ServiceRecord>, CatalogError> {
        let path = self.path.clone();
        let records = blocking(move || read_records(&path)).await?;
        debug!(count = records.len(), "Catalog read");
        Ok(records)
    }

    /// Records matching `filter`. Ids are derived over the full catalog first,
    /// so a filtered record keeps the id it has in the unfiltered list.
    pub async fn search(&self, filter: &ServiceFilter) -> Result<Vec<ServiceRecord>, CatalogError> {
        let mut records = self.list().await?;
        records.retain(|record| filter.matches(record));
        Ok(records)
    }

    pub async fn facets(&self) -> Result<Facets, CatalogError> {
        Ok(Facets::from_records(&self.list().await?))
    }

    /// Appends a record and returns it with its id.
    pub async fn append(&self, new: NewService) -> Result<ServiceRecord, CatalogError> {
        let new = new.normalized();
        let _guard = self.write_lock.lock().await;
        let path = self.path.clone();
        let created = blocking(move || {
            let mut records = read_records(&path)?;
            let record = ServiceRecord {
                id: derive_id(&new.category, records.len() + 1),
                category: new.category,
                service: new.service,
                price: new.price,
                billing_cycle: new.billing_cycle,
                scope_of_work: new.scope_of_work.unwrap_or_default(),
            };
            records.push(record.clone());
            write_records(&path, &records)?;
            Ok(record)
        })
        .await?;
        info!(id = %created.id, service = %created.service, "Service appended to catalog");
        Ok(created)
    }
}
