use crate::config::{RequirementTable, Unit};
use crate::errors::AppError;
use crate::lab::LabReportDocument;
use crate::models::{AppData, EntryRecord};
use chrono::{DateTime, Utc};
use std::path::Path;
use tokio::fs;
use tracing::{error, info};

pub async fn load_data(path: &Path) -> AppData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse data file: {err}");
                AppData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => AppData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            AppData::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}

/// Reads an optional requirement list; no path means the built-in table.
pub async fn load_requirements(
    path: Option<&Path>,
) -> Result<RequirementTable, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(RequirementTable::default());
    };
    let bytes = fs::read(path).await?;
    Ok(RequirementTable::from_json(&bytes)?)
}

/// A single upsert against the entry collection.
#[derive(Debug, Clone)]
pub struct EntryUpsert {
    pub date: DateTime<Utc>,
    pub category: String,
    pub amount: f64,
    pub unit: Unit,
}

impl AppData {
    /// Entries whose `date` lies in `[start, end]`.
    pub fn find_entries_in(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<EntryRecord> {
        self.entries
            .iter()
            .filter(|entry| start <= entry.date && entry.date <= end)
            .cloned()
            .collect()
    }

    pub fn all_entries(&self) -> &[EntryRecord] {
        &self.entries
    }

    /// Last write wins on `(date, category)`.
    pub fn upsert_entry(&mut self, upsert: EntryUpsert, now: DateTime<Utc>) -> &EntryRecord {
        let position = self
            .entries
            .iter()
            .position(|entry| entry.date == upsert.date && entry.category == upsert.category);

        let record = EntryRecord {
            date: upsert.date,
            category: upsert.category,
            amount: upsert.amount,
            unit: upsert.unit,
            updated_at: now,
        };

        let index = match position {
            Some(index) => {
                self.entries[index] = record;
                index
            }
            None => {
                self.entries.push(record);
                self.entries.len() - 1
            }
        };
        &self.entries[index]
    }

    pub fn bulk_upsert_entries(&mut self, upserts: Vec<EntryUpsert>, now: DateTime<Utc>) -> usize {
        let count = upserts.len();
        for upsert in upserts {
            self.upsert_entry(upsert, now);
        }
        count
    }

    /// Last write wins on `(date, file_name)`.
    pub fn upsert_lab_report(&mut self, report: LabReportDocument) -> &LabReportDocument {
        let position = self
            .lab_reports
            .iter()
            .position(|existing| existing.date == report.date && existing.file_name == report.file_name);

        let index = match position {
            Some(index) => {
                info!("replacing lab report {} for {}", report.file_name, report.date);
                self.lab_reports[index] = report;
                index
            }
            None => {
                self.lab_reports.push(report);
                self.lab_reports.len() - 1
            }
        };
        &self.lab_reports[index]
    }
}
