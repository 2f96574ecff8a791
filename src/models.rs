use crate::config::Unit;
use crate::lab::LabReportDocument;
use crate::progress::{CategoryAmount, DailyProgress, Suggestion};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stored amount for one category on one day. `date` is the UTC instant of
/// local midnight for that day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub date: DateTime<Utc>,
    pub category: String,
    pub amount: f64,
    pub unit: Unit,
    pub updated_at: DateTime<Utc>,
}

impl EntryRecord {
    pub fn as_amount(&self) -> CategoryAmount {
        CategoryAmount::new(self.category.clone(), self.amount)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppData {
    #[serde(default)]
    pub entries: Vec<EntryRecord>,
    #[serde(default)]
    pub lab_reports: Vec<LabReportDocument>,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EntryRequest {
    pub category: String,
    pub amount: f64,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BatchEntry {
    pub category: String,
    pub amount: f64,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub date: Option<String>,
    pub entries: Vec<BatchEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetRequest {
    pub date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EntryView {
    pub date: String,
    pub category: String,
    pub amount: f64,
    pub unit: Unit,
}

pub type EntriesByDay = BTreeMap<String, Vec<EntryView>>;

#[derive(Debug, Serialize, Deserialize)]
pub struct TodayResponse {
    pub progress: DailyProgress,
    pub target_fraction: f64,
    pub time_until_reset: String,
    pub suggestions: Vec<SuggestionView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestionView {
    pub category: Option<String>,
    pub shortfall: f64,
    pub message: String,
}

impl From<Suggestion> for SuggestionView {
    fn from(suggestion: Suggestion) -> Self {
        Self {
            category: suggestion.category,
            shortfall: suggestion.shortfall,
            message: suggestion.message,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub days: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DayCompletion {
    pub date: String,
    pub overall_completion: f64,
    pub recorded: bool,
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryRow {
    pub category: String,
    pub required: f64,
    pub unit: Unit,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MonthTable {
    pub year: i32,
    pub month: u32,
    pub dates: Vec<String>,
    pub rows: Vec<CategoryRow>,
    pub overall: Vec<u32>,
}

#[derive(Debug, Deserialize)]
pub struct LabReportRequest {
    pub date: Option<String>,
    pub file_name: String,
    #[serde(default)]
    pub pages: Vec<String>,
    pub text: Option<String>,
    pub parameters: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    pub params: Option<String>,
}
