use crate::config::RequirementTable;
use crate::day::{date_key, day_key, day_range, days_inclusive, month_days, UtcOffset};
use crate::errors::ValidationError;
use crate::models::{AppData, CategoryRow, DayCompletion, EntryRecord, MonthTable};
use crate::progress::{compute_progress, CategoryAmount};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

pub const DEFAULT_HISTORY_DAYS: u32 = 7;
pub const MAX_HISTORY_DAYS: u32 = 366;

/// Entries between the first and last day, grouped by their local day key.
pub fn entries_by_day(
    data: &AppData,
    first: NaiveDate,
    last: NaiveDate,
    offset: UtcOffset,
) -> BTreeMap<String, Vec<EntryRecord>> {
    let start = day_range(first, offset).start;
    let end = day_range(last, offset).end;

    let mut grouped: BTreeMap<String, Vec<EntryRecord>> = BTreeMap::new();
    for entry in data.find_entries_in(start, end) {
        grouped.entry(day_key(entry.date, offset)).or_default().push(entry);
    }
    grouped
}

fn amounts(entries: &[EntryRecord]) -> Vec<CategoryAmount> {
    entries.iter().map(EntryRecord::as_amount).collect()
}

pub fn history_range(
    data: &AppData,
    start: NaiveDate,
    end: NaiveDate,
    offset: UtcOffset,
    requirements: &RequirementTable,
) -> Result<Vec<DayCompletion>, ValidationError> {
    let days = days_inclusive(start, end)?;
    let grouped = entries_by_day(data, start, end, offset);

    Ok(days
        .into_iter()
        .map(|date| {
            let key = date_key(date);
            let day_entries = grouped.get(&key).map(Vec::as_slice).unwrap_or_default();
            DayCompletion {
                overall_completion: compute_progress(&amounts(day_entries), requirements)
                    .overall_completion,
                recorded: !day_entries.is_empty(),
                date: key,
            }
        })
        .collect())
}

/// The last `days` days ending with `today`, oldest first.
pub fn recent_history_at(
    today: NaiveDate,
    days: u32,
    data: &AppData,
    offset: UtcOffset,
    requirements: &RequirementTable,
) -> Result<Vec<DayCompletion>, ValidationError> {
    let days = days.clamp(1, MAX_HISTORY_DAYS);
    let start = today - Duration::days(i64::from(days) - 1);
    history_range(data, start, today, offset, requirements)
}

pub fn month_table(
    data: &AppData,
    year: i32,
    month: u32,
    offset: UtcOffset,
    requirements: &RequirementTable,
) -> Result<MonthTable, ValidationError> {
    let days = month_days(year, month)?;
    let (Some(first), Some(last)) = (days.first().copied(), days.last().copied()) else {
        return Err(ValidationError::InvalidMonth { year, month });
    };
    let grouped = entries_by_day(data, first, last, offset);
    let dates: Vec<String> = days.into_iter().map(date_key).collect();

    let rows = requirements
        .iter()
        .map(|requirement| CategoryRow {
            category: requirement.category.clone(),
            required: requirement.required_amount,
            unit: requirement.unit,
            values: dates
                .iter()
                .map(|date| {
                    grouped.get(date).and_then(|entries| {
                        entries
                            .iter()
                            .find(|entry| entry.category == requirement.category)
                            .map(|entry| entry.amount)
                    })
                })
                .collect(),
        })
        .collect();

    let overall = dates
        .iter()
        .map(|date| {
            let day_entries = grouped.get(date).map(Vec::as_slice).unwrap_or_default();
            compute_progress(&amounts(day_entries), requirements)
                .overall_completion
                .round() as u32
        })
        .collect();

    Ok(MonthTable {
        year,
        month,
        dates,
        rows,
        overall,
    })
}
