use crate::config::RequirementTable;
use crate::day::{
    date_key, day_key, day_range, format_countdown, local_date, parse_day, time_until_reset,
};
use crate::errors::{AppError, ValidationError};
use crate::export::{export_file_name, month_grid, to_csv};
use crate::history::{entries_by_day, month_table, recent_history_at, DEFAULT_HISTORY_DAYS};
use crate::lab::{
    clean_labels, extract_parameters, known_parameters, trends, LabReportDocument, TrendSeries,
    DEFAULT_LAB_PARAMETERS,
};
use crate::milestones::{minutes_since_midnight, target_fraction};
use crate::models::{
    AppData, BatchRequest, DateQuery, DayCompletion, EntriesByDay, EntryRecord, EntryRequest,
    EntryView, HistoryQuery, LabReportRequest, MonthQuery, MonthTable, ResetRequest,
    SuggestionView, TodayResponse, TrendQuery,
};
use crate::progress::{daily_progress, suggestions, CategoryAmount, DailyProgress};
use crate::state::AppState;
use crate::storage::{persist_data, EntryUpsert};
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::{Datelike, NaiveDate, Utc};
use tracing::{debug, info};

pub async fn get_requirements(State(state): State<AppState>) -> Json<RequirementTable> {
    Json(state.requirements.as_ref().clone())
}

pub async fn get_entries(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<EntryView>>, AppError> {
    let day = resolve_day(query.date.as_deref(), &state)?;
    let range = day_range(day, state.offset);
    let data = state.data.lock().await;
    let entries: Vec<EntryView> = data
        .find_entries_in(range.start, range.end)
        .iter()
        .map(|entry| to_view(entry, &state))
        .collect();

    debug!("found {} entries for {}", entries.len(), date_key(day));
    Ok(Json(entries))
}

pub async fn get_all_entries(State(state): State<AppState>) -> Json<Vec<EntryView>> {
    let data = state.data.lock().await;
    Json(
        data.all_entries()
            .iter()
            .map(|entry| to_view(entry, &state))
            .collect(),
    )
}

pub async fn get_entries_range(
    State(state): State<AppState>,
    Path((start, end)): Path<(String, String)>,
) -> Result<Json<EntriesByDay>, AppError> {
    let start = parse_day(&start)?;
    let end = parse_day(&end)?;
    if start > end {
        return Err(ValidationError::InvalidRange {
            start: date_key(start),
            end: date_key(end),
        }
        .into());
    }

    let data = state.data.lock().await;
    let grouped: EntriesByDay = entries_by_day(&data, start, end, state.offset)
        .into_iter()
        .map(|(day, entries)| {
            let views = entries.iter().map(|entry| to_view(entry, &state)).collect();
            (day, views)
        })
        .collect();

    Ok(Json(grouped))
}

pub async fn post_entry(
    State(state): State<AppState>,
    Json(payload): Json<EntryRequest>,
) -> Result<Json<DailyProgress>, AppError> {
    let day = resolve_day(payload.date.as_deref(), &state)?;
    let upsert = validated_upsert(&state, day, &payload.category, payload.amount)?;

    let mut data = state.data.lock().await;
    data.upsert_entry(upsert, Utc::now());
    persist_data(&state.data_path, &data).await?;

    info!(
        "recorded {} {} for {}",
        payload.amount,
        payload.category.trim(),
        date_key(day)
    );
    Ok(Json(progress_for(&data, day, &state)))
}

pub async fn post_batch(
    State(state): State<AppState>,
    Json(payload): Json<BatchRequest>,
) -> Result<Json<DailyProgress>, AppError> {
    let day = resolve_day(payload.date.as_deref(), &state)?;
    let upserts = payload
        .entries
        .iter()
        .map(|entry| validated_upsert(&state, day, &entry.category, entry.amount))
        .collect::<Result<Vec<_>, _>>()?;

    let mut data = state.data.lock().await;
    let count = data.bulk_upsert_entries(upserts, Utc::now());
    persist_data(&state.data_path, &data).await?;

    info!("recorded {count} entries for {}", date_key(day));
    Ok(Json(progress_for(&data, day, &state)))
}

pub async fn post_reset(
    State(state): State<AppState>,
    payload: Option<Json<ResetRequest>>,
) -> Result<Json<DailyProgress>, AppError> {
    let payload = payload.map(|Json(body)| body).unwrap_or_default();
    let day = resolve_day(payload.date.as_deref(), &state)?;
    let date = day_range(day, state.offset).start;
    let upserts = state
        .requirements
        .iter()
        .map(|requirement| EntryUpsert {
            date,
            category: requirement.category.clone(),
            amount: 0.0,
            unit: requirement.unit,
        })
        .collect();

    let mut data = state.data.lock().await;
    data.bulk_upsert_entries(upserts, Utc::now());
    persist_data(&state.data_path, &data).await?;

    info!("reset entries for {}", date_key(day));
    Ok(Json(progress_for(&data, day, &state)))
}

pub async fn get_progress(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<Json<DailyProgress>, AppError> {
    let day = resolve_day(query.date.as_deref(), &state)?;
    let data = state.data.lock().await;
    Ok(Json(progress_for(&data, day, &state)))
}

pub async fn get_today(State(state): State<AppState>) -> Json<TodayResponse> {
    let now = Utc::now();
    let day = local_date(now, state.offset);
    let progress = {
        let data = state.data.lock().await;
        progress_for(&data, day, &state)
    };

    let fraction = target_fraction(minutes_since_midnight(now, state.offset), &state.schedule);
    let hints = suggestions(&progress, fraction)
        .into_iter()
        .map(SuggestionView::from)
        .collect();

    Json(TodayResponse {
        progress,
        target_fraction: fraction,
        time_until_reset: format_countdown(time_until_reset(now, state.offset)),
        suggestions: hints,
    })
}

pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<DayCompletion>>, AppError> {
    let today = local_date(Utc::now(), state.offset);
    let days = query.days.unwrap_or(DEFAULT_HISTORY_DAYS);
    let data = state.data.lock().await;
    let history = recent_history_at(today, days, &data, state.offset, &state.requirements)?;
    Ok(Json(history))
}

pub async fn get_month(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<MonthTable>, AppError> {
    let table = build_month(&state, &query).await?;
    Ok(Json(table))
}

pub async fn export_month(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> Result<impl IntoResponse, AppError> {
    let table = build_month(&state, &query).await?;
    let body = to_csv(&month_grid(&table));
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_file_name(table.year, table.month)
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

pub async fn post_lab_report(
    State(state): State<AppState>,
    Json(payload): Json<LabReportRequest>,
) -> Result<Json<LabReportDocument>, AppError> {
    let file_name = payload.file_name.trim();
    if file_name.is_empty() {
        return Err(ValidationError::MissingField("file_name").into());
    }
    if payload.pages.is_empty() && payload.text.is_none() {
        return Err(ValidationError::MissingField("pages").into());
    }
    let day = resolve_day(payload.date.as_deref(), &state)?;

    let labels = match &payload.parameters {
        Some(labels) => clean_labels(labels)?,
        None => DEFAULT_LAB_PARAMETERS.iter().map(|label| label.to_string()).collect(),
    };
    if labels.is_empty() {
        return Err(ValidationError::MissingField("parameters").into());
    }

    let mut text = payload.pages.join(" ");
    if let Some(extra) = &payload.text {
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(extra);
    }

    let parameters = extract_parameters(&text, labels.as_slice());
    let found = parameters.values().filter(|value| value.is_some()).count();
    let report = LabReportDocument {
        date: date_key(day),
        file_name: file_name.to_string(),
        parameters,
        uploaded_at: Utc::now(),
    };

    let mut data = state.data.lock().await;
    let stored = data.upsert_lab_report(report).clone();
    persist_data(&state.data_path, &data).await?;

    info!(
        "processed lab report {} for {}: {found}/{} parameters found",
        stored.file_name,
        stored.date,
        labels.len()
    );
    Ok(Json(stored))
}

pub async fn get_lab_reports(State(state): State<AppState>) -> Json<Vec<LabReportDocument>> {
    let data = state.data.lock().await;
    Json(data.lab_reports.clone())
}

pub async fn get_lab_parameters(State(state): State<AppState>) -> Json<Vec<String>> {
    let data = state.data.lock().await;
    Json(known_parameters(&data.lab_reports))
}

pub async fn get_lab_trends(
    State(state): State<AppState>,
    Query(query): Query<TrendQuery>,
) -> Json<TrendSeries> {
    let data = state.data.lock().await;
    let requested: Vec<String> = query
        .params
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect();

    let labels = if requested.is_empty() {
        known_parameters(&data.lab_reports)
    } else {
        requested
    };
    Json(trends(&data.lab_reports, &labels))
}

async fn build_month(state: &AppState, query: &MonthQuery) -> Result<MonthTable, AppError> {
    let today = local_date(Utc::now(), state.offset);
    let year = query.year.unwrap_or(today.year());
    let month = query.month.unwrap_or(today.month());
    let data = state.data.lock().await;
    Ok(month_table(&data, year, month, state.offset, &state.requirements)?)
}

fn resolve_day(date: Option<&str>, state: &AppState) -> Result<NaiveDate, ValidationError> {
    match date.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => parse_day(value),
        None => Ok(local_date(Utc::now(), state.offset)),
    }
}

fn validated_upsert(
    state: &AppState,
    day: NaiveDate,
    category: &str,
    amount: f64,
) -> Result<EntryUpsert, ValidationError> {
    let requirement = state.requirements.resolve(category)?;
    if !amount.is_finite() {
        return Err(ValidationError::NonFiniteAmount(requirement.category.clone()));
    }
    if amount < 0.0 {
        return Err(ValidationError::NegativeAmount(requirement.category.clone()));
    }

    Ok(EntryUpsert {
        date: day_range(day, state.offset).start,
        category: requirement.category.clone(),
        amount,
        unit: requirement.unit,
    })
}

fn progress_for(data: &AppData, day: NaiveDate, state: &AppState) -> DailyProgress {
    let range = day_range(day, state.offset);
    let amounts: Vec<CategoryAmount> = data
        .find_entries_in(range.start, range.end)
        .iter()
        .map(EntryRecord::as_amount)
        .collect();
    daily_progress(date_key(day), &amounts, &state.requirements)
}

fn to_view(entry: &EntryRecord, state: &AppState) -> EntryView {
    EntryView {
        date: day_key(entry.date, state.offset),
        category: entry.category.clone(),
        amount: entry.amount,
        unit: entry.unit,
    }
}
