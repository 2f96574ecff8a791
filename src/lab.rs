//! Labelled numeric values pulled out of lab-report text.

use crate::errors::ValidationError;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

pub const DEFAULT_LAB_PARAMETERS: [&str; 5] = [
    "C 3",
    "Total Carnitine",
    "Free Carnitine",
    "Acyl Carnitine",
    "Free / Acyl ratio",
];

/// label -> first numeric token after it, `None` when the label never matched.
pub type ParameterValues = BTreeMap<String, Option<String>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabReportDocument {
    pub date: String,
    pub file_name: String,
    pub parameters: ParameterValues,
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub dates: Vec<String>,
    pub series: BTreeMap<String, Vec<Option<f64>>>,
}

fn label_pattern(label: &str) -> Result<Regex, regex::Error> {
    // Literal label, optional separators, the number, then an ignored
    // "(Normal: ...)" annotation.
    let pattern = format!(
        r"{}[\s:=\-]*(\d+(?:\.\d+)?|\.\d+)(?:\s*\(?\s*Normal\s*:\s*[^)\n]*\)?)?",
        regex::escape(label)
    );
    RegexBuilder::new(&pattern).case_insensitive(true).build()
}

/// Scans `text` once per label; first match in document order wins.
pub fn extract_parameters<S: AsRef<str>>(text: &str, labels: &[S]) -> ParameterValues {
    labels
        .iter()
        .map(|label| {
            let label = label.as_ref();
            let value = if label.trim().is_empty() {
                None
            } else {
                match label_pattern(label) {
                    Ok(pattern) => pattern
                        .captures(text)
                        .and_then(|caps| caps.get(1))
                        .map(|m| m.as_str().to_string()),
                    Err(err) => {
                        warn!("skipping lab parameter '{label}': {err}");
                        None
                    }
                }
            };
            (label.to_string(), value)
        })
        .collect()
}

/// Trims labels, drops duplicates, and rejects blanks.
pub fn clean_labels(labels: &[String]) -> Result<Vec<String>, ValidationError> {
    let mut seen = BTreeSet::new();
    let mut cleaned = Vec::with_capacity(labels.len());
    for label in labels {
        let label = label.trim();
        if label.is_empty() {
            return Err(ValidationError::EmptyLabel);
        }
        if seen.insert(label.to_string()) {
            cleaned.push(label.to_string());
        }
    }
    Ok(cleaned)
}

pub fn known_parameters(reports: &[LabReportDocument]) -> Vec<String> {
    reports
        .iter()
        .flat_map(|report| report.parameters.keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// One value per report for each label, aligned with `dates`.
pub fn trends(reports: &[LabReportDocument], labels: &[String]) -> TrendSeries {
    let mut ordered: Vec<&LabReportDocument> = reports.iter().collect();
    ordered.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.file_name.cmp(&b.file_name)));

    let dates = ordered.iter().map(|report| report.date.clone()).collect();
    let series = labels
        .iter()
        .map(|label| {
            let values = ordered
                .iter()
                .map(|report| {
                    report
                        .parameters
                        .get(label)
                        .and_then(|value| value.as_deref())
                        .and_then(|value| value.parse::<f64>().ok())
                })
                .collect();
            (label.clone(), values)
        })
        .collect();

    TrendSeries { dates, series }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn report(date: &str, file_name: &str, pairs: &[(&str, Option<&str>)]) -> LabReportDocument {
        LabReportDocument {
            date: date.to_string(),
            file_name: file_name.to_string(),
            parameters: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
                .collect(),
            uploaded_at: Utc::now(),
        }
    }

    #[test]
    fn captures_value_and_ignores_normal_range() {
        let values = extract_parameters("Glucose: 95 (Normal: 70-110)", &["Glucose"]);
        assert_eq!(values["Glucose"].as_deref(), Some("95"));
    }

    #[test]
    fn missing_label_is_none() {
        let values = extract_parameters("Glucose: 95", &["Ferritin"]);
        assert_eq!(values["Ferritin"], None);
    }

    #[test]
    fn label_is_literal_and_case_insensitive() {
        let text = "FREE / ACYL RATIO 2.35 Normal: 0.5-3 total carnitine = 41.7";
        let values = extract_parameters(text, &["Free / Acyl ratio", "Total Carnitine", "C 3"]);
        assert_eq!(values["Free / Acyl ratio"].as_deref(), Some("2.35"));
        assert_eq!(values["Total Carnitine"].as_deref(), Some("41.7"));
        assert_eq!(values["C 3"], None);
    }

    #[test]
    fn first_occurrence_in_document_order_wins() {
        let text = "Free Carnitine 12.0 ... later Free Carnitine 18.5";
        let values = extract_parameters(text, &["Free Carnitine"]);
        assert_eq!(values["Free Carnitine"].as_deref(), Some("12.0"));
    }

    #[test]
    fn metacharacters_in_label_do_not_act_as_regex() {
        let values = extract_parameters("C3 (x) 4 C.3 9", &["C.3"]);
        assert_eq!(values["C.3"].as_deref(), Some("9"));
    }

    #[test]
    fn clean_labels_rejects_blank_and_dedupes() {
        let labels = vec![" C 3 ".to_string(), "C 3".to_string(), "Valine".to_string()];
        assert_eq!(clean_labels(&labels).unwrap(), ["C 3", "Valine"]);
        assert_eq!(clean_labels(&["  ".to_string()]), Err(ValidationError::EmptyLabel));
    }

    #[test]
    fn trends_align_values_with_sorted_dates() {
        let reports = vec![
            report("2024-05-01", "b.pdf", &[("C 3", Some("3.1")), ("Valine", None)]),
            report("2024-03-01", "a.pdf", &[("C 3", Some("2.4"))]),
        ];
        let labels = vec!["C 3".to_string(), "Valine".to_string()];
        let trend = trends(&reports, &labels);
        assert_eq!(trend.dates, ["2024-03-01", "2024-05-01"]);
        assert_eq!(trend.series["C 3"], [Some(2.4), Some(3.1)]);
        assert_eq!(trend.series["Valine"], [None, None]);
        assert_eq!(known_parameters(&reports), ["C 3", "Valine"]);
    }
}
