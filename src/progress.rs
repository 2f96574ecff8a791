use crate::config::{RequirementTable, Unit};
use serde::{Deserialize, Serialize};

/// A recorded amount for one category, as seen by the calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAmount {
    pub category: String,
    pub amount: f64,
}

impl CategoryAmount {
    pub fn new(category: impl Into<String>, amount: f64) -> Self {
        Self {
            category: category.into(),
            amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryProgress {
    pub category: String,
    pub amount: f64,
    pub required: f64,
    pub unit: Unit,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub per_category: Vec<CategoryProgress>,
    pub overall_completion: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyProgress {
    pub date: String,
    pub entries: Vec<CategoryProgress>,
    pub overall_completion: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub category: Option<String>,
    pub shortfall: f64,
    pub unit: Option<Unit>,
    pub message: String,
}

const MAX_SUGGESTIONS: usize = 2;

/// Completion of `amount` against `required`, capped at 100. A zero
/// requirement counts as 0%.
pub fn category_percent(amount: f64, required: f64) -> f64 {
    if required <= 0.0 {
        return 0.0;
    }
    (amount / required * 100.0).clamp(0.0, 100.0)
}

/// Per-category capped completion and their unweighted mean. Categories
/// without an entry count as zero.
pub fn compute_progress(entries: &[CategoryAmount], requirements: &RequirementTable) -> Progress {
    let per_category: Vec<CategoryProgress> = requirements
        .iter()
        .map(|requirement| {
            let amount = entries
                .iter()
                .find(|entry| entry.category == requirement.category)
                .map_or(0.0, |entry| entry.amount);
            CategoryProgress {
                category: requirement.category.clone(),
                amount,
                required: requirement.required_amount,
                unit: requirement.unit,
                percent: category_percent(amount, requirement.required_amount),
            }
        })
        .collect();

    let overall_completion = if per_category.is_empty() {
        0.0
    } else {
        per_category.iter().map(|item| item.percent).sum::<f64>() / per_category.len() as f64
    };

    Progress {
        per_category,
        overall_completion,
    }
}

pub fn daily_progress(
    date: impl Into<String>,
    entries: &[CategoryAmount],
    requirements: &RequirementTable,
) -> DailyProgress {
    let progress = compute_progress(entries, requirements);
    DailyProgress {
        date: date.into(),
        entries: progress.per_category,
        overall_completion: progress.overall_completion,
    }
}

/// Categories furthest behind the amount expected by now, largest
/// shortfall first.
pub fn suggestions(progress: &DailyProgress, target_fraction: f64) -> Vec<Suggestion> {
    let mut behind: Vec<(&CategoryProgress, f64)> = progress
        .entries
        .iter()
        .filter_map(|entry| {
            let expected = entry.required * target_fraction;
            (entry.amount < expected).then_some((entry, expected - entry.amount))
        })
        .collect();

    if behind.is_empty() {
        return vec![Suggestion {
            category: None,
            shortfall: 0.0,
            unit: None,
            message: "You are on track!".to_string(),
        }];
    }

    behind.sort_by(|a, b| b.1.total_cmp(&a.1));
    behind
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(entry, shortfall)| Suggestion {
            message: format!(
                "Consider adding more {} ({} {})",
                entry.category,
                shortfall.round(),
                entry.unit
            ),
            category: Some(entry.category.clone()),
            shortfall,
            unit: Some(entry.unit),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Requirement;

    fn table(rows: &[(&str, f64)]) -> RequirementTable {
        RequirementTable::new(
            rows.iter()
                .map(|(category, amount)| Requirement {
                    category: category.to_string(),
                    required_amount: *amount,
                    unit: Unit::Exchange,
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn half_of_single_requirement() {
        let progress = compute_progress(&[CategoryAmount::new("cereal", 5.0)], &table(&[("cereal", 10.0)]));
        assert_eq!(progress.per_category[0].percent, 50.0);
        assert_eq!(progress.overall_completion, 50.0);
    }

    #[test]
    fn surplus_is_capped_before_averaging() {
        let requirements = table(&[("cereal", 10.0), ("sugar", 10.0)]);
        let entries = [CategoryAmount::new("cereal", 40.0), CategoryAmount::new("sugar", 0.0)];
        let progress = compute_progress(&entries, &requirements);
        assert_eq!(progress.per_category[0].percent, 100.0);
        assert_eq!(progress.overall_completion, 50.0);
    }

    #[test]
    fn everything_met_is_exactly_complete() {
        let requirements = RequirementTable::default();
        let entries: Vec<CategoryAmount> = requirements
            .iter()
            .enumerate()
            .map(|(idx, req)| CategoryAmount::new(&req.category, req.required_amount * (1.0 + idx as f64)))
            .collect();
        let progress = compute_progress(&entries, &requirements);
        assert_eq!(progress.overall_completion, 100.0);
        assert!(progress.per_category.iter().all(|item| item.percent == 100.0));
    }

    #[test]
    fn missing_entries_count_as_zero_and_stay_in_bounds() {
        let requirements = RequirementTable::default();
        let entries = [CategoryAmount::new("cereal", 12.5), CategoryAmount::new("unknown", 99.0)];
        let progress = compute_progress(&entries, &requirements);
        assert_eq!(progress.per_category.len(), requirements.len());
        let expected = 100.0 / requirements.len() as f64;
        assert!((progress.overall_completion - expected).abs() < 1e-9);
        for item in &progress.per_category {
            assert!((0.0..=100.0).contains(&item.percent));
        }
    }

    #[test]
    fn zero_requirement_yields_zero_percent() {
        let progress = compute_progress(&[CategoryAmount::new("free", 3.0)], &table(&[("free", 0.0)]));
        assert_eq!(progress.per_category[0].percent, 0.0);
        assert_eq!(progress.overall_completion, 0.0);
    }

    #[test]
    fn empty_requirement_table_is_zero_not_nan() {
        let progress = compute_progress(&[], &table(&[]));
        assert_eq!(progress.overall_completion, 0.0);
    }

    #[test]
    fn suggestions_pick_two_largest_shortfalls() {
        let requirements = table(&[("cereal", 10.0), ("legumes", 4.0), ("sugar", 20.0)]);
        let entries = [CategoryAmount::new("cereal", 1.0), CategoryAmount::new("legumes", 2.0)];
        let progress = daily_progress("2024-03-01", &entries, &requirements);

        let picked = suggestions(&progress, 0.5);
        assert_eq!(picked.len(), 2);
        assert_eq!(picked[0].category.as_deref(), Some("sugar"));
        assert_eq!(picked[0].message, "Consider adding more sugar (10 exchange)");
        assert_eq!(picked[1].category.as_deref(), Some("cereal"));
    }

    #[test]
    fn on_track_when_nothing_is_behind() {
        let requirements = table(&[("cereal", 10.0)]);
        let progress = daily_progress("2024-03-01", &[CategoryAmount::new("cereal", 2.0)], &requirements);
        let picked = suggestions(&progress, 0.15);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].category, None);
        assert_eq!(picked[0].message, "You are on track!");
    }
}
