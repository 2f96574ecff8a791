use crate::day::UtcOffset;
use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};
use std::{env, fmt, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Exchange,
    Grams,
    Ml,
}

impl Unit {
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Exchange => "exchange",
            Unit::Grams => "grams",
            Unit::Ml => "ml",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    pub category: String,
    pub required_amount: f64,
    pub unit: Unit,
}

impl Requirement {
    fn new(category: &str, required_amount: f64, unit: Unit) -> Self {
        Self {
            category: category.to_string(),
            required_amount,
            unit,
        }
    }
}

/// The daily requirement list, validated once at start-up and shared
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RequirementTable {
    requirements: Vec<Requirement>,
}

impl RequirementTable {
    pub fn new(requirements: Vec<Requirement>) -> Result<Self, ValidationError> {
        let mut table: Vec<Requirement> = Vec::with_capacity(requirements.len());
        for mut requirement in requirements {
            let category = normalize_category(&requirement.category);
            if category.is_empty() {
                return Err(ValidationError::MissingField("category"));
            }
            if !requirement.required_amount.is_finite() {
                return Err(ValidationError::NonFiniteAmount(category));
            }
            if requirement.required_amount < 0.0 {
                return Err(ValidationError::NegativeAmount(category));
            }
            if table.iter().any(|existing| existing.category == category) {
                return Err(ValidationError::DuplicateCategory(category));
            }
            requirement.category = category;
            table.push(requirement);
        }

        Ok(Self { requirements: table })
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, ConfigError> {
        let requirements: Vec<Requirement> =
            serde_json::from_slice(bytes).map_err(|err| ConfigError::Requirements(err.to_string()))?;
        Self::new(requirements).map_err(|err| ConfigError::Requirements(err.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Requirement> {
        self.requirements.iter()
    }

    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    pub fn get(&self, category: &str) -> Option<&Requirement> {
        self.requirements
            .iter()
            .find(|requirement| requirement.category == category)
    }

    /// Looks up a client-supplied category name after normalization.
    pub fn resolve(&self, raw: &str) -> Result<&Requirement, ValidationError> {
        let category = normalize_category(raw);
        self.get(&category)
            .ok_or_else(|| ValidationError::UnknownCategory(raw.trim().to_string()))
    }
}

impl Default for RequirementTable {
    fn default() -> Self {
        use Unit::*;

        Self {
            requirements: vec![
                Requirement::new("cereal", 12.5, Exchange),
                Requirement::new("dried fruit", 1.0, Exchange),
                Requirement::new("fresh fruit", 3.0, Exchange),
                Requirement::new("legumes", 3.0, Exchange),
                Requirement::new("other vegetables", 3.0, Exchange),
                Requirement::new("root vegetables", 2.0, Exchange),
                Requirement::new("free group", 3.0, Exchange),
                Requirement::new("jaggery", 20.0, Grams),
                Requirement::new("soy milk", 120.0, Ml),
                Requirement::new("sugar", 10.0, Grams),
                Requirement::new("oil ghee", 30.0, Grams),
                Requirement::new("pa formula", 32.0, Grams),
                Requirement::new("cal-c formula", 24.0, Grams),
                Requirement::new("isoleucine", 4.0, Grams),
                Requirement::new("valine", 4.0, Grams),
            ],
        }
    }
}

pub fn normalize_category(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let base = lowered
        .strip_suffix(" exchange")
        .unwrap_or(&lowered)
        .trim_end();

    let mapped = match base {
        "dried fruits" => "dried fruit",
        "fresh fruits" => "fresh fruit",
        "other vegetable" | "leafy vegetable" => "other vegetables",
        "root vegetable" => "root vegetables",
        "misc free group" | "juices" => "free group",
        other => other,
    };
    mapped.to_string()
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },

    #[error("invalid requirements file: {0}")]
    Requirements(String),
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub data_path: PathBuf,
    pub utc_offset: UtcOffset,
    pub requirements_path: Option<PathBuf>,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(value) => value.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value,
            })?,
            None => 8080,
        };

        let data_path = lookup("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data/state.json"));

        let utc_offset = match lookup("APP_UTC_OFFSET_MINUTES") {
            Some(value) => value
                .trim()
                .parse::<i32>()
                .ok()
                .and_then(|minutes| UtcOffset::from_minutes(minutes).ok())
                .ok_or(ConfigError::Invalid {
                    key: "APP_UTC_OFFSET_MINUTES",
                    value,
                })?,
            None => UtcOffset::default(),
        };

        let requirements_path = lookup("APP_REQUIREMENTS_PATH").map(PathBuf::from);

        Ok(Self {
            port,
            data_path,
            utc_offset,
            requirements_path,
        })
    }
}
