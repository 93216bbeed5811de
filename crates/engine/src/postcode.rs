// Postal-code normalization and join keys.
//
// Both sides of the join go through `MatchStrategy::key`, so a formatting
// difference on one side can never silently break matching.

use serde::{Deserialize, Serialize};

use crate::table::Value;

/// How postcodes are turned into join keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Full normalized postcode ("1309 aa" ≡ "1309AA").
    #[default]
    Exact,
    /// First four digits only (district level).
    Pc4,
}

impl MatchStrategy {
    pub fn key(&self, raw: &str) -> Option<String> {
        match self {
            Self::Exact => {
                let normalized = normalize(raw);
                (!normalized.is_empty()).then_some(normalized)
            }
            Self::Pc4 => district(raw),
        }
    }

    /// Join key for a cell value. Numeric cells (postcodes stored as
    /// numbers by spreadsheet tools) use their integer text.
    pub fn value_key(&self, value: &Value) -> Option<String> {
        match value {
            Value::Text(s) => self.key(s),
            Value::Number(_) => self.key(&value.display()),
            Value::Empty | Value::Bool(_) => None,
        }
    }
}

impl std::fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Pc4 => write!(f, "pc4"),
        }
    }
}

/// Uppercase, all whitespace removed. Punctuation is kept as-is.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// First four digits of the postcode, if it has at least four.
pub fn district(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).take(4).collect();
    (digits.len() == 4).then_some(digits)
}
