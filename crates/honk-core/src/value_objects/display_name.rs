//! Display name shown next to the local bubble

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

const FRUITS: &[&str] = &[
    "guave",
    "passionfruit",
    "apple",
    "pineapple",
    "mongustan",
    "breadfruit",
    "durian",
    "pomelo",
    "orange",
    "kiwi",
];

/// Human-readable participant name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayName(String);

impl DisplayName {
    /// Use an explicit name; blank names are rejected
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::ValidationError(
                "display name must not be blank".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Pick an "Anonymous <fruit>" name
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        let fruit = FRUITS.choose(&mut rng).copied().unwrap_or("kiwi");
        Self(format!("Anonymous {fruit}"))
    }

    /// Explicit name if one was configured, random otherwise
    pub fn or_random(name: Option<&str>) -> Self {
        name.and_then(|n| Self::new(n).ok())
            .unwrap_or_else(Self::random)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
