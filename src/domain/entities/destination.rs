//! Destination entity: one redirect target paired with its selection weight.

use serde::{Deserialize, Serialize};

/// A candidate redirect target.
///
/// Url and weight always travel together so a destination list can never
/// drift out of sync with its weights. A weight of `0.0` keeps the URL
/// configured while excluding it from selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub url: String,
    pub weight: f64,
}

impl Destination {
    pub fn new(url: impl Into<String>, weight: f64) -> Self {
        Self {
            url: url.into(),
            weight,
        }
    }

    /// Returns true if the destination takes part in selection.
    pub fn is_selectable(&self) -> bool {
        self.weight.is_finite() && self.weight > 0.0
    }
}

/// Sum of the selectable weights in a destination list.
pub fn total_weight(destinations: &[Destination]) -> f64 {
    destinations
        .iter()
        .filter(|d| d.is_selectable())
        .map(|d| d.weight)
        .sum()
}
