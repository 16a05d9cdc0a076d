//! Analytic distribution carried from stock moves onto journal entry lines.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Decimal places used when displaying distribution weights.
pub const ANALYTIC_PRECISION: u32 = 2;

/// Weighted allocation of an amount across analytic accounts.
///
/// Keys are analytic account references, values are percentage-like weights.
/// The valuation rules never interpret the weights; the map is copied verbatim
/// onto the generated entry line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalyticDistribution(BTreeMap<String, Decimal>);

impl AnalyticDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, analytic_account: impl Into<String>, weight: Decimal) -> Self {
        self.0.insert(analytic_account.into(), weight);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Weights rounded to [`ANALYTIC_PRECISION`] for display.
    pub fn display_weights(&self) -> BTreeMap<String, Decimal> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), v.round_dp(ANALYTIC_PRECISION)))
            .collect()
    }
}
