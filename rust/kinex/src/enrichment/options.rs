use crate::errors::{
    KinexError,
    ScoringError,
};
use crate::scoring::{
    AggregationMethod,
    ScoringOptions,
};
use serde::{
    Deserialize,
    Serialize,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentOptions {
    /// Absolute log2 fold change at which a site counts as regulated.
    pub fc_threshold: f64,
    /// How many of the best ranked kinases of each site are counted as hits.
    pub top_n: usize,
    pub scoring: ScoringOptions,
}

impl Default for EnrichmentOptions {
    fn default() -> Self {
        Self {
            fc_threshold: 1.5,
            top_n: 15,
            scoring: ScoringOptions::default(),
        }
    }
}

impl EnrichmentOptions {
    pub const SUPPORTED_METHODS: &'static str = "'min', 'max', 'avg'";

    pub fn validate(&self) -> Result<(), KinexError> {
        if !self.scoring.method.collapses() {
            return Err(ScoringError::UnsupportedMethod {
                method: self.scoring.method.to_string(),
                supported: Self::SUPPORTED_METHODS,
            }
            .into());
        }
        if !(self.fc_threshold.is_finite() && self.fc_threshold >= 0.0) {
            return Err(KinexError::Options {
                msg: format!(
                    "fc_threshold must be finite and non-negative, got {}",
                    self.fc_threshold
                ),
            });
        }
        if self.top_n == 0 {
            return Err(KinexError::Options {
                msg: "top_n must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn method(&self) -> AggregationMethod {
        self.scoring.method
    }
}
