use once_cell::sync::Lazy;
use regex::Regex;
use serde::{
    Deserialize,
    Serialize,
};
use std::fmt::Display;

/// Non-phospho modification annotations that are dropped before parsing.
static MODIFICATION_ANNOTATIONS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\((?:ub|ox|ac|de)\)").expect("Static regex should compile"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Regulation {
    Upregulated,
    Downregulated,
    Unregulated,
}

impl Regulation {
    /// Labels a log2 fold change against a symmetric threshold.
    ///
    /// Boundaries are inclusive: `fc >= threshold` is upregulated and
    /// `fc <= -threshold` is downregulated. Non-finite fold changes have no
    /// label.
    pub fn from_fold_change(log2_fold_change: f64, threshold: f64) -> Option<Self> {
        if !log2_fold_change.is_finite() {
            return None;
        }
        if log2_fold_change >= threshold {
            Some(Self::Upregulated)
        } else if log2_fold_change <= -threshold {
            Some(Self::Downregulated)
        } else {
            Some(Self::Unregulated)
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Upregulated => "upregulated",
            Self::Downregulated => "downregulated",
            Self::Unregulated => "unregulated",
        }
    }
}

impl Display for Regulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One row of an experiment: a phosphosite and its log2 fold change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSite {
    pub sequence: String,
    pub log2_fold_change: f64,
}

impl InputSite {
    pub fn new(sequence: impl Into<String>, log2_fold_change: f64) -> Self {
        Self {
            sequence: sequence.into(),
            log2_fold_change,
        }
    }

    /// Sequence with the `(ub)`, `(ox)`, `(ac)` and `(de)` annotations removed.
    pub fn cleaned_sequence(&self) -> String {
        MODIFICATION_ANNOTATIONS
            .replace_all(&self.sequence, "")
            .into_owned()
    }
}
