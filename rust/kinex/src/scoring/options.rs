use crate::errors::ScoringError;
use serde::{
    Deserialize,
    Serialize,
};
use std::fmt::Display;
use std::str::FromStr;

/// How the score tables of several candidate sites in one sequence are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMethod {
    Min,
    Max,
    #[default]
    Avg,
    /// Keep one table per candidate site.
    All,
}

impl AggregationMethod {
    pub const SUPPORTED: &'static str = "'min', 'max', 'avg', 'all'";

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Max => "max",
            Self::Avg => "avg",
            Self::All => "all",
        }
    }

    /// Whether the method collapses the candidates into a single table.
    pub const fn collapses(&self) -> bool {
        !matches!(self, Self::All)
    }
}

impl FromStr for AggregationMethod {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            "avg" => Ok(Self::Avg),
            "all" => Ok(Self::All),
            other => Err(ScoringError::UnsupportedMethod {
                method: other.to_string(),
                supported: Self::SUPPORTED,
            }),
        }
    }
}

impl Display for AggregationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringOptions {
    /// Score primed (`s`, `t`, `y`) residues with their own PSSM columns.
    pub phospho_priming: bool,
    /// Multiply in the `0S`/`0T` acceptor preference.
    pub favorability: bool,
    pub method: AggregationMethod,
}
