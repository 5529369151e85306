use crate::errors::StatsError;
use serde::{
    Deserialize,
    Serialize,
};
use statrs::distribution::{
    Discrete,
    DiscreteCDF,
    Hypergeometric,
};
use std::fmt::Display;
use std::str::FromStr;

/// Relative tolerance when comparing table probabilities in the two-sided test.
const PMF_RELATIVE_TOLERANCE: f64 = 1.0 + 1e-7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alternative {
    #[default]
    #[serde(rename = "two-sided")]
    TwoSided,
    #[serde(rename = "greater")]
    Greater,
    #[serde(rename = "less")]
    Less,
}

impl Alternative {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::TwoSided => "two-sided",
            Self::Greater => "greater",
            Self::Less => "less",
        }
    }
}

impl FromStr for Alternative {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "two-sided" => Ok(Self::TwoSided),
            "greater" => Ok(Self::Greater),
            "less" => Ok(Self::Less),
            other => Err(StatsError::UnsupportedAlternative {
                alternative: other.to_string(),
            }),
        }
    }
}

impl Display for Alternative {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A 2x2 contingency table `[[a, b], [c, d]]`.
///
/// With `shift_zeros`, a table holding any zero cell gets 0.5 added to every
/// cell (Haldane-Anscombe correction). Without it, zero cells are rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Table2x2 {
    cells: [[f64; 2]; 2],
    shifted: bool,
}

impl Table2x2 {
    pub fn new(cells: [[f64; 2]; 2], shift_zeros: bool) -> Result<Self, StatsError> {
        if let Some(bad) = cells.iter().flatten().find(|x| !(x.is_finite() && **x >= 0.0)) {
            return Err(StatsError::WrongTableFormat {
                msg: format!("cells must be finite and non-negative, got {}", bad),
            });
        }

        let has_zero = cells.iter().flatten().any(|x| *x == 0.0);
        match (has_zero, shift_zeros) {
            (false, _) => Ok(Self {
                cells,
                shifted: false,
            }),
            (true, true) => Ok(Self {
                cells: cells.map(|row| row.map(|x| x + 0.5)),
                shifted: true,
            }),
            (true, false) => Err(StatsError::ZeroCell),
        }
    }

    pub fn from_counts(counts: [[u64; 2]; 2], shift_zeros: bool) -> Result<Self, StatsError> {
        Self::new(counts.map(|row| row.map(|x| x as f64)), shift_zeros)
    }

    pub fn cells(&self) -> [[f64; 2]; 2] {
        self.cells
    }

    /// Whether the zero shift was applied.
    pub fn is_shifted(&self) -> bool {
        self.shifted
    }

    /// `(a * d) / (b * c)` over the (possibly shifted) cells.
    pub fn odds_ratio(&self) -> f64 {
        let [[a, b], [c, d]] = self.cells;
        a * d / (b * c)
    }

    /// Fisher exact test p-value.
    ///
    /// Cells are truncated to integers first, so a shifted table is tested
    /// on its original counts. A table with an empty row or column has
    /// p = 1.
    pub fn p_value(&self, alternative: Alternative) -> Result<f64, StatsError> {
        let [[a, b], [c, d]] = self.cells.map(|row| row.map(|x| x.trunc() as u64));
        let row1 = a + b;
        let col1 = a + c;
        let total = a + b + c + d;
        if row1 == 0 || c + d == 0 || col1 == 0 || b + d == 0 {
            return Ok(1.0);
        }

        let dist = Hypergeometric::new(total, col1, row1)
            .map_err(|e| StatsError::Distribution { msg: e.to_string() })?;

        let p = match alternative {
            Alternative::Greater => {
                if a == 0 {
                    1.0
                } else {
                    dist.sf(a - 1)
                }
            }
            Alternative::Less => dist.cdf(a),
            Alternative::TwoSided => {
                let min_a = (row1 + col1).saturating_sub(total);
                let max_a = row1.min(col1);
                let observed = dist.pmf(a) * PMF_RELATIVE_TOLERANCE;
                (min_a..=max_a)
                    .map(|k| dist.pmf(k))
                    .filter(|p| *p <= observed)
                    .sum()
            }
        };
        Ok(p.clamp(0.0, 1.0))
    }
}

impl Display for Table2x2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [[a, b], [c, d]] = self.cells;
        write!(f, "[[{}, {}], [{}, {}]]", a, b, c, d)
    }
}
