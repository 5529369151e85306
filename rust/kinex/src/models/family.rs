use crate::errors::SequenceError;
use serde::{
    Deserialize,
    Serialize,
};
use std::fmt::Display;

/// Kinase family partition, decided by the phospho-acceptor residue.
///
/// Each family has its own PSSM, its own reference distribution and its own
/// positional window (Tyr kinases are profiled one residue further on the
/// C-terminal side).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SequenceType {
    #[serde(rename = "ser_thr")]
    SerThr,
    #[serde(rename = "tyr")]
    Tyr,
}

impl SequenceType {
    pub const ALL: [SequenceType; 2] = [SequenceType::SerThr, SequenceType::Tyr];

    /// Family of an acceptor residue, case insensitive.
    pub fn from_acceptor(residue: char) -> Result<Self, SequenceError> {
        match residue.to_ascii_uppercase() {
            'S' | 'T' => Ok(Self::SerThr),
            'Y' => Ok(Self::Tyr),
            _ => Err(SequenceError::UnsupportedSequenceType { residue }),
        }
    }

    /// Most N-terminal position profiled by the family PSSM.
    pub const fn min_position(&self) -> i8 {
        -5
    }

    /// Most C-terminal position profiled by the family PSSM.
    pub const fn max_position(&self) -> i8 {
        match self {
            Self::SerThr => 4,
            Self::Tyr => 5,
        }
    }

    /// Whether the family PSSM carries the `0S`/`0T` acceptor favorability columns.
    pub const fn has_favorability(&self) -> bool {
        matches!(self, Self::SerThr)
    }

    pub fn contains_position(&self, position: i8) -> bool {
        position != 0 && (self.min_position()..=self.max_position()).contains(&position)
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::SerThr => "ser_thr",
            Self::Tyr => "tyr",
        }
    }
}

impl Display for SequenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
