use std::path::PathBuf;
use thiserror::Error;

/// Failures while interpreting a single phosphosite string.
///
/// These are the errors the batch enrichment tolerates: a site that raises
/// one of them is recorded as failed and the batch continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("Unsupported sequence format for '{sequence}'. Supported formats: *, (ph) and central")]
    UnsupportedSequenceFormat { sequence: String },
    #[error("Invalid sequence '{sequence}': {reason}")]
    InvalidSequence {
        sequence: String,
        reason: &'static str,
    },
    #[error("Unsupported sequence type for acceptor '{residue}'. Supported types: SER, THR, TYR")]
    UnsupportedSequenceType { residue: char },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("Method '{method}' is not supported. Supported methods: {supported}")]
    UnsupportedMethod {
        method: String,
        supported: &'static str,
    },
    #[error("Column '{column}' is not available in the {family} PSSM")]
    InvalidColumn {
        column: String,
        family: &'static str,
    },
    #[error("Kinase '{kinase}' has no reference distribution")]
    MissingReference { kinase: String },
    #[error("Kinase '{kinase}' produced a non-positive raw score ({score})")]
    NonPositiveScore { kinase: String, score: f64 },
    #[error("Nothing to aggregate")]
    EmptyAggregation,
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("Error reading {}: {source}", path.display())]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("Error parsing table {context}: {source}")]
    Csv {
        source: csv::Error,
        context: String,
    },
    #[error("Malformed PSSM table: {msg}")]
    MalformedPssm { msg: String },
    #[error("Malformed reference matrix: {msg}")]
    MalformedReference { msg: String },
    #[error("Malformed input sites: {msg}")]
    MalformedInput { msg: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    #[error("Wrong table format: {msg}")]
    WrongTableFormat { msg: String },
    #[error("Table contains zeros and shift_zeros is set to false")]
    ZeroCell,
    #[error("Alternative '{alternative}' is not supported. Supported alternatives: 'two-sided', 'greater', 'less'")]
    UnsupportedAlternative { alternative: String },
    #[error("p-value at index {index} is out of range [0, 1]: {value}")]
    InvalidPValue { index: usize, value: f64 },
    #[error("Unable to build the hypergeometric distribution: {msg}")]
    Distribution { msg: String },
}

#[derive(Debug, Error)]
pub enum KinexError {
    #[error(transparent)]
    Sequence(#[from] SequenceError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error(transparent)]
    Stats(#[from] StatsError),
    #[error("Invalid options: {msg}")]
    Options { msg: String },
}

impl KinexError {
    /// Whether the error originates from a single bad phosphosite (and not
    /// from the engine state or the options).
    pub fn is_sequence_error(&self) -> bool {
        matches!(self, KinexError::Sequence(_))
    }
}

pub type Result<T> = std::result::Result<T, KinexError>;
