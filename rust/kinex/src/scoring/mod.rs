pub mod aggregate;
pub mod options;
pub mod ranking;
pub mod scorer;

pub use aggregate::aggregate;
pub use options::{
    AggregationMethod,
    ScoringOptions,
};
pub use ranking::{
    KinaseRank,
    Ranking,
    ScoreResult,
    percentile_of,
    rank,
};
pub use scorer::{
    KinaseScore,
    ScoreTable,
    score_site,
    score_tokens,
};
