#![doc = include_str!("../README.md")]

pub mod data_sources;
pub mod engine;
pub mod enrichment;
pub mod errors;
pub mod matrices;
pub mod models;
pub mod scoring;

pub use engine::{
    Kinex,
    ResourcePaths,
};
pub use enrichment::{
    EnrichmentOptions,
    EnrichmentResults,
    EnrichmentTable,
};
pub use errors::{
    KinexError,
    Result,
};
pub use matrices::{
    PssmTable,
    ReferenceDistribution,
};
pub use models::{
    InputSite,
    Sequence,
    SequenceType,
};
pub use scoring::{
    AggregationMethod,
    ScoreResult,
    ScoringOptions,
};
