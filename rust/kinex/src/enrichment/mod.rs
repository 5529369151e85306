//! Kinase enrichment among regulated phosphosites.
//!
//! Each kinase family goes through the same three stages:
//!
//! 1. [`EnrichmentCounts`] collects, for every kinase, how often it appears in
//!    the top list of up-, down- and unregulated sites.
//! 2. [`EnrichmentCounts::adjust_background_sites`] makes sure there is an
//!    unregulated background to compare against.
//! 3. [`BackgroundAdjusted::fisher_statistics`] computes odds ratios, one
//!    sided Fisher p-values and Benjamini-Hochberg adjusted p-values, giving
//!    the final [`EnrichmentTable`].

pub(crate) mod accumulator;
pub mod contingency;
pub mod correction;
pub mod counts;
pub mod options;
pub mod table;

pub use accumulator::SiteRegulation;
pub use contingency::{
    Alternative,
    Table2x2,
};
pub use correction::benjamini_hochberg;
pub use counts::{
    BackgroundAdjusted,
    EnrichmentCounts,
    HitCounts,
};
pub use options::EnrichmentOptions;
pub use table::{
    Direction,
    EnrichmentRow,
    EnrichmentTable,
};
use crate::models::SequenceType;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichmentResults {
    pub ser_thr: EnrichmentTable,
    pub tyr: EnrichmentTable,
    /// Cleaned sequences of the rows that could not be scored, in input order.
    pub failed_sites: Vec<String>,
    /// Regulation call of every input row, in input order.
    pub sites: Vec<SiteRegulation>,
}

impl EnrichmentResults {
    pub fn table(&self, family: SequenceType) -> &EnrichmentTable {
        match family {
            SequenceType::SerThr => &self.ser_thr,
            SequenceType::Tyr => &self.tyr,
        }
    }
}
