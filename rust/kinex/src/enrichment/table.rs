use crate::models::SequenceType;
use serde::{
    Deserialize,
    Serialize,
};
use std::fmt::Display;
use std::sync::Arc;

/// Regulation direction in which a kinase is more enriched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "upregulated set")]
    Upregulated,
    #[serde(rename = "downregulated set")]
    Downregulated,
}

impl Direction {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Upregulated => "upregulated set",
            Self::Downregulated => "downregulated set",
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One kinase of a finalized enrichment table.
///
/// Enrichment values are odds ratios. The `_log2` columns are signed by
/// direction (non-negative for up, non-positive for down), the
/// `_log10_abs` columns are `|log10(p)|`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichmentRow {
    pub kinase: Arc<str>,
    pub upregulated: u64,
    pub downregulated: u64,
    pub unregulated: u64,
    pub upregulated_enrichment_value: f64,
    pub upregulated_enrichment_value_log2: f64,
    pub upregulated_p_value: f64,
    pub upregulated_p_value_log10_abs: f64,
    pub upregulated_adjusted_p_value: f64,
    pub upregulated_adjusted_p_value_log10_abs: f64,
    pub downregulated_enrichment_value: f64,
    pub downregulated_enrichment_value_log2: f64,
    pub downregulated_p_value: f64,
    pub downregulated_p_value_log10_abs: f64,
    pub downregulated_adjusted_p_value: f64,
    pub downregulated_adjusted_p_value_log10_abs: f64,
    pub dominant_direction: Direction,
    pub dominant_enrichment_value_log2: f64,
    pub dominant_p_value_log10_abs: f64,
    pub dominant_adjusted_p_value_log10_abs: f64,
}

impl EnrichmentRow {
    /// Row of a kinase that never made it into a top list.
    pub(crate) fn absent(kinase: Arc<str>) -> Self {
        Self {
            kinase,
            upregulated: 0,
            downregulated: 0,
            unregulated: 0,
            upregulated_enrichment_value: 0.0,
            upregulated_enrichment_value_log2: 0.0,
            upregulated_p_value: 1.0,
            upregulated_p_value_log10_abs: 0.0,
            upregulated_adjusted_p_value: 1.0,
            upregulated_adjusted_p_value_log10_abs: 0.0,
            downregulated_enrichment_value: 0.0,
            downregulated_enrichment_value_log2: 0.0,
            downregulated_p_value: 1.0,
            downregulated_p_value_log10_abs: 0.0,
            downregulated_adjusted_p_value: 1.0,
            downregulated_adjusted_p_value_log10_abs: 0.0,
            dominant_direction: Direction::Downregulated,
            dominant_enrichment_value_log2: 0.0,
            dominant_p_value_log10_abs: 0.0,
            dominant_adjusted_p_value_log10_abs: 0.0,
        }
    }
}

/// Finalized enrichment of one kinase family, one row per known kinase,
/// sorted by kinase name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichmentTable {
    pub family: SequenceType,
    pub total_upregulated: u64,
    pub total_downregulated: u64,
    /// Number of unregulated sites, or the substituted background estimate.
    pub total_unregulated: f64,
    pub rows: Vec<EnrichmentRow>,
}

impl EnrichmentTable {
    pub fn get(&self, kinase: &str) -> Option<&EnrichmentRow> {
        self.rows
            .binary_search_by(|x| x.kinase.as_ref().cmp(kinase))
            .ok()
            .map(|i| &self.rows[i])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn kinases(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|x| x.kinase.as_ref())
    }
}
