use super::contingency::{
    Alternative,
    Table2x2,
};
use super::correction::benjamini_hochberg;
use super::table::{
    Direction,
    EnrichmentRow,
    EnrichmentTable,
};
use crate::errors::StatsError;
use crate::models::{
    Regulation,
    SequenceType,
};
use serde::Serialize;
use std::collections::HashMap;
use std::ops::AddAssign;
use std::sync::Arc;
use tracing::{
    debug,
    warn,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HitCounts {
    pub upregulated: u64,
    pub downregulated: u64,
    pub unregulated: u64,
}

impl HitCounts {
    pub fn get(&self, regulation: Regulation) -> u64 {
        match regulation {
            Regulation::Upregulated => self.upregulated,
            Regulation::Downregulated => self.downregulated,
            Regulation::Unregulated => self.unregulated,
        }
    }

    fn increment(&mut self, regulation: Regulation) {
        match regulation {
            Regulation::Upregulated => self.upregulated += 1,
            Regulation::Downregulated => self.downregulated += 1,
            Regulation::Unregulated => self.unregulated += 1,
        }
    }
}

impl AddAssign for HitCounts {
    fn add_assign(&mut self, other: Self) {
        self.upregulated += other.upregulated;
        self.downregulated += other.downregulated;
        self.unregulated += other.unregulated;
    }
}

/// Per-kinase hit counters of one kinase family, while sites are still
/// being added.
///
/// Counters only ever grow, so merging partial counts in any order gives
/// the same result.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentCounts {
    family: SequenceType,
    totals: HitCounts,
    hits: HashMap<Arc<str>, HitCounts>,
}

impl EnrichmentCounts {
    pub fn new(family: SequenceType) -> Self {
        Self {
            family,
            totals: HitCounts::default(),
            hits: HashMap::new(),
        }
    }

    pub fn family(&self) -> SequenceType {
        self.family
    }

    /// Number of sites per regulation label.
    pub fn totals(&self) -> HitCounts {
        self.totals
    }

    pub fn hits(&self, kinase: &str) -> Option<HitCounts> {
        self.hits.get(kinase).copied()
    }

    pub fn num_kinases(&self) -> usize {
        self.hits.len()
    }

    /// Adds one site and the kinases of its top list.
    pub fn record<I>(&mut self, regulation: Regulation, top_kinases: I)
    where
        I: IntoIterator<Item = Arc<str>>,
    {
        self.totals.increment(regulation);
        for kinase in top_kinases {
            self.hits.entry(kinase).or_default().increment(regulation);
        }
    }

    pub fn merge(mut self, other: Self) -> Self {
        debug_assert_eq!(self.family, other.family);
        self.totals += other.totals;
        for (kinase, counts) in other.hits {
            *self.hits.entry(kinase).or_default() += counts;
        }
        self
    }

    /// Replaces an empty unregulated background with `min(up, down) / 2`.
    pub fn adjust_background_sites(self) -> BackgroundAdjusted {
        let total_upregulated = self.totals.upregulated;
        let total_downregulated = self.totals.downregulated;
        let mut total_unregulated = self.totals.unregulated as f64;
        if self.totals.unregulated == 0 {
            total_unregulated = total_upregulated.min(total_downregulated) as f64 / 2.0;
            warn!(
                "No unregulated {} sites, using {} as background",
                self.family, total_unregulated
            );
        }
        BackgroundAdjusted {
            family: self.family,
            total_upregulated,
            total_downregulated,
            total_unregulated,
            hits: self.hits,
        }
    }
}

/// Counts with a usable unregulated background, ready for testing.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundAdjusted {
    family: SequenceType,
    total_upregulated: u64,
    total_downregulated: u64,
    total_unregulated: f64,
    hits: HashMap<Arc<str>, HitCounts>,
}

#[derive(Debug, Clone, Copy)]
struct DirectionStats {
    enrichment_value: f64,
    enrichment_value_log2: f64,
    p_value: f64,
    p_value_log10_abs: f64,
}

impl DirectionStats {
    const NOT_ENRICHED: Self = Self {
        enrichment_value: 0.0,
        enrichment_value_log2: 0.0,
        p_value: 1.0,
        p_value_log10_abs: 0.0,
    };
}

/// Odds ratio and one-sided Fisher p-value of regulated vs background hits.
fn direction_stats(
    hits: u64,
    total: u64,
    background_hits: u64,
    background_total: f64,
) -> Result<DirectionStats, StatsError> {
    if total == 0 || hits == 0 {
        return Ok(DirectionStats::NOT_ENRICHED);
    }
    let table = Table2x2::new(
        [
            [hits as f64, total.saturating_sub(hits) as f64],
            [
                background_hits as f64,
                (background_total - background_hits as f64).max(0.0),
            ],
        ],
        true,
    )?;
    let enrichment_value = table.odds_ratio();
    let p_value = table.p_value(Alternative::Greater)?;
    Ok(DirectionStats {
        enrichment_value,
        enrichment_value_log2: enrichment_value.log2().abs(),
        p_value,
        p_value_log10_abs: p_value.log10().abs(),
    })
}

impl BackgroundAdjusted {
    pub fn family(&self) -> SequenceType {
        self.family
    }

    pub fn total_unregulated(&self) -> f64 {
        self.total_unregulated
    }

    /// Runs the per-kinase tests and reindexes to the kinase universe.
    ///
    /// Kinases never counted get all-zero counts and p-values of 1. Every
    /// kinase with at least one hit enters the adjustment, absent ones do
    /// not.
    pub fn fisher_statistics(self, universe: &[Arc<str>]) -> Result<EnrichmentTable, StatsError> {
        let mut counted: Vec<(Arc<str>, HitCounts)> = self.hits.into_iter().collect();
        counted.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        let mut rows = Vec::with_capacity(counted.len().max(universe.len()));
        for (kinase, mut counts) in counted {
            if counts.unregulated == 0 {
                counts.unregulated = 1;
            }
            let up = direction_stats(
                counts.upregulated,
                self.total_upregulated,
                counts.unregulated,
                self.total_unregulated,
            )?;
            let mut down = direction_stats(
                counts.downregulated,
                self.total_downregulated,
                counts.unregulated,
                self.total_unregulated,
            )?;
            if down.enrichment_value_log2 > 0.0 {
                down.enrichment_value_log2 = -down.enrichment_value_log2;
            }

            let dominant = if up.enrichment_value > down.enrichment_value {
                (Direction::Upregulated, up)
            } else {
                (Direction::Downregulated, down)
            };

            rows.push(EnrichmentRow {
                kinase,
                upregulated: counts.upregulated,
                downregulated: counts.downregulated,
                unregulated: counts.unregulated,
                upregulated_enrichment_value: up.enrichment_value,
                upregulated_enrichment_value_log2: up.enrichment_value_log2,
                upregulated_p_value: up.p_value,
                upregulated_p_value_log10_abs: up.p_value_log10_abs,
                upregulated_adjusted_p_value: 1.0,
                upregulated_adjusted_p_value_log10_abs: 0.0,
                downregulated_enrichment_value: down.enrichment_value,
                downregulated_enrichment_value_log2: down.enrichment_value_log2,
                downregulated_p_value: down.p_value,
                downregulated_p_value_log10_abs: down.p_value_log10_abs,
                downregulated_adjusted_p_value: 1.0,
                downregulated_adjusted_p_value_log10_abs: 0.0,
                dominant_direction: dominant.0,
                dominant_enrichment_value_log2: dominant.1.enrichment_value_log2,
                dominant_p_value_log10_abs: dominant.1.p_value_log10_abs,
                dominant_adjusted_p_value_log10_abs: 0.0,
            });
        }

        let up_p: Vec<f64> = rows.iter().map(|x| x.upregulated_p_value).collect();
        let down_p: Vec<f64> = rows.iter().map(|x| x.downregulated_p_value).collect();
        let up_adjusted = benjamini_hochberg(&up_p)?;
        let down_adjusted = benjamini_hochberg(&down_p)?;
        for ((row, up), down) in rows.iter_mut().zip(up_adjusted).zip(down_adjusted) {
            row.upregulated_adjusted_p_value = up;
            row.upregulated_adjusted_p_value_log10_abs = up.log10().abs();
            row.downregulated_adjusted_p_value = down;
            row.downregulated_adjusted_p_value_log10_abs = down.log10().abs();
            row.dominant_adjusted_p_value_log10_abs = match row.dominant_direction {
                Direction::Upregulated => row.upregulated_adjusted_p_value_log10_abs,
                Direction::Downregulated => row.downregulated_adjusted_p_value_log10_abs,
            };
        }

        let num_counted = rows.len();
        for kinase in universe {
            if rows[..num_counted]
                .binary_search_by(|x| x.kinase.as_ref().cmp(kinase.as_ref()))
                .is_err()
            {
                rows.push(EnrichmentRow::absent(kinase.clone()));
            }
        }
        rows.sort_by(|a, b| a.kinase.cmp(&b.kinase));
        rows.dedup_by(|a, b| a.kinase == b.kinase);
        debug!(
            "{} enrichment: {} kinases counted, {} added from the universe",
            self.family,
            num_counted,
            rows.len() - num_counted
        );

        Ok(EnrichmentTable {
            family: self.family,
            total_upregulated: self.total_upregulated,
            total_downregulated: self.total_downregulated,
            total_unregulated: self.total_unregulated,
            rows,
        })
    }
}
