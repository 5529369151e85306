//! Collection of per-site enrichment outcomes from parallel iterators.

use super::counts::EnrichmentCounts;
use crate::models::{
    Regulation,
    SequenceType,
};
use rayon::iter::{
    FromParallelIterator,
    IntoParallelIterator,
    ParallelIterator,
};
use serde::Serialize;
use std::sync::Arc;

/// Regulation call of one input row.
///
/// `family` and `regulation` are `None` for rows that failed to score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteRegulation {
    pub sequence: String,
    pub log2_fold_change: f64,
    pub family: Option<SequenceType>,
    pub regulation: Option<Regulation>,
}

impl SiteRegulation {
    pub fn is_failed(&self) -> bool {
        self.regulation.is_none()
    }

    pub fn label(&self) -> &'static str {
        self.regulation.map(|x| x.name()).unwrap_or("failed")
    }
}

/// What happened to one input row, tagged with its input position.
#[derive(Debug, Clone)]
pub(crate) enum SiteOutcome {
    Scored {
        index: usize,
        site: SiteRegulation,
        family: SequenceType,
        regulation: Regulation,
        top_kinases: Vec<Arc<str>>,
    },
    Failed {
        index: usize,
        site: SiteRegulation,
    },
}

/// Fold/reduce accumulator over [`SiteOutcome`]s.
///
/// Threads build local counters which are then merged pairwise. Row
/// positions travel with the rows so input order can be restored at the
/// end.
#[derive(Debug)]
pub(crate) struct EnrichmentAccumulator {
    pub(crate) ser_thr: EnrichmentCounts,
    pub(crate) tyr: EnrichmentCounts,
    failed: Vec<(usize, String)>,
    sites: Vec<(usize, SiteRegulation)>,
}

impl Default for EnrichmentAccumulator {
    fn default() -> Self {
        Self {
            ser_thr: EnrichmentCounts::new(SequenceType::SerThr),
            tyr: EnrichmentCounts::new(SequenceType::Tyr),
            failed: Vec::new(),
            sites: Vec::new(),
        }
    }
}

impl EnrichmentAccumulator {
    pub(crate) fn reduce(mut self, other: Self) -> Self {
        self.ser_thr = self.ser_thr.merge(other.ser_thr);
        self.tyr = self.tyr.merge(other.tyr);
        self.failed.extend(other.failed);
        self.sites.extend(other.sites);
        self
    }

    pub(crate) fn fold(mut self, item: SiteOutcome) -> Self {
        match item {
            SiteOutcome::Scored {
                index,
                site,
                family,
                regulation,
                top_kinases,
            } => {
                let counts = match family {
                    SequenceType::SerThr => &mut self.ser_thr,
                    SequenceType::Tyr => &mut self.tyr,
                };
                counts.record(regulation, top_kinases);
                self.sites.push((index, site));
            }
            SiteOutcome::Failed { index, site } => {
                self.failed.push((index, site.sequence.clone()));
                self.sites.push((index, site));
            }
        }
        self
    }

    /// Failed sequences and per-row regulation calls, in input order.
    pub(crate) fn take_sites(&mut self) -> (Vec<String>, Vec<SiteRegulation>) {
        let mut failed = std::mem::take(&mut self.failed);
        let mut sites = std::mem::take(&mut self.sites);
        failed.sort_unstable_by_key(|x| x.0);
        sites.sort_unstable_by_key(|x| x.0);
        (
            failed.into_iter().map(|x| x.1).collect(),
            sites.into_iter().map(|x| x.1).collect(),
        )
    }
}

impl FromIterator<SiteOutcome> for EnrichmentAccumulator {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = SiteOutcome>,
    {
        iter.into_iter()
            .fold(EnrichmentAccumulator::default(), EnrichmentAccumulator::fold)
    }
}

impl FromParallelIterator<SiteOutcome> for EnrichmentAccumulator {
    fn from_par_iter<I>(par_iter: I) -> Self
    where
        I: IntoParallelIterator<Item = SiteOutcome>,
    {
        par_iter
            .into_par_iter()
            .fold(EnrichmentAccumulator::default, EnrichmentAccumulator::fold)
            .reduce(EnrichmentAccumulator::default, EnrichmentAccumulator::reduce)
    }
}
