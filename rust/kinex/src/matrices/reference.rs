use super::PssmTable;
use crate::errors::{
    KinexError,
    ResourceError,
    ScoringError,
};
use crate::models::{
    Sequence,
    SequenceType,
};
use crate::scoring::{
    ScoringOptions,
    aggregate,
    score_site,
};
use rayon::prelude::*;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;
use tracing::{
    debug,
    info,
    instrument,
};

/// Empirical log2 score distributions, one per kinase.
///
/// Each kinase's scores come from scoring the same panel of known
/// phosphosites with that kinase's PSSM. All distributions live in one
/// buffer, sorted ascending within each kinase's slice, so percentile
/// lookups are a binary search.
#[derive(Debug, Clone)]
pub struct ReferenceDistribution {
    family: SequenceType,
    kinases: Vec<Arc<str>>,
    kinase_index: HashMap<Arc<str>, usize>,
    offsets: Vec<usize>,
    scores: Vec<f64>,
}

impl ReferenceDistribution {
    /// Builds the distribution from `(kinase, log2 scores)` columns.
    ///
    /// Columns are sorted here; cells must be finite.
    pub fn new(
        family: SequenceType,
        columns: Vec<(String, Vec<f64>)>,
    ) -> Result<Self, ResourceError> {
        let malformed = |msg: String| ResourceError::MalformedReference { msg };
        if columns.is_empty() {
            return Err(malformed(format!(
                "the {} reference matrix has no kinases",
                family
            )));
        }

        let total: usize = columns.iter().map(|(_, x)| x.len()).sum();
        let mut kinases = Vec::with_capacity(columns.len());
        let mut kinase_index = HashMap::with_capacity(columns.len());
        let mut offsets = Vec::with_capacity(columns.len() + 1);
        let mut scores = Vec::with_capacity(total);
        offsets.push(0);

        for (name, mut values) in columns {
            if values.is_empty() {
                return Err(malformed(format!("kinase {} has no reference scores", name)));
            }
            if let Some(bad) = values.iter().find(|x| !x.is_finite()) {
                return Err(malformed(format!(
                    "kinase {} has a non-finite reference score ({})",
                    name, bad
                )));
            }
            let name: Arc<str> = name.into();
            if kinase_index.insert(name.clone(), kinases.len()).is_some() {
                return Err(malformed(format!("duplicated kinase {}", name)));
            }
            values.sort_unstable_by(|a, b| a.total_cmp(b));
            scores.extend(values);
            offsets.push(scores.len());
            kinases.push(name);
        }

        Ok(Self {
            family,
            kinases,
            kinase_index,
            offsets,
            scores,
        })
    }

    pub fn family(&self) -> SequenceType {
        self.family
    }

    pub fn kinases(&self) -> &[Arc<str>] {
        &self.kinases
    }

    fn range(&self, idx: usize) -> Range<usize> {
        self.offsets[idx]..self.offsets[idx + 1]
    }

    /// Sorted log2 scores of a kinase.
    pub fn get(&self, kinase: &str) -> Option<&[f64]> {
        let idx = *self.kinase_index.get(kinase)?;
        Some(&self.scores[self.range(idx)])
    }

    /// Number of reference scores of a kinase.
    pub fn len_of(&self, kinase: &str) -> Option<usize> {
        self.get(kinase).map(|x| x.len())
    }

    pub fn contains(&self, kinase: &str) -> bool {
        self.kinase_index.contains_key(kinase)
    }

    /// Columns in kinase order, each sorted ascending.
    pub fn columns(&self) -> impl Iterator<Item = (&Arc<str>, &[f64])> {
        self.kinases
            .iter()
            .enumerate()
            .map(|(i, k)| (k, &self.scores[self.range(i)]))
    }

    /// Log2 scores of one reference site for every kinase of `pssm`, in
    /// table order.
    ///
    /// Returns `None` for sites that do not parse or belong to the other
    /// family. Candidate sites are combined with `options.method`, which
    /// must collapse them into one table.
    pub fn score_panel_site(
        pssm: &PssmTable,
        sequence: &str,
        options: &ScoringOptions,
    ) -> Result<Option<Vec<f64>>, ScoringError> {
        let parsed = match Sequence::parse(sequence, options.phospho_priming) {
            Ok(x) => x,
            Err(e) => {
                debug!("Skipping reference site: {}", e);
                return Ok(None);
            }
        };
        if parsed.sequence_type() != pssm.family() {
            return Ok(None);
        }
        let tables = parsed
            .sites()
            .iter()
            .map(|site| score_site(site, pssm, options))
            .collect::<Result<Vec<_>, _>>()?;
        let table = aggregate(tables, options.method)?
            .into_iter()
            .next()
            .ok_or(ScoringError::EmptyAggregation)?;
        Ok(Some(table.iter().map(|x| x.raw_score.log2()).collect()))
    }

    /// Builds the distribution from per-site rows produced by
    /// [`Self::score_panel_site`] with the same PSSM.
    pub fn from_log_rows(pssm: &PssmTable, rows: Vec<Vec<f64>>) -> Result<Self, ResourceError> {
        let mut columns: Vec<(String, Vec<f64>)> = pssm
            .kinases()
            .iter()
            .map(|k| (k.to_string(), Vec::with_capacity(rows.len())))
            .collect();
        for row in rows {
            if row.len() != columns.len() {
                return Err(ResourceError::MalformedReference {
                    msg: format!(
                        "panel row has {} scores, expected {}",
                        row.len(),
                        columns.len()
                    ),
                });
            }
            for ((_, values), score) in columns.iter_mut().zip(row) {
                values.push(score);
            }
        }
        Self::new(pssm.family(), columns)
    }

    /// Scores a panel of known phosphosites against every kinase of `pssm`.
    ///
    /// The panel is any parallel iterator of sequences, so callers can wrap
    /// it (e.g. in a progress bar). Also returns the number of panel sites
    /// that were skipped.
    #[instrument(skip_all, fields(family = %pssm.family()))]
    pub fn from_panel<I>(
        pssm: &PssmTable,
        panel: I,
        options: &ScoringOptions,
    ) -> Result<(Self, usize), KinexError>
    where
        I: IntoParallelIterator,
        I::Item: AsRef<str>,
    {
        if !options.method.collapses() {
            return Err(ScoringError::UnsupportedMethod {
                method: options.method.to_string(),
                supported: "'min', 'max', 'avg'",
            }
            .into());
        }
        let rows = panel
            .into_par_iter()
            .map(|site| Self::score_panel_site(pssm, site.as_ref(), options))
            .collect::<Result<Vec<_>, _>>()?;
        let skipped = rows.iter().filter(|x| x.is_none()).count();
        let scored = rows.len() - skipped;
        let reference = Self::from_log_rows(pssm, rows.into_iter().flatten().collect())?;
        info!(
            "Built {} reference from {} sites ({} skipped)",
            pssm.family(),
            scored,
            skipped
        );
        Ok((reference, skipped))
    }
}
