use super::scorer::ScoreTable;
use crate::errors::ScoringError;
use crate::matrices::ReferenceDistribution;
use crate::models::SequenceType;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KinaseRank {
    pub kinase: Arc<str>,
    pub raw_score: f64,
    pub log_score: f64,
    pub percentile: f64,
}

/// Position of `log_score` in a sorted reference, as a percentile.
///
/// Uses the leftmost insertion point, so the result is the share of the
/// reference strictly below the score, plus one slot. Scores above every
/// reference value would land one slot past the end and are capped at 100.
pub fn percentile_of(log_score: f64, reference: &[f64]) -> f64 {
    let insertion = reference.partition_point(|x| *x < log_score);
    let percentile = (insertion + 1) as f64 * 100.0 / reference.len() as f64;
    percentile.min(100.0)
}

/// Kinases of one scored site, by percentile descending.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Ranking {
    rows: Vec<KinaseRank>,
}

impl Ranking {
    pub fn rows(&self) -> &[KinaseRank] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, kinase: &str) -> Option<&KinaseRank> {
        self.rows.iter().find(|x| x.kinase.as_ref() == kinase)
    }

    pub fn median_percentile(&self) -> Option<f64> {
        if self.rows.is_empty() {
            return None;
        }
        let mut values: Vec<f64> = self.rows.iter().map(|x| x.percentile).collect();
        values.sort_unstable_by(|a, b| a.total_cmp(b));
        let mid = values.len() / 2;
        if values.len() % 2 == 0 {
            Some((values[mid - 1] + values[mid]) / 2.0)
        } else {
            Some(values[mid])
        }
    }

    /// Number of kinases with a percentile strictly above `limit`.
    pub fn promiscuity_index(&self, limit: f64) -> usize {
        self.rows.iter().filter(|x| x.percentile > limit).count()
    }

    pub fn top(&self, n: usize) -> &[KinaseRank] {
        &self.rows[..n.min(self.rows.len())]
    }
}

/// Ranks a score table against the reference distribution of its family.
///
/// Every kinase in the table needs a reference column. Ties keep the order
/// of the score table.
pub fn rank(table: &ScoreTable, reference: &ReferenceDistribution) -> Result<Ranking, ScoringError> {
    let mut rows = table
        .iter()
        .map(|score| {
            if !(score.raw_score > 0.0) {
                return Err(ScoringError::NonPositiveScore {
                    kinase: score.kinase.to_string(),
                    score: score.raw_score,
                });
            }
            let dist = reference
                .get(&score.kinase)
                .ok_or_else(|| ScoringError::MissingReference {
                    kinase: score.kinase.to_string(),
                })?;
            let log_score = score.raw_score.log2();
            Ok(KinaseRank {
                kinase: score.kinase.clone(),
                raw_score: score.raw_score,
                log_score,
                percentile: percentile_of(log_score, dist),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    rows.sort_by(|a, b| b.percentile.total_cmp(&a.percentile));
    Ok(Ranking { rows })
}

/// Rankings of one input sequence.
///
/// Holds a single ranking unless the scoring method keeps every candidate
/// site, in which case there is one ranking per candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    pub sequence: String,
    pub family: SequenceType,
    pub rankings: Vec<Ranking>,
}

impl ScoreResult {
    pub fn median_percentile(&self) -> Vec<Option<f64>> {
        self.rankings.iter().map(|x| x.median_percentile()).collect()
    }

    pub fn promiscuity_index(&self, limit: f64) -> Vec<usize> {
        self.rankings
            .iter()
            .map(|x| x.promiscuity_index(limit))
            .collect()
    }

    pub fn top(&self, n: usize) -> Vec<&[KinaseRank]> {
        self.rankings.iter().map(|x| x.top(n)).collect()
    }
}
