use super::options::AggregationMethod;
use super::scorer::{
    KinaseScore,
    ScoreTable,
};
use crate::errors::ScoringError;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
struct Fold {
    min: f64,
    max: f64,
    sum: f64,
    count: usize,
}

impl Fold {
    fn new(value: f64) -> Self {
        Self {
            min: value,
            max: value,
            sum: value,
            count: 1,
        }
    }

    fn push(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.sum += value;
        self.count += 1;
    }

    fn finish(&self, method: AggregationMethod) -> f64 {
        match method {
            AggregationMethod::Min => self.min,
            AggregationMethod::Max => self.max,
            AggregationMethod::Avg | AggregationMethod::All => self.sum / self.count as f64,
        }
    }
}

/// Combines the score tables of a sequence's candidate sites.
///
/// Kinases are matched by name. A kinase missing from some tables is
/// folded over the tables that have it, so the mean only divides by the
/// number of tables that actually contain the kinase. The output keeps
/// the order in which kinases are first seen.
///
/// `All` returns the tables untouched; every other method returns exactly
/// one table.
pub fn aggregate(
    tables: Vec<ScoreTable>,
    method: AggregationMethod,
) -> Result<Vec<ScoreTable>, ScoringError> {
    if tables.is_empty() {
        return Err(ScoringError::EmptyAggregation);
    }
    if !method.collapses() || tables.len() == 1 {
        return Ok(tables);
    }

    let mut order: Vec<Arc<str>> = Vec::new();
    let mut folds: HashMap<Arc<str>, Fold> = HashMap::new();
    for table in tables.iter() {
        for score in table.iter() {
            match folds.get_mut(&score.kinase) {
                Some(fold) => fold.push(score.raw_score),
                None => {
                    order.push(score.kinase.clone());
                    folds.insert(score.kinase.clone(), Fold::new(score.raw_score));
                }
            }
        }
    }

    let scores = order
        .into_iter()
        .map(|kinase| {
            let raw_score = folds[&kinase].finish(method);
            KinaseScore { kinase, raw_score }
        })
        .collect();
    Ok(vec![ScoreTable::new(scores)])
}
