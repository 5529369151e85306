use super::options::ScoringOptions;
use crate::errors::ScoringError;
use crate::matrices::PssmTable;
use crate::models::{
    PhosphoSite,
    Token,
};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct KinaseScore {
    pub kinase: Arc<str>,
    pub raw_score: f64,
}

/// Raw PSSM scores of one site, in PSSM kinase order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreTable {
    scores: Vec<KinaseScore>,
}

impl ScoreTable {
    pub fn new(scores: Vec<KinaseScore>) -> Self {
        Self { scores }
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KinaseScore> {
        self.scores.iter()
    }

    pub fn get(&self, kinase: &str) -> Option<f64> {
        self.scores
            .iter()
            .find(|x| x.kinase.as_ref() == kinase)
            .map(|x| x.raw_score)
    }

    pub fn into_inner(self) -> Vec<KinaseScore> {
        self.scores
    }
}

/// Resolves tokens to column indices, checking the family window.
fn resolve_columns(tokens: &[Token], pssm: &PssmTable) -> Result<Vec<usize>, ScoringError> {
    let family = pssm.family();
    tokens
        .iter()
        .map(|token| {
            let in_window = if token.is_favorability() {
                family.has_favorability()
            } else {
                family.contains_position(token.position())
            };
            let idx = if in_window {
                pssm.column_index(token)
            } else {
                None
            };
            idx.ok_or_else(|| ScoringError::InvalidColumn {
                column: token.to_string(),
                family: family.name(),
            })
        })
        .collect()
}

/// Product of the weights at `tokens`, for every kinase in the table.
///
/// An empty token list scores 1.0 for every kinase.
pub fn score_tokens(tokens: &[Token], pssm: &PssmTable) -> Result<ScoreTable, ScoringError> {
    let columns = resolve_columns(tokens, pssm)?;
    let scores = pssm
        .kinases()
        .iter()
        .enumerate()
        .map(|(i, kinase)| {
            let row = pssm.row(i);
            let raw_score = columns.iter().map(|&c| row[c]).product();
            KinaseScore {
                kinase: kinase.clone(),
                raw_score,
            }
        })
        .collect();
    Ok(ScoreTable { scores })
}

/// Scores one candidate site against the PSSM of its family.
pub fn score_site(
    site: &PhosphoSite,
    pssm: &PssmTable,
    options: &ScoringOptions,
) -> Result<ScoreTable, ScoringError> {
    let family = pssm.family();
    let mut tokens = site.get_columns(family, options.phospho_priming);
    if options.favorability && family.has_favorability() {
        if let Some(fav) = site.favorability_column() {
            tokens.push(fav);
        }
    }
    score_tokens(&tokens, pssm)
}
