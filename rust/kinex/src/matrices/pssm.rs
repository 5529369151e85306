use crate::errors::ResourceError;
use crate::models::{
    SequenceType,
    Token,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Residues a complete PSSM profiles at every window position.
pub const PSSM_RESIDUES: &str = "PGACSTVILMFYWHKRQNDEsty";

/// Missing columns listed in a coverage error.
const MAX_REPORTED_COLUMNS: usize = 10;

/// Position specific scoring matrix for one kinase family.
///
/// Rows are kinases, columns are position tokens (plus the Ser/Thr `0S`
/// and `0T` favorability columns). Weights are stored row-major in a single
/// buffer and are immutable after construction.
#[derive(Debug, Clone)]
pub struct PssmTable {
    family: SequenceType,
    kinases: Vec<Arc<str>>,
    kinase_index: HashMap<Arc<str>, usize>,
    columns: Vec<Token>,
    column_index: HashMap<Token, usize>,
    weights: Vec<f64>,
}

impl PssmTable {
    /// Builds a table from its column tokens and `(kinase, weights)` rows.
    ///
    /// Every weight must be finite and strictly positive, so that every
    /// product of weights has a defined log2.
    pub fn new(
        family: SequenceType,
        columns: Vec<Token>,
        rows: Vec<(String, Vec<f64>)>,
    ) -> Result<Self, ResourceError> {
        let malformed = |msg: String| ResourceError::MalformedPssm { msg };

        if rows.is_empty() {
            return Err(malformed(format!("the {} table has no kinases", family)));
        }

        let mut column_index = HashMap::with_capacity(columns.len());
        for (i, col) in columns.iter().enumerate() {
            if column_index.insert(*col, i).is_some() {
                return Err(malformed(format!("duplicated column {}", col)));
            }
        }

        let mut kinases = Vec::with_capacity(rows.len());
        let mut kinase_index = HashMap::with_capacity(rows.len());
        let mut weights = Vec::with_capacity(rows.len() * columns.len());
        for (name, row) in rows {
            if row.len() != columns.len() {
                return Err(malformed(format!(
                    "kinase {} has {} weights, expected {}",
                    name,
                    row.len(),
                    columns.len()
                )));
            }
            if let Some((i, w)) = row
                .iter()
                .enumerate()
                .find(|(_, w)| !(w.is_finite() && **w > 0.0))
            {
                return Err(malformed(format!(
                    "kinase {} has a non-positive weight ({}) at column {}",
                    name, w, columns[i]
                )));
            }
            let name: Arc<str> = name.into();
            if kinase_index.insert(name.clone(), kinases.len()).is_some() {
                return Err(malformed(format!("duplicated kinase {}", name)));
            }
            kinases.push(name);
            weights.extend(row);
        }

        Ok(Self {
            family,
            kinases,
            kinase_index,
            columns,
            column_index,
            weights,
        })
    }

    pub fn family(&self) -> SequenceType {
        self.family
    }

    /// Kinase names, in table order.
    pub fn kinases(&self) -> &[Arc<str>] {
        &self.kinases
    }

    pub fn columns(&self) -> &[Token] {
        &self.columns
    }

    pub fn num_kinases(&self) -> usize {
        self.kinases.len()
    }

    pub fn kinase_index(&self, kinase: &str) -> Option<usize> {
        self.kinase_index.get(kinase).copied()
    }

    pub fn column_index(&self, column: &Token) -> Option<usize> {
        self.column_index.get(column).copied()
    }

    pub fn row(&self, kinase_idx: usize) -> &[f64] {
        let width = self.columns.len();
        &self.weights[kinase_idx * width..(kinase_idx + 1) * width]
    }

    pub fn weight(&self, kinase: &str, column: &Token) -> Option<f64> {
        let row = self.kinase_index(kinase)?;
        let col = self.column_index(column)?;
        Some(self.row(row)[col])
    }

    /// Columns any valid site of the family may request that the table
    /// lacks: every residue at every window position, plus `0S` and `0T`
    /// for families with acceptor favorability.
    pub fn missing_columns(&self) -> Vec<Token> {
        let family = self.family;
        let positions = (family.min_position()..=family.max_position())
            .filter(|x| family.contains_position(*x));
        let mut expected: Vec<Token> = positions
            .flat_map(|position| PSSM_RESIDUES.chars().map(move |r| Token::new(position, r)))
            .collect();
        if family.has_favorability() {
            expected.push(Token::new(0, 'S'));
            expected.push(Token::new(0, 'T'));
        }
        expected.retain(|x| !self.column_index.contains_key(x));
        expected
    }

    /// Fails when [`Self::missing_columns`] is not empty, so an incomplete
    /// table is rejected before any site is scored.
    pub fn check_coverage(&self) -> Result<(), ResourceError> {
        let missing = self.missing_columns();
        if missing.is_empty() {
            return Ok(());
        }
        let listed: Vec<String> = missing
            .iter()
            .take(MAX_REPORTED_COLUMNS)
            .map(|x| x.to_string())
            .collect();
        Err(ResourceError::MalformedPssm {
            msg: format!(
                "the {} table lacks {} columns ({}{})",
                self.family,
                missing.len(),
                listed.join(", "),
                if missing.len() > MAX_REPORTED_COLUMNS {
                    ", ..."
                } else {
                    ""
                }
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(names: &[&str]) -> Vec<Token> {
        names.iter().map(|x| x.parse().unwrap()).collect()
    }

    #[test]
    fn test_build_and_lookup() {
        let table = PssmTable::new(
            SequenceType::SerThr,
            tokens(&["-5P", "-5G"]),
            vec![
                ("AAK1".to_string(), vec![1.2242, 0.4165]),
                ("ACVR2A".to_string(), vec![0.7057, 0.8178]),
            ],
        )
        .unwrap();

        assert_eq!(table.num_kinases(), 2);
        assert_eq!(table.kinases()[1].as_ref(), "ACVR2A");
        assert_eq!(table.weight("AAK1", &"-5G".parse().unwrap()), Some(0.4165));
        assert_eq!(table.row(1), &[0.7057, 0.8178]);
        assert_eq!(table.weight("AAK1", &"-4G".parse().unwrap()), None);
    }

    #[test]
    fn test_rejects_malformed_tables() {
        let cols = tokens(&["-5P", "-5G"]);
        let zero = PssmTable::new(
            SequenceType::SerThr,
            cols.clone(),
            vec![("AAK1".to_string(), vec![0.0, 1.0])],
        );
        assert!(matches!(zero, Err(ResourceError::MalformedPssm { .. })));

        let short = PssmTable::new(
            SequenceType::SerThr,
            cols.clone(),
            vec![("AAK1".to_string(), vec![1.0])],
        );
        assert!(short.is_err());

        let dup = PssmTable::new(
            SequenceType::SerThr,
            cols.clone(),
            vec![
                ("AAK1".to_string(), vec![1.0, 1.0]),
                ("AAK1".to_string(), vec![1.0, 1.0]),
            ],
        );
        assert!(dup.is_err());

        let empty = PssmTable::new(SequenceType::Tyr, cols, vec![]);
        assert!(empty.is_err());
    }

    fn full_columns(family: SequenceType) -> Vec<Token> {
        let mut columns: Vec<Token> = (family.min_position()..=family.max_position())
            .filter(|x| *x != 0)
            .flat_map(|p| PSSM_RESIDUES.chars().map(move |r| Token::new(p, r)))
            .collect();
        if family.has_favorability() {
            columns.extend(tokens(&["0S", "0T"]));
        }
        columns
    }

    fn uniform(family: SequenceType, columns: Vec<Token>) -> PssmTable {
        let width = columns.len();
        PssmTable::new(family, columns, vec![("AAK1".to_string(), vec![1.0; width])]).unwrap()
    }

    #[test]
    fn test_coverage() {
        let complete = uniform(SequenceType::SerThr, full_columns(SequenceType::SerThr));
        assert_eq!(complete.columns().len(), 9 * 23 + 2);
        assert!(complete.missing_columns().is_empty());
        assert!(complete.check_coverage().is_ok());

        let tyr = uniform(SequenceType::Tyr, full_columns(SequenceType::Tyr));
        assert_eq!(tyr.columns().len(), 10 * 23);
        assert!(tyr.check_coverage().is_ok());

        let drop = tokens(&["-1W", "0S"]);
        let mut columns = full_columns(SequenceType::SerThr);
        columns.retain(|x| !drop.contains(x));
        let partial = uniform(SequenceType::SerThr, columns);
        assert_eq!(partial.missing_columns(), drop);
        assert!(matches!(
            partial.check_coverage(),
            Err(ResourceError::MalformedPssm { .. })
        ));
    }
}
