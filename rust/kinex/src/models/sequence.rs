//! Phosphosite sequences and their candidate acceptor sites.
//!
//! Two input conventions are supported:
//! * separator-marked, where a marker follows each phospho-acceptor:
//!   `GRNSLs*PVQA` or `GRNSLs(ph)PVQA`. Several markers mean several candidate
//!   sites (ambiguous site localization).
//! * central, an odd-length window whose middle residue is the acceptor:
//!   `GRNSLSPVQAS`.
//!
//! Besides the 20 amino acids, `s`/`t`/`y` mark already phosphorylated
//! residues (phospho-priming), `X` masks a position and `_` marks a
//! truncation.
use super::family::SequenceType;
use super::token::Token;
use crate::errors::SequenceError;
use std::fmt::Display;

const ALLOWED_RESIDUES: &[u8] = b"PGACSTVILMFYWHKRQNDEstyX_";
const SKIPPED_RESIDUES: &[u8] = b"X_";
const MIN_SEQUENCE_LENGTH: usize = 3;

fn is_allowed_residue(c: char) -> bool {
    c.is_ascii() && ALLOWED_RESIDUES.contains(&(c as u8))
}

fn is_acceptor(c: char) -> bool {
    matches!(c.to_ascii_uppercase(), 'S' | 'T' | 'Y')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    Asterisk,
    Ph,
}

impl Separator {
    /// Recognized markers, in the order they are looked for.
    pub const ALL: [Separator; 2] = [Separator::Asterisk, Separator::Ph];

    pub const fn marker(&self) -> &'static str {
        match self {
            Self::Asterisk => "*",
            Self::Ph => "(ph)",
        }
    }
}

impl Display for Separator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.marker())
    }
}

/// A single phospho-acceptor in its sequence context, with markers removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhosphoSite {
    residues: String,
    acceptor: usize,
}

impl PhosphoSite {
    fn new(residues: String, acceptor: usize) -> Self {
        debug_assert!(acceptor < residues.len());
        Self { residues, acceptor }
    }

    pub fn residues(&self) -> &str {
        &self.residues
    }

    pub fn acceptor_index(&self) -> usize {
        self.acceptor
    }

    pub fn acceptor(&self) -> char {
        self.residues.as_bytes()[self.acceptor] as char
    }

    /// N-terminal and C-terminal flanks, acceptor excluded.
    pub fn split(&self) -> (&str, &str) {
        (
            &self.residues[..self.acceptor],
            &self.residues[self.acceptor + 1..],
        )
    }

    /// PSSM columns needed to score this site within the family window.
    ///
    /// Masked (`X`) and truncated (`_`) positions are skipped but still
    /// count towards the position numbering. Without phospho-priming the
    /// residues are upper-cased, so primed residues score as their
    /// unmodified counterpart.
    ///
    /// The output is sorted by position.
    pub fn get_columns(&self, family: SequenceType, phospho_priming: bool) -> Vec<Token> {
        let (n_term, c_term) = self.split();
        let to_token = |position: i8, residue: u8| {
            let residue = if phospho_priming {
                residue
            } else {
                residue.to_ascii_uppercase()
            };
            Token::new(position, residue as char)
        };

        let n_span = family.min_position().unsigned_abs() as usize;
        let c_span = family.max_position() as usize;
        let mut columns = Vec::with_capacity(n_span + c_span);

        for (offset, residue) in n_term.bytes().rev().enumerate().take(n_span) {
            if SKIPPED_RESIDUES.contains(&residue) {
                continue;
            }
            columns.push(to_token(-(offset as i8 + 1), residue));
        }
        for (offset, residue) in c_term.bytes().enumerate().take(c_span) {
            if SKIPPED_RESIDUES.contains(&residue) {
                continue;
            }
            columns.push(to_token(offset as i8 + 1, residue));
        }

        columns.sort_by_key(|x| x.position());
        columns
    }

    /// Acceptor favorability column (`0S` or `0T`), if the acceptor has one.
    pub fn favorability_column(&self) -> Option<Token> {
        match self.acceptor().to_ascii_uppercase() {
            'S' => Some(Token::new(0, 'S')),
            'T' => Some(Token::new(0, 'T')),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CentralSequence {
    sequence: String,
    sequence_type: SequenceType,
}

impl CentralSequence {
    pub fn as_str(&self) -> &str {
        &self.sequence
    }

    pub fn sequence_type(&self) -> SequenceType {
        self.sequence_type
    }

    fn middle(&self) -> usize {
        self.sequence.len() / 2
    }

    pub fn validate(&self) -> Result<(), SequenceError> {
        let invalid = |reason| SequenceError::InvalidSequence {
            sequence: self.sequence.clone(),
            reason,
        };
        if !self.sequence.chars().all(is_allowed_residue) {
            return Err(invalid("contains characters outside the allowed alphabet"));
        }
        if !is_acceptor(self.sequence.as_bytes()[self.middle()] as char) {
            return Err(invalid("central residue is not S, T or Y"));
        }
        Ok(())
    }

    pub fn get_split_sequence(&self) -> (&str, &str) {
        let middle = self.middle();
        (&self.sequence[..middle], &self.sequence[middle + 1..])
    }

    pub fn site(&self) -> PhosphoSite {
        PhosphoSite::new(self.sequence.clone(), self.middle())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeparatorSequence {
    sequence: String,
    separator: Separator,
    sequence_type: SequenceType,
    candidates: Vec<String>,
}

impl SeparatorSequence {
    pub fn as_str(&self) -> &str {
        &self.sequence
    }

    pub fn separator(&self) -> Separator {
        self.separator
    }

    pub fn sequence_type(&self) -> SequenceType {
        self.sequence_type
    }

    /// Single-marker candidates produced by [`SeparatorSequence::preprocess`].
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Expands a k-marker sequence into its valid single-marker candidates.
    ///
    /// Every marked residue is lower-cased (it is phosphorylated), then each
    /// candidate keeps exactly one of the markers. So `GRNS*LPs*PVQA` yields
    /// `GRNs*LPsPVQA` and `GRNsLPs*PVQA`.
    pub fn preprocess(&mut self) -> Result<(), SequenceError> {
        let marker = self.separator.marker();
        let fragments: Vec<String> = {
            let raw: Vec<&str> = self.sequence.split(marker).collect();
            let last = raw.len() - 1;
            raw.iter()
                .enumerate()
                .map(|(i, fragment)| match fragment.char_indices().last() {
                    Some((idx, _)) if i != last => {
                        let (head, tail) = fragment.split_at(idx);
                        format!("{}{}", head, tail.to_ascii_lowercase())
                    }
                    _ => fragment.to_string(),
                })
                .collect()
        };

        let num_markers = fragments.len() - 1;
        let mut candidates = Vec::with_capacity(num_markers);
        for kept in 0..num_markers {
            // Empty neighbours mean two markers were adjacent in the input.
            // The last fragment is empty for a C-terminal acceptor.
            let right_adjacent = kept + 1 < num_markers && fragments[kept + 1].is_empty();
            if fragments[kept].is_empty() || right_adjacent {
                continue;
            }
            let mut candidate = String::with_capacity(self.sequence.len());
            for (i, fragment) in fragments.iter().enumerate() {
                candidate.push_str(fragment);
                if i == kept {
                    candidate.push_str(marker);
                }
            }
            if is_separator_candidate_valid(&candidate, self.separator) {
                candidates.push(candidate);
            }
        }

        self.candidates = candidates;
        self.validate()
    }

    pub fn validate(&self) -> Result<(), SequenceError> {
        if self.candidates.is_empty() {
            return Err(SequenceError::InvalidSequence {
                sequence: self.sequence.clone(),
                reason: "no valid phosphorylation site",
            });
        }
        Ok(())
    }

    /// Flanks around the first marked acceptor.
    pub fn get_split_sequence(&self) -> Option<(&str, &str)> {
        let marker = self.separator.marker();
        let pos = self.sequence.find(marker)?;
        if pos == 0 {
            return None;
        }
        Some((
            &self.sequence[..pos - 1],
            &self.sequence[pos + marker.len()..],
        ))
    }

    pub fn sites(&self) -> Vec<PhosphoSite> {
        let marker = self.separator.marker();
        self.candidates
            .iter()
            .filter_map(|candidate| {
                let pos = candidate.find(marker)?;
                let mut residues = String::with_capacity(candidate.len());
                residues.push_str(&candidate[..pos]);
                residues.push_str(&candidate[pos + marker.len()..]);
                Some(PhosphoSite::new(residues, pos - 1))
            })
            .collect()
    }
}

/// Validity of a single-marker candidate.
fn is_separator_candidate_valid(candidate: &str, separator: Separator) -> bool {
    let marker = separator.marker();
    if candidate.contains(&marker.repeat(2)) {
        return false;
    }
    let Some(pos) = candidate.find(marker) else {
        return false;
    };
    if pos == 0 || !is_acceptor(candidate.as_bytes()[pos - 1] as char) {
        return false;
    }
    candidate
        .split(marker)
        .all(|fragment| fragment.chars().all(is_allowed_residue))
}

/// A classified phosphosite sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sequence {
    Central(CentralSequence),
    Separator(SeparatorSequence),
}

impl Sequence {
    /// Decides the representation of a raw string, without validating it.
    ///
    /// A marker only counts when it follows at least one residue.
    pub fn classify(raw: &str) -> Result<Self, SequenceError> {
        for separator in Separator::ALL {
            if let Some(position) = raw.find(separator.marker()) {
                if position == 0 {
                    continue;
                }
                let residue = raw[..position].chars().last().unwrap_or('?');
                let sequence_type = SequenceType::from_acceptor(residue)?;
                return Ok(Self::Separator(SeparatorSequence {
                    sequence: raw.to_string(),
                    separator,
                    sequence_type,
                    candidates: Vec::new(),
                }));
            }
        }

        if raw.len() % 2 == 1 && raw.is_ascii() {
            let middle = raw.as_bytes()[raw.len() / 2] as char;
            let sequence_type = SequenceType::from_acceptor(middle).map_err(|_| {
                SequenceError::InvalidSequence {
                    sequence: raw.to_string(),
                    reason: "central residue is not S, T or Y",
                }
            })?;
            return Ok(Self::Central(CentralSequence {
                sequence: raw.to_string(),
                sequence_type,
            }));
        }

        Err(SequenceError::UnsupportedSequenceFormat {
            sequence: raw.to_string(),
        })
    }

    /// Classifies, preprocesses and validates a raw phosphosite string.
    ///
    /// Without phospho-priming every residue is upper-cased first, so primed
    /// residues in the input are scored as plain residues.
    pub fn parse(raw: &str, phospho_priming: bool) -> Result<Self, SequenceError> {
        let raw = raw.trim();
        if raw.len() < MIN_SEQUENCE_LENGTH {
            return Err(SequenceError::InvalidSequence {
                sequence: raw.to_string(),
                reason: "sequence is too short",
            });
        }
        let normalized = if phospho_priming {
            raw.to_string()
        } else {
            raw.to_ascii_uppercase()
                .replace("(PH)", Separator::Ph.marker())
        };

        let mut sequence = Self::classify(&normalized)?;
        sequence.preprocess()?;
        sequence.validate()?;
        Ok(sequence)
    }

    pub fn preprocess(&mut self) -> Result<(), SequenceError> {
        match self {
            Self::Central(_) => Ok(()),
            Self::Separator(x) => x.preprocess(),
        }
    }

    pub fn validate(&self) -> Result<(), SequenceError> {
        match self {
            Self::Central(x) => x.validate(),
            Self::Separator(x) => x.validate(),
        }
    }

    pub fn sequence_type(&self) -> SequenceType {
        match self {
            Self::Central(x) => x.sequence_type(),
            Self::Separator(x) => x.sequence_type(),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Central(x) => x.as_str(),
            Self::Separator(x) => x.as_str(),
        }
    }

    /// Candidate acceptor sites, one per surviving marker (or the single
    /// central site).
    pub fn sites(&self) -> Vec<PhosphoSite> {
        match self {
            Self::Central(x) => vec![x.site()],
            Self::Separator(x) => x.sites(),
        }
    }
}

impl Display for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(site: &PhosphoSite, family: SequenceType, priming: bool) -> Vec<String> {
        site.get_columns(family, priming)
            .iter()
            .map(|x| x.to_string())
            .collect()
    }

    #[test]
    fn test_classify_central() {
        for seq in ["APQTPQP", "APQSPQP"] {
            let parsed = Sequence::classify(seq).unwrap();
            assert!(matches!(parsed, Sequence::Central(_)));
            assert_eq!(parsed.sequence_type(), SequenceType::SerThr);
        }
        let parsed = Sequence::classify("APQYPQP").unwrap();
        assert_eq!(parsed.sequence_type(), SequenceType::Tyr);
    }

    #[test]
    fn test_classify_separator() {
        for seq in ["APQST*PA", "APQST(ph)PA"] {
            let parsed = Sequence::classify(seq).unwrap();
            assert!(matches!(parsed, Sequence::Separator(_)));
            assert_eq!(parsed.sequence_type(), SequenceType::SerThr);
        }
        let Sequence::Separator(parsed) = Sequence::classify("APQST(ph)PA").unwrap() else {
            panic!("Expected a separator sequence");
        };
        assert_eq!(parsed.separator(), Separator::Ph);
    }

    #[test]
    fn test_classify_errors() {
        assert!(matches!(
            Sequence::classify("APQZP*QP"),
            Err(SequenceError::UnsupportedSequenceType { residue: 'Z' })
        ));
        assert!(matches!(
            Sequence::classify("APQZP(ph)QP"),
            Err(SequenceError::UnsupportedSequenceType { .. })
        ));
        assert!(matches!(
            Sequence::classify("APQZPQP"),
            Err(SequenceError::InvalidSequence { .. })
        ));
        assert!(matches!(
            Sequence::classify("GRNSLPVQ"),
            Err(SequenceError::UnsupportedSequenceFormat { .. })
        ));
    }

    #[test]
    fn test_leading_marker_is_not_a_separator() {
        let parsed = Sequence::classify("*APQSPQP").unwrap_err();
        assert!(matches!(
            parsed,
            SequenceError::UnsupportedSequenceFormat { .. }
        ));
        // Falls through to the central representation, which rejects the '*'.
        let parsed = Sequence::classify("*APSPQA").unwrap();
        assert!(matches!(parsed, Sequence::Central(_)));
        assert!(matches!(
            Sequence::parse("*APSPQA", false),
            Err(SequenceError::InvalidSequence { .. })
        ));
    }

    #[test]
    fn test_central_validation() {
        let seq = Sequence::classify("APQATPQPA").unwrap();
        // Middle residue is T
        assert!(seq.validate().is_ok());

        let seq = Sequence::classify("APQBPQP").unwrap_err();
        assert!(matches!(seq, SequenceError::InvalidSequence { .. }));

        let seq = Sequence::classify("APQSBPQ").unwrap();
        assert!(seq.validate().is_err());

        let seq = Sequence::classify("APQSTPQ#A").unwrap();
        assert!(seq.validate().is_err());
    }

    #[test]
    fn test_central_split_and_columns() {
        let Sequence::Central(seq) = Sequence::classify("APQATPQPA").unwrap() else {
            panic!("Expected a central sequence");
        };
        assert_eq!(seq.get_split_sequence(), ("APQA", "PQPA"));
        assert_eq!(
            columns(&seq.site(), SequenceType::SerThr, false),
            vec!["-4A", "-3P", "-2Q", "-1A", "1P", "2Q", "3P", "4A"]
        );
    }

    #[test]
    fn test_separator_preprocess_single_marker() {
        let mut seq = Sequence::classify("SGLAAS*AAQQQ").unwrap();
        seq.preprocess().unwrap();
        let Sequence::Separator(sep) = &seq else {
            panic!("Expected a separator sequence");
        };
        assert_eq!(sep.candidates(), &["SGLAAs*AAQQQ".to_string()]);
        assert_eq!(sep.get_split_sequence(), Some(("SGLAA", "AAQQQ")));

        let sites = seq.sites();
        assert_eq!(sites.len(), 1);
        assert_eq!(
            columns(&sites[0], SequenceType::SerThr, false),
            vec!["-5S", "-4G", "-3L", "-2A", "-1A", "1A", "2A", "3Q", "4Q"]
        );
    }

    #[test]
    fn test_separator_preprocess_multiple_markers() {
        let seq = Sequence::parse("GRNS*LPs*PVQA", true).unwrap();
        let Sequence::Separator(sep) = &seq else {
            panic!("Expected a separator sequence");
        };
        assert_eq!(
            sep.candidates(),
            &["GRNs*LPsPVQA".to_string(), "GRNsLPs*PVQA".to_string()]
        );

        let sites = seq.sites();
        assert_eq!(sites[0].acceptor(), 's');
        assert_eq!(
            columns(&sites[0], SequenceType::SerThr, true),
            vec!["-3G", "-2R", "-1N", "1L", "2P", "3s", "4P"]
        );
        assert_eq!(
            columns(&sites[1], SequenceType::SerThr, true),
            vec!["-5R", "-4N", "-3s", "-2L", "-1P", "1P", "2V", "3Q", "4A"]
        );
        // Without priming the context residues are plain
        assert_eq!(
            columns(&sites[1], SequenceType::SerThr, false),
            vec!["-5R", "-4N", "-3S", "-2L", "-1P", "1P", "2V", "3Q", "4A"]
        );
    }

    #[test]
    fn test_separator_drops_invalid_candidates() {
        // The doubled marker only invalidates the candidates next to it
        let seq = Sequence::parse("GRNS*LPT**PVQA", false).unwrap();
        assert_eq!(seq.sites().len(), 1);
        assert_eq!(seq.sites()[0].residues(), "GRNsLPtPVQA");

        // A marker after an alanine leaves a lower-case 'a' in every candidate
        assert!(matches!(
            Sequence::parse("GRNS*LPA*PVQA", false),
            Err(SequenceError::InvalidSequence { .. })
        ));

        // Adjacent markers invalidate both neighbouring candidates
        assert!(matches!(
            Sequence::parse("APQS**TPQPA", false),
            Err(SequenceError::InvalidSequence { .. })
        ));
        assert!(matches!(
            Sequence::parse("APQS*#PQPA", false),
            Err(SequenceError::InvalidSequence { .. })
        ));
    }

    #[test]
    fn test_single_marker_end_to_end() {
        let seq = Sequence::parse("GRNS*PVQA", false).unwrap();
        assert_eq!(seq.sites().len(), 1);
        assert_eq!(seq.sequence_type(), SequenceType::SerThr);
    }

    #[test]
    fn test_c_terminal_marker() {
        let seq = Sequence::parse("GRNSLPVQAS*", false).unwrap();
        let sites = seq.sites();
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].acceptor(), 's');
        assert_eq!(sites[0].split(), ("GRNSLPVQA", ""));
        assert_eq!(
            columns(&sites[0], SequenceType::SerThr, false),
            vec!["-5L", "-4P", "-3V", "-2Q", "-1A"]
        );

        let seq = Sequence::parse("APQSPQA_S*", false).unwrap();
        assert_eq!(
            columns(&seq.sites()[0], SequenceType::SerThr, false),
            vec!["-5S", "-4P", "-3Q", "-2A"]
        );

        // A doubled marker at the end is still adjacent
        assert!(matches!(
            Sequence::parse("GRNSLPVQAS**", false),
            Err(SequenceError::InvalidSequence { .. })
        ));
        let seq = Sequence::parse("GRNS*LPVQAS*", false).unwrap();
        assert_eq!(seq.sites().len(), 2);
    }

    #[test]
    fn test_ph_marker_survives_case_folding() {
        let seq = Sequence::parse("grnsLs(ph)pvqa", false).unwrap();
        assert!(matches!(seq, Sequence::Separator(_)));
        assert_eq!(seq.sites()[0].residues(), "GRNSLsPVQA");
    }

    #[test]
    fn test_short_sequence_rejected() {
        assert!(matches!(
            Sequence::parse("S*", false),
            Err(SequenceError::InvalidSequence { .. })
        ));
    }

    #[test]
    fn test_masked_positions_keep_numbering() {
        let seq = Sequence::parse("AX_GSPX_QA", false);
        assert!(seq.is_err());

        let seq = Sequence::parse("AX_GS*PX_QA", false).unwrap();
        assert_eq!(
            columns(&seq.sites()[0], SequenceType::SerThr, false),
            vec!["-4A", "-1G", "1P", "4Q"]
        );
    }

    #[test]
    fn test_window_limits() {
        let seq = Sequence::parse("AAAAAAAAY*PPPPPPPP", false).unwrap();
        let site = &seq.sites()[0];
        let tyr = site.get_columns(SequenceType::Tyr, false);
        assert_eq!(tyr.first().unwrap().position(), -5);
        assert_eq!(tyr.last().unwrap().position(), 5);
        let ser_thr = site.get_columns(SequenceType::SerThr, false);
        assert_eq!(ser_thr.last().unwrap().position(), 4);
        assert!(site.favorability_column().is_none());
    }
}
