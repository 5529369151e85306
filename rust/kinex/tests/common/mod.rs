#![allow(dead_code)]

use kinex::matrices::{
    PSSM_RESIDUES,
    PssmTable,
    ReferenceDistribution,
};
use kinex::models::{
    SequenceType,
    Token,
};
use kinex::{
    Kinex,
    ScoringOptions,
};

const UPPER_RESIDUES: &[u8] = b"PGACSTVILMFYWHKRQNDE";

pub const NUM_SER_THR_KINASES: usize = 20;
pub const NUM_TYR_KINASES: usize = 8;

/// PSSM with a column for every residue at every window position.
pub fn synthetic_pssm(family: SequenceType, num_kinases: usize, prefix: &str) -> PssmTable {
    let mut columns = Vec::new();
    for position in family.min_position()..=family.max_position() {
        if position == 0 {
            continue;
        }
        for residue in PSSM_RESIDUES.chars() {
            columns.push(Token::new(position, residue));
        }
    }
    if family.has_favorability() {
        columns.push(Token::new(0, 'S'));
        columns.push(Token::new(0, 'T'));
    }

    let rows = (0..num_kinases)
        .map(|k| {
            let weights = (0..columns.len())
                .map(|c| 0.5 + ((k * 7 + c * 13) % 17) as f64 / 10.0)
                .collect();
            (format!("{}{:02}", prefix, k), weights)
        })
        .collect();
    PssmTable::new(family, columns, rows).unwrap()
}

/// Copy of `pssm` without one column.
pub fn without_column(pssm: &PssmTable, column: &str) -> PssmTable {
    let dropped: Token = column.parse().unwrap();
    let kept: Vec<usize> = pssm
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, x)| **x != dropped)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(kept.len() + 1, pssm.columns().len());
    let columns = kept.iter().map(|&i| pssm.columns()[i]).collect();
    let rows = pssm
        .kinases()
        .iter()
        .enumerate()
        .map(|(k, name)| {
            let row = pssm.row(k);
            (name.to_string(), kept.iter().map(|&i| row[i]).collect())
        })
        .collect();
    PssmTable::new(pssm.family(), columns, rows).unwrap()
}

/// Deterministic central 11-mers with the family's acceptor in the middle.
pub fn panel(family: SequenceType, size: usize) -> Vec<String> {
    let mut state: u64 = 0x2545F4914F6CDD1D;
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 33) as usize
    };
    (0..size)
        .map(|i| {
            let acceptor = match family {
                SequenceType::SerThr if i % 2 == 0 => b'S',
                SequenceType::SerThr => b'T',
                SequenceType::Tyr => b'Y',
            };
            let residues: Vec<u8> = (0..11)
                .map(|j| {
                    if j == 5 {
                        acceptor
                    } else {
                        UPPER_RESIDUES[next() % UPPER_RESIDUES.len()]
                    }
                })
                .collect();
            String::from_utf8(residues).unwrap()
        })
        .collect()
}

pub fn tables() -> (PssmTable, ReferenceDistribution, PssmTable, ReferenceDistribution) {
    let options = ScoringOptions::default();
    let pssm_ser_thr = synthetic_pssm(SequenceType::SerThr, NUM_SER_THR_KINASES, "ST");
    let pssm_tyr = synthetic_pssm(SequenceType::Tyr, NUM_TYR_KINASES, "Y");
    let (reference_ser_thr, skipped) = ReferenceDistribution::from_panel(
        &pssm_ser_thr,
        &panel(SequenceType::SerThr, 400),
        &options,
    )
    .unwrap();
    assert_eq!(skipped, 0);
    let (reference_tyr, skipped) =
        ReferenceDistribution::from_panel(&pssm_tyr, &panel(SequenceType::Tyr, 200), &options)
            .unwrap();
    assert_eq!(skipped, 0);
    (pssm_ser_thr, reference_ser_thr, pssm_tyr, reference_tyr)
}

pub fn engine() -> Kinex {
    let (pssm_ser_thr, reference_ser_thr, pssm_tyr, reference_tyr) = tables();
    Kinex::new(pssm_ser_thr, reference_ser_thr, pssm_tyr, reference_tyr).unwrap()
}
