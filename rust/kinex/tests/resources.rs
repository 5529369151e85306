mod common;

use kinex::data_sources::{
    read_input_sites,
    write_reference_matrix,
};
use kinex::errors::{
    KinexError,
    ResourceError,
    ScoringError,
};
use kinex::{
    EnrichmentOptions,
    Kinex,
    PssmTable,
    ReferenceDistribution,
    ResourcePaths,
    ScoringOptions,
    SequenceType,
};
use std::path::Path;

fn write_pssm(path: &Path, pssm: &PssmTable, delimiter: &str) {
    let mut text = String::from("kinase");
    for column in pssm.columns() {
        text.push_str(delimiter);
        text.push_str(&column.to_string());
    }
    text.push('\n');
    for (i, kinase) in pssm.kinases().iter().enumerate() {
        text.push_str(kinase);
        for weight in pssm.row(i) {
            text.push_str(delimiter);
            text.push_str(&weight.to_string());
        }
        text.push('\n');
    }
    std::fs::write(path, text).unwrap();
}

#[test]
fn test_engine_from_resource_files() {
    let (pssm_ser_thr, reference_ser_thr, pssm_tyr, reference_tyr) = common::tables();
    let dir = tempfile::tempdir().unwrap();
    let paths = ResourcePaths {
        pssm_ser_thr: dir.path().join("pssm_ser_thr.csv"),
        pssm_tyr: dir.path().join("pssm_tyr.tsv"),
        reference_ser_thr: dir.path().join("reference_ser_thr.csv.zst"),
        reference_tyr: dir.path().join("reference_tyr.csv"),
    };
    write_pssm(&paths.pssm_ser_thr, &pssm_ser_thr, ",");
    write_pssm(&paths.pssm_tyr, &pssm_tyr, "\t");
    write_reference_matrix(&paths.reference_ser_thr, &reference_ser_thr).unwrap();
    write_reference_matrix(&paths.reference_tyr, &reference_tyr).unwrap();

    let from_files = Kinex::from_resource_paths(&paths).unwrap();
    let in_memory = Kinex::new(pssm_ser_thr, reference_ser_thr, pssm_tyr, reference_tyr).unwrap();

    let options = ScoringOptions::default();
    for sequence in ["EGRNSLS*PVQATQ", "DDEEEYEEPVA", "GRNS*LPT*PVQA"] {
        assert_eq!(
            from_files.score(sequence, &options).unwrap(),
            in_memory.score(sequence, &options).unwrap()
        );
    }
    assert_eq!(
        from_files.kinases(SequenceType::Tyr),
        in_memory.kinases(SequenceType::Tyr)
    );
}

#[test]
fn test_enrichment_from_sites_file() {
    let kinex = common::engine();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sites.tsv");
    std::fs::write(
        &path,
        "Sequence\tlog2FC\n\
         EGRNSLS*PVQATQ\t2.0\n\
         LQVKIPS*KEEEAD\t-2.0\n\
         SPRRAS*PLSQSE\tNA\n\
         GRNSLSPVQAT\t0.2\n",
    )
    .unwrap();

    let sites = read_input_sites(&path).unwrap();
    assert_eq!(sites.len(), 4);
    let results = kinex.enrich(&sites, &EnrichmentOptions::default()).unwrap();
    assert_eq!(results.failed_sites, vec!["SPRRAS*PLSQSE".to_string()]);
    assert_eq!(results.ser_thr.total_upregulated, 1);
    assert_eq!(results.ser_thr.total_downregulated, 1);
    assert_eq!(results.ser_thr.total_unregulated, 1.0);
}

#[test]
fn test_missing_reference_column_is_rejected() {
    let (pssm_ser_thr, _, pssm_tyr, reference_tyr) = common::tables();
    let partial = ReferenceDistribution::new(SequenceType::SerThr, vec![(
        "ST00".to_string(),
        vec![0.0, 1.0, 2.0],
    )])
    .unwrap();
    assert!(matches!(
        Kinex::new(pssm_ser_thr, partial, pssm_tyr, reference_tyr),
        Err(KinexError::Scoring(ScoringError::MissingReference { .. }))
    ));
}

#[test]
fn test_incomplete_pssm_is_rejected_at_construction() {
    for (family, column) in [
        (SequenceType::SerThr, "-1W"),
        (SequenceType::SerThr, "3s"),
        (SequenceType::SerThr, "0S"),
        (SequenceType::Tyr, "5P"),
    ] {
        let (mut pssm_ser_thr, reference_ser_thr, mut pssm_tyr, reference_tyr) = common::tables();
        match family {
            SequenceType::SerThr => pssm_ser_thr = common::without_column(&pssm_ser_thr, column),
            SequenceType::Tyr => pssm_tyr = common::without_column(&pssm_tyr, column),
        }
        let built = Kinex::new(pssm_ser_thr, reference_ser_thr, pssm_tyr, reference_tyr);
        assert!(
            matches!(
                built,
                Err(KinexError::Resource(ResourceError::MalformedPssm { .. }))
            ),
            "{} {}",
            family,
            column
        );
    }
}

#[test]
fn test_incomplete_pssm_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (pssm_ser_thr, reference_ser_thr, pssm_tyr, reference_tyr) = common::tables();
    let paths = ResourcePaths {
        pssm_ser_thr: dir.path().join("pssm_ser_thr.csv"),
        pssm_tyr: dir.path().join("pssm_tyr.csv"),
        reference_ser_thr: dir.path().join("reference_ser_thr.csv.gz"),
        reference_tyr: dir.path().join("reference_tyr.csv"),
    };
    write_pssm(
        &paths.pssm_ser_thr,
        &common::without_column(&pssm_ser_thr, "-1W"),
        ",",
    );
    write_pssm(&paths.pssm_tyr, &pssm_tyr, ",");
    write_reference_matrix(&paths.reference_ser_thr, &reference_ser_thr).unwrap();
    write_reference_matrix(&paths.reference_tyr, &reference_tyr).unwrap();

    let err = Kinex::from_resource_paths(&paths).unwrap_err();
    assert!(matches!(
        err,
        KinexError::Resource(ResourceError::MalformedPssm { .. })
    ));
    assert!(err.to_string().contains("-1W"));
}

#[test]
fn test_swapped_families_are_rejected() {
    let (pssm_ser_thr, reference_ser_thr, pssm_tyr, reference_tyr) = common::tables();
    assert!(matches!(
        Kinex::new(pssm_tyr, reference_tyr, pssm_ser_thr, reference_ser_thr),
        Err(KinexError::Resource(ResourceError::MalformedPssm { .. }))
    ));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ResourcePaths {
        pssm_ser_thr: dir.path().join("missing.csv"),
        pssm_tyr: dir.path().join("missing.csv"),
        reference_ser_thr: dir.path().join("missing.csv"),
        reference_tyr: dir.path().join("missing.csv"),
    };
    assert!(matches!(
        Kinex::from_resource_paths(&paths),
        Err(KinexError::Resource(ResourceError::Io { .. }))
    ));
}
