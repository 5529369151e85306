mod common;

use kinex::enrichment::Direction;
use kinex::errors::ScoringError;
use kinex::{
    AggregationMethod,
    EnrichmentOptions,
    InputSite,
    KinexError,
    ScoringOptions,
    SequenceType,
};

fn experiment() -> Vec<InputSite> {
    vec![
        InputSite::new("EGRNSLS*PVQATQ", 2.0),
        InputSite::new("RRHRNLS*STTDDE", 1.5),
        InputSite::new("GRNSLPVQ", 3.0),
        InputSite::new("LQVKIPS*KEEEAD", -2.0),
        InputSite::new("AKRRRLS(ub)*SLRAS", -1.5),
        InputSite::new("XX", 0.0),
        InputSite::new("SPRRAS*PLSQSE", 0.1),
        InputSite::new("VPEMPGEt*PPLSP", -0.3),
        InputSite::new("GRNS*PVQA", f64::NAN),
        InputSite::new("AAAAAY*AAAAA", 1.7),
        InputSite::new("DDEEEYEEPVA", -0.2),
        InputSite::new("GRNSLSPVQAT", 1.4999),
    ]
}

#[test]
fn test_enrichment_end_to_end() {
    let kinex = common::engine();
    let options = EnrichmentOptions::default();
    let results = kinex.enrich(&experiment(), &options).unwrap();

    assert_eq!(
        results.failed_sites,
        vec![
            "GRNSLPVQ".to_string(),
            "XX".to_string(),
            "GRNS*PVQA".to_string()
        ]
    );

    let labels: Vec<&str> = results.sites.iter().map(|x| x.label()).collect();
    assert_eq!(labels, vec![
        "upregulated",
        "upregulated",
        "failed",
        "downregulated",
        "downregulated",
        "failed",
        "unregulated",
        "unregulated",
        "failed",
        "upregulated",
        "unregulated",
        "unregulated",
    ]);
    assert_eq!(results.sites[4].sequence, "AKRRRLS*SLRAS");
    assert_eq!(results.sites[9].family, Some(SequenceType::Tyr));

    let ser_thr = &results.ser_thr;
    assert_eq!(ser_thr.family, SequenceType::SerThr);
    assert_eq!(ser_thr.len(), common::NUM_SER_THR_KINASES);
    assert_eq!(ser_thr.total_upregulated, 2);
    assert_eq!(ser_thr.total_downregulated, 2);
    assert_eq!(ser_thr.total_unregulated, 3.0);

    let tyr = results.table(SequenceType::Tyr);
    assert_eq!(tyr.len(), common::NUM_TYR_KINASES);
    assert_eq!(tyr.total_upregulated, 1);
    assert_eq!(tyr.total_downregulated, 0);
    assert_eq!(tyr.total_unregulated, 1.0);
}

#[test]
fn test_hit_counts_follow_top_n() {
    let kinex = common::engine();
    let options = EnrichmentOptions::default();
    let results = kinex.enrich(&experiment(), &options).unwrap();

    let top_n = options.top_n as u64;
    let ser_thr = &results.ser_thr;
    let up: u64 = ser_thr.rows.iter().map(|x| x.upregulated).sum();
    let down: u64 = ser_thr.rows.iter().map(|x| x.downregulated).sum();
    assert_eq!(up, top_n * ser_thr.total_upregulated);
    assert_eq!(down, top_n * ser_thr.total_downregulated);

    // Fewer Tyr kinases than top_n: every kinase is a hit.
    let tyr = &results.tyr;
    assert!(tyr.rows.iter().all(|x| x.upregulated == 1));
    assert!(tyr.rows.iter().all(|x| x.downregulated == 0));
}

#[test]
fn test_enrichment_rows_are_consistent() {
    let kinex = common::engine();
    let results = kinex
        .enrich(&experiment(), &EnrichmentOptions::default())
        .unwrap();

    for table in [&results.ser_thr, &results.tyr] {
        let kinases: Vec<&str> = table.kinases().collect();
        let mut sorted = kinases.clone();
        sorted.sort();
        assert_eq!(kinases, sorted);

        for row in &table.rows {
            assert!(row.upregulated <= table.total_upregulated);
            assert!(row.downregulated <= table.total_downregulated);
            for p in [
                row.upregulated_p_value,
                row.downregulated_p_value,
                row.upregulated_adjusted_p_value,
                row.downregulated_adjusted_p_value,
            ] {
                assert!((0.0..=1.0).contains(&p));
            }
            assert!(row.upregulated_adjusted_p_value >= row.upregulated_p_value - 1e-12);
            assert!(row.downregulated_adjusted_p_value >= row.downregulated_p_value - 1e-12);
            assert!(row.upregulated_enrichment_value_log2 >= 0.0);
            assert!(row.downregulated_enrichment_value_log2 <= 0.0);

            if row.upregulated_enrichment_value > row.downregulated_enrichment_value {
                assert_eq!(row.dominant_direction, Direction::Upregulated);
                assert_eq!(
                    row.dominant_enrichment_value_log2,
                    row.upregulated_enrichment_value_log2
                );
            } else {
                assert_eq!(row.dominant_direction, Direction::Downregulated);
                assert_eq!(
                    row.dominant_enrichment_value_log2,
                    row.downregulated_enrichment_value_log2
                );
            }
        }
    }
}

#[test]
fn test_enrichment_ignores_input_order() {
    let kinex = common::engine();
    let options = EnrichmentOptions::default();
    let sites = experiment();
    let mut reversed = sites.clone();
    reversed.reverse();

    let forward = kinex.enrich(&sites, &options).unwrap();
    let backward = kinex.enrich(&reversed, &options).unwrap();
    assert_eq!(forward.ser_thr, backward.ser_thr);
    assert_eq!(forward.tyr, backward.tyr);

    let mut failed = backward.failed_sites.clone();
    failed.reverse();
    assert_eq!(forward.failed_sites, failed);
}

#[test]
fn test_no_unregulated_sites_uses_adjusted_background() {
    let kinex = common::engine();
    let sites = vec![
        InputSite::new("EGRNSLS*PVQATQ", 2.0),
        InputSite::new("RRHRNLS*STTDDE", 3.0),
        InputSite::new("LQVKIPS*KEEEAD", -2.0),
        InputSite::new("SPRRAS*PLSQSE", -4.0),
    ];
    let results = kinex
        .enrich(&sites, &EnrichmentOptions::default())
        .unwrap();
    assert_eq!(results.ser_thr.total_unregulated, 1.0);
    // Counted kinases never have an empty background cell.
    assert!(
        results
            .ser_thr
            .rows
            .iter()
            .filter(|x| x.upregulated + x.downregulated > 0)
            .all(|x| x.unregulated == 1)
    );
}

#[test]
fn test_enrichment_rejects_bad_options() {
    let kinex = common::engine();
    let sites = experiment();

    let keep_all = EnrichmentOptions {
        scoring: ScoringOptions {
            method: AggregationMethod::All,
            ..Default::default()
        },
        ..Default::default()
    };
    assert!(matches!(
        kinex.enrich(&sites, &keep_all),
        Err(KinexError::Scoring(ScoringError::UnsupportedMethod { .. }))
    ));

    let negative = EnrichmentOptions {
        fc_threshold: -1.0,
        ..Default::default()
    };
    assert!(matches!(
        kinex.enrich(&sites, &negative),
        Err(KinexError::Options { .. })
    ));
}

#[test]
fn test_empty_experiment() {
    let kinex = common::engine();
    let results = kinex.enrich(&[], &EnrichmentOptions::default()).unwrap();
    assert!(results.failed_sites.is_empty());
    assert!(results.sites.is_empty());
    assert_eq!(results.ser_thr.len(), common::NUM_SER_THR_KINASES);
    assert!(
        results
            .ser_thr
            .rows
            .iter()
            .all(|x| x.upregulated_p_value == 1.0 && x.upregulated == 0)
    );
}

#[test]
fn test_c_terminal_sites_are_scored() {
    let kinex = common::engine();
    let sites = vec![
        InputSite::new("GRNSLPVQAS*", 2.0),
        InputSite::new("APQSPQA_S*", -2.0),
    ];
    let results = kinex.enrich(&sites, &EnrichmentOptions::default()).unwrap();
    assert!(results.failed_sites.is_empty());
    let labels: Vec<&str> = results.sites.iter().map(|x| x.label()).collect();
    assert_eq!(labels, vec!["upregulated", "downregulated"]);
    assert_eq!(results.ser_thr.total_upregulated, 1);
    assert_eq!(results.ser_thr.total_downregulated, 1);
}
