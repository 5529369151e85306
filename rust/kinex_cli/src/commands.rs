use indicatif::{
    ParallelProgressIterator,
    ProgressStyle,
};
use kinex::data_sources::{
    read_input_sites,
    read_pssm_table,
    write_reference_matrix,
};
use kinex::enrichment::{
    EnrichmentTable,
    SiteRegulation,
};
use kinex::{
    EnrichmentResults,
    Kinex,
    ReferenceDistribution,
    ScoreResult,
    ScoringOptions,
};
use rayon::prelude::*;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tabled::settings::Style;
use tabled::{
    Table,
    Tabled,
};
use tracing::{
    info,
    instrument,
    warn,
};

use crate::cli::{
    BuildReferenceArgs,
    EnrichArgs,
    OutputFormat,
    ScoreArgs,
    WriteTemplateArgs,
};
use crate::config::Config;
use crate::error::CliError;

#[derive(Tabled)]
struct RankRow {
    #[tabled(rename = "#")]
    rank: usize,
    kinase: String,
    #[tabled(rename = "score")]
    raw_score: String,
    #[tabled(rename = "log2 score")]
    log_score: String,
    percentile: String,
}

fn print_score_result(result: &ScoreResult, top: usize, promiscuity_limit: f64) {
    println!("{} ({})", result.sequence, result.family);
    let median = result.median_percentile();
    let promiscuity = result.promiscuity_index(promiscuity_limit);
    for (i, ranking) in result.rankings.iter().enumerate() {
        if result.rankings.len() > 1 {
            println!("Candidate site {}", i + 1);
        }
        let rows: Vec<RankRow> = ranking
            .top(top)
            .iter()
            .enumerate()
            .map(|(rank, x)| RankRow {
                rank: rank + 1,
                kinase: x.kinase.to_string(),
                raw_score: format!("{:.4}", x.raw_score),
                log_score: format!("{:.4}", x.log_score),
                percentile: format!("{:.2}", x.percentile),
            })
            .collect();
        println!("{}", Table::new(rows).with(Style::rounded()));
        println!(
            "Median percentile: {:.2}, promiscuity index (>{}): {}",
            median[i].unwrap_or(f64::NAN),
            promiscuity_limit,
            promiscuity[i]
        );
    }
}

/// Main function for the 'score' subcommand.
#[instrument(skip_all)]
pub fn main_score(args: ScoreArgs) -> Result<(), CliError> {
    let config = Config::from_path(&args.config)?;
    let options = config.scoring_options(&args.scoring);
    let kinex = Kinex::from_resource_paths(&config.resources)?;

    let mut results = Vec::with_capacity(args.sequences.len());
    for sequence in args.sequences.iter() {
        match kinex.score(sequence, &options) {
            Ok(result) => results.push(result),
            Err(e) if e.is_sequence_error() => warn!("Skipping {}: {}", sequence, e),
            Err(e) => return Err(e.into()),
        }
    }

    match args.format {
        OutputFormat::Table => {
            for result in results.iter() {
                print_score_result(result, args.top, args.promiscuity_limit);
            }
        }
        OutputFormat::Json => {
            let mut stdout = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &results)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct SiteRow<'a> {
    sequence: &'a str,
    log2_fold_change: f64,
    family: &'a str,
    regulation: &'a str,
}

impl<'a> From<&'a SiteRegulation> for SiteRow<'a> {
    fn from(value: &'a SiteRegulation) -> Self {
        Self {
            sequence: &value.sequence,
            log2_fold_change: value.log2_fold_change,
            family: value.family.map(|x| x.name()).unwrap_or_default(),
            regulation: value.label(),
        }
    }
}

fn write_enrichment_table(path: &Path, table: &EnrichmentTable) -> Result<(), CliError> {
    let mut wtr = csv::Writer::from_path(path)?;
    for row in table.rows.iter() {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_site_regulation(path: &Path, sites: &[SiteRegulation]) -> Result<(), CliError> {
    let mut wtr = csv::Writer::from_path(path)?;
    for site in sites.iter() {
        wtr.serialize(SiteRow::from(site))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes every enrichment output into `directory`.
pub fn write_enrichment_results(
    directory: &Path,
    results: &EnrichmentResults,
) -> Result<(), CliError> {
    std::fs::create_dir_all(directory)?;
    write_enrichment_table(&directory.join("ser_thr_enrichment.csv"), &results.ser_thr)?;
    write_enrichment_table(&directory.join("tyr_enrichment.csv"), &results.tyr)?;
    write_site_regulation(&directory.join("site_regulation.csv"), &results.sites)?;

    let mut failed = std::io::BufWriter::new(std::fs::File::create(
        directory.join("failed_sites.txt"),
    )?);
    for site in results.failed_sites.iter() {
        writeln!(failed, "{}", site)?;
    }
    failed.flush()?;
    Ok(())
}

/// Main function for the 'enrich' subcommand.
#[instrument(skip_all)]
pub fn main_enrich(args: EnrichArgs) -> Result<(), CliError> {
    let config = Config::from_path(&args.config)?;
    let options = config.enrichment_options(&args);
    let output_dir = config.output_directory(&args)?;
    info!("Using enrichment options: {:#?}", options);

    let kinex = Kinex::from_resource_paths(&config.resources)?;
    let sites = read_input_sites(&args.input)?;

    let start = Instant::now();
    let results = kinex.enrich(&sites, &options)?;
    info!(
        "Enrichment of {} sites took {:?}",
        sites.len(),
        start.elapsed()
    );

    write_enrichment_results(&output_dir, &results)?;
    println!(
        "Wrote enrichment results for {} sites ({} failed) to {}",
        sites.len(),
        results.failed_sites.len(),
        output_dir.display()
    );
    Ok(())
}

/// Known phosphosites, one per line. Blank lines and `#` comments are
/// ignored.
fn read_panel(path: &Path) -> Result<Vec<String>, CliError> {
    let text = std::fs::read_to_string(path)?;
    Ok(text
        .lines()
        .map(|x| x.trim())
        .filter(|x| !x.is_empty() && !x.starts_with('#'))
        .map(|x| x.to_string())
        .collect())
}

/// Main function for the 'build-reference' subcommand.
#[instrument(skip_all)]
pub fn main_build_reference(args: BuildReferenceArgs) -> Result<(), CliError> {
    let mut options = ScoringOptions::default();
    args.scoring.apply(&mut options);

    let pssm = read_pssm_table(&args.pssm, args.family.into())?;
    pssm.check_coverage()?;
    let panel = read_panel(&args.panel)?;
    info!("Scoring a panel of {} sites", panel.len());

    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
    )?;
    let (reference, skipped) = ReferenceDistribution::from_panel(
        &pssm,
        panel.par_iter().progress_with_style(style),
        &options,
    )?;
    if skipped > 0 {
        warn!("Skipped {} of {} panel sites", skipped, panel.len());
    }
    write_reference_matrix(&args.output, &reference)?;
    println!(
        "Wrote {} reference of {} kinases to {}",
        reference.family(),
        reference.kinases().len(),
        args.output.display()
    );
    Ok(())
}

pub const CONFIG_TEMPLATE: &str = r#"{
  "resources": {
    "pssm_ser_thr": "data/pssm_ser_thr.csv",
    "pssm_tyr": "data/pssm_tyr.csv",
    "reference_ser_thr": "data/reference_ser_thr.csv.zst",
    "reference_tyr": "data/reference_tyr.csv.zst"
  },
  "scoring": {
    "phospho_priming": false,
    "favorability": false,
    "method": "avg"
  },
  "enrichment": {
    "fc_threshold": 1.5,
    "top_n": 15
  },
  "output": {
    "directory": "kinex_results"
  }
}"#;

/// Main function for the 'write-template' subcommand.
pub fn main_write_template(args: WriteTemplateArgs) -> Result<(), CliError> {
    let target_dir = args.output_path;
    std::fs::create_dir_all(&target_dir)?;

    let config_path = target_dir.join("kinex_config.json");
    std::fs::write(&config_path, CONFIG_TEMPLATE)?;
    println!("Wrote config template to: {}", config_path.display());
    Ok(())
}
