use crate::data_sources::{
    read_pssm_table,
    read_reference_matrix,
};
use crate::enrichment::accumulator::{
    EnrichmentAccumulator,
    SiteOutcome,
    SiteRegulation,
};
use crate::enrichment::{
    EnrichmentOptions,
    EnrichmentResults,
};
use crate::errors::{
    KinexError,
    ResourceError,
    Result,
    ScoringError,
};
use crate::matrices::{
    PssmTable,
    ReferenceDistribution,
};
use crate::models::{
    InputSite,
    Regulation,
    Sequence,
    SequenceType,
};
use crate::scoring::{
    ScoreResult,
    ScoringOptions,
    aggregate,
    rank,
    score_site,
};
use rayon::prelude::*;
use serde::{
    Deserialize,
    Serialize,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{
    debug,
    info,
    instrument,
};

/// Locations of the four tables the engine is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePaths {
    pub pssm_ser_thr: PathBuf,
    pub pssm_tyr: PathBuf,
    pub reference_ser_thr: PathBuf,
    pub reference_tyr: PathBuf,
}

#[derive(Debug, Clone)]
struct FamilyResources {
    pssm: Arc<PssmTable>,
    reference: Arc<ReferenceDistribution>,
}

impl FamilyResources {
    fn new(
        family: SequenceType,
        pssm: PssmTable,
        reference: ReferenceDistribution,
    ) -> Result<Self> {
        if pssm.family() != family {
            return Err(ResourceError::MalformedPssm {
                msg: format!("expected a {} table, got {}", family, pssm.family()),
            }
            .into());
        }
        pssm.check_coverage()?;
        if reference.family() != family {
            return Err(ResourceError::MalformedReference {
                msg: format!("expected a {} matrix, got {}", family, reference.family()),
            }
            .into());
        }
        if let Some(missing) = pssm.kinases().iter().find(|k| !reference.contains(k)) {
            return Err(ScoringError::MissingReference {
                kinase: missing.to_string(),
            }
            .into());
        }
        Ok(Self {
            pssm: Arc::new(pssm),
            reference: Arc::new(reference),
        })
    }
}

/// Kinase scoring and enrichment engine.
///
/// Holds the PSSM and reference distribution of both kinase families. All
/// of it is read-only after construction, so one engine can serve
/// concurrent calls; cloning is cheap.
#[derive(Debug, Clone)]
pub struct Kinex {
    ser_thr: FamilyResources,
    tyr: FamilyResources,
}

impl Kinex {
    /// Every PSSM kinase must have a reference distribution of the same
    /// family, and each PSSM must cover its family window for every residue.
    pub fn new(
        pssm_ser_thr: PssmTable,
        reference_ser_thr: ReferenceDistribution,
        pssm_tyr: PssmTable,
        reference_tyr: ReferenceDistribution,
    ) -> Result<Self> {
        Ok(Self {
            ser_thr: FamilyResources::new(SequenceType::SerThr, pssm_ser_thr, reference_ser_thr)?,
            tyr: FamilyResources::new(SequenceType::Tyr, pssm_tyr, reference_tyr)?,
        })
    }

    #[instrument(skip_all)]
    pub fn from_resource_paths(paths: &ResourcePaths) -> Result<Self> {
        let pssm_ser_thr = read_pssm_table(&paths.pssm_ser_thr, SequenceType::SerThr)?;
        let pssm_tyr = read_pssm_table(&paths.pssm_tyr, SequenceType::Tyr)?;
        let reference_ser_thr =
            read_reference_matrix(&paths.reference_ser_thr, SequenceType::SerThr)?;
        let reference_tyr = read_reference_matrix(&paths.reference_tyr, SequenceType::Tyr)?;
        Self::new(pssm_ser_thr, reference_ser_thr, pssm_tyr, reference_tyr)
    }

    fn resources(&self, family: SequenceType) -> &FamilyResources {
        match family {
            SequenceType::SerThr => &self.ser_thr,
            SequenceType::Tyr => &self.tyr,
        }
    }

    pub fn pssm(&self, family: SequenceType) -> &PssmTable {
        &self.resources(family).pssm
    }

    pub fn reference(&self, family: SequenceType) -> &ReferenceDistribution {
        &self.resources(family).reference
    }

    /// Every kinase of a family, in PSSM order.
    pub fn kinases(&self, family: SequenceType) -> &[Arc<str>] {
        self.pssm(family).kinases()
    }

    /// Ranks every kinase of the sequence's family for one phosphosite.
    ///
    /// ```no_run
    /// use kinex::{Kinex, ResourcePaths, ScoringOptions};
    ///
    /// let paths: ResourcePaths = serde_json::from_str(
    ///     r#"{
    ///         "pssm_ser_thr": "pssm_ser_thr.csv",
    ///         "pssm_tyr": "pssm_tyr.csv",
    ///         "reference_ser_thr": "reference_ser_thr.csv.zst",
    ///         "reference_tyr": "reference_tyr.csv.zst"
    ///     }"#,
    /// )
    /// .unwrap();
    /// let kinex = Kinex::from_resource_paths(&paths).unwrap();
    /// let result = kinex.score("EGRNSLS*PVQATQ", &ScoringOptions::default()).unwrap();
    /// for row in result.top(5)[0] {
    ///     println!("{} {:.2}", row.kinase, row.percentile);
    /// }
    /// ```
    pub fn score(&self, sequence: &str, options: &ScoringOptions) -> Result<ScoreResult> {
        let parsed = Sequence::parse(sequence, options.phospho_priming)?;
        let family = parsed.sequence_type();
        let resources = self.resources(family);

        let tables = parsed
            .sites()
            .iter()
            .map(|site| score_site(site, &resources.pssm, options))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let rankings = aggregate(tables, options.method)?
            .iter()
            .map(|table| rank(table, &resources.reference))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(ScoreResult {
            sequence: parsed.to_string(),
            family,
            rankings,
        })
    }

    fn site_outcome(
        &self,
        index: usize,
        input: &InputSite,
        options: &EnrichmentOptions,
    ) -> Result<SiteOutcome> {
        let sequence = input.cleaned_sequence();
        let failed = |sequence: String| SiteOutcome::Failed {
            index,
            site: SiteRegulation {
                sequence,
                log2_fold_change: input.log2_fold_change,
                family: None,
                regulation: None,
            },
        };

        let Some(regulation) =
            Regulation::from_fold_change(input.log2_fold_change, options.fc_threshold)
        else {
            debug!(
                "Site {} ({}) has no usable fold change: {}",
                index, sequence, input.log2_fold_change
            );
            return Ok(failed(sequence));
        };

        let result = match self.score(&sequence, &options.scoring) {
            Ok(x) => x,
            Err(e) if e.is_sequence_error() => {
                debug!("Site {} ({}) failed: {}", index, sequence, e);
                return Ok(failed(sequence));
            }
            Err(e) => return Err(e),
        };

        let top_kinases = result
            .rankings
            .first()
            .map(|x| {
                x.top(options.top_n)
                    .iter()
                    .map(|row| row.kinase.clone())
                    .collect()
            })
            .unwrap_or_default();

        Ok(SiteOutcome::Scored {
            index,
            site: SiteRegulation {
                sequence,
                log2_fold_change: input.log2_fold_change,
                family: Some(result.family),
                regulation: Some(regulation),
            },
            family: result.family,
            regulation,
            top_kinases,
        })
    }

    /// Kinase enrichment over a batch of experiment sites.
    ///
    /// Sites are scored in parallel. Rows whose sequence cannot be scored,
    /// or whose fold change is not finite, are listed in
    /// [`EnrichmentResults::failed_sites`] and left out of every count.
    #[instrument(skip_all, fields(num_sites = sites.len()))]
    pub fn enrich(
        &self,
        sites: &[InputSite],
        options: &EnrichmentOptions,
    ) -> Result<EnrichmentResults> {
        options.validate()?;

        let mut accumulator = sites
            .par_iter()
            .enumerate()
            .map(|(index, site)| self.site_outcome(index, site, options))
            .collect::<std::result::Result<EnrichmentAccumulator, KinexError>>()?;
        let (failed_sites, site_rows) = accumulator.take_sites();

        for counts in [&accumulator.ser_thr, &accumulator.tyr] {
            let totals = counts.totals();
            info!(
                "{}: {} upregulated, {} downregulated, {} unregulated sites",
                counts.family(),
                totals.upregulated,
                totals.downregulated,
                totals.unregulated
            );
        }
        if !failed_sites.is_empty() {
            info!("{} of {} sites failed", failed_sites.len(), sites.len());
        }

        let ser_thr = accumulator
            .ser_thr
            .adjust_background_sites()
            .fisher_statistics(self.kinases(SequenceType::SerThr))?;
        let tyr = accumulator
            .tyr
            .adjust_background_sites()
            .fisher_statistics(self.kinases(SequenceType::Tyr))?;

        Ok(EnrichmentResults {
            ser_thr,
            tyr,
            failed_sites,
            sites: site_rows,
        })
    }
}
