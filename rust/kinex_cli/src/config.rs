use kinex::{
    EnrichmentOptions,
    ResourcePaths,
    ScoringOptions,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::path::{
    Path,
    PathBuf,
};

use crate::cli::{
    EnrichArgs,
    ScoringFlags,
};
use crate::error::CliError;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub resources: ResourcePaths,
    #[serde(default)]
    pub scoring: ScoringOptions,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub fc_threshold: f64,
    pub top_n: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        let defaults = EnrichmentOptions::default();
        Self {
            fc_threshold: defaults.fc_threshold,
            top_n: defaults.top_n,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

impl ScoringFlags {
    /// Overrides the config values with the flags that were set.
    pub fn apply(&self, options: &mut ScoringOptions) {
        if let Some(method) = self.method {
            options.method = method.into();
        }
        options.favorability |= self.favorability;
        options.phospho_priming |= self.phospho_priming;
    }
}

impl Config {
    pub fn from_path(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, CliError> {
        let config: Self = serde_json::from_str(text)?;
        Ok(config)
    }

    pub fn scoring_options(&self, flags: &ScoringFlags) -> ScoringOptions {
        let mut options = self.scoring;
        flags.apply(&mut options);
        options
    }

    pub fn enrichment_options(&self, args: &EnrichArgs) -> EnrichmentOptions {
        EnrichmentOptions {
            fc_threshold: args.fc_threshold.unwrap_or(self.enrichment.fc_threshold),
            top_n: args.top_n.unwrap_or(self.enrichment.top_n),
            scoring: self.scoring_options(&args.scoring),
        }
    }

    pub fn output_directory(&self, args: &EnrichArgs) -> Result<PathBuf, CliError> {
        args.output_dir
            .clone()
            .or_else(|| self.output.as_ref().map(|x| x.directory.clone()))
            .ok_or_else(|| {
                CliError::Config(
                    "no output directory, set `output.directory` or pass --output-dir".to_string(),
                )
            })
    }
}
