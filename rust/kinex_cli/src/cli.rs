use clap::{
    Parser,
    Subcommand,
};
use kinex::{
    AggregationMethod,
    SequenceType,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rank every kinase for one or more phosphosites.
    Score(ScoreArgs),
    /// Kinase enrichment over an experiment of regulated sites.
    Enrich(EnrichArgs),
    /// Build a reference matrix from a panel of known phosphosites.
    BuildReference(BuildReferenceArgs),
    /// Write a template configuration file.
    WriteTemplate(WriteTemplateArgs),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Method {
    Min,
    Max,
    #[default]
    Avg,
    All,
}

impl From<Method> for AggregationMethod {
    fn from(value: Method) -> Self {
        match value {
            Method::Min => AggregationMethod::Min,
            Method::Max => AggregationMethod::Max,
            Method::Avg => AggregationMethod::Avg,
            Method::All => AggregationMethod::All,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Family {
    SerThr,
    Tyr,
}

impl From<Family> for SequenceType {
    fn from(value: Family) -> Self {
        match value {
            Family::SerThr => SequenceType::SerThr,
            Family::Tyr => SequenceType::Tyr,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Scoring flags shared by `score` and `enrich`. Set flags win over the
/// config file.
#[derive(Parser, Debug, Clone, Default)]
pub struct ScoringFlags {
    /// Aggregation over candidate sites of multi-site sequences
    #[arg(short, long, value_enum)]
    pub method: Option<Method>,

    /// Multiply by the acceptor favorability (Ser/Thr only)
    #[arg(long)]
    pub favorability: bool,

    /// Score lower case s/t/y as phosphorylated residues
    #[arg(long)]
    pub phospho_priming: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ScoreArgs {
    /// Path to the JSON configuration file
    #[arg(short, long)]
    pub config: PathBuf,

    /// Phosphosites to score, e.g. EGRNSLS*PVQATQ
    #[arg(required = true)]
    pub sequences: Vec<String>,

    #[command(flatten)]
    pub scoring: ScoringFlags,

    /// Number of kinases to print per site
    #[arg(short, long, default_value_t = 15)]
    pub top: usize,

    /// Percentile above which a kinase counts towards the promiscuity index
    #[arg(long, default_value_t = 90.0)]
    pub promiscuity_limit: f64,

    /// The format to use for the output
    #[arg(short, long, default_value_t, value_enum)]
    pub format: OutputFormat,
}

#[derive(Parser, Debug, Clone)]
pub struct EnrichArgs {
    /// Path to the JSON configuration file
    #[arg(short, long)]
    pub config: PathBuf,

    /// Sites table (sequence, log2 fold change), csv or tsv
    #[arg(short, long)]
    pub input: PathBuf,

    /// Path to the output directory (will over-write the config file)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Absolute log2 fold change marking a site as regulated
    #[arg(long)]
    pub fc_threshold: Option<f64>,

    /// Number of top ranked kinases counted per site
    #[arg(long)]
    pub top_n: Option<usize>,

    #[command(flatten)]
    pub scoring: ScoringFlags,
}

#[derive(Parser, Debug, Clone)]
pub struct BuildReferenceArgs {
    /// PSSM table to score the panel with
    #[arg(short, long)]
    pub pssm: PathBuf,

    /// Kinase family of the PSSM
    #[arg(short, long, value_enum)]
    pub family: Family,

    /// Panel of known phosphosites, one sequence per line
    #[arg(short = 'i', long)]
    pub panel: PathBuf,

    /// Reference matrix to write (compressed if it ends in .zst or .gz)
    #[arg(short, long)]
    pub output: PathBuf,

    #[command(flatten)]
    pub scoring: ScoringFlags,
}

#[derive(Parser, Debug)]
pub struct WriteTemplateArgs {
    /// The path to the output directory.
    #[arg(short, long)]
    pub output_path: PathBuf,
}
