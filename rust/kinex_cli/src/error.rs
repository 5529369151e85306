use kinex::KinexError;
use kinex::errors::ResourceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Kinex(#[from] KinexError),

    #[error("Progress bar template error: {0}")]
    Template(#[from] indicatif::style::TemplateError),

    #[error("Unable to set up logging: {0}")]
    Logging(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("Error interpreting the config: {0}")]
    Config(String),
}

impl From<ResourceError> for CliError {
    fn from(e: ResourceError) -> Self {
        CliError::Kinex(e.into())
    }
}
