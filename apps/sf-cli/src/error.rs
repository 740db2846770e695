//! CLI error type.

pub type CliResult<T> = Result<T, CliError>;

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("Project error: {0}")]
    Project(#[from] sf_project::ProjectError),

    #[error("Results error: {0}")]
    Results(#[from] sf_results::ResultsError),

    #[error("Run error: {0}")]
    Sim(#[from] sf_sim::SimError),

    #[error("Archive error: {0}")]
    Archive(#[from] sf_archive::ArchiveError),

    #[error("Refusing to overwrite {path} (use --force)")]
    Exists { path: String },
}
