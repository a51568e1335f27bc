use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ClinicError {
    #[error("queue is empty")]
    EmptyQueue,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("cannot open file for writing: {path}: {source}", path = path.display())]
    StorageWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read file: {path}: {source}", path = path.display())]
    StorageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type ClinicResult<T> = std::result::Result<T, ClinicError>;
