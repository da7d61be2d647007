use std::path::PathBuf;
use thiserror::Error;

pub type BlogResult<T> = anyhow::Result<T>;

#[derive(Error, Debug)]
pub enum BlogError {
    /// One or more required post fields were absent or empty.
    #[error("Missing or empty key(s): {fields:?}")]
    MissingFields { fields: Vec<String> },
    /// The supplied date is not a real `YYYY-MM-DD` calendar date.
    #[error("Incorrect date format, should be 'YYYY-MM-DD'")]
    InvalidDate { given: String },
    /// The requested/specified ID does not exist.
    #[error("Post does not exist with the given ID")]
    PostNotFound { id: u32 },
    /// The backing document cannot be read or written.
    #[error("Storage unavailable: {msg}")]
    StorageUnavailable { msg: String },
    /// The store path does not name a JSON document.
    #[error("Invalid file format. Only JSON files are allowed.")]
    InvalidStorePath { path: PathBuf },
    #[error("Sort argument value wrong, should be one of [\"title\", \"content\", \"author\", \"date\"].")]
    InvalidSortField { given: String },
    #[error("Direction argument value wrong, should be 'asc' or 'desc'.")]
    InvalidSortDirection { given: String },
    /// Custom Error type for errors not covered by the above errors.
    #[error("{msg}")]
    CustomError { msg: String },
}

impl BlogError {
    pub fn custom_error(msg: String) -> Self {
        Self::CustomError { msg }
    }

    pub fn storage_unavailable(msg: String) -> Self {
        Self::StorageUnavailable { msg }
    }
}
