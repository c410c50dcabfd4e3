use thiserror::Error;

use evac_core::CoreError;

#[derive(Debug, Error)]
pub enum RegionError {
    #[error("region catalog is empty")]
    EmptyCatalog,

    #[error("region table missing required columns {missing:?}; found {found:?}")]
    MissingColumns {
        missing: Vec<String>,
        found:   Vec<String>,
    },

    /// A row that is present but unusable: blank name, unparsable number.
    #[error("invalid region data: {0}")]
    Data(String),

    #[error(transparent)]
    Coordinate(#[from] CoreError),

    #[error("region parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RegionResult<T> = Result<T, RegionError>;
