use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Data load failed ({origin}): {reason}")]
    DataLoad { origin: String, reason: String },

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Unknown question '{question}' for category {category}")]
    UnknownQuestion { category: String, question: String },

    #[error("Year {year} outside {min}..={max}")]
    YearOutOfRange { year: i32, min: i32, max: i32 },

    #[error("Unknown regions: {}", .0.join(", "))]
    UnknownRegion(Vec<String>),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("InvalidData: {0}")]
    InvalidData(String),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DashboardError {
    pub fn data_load(origin: impl Into<String>, reason: impl ToString) -> Self {
        Self::DataLoad {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }

    /// Fold an error raised while preparing the dataset into `DataLoad`.
    /// Region rejections keep their own variant.
    pub(crate) fn at_load(self, origin: &str) -> Self {
        match self {
            err @ (Self::DataLoad { .. } | Self::UnknownRegion(_)) => err,
            other => Self::data_load(origin, other),
        }
    }
}

#[cfg(feature = "python")]
impl From<DashboardError> for pyo3::PyErr {
    fn from(err: DashboardError) -> pyo3::PyErr {
        use pyo3::exceptions::{PyKeyError, PyRuntimeError, PyValueError};

        match err {
            DashboardError::UnknownCategory(_) | DashboardError::UnknownQuestion { .. } => {
                PyKeyError::new_err(err.to_string())
            }
            DashboardError::YearOutOfRange { .. } => PyValueError::new_err(err.to_string()),
            other => PyRuntimeError::new_err(other.to_string()),
        }
    }
}
