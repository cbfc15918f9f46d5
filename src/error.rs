use thiserror::Error;

use crate::core::column::ColumnMode;

pub type PlotResult<T> = Result<T, PlotError>;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("unsupported column mode for curve values: {0:?}")]
    UnsupportedColumnMode(ColumnMode),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("malformed persisted attribute `{attribute}`: {reason}")]
    MalformedAttribute { attribute: String, reason: String },
}
