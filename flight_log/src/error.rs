use std::path::PathBuf;

/// Why a single line could not be turned into a record.
///
/// Carries no line number; [`FlightLogError::at_line`] attaches one.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error("line is {len} characters long, fix records need at least {required}")]
    TooShort { len: usize, required: usize },

    #[error("non-numeric {field} field `{value}`")]
    NonNumeric { field: &'static str, value: String },

    #[error("unexpected hemisphere `{0}`")]
    Hemisphere(String),

    #[error("latitude {latitude} or longitude {longitude} out of range")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("invalid date `{0}`, expected DDMMYY")]
    Date(String),

    #[error("invalid time of day `{0}`, expected HHMMSS")]
    TimeOfDay(String),
}

#[derive(Debug, thiserror::Error)]
pub enum FlightLogError {
    #[error("failed to read {path:?}: {source}")]
    ResourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no HFDTE date header before a timestamp was needed")]
    MissingDateHeader,

    #[error("line {line}: malformed date header: {reason}")]
    MalformedDateHeader {
        line: usize,
        #[source]
        reason: RecordError,
    },

    #[error("line {line}: malformed fix record: {reason}")]
    MalformedFixRecord {
        line: usize,
        #[source]
        reason: RecordError,
    },

    #[error("line {line}: coordinate out of range ({latitude}, {longitude})")]
    InvalidCoordinate {
        line: usize,
        latitude: f64,
        longitude: f64,
    },
}

impl FlightLogError {
    /// Attach a 1-based line number to a per-line failure.
    pub fn at_line(line: usize, reason: RecordError) -> Self {
        match reason {
            RecordError::InvalidCoordinate {
                latitude,
                longitude,
            } => Self::InvalidCoordinate {
                line,
                latitude,
                longitude,
            },
            RecordError::Date(_) => Self::MalformedDateHeader { line, reason },
            reason => Self::MalformedFixRecord { line, reason },
        }
    }

    /// Line the failure was found on, for per-line failures.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::MalformedDateHeader { line, .. }
            | Self::MalformedFixRecord { line, .. }
            | Self::InvalidCoordinate { line, .. } => Some(*line),
            Self::ResourceUnreadable { .. } | Self::MissingDateHeader => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FlightLogError>;
