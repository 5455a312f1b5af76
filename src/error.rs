//! Error types for the capture-session library.

use std::fmt;

use thiserror::Error;

use crate::property::{PropertyId, PropertyType};

/// Status code reported by the capture runtime.
///
/// Every runtime completion and every inbound event carries one of these.
/// Codes the session does not interpret are kept verbatim in
/// [`ResultCode::Other`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ResultCode {
    /// Operation completed.
    #[default]
    Success,
    /// Generic failure.
    Failure,
    /// The handle is not (or no longer) open.
    InvalidHandle,
    /// The operation is not supported by this device.
    NotSupported,
    /// The runtime gave up waiting.
    Timeout,
    /// The operation was interrupted by the user (e.g. a camera scan dismissed).
    Cancelled,
    /// Transport specific code, opaque to this layer.
    Other(i32),
}

impl ResultCode {
    /// Maps a raw runtime code.
    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Success,
            -1 => Self::Failure,
            -2 => Self::InvalidHandle,
            -3 => Self::NotSupported,
            -4 => Self::Timeout,
            -5 => Self::Cancelled,
            other => Self::Other(other),
        }
    }

    /// Returns the raw runtime code.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Failure => -1,
            Self::InvalidHandle => -2,
            Self::NotSupported => -3,
            Self::Timeout => -4,
            Self::Cancelled => -5,
            Self::Other(code) => code,
        }
    }

    /// Returns true for [`ResultCode::Success`].
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    /// Converts the code into a `Result`, treating anything but success as an error.
    pub fn into_result(self) -> Result<()> {
        if self.is_success() {
            Ok(())
        } else {
            Err(Error::from(self))
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
            Self::InvalidHandle => write!(f, "invalid handle"),
            Self::NotSupported => write!(f, "not supported"),
            Self::Timeout => write!(f, "timeout"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Other(code) => write!(f, "code {code}"),
        }
    }
}

/// The main error type for capture-session operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The runtime reported a non-success status.
    #[error("capture runtime error: {0}")]
    Capture(ResultCode),

    /// The session is not open, or the device channel has been closed.
    #[error("invalid handle: connection is not open")]
    InvalidHandle,

    /// A property came back with a value the accessor cannot decode.
    #[error("unexpected {found:?} value for property {id:?}")]
    UnexpectedValue { id: PropertyId, found: PropertyType },

    /// Event channel send error.
    #[error("event channel closed")]
    ChannelClosed,
}

impl Error {
    /// Returns the status code equivalent of this error.
    #[must_use]
    pub const fn code(&self) -> ResultCode {
        match self {
            Self::Capture(code) => *code,
            Self::InvalidHandle => ResultCode::InvalidHandle,
            Self::UnexpectedValue { .. } | Self::ChannelClosed => ResultCode::Failure,
        }
    }
}

impl From<ResultCode> for Error {
    fn from(code: ResultCode) -> Self {
        match code {
            ResultCode::InvalidHandle => Self::InvalidHandle,
            other => Self::Capture(other),
        }
    }
}

/// Result type alias for capture-session operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_code_raw_mapping() {
        assert_eq!(ResultCode::from_code(0), ResultCode::Success);
        assert_eq!(ResultCode::from_code(-5), ResultCode::Cancelled);
        assert_eq!(ResultCode::from_code(-42), ResultCode::Other(-42));
        assert_eq!(ResultCode::Other(17).code(), 17);
        assert_eq!(ResultCode::InvalidHandle.code(), -2);
    }

    #[test]
    fn test_into_result() {
        assert!(ResultCode::Success.into_result().is_ok());
        let err = ResultCode::Timeout.into_result().unwrap_err();
        assert_eq!(err.code(), ResultCode::Timeout);
    }

    #[test]
    fn test_invalid_handle_round_trips_through_error() {
        let err = Error::from(ResultCode::InvalidHandle);
        assert!(matches!(err, Error::InvalidHandle));
        assert_eq!(err.code(), ResultCode::InvalidHandle);
    }
}
