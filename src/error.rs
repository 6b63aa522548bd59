//! Error taxonomy shared by builders, decoders and transports.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Caller supplied an invalid parameter combination; nothing was sent.
    #[error("invalid argument `{param}`: {reason}")]
    Construction { param: &'static str, reason: String },

    /// The reply shape does not match what the request implies.
    #[error("unexpected reply: {0}")]
    Decode(String),

    /// Error reply from the server, message kept verbatim.
    #[error("{0}")]
    Server(String),

    /// Malformed RESP framing on the wire.
    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn construction(param: &'static str, reason: impl Into<String>) -> Self {
        Error::Construction {
            param,
            reason: reason.into(),
        }
    }

    pub(crate) fn decode(msg: impl Into<String>) -> Self {
        Error::Decode(msg.into())
    }

    pub fn is_construction(&self) -> bool {
        matches!(self, Error::Construction { .. })
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode(_))
    }

    /// Offending parameter name for construction errors.
    pub fn param(&self) -> Option<&'static str> {
        match self {
            Error::Construction { param, .. } => Some(*param),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_error_names_param() {
        let err = Error::construction("bucket_duration", "required when aggregation is set");
        assert!(err.is_construction());
        assert_eq!(err.param(), Some("bucket_duration"));
        assert_eq!(
            err.to_string(),
            "invalid argument `bucket_duration`: required when aggregation is set"
        );
    }

    #[test]
    fn test_server_error_is_verbatim() {
        let err = Error::Server("ERR TSDB: the key does not exist".to_string());
        assert_eq!(err.to_string(), "ERR TSDB: the key does not exist");
        assert_eq!(err.param(), None);
    }
}
