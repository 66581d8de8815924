use std::time::Duration;

/// Why a correlated request produced no response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("request {id} timed out after {timeout:?}")]
    Timeout { id: i64, timeout: Duration },

    #[error("request {0} was cancelled before a response arrived")]
    Dropped(i64),

    #[error("too many outstanding requests (capacity {0})")]
    Full(usize),

    #[error("request id {0} is already outstanding")]
    DuplicateId(i64),
}

/// Failure of an application-level cross-process call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallError {
    #[error(transparent)]
    Request(#[from] RequestError),

    /// The peer ran the call and reported an error.
    #[error("remote error: {0}")]
    Remote(String),

    #[error("message could not be sent to {0}")]
    SendFailed(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_error_display() {
        let err = RequestError::Timeout {
            id: 42,
            timeout: Duration::from_millis(250),
        };
        assert_eq!(err.to_string(), "request 42 timed out after 250ms");
        assert_eq!(
            RequestError::Full(8).to_string(),
            "too many outstanding requests (capacity 8)"
        );
    }

    #[test]
    fn call_error_wraps_request_error() {
        let err: CallError = RequestError::Dropped(7).into();
        assert_eq!(
            err.to_string(),
            "request 7 was cancelled before a response arrived"
        );
        assert_eq!(
            CallError::Remote("x is not defined".into()).to_string(),
            "remote error: x is not defined"
        );
    }
}
