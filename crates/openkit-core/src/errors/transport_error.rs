//! Errors raised by a [`Connector`](crate::traits::Connector).

/// A request that never produced an HTTP response.
///
/// A response with a non-2xx status code is not a `TransportError`; it is
/// returned as a response and interpreted by the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("network error: {reason}")]
    NetworkError { reason: String },

    #[error("malformed response: {reason}")]
    MalformedResponse { reason: String },

    #[error("{feature} feature not enabled")]
    FeatureDisabled { feature: String },
}
