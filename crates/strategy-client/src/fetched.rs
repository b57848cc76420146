use serde::Serialize;
use std::fmt;

use crate::error::StrategyApiError;

/// Why a query was answered with synthetic data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FallbackReason {
    /// DNS, connect, or timeout failure
    Transport(String),
    /// Service answered outside 2xx
    Status(u16),
    /// Body did not match the expected shape
    Decode(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::Transport(detail) => write!(f, "transport: {}", detail),
            FallbackReason::Status(code) => write!(f, "status {}", code),
            FallbackReason::Decode(detail) => write!(f, "decode: {}", detail),
        }
    }
}

impl From<&StrategyApiError> for FallbackReason {
    fn from(err: &StrategyApiError) -> Self {
        match err {
            StrategyApiError::RequestFailed(e) if e.is_decode() => {
                FallbackReason::Decode(e.to_string())
            }
            StrategyApiError::RequestFailed(e) => match e.status() {
                Some(status) => FallbackReason::Status(status.as_u16()),
                None => FallbackReason::Transport(e.to_string()),
            },
            StrategyApiError::Status(code) => FallbackReason::Status(*code),
            StrategyApiError::Serialization(e) => FallbackReason::Decode(e.to_string()),
        }
    }
}

/// A query answer tagged with where it came from.
///
/// Both arms carry the same shape, so callers that only need a value can
/// call [`Fetched::into_inner`] and never see the difference.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    Live(T),
    Fallback { data: T, reason: FallbackReason },
}

impl<T> Fetched<T> {
    pub fn fallback(data: T, reason: FallbackReason) -> Self {
        Fetched::Fallback { data, reason }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Fetched::Live(_))
    }

    pub fn data(&self) -> &T {
        match self {
            Fetched::Live(data) | Fetched::Fallback { data, .. } => data,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Fetched::Live(data) | Fetched::Fallback { data, .. } => data,
        }
    }

    pub fn reason(&self) -> Option<&FallbackReason> {
        match self {
            Fetched::Live(_) => None,
            Fetched::Fallback { reason, .. } => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_from_error() {
        assert_eq!(
            FallbackReason::from(&StrategyApiError::Status(503)),
            FallbackReason::Status(503)
        );
        let bad_json = serde_json::from_str::<u32>("{").unwrap_err();
        assert!(matches!(
            FallbackReason::from(&StrategyApiError::Serialization(bad_json)),
            FallbackReason::Decode(_)
        ));
    }

    #[test]
    fn test_fetched_collapses_to_same_value() {
        let live = Fetched::Live(7);
        let synthetic = Fetched::fallback(7, FallbackReason::Status(500));

        assert!(live.is_live());
        assert!(!synthetic.is_live());
        assert_eq!(synthetic.reason(), Some(&FallbackReason::Status(500)));
        assert_eq!(live.into_inner(), synthetic.into_inner());
    }
}
