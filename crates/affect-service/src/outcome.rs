//! Tagged results for fallback chains.

use std::fmt;

/// Why an analysis did not take its preferred path.
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackReason {
    /// The remote route was selected but no client could be built.
    ModelUnavailable(String),
    /// Transport failure, non-2xx status or empty completion.
    Remote(String),
    /// The response failed both the strict and permissive parse.
    MalformedResponse(String),
    /// A record reached the expander without a usable label.
    Contract(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModelUnavailable(msg) => write!(f, "model unavailable: {msg}"),
            Self::Remote(msg) => write!(f, "remote failure: {msg}"),
            Self::MalformedResponse(msg) => write!(f, "malformed response: {msg}"),
            Self::Contract(msg) => write!(f, "contract violation: {msg}"),
        }
    }
}

/// Data plus whether it came from a fallback.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<T> {
    Ok(T),
    Fallback { reason: FallbackReason, data: T },
}

impl<T> Resolved<T> {
    pub fn fallback(reason: FallbackReason, data: T) -> Self {
        Self::Fallback { reason, data }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    pub fn reason(&self) -> Option<&FallbackReason> {
        match self {
            Self::Ok(_) => None,
            Self::Fallback { reason, .. } => Some(reason),
        }
    }

    pub fn data(&self) -> &T {
        match self {
            Self::Ok(data) | Self::Fallback { data, .. } => data,
        }
    }

    /// Drop the tag; consumers only ever see the data.
    pub fn into_inner(self) -> T {
        match self {
            Self::Ok(data) | Self::Fallback { data, .. } => data,
        }
    }

    /// Transform the data, keeping the tag.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolved<U> {
        match self {
            Self::Ok(data) => Resolved::Ok(f(data)),
            Self::Fallback { reason, data } => Resolved::Fallback {
                reason,
                data: f(data),
            },
        }
    }
}
