//! Error types and retry classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all market data operations
//! - [`RetryClass`]: Classification for determining retry behavior

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors that can occur while fetching historical series.
///
/// Each variant is classified into a [`RetryClass`] via the [`retry_class`](Self::retry_class)
/// method, which determines whether the fetcher should try the request again.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The requested symbol was not found by the provider.
    /// This is a terminal error - retrying won't help.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// No data available for the requested period.
    /// The symbol may exist but has no bars in the window.
    #[error("No data for period")]
    NoDataForRange,

    /// The provider rate limited the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// A provider-specific error occurred (transport failure, malformed payload).
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The provider returned data that failed validation checks.
    #[error("Validation failed: {message}")]
    ValidationFailed {
        /// Description of the validation failure
        message: String,
    },
}

impl MarketDataError {
    /// Returns the retry classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use stockview_market_data::errors::{MarketDataError, RetryClass};
    ///
    /// let error = MarketDataError::RateLimited { provider: "YAHOO".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    ///
    /// let error = MarketDataError::SymbolNotFound("INVALID".to_string());
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::SymbolNotFound(_) | Self::NoDataForRange | Self::ValidationFailed { .. } => {
                RetryClass::Never
            }

            Self::RateLimited { .. } | Self::Timeout { .. } | Self::ProviderError { .. } => {
                RetryClass::WithBackoff
            }
        }
    }

    /// True when the error means "nothing to fetch" rather than a fault.
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::SymbolNotFound(_) | Self::NoDataForRange)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_not_found_never_retries() {
        let error = MarketDataError::SymbolNotFound("INVALID".to_string());
        assert_eq!(error.retry_class(), RetryClass::Never);
        assert!(error.is_no_data());
    }

    #[test]
    fn test_no_data_for_range_never_retries() {
        let error = MarketDataError::NoDataForRange;
        assert_eq!(error.retry_class(), RetryClass::Never);
        assert!(error.is_no_data());
    }

    #[test]
    fn test_validation_failed_never_retries() {
        let error = MarketDataError::ValidationFailed {
            message: "missing close".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Never);
        assert!(!error.is_no_data());
    }

    #[test]
    fn test_transient_errors_retry_with_backoff() {
        let errors = [
            MarketDataError::RateLimited {
                provider: "YAHOO".to_string(),
            },
            MarketDataError::Timeout {
                provider: "YAHOO".to_string(),
            },
            MarketDataError::ProviderError {
                provider: "YAHOO".to_string(),
                message: "connection reset".to_string(),
            },
        ];
        for error in errors {
            assert_eq!(error.retry_class(), RetryClass::WithBackoff);
        }
    }

    #[test]
    fn test_error_display() {
        let error = MarketDataError::SymbolNotFound("INVALID".to_string());
        assert_eq!(format!("{}", error), "Symbol not found: INVALID");

        let error = MarketDataError::ProviderError {
            provider: "YAHOO".to_string(),
            message: "bad gateway".to_string(),
        };
        assert_eq!(format!("{}", error), "Provider error: YAHOO - bad gateway");
    }
}
