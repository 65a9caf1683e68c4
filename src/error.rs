// ⚠️ Error Types
// Typed failures for schedule rules, split submission and the backend client

use crate::schedule::Frequency;
use thiserror::Error;

// ============================================================================
// SCHEDULE ERRORS
// ============================================================================

/// A recurrence rule that cannot produce a date.
///
/// Raised before any calendar arithmetic happens, so an invalid rule never
/// yields a plausible-looking but wrong payment date.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRuleError {
    #[error("day of week must be between 0 (Monday) and 6 (Sunday), got {0}")]
    DayOfWeekOutOfRange(u32),

    #[error("day of month must be between 1 and 31, got {0}")]
    DayOfMonthOutOfRange(u32),

    #[error("{0} schedule requires a day of week")]
    MissingDayOfWeek(Frequency),

    #[error("monthly schedule requires a day of month")]
    MissingDayOfMonth,

    #[error("{0} schedule cannot carry both a day of week and a day of month")]
    ConflictingAnchors(Frequency),

    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("unknown frequency '{0}'")]
    UnknownFrequency(String),
}

// ============================================================================
// SPLIT ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SplitError {
    #[error("At least one account must have a percentage > 0")]
    NoAccountsSelected,

    #[error("Total must equal 100% (currently {total:.1}%)")]
    TotalMismatch { total: f64 },

    #[error("Each percentage must be between 0 and 100, got {0}")]
    PercentageOutOfRange(f64),

    #[error("Account {0} is not part of this split")]
    UnknownAccount(i64),
}

// ============================================================================
// API ERRORS
// ============================================================================

/// Failures talking to the bank backend. Nothing here is retried; callers
/// surface the message to the user and move on.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("{message} (HTTP {status})")]
    Server { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Deserialization(String),

    #[error(transparent)]
    Split(#[from] SplitError),
}

impl ApiError {
    /// Short text suitable for a transient notification.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => "Network error".to_string(),
            ApiError::Server { message, .. } => message.clone(),
            ApiError::Deserialization(_) => "Something went wrong".to_string(),
            ApiError::Split(e) => e.to_string(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_error_messages() {
        assert_eq!(
            InvalidRuleError::DayOfWeekOutOfRange(7).to_string(),
            "day of week must be between 0 (Monday) and 6 (Sunday), got 7"
        );
        assert_eq!(
            InvalidRuleError::MissingDayOfWeek(Frequency::Biweekly).to_string(),
            "biweekly schedule requires a day of week"
        );
    }

    #[test]
    fn test_split_error_messages() {
        assert_eq!(
            SplitError::TotalMismatch { total: 99.9 }.to_string(),
            "Total must equal 100% (currently 99.9%)"
        );
    }

    #[test]
    fn test_user_message() {
        let err = ApiError::Server {
            status: 409,
            message: "A checking account with this nickname already exists".to_string(),
        };
        assert_eq!(
            err.user_message(),
            "A checking account with this nickname already exists"
        );
        assert_eq!(ApiError::Network("refused".into()).user_message(), "Network error");
        assert_eq!(
            ApiError::from(SplitError::NoAccountsSelected).user_message(),
            "At least one account must have a percentage > 0"
        );
    }
}
