// Family Bank - Core Library
// Schedule and split calculators plus the pieces around them, shared by the
// CLI, the terminal UI and tests

pub mod error;
pub mod schedule;   // Next payment dates and schedule labels
pub mod splits;     // Allowance percentage splits
pub mod entities;   // Backend wire models
pub mod config;

#[cfg(feature = "client")]
pub mod api;

#[cfg(feature = "tui")]
pub mod ui;

// Re-export commonly used types
pub use error::{ApiError, InvalidRuleError, SplitError};
pub use schedule::{
    Frequency, RecurrenceRule, ScheduleValues,
    next_occurrence, next_occurrence_iso, next_occurrence_from_today, parse_iso_date,
    advance_payment_date, day_suffix, ordinal, weekday_name, format_schedule,
    format_long_date, format_payment_preview, DAY_NAMES,
};
pub use splits::{
    SplitEntry, SplitSet, SplitValidation, SplitSubmission, SplitAllocation,
    validate, prepare_submission, distribute, parse_percentage, format_total,
    SPLIT_TOLERANCE,
};
pub use entities::{
    Account, AccountDirectory, AccountType, NewCheckingAccount, NicknameUpdate,
    AllowanceConfig, AllowanceSplit, AllowanceUpdate,
    CompoundFrequency, InterestConfig, InterestUpdate,
};
pub use config::ClientConfig;

#[cfg(feature = "client")]
pub use api::{ActionResponse, ApiClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
