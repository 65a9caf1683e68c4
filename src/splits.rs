// 💰 Split Validator
// Percentage splits of an allowance across a kid's accounts
//
// Two views of the same inputs:
// - Live: every field counts toward the running total, zeros included
// - Submission: zero entries are dropped and the rest must sum to 100%

use crate::entities::{AccountDirectory, AllowanceSplit};
use crate::error::SplitError;
use serde::{Deserialize, Serialize};

/// Allowed distance from 100% before a split set is rejected
pub const SPLIT_TOLERANCE: f64 = 0.01;

// ============================================================================
// SPLIT ENTRY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitEntry {
    pub account_id: i64,
    pub percentage: f64,
}

impl SplitEntry {
    pub fn new(account_id: i64, percentage: f64) -> Self {
        SplitEntry { account_id, percentage }
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitValidation {
    pub total: f64,
    pub is_valid: bool,
}

/// Running total over every entry, and whether it is 100% within tolerance
pub fn validate(entries: &[SplitEntry]) -> SplitValidation {
    let total: f64 = entries.iter().map(|e| e.percentage).sum();
    SplitValidation {
        total,
        is_valid: (total - 100.0).abs() < SPLIT_TOLERANCE,
    }
}

/// Total as displayed next to the inputs ("99.9%")
pub fn format_total(total: f64) -> String {
    format!("{:.1}%", total)
}

/// Read a percentage field the way a number input does: anything that is
/// not a finite number counts as zero.
pub fn parse_percentage(input: &str) -> f64 {
    input
        .trim()
        .trim_end_matches('%')
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

// ============================================================================
// SUBMISSION
// ============================================================================

/// Body of `PUT /api/admin/allowances/{id}/splits`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitSubmission {
    pub splits: Vec<SplitEntry>,
}

/// Drop zero entries and check what is left.
///
/// The server re-validates everything; this only spares a round trip.
pub fn prepare_submission(entries: &[SplitEntry]) -> Result<SplitSubmission, SplitError> {
    if let Some(bad) = entries.iter().find(|e| e.percentage > 100.0) {
        return Err(SplitError::PercentageOutOfRange(bad.percentage));
    }

    let splits: Vec<SplitEntry> = entries.iter().copied().filter(|e| e.percentage > 0.0).collect();

    if splits.is_empty() {
        return Err(SplitError::NoAccountsSelected);
    }

    let total: f64 = splits.iter().map(|e| e.percentage).sum();
    if (total - 100.0).abs() > SPLIT_TOLERANCE {
        return Err(SplitError::TotalMismatch { total });
    }

    Ok(SplitSubmission { splits })
}

// ============================================================================
// SPLIT SET
// ============================================================================

/// Editable split state: one entry per account shown in the editor, in
/// display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitSet {
    entries: Vec<SplitEntry>,
}

impl SplitSet {
    pub fn new(entries: Vec<SplitEntry>) -> Self {
        SplitSet { entries }
    }

    /// Editor rows for a user's checking then savings accounts, prefilled
    /// from the saved splits (0 where an account has none).
    pub fn for_accounts(user_id: i64, accounts: &AccountDirectory, current: &[AllowanceSplit]) -> Self {
        let entries = accounts
            .split_targets(user_id)
            .into_iter()
            .map(|account| {
                let percentage = current
                    .iter()
                    .find(|s| s.account_id == account.id)
                    .map(|s| s.percentage)
                    .unwrap_or(0.0);
                SplitEntry::new(account.id, percentage)
            })
            .collect();

        SplitSet { entries }
    }

    pub fn entries(&self) -> &[SplitEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn percentage(&self, account_id: i64) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.account_id == account_id)
            .map(|e| e.percentage)
    }

    pub fn set_percentage(&mut self, account_id: i64, percentage: f64) -> Result<(), SplitError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.account_id == account_id)
            .ok_or(SplitError::UnknownAccount(account_id))?;
        entry.percentage = percentage;
        Ok(())
    }

    /// Update from raw field text
    pub fn set_from_input(&mut self, account_id: i64, input: &str) -> Result<(), SplitError> {
        self.set_percentage(account_id, parse_percentage(input))
    }

    /// Nudge one entry, keeping it within 0..=100
    pub fn adjust(&mut self, account_id: i64, delta: f64) -> Result<(), SplitError> {
        let current = self.percentage(account_id).ok_or(SplitError::UnknownAccount(account_id))?;
        let next = ((current + delta) * 10.0).round() / 10.0;
        self.set_percentage(account_id, next.clamp(0.0, 100.0))
    }

    pub fn validation(&self) -> SplitValidation {
        validate(&self.entries)
    }

    /// Whether the confirm action is enabled
    pub fn can_confirm(&self) -> bool {
        self.validation().is_valid
    }

    pub fn submission(&self) -> Result<SplitSubmission, SplitError> {
        prepare_submission(&self.entries)
    }
}

// ============================================================================
// DISTRIBUTION PREVIEW
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitAllocation {
    pub account_id: i64,
    pub amount: f64,
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// How a payment of `amount` spreads over `entries`.
///
/// Every entry but the last gets its share rounded to cents; the last one
/// takes the remainder so the allocations always add up to `amount`.
/// Entries that would receive nothing are left out.
pub fn distribute(amount: f64, entries: &[SplitEntry]) -> Vec<SplitAllocation> {
    let mut allocations = Vec::with_capacity(entries.len());
    let mut distributed = 0.0;

    for (i, entry) in entries.iter().enumerate() {
        let share = if i == entries.len() - 1 {
            round_cents(amount - distributed)
        } else {
            let share = round_cents(amount * entry.percentage / 100.0);
            distributed += share;
            share
        };

        if share > 0.0 {
            allocations.push(SplitAllocation {
                account_id: entry.account_id,
                amount: share,
            });
        }
    }

    allocations
}

// ============================================================================
// TESTS
// ============================================================================
