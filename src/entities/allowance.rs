// 📅 Allowance Entity - amount, schedule and how it is split

use crate::schedule::{Frequency, RecurrenceRule};
use crate::entities::account::AccountType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of `GET /api/admin/allowances`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllowanceConfig {
    pub id: i64,
    pub user_id: i64,

    #[serde(default)]
    pub display_name: String,

    pub amount: f64,
    pub frequency: Frequency,

    #[serde(default)]
    pub day_of_week: Option<u32>,

    #[serde(default)]
    pub day_of_month: Option<u32>,

    #[serde(default)]
    pub next_payment_date: Option<NaiveDate>,

    #[serde(default, with = "super::flag")]
    pub active: bool,
}

impl AllowanceConfig {
    /// Recurrence rule for this allowance, keeping only the applicable anchor
    pub fn rule(&self) -> RecurrenceRule {
        RecurrenceRule::from_parts(self.frequency, self.day_of_week, self.day_of_month)
    }

    /// "Next: 2026-10-19" or "Next: Not scheduled"
    pub fn next_payment_label(&self) -> String {
        match self.next_payment_date {
            Some(date) => format!("Next: {}", date.format("%Y-%m-%d")),
            None => "Next: Not scheduled".to_string(),
        }
    }
}

/// One row of `GET /api/admin/allowances/{id}/splits`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllowanceSplit {
    pub account_id: i64,
    pub percentage: f64,

    #[serde(default)]
    pub nickname: Option<String>,

    #[serde(default)]
    pub account_type: Option<AccountType>,
}

/// Body of `PUT /api/admin/allowances/{id}`. Absent fields keep their
/// current value on the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllowanceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Frequency>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_payment_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<u8>,
}

impl AllowanceUpdate {
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = Some(if active { 1 } else { 0 });
        self
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }
}

impl From<crate::schedule::ScheduleValues> for AllowanceUpdate {
    fn from(values: crate::schedule::ScheduleValues) -> Self {
        AllowanceUpdate {
            frequency: Some(values.frequency),
            day_of_week: values.day_of_week,
            day_of_month: values.day_of_month,
            next_payment_date: values.next_payment_date,
            ..Default::default()
        }
    }
}
