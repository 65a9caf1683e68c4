// 📈 Interest Entity - rate and compounding for savings accounts

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompoundFrequency {
    Daily,
    Weekly,
    Monthly,
}

impl CompoundFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompoundFrequency::Daily => "daily",
            CompoundFrequency::Weekly => "weekly",
            CompoundFrequency::Monthly => "monthly",
        }
    }

    /// Compounding periods per year
    pub fn periods_per_year(&self) -> f64 {
        match self {
            CompoundFrequency::Daily => 365.0,
            CompoundFrequency::Weekly => 52.0,
            CompoundFrequency::Monthly => 12.0,
        }
    }

    /// Minimum whole days between two interest payments
    pub fn min_days_between(&self) -> i64 {
        match self {
            CompoundFrequency::Daily => 1,
            CompoundFrequency::Weekly => 7,
            CompoundFrequency::Monthly => 28,
        }
    }
}

/// One row of `GET /api/admin/interest`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestConfig {
    pub id: i64,
    pub account_id: i64,

    /// Annual rate in percent (5.0 = 5%)
    pub annual_rate: f64,

    pub compound_frequency: CompoundFrequency,

    #[serde(default, with = "super::flag")]
    pub active: bool,

    #[serde(default)]
    pub last_applied: Option<String>,

    #[serde(default)]
    pub display_name: Option<String>,
}

impl InterestConfig {
    /// Rate applied per compounding period, as a fraction
    pub fn period_rate(&self) -> f64 {
        self.annual_rate / 100.0 / self.compound_frequency.periods_per_year()
    }

    /// Interest one period would pay on `balance`, rounded to cents.
    /// An estimate for display; the backend computes the real payment.
    pub fn projected_interest(&self, balance: f64) -> f64 {
        if balance <= 0.0 {
            return 0.0;
        }
        (balance * self.period_rate() * 100.0).round() / 100.0
    }
}

/// Body of `PUT /api/admin/interest/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterestUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_rate: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub compound_frequency: Option<CompoundFrequency>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<u8>,
}
