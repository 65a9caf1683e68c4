// 📅 Schedule Calculator
// Recurrence rules for allowance payments and the dates they land on
//
// All dates are calendar dates (no time, no timezone), matching the
// backend's date-only `next_payment_date` column.

use crate::error::InvalidRuleError;
use chrono::{Datelike, Days, Local, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Day names indexed Monday = 0 .. Sunday = 6
pub const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

// ============================================================================
// FREQUENCY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
}

impl Frequency {
    pub const ALL: [Frequency; 3] = [Frequency::Weekly, Frequency::Biweekly, Frequency::Monthly];

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Weekly => "weekly",
            Frequency::Biweekly => "biweekly",
            Frequency::Monthly => "monthly",
        }
    }

    /// Capitalized label ("Weekly")
    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Weekly => "Weekly",
            Frequency::Biweekly => "Biweekly",
            Frequency::Monthly => "Monthly",
        }
    }

    /// Weekly and biweekly rules are anchored on a weekday
    pub fn uses_day_of_week(&self) -> bool {
        matches!(self, Frequency::Weekly | Frequency::Biweekly)
    }

    pub fn next(&self) -> Self {
        match self {
            Frequency::Weekly => Frequency::Biweekly,
            Frequency::Biweekly => Frequency::Monthly,
            Frequency::Monthly => Frequency::Weekly,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = InvalidRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weekly" => Ok(Frequency::Weekly),
            "biweekly" => Ok(Frequency::Biweekly),
            "monthly" => Ok(Frequency::Monthly),
            other => Err(InvalidRuleError::UnknownFrequency(other.to_string())),
        }
    }
}

// ============================================================================
// RECURRENCE RULE
// ============================================================================

/// When an allowance is paid.
///
/// Weekly and biweekly rules carry `day_of_week` (0 = Monday .. 6 = Sunday);
/// monthly rules carry `day_of_month` (1..=31). A rule never carries both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    pub day_of_week: Option<u32>,
    pub day_of_month: Option<u32>,
}

impl RecurrenceRule {
    pub fn weekly(day_of_week: u32) -> Self {
        RecurrenceRule {
            frequency: Frequency::Weekly,
            day_of_week: Some(day_of_week),
            day_of_month: None,
        }
    }

    pub fn biweekly(day_of_week: u32) -> Self {
        RecurrenceRule {
            frequency: Frequency::Biweekly,
            day_of_week: Some(day_of_week),
            day_of_month: None,
        }
    }

    pub fn monthly(day_of_month: u32) -> Self {
        RecurrenceRule {
            frequency: Frequency::Monthly,
            day_of_week: None,
            day_of_month: Some(day_of_month),
        }
    }

    /// Build a rule from loosely-typed form or backend fields, keeping only
    /// the anchor that applies to the frequency.
    pub fn from_parts(frequency: Frequency, day_of_week: Option<u32>, day_of_month: Option<u32>) -> Self {
        if frequency.uses_day_of_week() {
            RecurrenceRule {
                frequency,
                day_of_week,
                day_of_month: None,
            }
        } else {
            RecurrenceRule {
                frequency,
                day_of_week: None,
                day_of_month,
            }
        }
    }

    /// Check the anchor invariants without touching the calendar
    pub fn validate(&self) -> Result<(), InvalidRuleError> {
        if let Some(dow) = self.day_of_week {
            if dow > 6 {
                return Err(InvalidRuleError::DayOfWeekOutOfRange(dow));
            }
        }
        if let Some(dom) = self.day_of_month {
            if !(1..=31).contains(&dom) {
                return Err(InvalidRuleError::DayOfMonthOutOfRange(dom));
            }
        }
        if self.day_of_week.is_some() && self.day_of_month.is_some() {
            return Err(InvalidRuleError::ConflictingAnchors(self.frequency));
        }

        match self.frequency {
            Frequency::Weekly | Frequency::Biweekly if self.day_of_week.is_none() => {
                Err(InvalidRuleError::MissingDayOfWeek(self.frequency))
            }
            Frequency::Monthly if self.day_of_month.is_none() => Err(InvalidRuleError::MissingDayOfMonth),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_schedule(self))
    }
}

// ============================================================================
// NEXT OCCURRENCE
// ============================================================================

/// Next date the rule fires, strictly after `today`.
///
/// Biweekly rules resolve exactly like weekly ones: the next matching
/// weekday, not the one two weeks out.
pub fn next_occurrence(rule: &RecurrenceRule, today: NaiveDate) -> Result<NaiveDate, InvalidRuleError> {
    rule.validate()?;

    match rule.frequency {
        Frequency::Weekly | Frequency::Biweekly => {
            let target = rule.day_of_week.ok_or(InvalidRuleError::MissingDayOfWeek(rule.frequency))?;
            let current = today.weekday().num_days_from_monday();
            let mut delta = target as i64 - current as i64;
            if delta <= 0 {
                delta += 7;
            }
            add_days(today, delta as u64)
        }
        Frequency::Monthly => {
            let day = rule.day_of_month.ok_or(InvalidRuleError::MissingDayOfMonth)?;
            let this_month = first_of_month(today)?;
            let candidate = day_in_month(this_month, day)?;
            if candidate > today {
                return Ok(candidate);
            }
            let next_month = add_months(this_month, 1)?;
            day_in_month(next_month, day)
        }
    }
}

/// `next_occurrence` rendered as `YYYY-MM-DD`
pub fn next_occurrence_iso(rule: &RecurrenceRule, today: NaiveDate) -> Result<String, InvalidRuleError> {
    next_occurrence(rule, today).map(|d| d.format("%Y-%m-%d").to_string())
}

/// `next_occurrence` measured from the local calendar date
pub fn next_occurrence_from_today(rule: &RecurrenceRule) -> Result<NaiveDate, InvalidRuleError> {
    next_occurrence(rule, Local::now().date_naive())
}

/// Parse a strict `YYYY-MM-DD` date
pub fn parse_iso_date(s: &str) -> Result<NaiveDate, InvalidRuleError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| InvalidRuleError::InvalidDate(s.to_string()))
}

// ============================================================================
// PAYMENT DATE ADVANCEMENT
// ============================================================================

/// Date of the payment that follows one made on `current`.
///
/// This is how the payment job rolls a schedule forward, and unlike
/// `next_occurrence` it does honour the two-week gap for biweekly rules.
/// Anchors are optional here: an unanchored rule just steps by its period.
pub fn advance_payment_date(
    frequency: Frequency,
    day_of_week: Option<u32>,
    day_of_month: Option<u32>,
    current: NaiveDate,
) -> Result<NaiveDate, InvalidRuleError> {
    match frequency {
        Frequency::Weekly | Frequency::Biweekly => {
            let step = if frequency == Frequency::Weekly { 7 } else { 14 };
            match day_of_week {
                Some(dow) if dow > 6 => Err(InvalidRuleError::DayOfWeekOutOfRange(dow)),
                Some(dow) => {
                    let from = if frequency == Frequency::Weekly {
                        add_days(current, 1)?
                    } else {
                        add_days(current, 14)?
                    };
                    weekday_on_or_after(from, dow)
                }
                None => add_days(current, step),
            }
        }
        Frequency::Monthly => match day_of_month {
            Some(dom) if !(1..=31).contains(&dom) => Err(InvalidRuleError::DayOfMonthOutOfRange(dom)),
            Some(dom) => {
                let next_month = add_months(first_of_month(current)?, 1)?;
                day_in_month(next_month, dom)
            }
            None => add_months(current, 1),
        },
    }
}

// ============================================================================
// DISPLAY
// ============================================================================

/// English ordinal suffix for a day of month
pub fn day_suffix(day: u32) -> &'static str {
    if (11..=13).contains(&(day % 100)) {
        return "th";
    }
    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// "1st", "22nd", "11th"
pub fn ordinal(day: u32) -> String {
    format!("{}{}", day, day_suffix(day))
}

pub fn weekday_name(day_of_week: u32) -> Option<&'static str> {
    DAY_NAMES.get(day_of_week as usize).copied()
}

/// Human description of a rule ("Every other Friday", "15th of each month")
pub fn format_schedule(rule: &RecurrenceRule) -> String {
    match (rule.frequency, rule.day_of_week.and_then(weekday_name), rule.day_of_month) {
        (Frequency::Weekly, Some(name), _) => format!("Every {}", name),
        (Frequency::Biweekly, Some(name), _) => format!("Every other {}", name),
        (Frequency::Monthly, _, Some(day)) => format!("{} of each month", ordinal(day)),
        (frequency, _, _) => frequency.label().to_string(),
    }
}

/// Long-form date for the next-payment preview ("Monday, October 19, 2026")
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

pub fn format_payment_preview(date: NaiveDate) -> String {
    format!("Next payment: {}", format_long_date(date))
}

// ============================================================================
// FORM VALUES
// ============================================================================

/// Schedule fields as the allowance form submits them. The anchor that does
/// not apply to the frequency is sent as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleValues {
    pub frequency: Frequency,
    pub day_of_week: Option<u32>,
    pub day_of_month: Option<u32>,
    pub next_payment_date: Option<NaiveDate>,
}

impl ScheduleValues {
    pub fn from_rule(rule: &RecurrenceRule, today: NaiveDate) -> Result<Self, InvalidRuleError> {
        let next = next_occurrence(rule, today)?;
        Ok(ScheduleValues {
            frequency: rule.frequency,
            day_of_week: rule.day_of_week,
            day_of_month: rule.day_of_month,
            next_payment_date: Some(next),
        })
    }
}

// ============================================================================
// CALENDAR HELPERS
// ============================================================================

fn out_of_range(date: NaiveDate) -> InvalidRuleError {
    InvalidRuleError::InvalidDate(date.to_string())
}

fn add_days(date: NaiveDate, days: u64) -> Result<NaiveDate, InvalidRuleError> {
    date.checked_add_days(Days::new(days)).ok_or_else(|| out_of_range(date))
}

/// Month arithmetic clamps to the last day of the target month
fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate, InvalidRuleError> {
    date.checked_add_months(Months::new(months)).ok_or_else(|| out_of_range(date))
}

fn first_of_month(date: NaiveDate) -> Result<NaiveDate, InvalidRuleError> {
    date.with_day(1).ok_or_else(|| out_of_range(date))
}

fn last_day_of_month(first: NaiveDate) -> Result<u32, InvalidRuleError> {
    add_months(first, 1)?
        .pred_opt()
        .map(|d| d.day())
        .ok_or_else(|| out_of_range(first))
}

/// `day` within the month starting at `first`, clamped to the month's length
fn day_in_month(first: NaiveDate, day: u32) -> Result<NaiveDate, InvalidRuleError> {
    let last = last_day_of_month(first)?;
    first.with_day(day.min(last)).ok_or_else(|| out_of_range(first))
}

fn weekday_on_or_after(from: NaiveDate, day_of_week: u32) -> Result<NaiveDate, InvalidRuleError> {
    let current = from.weekday().num_days_from_monday();
    let ahead = (day_of_week + 7 - current) % 7;
    add_days(from, ahead as u64)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_iso_date(s).unwrap()
    }

    #[test]
    fn test_weekly_lands_on_target_weekday() {
        let start = date("2026-01-01");
        for offset in 0..60 {
            let today = start + chrono::Duration::days(offset);
            for dow in 0..7 {
                let next = next_occurrence(&RecurrenceRule::weekly(dow), today).unwrap();
                let gap = (next - today).num_days();

                assert!(next > today);
                assert!((1..=7).contains(&gap), "gap {} from {}", gap, today);
                assert_eq!(next.weekday().num_days_from_monday(), dow);
            }
        }
    }

    #[test]
    fn test_weekly_same_day_moves_a_full_week() {
        // 2026-10-18 is a Sunday
        let today = date("2026-10-18");
        assert_eq!(next_occurrence(&RecurrenceRule::weekly(6), today).unwrap(), date("2026-10-25"));
        assert_eq!(next_occurrence(&RecurrenceRule::weekly(0), today).unwrap(), date("2026-10-19"));
    }

    #[test]
    fn test_biweekly_matches_weekly() {
        let today = date("2026-10-21");
        for dow in 0..7 {
            assert_eq!(
                next_occurrence(&RecurrenceRule::biweekly(dow), today).unwrap(),
                next_occurrence(&RecurrenceRule::weekly(dow), today).unwrap()
            );
        }
    }

    #[test]
    fn test_monthly_later_this_month() {
        let next = next_occurrence(&RecurrenceRule::monthly(25), date("2026-10-18")).unwrap();
        assert_eq!(next, date("2026-10-25"));
    }

    #[test]
    fn test_monthly_same_day_advances() {
        let next = next_occurrence(&RecurrenceRule::monthly(18), date("2026-10-18")).unwrap();
        assert_eq!(next, date("2026-11-18"));
    }

    #[test]
    fn test_monthly_clamps_in_february() {
        let rule = RecurrenceRule::monthly(31);

        assert_eq!(next_occurrence(&rule, date("2026-02-10")).unwrap(), date("2026-02-28"));
        assert_eq!(next_occurrence(&rule, date("2024-02-10")).unwrap(), date("2024-02-29"));
        // Last day of February already reached: next applicable month is March
        assert_eq!(next_occurrence(&rule, date("2026-02-28")).unwrap(), date("2026-03-31"));
    }

    #[test]
    fn test_monthly_never_overflows_short_month() {
        let rule = RecurrenceRule::monthly(31);
        assert_eq!(next_occurrence(&rule, date("2026-01-31")).unwrap(), date("2026-02-28"));
        assert_eq!(next_occurrence(&rule, date("2026-03-31")).unwrap(), date("2026-04-30"));

        let rule = RecurrenceRule::monthly(30);
        assert_eq!(next_occurrence(&rule, date("2026-02-01")).unwrap(), date("2026-02-28"));
    }

    #[test]
    fn test_monthly_year_rollover() {
        let next = next_occurrence(&RecurrenceRule::monthly(5), date("2026-12-20")).unwrap();
        assert_eq!(next, date("2027-01-05"));
    }

    #[test]
    fn test_next_occurrence_iso() {
        let iso = next_occurrence_iso(&RecurrenceRule::monthly(1), date("2026-10-18")).unwrap();
        assert_eq!(iso, "2026-11-01");
    }

    #[test]
    fn test_invalid_rules_rejected() {
        let today = date("2026-10-18");

        assert_eq!(
            next_occurrence(&RecurrenceRule::weekly(7), today),
            Err(InvalidRuleError::DayOfWeekOutOfRange(7))
        );
        assert_eq!(
            next_occurrence(&RecurrenceRule::monthly(0), today),
            Err(InvalidRuleError::DayOfMonthOutOfRange(0))
        );
        assert_eq!(
            next_occurrence(&RecurrenceRule::monthly(32), today),
            Err(InvalidRuleError::DayOfMonthOutOfRange(32))
        );

        let missing = RecurrenceRule {
            frequency: Frequency::Monthly,
            day_of_week: None,
            day_of_month: None,
        };
        assert_eq!(next_occurrence(&missing, today), Err(InvalidRuleError::MissingDayOfMonth));

        let both = RecurrenceRule {
            frequency: Frequency::Weekly,
            day_of_week: Some(1),
            day_of_month: Some(1),
        };
        assert_eq!(
            next_occurrence(&both, today),
            Err(InvalidRuleError::ConflictingAnchors(Frequency::Weekly))
        );
    }

    #[test]
    fn test_from_parts_drops_foreign_anchor() {
        let rule = RecurrenceRule::from_parts(Frequency::Monthly, Some(2), Some(15));
        assert_eq!(rule, RecurrenceRule::monthly(15));

        let rule = RecurrenceRule::from_parts(Frequency::Biweekly, Some(4), Some(15));
        assert_eq!(rule, RecurrenceRule::biweekly(4));
    }

    #[test]
    fn test_frequency_parsing() {
        assert_eq!("Weekly".parse::<Frequency>().unwrap(), Frequency::Weekly);
        assert_eq!(" biweekly ".parse::<Frequency>().unwrap(), Frequency::Biweekly);
        assert!("daily".parse::<Frequency>().is_err());
    }

    #[test]
    fn test_parse_iso_date_is_strict() {
        assert!(parse_iso_date("2026-10-18").is_ok());
        assert!(parse_iso_date("10/18/2026").is_err());
        assert!(parse_iso_date("2026-02-30").is_err());
    }

    #[test]
    fn test_ordinal_suffix() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(12), "12th");
        assert_eq!(ordinal(13), "13th");
        assert_eq!(ordinal(21), "21st");
        assert_eq!(ordinal(22), "22nd");
        assert_eq!(ordinal(23), "23rd");
        assert_eq!(ordinal(111), "111th");
    }

    #[test]
    fn test_format_schedule() {
        assert_eq!(format_schedule(&RecurrenceRule::weekly(0)), "Every Monday");
        assert_eq!(format_schedule(&RecurrenceRule::biweekly(4)), "Every other Friday");
        assert_eq!(format_schedule(&RecurrenceRule::monthly(22)), "22nd of each month");

        let bare = RecurrenceRule {
            frequency: Frequency::Weekly,
            day_of_week: None,
            day_of_month: None,
        };
        assert_eq!(format_schedule(&bare), "Weekly");
    }

    #[test]
    fn test_payment_preview() {
        assert_eq!(
            format_payment_preview(date("2026-10-19")),
            "Next payment: Monday, October 19, 2026"
        );
    }

    #[test]
    fn test_schedule_values_payload() {
        let values = ScheduleValues::from_rule(&RecurrenceRule::weekly(0), date("2026-10-18")).unwrap();
        let json = serde_json::to_value(&values).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "frequency": "weekly",
                "day_of_week": 0,
                "day_of_month": null,
                "next_payment_date": "2026-10-19"
            })
        );
    }

    #[test]
    fn test_advance_weekly_anchored() {
        // Paid on Monday 2026-10-19, next Monday is a week later
        let next = advance_payment_date(Frequency::Weekly, Some(0), None, date("2026-10-19")).unwrap();
        assert_eq!(next, date("2026-10-26"));

        // Paid late on a Wednesday, next Monday follows
        let next = advance_payment_date(Frequency::Weekly, Some(0), None, date("2026-10-21")).unwrap();
        assert_eq!(next, date("2026-10-26"));
    }

    #[test]
    fn test_advance_biweekly_keeps_two_week_gap() {
        let next = advance_payment_date(Frequency::Biweekly, Some(0), None, date("2026-10-19")).unwrap();
        assert_eq!(next, date("2026-11-02"));

        let next = advance_payment_date(Frequency::Biweekly, None, None, date("2026-10-19")).unwrap();
        assert_eq!(next, date("2026-11-02"));
    }

    #[test]
    fn test_advance_monthly() {
        let next = advance_payment_date(Frequency::Monthly, None, Some(31), date("2026-01-31")).unwrap();
        assert_eq!(next, date("2026-02-28"));

        let next = advance_payment_date(Frequency::Monthly, None, Some(15), date("2026-12-15")).unwrap();
        assert_eq!(next, date("2027-01-15"));

        let next = advance_payment_date(Frequency::Monthly, None, None, date("2026-03-31")).unwrap();
        assert_eq!(next, date("2026-04-30"));
    }

    #[test]
    fn test_advance_rejects_bad_anchor() {
        assert_eq!(
            advance_payment_date(Frequency::Weekly, Some(9), None, date("2026-10-19")),
            Err(InvalidRuleError::DayOfWeekOutOfRange(9))
        );
    }
}
