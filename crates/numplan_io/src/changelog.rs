//! Change-log record layout.
//!
//! Downstream systems import routing changes as one record per prefix with
//! a fixed 17-column layout. Column order is part of that contract.

use crate::error::{IoError, IoResult};
use numplan_core::RoutingEntry;
use regex::Regex;
use std::sync::OnceLock;

/// Column names, in output order.
pub const CHANGELOG_COLUMNS: [&str; 17] = [
    "PSET_ID",
    "NUMBER_HISTORY",
    "OPER_OPER_ID",
    "PREFIX",
    "START_DATE",
    "END_DATE",
    "NAVI_USER",
    "NAVI_DATE",
    "DRCT_DRCT_ID",
    "CIT_CIT_ID",
    "COU_COU_ID",
    "PSET_COMMENT",
    "ODRC_ODRC_ID",
    "ZONE_ZONE_ID",
    "AOB_AOB_ID",
    "RTCM_RTCM_ID",
    "ACTION",
];

/// Values shared by every change-log record of one publication.
///
/// Only the sequence id, prefix and region vary per record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeLogTemplate {
    /// Id given to the first record; later records count up from it.
    pub first_sequence_id: u64,
    /// History version of every record.
    pub history_version: u32,
    /// Operator id.
    pub operator_id: String,
    /// Start of validity, `DD-MM-YYYY`.
    pub valid_from: String,
    /// End of validity, `DD-MM-YYYY`.
    pub valid_to: String,
    /// Author of the change.
    pub author: String,
    /// Authoring timestamp, `DD-MM-YYYY HH:MM:SS`.
    pub authored_at: String,
    /// City id.
    pub city_id: String,
    /// Country id.
    pub country_id: String,
    /// Free-form comment.
    pub comment: String,
    /// Direction-group id.
    pub odrc_id: String,
    /// Zone id.
    pub zone_id: String,
    /// AOB id.
    pub aob_id: String,
    /// Route-class id.
    pub rtcm_id: String,
    /// Action code.
    pub action: String,
}

impl Default for ChangeLogTemplate {
    fn default() -> Self {
        Self {
            first_sequence_id: 1,
            history_version: 1,
            operator_id: String::new(),
            valid_from: "01-01-2000".to_string(),
            valid_to: "31-12-2999".to_string(),
            author: String::new(),
            authored_at: "01-01-2000 00:00:00".to_string(),
            city_id: String::new(),
            country_id: String::new(),
            comment: String::new(),
            odrc_id: String::new(),
            zone_id: String::new(),
            aob_id: String::new(),
            rtcm_id: String::new(),
            action: "I".to_string(),
        }
    }
}

struct DatePatterns {
    date: Regex,
    datetime: Regex,
}

static DATE_PATTERNS: OnceLock<DatePatterns> = OnceLock::new();

fn date_patterns() -> &'static DatePatterns {
    DATE_PATTERNS.get_or_init(|| DatePatterns {
        date: Regex::new(r"^(?P<day>\d{2})-(?P<month>\d{2})-(?P<year>\d{4})$")
            .expect("date pattern is valid"),
        datetime: Regex::new(
            r"^(?P<day>\d{2})-(?P<month>\d{2})-(?P<year>\d{4}) ([01]\d|2[0-3]):[0-5]\d:[0-5]\d$",
        )
        .expect("datetime pattern is valid"),
    })
}

fn is_leap_year(year: u32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(month: u32, year: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn check_date(field: &'static str, value: &str, pattern: &Regex, expected: &str) -> IoResult<()> {
    let invalid = |reason: String| IoError::InvalidTemplate {
        field,
        value: value.to_string(),
        reason,
    };
    let caps = pattern
        .captures(value)
        .ok_or_else(|| invalid(format!("expected {expected}")))?;
    let number = |name: &str| caps[name].parse::<u32>().unwrap_or(0);
    let (day, month, year) = (number("day"), number("month"), number("year"));

    if !(1..=12).contains(&month) {
        return Err(invalid(format!("month {month:02} out of range")));
    }
    let last = days_in_month(month, year);
    if !(1..=last).contains(&day) {
        return Err(invalid(format!("{month:02}-{year:04} has no day {day:02}")));
    }
    Ok(())
}

impl ChangeLogTemplate {
    /// Checks the date fields, including that each date exists in the
    /// calendar.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidTemplate`] naming the first bad field.
    pub fn validate(&self) -> IoResult<()> {
        let patterns = date_patterns();
        check_date("valid_from", &self.valid_from, &patterns.date, "DD-MM-YYYY")?;
        check_date("valid_to", &self.valid_to, &patterns.date, "DD-MM-YYYY")?;
        check_date(
            "authored_at",
            &self.authored_at,
            &patterns.datetime,
            "DD-MM-YYYY HH:MM:SS",
        )?;
        Ok(())
    }

    /// Fields of the record for `entry`, the `offset`-th of the publication.
    #[must_use]
    pub fn record(&self, offset: u64, entry: &RoutingEntry) -> [String; 17] {
        [
            (self.first_sequence_id + offset).to_string(),
            self.history_version.to_string(),
            self.operator_id.clone(),
            entry.prefix.clone(),
            self.valid_from.clone(),
            self.valid_to.clone(),
            self.author.clone(),
            self.authored_at.clone(),
            entry.region_id.to_string(),
            self.city_id.clone(),
            self.country_id.clone(),
            self.comment.clone(),
            self.odrc_id.clone(),
            self.zone_id.clone(),
            self.aob_id.clone(),
            self.rtcm_id.clone(),
            self.action.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use numplan_core::RegionId;

    #[test]
    fn default_template_is_valid() {
        assert!(ChangeLogTemplate::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_dates() {
        let template = ChangeLogTemplate {
            valid_from: "2024-01-01".into(),
            ..ChangeLogTemplate::default()
        };
        assert!(matches!(
            template.validate(),
            Err(IoError::InvalidTemplate { field: "valid_from", .. })
        ));

        let template = ChangeLogTemplate {
            authored_at: "01-01-2024 25:00:00".into(),
            ..ChangeLogTemplate::default()
        };
        assert!(template.validate().is_err());
    }

    #[test]
    fn rejects_dates_missing_from_the_calendar() {
        for date in ["31-02-2024", "29-02-2023", "31-04-2024", "00-01-2024", "15-13-2024"] {
            let template = ChangeLogTemplate {
                valid_from: date.into(),
                ..ChangeLogTemplate::default()
            };
            assert!(
                matches!(
                    template.validate(),
                    Err(IoError::InvalidTemplate { field: "valid_from", .. })
                ),
                "{date} accepted"
            );
        }

        let template = ChangeLogTemplate {
            valid_to: "31-06-2030".into(),
            ..ChangeLogTemplate::default()
        };
        assert!(matches!(
            template.validate(),
            Err(IoError::InvalidTemplate { field: "valid_to", .. })
        ));

        let template = ChangeLogTemplate {
            authored_at: "29-02-1900 12:00:00".into(),
            ..ChangeLogTemplate::default()
        };
        assert!(matches!(
            template.validate(),
            Err(IoError::InvalidTemplate { field: "authored_at", .. })
        ));
    }

    #[test]
    fn accepts_leap_days() {
        let template = ChangeLogTemplate {
            valid_from: "29-02-2024".into(),
            valid_to: "31-12-2999".into(),
            authored_at: "29-02-2000 23:59:59".into(),
            ..ChangeLogTemplate::default()
        };
        assert!(template.validate().is_ok());
    }

    #[test]
    fn record_layout() {
        let template = ChangeLogTemplate {
            first_sequence_id: 500,
            operator_id: "12".into(),
            ..ChangeLogTemplate::default()
        };
        let record = template.record(2, &RoutingEntry::new("901500000", RegionId(69)));
        assert_eq!(record.len(), CHANGELOG_COLUMNS.len());
        assert_eq!(record[0], "502");
        assert_eq!(record[2], "12");
        assert_eq!(record[3], "901500000");
        assert_eq!(record[8], "69");
        assert_eq!(record[16], "I");
    }
}
