//! Log entry model

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::util::normalize_text_option;

/// Longest description the log service accepts, in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 120;

/// Identifier assigned by the log service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteLogId(String);

impl RemoteLogId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteLogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Activity category of a log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    Work,
    Meeting,
    Field,
    Travel,
    Admin,
}

impl ActivityType {
    pub const ALL: [Self; 5] = [
        Self::Work,
        Self::Meeting,
        Self::Field,
        Self::Travel,
        Self::Admin,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Work => "WORK",
            Self::Meeting => "MEETING",
            Self::Field => "FIELD",
            Self::Travel => "TRAVEL",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|activity| activity.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                format!("unknown activity type '{wanted}' (expected work, meeting, field, travel or admin)")
            })
    }
}

/// Where a log was recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogSource {
    Web,
    #[default]
    Mobile,
}

/// Fields of a log as submitted to the log service.
///
/// This is the shape shared by immediate creates, bulk sync payloads and the
/// local offline queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLog {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub activity_type: ActivityType,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default)]
    pub source: LogSource,
}

impl NewLog {
    /// Create a mobile-sourced log without a reference
    pub fn new(
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        activity_type: ActivityType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            date,
            start_time,
            end_time,
            activity_type,
            description: description.into(),
            reference: None,
            source: LogSource::Mobile,
        }
    }

    #[must_use]
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Trim free text and check the constraints the log service enforces.
    pub fn validated(self) -> Result<Self> {
        let description = self.description.trim().to_string();
        if description.is_empty() {
            return Err(Error::Validation("Description is required".to_string()));
        }
        let length = description.chars().count();
        if length > MAX_DESCRIPTION_LENGTH {
            return Err(Error::Validation(format!(
                "Description is {length} characters; the limit is {MAX_DESCRIPTION_LENGTH}"
            )));
        }
        if self.end_time < self.start_time {
            return Err(Error::Validation(format!(
                "End time {} is before start time {}",
                self.end_time.format("%H:%M"),
                self.start_time.format("%H:%M")
            )));
        }

        Ok(Self {
            description,
            reference: normalize_text_option(self.reference),
            ..self
        })
    }
}

/// A log confirmed by the log service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: RemoteLogId,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub activity_type: ActivityType,
    pub description: String,
    #[serde(default)]
    pub reference: Option<String>,
    pub source: LogSource,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewLog {
        NewLog::new(
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
            ActivityType::Field,
            "  Fixed pump  ",
        )
    }

    #[test]
    fn validated_trims_text_fields() {
        let log = sample().with_reference("   ").validated().unwrap();
        assert_eq!(log.description, "Fixed pump");
        assert_eq!(log.reference, None);
        assert_eq!(log.source, LogSource::Mobile);
    }

    #[test]
    fn validated_rejects_blank_description() {
        let mut log = sample();
        log.description = " \t ".to_string();
        let err = log.validated().unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg.contains("required")));
    }

    #[test]
    fn validated_enforces_description_limit() {
        let mut log = sample();
        log.description = "a".repeat(MAX_DESCRIPTION_LENGTH);
        assert!(log.clone().validated().is_ok());

        log.description.push('b');
        assert!(matches!(log.validated(), Err(Error::Validation(_))));
    }

    #[test]
    fn validated_rejects_inverted_times() {
        let mut log = sample();
        log.end_time = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        assert!(matches!(log.validated(), Err(Error::Validation(_))));
    }

    #[test]
    fn activity_type_parses_case_insensitively() {
        assert_eq!("field".parse::<ActivityType>(), Ok(ActivityType::Field));
        assert_eq!(" ADMIN ".parse::<ActivityType>(), Ok(ActivityType::Admin));
        assert!("lunch".parse::<ActivityType>().is_err());
    }

    #[test]
    fn new_log_uses_wire_field_names() {
        let json = serde_json::to_value(sample().with_reference("WO-7")).unwrap();
        assert_eq!(json["activityType"], "FIELD");
        assert_eq!(json["startTime"], "09:00:00");
        assert_eq!(json["source"], "MOBILE");
        assert_eq!(json["reference"], "WO-7");
    }

    #[test]
    fn log_entry_decodes_service_payload() {
        let entry: LogEntry = serde_json::from_str(
            r#"{
                "id": "r1",
                "date": "2025-03-10",
                "startTime": "09:00:00",
                "endTime": "09:45:00",
                "activityType": "MEETING",
                "description": "Standup",
                "source": "WEB",
                "createdAt": "2025-03-10T09:46:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(entry.id.as_str(), "r1");
        assert_eq!(entry.activity_type, ActivityType::Meeting);
        assert_eq!(entry.reference, None);
        assert_eq!(entry.source, LogSource::Web);
    }
}
