//! Decision domain types.

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::{DateTime, Local, TimeZone, Timelike};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Accent color for an accepted recommendation.
pub const SUCCESS_COLOR: &str = "#4ade80";
/// Accent color for the sentinel error record.
pub const ERROR_COLOR: &str = "#ef4444";
/// Icon used when the model leaves `icon` out.
pub const DEFAULT_ICON: &str = "bulb-outline";
/// Icon carried by the sentinel error record.
pub const ALERT_ICON: &str = "alert-circle-outline";

/// Activity chips offered by the front-end. Free-form tags are accepted too.
pub const ACTIVITY_PRESETS: &[&str] = &[
    "Study", "Work", "Gym", "Sleep", "Reading", "Gaming", "Meditation", "Chores", "Social",
    "Coding",
];

/// Who is asking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Role {
    #[default]
    Student,
    Professional,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Student => f.write_str("Student"),
            Self::Professional => f.write_str("Professional"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "professional" | "pro" => Ok(Self::Professional),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// Coarse part of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeBucket {
    Morning,
    Afternoon,
    Evening,
}

impl TimeBucket {
    /// Morning before 12:00, Afternoon before 18:00, Evening otherwise.
    pub fn from_hour(hour: u32) -> Self {
        if hour < 12 {
            Self::Morning
        } else if hour < 18 {
            Self::Afternoon
        } else {
            Self::Evening
        }
    }

    pub fn at<Tz: TimeZone>(time: &DateTime<Tz>) -> Self {
        Self::from_hour(time.hour())
    }

    /// Bucket for the local wall clock.
    pub fn now() -> Self {
        Self::at(&Local::now())
    }
}

impl std::fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Morning => "Morning",
            Self::Afternoon => "Afternoon",
            Self::Evening => "Evening",
        };
        f.write_str(s)
    }
}

/// Which prompt template to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecisionMode {
    /// One best activity right now.
    #[default]
    Decision,
    /// A schedule for the next few hours.
    Timetable,
}

/// A file picked by the user. Only the name reaches the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub name: String,
    pub handle: PathBuf,
}

impl FileDescriptor {
    /// Describe the file at `path`. An empty path means the picker was cancelled.
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.trim();
        if path.is_empty() {
            return None;
        }
        let handle = PathBuf::from(path);
        let name = handle
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(path)
            .to_string();
        Some(Self { name, handle })
    }
}

/// Everything the prompt builder needs from the current screen.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub role: Role,
    pub activities: BTreeSet<String>,
    pub file: Option<FileDescriptor>,
    pub time_bucket: TimeBucket,
    pub mode: DecisionMode,
}

impl RequestContext {
    pub fn new(role: Role, time_bucket: TimeBucket) -> Self {
        Self {
            role,
            activities: BTreeSet::new(),
            file: None,
            time_bucket,
            mode: DecisionMode::Decision,
        }
    }

    pub fn with_activity(mut self, tag: impl Into<String>) -> Self {
        self.activities.insert(tag.into());
        self
    }

    pub fn with_file(mut self, file: FileDescriptor) -> Self {
        self.file = Some(file);
        self
    }

    pub fn with_mode(mut self, mode: DecisionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Select or deselect a tag. Returns whether it is now selected.
    pub fn toggle_activity(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() {
            return false;
        }
        if self.activities.remove(tag) {
            false
        } else {
            self.activities.insert(tag.to_string());
            true
        }
    }

    /// At least one activity or a file.
    pub fn has_input(&self) -> bool {
        !self.activities.is_empty() || self.file.is_some()
    }
}

/// The JSON shape the model is asked to return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionReply {
    pub decision: String,
    pub reason: String,
    pub icon: String,
}

/// One accepted recommendation, as stored in history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRecord {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub decision: String,
    pub reason: String,
    pub icon: String,
    pub color: String,
    pub timestamp: String,
    #[serde(default)]
    pub is_timetable: bool,
}

impl DecisionRecord {
    /// Build a record for a successful reply.
    pub fn from_reply<Tz: TimeZone>(reply: DecisionReply, mode: DecisionMode, at: &DateTime<Tz>) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            id: Uuid::new_v4(),
            decision: reply.decision,
            reason: reply.reason,
            icon: reply.icon,
            color: SUCCESS_COLOR.to_string(),
            timestamp: format_timestamp(at),
            is_timetable: mode == DecisionMode::Timetable,
        }
    }

    /// Text handed to the share sheet / clipboard.
    pub fn share_summary(&self, nickname: Option<&str>) -> String {
        let heading = if self.is_timetable {
            "DeciMate planned my next few hours"
        } else {
            "DeciMate decided for me"
        };
        let who = nickname
            .map(|n| format!(" ({n})"))
            .unwrap_or_default();
        format!(
            "{heading}{who}: {}\n\n{}\n\nDecided on {}",
            self.decision, self.reason, self.timestamp
        )
    }
}

/// Format like a US-English `toLocaleString()`: `1/31/2026, 9:05:00 PM`.
pub fn format_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}
