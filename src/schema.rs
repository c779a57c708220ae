use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use strum::Display;
use typed_builder::TypedBuilder;

use crate::{parser::text::parse_float_prefix, period::Period};

/// Identifier prefix given to the first half of a split combined exam until it is matched.
pub const ORPHAN_PREFIX: &str = "orphan-";

/// Version of the result layout understood by consumers.
pub const RESULT_VERSION: u32 = 6;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Display, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditStatus {
    Passed,
    Deselected,
    Failed,
    Added,
    Booked,
    Continue,
    UnknownStatus,
    Unknown,
    NotBooked,
}

impl CreditStatus {
    /// Derives the status from a grade as printed by the portal.
    ///
    /// `NB` (not passed) and `Best` (passed) are textual grades; numeric grades pass from 4 up.
    pub fn from_grade(grade: &str) -> Self {
        if grade.contains("NB") {
            return Self::Failed;
        }
        if grade.contains("Best") {
            return Self::Passed;
        }
        match parse_float_prefix(grade) {
            None => Self::UnknownStatus,
            Some(value) if value >= 4. => Self::Passed,
            Some(_) => Self::Failed,
        }
    }
}

/// One course or module entry.
#[derive(Clone, PartialEq, Debug, TypedBuilder, Serialize, Deserialize)]
pub struct Credit {
    #[builder(setter(into))]
    pub uni_identifier: String,
    #[builder(setter(into))]
    pub name: String,
    #[builder(setter(into))]
    pub short_name: String,
    #[builder(default)]
    pub credits_worth: Option<f64>,
    #[builder(default)]
    pub credits_received: Option<f64>,
    pub status: CreditStatus,
    #[builder(default)]
    pub grade: Option<String>,
    #[builder(default)]
    pub weight: Option<f64>,
    pub period: Period,
    /// Set on one half of a combined written+oral exam; points at the identifier of the sibling.
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combined_exam: Option<String>,
    #[builder(default)]
    #[serde(default)]
    pub exams_events: Vec<ExamEvent>,
}

impl Credit {
    pub fn is_orphan(&self) -> bool {
        self.uni_identifier.starts_with(ORPHAN_PREFIX)
    }
}

/// An aggregate grade over several credits, e.g. a combined exam.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Block {
    pub name: String,
    pub period: Period,
    pub grade: String,
    pub status: CreditStatus,
    pub credits_received: Option<f64>,
    pub encompasses: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExamType {
    Written,
    Oral,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ExamRoom {
    pub id: String,
    pub name: String,
}

/// A personal exam sitting.
#[derive(Clone, PartialEq, Debug, TypedBuilder, Serialize, Deserialize)]
pub struct ExamEvent {
    #[builder(setter(into))]
    pub uni_identifier: String,
    #[builder(setter(into))]
    pub event_serie_id: String,
    pub start_date: Option<DateTime<FixedOffset>>,
    pub end_date: Option<DateTime<FixedOffset>>,
    pub exam_type: ExamType,
    pub examiners: Vec<String>,
    pub room: ExamRoom,
    #[builder(default)]
    pub helpers: Option<String>,
    /// Display form of the period of the credit this event was attached to.
    #[builder(default)]
    pub semester: Option<String>,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct RoomSelection {
    pub room: String,
    pub day: String,
    pub time: String,
    pub event_serie_id: Option<String>,
}

/// Rooms the student has ticked for one course in the weekly schedule.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub uni_identifier: String,
    pub selected: Vec<RoomSelection>,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Direction {
    pub code: Option<String>,
    pub name: String,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Identity {
    pub first_name: String,
    pub last_name: String,
    pub matriculation_number: String,
}

#[derive(Clone, Copy, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct CreditStats {
    pub total_credits: f64,
    pub weighted_average: f64,
}

/// Everything collected in one scrape.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct LoginResult {
    pub credits: Vec<Credit>,
    pub blocks: Vec<Block>,
    pub schedule: Vec<ScheduleEntry>,
    pub directions: Vec<Direction>,
    pub stats: CreditStats,
    pub identity: Option<Identity>,
    pub success: bool,
    pub version: u32,
}
