use std::{fmt::Display, str::FromStr};

use anyhow::Context;
use derive_more::From;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Academic term encoded as `YYYYS`, where `S` is 1 for spring and 2 for autumn.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, From, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Period(u32);

impl Period {
    /// Used when the timetable does not mark any semester as selected.
    pub const FALLBACK: Period = Period(20192);

    /// Short display form such as `HS19`.
    pub fn semester(self) -> String {
        period_to_string(self.0)
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(PartialEq, Eq, Debug, Error)]
pub enum PeriodParseError {
    #[error("Not a semester code of the form `2019S` / `2019W`: {0:?}")]
    InvalidFormat(String),
}

impl FromStr for Period {
    type Err = PeriodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = regex!(r"^([0-9]{4})(S|W)$")
            .captures(s.trim())
            .ok_or_else(|| PeriodParseError::InvalidFormat(s.to_owned()))?;
        let year: u32 = captures[1]
            .parse()
            .map_err(|_| PeriodParseError::InvalidFormat(s.to_owned()))?;
        let semester = if &captures[2] == "S" { 1 } else { 2 };
        Ok(Period(year * 10 + semester))
    }
}

/// Turns `20192` into `HS19` and `20191` into `FS19`.
///
/// The year is cut down to two digits, so the result cannot be converted back.
/// Semester digits other than 1 and 2 produce no prefix.
pub fn period_to_string(period: u32) -> String {
    let s = period.to_string();
    let year = s.get(2..s.len().min(4)).unwrap_or("");
    let semester = match s.get(4..s.len().min(9)).map(str::parse::<u32>) {
        Some(Ok(1)) => "FS",
        Some(Ok(2)) => "HS",
        _ => "",
    };
    format!("{semester}{year}")
}

/// Parses a semester code such as `2019S` (spring) or `2019W` (autumn).
///
/// An absent or empty code yields `Ok(None)`.
pub fn period_to_number(period: Option<&str>) -> Result<Option<Period>, PeriodParseError> {
    match period {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s.parse().map(Some),
    }
}

/// Converts the session column of the grade overview (`W19`, `S20`, ...) into a period.
///
/// A winter session belongs to the autumn semester of the previous calendar year.
pub fn session_to_period(session: &str) -> anyhow::Result<Period> {
    let session = session.trim();
    let mut chars = session.chars();
    let is_winter = chars.next().with_context(|| "Session is empty")? == 'W';
    let year: u32 = regex!(r"^\s*([0-9]{2})(?:[^0-9]|$)")
        .captures(chars.as_str())
        .with_context(|| format!("No two-digit year found in session {session:?}"))?[1]
        .parse()?;
    let period = if is_winter {
        (2000 + year - 1) * 10 + 2
    } else {
        (2000 + year) * 10 + 1
    };
    Ok(Period(period))
}
