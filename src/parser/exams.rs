use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use itertools::Itertools;
use scraper::{ElementRef, Html};

use crate::{
    config::TIMEZONE,
    parser::{table::Row, text::lecture_identifier},
    schema::{ExamEvent, ExamRoom, ExamType},
};

/// Parses the personal exam plan.
///
/// The page prints day and month only, so the year is guessed relative to `now`:
/// a date already past in the current year is taken to mean the next year.
pub fn parse(html: &Html, now: DateTime<Tz>) -> anyhow::Result<Vec<ExamEvent>> {
    Ok(html
        .select(selector!("tr"))
        .filter_map(|tr| parse_row(tr, now))
        .collect())
}

fn parse_row(tr: ElementRef, now: DateTime<Tz>) -> Option<ExamEvent> {
    let row = Row::descendants(tr);
    let exam_type = match row.cell_text_or_empty(1).as_str() {
        "s" => ExamType::Written,
        "m" => ExamType::Oral,
        _ => return None,
    };

    let date = exam_date(&row.cell_text_or_empty(2), now);
    let (start_date, end_date) = match (date, exam_times(&row.cell_text_or_empty(3))) {
        (Some(date), Some((start, end))) => (at(date, start), at(date, end)),
        (Some(date), None) => (midnight(date), None),
        (None, _) => (None, None),
    };
    if exam_type == ExamType::Oral && (start_date.is_none() || end_date.is_none()) {
        return None;
    }

    let uni_identifier: String = row
        .cell_text_or_empty(4)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let uni_identifier = lecture_identifier(&uni_identifier, 1);
    let room = row.cell_text_or_empty(7).replace('»', "").trim().to_owned();
    let helpers = tr
        .next_siblings()
        .find_map(ElementRef::wrap)
        .filter(|next| next.value().name() == "tr")
        .map(|next| {
            next.select(selector!(".kommentar-le"))
                .flat_map(|e| e.text())
                .collect::<String>()
                .trim()
                .to_owned()
        })
        .filter(|helpers| !helpers.is_empty());

    Some(
        ExamEvent::builder()
            .event_serie_id(format!("{uni_identifier}-personal-exam"))
            .uni_identifier(uni_identifier)
            .start_date(start_date)
            .end_date(end_date)
            .exam_type(exam_type)
            .examiners(
                row.cell_text_or_empty(6)
                    .split_whitespace()
                    .map(str::to_owned)
                    .collect_vec(),
            )
            .room(ExamRoom {
                id: room
                    .chars()
                    .map(|c| if c.is_whitespace() { '-' } else { c })
                    .collect(),
                name: room,
            })
            .helpers(helpers)
            .build(),
    )
}

fn two_digit_groups(s: &str) -> Vec<u32> {
    regex!("[0-9]{2}")
        .find_iter(s)
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}

/// Reads `dd.mm` and places it in the current year, or the next one if that day is already past.
fn exam_date(text: &str, now: DateTime<Tz>) -> Option<NaiveDate> {
    let (day, month) = match two_digit_groups(text)[..] {
        [day, month, ..] => (day, month),
        _ => return None,
    };
    match NaiveDate::from_ymd_opt(now.year(), month, day) {
        Some(this_year) if midnight(this_year)? >= now.fixed_offset() => Some(this_year),
        _ => NaiveDate::from_ymd_opt(now.year() + 1, month, day),
    }
}

/// Reads `hh:mm-hh:mm`.
fn exam_times(text: &str) -> Option<(NaiveTime, NaiveTime)> {
    match two_digit_groups(text)[..] {
        [start_hour, start_minute, end_hour, end_minute, ..] => Some((
            NaiveTime::from_hms_opt(start_hour, start_minute, 0)?,
            NaiveTime::from_hms_opt(end_hour, end_minute, 0)?,
        )),
        _ => None,
    }
}

fn midnight(date: NaiveDate) -> Option<DateTime<FixedOffset>> {
    at(date, NaiveTime::from_hms_opt(0, 0, 0)?)
}

fn at(date: NaiveDate, time: NaiveTime) -> Option<DateTime<FixedOffset>> {
    TIMEZONE
        .from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|t| t.fixed_offset())
}
