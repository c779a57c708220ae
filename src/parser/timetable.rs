use anyhow::Context;
use itertools::Itertools;
use log::debug;
use scraper::{ElementRef, Html};

use crate::{
    parser::{table::Row, text::credit_points},
    period::{period_to_number, Period},
    schema::{Credit, CreditStatus},
};

/// One semester of course bookings (`Belegungen`).
#[derive(Debug)]
pub struct TimetablePage {
    pub period: Period,
    pub credits: Vec<Credit>,
    /// Raw `semkez` values of the other semesters offered by the semester selector.
    pub other_periods: Vec<String>,
}

pub fn parse(html: &Html) -> anyhow::Result<TimetablePage> {
    let selected = html
        .select(selector!("option[selected]"))
        .next()
        .map(option_value);
    let period = period_to_number(selected.as_deref())
        .context("Selected semester is malformed")?
        .unwrap_or(Period::FALLBACK);

    let other_periods = html
        .select(selector!("option"))
        .map(option_value)
        .filter(|value| match period_to_number(Some(value.as_str())) {
            Ok(Some(p)) => p != period,
            Ok(None) => false,
            Err(e) => {
                debug!("Ignoring semester option: {e}");
                false
            }
        })
        .unique()
        .collect_vec();

    let credits: Vec<Credit> = html
        .select(selector!(".tablelist tr"))
        .map(Row::descendants)
        .filter(|row| row.cell_has_class(0, "td-black"))
        .map(|row| parse_row(&row, period))
        .try_collect()?;

    Ok(TimetablePage {
        period,
        credits,
        other_periods,
    })
}

fn option_value(option: ElementRef) -> String {
    match option.value().attr("value") {
        Some(value) => value.trim().to_owned(),
        None => option.text().collect::<String>().trim().to_owned(),
    }
}

fn parse_row(row: &Row, period: Period) -> anyhow::Result<Credit> {
    let name = row
        .find(selector!(r#"[target="detailFach"]"#))
        .map(|a| a.text().collect::<String>().trim().to_owned())
        .unwrap_or_default();
    Ok(Credit::builder()
        .uni_identifier(row.cell_text(0).context("Course number not found")?)
        .short_name(name.clone())
        .name(name)
        .status(CreditStatus::Booked)
        .period(period)
        .credits_worth(credit_points(&row.cell_text_or_empty(2)))
        .build())
}
