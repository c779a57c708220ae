use anyhow::Context;
use log::debug;
use scraper::Html;

use crate::{
    parser::{table::Row, text::credit_points},
    period::period_to_number,
    schema::{Credit, CreditStatus},
};

/// Parses the list of registered theses and projects.
///
/// Rows without a usable semester code are skipped.
pub fn parse(html: &Html) -> anyhow::Result<Vec<Credit>> {
    let mut res = vec![];
    for tr in html.select(selector!(".tablelist tr")) {
        let row = Row::descendants(tr);
        if row.is_empty() {
            continue;
        }
        if let Some(credit) = parse_row(&row).context("While parsing a project row")? {
            res.push(credit);
        }
    }
    Ok(res)
}

fn parse_row(row: &Row) -> anyhow::Result<Option<Credit>> {
    let period = match period_to_number(Some(&row.cell_text_or_empty(4))) {
        Ok(Some(period)) => period,
        Ok(None) => {
            debug!("Skipping a project without semester");
            return Ok(None);
        }
        Err(e) => {
            debug!("Skipping a project: {e}");
            return Ok(None);
        }
    };
    let name = row.cell_text(1)?;
    let grade = row.cell_text_or_empty(7);
    let status = if grade.is_empty() {
        CreditStatus::Booked
    } else {
        CreditStatus::from_grade(&grade)
    };
    Ok(Some(
        Credit::builder()
            .uni_identifier(row.cell_text(0)?)
            .short_name(name.clone())
            .name(name)
            .credits_worth(credit_points(&row.cell_text_or_empty(2)))
            .period(period)
            .grade((!grade.is_empty()).then_some(grade))
            .status(status)
            .build(),
    ))
}

#[cfg(test)]
pub mod tests {
    use scraper::Html;

    use crate::{period::Period, schema::CreditStatus};

    use super::parse;

    pub const PROJECTS_HTML: &str = r#"
<table class="tablelist">
  <tr><th>Nummer</th><th>Titel</th><th>Umfang</th><th>Betreuer</th><th>Semester</th><th>Beginn</th><th>Ende</th><th>Note</th></tr>
  <tr><td>252-0500-00L</td><td>Bachelor's Thesis</td><td>14 KP</td><td>Muster</td><td>2020S</td><td>01.03.2020</td><td>31.08.2020</td><td>5.5</td></tr>
  <tr><td>252-0600-00L</td><td>Semester Project</td><td>8 KP</td><td>Muster</td><td>2020W</td><td>01.09.2020</td><td></td><td></td></tr>
  <tr><td>252-0700-00L</td><td>Draft</td><td>8 KP</td><td>Muster</td><td></td><td></td><td></td><td></td></tr>
  <tr><td>252-0800-00L</td><td>Legacy</td><td>8 KP</td><td>Muster</td><td>HS20</td><td></td><td></td><td></td></tr>
</table>"#;

    #[test]
    fn projects() {
        let projects = parse(&Html::parse_document(PROJECTS_HTML)).unwrap();
        assert_eq!(projects.len(), 2);

        assert_eq!(projects[0].uni_identifier, "252-0500-00L");
        assert_eq!(projects[0].name, "Bachelor's Thesis");
        assert_eq!(projects[0].credits_worth, Some(14.));
        assert_eq!(projects[0].period, Period::from(20201));
        assert_eq!(projects[0].grade.as_deref(), Some("5.5"));
        assert_eq!(projects[0].status, CreditStatus::Passed);

        assert_eq!(projects[1].period, Period::from(20202));
        assert_eq!(projects[1].grade, None);
        assert_eq!(projects[1].status, CreditStatus::Booked);
    }
}
