use anyhow::Context;
use itertools::Itertools;
use scraper::{ElementRef, Html};

use crate::{
    parser::{
        table::{next_rows, Row},
        text::{lecture_identifier, parse_float_prefix, parse_int_prefix},
    },
    period::session_to_period,
    schema::{Block, Credit, CreditStatus, ORPHAN_PREFIX},
};

/// Contents of the grade overview (`Leistungsüberblick`).
#[derive(Debug)]
pub struct GradeOverview {
    pub modules: Vec<Credit>,
    pub blocks: Vec<Block>,
}

pub fn parse(html: &Html) -> anyhow::Result<GradeOverview> {
    let mut modules = vec![];
    let mut blocks = vec![];
    for tr in html.select(selector!(".tablelist tr")) {
        if is_block_row(tr) {
            blocks.push(parse_block(tr).context("While parsing a block row")?);
        } else if is_module_row(&Row::descendants(tr)) {
            modules.push(parse_module(&Row::descendants(tr)).context("While parsing a grade row")?);
        }
    }
    Ok(GradeOverview {
        modules: split_combined_exams(modules),
        blocks,
    })
}

fn is_module_row(row: &Row) -> bool {
    row.cell_attr(0, "nowrap").is_some()
}

fn is_block_row(tr: ElementRef) -> bool {
    Row::children(tr).cell_attr(0, "colspan") == Some("2")
}

fn parse_module(row: &Row) -> anyhow::Result<Credit> {
    let raw_identifier = row.cell_text(0)?;
    let uni_identifier = lecture_identifier(&raw_identifier, 2);
    let name = row.cell_text(1)?;
    let period = session_to_period(&row.cell_raw_text(2)?)?;
    let grade = row.cell_text(3)?;
    let weight = parse_int_prefix(&row.cell_text_or_empty(4)).map(|w| w as f64);
    let credits_received = parse_float_prefix(&row.cell_text_or_empty(5));
    let credits_worth = match row.cell_text_or_empty(6).as_str() {
        "" => credits_received,
        worth => parse_float_prefix(worth),
    };
    // The ` J` suffix marks a yearly course examined together with its sibling.
    let combined_exam = raw_identifier
        .ends_with(" J")
        .then(|| uni_identifier.clone());
    Ok(Credit::builder()
        .status(CreditStatus::from_grade(&grade))
        .uni_identifier(uni_identifier)
        .short_name(name.clone())
        .name(name)
        .grade((!grade.is_empty()).then_some(grade))
        .weight(weight)
        .credits_received(credits_received)
        .credits_worth(credits_worth)
        .period(period)
        .combined_exam(combined_exam)
        .build())
}

fn parse_block(tr: ElementRef) -> anyhow::Result<Block> {
    let row = Row::descendants(tr);
    let grade = row.cell_text(2)?;
    let encompasses: Vec<String> = next_rows(tr)
        .map(Row::descendants)
        .take_while(is_module_row)
        .map(|row| anyhow::Ok(lecture_identifier(&row.cell_text(0)?, 2)))
        .try_collect()?;
    Ok(Block {
        name: row.cell_text(0)?,
        period: session_to_period(&row.cell_raw_text(1)?)?,
        status: CreditStatus::from_grade(&grade),
        grade,
        credits_received: parse_float_prefix(&row.cell_text_or_empty(4)),
        encompasses,
    })
}

/// Splits a combined exam named `A/B` into two half-weighted credits.
///
/// `B` keeps the identifier; `A` becomes an orphan until reconciliation finds its own entry.
pub fn split_combined_exams(modules: Vec<Credit>) -> Vec<Credit> {
    modules
        .into_iter()
        .flat_map(|module| {
            let names = match module.combined_exam {
                Some(_) if module.name.contains('/') => {
                    let mut parts = module.name.split('/').map(str::trim);
                    let first = parts.next().unwrap_or_default().to_owned();
                    let second = parts.next().unwrap_or_default().to_owned();
                    Some((first, second))
                }
                _ => None,
            };
            match names {
                Some((first, second)) => {
                    let half = |x: Option<f64>| x.map(|x| x / 2.);
                    let mut kept = module.clone();
                    kept.name = second.clone();
                    kept.short_name = second;
                    kept.weight = half(module.weight);
                    kept.credits_received = half(module.credits_received);
                    let mut orphan = kept.clone();
                    orphan.name = first.clone();
                    orphan.short_name = first;
                    orphan.uni_identifier = format!("{ORPHAN_PREFIX}{}", module.uni_identifier);
                    vec![kept, orphan]
                }
                None => vec![module],
            }
        })
        .collect()
}

#[cfg(test)]
pub mod tests {
    use scraper::Html;

    use crate::{
        period::Period,
        schema::CreditStatus::{Failed, Passed},
    };

    use super::parse;

    pub const GRADES_HTML: &str = r#"
<html><body>
<table class="tablelist">
  <tr><th>Nummer</th><th>Titel</th><th>Session</th><th>Note</th><th>Gewicht</th><th>KP</th><th>KP total</th></tr>
  <tr><td colspan="2">Basisprüfungsblock 1</td><td>W19</td><td>4.50</td><td></td><td>28</td></tr>
  <tr><td nowrap="nowrap">252-0025-01 J</td><td>Diskrete Mathematik / Lineare Algebra</td><td>W19</td><td>5.00</td><td>2</td><td>14</td><td>14</td></tr>
  <tr><td nowrap="nowrap">252-0027-00 V</td><td>Einführung in die Programmierung</td><td>W19</td><td>4.75</td><td>1</td><td>7</td><td></td></tr>
  <tr><td>Total</td><td></td><td></td><td></td><td></td><td>28</td></tr>
  <tr><td nowrap="nowrap">401-0141-00 V</td><td>Analysis I</td><td>S20</td><td>NB</td><td>1</td><td>0</td><td>8</td></tr>
</table>
</body></html>"#;

    #[test]
    fn grade_overview() {
        let overview = parse(&Html::parse_document(GRADES_HTML)).unwrap();

        assert_eq!(overview.blocks.len(), 1);
        let block = &overview.blocks[0];
        assert_eq!(block.name, "Basisprüfungsblock 1");
        assert_eq!(block.period, Period::from(20182));
        assert_eq!(block.grade, "4.50");
        assert_eq!(block.status, Passed);
        assert_eq!(block.credits_received, Some(28.));
        assert_eq!(block.encompasses, ["252-0025-01L", "252-0027-00L"]);

        let modules = &overview.modules;
        assert_eq!(modules.len(), 4);

        assert_eq!(modules[0].uni_identifier, "252-0025-01L");
        assert_eq!(modules[0].name, "Lineare Algebra");
        assert_eq!(modules[0].weight, Some(1.));
        assert_eq!(modules[0].credits_received, Some(7.));
        assert_eq!(modules[0].credits_worth, Some(14.));
        assert_eq!(modules[0].combined_exam.as_deref(), Some("252-0025-01L"));

        assert_eq!(modules[1].uni_identifier, "orphan-252-0025-01L");
        assert_eq!(modules[1].name, "Diskrete Mathematik");
        assert_eq!(modules[1].short_name, "Diskrete Mathematik");
        assert_eq!(modules[1].weight, Some(1.));

        assert_eq!(modules[2].uni_identifier, "252-0027-00L");
        assert_eq!(modules[2].grade.as_deref(), Some("4.75"));
        assert_eq!(modules[2].status, Passed);
        assert_eq!(modules[2].credits_worth, Some(7.));
        assert_eq!(modules[2].combined_exam, None);

        assert_eq!(modules[3].uni_identifier, "401-0141-00L");
        assert_eq!(modules[3].period, Period::from(20201));
        assert_eq!(modules[3].status, Failed);
        assert_eq!(modules[3].credits_received, Some(0.));
        assert_eq!(modules[3].credits_worth, Some(8.));
    }

    #[test]
    fn malformed_session_is_an_error() {
        let html = r#"<table class="tablelist"><tr><td nowrap="nowrap">1 V</td><td>x</td><td>??</td><td>5</td></tr></table>"#;
        assert!(parse(&Html::parse_document(html)).is_err());
    }
}
