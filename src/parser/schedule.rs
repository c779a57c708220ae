use std::collections::HashMap;

use scraper::{ElementRef, Html};

use crate::{
    parser::{table::Row, text::lecture_identifier},
    schema::{RoomSelection, ScheduleEntry},
};

/// Parses the weekly schedule page, keeping only the rooms the student has ticked.
pub fn parse(html: &Html) -> anyhow::Result<Vec<ScheduleEntry>> {
    let mut series = SeriesCounter::default();
    Ok(html
        .select(selector!(".tablelist > tbody > tr"))
        .filter_map(|tr| parse_row(tr, &mut series))
        .collect())
}

/// Numbers repeated occurrences of the same course series as `<id>-0`, `<id>-1`, ...
#[derive(Default)]
struct SeriesCounter(HashMap<String, usize>);
impl SeriesCounter {
    fn next(&mut self, id: &str) -> String {
        let count = self.0.entry(id.to_owned()).or_default();
        let res = format!("{id}-{count}");
        *count += 1;
        res
    }
}

fn parse_row(tr: ElementRef, series: &mut SeriesCounter) -> Option<ScheduleEntry> {
    let row = Row::children(tr);
    let event_serie_id = row
        .cell(3)
        .ok()
        .and_then(|cell| cell.select(selector!("a")).next())
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| regex!(r"lehrveranstaltungId=([0-9]+)").captures(href))
        .map(|captures| series.next(&captures[1]));
    let day = row.cell_text_or_empty(3);
    let time = row.cell_text_or_empty(4);

    let selected = match row.cell(0) {
        Ok(cell) => cell
            .select(selector!("tr"))
            .filter(|tr| {
                tr.select(selector!("td input"))
                    .next()
                    .and_then(|input| input.value().attr("checked"))
                    .is_some()
            })
            .map(|tr| RoomSelection {
                room: room_name(&tr.text().collect::<String>()),
                day: day.clone(),
                time: time.clone(),
                event_serie_id: event_serie_id.clone(),
            })
            .collect(),
        Err(_) => vec![],
    };

    let uni_identifier = row.cell_text_or_empty(5);
    if uni_identifier.is_empty() {
        return None;
    }
    Some(ScheduleEntry {
        uni_identifier: lecture_identifier(&uni_identifier, 1),
        selected,
    })
}

fn room_name(text: &str) -> String {
    text.trim()
        .replacen('»', "", 1)
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_owned()
}

#[cfg(test)]
pub mod tests {
    use scraper::Html;

    use super::parse;

    pub const SCHEDULE_HTML: &str = r#"
<table class="tablelist"><tbody>
  <tr>
    <td><table>
      <tr><td><input type="radio" name="r1" checked="checked"></td><td>» HG&nbsp;E 7</td></tr>
      <tr><td><input type="radio" name="r1"></td><td>» ML D 28</td></tr>
    </table></td>
    <td>U</td><td>2</td>
    <td><a href="/detail.do?lehrveranstaltungId=123456&amp;semkez=2019W">Mo</a></td>
    <td>10-12</td>
    <td>252-0027-00 U</td>
  </tr>
  <tr>
    <td><table>
      <tr><td><input type="radio" name="r2" checked></td><td>» CAB G 11</td></tr>
    </table></td>
    <td>U</td><td>2</td>
    <td><a href="/detail.do?lehrveranstaltungId=123456">Do</a></td>
    <td>14-16</td>
    <td>252-0027-00 U</td>
  </tr>
  <tr>
    <td></td><td></td><td></td><td><a href="/detail.do?lehrveranstaltungId=99">Fr</a></td><td></td><td></td>
  </tr>
</tbody></table>"#;

    #[test]
    fn schedule() {
        let schedule = parse(&Html::parse_document(SCHEDULE_HTML)).unwrap();
        assert_eq!(schedule.len(), 2);

        assert_eq!(schedule[0].uni_identifier, "252-0027-00L");
        assert_eq!(schedule[0].selected.len(), 1);
        let selection = &schedule[0].selected[0];
        assert_eq!(selection.room, "HG E 7");
        assert_eq!(selection.day, "Mo");
        assert_eq!(selection.time, "10-12");
        assert_eq!(selection.event_serie_id.as_deref(), Some("123456-0"));

        assert_eq!(schedule[1].selected[0].room, "CAB G 11");
        assert_eq!(
            schedule[1].selected[0].event_serie_id.as_deref(),
            Some("123456-1")
        );
    }
}
