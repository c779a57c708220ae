use scraper::{ElementRef, Html};

use crate::{
    auth::EnrollmentId,
    parser::table::squashed_text,
    schema::{Direction, Identity},
};

/// Parses the portal home page, fixing a broken attribute the portal is known to emit.
pub fn parse_home(html: &str) -> Html {
    Html::parse_document(&html.replace(r#"target="_blank"""#, r#"target="_blank""#))
}

/// Every enrollment the student can switch between.
pub fn enrollments(html: &Html) -> Vec<EnrollmentId> {
    html.select(selector!(r#"input[name="immatrikulationIndex"]"#))
        .filter_map(|input| input.value().attr("value"))
        .map(|value| value.to_owned().into())
        .collect()
}

/// The degree programme headings printed below the enrollment table.
pub fn directions(html: &Html) -> Vec<Direction> {
    let name = html
        .select(selector!(".tablelist"))
        .flat_map(|table| {
            table
                .next_siblings()
                .filter_map(ElementRef::wrap)
                .filter(|e| e.value().name() == "h4")
        })
        .map(squashed_text)
        .collect::<Vec<_>>()
        .join(" ");
    vec![Direction { code: None, name }]
}

/// Reads the student's name and matriculation number from the header, e.g.
/// `Max\tMuster (19-123-456)`.
pub fn identity(html: &Html) -> Option<Identity> {
    let title: String = html
        .select(selector!("#servicenav div"))
        .next()?
        .text()
        .collect();
    let parentheses = regex!(r"\s*\(.*?\)\s*");
    let matriculation_number = parentheses
        .find(&title)?
        .as_str()
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .to_owned();
    let name = parentheses.replace_all(&title, "");
    let mut names: Vec<&str> = name
        .trim()
        .split('\t')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    let last_name = names.pop()?.to_owned();
    Some(Identity {
        first_name: names.join(" "),
        last_name,
        matriculation_number,
    })
}

#[cfg(test)]
pub mod tests {
    use crate::schema::{Direction, Identity};

    use super::{directions, enrollments, identity, parse_home};

    pub const HOME_HTML: &str = "
<div id=\"servicenav\"><div>Max\tMoritz\tMuster (19-123-456)</div></div>
<form action=\"studImmatrikulationPre.do\" method=\"post\">
<table class=\"tablelist\">
  <tr><td><input type=\"radio\" name=\"immatrikulationIndex\" value=\"0\"></td><td>Informatik BSc</td></tr>
  <tr><td><input type=\"radio\" name=\"immatrikulationIndex\" value=\"1\"></td><td>Mathematik BSc</td></tr>
</table>
<h4>Informatik Bachelor</h4>
<a href=\"/help\" target=\"_blank\"\">Hilfe</a>
</form>";

    #[test]
    fn home_page() {
        let html = parse_home(HOME_HTML);
        let ids = enrollments(&html);
        assert_eq!(
            ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
            ["0", "1"]
        );
        assert_eq!(
            directions(&html),
            [Direction {
                code: None,
                name: "Informatik Bachelor".to_owned()
            }]
        );
        assert_eq!(
            identity(&html),
            Some(Identity {
                first_name: "Max Moritz".to_owned(),
                last_name: "Muster".to_owned(),
                matriculation_number: "19-123-456".to_owned(),
            })
        );
    }

    #[test]
    fn identity_is_optional() {
        assert_eq!(identity(&parse_home("<p>nothing</p>")), None);
    }
}
