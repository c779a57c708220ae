//! Small string helpers shared by the page parsers.

/// Reads the longest leading decimal number, ignoring leading whitespace.
///
/// `"5.5 KP"` gives `5.5`, `"abc"` gives `None`.
pub fn parse_float_prefix(s: &str) -> Option<f64> {
    regex!(r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?")
        .find(s.trim_start())?
        .as_str()
        .parse()
        .ok()
}

/// Reads the leading integer, ignoring leading whitespace.
pub fn parse_int_prefix(s: &str) -> Option<i64> {
    regex!(r"^[+-]?[0-9]+")
        .find(s.trim_start())?
        .as_str()
        .parse()
        .ok()
}

/// Drops the last `n` characters and appends `L`, the suffix used for lecture identifiers.
pub fn lecture_identifier(raw: &str, n: usize) -> String {
    let kept = raw.chars().count().saturating_sub(n);
    let mut res: String = raw.chars().take(kept).collect();
    res.truncate(res.trim_end().len());
    res.push('L');
    res
}

/// Extracts the amount of credit points from a cell like `"7 KP"`.
pub fn credit_points(s: &str) -> Option<f64> {
    regex!(r"([0-9.]+)\sKP")
        .captures(s)
        .and_then(|c| c[1].parse().ok())
}

#[cfg(test)]
mod tests {
    use super::{credit_points, lecture_identifier, parse_float_prefix, parse_int_prefix};

    #[test]
    fn numeric_prefixes() {
        assert_eq!(parse_float_prefix("5.5"), Some(5.5));
        assert_eq!(parse_float_prefix("  4 KP"), Some(4.));
        assert_eq!(parse_float_prefix(".5"), Some(0.5));
        assert_eq!(parse_float_prefix("abc"), None);
        assert_eq!(parse_float_prefix(""), None);
        assert_eq!(parse_int_prefix("3.5"), Some(3));
        assert_eq!(parse_int_prefix(" 12 "), Some(12));
        assert_eq!(parse_int_prefix("-"), None);
    }

    #[test]
    fn identifiers() {
        assert_eq!(lecture_identifier("252-0027-00L", 1), "252-0027-00L");
        assert_eq!(lecture_identifier("401-0212-16 J", 2), "401-0212-16L");
        assert_eq!(lecture_identifier("227-0003-10 V", 1), "227-0003-10L");
        assert_eq!(lecture_identifier("529-0011-04Ü", 1), "529-0011-04L");
        assert_eq!(lecture_identifier("", 2), "L");
    }

    #[test]
    fn points() {
        assert_eq!(credit_points("7 KP 4G"), Some(7.));
        assert_eq!(credit_points("2.5\u{a0}KP"), Some(2.5));
        assert_eq!(credit_points("Noten"), None);
    }
}
