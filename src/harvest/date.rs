use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::DateError;

static CANONICAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}/\d{2}/\d{2}$").unwrap());

/// Tried in order. Month names are English because the browser locale is pinned.
const FORMATS: &[&str] = &[
    "%b %d, %Y", // Sep 7, 2024
    "%B %d, %Y", // September 7, 2024
    "%d %b %Y",  // 7 Sep 2024
    "%d %B %Y",  // 7 September 2024
    "%Y-%m-%d",
    "%m/%d/%Y",
];

/// Convert a rendered review date into `YYYY/MM/DD`.
pub fn normalize(raw: &str) -> Result<String, DateError> {
    let trimmed = raw.trim();
    let date = FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| DateError(raw.to_string()))?;
    let out = date.format("%Y/%m/%d").to_string();
    // Years outside 0..=9999 format with a sign or extra digits.
    if !is_canonical(&out) {
        return Err(DateError(raw.to_string()));
    }
    Ok(out)
}

fn is_canonical(date: &str) -> bool {
    CANONICAL_RE.is_match(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_month() {
        assert_eq!(normalize("Sep 7, 2024").unwrap(), "2024/09/07");
    }

    #[test]
    fn zero_pads_month_and_day() {
        assert_eq!(normalize("Jan 1, 2023").unwrap(), "2023/01/01");
    }

    #[test]
    fn full_month_and_day_first() {
        assert_eq!(normalize("December 25, 2022").unwrap(), "2022/12/25");
        assert_eq!(normalize("3 Mar 2021").unwrap(), "2021/03/03");
    }

    #[test]
    fn numeric_forms() {
        assert_eq!(normalize("2020-02-29").unwrap(), "2020/02/29");
        assert_eq!(normalize("07/04/2019").unwrap(), "2019/07/04");
    }

    #[test]
    fn surrounding_whitespace_ignored() {
        assert_eq!(normalize("  Oct 10, 2024\n").unwrap(), "2024/10/10");
    }

    #[test]
    fn garbage_is_an_error() {
        assert_eq!(normalize("yesterday"), Err(DateError("yesterday".into())));
        assert!(normalize("").is_err());
        assert!(normalize("Feb 30, 2023").is_err());
    }

    #[test]
    fn output_is_canonical() {
        for raw in ["Sep 7, 2024", "Jan 1, 2023", "2020-02-29"] {
            assert!(is_canonical(&normalize(raw).unwrap()));
        }
        assert!(!is_canonical("Invalid Date"));
    }
}
