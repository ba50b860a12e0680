use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;
use unicode_normalization::UnicodeNormalization;

static MONTH_DAY_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?\s+(\d{1,2})(?:st|nd|rd|th)?\s*,?\s*(\d{4})\b",
    )
    .expect("valid month/day/year regex")
});
static SLASHED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").expect("valid slashed date regex")
});
static ISO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").expect("valid iso date regex")
});
static TRAILING_AS_OF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bas\s+of\s*$").expect("valid as-of regex"));

/// Collapse every run of whitespace (including non-breaking spaces) into a
/// single space and trim both ends.
pub fn remove_extra_spaces(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn remove_spaces(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Keeps only alphanumeric characters. Used as an emptiness probe: a cell
/// whose residue is empty carries no data.
pub fn remove_non_alphanumeric(s: &str) -> String {
    s.chars().filter(|c| c.is_alphanumeric()).collect()
}

pub fn remove_commas(s: &str) -> String {
    s.replace(',', "")
}

pub fn remove_line_breaks(s: &str) -> String {
    s.replace("\r\n", " ").replace(['\r', '\n'], " ")
}

/// Normalizes a field for output: NFKC, no line breaks, single spaces.
/// Applying it twice yields the same string.
pub fn prepare_string_for_output(s: &str) -> String {
    let normalized = s.nfkc().collect::<String>();
    remove_extra_spaces(&remove_line_breaks(&normalized))
}

/// Output form of a numeric-looking data cell: commas and dollar signs are
/// dropped, "$ 1,234" becomes "1234".
pub fn clean_value(s: &str) -> String {
    let prepared = prepare_string_for_output(s);
    remove_extra_spaces(&remove_commas(&prepared).replace('$', ""))
}

fn is_numeric_like(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit())
        && s.chars().all(|c| {
            c.is_ascii_digit() || c.is_whitespace() || matches!(c, ',' | '.' | '(' | ')' | '$' | '%' | '-')
        })
}

/// Output form of a data cell. Amounts go through [`clean_value`], a lone
/// "$" placeholder becomes empty, text is only prepared.
pub fn output_value(s: &str) -> String {
    if is_placeholder(s) {
        return String::new();
    }
    let prepared = prepare_string_for_output(s);
    if is_numeric_like(&prepared) {
        clean_value(&prepared)
    } else {
        prepared
    }
}

/// Field as written into CSV. Embedded commas become ';' so the delimiter
/// stays unambiguous.
pub fn csv_field(s: &str) -> String {
    prepare_string_for_output(s).replace(',', ";")
}

/// A lone "$" means the value sits in a neighbouring cell.
pub fn is_placeholder(s: &str) -> bool {
    s.trim() == "$"
}

/// Dash-only cells mean an explicit zero/none, not missing data.
pub fn is_dash_sentinel(s: &str) -> bool {
    let trimmed = s.trim();
    !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| matches!(c, '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2015}'))
}

fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_ascii_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// Locates the first date embedded in `s` and returns its byte range.
pub fn find_date(s: &str) -> Option<(Range<usize>, NaiveDate)> {
    for caps in MONTH_DAY_YEAR.captures_iter(s) {
        let month = month_number(&caps[1]);
        let day = caps[2].parse::<u32>().ok();
        let year = caps[3].parse::<i32>().ok();
        if let (Some(m), Some(d), Some(y)) = (month, day, year) {
            if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
                let whole = caps.get(0)?;
                return Some((whole.range(), date));
            }
        }
    }
    for caps in SLASHED.captures_iter(s) {
        let m = caps[1].parse::<u32>().ok();
        let d = caps[2].parse::<u32>().ok();
        let y = caps[3].parse::<i32>().ok();
        if let (Some(m), Some(d), Some(y)) = (m, d, y) {
            if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
                return Some((caps.get(0)?.range(), date));
            }
        }
    }
    for caps in ISO.captures_iter(s) {
        let y = caps[1].parse::<i32>().ok();
        let m = caps[2].parse::<u32>().ok();
        let d = caps[3].parse::<u32>().ok();
        if let (Some(y), Some(m), Some(d)) = (y, m, d) {
            if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
                return Some((caps.get(0)?.range(), date));
            }
        }
    }
    None
}

/// Best-effort date parse. `None` is the "invalid date" answer, callers keep
/// scanning other strings. Handles "As of March 31, 2020" as well as a bare
/// date.
pub fn parse_loose_date(s: &str) -> Option<NaiveDate> {
    let line = remove_extra_spaces(s);
    if line.is_empty() {
        return None;
    }
    find_date(&line).map(|(_, date)| date)
}

/// Removes the embedded date (and a dangling "as of") from a title fragment.
pub fn strip_date(s: &str) -> String {
    let Some((range, _)) = find_date(s) else {
        return remove_extra_spaces(s);
    };
    let head = TRAILING_AS_OF.replace(&s[..range.start], "");
    let tail = &s[range.end..];
    let joined = format!("{} {}", head, tail);
    remove_extra_spaces(&joined)
        .trim_matches(|c: char| c == ',' || c == '-' || c.is_whitespace())
        .to_string()
}

fn border_width(token: &str) -> Option<f64> {
    match token {
        "thin" | "medium" | "thick" => return Some(1.0),
        _ => {}
    }
    let number: String = token
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if number.is_empty() {
        return None;
    }
    let unit = &token[number.len()..];
    if !unit.chars().all(|c| c.is_ascii_alphabetic() || c == '%') {
        return None;
    }
    number.parse::<f64>().ok()
}

/// True only when the style's bottom border is both `solid` and wider than
/// zero. This is the header/data boundary signal of underline layouts.
pub fn detect_underline(style: &str) -> bool {
    let mut solid = false;
    let mut wide = false;
    for declaration in style.split(';') {
        let Some((property, value)) = declaration.split_once(':') else {
            continue;
        };
        let property = property.trim().to_ascii_lowercase();
        let value = value.trim().to_ascii_lowercase();
        match property.as_str() {
            "border-bottom" => {
                solid = value.split_whitespace().any(|t| t == "solid");
                wide = value
                    .split_whitespace()
                    .filter_map(border_width)
                    .any(|w| w > 0.0);
            }
            "border-bottom-style" => {
                solid = value.split_whitespace().any(|t| t == "solid");
            }
            "border-bottom-width" => {
                wide = value
                    .split_whitespace()
                    .next()
                    .and_then(border_width)
                    .is_some_and(|w| w > 0.0);
            }
            _ => {}
        }
    }
    solid && wide
}

pub fn is_hidden(style: &str) -> bool {
    remove_spaces(style)
        .to_ascii_lowercase()
        .contains("display:none")
}

pub fn is_page_break(style: &str) -> bool {
    let style = remove_spaces(style).to_ascii_lowercase();
    style.contains("page-break-before:always") || style.contains("page-break-after:always")
}
