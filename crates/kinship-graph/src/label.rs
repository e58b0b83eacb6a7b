use chrono::{Datelike, NaiveDate};
use kinship_core::Person;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameLabel {
    /// Short text drawn on the node; may span two lines.
    pub display: String,
    /// Full text for hover.
    pub hover: String,
}

/// Normalizes a stored display name.
///
/// `Base\n(Nick)`, with either a literal backslash-n or a real newline,
/// becomes a two-line label with hover `Base (Nick)`. Any other name is
/// shortened to its first and last words and the hover keeps it whole.
/// Shortening only affects the drawn label: the full stored name always
/// reaches the scene as `metadata.hover` and `metadata.display_name`.
pub fn normalize_name(raw: &str) -> NameLabel {
    let raw = raw.trim();

    let split = raw
        .split_once("\\n(")
        .or_else(|| raw.split_once("\n("));
    if let Some((base, rest)) = split {
        let base = base.trim_end();
        let nick = rest.trim_end_matches(')');
        return NameLabel {
            display: format!("{base}\n({nick})"),
            hover: format!("{base} ({nick})"),
        };
    }

    let mut words = raw.split_whitespace();
    let display = match (words.next(), words.next_back()) {
        (Some(first), Some(last)) => format!("{first} {last}"),
        (Some(first), None) => first.to_string(),
        _ => String::new(),
    };
    NameLabel {
        display,
        hover: raw.to_string(),
    }
}

/// Year of a stored date: ISO `YYYY-MM-DD` first, then a leading
/// four-digit year such as `1901` or `1901-03`.
pub fn year_of(date: &str) -> Option<i32> {
    let date = date.trim();
    if let Ok(parsed) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return Some(parsed.year());
    }
    let digits = date.get(..4)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if date.as_bytes().get(4).is_some_and(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// `1901-1980`, `b. 1901` or `d. 1980`; `None` without any usable year.
pub fn lifespan(person: &Person) -> Option<String> {
    let born = person.birth_date.as_deref().and_then(year_of);
    let died = person.death_date.as_deref().and_then(year_of);
    match (born, died) {
        (Some(b), Some(d)) => Some(format!("{b}-{d}")),
        (Some(b), None) => Some(format!("b. {b}")),
        (None, Some(d)) => Some(format!("d. {d}")),
        (None, None) => None,
    }
}

/// Node label: normalized name plus a lifespan line. Falls back to the id
/// when the name is blank.
pub fn node_label(person: &Person) -> NameLabel {
    let mut label = normalize_name(&person.display_name);
    if label.display.is_empty() {
        label.display = person.id.to_string();
        label.hover = person.id.to_string();
    }
    if let Some(years) = lifespan(person) {
        label.display = format!("{}\n{}", label.display, years);
        label.hover = format!("{} ({})", label.hover, years);
    }
    label
}
