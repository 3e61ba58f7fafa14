//! Locale-flavoured formatting of the numbers and dates printed on documents.
//!
//! Only two conventions are needed: en-IN for invoices (`DD/MM/YYYY`, lakh
//! digit grouping) and en-US for prescriptions (`MM/DD/YYYY`). All functions
//! are pure, so the same request always produces the same strings.

use chrono::{DateTime, FixedOffset, NaiveDate};

/// Placeholder printed in place of missing identity values
pub const NOT_AVAILABLE: &str = "N/A";

/// `INR` followed by the amount with two decimals and Indian digit grouping,
/// e.g. `INR 1,23,456.00`
pub fn format_currency(amount: f64) -> String {
    let rounded = format!("{:.2}", amount.abs());
    let (whole, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));
    let negative = amount < 0.0 && rounded.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    format!(
        "INR {}{}.{}",
        if negative { "-" } else { "" },
        group_indian(whole),
        fraction
    )
}

/// Groups the last three digits, then every two digits before them
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

/// Plain number formatting: integers without a decimal point, everything else
/// with as many digits as it needs
pub fn format_number(value: f64) -> String {
    format!("{value}")
}

fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(input)
                .ok()
                .map(|d| d.date_naive())
        })
}

/// The request's own date as a UTC midnight timestamp, for document
/// metadata. Derived from the request only, so renders stay reproducible.
pub fn document_date(input: &str) -> Option<DateTime<FixedOffset>> {
    let midnight = parse_date(input)?.and_hms_opt(0, 0, 0)?;
    Some(midnight.and_utc().fixed_offset())
}

fn format_date_with(input: &str, pattern: &str) -> String {
    if input.trim().is_empty() {
        return NOT_AVAILABLE.to_string();
    }
    match parse_date(input) {
        Some(date) => date.format(pattern).to_string(),
        None => {
            log::debug!("leaving unparseable date {input:?} as written");
            input.to_string()
        }
    }
}

/// en-IN style `DD/MM/YYYY`
pub fn format_date_in(input: &str) -> String {
    format_date_with(input, "%d/%m/%Y")
}

/// en-US style `MM/DD/YYYY`
pub fn format_date_us(input: &str) -> String {
    format_date_with(input, "%m/%d/%Y")
}
