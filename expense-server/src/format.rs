//! Display and URL formatting helpers.

use std::fmt::Write as _;

use crate::domain::Fare;

/// Insert comma thousands separators into a run of ASCII digits.
pub fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format a fare for display: `1234` → `"1,234"`, `1234.5` → `"1,234.50"`.
pub fn format_currency(fare: Fare) -> String {
    let whole = group_thousands(&fare.yen().to_string());
    if fare.is_whole() {
        whole
    } else {
        format!("{whole}.{:02}", fare.hundredths() % 100)
    }
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
pub fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len() * 3);
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            out.push(byte as char);
        } else {
            let _ = write!(out, "%{byte:02X}");
        }
    }
    out
}
