//! `Public-Key-Pins` header compilation.
//!
//! Output layout (directive order is fixed):
//!
//! `<name>: pin-<algo>="<digest>"; ... max-age=<secs>[; includeSubDomains][; report-uri="<uri>"]`
//!
//! The report-only header name is used only when `report_only` is set AND a
//! non-empty report URI is present. `report_only` alone keeps the enforcing name.

use crate::builder::Configuration;

pub const PUBLIC_KEY_PINS: &str = "Public-Key-Pins";
pub const PUBLIC_KEY_PINS_REPORT_ONLY: &str = "Public-Key-Pins-Report-Only";

/// Select the header name for the given directive state.
pub fn header_name(report_only: bool, has_report_uri: bool) -> &'static str {
    if report_only && has_report_uri {
        PUBLIC_KEY_PINS_REPORT_ONLY
    } else {
        PUBLIC_KEY_PINS
    }
}

/// Compile a configuration into a full header line.
///
/// Returns the empty string when no pins are configured, regardless of the
/// other directives.
pub fn compile_header(config: &Configuration) -> String {
    if config.pins.is_empty() {
        return String::new();
    }

    let report_uri = config.report_uri.as_deref().filter(|uri| !uri.is_empty());
    let mut header = String::with_capacity(64 * (config.pins.len() + 1));

    header.push_str(header_name(config.report_only, report_uri.is_some()));
    header.push_str(": ");

    for pin in &config.pins {
        header.push_str("pin-");
        header.push_str(pin.algorithm().as_str());
        header.push('=');
        header.push_str(&json_quote(pin.digest()));
        header.push_str("; ");
    }

    header.push_str("max-age=");
    header.push_str(&config.max_age_seconds.to_string());

    if config.include_subdomains {
        header.push_str("; includeSubDomains");
    }
    // The URI is inserted verbatim.
    if let Some(uri) = report_uri {
        header.push_str("; report-uri=\"");
        header.push_str(uri);
        header.push('"');
    }

    header
}

/// Quote a value as a JSON string literal.
fn json_quote(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

/// A compiled header line split into name and value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLine<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

/// Split `Name: value` at the first `": "`.
///
/// Returns `None` for the empty (no pins) header.
pub fn split_header_line(line: &str) -> Option<HeaderLine<'_>> {
    let (name, value) = line.split_once(": ")?;
    if name.is_empty() {
        return None;
    }
    Some(HeaderLine { name, value })
}
