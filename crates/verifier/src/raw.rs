//! Raw payload extraction.
//!
//! Content addresses and payload signatures are computed over the exact
//! bytes the writer serialized, so the payload object must be carved out of
//! the store record as a verbatim substring. Parsing and re-serializing
//! would normalize whitespace and field order and break both checks.

use crate::error::{VerifyError, VerifyResult};

/// Extracts the named JSON object from `data` as a verbatim substring.
///
/// Scans forward from `"label":` and returns the brace-balanced object that
/// follows, preserving its exact formatting.
///
/// # Errors
///
/// Returns [`VerifyError::MalformedRecord`] if the label is missing or the
/// object's braces never balance.
pub fn payload_text(data: &str, label: &str) -> VerifyResult<String> {
    let query = format!("\"{label}\":");

    let start = data
        .find(&query)
        .ok_or_else(|| VerifyError::malformed_record(format!("missing {label} in record")))?
        + query.len();

    let mut depth = 0i32;
    let mut object_start = None;
    let mut end = None;

    for (offset, ch) in data[start..].char_indices() {
        match ch {
            '{' => {
                // Whitespace may separate the colon from the object; the
                // substring starts at the opening brace, not after the colon.
                if object_start.is_none() {
                    object_start = Some(start + offset);
                }
                depth += 1;
            },
            '}' => {
                depth -= 1;
                if object_start.is_some() && depth == 0 {
                    end = Some(start + offset + 1);
                    break;
                }
            },
            _ => {},
        }
    }

    match (object_start, end) {
        (Some(from), Some(to)) => Ok(data[from..to].to_string()),
        _ => Err(VerifyError::malformed_record(format!(
            "failed to extract {label} from record"
        ))),
    }
}
