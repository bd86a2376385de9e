//! Lenient JSON parsing for payloads with truncated surrogate escapes.
//!
//! Some payloads arrive with a trailing `\uXXXX` escape that is half of a
//! surrogate pair, typically an emoji cut off by an upstream length limit.
//! Standard JSON parsers reject the whole document for a single broken
//! escape, so record materialization runs a repair pre-pass that drops the
//! incomplete escape and parses again.

use regex_lite::{Captures, Regex};

use crate::error::Result;

/// Parse JSON text, repairing truncated surrogate escapes on failure.
///
/// The happy path is a plain `serde_json` parse. Only when that fails is
/// the repair pass attempted; if the pass changes nothing, the original
/// parse error is surfaced.
pub fn parse_lenient(text: &str) -> Result<serde_json::Value> {
    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(parse_err) => {
            let repaired = strip_truncated_surrogates(text);
            if repaired == text {
                return Err(parse_err.into());
            }
            serde_json::from_str(&repaired).map_err(Into::into)
        }
    }
}

/// Drop an unpaired surrogate escape from the end of any run of `\uXXXX`
/// escapes that terminates a JSON string.
fn strip_truncated_surrogates(text: &str) -> String {
    let run_re = Regex::new(r#"((?:\\u[0-9a-fA-F]{4})+)""#).unwrap();

    run_re
        .replace_all(text, |caps: &Captures| {
            let run = &caps[1];
            // Each escape is exactly 6 ASCII chars: \uXXXX.
            let units: Vec<u16> = run
                .as_bytes()
                .chunks(6)
                .map(|esc| {
                    let hex = std::str::from_utf8(&esc[2..]).unwrap();
                    u16::from_str_radix(hex, 16).unwrap()
                })
                .collect();

            let mut keep = units.len();
            if let Some(&last) = units.last() {
                let lone_high = is_high_surrogate(last);
                let lone_low = is_low_surrogate(last)
                    && (units.len() < 2 || !is_high_surrogate(units[units.len() - 2]));
                if lone_high || lone_low {
                    keep -= 1;
                }
            }

            format!("{}\"", &run[..keep * 6])
        })
        .into_owned()
}

fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..=0xDBFF).contains(&unit)
}

fn is_low_surrogate(unit: u16) -> bool {
    (0xDC00..=0xDFFF).contains(&unit)
}
