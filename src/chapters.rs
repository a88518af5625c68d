//! Chapter markers in video descriptions and chapter timestamps.
//!
//! Creators list chapters as description lines like `05:30 Gradient descent`.
//! These lines become chapter rows and are stripped from the stored
//! description.

use crate::error::{Result, VidseekError};
use regex::Regex;
use std::sync::OnceLock;

fn chapter_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*((?:\d{1,2}:)?\d{1,2}:\d{2})\s+(\S.*?)\s*$").expect("valid chapter regex")
    })
}

/// Parse `(timestamp, title)` pairs from a description, in order.
pub fn extract_chapters(description: &str) -> Vec<(String, String)> {
    description
        .lines()
        .filter_map(|line| {
            let caps = chapter_line_regex().captures(line)?;
            Some((caps[1].to_string(), caps[2].to_string()))
        })
        .collect()
}

/// Remove chapter lines from a description.
pub fn clean_description(description: &str) -> String {
    description
        .lines()
        .filter(|line| !chapter_line_regex().is_match(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Convert `MM:SS` or `HH:MM:SS` into total seconds.
pub fn parse_timestamp(timestamp: &str) -> Result<u32> {
    let invalid = || VidseekError::InvalidTimestamp(timestamp.to_string());

    let parts = timestamp
        .trim()
        .split(':')
        .map(|part| {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            part.parse::<u32>().map_err(|_| invalid())
        })
        .collect::<Result<Vec<u32>>>()?;

    let (hours, minutes, seconds) = match parts.as_slice() {
        [m, s] => (0, *m, *s),
        [h, m, s] if *m < 60 => (*h, *m, *s),
        _ => return Err(invalid()),
    };
    if seconds >= 60 {
        return Err(invalid());
    }

    hours
        .checked_mul(3600)
        .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
        .and_then(|hm| hm.checked_add(seconds))
        .ok_or_else(invalid)
}
