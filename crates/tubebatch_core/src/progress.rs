//! Normalizes the download engine's free-form progress text.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static ANSI_ESCAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]").expect("valid ansi pattern"));
static PERCENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(-?\d+(?:\.\d+)?)\s*%").expect("valid percent pattern"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no percentage in progress text {raw:?}")]
pub struct ProgressParseError {
    pub raw: String,
}

pub fn strip_ansi(raw: &str) -> String {
    ANSI_ESCAPE.replace_all(raw, "").into_owned()
}

/// Extracts a whole percentage from text such as `"\x1b[0;94m 42.7%\x1b[0m"`
/// or `"[download]  12.5% of 3.1MiB"`. Fractions are truncated and values
/// above 100 are clamped.
pub fn parse_percent(raw: &str) -> Result<u8, ProgressParseError> {
    let cleaned = strip_ansi(raw);
    let cleaned = cleaned.trim();

    let number = match PERCENT.captures(cleaned) {
        Some(caps) => caps[1].parse::<f64>().ok(),
        None => cleaned.parse::<f64>().ok(),
    };

    match number {
        Some(value) if value.is_finite() && value >= 0.0 => Ok(value.min(100.0) as u8),
        _ => Err(ProgressParseError {
            raw: raw.to_string(),
        }),
    }
}

/// Whole-batch completion after `completed` of `total` items, rounded down.
pub fn overall_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total);
    ((completed * 100) / total) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_color_sequences() {
        assert_eq!(strip_ansi("\x1b[0;94m 42.7%\x1b[0m"), " 42.7%");
    }

    #[test]
    fn overall_is_floored() {
        assert_eq!(overall_percent(1, 3), 33);
        assert_eq!(overall_percent(2, 3), 66);
        assert_eq!(overall_percent(3, 3), 100);
        assert_eq!(overall_percent(0, 0), 0);
    }
}
