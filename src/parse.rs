//! Text parsing for the two values the dashboard renders as free text: the
//! reward countdown and the account balance.

use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

use crate::models::Countdown;

static COUNTDOWN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*hours?\s*(\d+)\s*min\s*(\d+)\s*sec").unwrap());

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").unwrap());

/// Extract a countdown from arbitrary page text.
///
/// A non-matching string parses as the zero countdown instead of failing, so
/// a reworded timer degrades into an almost-immediate retry (bounded by the
/// scheduler's safety margin) rather than aborting the cycle.
pub fn parse_countdown(text: &str) -> Countdown {
    if let Some(c) = COUNTDOWN_RE.captures(text) {
        // the capture groups are digit runs, so the parses only fail on overflow
        let num = |i: usize| c[i].parse::<u64>().unwrap_or(0);
        return Countdown {
            hours: num(1),
            minutes: num(2),
            seconds: num(3),
        };
    }
    warn!("unrecognized timer text {text:?}, assuming zero");
    Countdown::default()
}

/// Parse a balance reading like `"1,234.50"`, stripping thousands separators.
///
/// Falls back to 0.0 on garbage, same policy as the countdown: a garbled
/// balance can never corroborate a claim, but it never kills a cycle either.
pub fn parse_balance(text: &str) -> f64 {
    if let Some(m) = NUMBER_RE.find(text) {
        if let Ok(v) = m.as_str().replace(',', "").parse::<f64>() {
            return v;
        }
    }
    warn!("unrecognized balance text {text:?}, assuming zero");
    0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_with_surrounding_text() {
        let c = parse_countdown("Time left to collect 06 hours 23 min 28 sec");
        assert_eq!(
            c,
            Countdown {
                hours: 6,
                minutes: 23,
                seconds: 28
            }
        );
        assert_eq!(c.as_millis(), 22_208_000);
    }

    #[test]
    fn countdown_singular_hour() {
        let c = parse_countdown("1 hour 2 min 3 sec");
        assert_eq!(c.as_millis(), (3600 + 120 + 3) * 1000);
    }

    #[test]
    fn countdown_case_insensitive() {
        let c = parse_countdown("06 HOURS 23 MIN 28 SEC");
        assert_eq!(c.hours, 6);
        assert_eq!(c.minutes, 23);
        assert_eq!(c.seconds, 28);
    }

    #[test]
    fn countdown_garbage_is_zero() {
        assert_eq!(parse_countdown("come back later").as_millis(), 0);
        assert_eq!(parse_countdown("").as_millis(), 0);
    }

    #[test]
    fn countdown_wrong_order_is_zero() {
        assert_eq!(parse_countdown("3 sec 2 min 1 hours").as_millis(), 0);
    }

    #[test]
    fn balance_with_thousands_separator() {
        assert_eq!(parse_balance("1,234.50"), 1234.50);
    }

    #[test]
    fn balance_embedded_in_text() {
        assert_eq!(parse_balance("$ 7.05 USD"), 7.05);
        assert_eq!(parse_balance("12"), 12.0);
    }

    #[test]
    fn balance_garbage_is_zero() {
        assert_eq!(parse_balance("--"), 0.0);
        assert_eq!(parse_balance(""), 0.0);
    }
}
