//! Natural-language date/time resolution.
//!
//! # Responsibility
//! - Convert a date token and a time token into one absolute timestamp.
//! - Substitute documented defaults for absent or malformed tokens.
//!
//! # Invariants
//! - `resolve` is total: malformed input degrades to defaults, never errors.
//! - The output is fully specified (date + hour + minute, seconds = 0).
//! - Default time is 09:00 when no usable time token is given.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};

/// Default reminder hour applied when no time token is present or parseable.
pub const DEFAULT_HOUR: u32 = 9;
/// Default reminder minute paired with [`DEFAULT_HOUR`].
pub const DEFAULT_MINUTE: u32 = 0;

/// How a token contributed to the resolved timestamp.
///
/// Kept in the return value so callers and tests can distinguish an explicit
/// "amanhã às 10h" from a silent default substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenOutcome {
    /// No token was supplied; the default applied.
    Absent,
    /// The token parsed and its value was used.
    Parsed,
    /// The token was present but unusable; the default applied.
    Fallback,
}

/// Fully-resolved due timestamp plus per-token provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueResolution {
    pub due_at: NaiveDateTime,
    pub date: TokenOutcome,
    pub time: TokenOutcome,
}

/// Resolves a date token and a time token against `now`.
///
/// Date policy: absent or "hoje" -> today; "amanhã" -> tomorrow; a
/// `d/m`, `d/m/yy` or `d/m/yyyy` form (separator `-` or `/`) parses as
/// day-month-year with two-digit years normalized by adding 2000; anything
/// else, including impossible calendar dates, falls back to today.
///
/// Time policy: absent -> 09:00; `H`, `H:MM` or `HhMM` forms parse with
/// separator `:`, `h` or `H` (a bare trailing `h`, as in "10h", means
/// minute zero); out-of-range or unparseable values fall back to 09:00.
pub fn resolve(
    date_token: Option<&str>,
    time_token: Option<&str>,
    now: NaiveDateTime,
) -> DueResolution {
    let (date, date_outcome) = resolve_date(date_token, now.date());
    let (time, time_outcome) = resolve_time(time_token);
    DueResolution {
        due_at: date.and_time(time),
        date: date_outcome,
        time: time_outcome,
    }
}

fn resolve_date(token: Option<&str>, today: NaiveDate) -> (NaiveDate, TokenOutcome) {
    let Some(raw) = token else {
        return (today, TokenOutcome::Absent);
    };

    let normalized = raw.trim().to_lowercase();
    match normalized.as_str() {
        "hoje" => (today, TokenOutcome::Parsed),
        "amanhã" => (
            today.checked_add_days(Days::new(1)).unwrap_or(today),
            TokenOutcome::Parsed,
        ),
        other => match parse_numeric_date(other, today) {
            Some(date) => (date, TokenOutcome::Parsed),
            None => (today, TokenOutcome::Fallback),
        },
    }
}

/// Parses `d/m`, `d/m/yy` or `d/m/yyyy` (separator `-` or `/`).
fn parse_numeric_date(token: &str, today: NaiveDate) -> Option<NaiveDate> {
    let parts: Vec<&str> = token.split(['-', '/']).collect();
    if parts.len() < 2 || parts.len() > 3 {
        return None;
    }

    let day: u32 = parts[0].parse().ok()?;
    let month: u32 = parts[1].parse().ok()?;
    let mut year: i32 = match parts.get(2) {
        Some(part) => part.parse().ok()?,
        None => chrono::Datelike::year(&today),
    };
    if (0..100).contains(&year) {
        year += 2000;
    }

    // from_ymd_opt rejects impossible dates such as 31/02.
    NaiveDate::from_ymd_opt(year, month, day)
}

fn resolve_time(token: Option<&str>) -> (NaiveTime, TokenOutcome) {
    let default = default_time();
    let Some(raw) = token else {
        return (default, TokenOutcome::Absent);
    };

    match parse_time(raw.trim()) {
        Some(time) => (time, TokenOutcome::Parsed),
        None => (default, TokenOutcome::Fallback),
    }
}

/// Parses `H`, `H:MM` or `HhMM`; a trailing bare separator means `:00`.
fn parse_time(token: &str) -> Option<NaiveTime> {
    let mut parts = token.splitn(2, [':', 'h', 'H']);
    let hour: u32 = parts.next()?.parse().ok()?;
    let minute: u32 = match parts.next() {
        None | Some("") => 0,
        Some(rest) => rest.parse().ok()?,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn default_time() -> NaiveTime {
    // Statically valid; the expect can only fire if the constants change.
    NaiveTime::from_hms_opt(DEFAULT_HOUR, DEFAULT_MINUTE, 0)
        .expect("default reminder time is a valid time of day")
}

#[cfg(test)]
mod tests {
    use super::{resolve, TokenOutcome};
    use chrono::NaiveDate;

    fn now() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn both_tokens_absent_defaults_to_today_at_nine() {
        let resolved = resolve(None, None, now());
        assert_eq!(resolved.due_at, at(2025, 1, 15, 9, 0));
        assert_eq!(resolved.date, TokenOutcome::Absent);
        assert_eq!(resolved.time, TokenOutcome::Absent);
    }

    #[test]
    fn hoje_and_amanha_resolve_relative_to_now() {
        assert_eq!(
            resolve(Some("hoje"), None, now()).due_at,
            at(2025, 1, 15, 9, 0)
        );
        assert_eq!(
            resolve(Some("amanhã"), None, now()).due_at,
            at(2025, 1, 16, 9, 0)
        );
    }

    #[test]
    fn amanha_crosses_month_boundary() {
        let eom = NaiveDate::from_ymd_opt(2025, 1, 31)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        assert_eq!(
            resolve(Some("amanhã"), None, eom).due_at,
            at(2025, 2, 1, 9, 0)
        );
    }

    #[test]
    fn numeric_dates_parse_day_month_year() {
        assert_eq!(
            resolve(Some("20/12"), Some("14:30"), now()).due_at,
            at(2025, 12, 20, 14, 30)
        );
        assert_eq!(
            resolve(Some("25/05/2026"), Some("10"), now()).due_at,
            at(2026, 5, 25, 10, 0)
        );
        assert_eq!(
            resolve(Some("1-3-27"), None, now()).due_at,
            at(2027, 3, 1, 9, 0)
        );
    }

    #[test]
    fn impossible_calendar_date_falls_back_to_today() {
        let resolved = resolve(Some("31/02"), None, now());
        assert_eq!(resolved.due_at, at(2025, 1, 15, 9, 0));
        assert_eq!(resolved.date, TokenOutcome::Fallback);
    }

    #[test]
    fn garbage_date_token_falls_back_to_today() {
        let resolved = resolve(Some("depois"), Some("8h"), now());
        assert_eq!(resolved.due_at, at(2025, 1, 15, 8, 0));
        assert_eq!(resolved.date, TokenOutcome::Fallback);
        assert_eq!(resolved.time, TokenOutcome::Parsed);
    }

    #[test]
    fn time_forms_parse_with_all_separators() {
        assert_eq!(resolve(None, Some("8"), now()).due_at, at(2025, 1, 15, 8, 0));
        assert_eq!(
            resolve(None, Some("14:30"), now()).due_at,
            at(2025, 1, 15, 14, 30)
        );
        assert_eq!(
            resolve(None, Some("10h30"), now()).due_at,
            at(2025, 1, 15, 10, 30)
        );
        assert_eq!(
            resolve(None, Some("17H"), now()).due_at,
            at(2025, 1, 15, 17, 0)
        );
        assert_eq!(
            resolve(None, Some("10h"), now()).due_at,
            at(2025, 1, 15, 10, 0)
        );
    }

    #[test]
    fn out_of_range_time_falls_back_to_default() {
        let resolved = resolve(None, Some("25:70"), now());
        assert_eq!(resolved.due_at, at(2025, 1, 15, 9, 0));
        assert_eq!(resolved.time, TokenOutcome::Fallback);
    }
}
