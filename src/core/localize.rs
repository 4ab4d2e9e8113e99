//! Event localization.
//!
//! Produces a human-readable interval string for an event according to
//! locale, timezone and all-day/timed status. The date/time patterns
//! are derived from the locale's own POSIX `LC_TIME` data by string
//! surgery: the locale library is the authority on the raw patterns,
//! this module only owns the rewriting. `D_T_FMT` already encodes the
//! locale's date/time ordering, so rewriting it in place keeps that
//! ordering intact.

use chrono::Duration;
use chrono::format::Locale;
use chrono_tz::Tz;
use pure_rust_locales::locale_match;

use super::error::CalError;
use crate::feed::CalendarEvent;

/// Parse a BCP-47-like tag ("en_GB", "de-DE") into a locale. Hyphens
/// are normalized to underscores before lookup.
pub fn parse_locale(tag: &str) -> Result<Locale, CalError> {
    let normalized = tag.trim().replace('-', "_");
    Locale::try_from(normalized.as_str())
        .map_err(|_| CalError::InvalidParameter(format!("unknown locale '{}'", tag)))
}

/// The compact "weekday + day + short month" pattern for a locale:
/// `D_T_FMT` with the month name shortened, year/time/zone tokens
/// dropped along with their leading separators, and a weekday
/// abbreviation prefixed when the locale pattern lacks one.
pub fn compact_date_pattern(locale: Locale) -> String {
    let full = locale_match!(locale => LC_TIME::D_T_FMT);
    ensure_weekday(rewrite_pattern(full, false))
}

/// The locale's short time pattern: `T_FMT` with seconds stripped.
pub fn short_time_pattern(locale: Locale) -> String {
    let time = locale_match!(locale => LC_TIME::T_FMT);
    let time = time
        .replace("%T", "%H:%M:%S")
        .replace("%R", "%H:%M")
        .replace("%r", "%I:%M:%S %p");
    let time = time.replace(":%S", "").replace(".%S", "").replace("%S", "");
    time.trim().to_string()
}

/// The long combined pattern: the same `D_T_FMT` rewrite but keeping
/// the (shortened) time tokens, preserving the locale's own ordering
/// of date and time.
pub fn long_datetime_pattern(locale: Locale) -> String {
    let full = locale_match!(locale => LC_TIME::D_T_FMT);
    ensure_weekday(rewrite_pattern(full, true))
}

fn ensure_weekday(pattern: String) -> String {
    if pattern.contains("%a") {
        pattern
    } else {
        format!("%a {}", pattern)
    }
}

/// Rewrite a strftime pattern keeping only the compact date tokens and,
/// when `keep_time` is set, the shortened time-of-day tokens. Literal
/// separators survive only between two kept tokens.
fn rewrite_pattern(pattern: &str, keep_time: bool) -> String {
    let mut out = String::new();
    let mut pending = String::new();
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            pending.push(c);
            continue;
        }
        // Padding and alternate-form flags stay attached to their token
        let mut flags = String::new();
        while let Some(&f) = chars.peek() {
            if matches!(f, '-' | '_' | '0' | '^' | '#' | 'E' | 'O') {
                flags.push(f);
                chars.next();
            } else {
                break;
            }
        }
        let Some(conv) = chars.next() else { break };
        if conv == '%' {
            pending.push_str("%%");
            continue;
        }
        match rewrite_token(&flags, conv, keep_time) {
            Some(token) => {
                if !out.is_empty() {
                    out.push_str(&pending);
                }
                pending.clear();
                out.push_str(&token);
            }
            None => pending.clear(),
        }
    }

    out.trim_matches([' ', ',']).to_string()
}

fn rewrite_token(flags: &str, conv: char, keep_time: bool) -> Option<String> {
    match conv {
        // Weekday, always abbreviated
        'a' | 'A' => Some("%a".to_string()),
        // Day of month, padding preserved
        'd' | 'e' => Some(format!("%{}{}", flags, conv)),
        // Month name shortened, numeric month kept as-is
        'b' | 'h' | 'B' => Some("%b".to_string()),
        'm' => Some(format!("%{}m", flags)),
        // Composite time tokens expand to their short form
        'T' | 'X' | 'R' => keep_time.then(|| "%H:%M".to_string()),
        'r' => keep_time.then(|| "%I:%M %p".to_string()),
        'H' | 'k' | 'I' | 'l' | 'M' | 'p' | 'P' => {
            keep_time.then(|| format!("%{}{}", flags, conv))
        }
        // Years, seconds, zones and anything exotic are dropped
        _ => None,
    }
}

/// Localize an event into a human-readable interval string.
///
/// All-day events render as one or two compact dates; the exclusive
/// end boundary is pulled back one second so the range lands on the
/// last actual day. Timed events render the start in the long form and
/// repeat the date on the end side only when the event crosses
/// midnight in the display zone.
pub fn localize(event: &CalendarEvent, locale: Locale, tz: Tz) -> String {
    let date_pattern = compact_date_pattern(locale);

    if event.all_day {
        let display_end = event.end - Duration::seconds(1);
        let start_day = event.start.with_timezone(&tz).date_naive();
        let end_day = display_end.with_timezone(&tz).date_naive();
        let start = start_day.format_localized(&date_pattern, locale).to_string();
        if start_day == end_day {
            return start;
        }
        let end = end_day.format_localized(&date_pattern, locale).to_string();
        return format!("{} - {}", start, end);
    }

    let long_pattern = long_datetime_pattern(locale);
    let start = event.start.with_timezone(&tz);
    let end = event.end.with_timezone(&tz);
    let start_formatted = start.format_localized(&long_pattern, locale).to_string();
    let end_formatted = if start.date_naive() == end.date_naive() {
        // Same calendar day, don't repeat the date
        let time_pattern = short_time_pattern(locale);
        end.format_localized(&time_pattern, locale).to_string()
    } else {
        end.format_localized(&long_pattern, locale).to_string()
    };
    format!("{} - {}", start_formatted, end_formatted)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono_tz::Tz;

    use super::*;

    fn timed_event(
        start: (i32, u32, u32, u32, u32),
        end: (i32, u32, u32, u32, u32),
    ) -> CalendarEvent {
        let (sy, smo, sd, sh, smi) = start;
        let (ey, emo, ed, eh, emi) = end;
        CalendarEvent {
            summary: "Test Event".to_string(),
            start: chrono_tz::UTC.with_ymd_and_hms(sy, smo, sd, sh, smi, 0).unwrap(),
            end: chrono_tz::UTC.with_ymd_and_hms(ey, emo, ed, eh, emi, 0).unwrap(),
            all_day: false,
        }
    }

    fn all_day_event(start: (i32, u32, u32), end: (i32, u32, u32)) -> CalendarEvent {
        let (sy, smo, sd) = start;
        let (ey, emo, ed) = end;
        CalendarEvent {
            summary: "Test Event".to_string(),
            start: chrono_tz::UTC.with_ymd_and_hms(sy, smo, sd, 0, 0, 0).unwrap(),
            end: chrono_tz::UTC.with_ymd_and_hms(ey, emo, ed, 0, 0, 0).unwrap(),
            all_day: true,
        }
    }

    #[test]
    fn test_compact_pattern_for_en_gb() {
        assert_eq!(compact_date_pattern(Locale::en_GB), "%a %d %b");
        assert_eq!(short_time_pattern(Locale::en_GB), "%H:%M");
        assert_eq!(long_datetime_pattern(Locale::en_GB), "%a %d %b %H:%M");
    }

    #[test]
    fn test_derived_patterns_drop_year_and_zone() {
        for locale in [Locale::en_GB, Locale::de_DE, Locale::fr_FR] {
            let compact = compact_date_pattern(locale);
            assert!(compact.starts_with("%a"), "{:?}: {}", locale, compact);
            assert!(compact.contains("%b"), "{:?}: {}", locale, compact);
            for dropped in ["%Y", "%y", "%Z", "%H", "%T", "%S"] {
                assert!(!compact.contains(dropped), "{:?}: {}", locale, compact);
            }

            let long = long_datetime_pattern(locale);
            assert!(!long.contains("%Y"), "{:?}: {}", locale, long);
            assert!(!long.contains("%Z"), "{:?}: {}", locale, long);
            assert!(!long.contains("%S"), "{:?}: {}", locale, long);
        }
    }

    #[test]
    fn test_timed_event_same_day_omits_end_date() {
        let event = timed_event((2024, 1, 1, 10, 0), (2024, 1, 1, 11, 0));
        let interval = localize(&event, Locale::en_GB, chrono_tz::UTC);
        assert_eq!(interval, "Mon 01 Jan 10:00 - 11:00");
    }

    #[test]
    fn test_timed_event_crossing_midnight_repeats_date() {
        let event = timed_event((2024, 1, 1, 23, 0), (2024, 1, 2, 1, 0));
        let interval = localize(&event, Locale::en_GB, chrono_tz::UTC);
        assert_eq!(interval, "Mon 01 Jan 23:00 - Tue 02 Jan 01:00");
    }

    #[test]
    fn test_all_day_single_day_has_no_range() {
        // End boundary is exclusive, so one calendar day ends at the
        // start of the next
        let event = all_day_event((2024, 1, 1), (2024, 1, 2));
        let interval = localize(&event, Locale::en_GB, chrono_tz::UTC);
        assert_eq!(interval, "Mon 01 Jan");
    }

    #[test]
    fn test_all_day_spanning_two_days() {
        let event = all_day_event((2024, 1, 1), (2024, 1, 3));
        let interval = localize(&event, Locale::en_GB, chrono_tz::UTC);
        assert_eq!(interval, "Mon 01 Jan - Tue 02 Jan");
    }

    #[test]
    fn test_timed_event_renders_in_display_zone() {
        let event = timed_event((2024, 1, 1, 10, 0), (2024, 1, 1, 11, 0));
        let tz: Tz = "Europe/Berlin".parse().unwrap();
        let interval = localize(&event, Locale::en_GB, tz);
        assert_eq!(interval, "Mon 01 Jan 11:00 - 12:00");
    }

    #[test]
    fn test_localize_is_idempotent() {
        let event = timed_event((2024, 1, 1, 10, 0), (2024, 1, 1, 11, 0));
        let first = localize(&event, Locale::fr_FR, chrono_tz::UTC);
        let second = localize(&event, Locale::fr_FR, chrono_tz::UTC);
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_locale_normalizes_hyphens() {
        assert!(parse_locale("en-GB").is_ok());
        assert!(parse_locale("de_DE").is_ok());
        let err = parse_locale("xx_XX").unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
