//! Feed fetching and filtering.
//!
//! Thin glue around the external collaborators: reqwest fetches the
//! .ics body (or the filesystem serves a relative reference), the
//! icalendar parser reads VEVENTs, and the rrule crate expands
//! recurrences. Returns events whose occurrences overlap the
//! [now, window_end) window, in the requested display zone.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use icalendar::parser::{Component, read_calendar, unfold};
use icalendar::{CalendarDateTime, DatePerhapsTime};
use rrule::RRuleSet;
use serde::Serialize;

/// A single event occurrence in the display timezone. The end is
/// exclusive for all-day events.
#[derive(Clone, Debug, Serialize)]
pub struct CalendarEvent {
    pub summary: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub all_day: bool,
}

impl CalendarEvent {
    fn overlaps(&self, now: DateTime<Tz>, window_end: DateTime<Tz>) -> bool {
        self.end > now && self.start < window_end
    }
}

/// Fetch a feed and return the events overlapping [now, window_end).
pub async fn fetch_events(
    url: &str,
    tz: Tz,
    now: DateTime<Tz>,
    window_end: DateTime<Tz>,
) -> Result<Vec<CalendarEvent>> {
    let body = fetch_body(url).await?;
    let events = parse_and_filter(&body, tz, now, window_end)?;
    tracing::debug!("Fetched {} events in window from {}", events.len(), url);
    Ok(events)
}

async fn fetch_body(url: &str) -> Result<String> {
    if url.starts_with("http://") || url.starts_with("https://") {
        let resp = reqwest::get(url)
            .await
            .with_context(|| format!("Failed to fetch calendar from {}", url))?
            .error_for_status()?;
        Ok(resp.text().await?)
    } else {
        // An unqualified reference is read from the local filesystem
        tokio::fs::read_to_string(url)
            .await
            .with_context(|| format!("Failed to read calendar file {}", url))
    }
}

fn parse_and_filter(
    body: &str,
    tz: Tz,
    now: DateTime<Tz>,
    window_end: DateTime<Tz>,
) -> Result<Vec<CalendarEvent>> {
    let unfolded = unfold(body);
    let calendar =
        read_calendar(&unfolded).map_err(|e| anyhow!("Failed to parse calendar: {}", e))?;

    let mut events = Vec::new();
    for vevent in calendar.components.iter().filter(|c| c.name == "VEVENT") {
        let Some(dtstart) = vevent
            .find_prop("DTSTART")
            .and_then(|p| DatePerhapsTime::try_from(p).ok())
        else {
            tracing::warn!("Skipping VEVENT without a parseable DTSTART");
            continue;
        };
        let summary = vevent
            .find_prop("SUMMARY")
            .map(|p| p.val.to_string())
            .unwrap_or_else(|| "(No title)".to_string());
        let all_day = matches!(dtstart, DatePerhapsTime::Date(_));

        let start = to_display_zone(&dtstart, tz)?;
        let end = match vevent
            .find_prop("DTEND")
            .and_then(|p| DatePerhapsTime::try_from(p).ok())
        {
            Some(dtend) => to_display_zone(&dtend, tz)?,
            // All-day events without DTEND cover one exclusive day
            None if all_day => start + Duration::days(1),
            None => start,
        };

        let master = CalendarEvent {
            summary,
            start,
            end,
            all_day,
        };

        match vevent.find_prop("RRULE") {
            Some(rrule_prop) => {
                let rrule_value = rrule_prop.val.to_string();
                let instances =
                    expand_recurring(&master, &dtstart, &rrule_value, vevent, tz, now, window_end)
                        .with_context(|| {
                            format!("Failed to expand recurrence for '{}'", master.summary)
                        })?;
                events.extend(instances);
            }
            None => {
                if master.overlaps(now, window_end) {
                    events.push(master);
                }
            }
        }
    }

    Ok(events)
}

/// Convert an iCalendar date-or-datetime into the display zone. Dates
/// become local midnight, floating times are read in the display zone,
/// zoned times are converted from their own zone.
fn to_display_zone(dpt: &DatePerhapsTime, tz: Tz) -> Result<DateTime<Tz>> {
    match dpt {
        DatePerhapsTime::Date(d) => local_midnight(*d, tz),
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => Ok(dt.with_timezone(&tz)),
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => resolve_local(*naive, tz),
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
            let source_tz: Tz = tzid
                .parse()
                .map_err(|_| anyhow!("Unknown timezone '{}' in feed", tzid))?;
            Ok(resolve_local(*date_time, source_tz)?.with_timezone(&tz))
        }
    }
}

fn resolve_local(naive: NaiveDateTime, tz: Tz) -> Result<DateTime<Tz>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| anyhow!("Nonexistent local time {} in {}", naive, tz))
}

fn local_midnight(date: NaiveDate, tz: Tz) -> Result<DateTime<Tz>> {
    resolve_local(date.and_time(NaiveTime::MIN), tz)
}

/// Expand an RRULE (honoring EXDATE) into duration-preserving
/// instances overlapping the window. Expansion is bounded to keep a
/// pathological feed from spinning.
fn expand_recurring(
    master: &CalendarEvent,
    dtstart: &DatePerhapsTime,
    rrule_value: &str,
    vevent: &Component,
    tz: Tz,
    now: DateTime<Tz>,
    window_end: DateTime<Tz>,
) -> Result<Vec<CalendarEvent>> {
    let mut lines = vec![dtstart_line(dtstart), format!("RRULE:{}", rrule_value)];
    for exdate in vevent.properties.iter().filter(|p| p.name == "EXDATE") {
        let params: Vec<String> = exdate
            .params
            .iter()
            .filter(|p| p.key == "TZID" || p.key == "VALUE")
            .filter_map(|p| p.val.as_ref().map(|v| format!(";{}={}", p.key, v)))
            .collect();
        lines.push(format!("EXDATE{}:{}", params.join(""), exdate.val));
    }
    let rrule_set: RRuleSet = lines
        .join("\n")
        .parse()
        .map_err(|e| anyhow!("Unparseable recurrence rule: {}", e))?;

    let duration = master.end - master.start;
    let day_span = (master.end.date_naive() - master.start.date_naive()).num_days();

    // Widen the range start by the event duration so an occurrence
    // already underway still lands in the window
    let range_tz: rrule::Tz = Utc.into();
    let after = (now.with_timezone(&Utc) - duration - Duration::seconds(1)).with_timezone(&range_tz);
    let before = (window_end.with_timezone(&Utc) + Duration::seconds(1)).with_timezone(&range_tz);
    let result = rrule_set.after(after).before(before).all(1000);

    let mut instances = Vec::new();
    for occurrence in &result.dates {
        let (start, end) = if master.all_day {
            let day = occurrence.date_naive();
            let start = local_midnight(day, tz)?;
            let end = local_midnight(day + Duration::days(day_span.max(1)), tz)?;
            (start, end)
        } else {
            let start = occurrence.with_timezone(&tz);
            (start, start + duration)
        };
        let instance = CalendarEvent {
            summary: master.summary.clone(),
            start,
            end,
            all_day: master.all_day,
        };
        if instance.overlaps(now, window_end) {
            instances.push(instance);
        }
    }
    Ok(instances)
}

/// Rebuild the DTSTART line the rrule parser expects, preserving the
/// master's time representation.
fn dtstart_line(dtstart: &DatePerhapsTime) -> String {
    match dtstart {
        DatePerhapsTime::Date(d) => format!("DTSTART:{}T000000Z", d.format("%Y%m%d")),
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => {
            format!("DTSTART:{}", dt.format("%Y%m%dT%H%M%SZ"))
        }
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => {
            format!("DTSTART:{}Z", naive.format("%Y%m%dT%H%M%S"))
        }
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
            format!("DTSTART;TZID={}:{}", tzid, date_time.format("%Y%m%dT%H%M%S"))
        }
    }
}
