//! Today's agenda merged from several iCalendar feeds

use std::sync::Arc;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use ical::IcalParser;
use ical::property::Property;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{SourceError, SourceResult, Transport};

/// URLs left over from the sample configuration
const PLACEHOLDER_PREFIXES: &[&str] = &["https://calendar.google.com/calendar/ical/xxxxx"];

const DATE_FORMAT: &str = "%Y%m%d";
const DATE_LEN: usize = 8;
const DATE_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";
const UNTITLED: &str = "(untitled)";

/// A configured iCalendar feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarSource {
    pub label: String,

    /// Emoji shown next to events on devices that can render it
    #[serde(default)]
    pub icon: String,

    pub url: String,
}

impl CalendarSource {
    /// Whether the URL is empty or still the sample placeholder
    pub fn is_placeholder(&self) -> bool {
        let url = self.url.trim();
        url.is_empty() || PLACEHOLDER_PREFIXES.iter().any(|p| url.starts_with(p))
    }
}

/// One event happening today
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    /// Local start time, `None` for all-day events
    pub time_of_day: Option<NaiveTime>,
    pub title: String,
    pub calendar_label: String,
    pub calendar_icon: String,
}

/// Rewrite webcal:// subscription links to https://
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    for scheme in ["webcal://", "webcals://"] {
        if let Some(rest) = url.strip_prefix(scheme) {
            return format!("https://{rest}");
        }
    }
    url.to_string()
}

/// Timed events by start time, all-day events last; ties keep their order
pub fn sort_events(events: &mut [CalendarEvent]) {
    events.sort_by_key(|e| (e.time_of_day.is_none(), e.time_of_day));
}

fn has_param(property: &Property, name: &str, value: &str) -> bool {
    property.params.as_ref().is_some_and(|params| {
        params
            .iter()
            .any(|(k, vs)| k.eq_ignore_ascii_case(name) && vs.iter().any(|v| v.eq_ignore_ascii_case(value)))
    })
}

/// Start date and optional local time of a DTSTART property
///
/// UTC values are shifted into `tz`; floating and TZID values keep their
/// wall-clock time.
fn event_start<Tz: TimeZone>(property: &Property, tz: &Tz) -> Option<(NaiveDate, Option<NaiveTime>)> {
    let value = property.value.as_deref()?.trim();

    if has_param(property, "VALUE", "DATE") || value.len() == DATE_LEN {
        let date = NaiveDate::parse_from_str(value, DATE_FORMAT).ok()?;
        return Some((date, None));
    }

    if let Some(utc) = value.strip_suffix('Z') {
        let naive = NaiveDateTime::parse_from_str(utc, DATE_TIME_FORMAT).ok()?;
        let local = Utc.from_utc_datetime(&naive).with_timezone(tz).naive_local();
        return Some((local.date(), Some(local.time())));
    }

    let naive = NaiveDateTime::parse_from_str(value, DATE_TIME_FORMAT).ok()?;
    Some((naive.date(), Some(naive.time())))
}

fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push(' '),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out.trim().to_string()
}

/// Extract the events of `source` that start on `today`
///
/// Events with an unreadable start are skipped; a calendar that cannot be
/// parsed at all fails the whole source.
pub fn parse_events<Tz: TimeZone>(
    ics: &str,
    source: &CalendarSource,
    today: NaiveDate,
    tz: &Tz,
) -> SourceResult<Vec<CalendarEvent>> {
    debug!(label = %source.label, ics_len = ics.len(), %today, "parse_events: called");
    let mut events = Vec::new();

    for calendar in IcalParser::new(ics.as_bytes()) {
        let calendar = calendar.map_err(|e| SourceError::Malformed(format!("{}: {}", source.label, e)))?;

        for event in calendar.events {
            let Some(start) = event.properties.iter().find(|p| p.name.eq_ignore_ascii_case("DTSTART")) else {
                debug!("parse_events: event without DTSTART skipped");
                continue;
            };
            let Some((date, time_of_day)) = event_start(start, tz) else {
                debug!(value = ?start.value, "parse_events: unreadable DTSTART skipped");
                continue;
            };
            if date != today {
                continue;
            }

            let title = event
                .properties
                .iter()
                .find(|p| p.name.eq_ignore_ascii_case("SUMMARY"))
                .and_then(|p| p.value.as_deref())
                .map(unescape_text)
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| UNTITLED.to_string());

            events.push(CalendarEvent {
                time_of_day,
                title,
                calendar_label: source.label.clone(),
                calendar_icon: source.icon.clone(),
            });
        }
    }

    Ok(events)
}

/// Merges today's events from all configured calendars
pub struct CalendarAggregator {
    transport: Arc<dyn Transport>,
}

impl CalendarAggregator {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Today's events from every source, sorted
    ///
    /// A failing source is logged and skipped; it never hides the others.
    pub async fn fetch(&self, sources: &[CalendarSource], today: NaiveDate) -> Vec<CalendarEvent> {
        debug!(source_count = sources.len(), %today, "CalendarAggregator::fetch: called");
        let mut events = Vec::new();

        for source in sources {
            if source.is_placeholder() {
                debug!(label = %source.label, "CalendarAggregator::fetch: placeholder skipped");
                continue;
            }
            match self.fetch_source(source, today).await {
                Ok(found) => {
                    info!(label = %source.label, count = found.len(), "Calendar loaded");
                    events.extend(found);
                }
                Err(e) => warn!(label = %source.label, error = %e, "Calendar unavailable"),
            }
        }

        sort_events(&mut events);
        events
    }

    async fn fetch_source(&self, source: &CalendarSource, today: NaiveDate) -> SourceResult<Vec<CalendarEvent>> {
        let url = normalize_url(&source.url);
        let body = self.transport.get(&url).await?;
        parse_events(&body, source, today, &Local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::mock::MockTransport;
    use chrono::FixedOffset;

    fn source(label: &str, url: &str) -> CalendarSource {
        CalendarSource {
            label: label.to_string(),
            icon: "📅".to_string(),
            url: url.to_string(),
        }
    }

    fn event(time: Option<(u32, u32)>, title: &str) -> CalendarEvent {
        CalendarEvent {
            time_of_day: time.and_then(|(h, m)| NaiveTime::from_hms_opt(h, m, 0)),
            title: title.to_string(),
            calendar_label: "Personal".to_string(),
            calendar_icon: "🏠".to_string(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn ics(events: &[&str]) -> String {
        let mut out = String::from("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Test//EN\r\n");
        for e in events {
            out.push_str("BEGIN:VEVENT\r\n");
            out.push_str(e);
            out.push_str("END:VEVENT\r\n");
        }
        out.push_str("END:VCALENDAR\r\n");
        out
    }

    #[test]
    fn test_sort_all_day_last() {
        let mut events = vec![
            event(None, "AllDay"),
            event(Some((14, 0)), "Mtg"),
            event(Some((9, 0)), "Call"),
        ];
        sort_events(&mut events);

        let titles: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Call", "Mtg", "AllDay"]);
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        let mut events = vec![
            event(None, "Holiday A"),
            event(Some((9, 0)), "Standup A"),
            event(None, "Holiday B"),
            event(Some((9, 0)), "Standup B"),
        ];
        sort_events(&mut events);

        let titles: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Standup A", "Standup B", "Holiday A", "Holiday B"]);
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(
            normalize_url("webcal://p27-caldav.icloud.com/published/2/test"),
            "https://p27-caldav.icloud.com/published/2/test"
        );
        assert_eq!(
            normalize_url("webcals://example.com/calendar.ics"),
            "https://example.com/calendar.ics"
        );
        assert_eq!(
            normalize_url("https://calendar.google.com/calendar/ical/test"),
            "https://calendar.google.com/calendar/ical/test"
        );
        assert_eq!(normalize_url("http://example.com/cal.ics"), "http://example.com/cal.ics");
    }

    #[test]
    fn test_placeholder_detection() {
        assert!(source("Empty", "  ").is_placeholder());
        assert!(source("Sample", "https://calendar.google.com/calendar/ical/xxxxx%40group/basic.ics").is_placeholder());
        assert!(!source("Real", "https://calendar.google.com/calendar/ical/me%40example.com/basic.ics").is_placeholder());
    }

    #[test]
    fn test_parse_keeps_only_today() {
        let body = ics(&[
            "DTSTART:20261019T090000\r\nSUMMARY:Dentist\r\n",
            "DTSTART:20261020T090000\r\nSUMMARY:Tomorrow\r\n",
            "DTSTART;VALUE=DATE:20261019\r\nSUMMARY:Name day\r\n",
            "DTSTART;TZID=Europe/Prague:20261019T174500\r\nSUMMARY:Yoga\\, basement\r\n",
        ]);

        let events = parse_events(&body, &source("Personal", "x"), today(), &Utc).unwrap();

        assert_eq!(events.len(), 3);
        assert_eq!(events[0].title, "Dentist");
        assert_eq!(events[0].time_of_day, NaiveTime::from_hms_opt(9, 0, 0));
        assert_eq!(events[1].title, "Name day");
        assert_eq!(events[1].time_of_day, None);
        assert_eq!(events[2].title, "Yoga, basement");
        assert_eq!(events[2].time_of_day, NaiveTime::from_hms_opt(17, 45, 0));
        assert!(events.iter().all(|e| e.calendar_label == "Personal" && e.calendar_icon == "📅"));
    }

    #[test]
    fn test_parse_converts_utc_into_local_zone() {
        let body = ics(&[
            "DTSTART:20261018T230000Z\r\nSUMMARY:Late call\r\n",
            "DTSTART:20261019T230000Z\r\nSUMMARY:Next day locally\r\n",
        ]);
        let prague = FixedOffset::east_opt(2 * 3600).unwrap();

        let events = parse_events(&body, &source("Work", "x"), today(), &prague).unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Late call");
        assert_eq!(events[0].time_of_day, NaiveTime::from_hms_opt(1, 0, 0));
    }

    #[test]
    fn test_parse_skips_unreadable_events() {
        let body = ics(&[
            "SUMMARY:No start\r\n",
            "DTSTART:tomorrow-ish\r\nSUMMARY:Garbage start\r\n",
            "DTSTART:20261019T120000\r\n",
        ]);

        let events = parse_events(&body, &source("Personal", "x"), today(), &Utc).unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, UNTITLED);
    }

    #[test]
    fn test_unescape_text() {
        assert_eq!(unescape_text("Lunch\\; bring\\, snacks\\nplease"), "Lunch; bring, snacks please");
        assert_eq!(unescape_text("C:\\\\temp"), "C:\\temp");
    }

    #[tokio::test]
    async fn test_fetch_merges_sources_and_isolates_failures() {
        let personal = ics(&[
            "DTSTART;VALUE=DATE:20261019\r\nSUMMARY:AllDay\r\n",
            "DTSTART:20261019T140000\r\nSUMMARY:Mtg\r\n",
        ]);
        let work = ics(&["DTSTART:20261019T090000\r\nSUMMARY:Call\r\n"]);
        let transport = Arc::new(
            MockTransport::new()
                .with_body("https://cal.example.test/personal", personal)
                .with_status("https://cal.example.test/broken", 500)
                .with_body("https://cal.example.test/work", work),
        );
        let aggregator = CalendarAggregator::new(transport.clone());

        let sources = vec![
            source("Personal", "webcal://cal.example.test/personal.ics"),
            source("Broken", "https://cal.example.test/broken.ics"),
            source("Sample", "https://calendar.google.com/calendar/ical/xxxxx/basic.ics"),
            source("Empty", ""),
            source("Work", "https://cal.example.test/work.ics"),
        ];
        let events = aggregator.fetch(&sources, today()).await;

        let titles: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Call", "Mtg", "AllDay"]);
        assert_eq!(events[0].calendar_label, "Work");

        assert_eq!(
            transport.calls(),
            vec![
                "GET https://cal.example.test/personal.ics",
                "GET https://cal.example.test/broken.ics",
                "GET https://cal.example.test/work.ics",
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_malformed_calendar_is_skipped() {
        let transport = Arc::new(MockTransport::new().with_body("https://cal.example.test/", "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\n"));
        let aggregator = CalendarAggregator::new(transport);

        let events = aggregator.fetch(&[source("Bad", "https://cal.example.test/bad.ics")], today()).await;
        assert!(events.is_empty());
    }
}
