//! Integration tests for the briefing pipeline through the public API

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use rand::SeedableRng;
use rand::rngs::StdRng;

use printmaster::briefing::{BriefingComposer, SectionKind};
use printmaster::config::Config;
use printmaster::device::DryRunDevice;
use printmaster::sources::{CalendarSource, NewsSource, SourceError, SourceResult, Transport};

/// Serves canned bodies by host; everything else is a 503
#[derive(Default)]
struct CannedTransport {
    bodies: HashMap<&'static str, String>,
    requests: Mutex<Vec<String>>,
}

impl CannedTransport {
    fn with(mut self, host: &'static str, body: &str) -> Self {
        self.bodies.insert(host, body.to_string());
        self
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn answer(&self, url: &str) -> SourceResult<String> {
        self.requests.lock().unwrap().push(url.to_string());
        self.bodies
            .iter()
            .find(|(host, _)| url.contains(*host))
            .map(|(_, body)| body.clone())
            .ok_or_else(|| SourceError::Status {
                status: 503,
                url: url.to_string(),
            })
    }
}

#[async_trait]
impl Transport for CannedTransport {
    async fn get(&self, url: &str) -> SourceResult<String> {
        self.answer(url)
    }

    async fn post(&self, url: &str) -> SourceResult<String> {
        self.answer(url)
    }
}

fn rss(titles: &[&str]) -> String {
    let items: String = titles
        .iter()
        .map(|t| format!("<item><title>{t}</title></item>"))
        .collect();
    format!(
        r#"<?xml version="1.0"?><rss version="2.0"><channel><title>T</title><link>https://feed.test/</link><description>D</description>{items}</channel></rss>"#
    )
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 12, 24).unwrap()
}

fn config() -> Config {
    let mut config = Config::default();
    config.weather.api_key = "k".to_string();
    config.weather.base_url = "https://weather.test/data/2.5/weather".to_string();
    config.horoscope.base_url = "https://horoscope.test/".to_string();
    config.calendars = vec![
        CalendarSource {
            label: "Personal".to_string(),
            icon: "🏠".to_string(),
            url: "webcal://personal.test/cal.ics".to_string(),
        },
        CalendarSource {
            label: "Sample".to_string(),
            icon: "📅".to_string(),
            url: "https://calendar.google.com/calendar/ical/xxxxx%40group.calendar.google.com/public/basic.ics"
                .to_string(),
        },
    ];
    config.news.max_items = 3;
    config.news.sources = ["a.test", "b.test", "c.test"]
        .iter()
        .map(|host| NewsSource {
            label: host.to_string(),
            url: format!("https://{host}/rss"),
        })
        .collect();
    config
}

#[tokio::test]
async fn test_briefing_end_to_end() {
    let transport = Arc::new(
        CannedTransport::default()
            .with(
                "weather.test",
                r#"{"weather":[{"main":"Snow","description":"light snow"}],
                    "main":{"temp":-3.2,"feels_like":-7.9,"humidity":91},
                    "wind":{"speed":4.0},"clouds":{"all":100}}"#,
            )
            .with("horoscope.test", r#"{"description":"Rest.","lucky_number":5,"color":"Red","mood":"Cosy"}"#)
            .with(
                "personal.test",
                "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\nDTSTART:20261224T180000\r\n\
                 SUMMARY:Dinner\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n",
            )
            .with("a.test", &rss(&["A1", "A2", "A3"]))
            .with("b.test", &rss(&["B1", "B2", "B3"]))
            .with("c.test", &rss(&["C1"])),
    );
    let composer = BriefingComposer::new(config(), transport.clone());

    let report = composer.gather(today()).await;
    let document = composer.compose(report, today(), true, &mut StdRng::seed_from_u64(3));

    let lines = document.text_lines();
    assert!(lines.contains(&"Thursday, 24 December 2026"));
    assert!(lines.contains(&"HOLIDAY: Christmas Eve"));
    assert!(lines.contains(&"Temp: -3°C (feels like -8°C)"));
    assert!(lines.contains(&"🏠      18:00 Dinner"));
    assert!(lines.contains(&"Lucky number: 5"));

    let news: Vec<&str> = document
        .section(SectionKind::News)
        .unwrap()
        .text_lines()
        .into_iter()
        .filter(|l| !l.is_empty() && !l.starts_with("  (") && *l != "NEWS")
        .collect();
    assert_eq!(news, vec!["A1", "A2", "B1"]);

    let requests = transport.requests();
    assert!(requests.contains(&"https://personal.test/cal.ics".to_string()));
    assert!(!requests.iter().any(|r| r.contains("calendar.google.com")));
    assert!(!requests.iter().any(|r| r.contains("c.test")));
}

#[tokio::test]
async fn test_briefing_survives_every_source_failing() {
    let composer = BriefingComposer::new(config(), Arc::new(CannedTransport::default()));
    let mut device = DryRunDevice::new(Vec::new(), 50).unwrap();

    composer
        .run(&mut device, today(), &mut StdRng::seed_from_u64(11))
        .await
        .unwrap();

    let out = String::from_utf8(device.into_inner()).unwrap();
    assert!(out.contains("Could not load the weather"));
    assert!(out.contains("HOROSCOPE (ARIES)"));
    assert!(out.contains("JOKE OF THE DAY"));
    assert!(!out.contains("CALENDAR"));
    assert!(!out.contains("NEWS"));
    assert!(out.contains("END OF PRINT"));
}
