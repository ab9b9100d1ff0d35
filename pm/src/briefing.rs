//! Briefing composition and rendering
//!
//! The composer runs in three steps:
//!
//! 1. `gather` - consult every source concurrently, keeping failures as values
//! 2. `compose` - apply fallbacks and lay the day out as a [`BriefingDocument`]
//! 3. `render` - replay the document on an [`OutputDevice`] and cut
//!
//! Only device errors escape; every source failure degrades its own section.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::almanac::DayNotes;
use crate::config::Config;
use crate::device::{DeviceError, OutputDevice, StyleUpdate};
use crate::jokes;
use crate::layout;
use crate::sources::{
    CalendarAggregator, CalendarEvent, HoroscopeFetcher, HoroscopeSnapshot, NewsAggregator, NewsItem, SourceResult,
    Transport, UNKNOWN, WeatherFetcher, WeatherSnapshot,
};
use crate::wardrobe;

/// Most calendar entries printed
pub const MAX_CALENDAR_EVENTS: usize = 8;

const TITLE: &str = "DAILY BRIEFING";
const FAREWELL: &str = "Have a nice day!";
const ALL_DAY: &str = "all day";
const TITLE_SCALE: u8 = 2;

/// Which part of the briefing a section holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Header,
    Weather,
    Wardrobe,
    Calendar,
    News,
    Horoscope,
    Joke,
    Footer,
}

/// One device operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Style(StyleUpdate),
    /// A single line, written with a trailing newline
    Text(String),
}

/// A run of operations belonging to one part of the briefing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    pub ops: Vec<Op>,
}

impl Section {
    fn new(kind: SectionKind) -> Self {
        Self { kind, ops: Vec::new() }
    }

    fn style(mut self, update: StyleUpdate) -> Self {
        self.ops.push(Op::Style(update));
        self
    }

    fn line(mut self, text: impl Into<String>) -> Self {
        self.ops.push(Op::Text(text.into()));
        self
    }

    fn blank(self) -> Self {
        self.line("")
    }

    /// Bold left-aligned title followed by normal text
    fn heading(self, title: &str) -> Self {
        self.style(StyleUpdate::new().left().bold())
            .line(title)
            .style(StyleUpdate::new().normal())
    }

    fn wrapped(self, text: &str, width: usize) -> Self {
        layout::wrap(text, width)
            .into_iter()
            .fold(self, |section, line| section.line(line))
    }

    /// Text of every line in order, without style changes
    pub fn text_lines(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Text(text) => Some(text.as_str()),
                Op::Style(_) => None,
            })
            .collect()
    }
}

/// The full ordered briefing for one day
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BriefingDocument {
    pub sections: Vec<Section>,
}

impl BriefingDocument {
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    pub fn kinds(&self) -> Vec<SectionKind> {
        self.sections.iter().map(|s| s.kind).collect()
    }

    /// Every line of the document in print order
    pub fn text_lines(&self) -> Vec<&str> {
        self.sections.iter().flat_map(|s| s.text_lines()).collect()
    }

    /// Replay the document on `device`, then cut
    pub fn render(&self, device: &mut dyn OutputDevice) -> Result<(), DeviceError> {
        debug!(sections = self.sections.len(), "BriefingDocument::render: called");
        for section in &self.sections {
            for op in &section.ops {
                match op {
                    Op::Style(update) if update.is_empty() => {}
                    Op::Style(update) => device.set_style(*update)?,
                    Op::Text(text) => device.write(&format!("{text}\n"))?,
                }
            }
        }
        device.cut()
    }
}

/// Raw outcome of consulting every source
#[derive(Debug)]
pub struct SourceReport {
    pub weather: SourceResult<WeatherSnapshot>,
    pub horoscope: SourceResult<HoroscopeSnapshot>,
    pub events: Vec<CalendarEvent>,
    pub news: Vec<NewsItem>,
}

/// Builds the daily briefing from configuration and sources
pub struct BriefingComposer {
    config: Config,
    weather: WeatherFetcher,
    horoscope: HoroscopeFetcher,
    calendar: CalendarAggregator,
    news: NewsAggregator,
}

impl BriefingComposer {
    pub fn new(config: Config, transport: Arc<dyn Transport>) -> Self {
        debug!("BriefingComposer::new: called");
        Self {
            weather: WeatherFetcher::from_config(transport.clone(), &config.weather),
            horoscope: HoroscopeFetcher::new(transport.clone(), &config.horoscope.base_url),
            calendar: CalendarAggregator::new(transport.clone()),
            news: NewsAggregator::new(transport),
            config,
        }
    }

    /// Consult all sources concurrently
    pub async fn gather(&self, today: NaiveDate) -> SourceReport {
        debug!(%today, "BriefingComposer::gather: called");
        let api_key = self.config.weather.api_key().unwrap_or_default();

        let (weather, horoscope, events, news) = tokio::join!(
            self.weather
                .try_fetch(&self.config.weather.city, &self.config.weather.country_code, &api_key),
            self.horoscope.try_fetch(self.config.personal.zodiac_sign),
            self.calendar.fetch(&self.config.calendars, today),
            self.news.fetch(&self.config.news.sources, self.config.news.max_items),
        );

        if let Err(e) = &weather {
            warn!(error = %e, kind = ?e.kind(), "Weather unavailable");
        }
        if let Err(e) = &horoscope {
            warn!(error = %e, kind = ?e.kind(), "Horoscope unavailable, using offline reading");
        }
        info!(
            weather = weather.is_ok(),
            horoscope = horoscope.is_ok(),
            events = events.len(),
            news = news.len(),
            "Sources gathered"
        );

        SourceReport {
            weather,
            horoscope,
            events,
            news,
        }
    }

    /// Lay out the briefing, applying fallbacks for failed sources
    ///
    /// `unicode` selects emoji calendar icons and bullet glyphs; devices
    /// without it get ASCII substitutes.
    pub fn compose<R: Rng + ?Sized>(
        &self,
        report: SourceReport,
        today: NaiveDate,
        unicode: bool,
        rng: &mut R,
    ) -> BriefingDocument {
        debug!(%today, unicode, "BriefingComposer::compose: called");
        let width = self.config.layout.paper_width;
        let weather = report.weather.ok();
        let horoscope = match report.horoscope {
            Ok(snapshot) => snapshot,
            Err(_) => HoroscopeSnapshot::offline(rng),
        };
        let outfit = wardrobe::recommend(weather.as_ref(), &self.config.wardrobe, rng);
        let joke = jokes::pick(&self.config.jokes, rng);

        let mut sections = vec![
            header(today, &self.config.almanac.lookup(today), width),
            weather_section(weather.as_ref()),
            wardrobe_section(&outfit, unicode, width),
        ];
        if !report.events.is_empty() {
            sections.push(calendar_section(&report.events, unicode));
        }
        if !report.news.is_empty() {
            sections.push(news_section(&report.news, width));
        }
        sections.push(horoscope_section(&self.config.personal.zodiac_sign.to_string(), &horoscope, width));
        sections.push(joke_section(&joke, width));
        sections.push(footer(width));

        BriefingDocument { sections }
    }

    /// Gather, compose and print today's briefing
    pub async fn run<R: Rng + ?Sized>(
        &self,
        device: &mut dyn OutputDevice,
        today: NaiveDate,
        rng: &mut R,
    ) -> Result<(), DeviceError> {
        info!(%today, "Preparing daily briefing");
        let report = self.gather(today).await;
        let document = self.compose(report, today, device.unicode(), rng);
        document.render(device)?;
        info!(sections = document.sections.len(), "Briefing printed");
        Ok(())
    }
}

fn header(today: NaiveDate, notes: &DayNotes, width: usize) -> Section {
    let mut section = Section::new(SectionKind::Header)
        .style(StyleUpdate::new().center().bold().scale(TITLE_SCALE, TITLE_SCALE))
        .line(TITLE)
        .style(StyleUpdate::new().normal().scale(1, 1))
        .line(today.format("%A, %-d %B %Y").to_string());

    if let Some(holiday) = &notes.holiday {
        section = section
            .style(StyleUpdate::new().bold())
            .wrapped(&format!("HOLIDAY: {holiday}"), width)
            .style(StyleUpdate::new().normal());
    }
    if let Some(name_day) = &notes.name_day {
        section = section.wrapped(&format!("Name day: {name_day}"), width);
    }

    section.line(layout::rule('=', width)).blank()
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn weather_section(weather: Option<&WeatherSnapshot>) -> Section {
    let section = Section::new(SectionKind::Weather).heading("WEATHER");
    let section = match weather {
        Some(w) => section
            .line(format!("Temp: {}°C (feels like {}°C)", w.temperature_c, w.feels_like_c))
            .line(capitalize(&w.description))
            .line(format!("Humidity: {}% | Wind: {} km/h", w.humidity_pct, w.wind_kmh)),
        None => section.line(wardrobe::NO_WEATHER_PLACEHOLDER),
    };
    section.blank()
}

fn bullet(unicode: bool) -> &'static str {
    if unicode { "• " } else { "- " }
}

fn wardrobe_section(outfit: &[String], unicode: bool, width: usize) -> Section {
    let mut section = Section::new(SectionKind::Wardrobe).heading("WHAT TO WEAR");
    for item in outfit {
        let lines = layout::wrap(item, width.saturating_sub(2));
        for (i, line) in lines.iter().enumerate() {
            let prefix = if i == 0 { bullet(unicode) } else { "  " };
            section = section.line(format!("{prefix}{line}"));
        }
    }
    section.blank()
}

/// Emoji icon, or "[X]" from the first letter of the calendar label
fn calendar_tag(event: &CalendarEvent, unicode: bool) -> String {
    if unicode && !event.calendar_icon.is_empty() {
        return event.calendar_icon.clone();
    }
    let letter = event
        .calendar_label
        .chars()
        .find(|c| c.is_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .filter(char::is_ascii)
        .unwrap_or('*');
    format!("[{letter}]")
}

fn time_label(time: Option<NaiveTime>) -> String {
    time.map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| ALL_DAY.to_string())
}

fn calendar_section(events: &[CalendarEvent], unicode: bool) -> Section {
    let mut section = Section::new(SectionKind::Calendar).heading("CALENDAR");
    for event in events.iter().take(MAX_CALENDAR_EVENTS) {
        section = section.line(format!(
            "{} {:>10} {}",
            calendar_tag(event, unicode),
            time_label(event.time_of_day),
            event.title
        ));
    }
    section.blank()
}

fn news_section(news: &[NewsItem], width: usize) -> Section {
    let mut section = Section::new(SectionKind::News).heading("NEWS");
    for item in news {
        section = section
            .wrapped(&item.headline, width)
            .line(format!("  ({})", item.source_label));
    }
    section.blank()
}

fn horoscope_section(sign: &str, horoscope: &HoroscopeSnapshot, width: usize) -> Section {
    let mut section = Section::new(SectionKind::Horoscope)
        .heading(&format!("HOROSCOPE ({sign})"))
        .wrapped(&horoscope.description, width);

    if horoscope.has_details() {
        let details = [
            ("Lucky number", &horoscope.lucky_number),
            ("Colour", &horoscope.color),
            ("Mood", &horoscope.mood),
        ];
        for (label, value) in details {
            if value != UNKNOWN {
                section = section.line(format!("{label}: {value}"));
            }
        }
    }
    section.blank()
}

fn joke_section(joke: &str, width: usize) -> Section {
    joke.lines()
        .fold(Section::new(SectionKind::Joke).heading("JOKE OF THE DAY"), |section, line| {
            section.wrapped(line, width)
        })
}

fn footer(width: usize) -> Section {
    Section::new(SectionKind::Footer)
        .blank()
        .line(layout::rule('=', width))
        .style(StyleUpdate::new().center())
        .line(FAREWELL)
        .blank()
        .blank()
}
