//! Presentation boundary: truncation, icons and line layout.
//!
//! Renderers receive a [`ViewModel`] and decide how to draw it. The helpers
//! here cover what every renderer needs: a [`TruncationPolicy`] that is
//! passed explicitly rather than read from compact mode deep inside the
//! renderer, icon lookup tables, and [`present`], which flattens a view
//! model into ordered [`DisplayLine`]s.

use grimoire_types::{LightingLevel, PhaseBucket, ViewModel};
use serde::Serialize;

/// Suffix appended to truncated text.
pub const ELLIPSIS: char = '…';

/// How long fields are shortened before display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TruncationPolicy {
    max_chars: Option<usize>,
}

impl TruncationPolicy {
    /// Never truncate.
    pub const fn none() -> Self {
        Self { max_chars: None }
    }

    /// Truncate to `max_chars` characters, ellipsis included.
    pub const fn at(max_chars: usize) -> Self {
        Self {
            max_chars: Some(max_chars),
        }
    }

    /// The policy for a view: `limit` characters, except in compact mode
    /// where the renderer's own layout handles overflow.
    pub const fn for_view(view: &ViewModel, limit: usize) -> Self {
        if view.is_compact {
            Self::none()
        } else {
            Self::at(limit)
        }
    }

    /// The character limit, if any.
    pub const fn max_chars(self) -> Option<usize> {
        self.max_chars
    }

    /// Apply the policy to `text`.
    pub fn apply(self, text: &str) -> String {
        self.max_chars
            .map_or_else(|| text.to_owned(), |max| truncate(text, max))
    }
}

/// Shorten `text` to at most `max_chars` characters, ending in
/// [`ELLIPSIS`] when anything was cut.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    let keep = max_chars.saturating_sub(1);
    let mut short: String = text.chars().take(keep).collect();
    short.truncate(short.trim_end().len());
    if max_chars > 0 {
        short.push(ELLIPSIS);
    }
    short
}

/// Moon glyph for a phase bucket.
pub const fn phase_icon(bucket: PhaseBucket) -> &'static str {
    match bucket {
        PhaseBucket::New => "🌑",
        PhaseBucket::WaxingCrescent => "🌒",
        PhaseBucket::FirstQuarter => "🌓",
        PhaseBucket::WaxingGibbous => "🌔",
        PhaseBucket::Full => "🌕",
        PhaseBucket::WaningGibbous => "🌖",
        PhaseBucket::LastQuarter => "🌗",
        PhaseBucket::WaningCrescent => "🌘",
    }
}

/// Glyph for a lighting level.
pub const fn lighting_icon(level: LightingLevel) -> &'static str {
    match level {
        LightingLevel::Bright => "☀️",
        LightingLevel::Dim => "⛅",
        LightingLevel::Dark => "🌙",
    }
}

/// One rendered row of the overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayLine {
    /// CSS class of the row.
    pub class: &'static str,
    /// Leading glyph.
    pub icon: &'static str,
    /// Row text, already truncated.
    pub text: String,
}

impl DisplayLine {
    const fn new(class: &'static str, icon: &'static str, text: String) -> Self {
        Self { class, icon, text }
    }
}

/// Lay out `view` as ordered rows.
///
/// A minified overlay shows only the date row. Location and music are
/// subject to `policy`; other rows are short by construction.
pub fn present(view: &ViewModel, policy: TruncationPolicy) -> Vec<DisplayLine> {
    let date = view
        .date
        .as_ref()
        .map(|date| DisplayLine::new("hud-date", "📅", date.clone()));
    if view.is_minified {
        return date.into_iter().collect();
    }

    let mut lines = Vec::new();
    if let Some(world) = &view.world_name {
        lines.push(DisplayLine::new("hud-world", "🌍", world.clone()));
    }
    if let Some(location) = &view.location {
        lines.push(DisplayLine::new("hud-location", "📍", policy.apply(location)));
    }
    lines.extend(date);
    if let Some(weather) = &view.weather {
        lines.push(DisplayLine::new("hud-weather", "🌦️", weather.clone()));
    }
    if let Some(lighting) = &view.lighting {
        let icon = view.lighting_level.map_or("💡", lighting_icon);
        lines.push(DisplayLine::new("hud-lighting", icon, lighting.clone()));
    }
    if let Some(music) = &view.music {
        lines.push(DisplayLine::new("hud-music", "🎵", policy.apply(music)));
    }
    lines.extend(view.moons.iter().map(|moon| {
        DisplayLine::new(
            "hud-moon",
            phase_icon(moon.bucket),
            format!("{}: {}", moon.name, moon.label),
        )
    }));
    lines
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use grimoire_types::{MoonView, Theme};

    use super::*;

    fn view() -> ViewModel {
        ViewModel {
            location: Some("The Yawning Portal, Castle Ward, Waterdeep".to_owned()),
            date: Some("1 Hammer, 1492 DR".to_owned()),
            weather: Some("Clear".to_owned()),
            lighting: Some("Dim".to_owned()),
            lighting_level: Some(LightingLevel::Dim),
            music: Some("Short Song".to_owned()),
            world_name: None,
            moons: vec![MoonView {
                name: "Luna".to_owned(),
                color: "#e0e0e0".to_owned(),
                bucket: PhaseBucket::Full,
                bucket_index: 4,
                label: "Full Moon".to_owned(),
                ratio: 0.5,
            }],
            theme: Theme::Glass,
            is_compact: false,
            is_minified: false,
            is_combat_active: false,
        }
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        assert_eq!(truncate("Café Ünderdark", 6), "Café…");
        assert_eq!(truncate("short", 24), "short");
        assert_eq!(truncate("exactly", 7), "exactly");
        assert_eq!(truncate("anything", 0), "");
    }

    #[test]
    fn compact_mode_disables_truncation() {
        let mut view = view();
        assert_eq!(TruncationPolicy::for_view(&view, 24).max_chars(), Some(24));
        view.is_compact = true;
        assert_eq!(TruncationPolicy::for_view(&view, 24), TruncationPolicy::none());
    }

    #[test]
    fn present_truncates_long_location() {
        let view = view();
        let lines = present(&view, TruncationPolicy::for_view(&view, 24));
        let location = lines.first().unwrap();
        assert_eq!(location.class, "hud-location");
        assert_eq!(location.text.chars().count(), 24);
        assert!(location.text.ends_with(ELLIPSIS));
    }

    #[test]
    fn present_orders_rows_and_uses_icons() {
        let view = view();
        let lines = present(&view, TruncationPolicy::none());
        let classes: Vec<&str> = lines.iter().map(|line| line.class).collect();
        assert_eq!(
            classes,
            ["hud-location", "hud-date", "hud-weather", "hud-lighting", "hud-music", "hud-moon"]
        );
        assert_eq!(lines.last().unwrap().icon, "🌕");
        assert_eq!(lines.last().unwrap().text, "Luna: Full Moon");
        assert_eq!(lines.get(3).unwrap().icon, lighting_icon(LightingLevel::Dim));
    }

    #[test]
    fn minified_shows_only_date() {
        let mut view = view();
        view.is_minified = true;
        let lines = present(&view, TruncationPolicy::none());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines.first().unwrap().text, "1 Hammer, 1492 DR");
    }

    #[test]
    fn every_bucket_has_a_distinct_icon() {
        let icons: std::collections::BTreeSet<&str> =
            PhaseBucket::ALL.into_iter().map(phase_icon).collect();
        assert_eq!(icons.len(), 8);
    }
}
