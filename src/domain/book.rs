//! Book records held on the shelf
//!
//! A record is built once, when the reader picks a catalog candidate, and is
//! never modified afterwards. Everything the tower needs to draw a book,
//! including its color, lives on the record so that redraws are stable.

use serde::{Deserialize, Serialize};

/// Page count substituted when the catalog has none or it cannot be parsed
pub const DEFAULT_PAGE_COUNT: u32 = 180;

/// 24-bit sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` or `rrggbb`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }

        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
        Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Relative luminance in 0.0..=1.0 (Rec. 601 weights)
    pub fn luminance(&self) -> f32 {
        (0.299 * self.r as f32 + 0.587 * self.g as f32 + 0.114 * self.b as f32) / 255.0
    }
}

impl Serialize for Rgb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Rgb::from_hex(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color '{raw}'")))
    }
}

/// A book saved to the tower
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookRecord {
    title: String,
    page_count: u32,
    color: Rgb,
}

impl BookRecord {
    /// Creates a record, substituting [`DEFAULT_PAGE_COUNT`] for a missing count
    pub fn new(title: impl Into<String>, page_count: Option<u32>, color: Rgb) -> Self {
        Self {
            title: title.into(),
            page_count: page_count.unwrap_or(DEFAULT_PAGE_COUNT),
            color,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn color(&self) -> Rgb {
        self.color
    }
}

/// Parses a page count as the catalog reports it
///
/// Accepts plain integers and integral decimals ("312", " 312.0 ").
/// Anything else, including negative or empty values, yields
/// [`DEFAULT_PAGE_COUNT`].
pub fn parse_page_count(raw: &str) -> u32 {
    let trimmed = raw.trim();

    if let Ok(pages) = trimmed.parse::<u32>() {
        return pages;
    }

    match trimmed.parse::<f64>() {
        Ok(value)
            if value.is_finite()
                && value >= 0.0
                && value.fract() == 0.0
                && value <= u32::MAX as f64 =>
        {
            value as u32
        }
        _ => DEFAULT_PAGE_COUNT,
    }
}

/// Page count as it appears in loosely typed JSON: number, string or null
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawPageCount {
    Number(f64),
    Text(String),
    Missing(()),
}

impl Default for RawPageCount {
    fn default() -> Self {
        RawPageCount::Missing(())
    }
}

impl RawPageCount {
    /// Resolves to a concrete page count with the usual fallback
    pub fn resolve(&self) -> u32 {
        match self {
            RawPageCount::Number(value) => parse_page_count(&value.to_string()),
            RawPageCount::Text(text) => parse_page_count(text),
            RawPageCount::Missing(()) => DEFAULT_PAGE_COUNT,
        }
    }
}

/// Shortens a title for display
///
/// Surrounding whitespace is trimmed first and every length below is
/// measured on the trimmed title, in characters rather than bytes. A title
/// longer than `max_chars` keeps its first `max_chars` characters followed
/// by `marker`, so a label is never longer than `max_chars` plus the marker.
pub fn truncate_label(title: &str, max_chars: usize, marker: &str) -> String {
    let title = title.trim();
    if title.chars().count() <= max_chars {
        return title.to_string();
    }

    let mut label: String = title.chars().take(max_chars).collect();
    label.push_str(marker);
    label
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_parse_and_print() {
        let color = Rgb::from_hex("#8c4a2f").unwrap();
        assert_eq!(color, Rgb::new(0x8c, 0x4a, 0x2f));
        assert_eq!(color.to_hex(), "#8c4a2f");
        assert_eq!(Rgb::from_hex("8C4A2F"), Some(color));

        assert!(Rgb::from_hex("#8c4a2").is_none());
        assert!(Rgb::from_hex("#zz4a2f").is_none());
        assert!(Rgb::from_hex("#가나").is_none());
    }

    #[test]
    fn luminance_orders_black_and_white() {
        assert_eq!(Rgb::new(0, 0, 0).luminance(), 0.0);
        assert!(Rgb::new(255, 255, 255).luminance() > 0.99);
    }

    #[test]
    fn missing_page_count_uses_default() {
        let record = BookRecord::new("Book A", None, Rgb::new(1, 2, 3));
        assert_eq!(record.page_count(), DEFAULT_PAGE_COUNT);
        assert_eq!(record.title(), "Book A");
        assert_eq!(record.color(), Rgb::new(1, 2, 3));
    }

    #[test]
    fn page_count_parsing_falls_back() {
        assert_eq!(parse_page_count("312"), 312);
        assert_eq!(parse_page_count(" 48 "), 48);
        assert_eq!(parse_page_count("312.0"), 312);
        assert_eq!(parse_page_count("0"), 0);

        assert_eq!(parse_page_count(""), DEFAULT_PAGE_COUNT);
        assert_eq!(parse_page_count("-20"), DEFAULT_PAGE_COUNT);
        assert_eq!(parse_page_count("12.5"), DEFAULT_PAGE_COUNT);
        assert_eq!(parse_page_count("about 300"), DEFAULT_PAGE_COUNT);
        assert_eq!(parse_page_count("NaN"), DEFAULT_PAGE_COUNT);
    }

    #[test]
    fn raw_page_count_from_json() {
        let values: Vec<RawPageCount> =
            serde_json::from_str(r#"[300, "412", null, "n/a", -3]"#).unwrap();
        let resolved: Vec<u32> = values.iter().map(RawPageCount::resolve).collect();
        assert_eq!(
            resolved,
            vec![300, 412, DEFAULT_PAGE_COUNT, DEFAULT_PAGE_COUNT, DEFAULT_PAGE_COUNT]
        );
    }

    #[test]
    fn short_titles_are_untouched() {
        assert_eq!(truncate_label("Book A", 20, "..."), "Book A");
        assert_eq!(truncate_label("  Book A  ", 20, "..."), "Book A");
        assert_eq!(truncate_label("exactly-five", 12, "..."), "exactly-five");
    }

    #[test]
    fn long_titles_keep_prefix_and_marker() {
        let label = truncate_label("The Left Hand of Darkness", 10, "...");
        assert_eq!(label, "The Left H...");
        assert_eq!(label.chars().count(), 10 + 3);
    }

    #[test]
    fn label_length_is_measured_on_trimmed_title() {
        for (title, max_chars) in [("   Dune   ", 4), ("   Dune   ", 3), ("  Solaris", 10)] {
            let trimmed = title.trim().chars().count();
            let label = truncate_label(title, max_chars, "...");
            let marker = if trimmed > max_chars { 3 } else { 0 };
            assert_eq!(label.chars().count(), trimmed.min(max_chars) + marker);
        }
        assert_eq!(truncate_label("   Dune   ", 4, "..."), "Dune");
    }

    #[test]
    fn zero_max_chars_leaves_only_the_marker() {
        assert_eq!(truncate_label("Book A", 0, "..."), "...");
        assert_eq!(truncate_label("   ", 0, "..."), "");
    }

    #[test]
    fn empty_marker_cuts_cleanly() {
        assert_eq!(truncate_label("The Left Hand of Darkness", 8, ""), "The Left");
        assert_eq!(truncate_label("Book A", 0, ""), "");
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let title = "채식주의자와 소년이 온다";
        let label = truncate_label(title, 5, "…");
        assert_eq!(label, "채식주의자…");
        assert_eq!(label.chars().count(), 6);
    }
}
