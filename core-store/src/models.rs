//! Domain models shared across the reader core.
//!
//! Everything here is persisted as JSON (camelCase wire names) and must
//! tolerate records written by older versions: absent fields decode to
//! defaults rather than failing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Identifier for a book: the canonical source locator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(String);

impl BookId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// A blank locator can never identify a book.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BookId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Publication status reported by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    #[default]
    Ongoing,
    Completed,
}

impl BookStatus {
    /// Parse a remote status label. Anything that is not "completed"
    /// (case-insensitive) counts as ongoing.
    pub fn from_label(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("completed") {
            BookStatus::Completed
        } else {
            BookStatus::Ongoing
        }
    }
}

/// A book on the shelf or in search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: BookStatus,
    /// Stays 0 until a detail fetch reports the real count.
    #[serde(default)]
    pub total_chapters: u32,
    #[serde(default)]
    pub source_locator: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Unix epoch seconds; stamped when the book is added to the shelf.
    #[serde(default)]
    pub added_at: i64,
}

/// Partial update for a shelf book. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub status: Option<BookStatus>,
    pub total_chapters: Option<u32>,
    pub tags: Option<BTreeSet<String>>,
}

impl BookPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn apply_to(&self, book: &mut Book) {
        if let Some(title) = &self.title {
            book.title = title.clone();
        }
        if let Some(author) = &self.author {
            book.author = author.clone();
        }
        if let Some(description) = &self.description {
            book.description = description.clone();
        }
        if let Some(category) = &self.category {
            book.category = Some(category.clone());
        }
        if let Some(status) = self.status {
            book.status = status;
        }
        if let Some(total_chapters) = self.total_chapters {
            book.total_chapters = total_chapters;
        }
        if let Some(tags) = &self.tags {
            book.tags = tags.clone();
        }
    }
}

/// One entry in a book's table of contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterRef {
    pub id: String,
    pub book_id: BookId,
    pub title: String,
    /// 1-based position within the table of contents.
    pub index: u32,
    pub source_locator: String,
}

/// Sanitized chapter text ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterContent {
    pub chapter_id: String,
    pub title: String,
    /// Markup stripped, entities decoded, whitespace normalized.
    pub body_text: String,
    pub word_count: u32,
}

/// Per-book reading position, keyed 1:1 by book id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingProgress {
    pub book_id: BookId,
    pub current_chapter_id: String,
    /// Percent read within the current chapter, 0..=100.
    #[serde(default)]
    pub current_chapter_progress: f32,
    /// Percent of chapters entered, 0..=100.
    #[serde(default)]
    pub total_progress: f32,
    /// Unix epoch seconds.
    #[serde(default)]
    pub last_read_at: i64,
}

/// Reader color theme with derived surface colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Sepia,
}

impl Theme {
    pub fn background(&self) -> &'static str {
        match self {
            Theme::Light => "#ffffff",
            Theme::Dark => "#1f1f1f",
            Theme::Sepia => "#f7f3e9",
        }
    }

    pub fn text_color(&self) -> &'static str {
        match self {
            Theme::Light => "#333333",
            Theme::Dark => "#e0e0e0",
            Theme::Sepia => "#5c4b37",
        }
    }
}

/// How chapter text is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageMode {
    #[default]
    Scroll,
    Paged,
}

mod settings_defaults {
    pub fn font_size() -> u8 {
        16
    }
    pub fn line_height() -> f32 {
        1.6
    }
    pub fn font_family() -> String {
        "Arial, sans-serif".to_string()
    }
    pub fn auto_advance_secs() -> u8 {
        3
    }
    pub fn brightness() -> u8 {
        100
    }
}

/// Singleton display settings record.
///
/// Every field carries a serde default so a record written before a field
/// existed still decodes; decoding a partial record is exactly the
/// merge-over-defaults read the stores promise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySettings {
    #[serde(default = "settings_defaults::font_size")]
    pub font_size: u8,
    #[serde(default = "settings_defaults::line_height")]
    pub line_height: f32,
    #[serde(default = "settings_defaults::font_family")]
    pub font_family: String,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub auto_advance: bool,
    #[serde(default = "settings_defaults::auto_advance_secs")]
    pub auto_advance_secs: u8,
    #[serde(default = "settings_defaults::brightness")]
    pub brightness: u8,
    #[serde(default)]
    pub page_mode: PageMode,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            font_size: settings_defaults::font_size(),
            line_height: settings_defaults::line_height(),
            font_family: settings_defaults::font_family(),
            theme: Theme::default(),
            auto_advance: false,
            auto_advance_secs: settings_defaults::auto_advance_secs(),
            brightness: settings_defaults::brightness(),
            page_mode: PageMode::default(),
        }
    }
}

/// Partial settings update. Out-of-range numeric values are clamped into
/// their documented ranges when applied, never rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySettingsPatch {
    #[serde(default)]
    pub font_size: Option<u8>,
    #[serde(default)]
    pub line_height: Option<f32>,
    #[serde(default)]
    pub font_family: Option<String>,
    #[serde(default)]
    pub theme: Option<Theme>,
    #[serde(default)]
    pub auto_advance: Option<bool>,
    #[serde(default)]
    pub auto_advance_secs: Option<u8>,
    #[serde(default)]
    pub brightness: Option<u8>,
    #[serde(default)]
    pub page_mode: Option<PageMode>,
}

impl DisplaySettingsPatch {
    pub fn apply_to(&self, settings: &mut DisplaySettings) {
        if let Some(font_size) = self.font_size {
            settings.font_size = font_size.clamp(12, 24);
        }
        if let Some(line_height) = self.line_height {
            settings.line_height = line_height.clamp(1.2, 2.0);
        }
        if let Some(font_family) = &self.font_family {
            settings.font_family = font_family.clone();
        }
        if let Some(theme) = self.theme {
            settings.theme = theme;
        }
        if let Some(auto_advance) = self.auto_advance {
            settings.auto_advance = auto_advance;
        }
        if let Some(secs) = self.auto_advance_secs {
            settings.auto_advance_secs = secs.clamp(1, 10);
        }
        if let Some(brightness) = self.brightness {
            settings.brightness = brightness.min(100);
        }
        if let Some(page_mode) = self.page_mode {
            settings.page_mode = page_mode;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings = DisplaySettings::default();
        assert_eq!(settings.font_size, 16);
        assert_eq!(settings.line_height, 1.6);
        assert_eq!(settings.font_family, "Arial, sans-serif");
        assert_eq!(settings.theme, Theme::Light);
        assert!(!settings.auto_advance);
        assert_eq!(settings.auto_advance_secs, 3);
        assert_eq!(settings.brightness, 100);
        assert_eq!(settings.page_mode, PageMode::Scroll);
    }

    #[test]
    fn test_partial_record_decodes_over_defaults() {
        let settings: DisplaySettings =
            serde_json::from_str(r#"{"fontSize": 20, "theme": "dark"}"#).unwrap();
        assert_eq!(settings.font_size, 20);
        assert_eq!(settings.theme, Theme::Dark);
        // Untouched fields keep their defaults
        assert_eq!(settings.line_height, 1.6);
        assert_eq!(settings.auto_advance_secs, 3);
    }

    #[test]
    fn test_patch_clamps_out_of_range_values() {
        let mut settings = DisplaySettings::default();
        let patch = DisplaySettingsPatch {
            font_size: Some(40),
            line_height: Some(0.5),
            auto_advance_secs: Some(0),
            brightness: Some(200),
            ..Default::default()
        };
        patch.apply_to(&mut settings);

        assert_eq!(settings.font_size, 24);
        assert_eq!(settings.line_height, 1.2);
        assert_eq!(settings.auto_advance_secs, 1);
        assert_eq!(settings.brightness, 100);
    }

    #[test]
    fn test_theme_colors() {
        assert_eq!(Theme::Light.background(), "#ffffff");
        assert_eq!(Theme::Dark.text_color(), "#e0e0e0");
        assert_eq!(Theme::Sepia.background(), "#f7f3e9");
    }

    #[test]
    fn test_status_from_label() {
        assert_eq!(BookStatus::from_label("Completed"), BookStatus::Completed);
        assert_eq!(BookStatus::from_label("COMPLETED "), BookStatus::Completed);
        assert_eq!(BookStatus::from_label("serializing"), BookStatus::Ongoing);
        assert_eq!(BookStatus::from_label(""), BookStatus::Ongoing);
    }

    #[test]
    fn test_book_decodes_without_optional_fields() {
        let book: Book =
            serde_json::from_str(r#"{"id": "loc-1", "title": "Sable Road"}"#).unwrap();
        assert_eq!(book.id.as_str(), "loc-1");
        assert_eq!(book.author, "");
        assert_eq!(book.status, BookStatus::Ongoing);
        assert_eq!(book.total_chapters, 0);
        assert!(book.tags.is_empty());
    }

    #[test]
    fn test_book_patch_merges_fields() {
        let mut book: Book =
            serde_json::from_str(r#"{"id": "loc-1", "title": "Sable Road"}"#).unwrap();
        let patch = BookPatch {
            status: Some(BookStatus::Completed),
            total_chapters: Some(120),
            ..Default::default()
        };
        patch.apply_to(&mut book);

        assert_eq!(book.status, BookStatus::Completed);
        assert_eq!(book.total_chapters, 120);
        assert_eq!(book.title, "Sable Road");
    }
}
