//! Rendering options and configuration.

use chrono::{Local, NaiveDate};

/// Options for rendering document content.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Date written to the front matter; today when unset
    pub date: Option<NaiveDate>,

    /// Include YAML front matter
    pub include_frontmatter: bool,

    /// Prefix for image paths in output (e.g., "./images/")
    pub image_path_prefix: String,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a fixed front matter date.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Enable or disable front matter.
    pub fn with_frontmatter(mut self, include: bool) -> Self {
        self.include_frontmatter = include;
        self
    }

    /// Set the image path prefix.
    pub fn with_image_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.image_path_prefix = prefix.into();
        self
    }

    /// Front matter date, resolved to today's local date when unset.
    pub fn resolved_date(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Local::now().date_naive())
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            date: None,
            include_frontmatter: true,
            image_path_prefix: String::new(),
        }
    }
}
