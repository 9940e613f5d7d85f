//! Extraction options and configuration.

/// Options controlling how raw source content is extracted.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Rename `.emf` graphics to `.png`
    pub force_png: bool,

    /// Whether to extract embedded graphics
    pub extract_graphics: bool,

    /// Whether to extract embedded equations
    pub extract_equations: bool,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the `.emf` to `.png` rename.
    pub fn with_force_png(mut self, force_png: bool) -> Self {
        self.force_png = force_png;
        self
    }

    /// Enable or disable graphic extraction.
    pub fn with_graphics(mut self, extract: bool) -> Self {
        self.extract_graphics = extract;
        self
    }

    /// Enable or disable equation extraction.
    pub fn with_equations(mut self, extract: bool) -> Self {
        self.extract_equations = extract;
        self
    }

    /// Extract text only.
    pub fn text_only(mut self) -> Self {
        self.extract_graphics = false;
        self.extract_equations = false;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            force_png: false,
            extract_graphics: true,
            extract_equations: true,
        }
    }
}
