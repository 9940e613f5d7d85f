//! Embedded content attached to paragraphs (graphics, equations).

use serde::{Deserialize, Serialize};

/// An embedded image extracted from the source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graphic {
    /// File name the graphic is written and referenced under
    pub name: String,

    /// Original file name of the media part inside the package
    pub path: String,

    /// Raw binary data
    #[serde(skip_serializing, default)]
    pub data: Vec<u8>,
}

impl Graphic {
    /// Create a new graphic.
    pub fn new(name: impl Into<String>, path: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            data,
        }
    }

    /// Get the size of the payload in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Lower-cased file extension of the output name, if any.
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
    }
}

/// An equation in portable math markup (MathML).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equation {
    /// MathML markup
    pub mathml: String,
}

impl Equation {
    /// Create a new equation from MathML markup.
    pub fn new(mathml: impl Into<String>) -> Self {
        Self {
            mathml: mathml.into(),
        }
    }
}
