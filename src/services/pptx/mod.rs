//! PPTX template parsing.
//!
//! A `.pptx` file is a zip package of OOXML parts. This module opens the
//! package in memory, walks slides in presentation order and turns their
//! shapes, pictures, tables and charts into [`model::Presentation`]. Media
//! referenced by slides is handed to an [`assets::AssetSink`].

pub mod assets;
pub mod bundle;
pub mod extract;
pub mod model;
pub mod package;
pub mod presentation;
pub mod xml;

use thiserror::Error;

pub use assets::{AssetSink, DirectorySink, MemorySink};
pub use bundle::{BundleSummary, write_bundle};
pub use model::Presentation;
pub use package::{InflateLimits, PptxPackage};
pub use presentation::{parse_package, parse_presentation};

#[derive(Error, Debug)]
pub enum PptxError {
    #[error("Invalid package: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing part: {0}")]
    MissingPart(String),

    #[error("XML document has no root element")]
    EmptyDocument,

    #[error("Package does not contain a presentation")]
    NotAPresentation,

    #[error("Part {part} inflates beyond the {limit} byte limit")]
    PartTooLarge { part: String, limit: u64 },

    #[error("Package inflates beyond the {limit} byte limit")]
    PackageTooLarge { limit: u64 },
}

impl PptxError {
    /// True for errors raised by the inflate limits.
    pub fn is_limit(&self) -> bool {
        matches!(
            self,
            PptxError::PartTooLarge { .. } | PptxError::PackageTooLarge { .. }
        )
    }
}
