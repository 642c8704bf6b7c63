// src/sheet/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Anything that stops a workbook from being read.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("cannot open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not a readable spreadsheet archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("archive has no part named {0}")]
    MissingPart(String),

    #[error("first sheet refers to undeclared relationship {0}")]
    UnresolvedSheet(String),

    #[error("part {0} is not valid UTF-8")]
    Encoding(String),

    #[error("malformed XML in {part}: {source}")]
    Xml {
        part: String,
        #[source]
        source: quick_xml::Error,
    },
}

impl FormatError {
    pub(crate) fn xml(part: &str, source: impl Into<quick_xml::Error>) -> Self {
        FormatError::Xml {
            part: part.to_string(),
            source: source.into(),
        }
    }
}
