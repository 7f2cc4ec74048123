//! Package errors

use thiserror::Error;

pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

#[derive(Debug, Error)]
pub enum XlsxError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a readable zip container
    #[error("bad package container: {0}")]
    Package(#[from] zip::result::ZipError),

    #[error("malformed xml in {part}: {source}")]
    Xml {
        part: String,
        #[source]
        source: quick_xml::Error,
    },

    #[error("package has no {0} part")]
    MissingPart(String),

    #[error("unreadable cell in {part}: {detail}")]
    BadCell { part: String, detail: String },

    #[error(transparent)]
    Grid(#[from] tabula_core::Error),
}

impl XlsxError {
    pub(crate) fn xml(part: &str, source: quick_xml::Error) -> Self {
        XlsxError::Xml {
            part: part.to_string(),
            source,
        }
    }
}
