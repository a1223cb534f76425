//! Checklist document boundary support.
//!
//! This crate is responsible for translating on-disk checklist documents
//! (XML, with cross-file inclusion) into the core store types.
//!
//! Checklist meaning lives in `checklist-core`. This crate handles the file
//! format only: element and attribute handling, text accumulation across
//! parser chunks, and `<include>` resolution relative to the root document's
//! directory.

mod loader;

pub use loader::load_document;

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by the document loader.
///
/// Every variant is fatal to the session: a document that does not load
/// never produces a partially built store.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read checklist document {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed XML in {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        source: quick_xml::Error,
    },

    #[error("include cycle detected at {}", .0.display())]
    IncludeCycle(PathBuf),

    #[error("<include> element without an href attribute in {}", .0.display())]
    MissingHref(PathBuf),

    #[error("<checklist> element without a non-empty title in {}", .0.display())]
    MissingTitle(PathBuf),

    #[error("element <{element}> outside a checklist in {}", path.display())]
    MisplacedElement { element: String, path: PathBuf },

    #[error("unknown element <{element}> in {}", path.display())]
    UnknownElement { element: String, path: PathBuf },
}
