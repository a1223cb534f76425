//! Checklist data model.
//!
//! Value types produced by the document loader and consumed by the tracker
//! and workflow. These carry no behavior beyond construction helpers; all
//! mutation happens in the tracker's own row state, never here.

/// One line item of a checklist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    /// Instruction body shown to the operator. Always set once the owning
    /// checklist is fully loaded; loading is atomic per checklist.
    pub text: String,

    /// Default comment text shown before the operator edits the row.
    pub preset_comment: Option<String>,

    /// Optional reference link for the row.
    pub help_url: Option<String>,

    /// A header row is not meant to be verified: it starts out checked and
    /// renders distinctly.
    pub header_only: bool,
}

impl Instruction {
    /// Creates a plain instruction with no preset comment, no help URL and
    /// `header_only` off.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            preset_comment: None,
            help_url: None,
            header_only: false,
        }
    }
}

/// A named sequence of instructions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Checklist {
    /// Unique key within the store (non-empty).
    pub title: String,

    /// Instructions in source document order.
    pub instructions: Vec<Instruction>,

    /// Systems this checklist reports against, in document order.
    /// Duplicates are permitted; text is trimmed by the loader.
    pub affected_systems: Vec<String>,
}

impl Checklist {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            instructions: Vec::new(),
            affected_systems: Vec::new(),
        }
    }
}
