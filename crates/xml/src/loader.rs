//! Streaming checklist document parser.
//!
//! Documents are parsed event by event. Instruction text can arrive split
//! across several text and CDATA events (entities split the stream), so it
//! is accumulated and only trimmed once the element closes.
//!
//! `<include href>` pulls in external fragments. Hrefs resolve against the
//! directory of the ROOT document, never the including fragment's directory
//! and never the process working directory. A fragment that transitively
//! includes itself fails the load.

use std::fs;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use checklist_core::{Checklist, ChecklistStore, Instruction};

use crate::LoadError;

/// Loads a checklist document and every fragment it includes.
///
/// # Arguments
///
/// * `path` - Path to the root document. Its parent directory becomes the
///   base for every `<include href>` in the document tree.
///
/// # Returns
///
/// The fully built store. Iteration order follows declaration order across
/// the whole document tree; a duplicate title keeps the earlier position
/// but carries the later checklist.
///
/// # Errors
///
/// Returns `LoadError` if:
/// - The root document or any included fragment cannot be read
/// - The XML is not well-formed
/// - An include cycle is detected
/// - A `<checklist>` lacks a non-empty `title`
/// - An element appears outside its permitted context
/// - An unknown element is encountered
pub fn load_document(path: &Path) -> Result<ChecklistStore, LoadError> {
    let root_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut store = ChecklistStore::new();
    let mut in_progress = Vec::new();
    parse_file(path, &root_dir, &mut store, &mut in_progress)?;

    tracing::debug!(
        document = %path.display(),
        checklists = store.len(),
        "checklist document loaded"
    );
    Ok(store)
}

fn parse_file(
    path: &Path,
    root_dir: &Path,
    store: &mut ChecklistStore,
    in_progress: &mut Vec<PathBuf>,
) -> Result<(), LoadError> {
    let canonical = path.canonicalize().map_err(|source| LoadError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    if in_progress.contains(&canonical) {
        return Err(LoadError::IncludeCycle(canonical));
    }

    let content = fs::read_to_string(&canonical).map_err(|source| LoadError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    in_progress.push(canonical);
    let result = parse_content(&content, path, root_dir, store, in_progress);
    in_progress.pop();
    result
}

fn parse_content(
    content: &str,
    path: &Path,
    root_dir: &Path,
    store: &mut ChecklistStore,
    in_progress: &mut Vec<PathBuf>,
) -> Result<(), LoadError> {
    let mut reader = Reader::from_str(content);
    let mut parser = FileParser {
        path,
        root_dir,
        store,
        in_progress,
        checklist: None,
        instruction: None,
        system_text: None,
    };

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => parser.handle_open(&e, false)?,
            Ok(Event::Empty(e)) => parser.handle_open(&e, true)?,
            Ok(Event::End(e)) => parser.handle_close(e.name().as_ref()),
            Ok(Event::Text(t)) => {
                let text = t.unescape().map_err(|source| parser.malformed(source))?;
                parser.append_text(&text);
            }
            Ok(Event::CData(t)) => {
                let bytes = t.into_inner();
                parser.append_text(&String::from_utf8_lossy(&bytes));
            }
            Ok(Event::Eof) => {
                parser.finish()?;
                break;
            }
            // Declarations, comments and processing instructions carry no
            // checklist content.
            Ok(_) => {}
            Err(source) => {
                return Err(LoadError::Malformed {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }
    }

    Ok(())
}

#[derive(Default)]
struct InstructionBuilder {
    preset_comment: Option<String>,
    help_url: Option<String>,
    header_only: bool,
    text: String,
}

impl InstructionBuilder {
    fn finish(self) -> Instruction {
        Instruction {
            text: self.text.trim().to_string(),
            preset_comment: self.preset_comment,
            help_url: self.help_url,
            header_only: self.header_only,
        }
    }
}

struct FileParser<'a> {
    path: &'a Path,
    root_dir: &'a Path,
    store: &'a mut ChecklistStore,
    in_progress: &'a mut Vec<PathBuf>,
    checklist: Option<Checklist>,
    instruction: Option<InstructionBuilder>,
    system_text: Option<String>,
}

impl FileParser<'_> {
    fn handle_open(&mut self, e: &BytesStart, is_empty: bool) -> Result<(), LoadError> {
        match e.name().as_ref() {
            b"checklists" => {
                if self.checklist.is_some() {
                    return Err(self.misplaced("checklists"));
                }
                Ok(())
            }
            b"include" => {
                if self.checklist.is_some() {
                    return Err(self.misplaced("include"));
                }
                self.handle_include(e)
            }
            b"checklist" => {
                if self.checklist.is_some() {
                    return Err(self.misplaced("checklist"));
                }
                let title = self
                    .attribute(e, b"title")?
                    .map(|t| t.trim().to_string())
                    .unwrap_or_default();
                if title.is_empty() {
                    return Err(LoadError::MissingTitle(self.path.to_path_buf()));
                }
                let checklist = Checklist::new(title);
                if is_empty {
                    self.insert_checklist(checklist);
                } else {
                    self.checklist = Some(checklist);
                }
                Ok(())
            }
            b"instruction" => {
                if self.checklist.is_none() || self.instruction.is_some() {
                    return Err(self.misplaced("instruction"));
                }
                let builder = self.instruction_from(e)?;
                if is_empty {
                    if let Some(checklist) = self.checklist.as_mut() {
                        checklist.instructions.push(builder.finish());
                    }
                } else {
                    self.instruction = Some(builder);
                }
                Ok(())
            }
            b"affected-system" => {
                if self.checklist.is_none() || self.instruction.is_some() {
                    return Err(self.misplaced("affected-system"));
                }
                if is_empty {
                    if let Some(checklist) = self.checklist.as_mut() {
                        checklist.affected_systems.push(String::new());
                    }
                } else {
                    self.system_text = Some(String::new());
                }
                Ok(())
            }
            other => Err(LoadError::UnknownElement {
                element: String::from_utf8_lossy(other).into_owned(),
                path: self.path.to_path_buf(),
            }),
        }
    }

    fn handle_close(&mut self, name: &[u8]) {
        match name {
            b"checklist" => {
                if let Some(checklist) = self.checklist.take() {
                    self.insert_checklist(checklist);
                }
            }
            b"instruction" => {
                if let Some(builder) = self.instruction.take() {
                    if let Some(checklist) = self.checklist.as_mut() {
                        checklist.instructions.push(builder.finish());
                    }
                }
            }
            b"affected-system" => {
                if let Some(text) = self.system_text.take() {
                    if let Some(checklist) = self.checklist.as_mut() {
                        checklist.affected_systems.push(text.trim().to_string());
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_include(&mut self, e: &BytesStart) -> Result<(), LoadError> {
        let href = self
            .attribute(e, b"href")?
            .filter(|h| !h.is_empty())
            .ok_or_else(|| LoadError::MissingHref(self.path.to_path_buf()))?;

        let target = self.root_dir.join(&href);
        tracing::debug!(
            href = %href,
            target = %target.display(),
            "resolving checklist include"
        );
        parse_file(&target, self.root_dir, self.store, self.in_progress)
    }

    fn instruction_from(&self, e: &BytesStart) -> Result<InstructionBuilder, LoadError> {
        let mut builder = InstructionBuilder::default();
        for attr in e.attributes() {
            let attr =
                attr.map_err(|err| self.malformed(quick_xml::Error::InvalidAttr(err)))?;
            let value = attr.unescape_value().map_err(|err| self.malformed(err))?;
            match attr.key.as_ref() {
                b"preset-comment" => builder.preset_comment = Some(value.into_owned()),
                b"help-url" => builder.help_url = Some(value.into_owned()),
                b"header-only" => builder.header_only = self.parse_header_flag(&value),
                other => tracing::debug!(
                    attribute = %String::from_utf8_lossy(other),
                    document = %self.path.display(),
                    "ignoring unknown instruction attribute"
                ),
            }
        }
        Ok(builder)
    }

    fn parse_header_flag(&self, raw: &str) -> bool {
        match raw {
            "true" => true,
            "false" => false,
            other => {
                tracing::warn!(
                    value = other,
                    document = %self.path.display(),
                    "malformed header-only value, treating as false"
                );
                false
            }
        }
    }

    fn attribute(&self, e: &BytesStart, key: &[u8]) -> Result<Option<String>, LoadError> {
        for attr in e.attributes() {
            let attr =
                attr.map_err(|err| self.malformed(quick_xml::Error::InvalidAttr(err)))?;
            if attr.key.as_ref() == key {
                let value = attr.unescape_value().map_err(|err| self.malformed(err))?;
                return Ok(Some(value.into_owned()));
            }
        }
        Ok(None)
    }

    fn insert_checklist(&mut self, checklist: Checklist) {
        let title = checklist.title.clone();
        if self.store.insert(checklist) {
            tracing::warn!(
                title = %title,
                document = %self.path.display(),
                "duplicate checklist title, the later declaration replaces the earlier one"
            );
        }
    }

    fn append_text(&mut self, text: &str) {
        if let Some(builder) = self.instruction.as_mut() {
            builder.text.push_str(text);
        } else if let Some(system) = self.system_text.as_mut() {
            system.push_str(text);
        }
    }

    fn finish(&self) -> Result<(), LoadError> {
        if self.checklist.is_some() || self.instruction.is_some() || self.system_text.is_some() {
            return Err(self.malformed(quick_xml::Error::UnexpectedEof(
                "checklist document ended inside an open element".into(),
            )));
        }
        Ok(())
    }

    fn malformed(&self, source: quick_xml::Error) -> LoadError {
        LoadError::Malformed {
            path: self.path.to_path_buf(),
            source,
        }
    }

    fn misplaced(&self, element: &str) -> LoadError {
        LoadError::MisplacedElement {
            element: element.to_string(),
            path: self.path.to_path_buf(),
        }
    }
}
