use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use tracing::debug;

use crate::GLOBAL_SECTION;
use crate::error::{Error, Result};
use crate::parser::Parser;
use crate::section::Section;

/// An ordered collection of sections.
///
/// Section names may repeat, except for the global section: adding a second one merges its
/// variables into the first.
#[derive(Debug, Clone, Default)]
pub struct Document {
    sections: Vec<Section>,
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `text`. The result always holds a global section, possibly empty.
    pub fn parse(text: &str) -> Result<Self> {
        let sections = Parser::new(text).into_sections()?;
        debug!(sections = sections.len(), "parsed document");
        Ok(Self { sections })
    }

    /// Read and parse the file at `path`.
    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading document");

        let text = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_owned(),
            source,
        })?;

        Self::parse(&text)
    }

    /// Serialize the document, refusing content that would not parse back unchanged.
    ///
    /// The [`fmt::Display`] impl writes the same text without this check.
    pub fn serialize(&self) -> Result<String> {
        for section in &self.sections {
            section.check_representable()?;
        }

        Ok(self.to_string())
    }

    /// Write the serialized document to `path` in a single call.
    ///
    /// Nothing is written when [`Document::serialize`] fails. The file is not replaced
    /// atomically; if the write fails, the previous content of `path` may be lost or partially
    /// overwritten.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = self.serialize()?;
        debug!(path = %path.display(), "writing document");

        fs::write(path, text).map_err(|source| Error::Write {
            path: path.to_owned(),
            source,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// All sections in document order.
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[must_use]
    pub fn global(&self) -> Option<&Section> {
        self.sections.iter().find(|section| section.is_global())
    }

    /// Whether this exact section instance (not merely its name) is part of the document.
    #[must_use]
    pub fn contains(&self, section: &Section) -> bool {
        self.sections.iter().any(|s| s.id() == section.id())
    }

    /// Add `section` and return the section now holding its content.
    ///
    /// A global section is merged into the existing global section when there is one, and that
    /// section is returned. Every other section is appended, even if its name is already taken.
    pub fn add_section(&mut self, section: Section) -> Result<&mut Section> {
        if self.contains(&section) {
            return Err(Error::DuplicateSection {
                section: section.name().to_owned(),
            });
        }

        Ok(self.insert(section))
    }

    /// Create an empty section named `name`, add it, and return it.
    pub fn new_section(&mut self, name: impl Into<String>) -> &mut Section {
        self.insert(Section::new(name))
    }

    /// Sections named `name`, in document order. An empty name selects the global section.
    pub fn get_sections(&self, name: &str) -> Result<Vec<&Section>> {
        let name = resolve(name);
        let sections = self
            .sections
            .iter()
            .filter(|section| section.name() == name)
            .collect::<Vec<_>>();

        if sections.is_empty() {
            return Err(section_not_found(name));
        }

        Ok(sections)
    }

    /// Mutable counterpart of [`Document::get_sections`].
    pub fn get_sections_mut(&mut self, name: &str) -> Result<Vec<&mut Section>> {
        let name = resolve(name);
        let sections = self
            .sections
            .iter_mut()
            .filter(|section| section.name() == name)
            .collect::<Vec<_>>();

        if sections.is_empty() {
            return Err(section_not_found(name));
        }

        Ok(sections)
    }

    /// The only value of `variable` in the only section named `section`.
    ///
    /// An empty `section` selects the global section. See [`Section::get_single_value`] for how
    /// `default` is reported.
    pub fn get_single_value(&self, section: &str, variable: &str, default: &str) -> Result<&str> {
        let sections = self.get_sections(section)?;
        match sections[..] {
            [only] => only.get_single_value(variable, default),
            _ => Err(Error::MultipleSections {
                section: resolve(section).to_owned(),
            }),
        }
    }

    /// Sections whose single value of `variable` equals `value`.
    ///
    /// Only sections named `section` are searched, or every section when `section` is empty. A
    /// candidate that lacks `variable` or holds several values for it fails the whole query.
    pub fn get_sections_by_var(
        &self,
        section: &str,
        variable: &str,
        value: &str,
    ) -> Result<Vec<&Section>> {
        let candidates = if section.is_empty() {
            self.sections.iter().collect()
        } else {
            self.get_sections(section)?
        };

        let mut matches = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if candidate.get_single_value(variable, "")? == value {
                matches.push(candidate);
            }
        }

        if matches.is_empty() {
            return Err(Error::NoMatchingSection {
                section: section.to_owned(),
                variable: variable.to_owned(),
                value: value.to_owned(),
            });
        }

        Ok(matches)
    }

    /// Add a duplicate of every section of `other`.
    pub fn merge(&mut self, other: &Document) {
        debug!(sections = other.len(), "merging document");

        for section in &other.sections {
            self.insert(section.duplicate());
        }
    }

    /// The global section, unless it is missing or empty.
    fn written_global(&self) -> Option<&Section> {
        self.global().filter(|global| !global.is_empty())
    }

    fn named_sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(|section| !section.is_global())
    }

    fn insert(&mut self, section: Section) -> &mut Section {
        if section.is_global() {
            if let Some(i) = self.sections.iter().position(Section::is_global) {
                let global = &mut self.sections[i];
                global.merge(&section);
                return global;
            }
        }

        self.sections.push(section);
        let last = self.sections.len() - 1;
        &mut self.sections[last]
    }
}

fn resolve(name: &str) -> &str {
    if name.is_empty() { GLOBAL_SECTION } else { name }
}

fn section_not_found(name: &str) -> Error {
    Error::SectionNotFound {
        section: name.to_owned(),
    }
}

/// Documents are equal when they hold the same content: a missing global section equals an empty
/// one, and the position of the global section is ignored.
impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.written_global() == other.written_global()
            && self.named_sections().eq(other.named_sections())
    }
}

impl Eq for Document {}

impl FromStr for Document {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// The global section comes first without a header; the remaining sections follow in document
/// order, separated by blank lines.
impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut blocks = self
            .written_global()
            .into_iter()
            .chain(self.named_sections());

        if let Some(first) = blocks.next() {
            write!(f, "{first}")?;
        }
        for section in blocks {
            write!(f, "\n{section}")?;
        }

        Ok(())
    }
}
