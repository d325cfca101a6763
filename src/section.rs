use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use indexmap::map::Entry;
use tracing::trace;

use crate::GLOBAL_SECTION;
use crate::error::{Error, Result, Unrepresentable};
use crate::parser::{fits_header, fits_value, fits_variable};

/// Identity of a section instance.
///
/// Every call to [`Section::new`] or [`Section::duplicate`] mints a fresh id. Cloning keeps the
/// id, so a clone counts as the same instance when it is added to a [`crate::Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionId(u64);

impl SectionId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A named collection of variables, each holding one or more values in insertion order.
///
/// A variable present in the section never maps to an empty list.
#[derive(Debug, Clone)]
pub struct Section {
    id: SectionId,
    name: String,
    entries: IndexMap<String, Vec<String>>,
}

impl Section {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SectionId::next(),
            name: name.into(),
            entries: IndexMap::new(),
        }
    }

    /// An empty section carrying the reserved global name.
    #[must_use]
    pub fn global() -> Self {
        Self::new(GLOBAL_SECTION)
    }

    #[must_use]
    pub fn id(&self) -> SectionId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_global(&self) -> bool {
        self.name == GLOBAL_SECTION
    }

    /// Number of variables (not values) in the section.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterate over `(variable, values)` pairs in the order variables were first added.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    /// Replace the values of `name`. An empty `values` removes the variable.
    pub fn set_values<I, S>(&mut self, name: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let values = values.into_iter().map(Into::into).collect::<Vec<String>>();

        if values.is_empty() {
            self.entries.shift_remove(&name);
        } else {
            self.entries.insert(name, values);
        }
    }

    /// Append `values` after any existing values of `name`. An empty `values` is a no-op.
    pub fn add_values<I, S>(&mut self, name: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut values = values.into_iter().map(Into::into).peekable();
        if values.peek().is_none() {
            return;
        }

        match self.entries.entry(name.into()) {
            Entry::Occupied(mut entry) => entry.get_mut().extend(values),
            Entry::Vacant(entry) => {
                entry.insert(values.collect());
            }
        }
    }

    pub fn get_values(&self, name: &str) -> Result<&[String]> {
        self.entries
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| self.variable_not_found(name, None))
    }

    /// Return the only value of `name`.
    ///
    /// A missing variable yields [`Error::VariableNotFound`] carrying `default`, which the caller
    /// can recover with [`Error::default_value`]. More than one value yields
    /// [`Error::MultipleValues`] and no fallback.
    pub fn get_single_value(&self, name: &str, default: &str) -> Result<&str> {
        match self.entries.get(name).map(Vec::as_slice) {
            None => Err(self.variable_not_found(name, Some(default))),
            Some([value]) => Ok(value.as_str()),
            Some(_) => Err(Error::MultipleValues {
                section: self.name.clone(),
                variable: name.to_owned(),
            }),
        }
    }

    /// Names of all variables. Callers needing a particular order should sort the result.
    #[must_use]
    pub fn get_variable_names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Deep copy under a new identity.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        Self {
            id: SectionId::next(),
            name: self.name.clone(),
            entries: self.entries.clone(),
        }
    }

    /// Append every variable of `other` to this section as [`Section::add_values`] would.
    pub fn merge(&mut self, other: &Section) {
        trace!(into = %self.name, from = %other.name, "merging section");

        for (name, values) in &other.entries {
            self.add_values(name.as_str(), values.iter().map(String::as_str));
        }
    }

    /// Drop every variable, keeping the name.
    pub fn clear_content(&mut self) {
        self.entries.clear();
    }

    /// Fail if the text written for this section would not parse back to the same content.
    pub fn check_representable(&self) -> Result<()> {
        let fail = |reason| Error::Unrepresentable {
            section: self.name.clone(),
            reason,
        };

        if !self.is_global() && !fits_header(&self.name) {
            return Err(fail(Unrepresentable::SectionName(self.name.clone())));
        }

        for (variable, values) in &self.entries {
            if !fits_variable(variable) {
                return Err(fail(Unrepresentable::Variable(variable.clone())));
            }
            if let Some(value) = values.iter().find(|v| !fits_value(v)) {
                return Err(fail(Unrepresentable::Value {
                    variable: variable.clone(),
                    value: value.clone(),
                }));
            }
        }

        Ok(())
    }

    fn variable_not_found(&self, name: &str, default: Option<&str>) -> Error {
        Error::VariableNotFound {
            section: self.name.clone(),
            variable: name.to_owned(),
            default: default.map(str::to_owned),
        }
    }
}

/// Iterator over the variables of a [`Section`], created by [`Section::iter`].
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    inner: indexmap::map::Iter<'a, String, Vec<String>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a [String]);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a Section {
    type Item = (&'a str, &'a [String]);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Sections compare by name and content; identity is ignored.
impl PartialEq for Section {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.entries == other.entries
    }
}

impl Eq for Section {}

/// Writes the `[name]` header (skipped for the global section) and one `key=value` line per value.
impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_global() {
            writeln!(f, "[{}]", self.name)?;
        }

        for (name, values) in &self.entries {
            for value in values {
                writeln!(f, "{name}={value}")?;
            }
        }

        Ok(())
    }
}
