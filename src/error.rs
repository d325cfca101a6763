use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("line {line}: {content}\n{kind}")]
    Parse {
        line: usize,
        content: String,
        kind: ParseErrorKind,
    },

    #[error("variable '{variable}' does not exist in section '{section}'")]
    VariableNotFound {
        section: String,
        variable: String,
        /// The fallback the caller passed to the single-value lookup, if any.
        default: Option<String>,
    },

    #[error("section '{section}' does not exist in this document")]
    SectionNotFound { section: String },

    #[error("cannot find section '{section}' where {variable}={value}")]
    NoMatchingSection {
        section: String,
        variable: String,
        value: String,
    },

    #[error("variable '{variable}' has multiple values in section '{section}'")]
    MultipleValues { section: String, variable: String },

    #[error("multiple sections with name '{section}'")]
    MultipleSections { section: String },

    #[error("section '{section}' is already part of this document; duplicate it before adding it again")]
    DuplicateSection { section: String },

    #[error("section '{section}' cannot be written as text: {reason}")]
    Unrepresentable {
        section: String,
        reason: Unrepresentable,
    },

    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// True for every flavour of "nothing matched": a missing variable, a missing section, or an
    /// empty predicate query.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::VariableNotFound { .. }
                | Self::SectionNotFound { .. }
                | Self::NoMatchingSection { .. }
        )
    }

    /// The default handed to a single-value lookup whose variable was absent.
    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        match self {
            Self::VariableNotFound { default, .. } => default.as_deref(),
            _ => None,
        }
    }

    /// The 1-based line a parse failure points at.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match *self {
            Self::Parse { line, .. } => Some(line),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("section name cannot be empty")]
    EmptySectionName,
    #[error("section name is reserved for global variables")]
    ReservedSectionName,
    #[error("missing equal sign?")]
    MissingEqualSign,
    #[error("zero-length variable names are not allowed")]
    EmptyVariable,
    #[error("zero-length values are not allowed")]
    EmptyValue,
}

/// Content that the text format cannot carry: writing it would produce a file that fails to parse
/// or parses back differently.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Unrepresentable {
    #[error("section name {0:?} does not fit in a header")]
    SectionName(String),
    #[error("variable name {0:?} does not fit before an equal sign")]
    Variable(String),
    #[error("value {value:?} of variable '{variable}' does not fit on one line")]
    Value { variable: String, value: String },
}
