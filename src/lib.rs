//! INI-like configuration documents where keys may repeat to hold several values and section
//! names may repeat to hold several distinct sections.
//!
//! ```
//! use vconfig::Document;
//!
//! let document = Document::parse("[server]\nport = 80\nport = 443\n")?;
//! let servers = document.get_sections("server")?;
//! assert_eq!(servers[0].get_values("port")?, ["80", "443"]);
//! # Ok::<(), vconfig::Error>(())
//! ```
#![warn(
    clippy::correctness,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::style,
    clippy::pedantic
)]
#![allow(clippy::missing_errors_doc)]

mod document;
mod error;
mod parser;
mod section;

pub use document::Document;
pub use error::{Error, ParseErrorKind, Result, Unrepresentable};
pub use section::{Iter, Section, SectionId};

/// Name of the section holding the variables that precede the first header.
///
/// It cannot appear as a header in parsed text; an empty section name passed to a [`Document`]
/// lookup refers to it.
pub const GLOBAL_SECTION: &str = "__globalvars__";
