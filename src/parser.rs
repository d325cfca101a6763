use std::iter::Enumerate;
use std::mem;
use std::str::Lines;

use tracing::{debug, trace};

use crate::GLOBAL_SECTION;
use crate::error::{Error, ParseErrorKind, Result};
use crate::section::Section;

/// Lines starting with this character are skipped.
const COMMENT: char = '#';

/// Represents an on-going parse.
#[derive(Debug, Clone)]
pub(crate) struct Parser<'a> {
    lines: Enumerate<Lines<'a>>,
}

impl<'a> Parser<'a> {
    #[must_use]
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
        }
    }
}

impl Parser<'_> {
    /// Consume the input and return its sections, global section first.
    ///
    /// Stops at the first malformed line; nothing parsed so far is returned in that case.
    pub(crate) fn into_sections(self) -> Result<Vec<Section>> {
        let mut sections = Vec::<Section>::with_capacity(16);
        let mut current = Section::global();

        for (index, raw) in self.lines {
            let line = trim(raw.strip_suffix('\r').unwrap_or(raw));
            let number = index + 1;

            if line.trim().is_empty() || line.starts_with(COMMENT) {
                continue;
            }

            let fail = |kind| Error::Parse {
                line: number,
                content: line.to_owned(),
                kind,
            };

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                let name = parse_section_name(name).map_err(fail)?;
                debug!(line = number, section = name, "section start");

                // Each header opens a distinct section, even if the name was seen before.
                sections.push(mem::replace(&mut current, Section::new(name)));
                continue;
            }

            let (variable, value) = parse_entry(line).map_err(fail)?;
            trace!(line = number, section = current.name(), variable, value);
            current.add_values(variable, [value]);
        }

        sections.push(current);
        Ok(sections)
    }
}

/// Only spaces are trimmed; tabs and other whitespace are kept as content.
fn trim(s: &str) -> &str {
    s.trim_matches(' ')
}

fn single_line(s: &str) -> bool {
    !s.contains(['\n', '\r'])
}

/// Whether `[name]` reads back as a section called `name`.
pub(crate) fn fits_header(name: &str) -> bool {
    single_line(name) && trim(name) == name && parse_section_name(name).is_ok()
}

/// Whether `name=value` reads back with `name` as the variable.
pub(crate) fn fits_variable(name: &str) -> bool {
    single_line(name)
        && trim(name) == name
        && !name.is_empty()
        && !name.contains('=')
        && !name.starts_with([COMMENT, '['])
}

/// Whether `name=value` reads back with `value` as the value.
pub(crate) fn fits_value(value: &str) -> bool {
    single_line(value) && trim(value) == value && !value.is_empty()
}

fn parse_section_name(name: &str) -> std::result::Result<&str, ParseErrorKind> {
    let name = trim(name);

    if name.is_empty() {
        Err(ParseErrorKind::EmptySectionName)
    } else if name == GLOBAL_SECTION {
        Err(ParseErrorKind::ReservedSectionName)
    } else {
        Ok(name)
    }
}

/// Split on the first equal sign; later ones belong to the value.
fn parse_entry(line: &str) -> std::result::Result<(&str, &str), ParseErrorKind> {
    let (variable, value) = line
        .split_once('=')
        .ok_or(ParseErrorKind::MissingEqualSign)?;
    let (variable, value) = (trim(variable), trim(value));

    if variable.is_empty() {
        return Err(ParseErrorKind::EmptyVariable);
    }
    if value.is_empty() {
        return Err(ParseErrorKind::EmptyValue);
    }

    Ok((variable, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Vec<Section>> {
        Parser::new(text).into_sections()
    }

    fn parse_error(text: &str) -> (usize, ParseErrorKind) {
        match parse(text) {
            Err(Error::Parse { line, kind, .. }) => (line, kind),
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn entries_before_header_are_global() {
        let sections = parse("a = 1\n\n[Section]\nb = 2\n").expect("valid input");

        assert_eq!(sections.len(), 2);
        assert!(sections[0].is_global());
        assert_eq!(sections[0].get_values("a").expect("a is global"), ["1"]);
        assert_eq!(sections[1].name(), "Section");
        assert_eq!(sections[1].get_values("b").expect("b is in Section"), ["2"]);
    }

    #[test]
    fn repeated_keys_accumulate() {
        let sections = parse("[s]\nk = 1\nk = 2\nk = 3").expect("valid input");

        assert_eq!(sections[1].get_values("k").expect("k exists"), ["1", "2", "3"]);
    }

    #[test]
    fn repeated_headers_stay_distinct() {
        let sections = parse("[s]\nk = 1\n[s]\nk = 2\n").expect("valid input");

        assert_eq!(sections.len(), 3);
        assert_eq!(sections[1].get_values("k").expect("first s"), ["1"]);
        assert_eq!(sections[2].get_values("k").expect("second s"), ["2"]);
    }

    #[test]
    fn value_keeps_later_equal_signs() {
        let sections = parse("expr =  1+1=2 ").expect("valid input");

        assert_eq!(sections[0].get_values("expr").expect("expr exists"), ["1+1=2"]);
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let text = "# leading comment\n\n   \n\t\n[s]\n  # indented comment\nk=v\r\n";
        let sections = parse(text).expect("valid input");

        assert!(sections[0].is_empty());
        assert_eq!(sections[1].len(), 1);
        assert_eq!(sections[1].get_values("k").expect("k exists"), ["v"]);
    }

    #[test]
    fn only_spaces_are_trimmed() {
        let sections = parse("[s]\n  key\t = \tvalue\t \nlast = v\r").expect("valid input");

        assert_eq!(sections[1].get_variable_names(), ["key\t", "last"]);
        assert_eq!(sections[1].get_values("key\t").expect("key exists"), ["\tvalue\t"]);
        assert_eq!(sections[1].get_values("last").expect("last exists"), ["v"]);
    }

    #[test]
    fn empty_input_yields_only_global() {
        let sections = parse("").expect("empty input is valid");

        assert_eq!(sections.len(), 1);
        assert!(sections[0].is_global());
    }

    #[test]
    fn empty_section_name() {
        assert_eq!(
            parse_error("a=1\n\n[]\nb=2"),
            (3, ParseErrorKind::EmptySectionName)
        );
    }

    #[test]
    fn reserved_section_name() {
        let text = format!("[{GLOBAL_SECTION}]\nk=v");
        assert_eq!(parse_error(&text), (1, ParseErrorKind::ReservedSectionName));
    }

    #[test]
    fn missing_equal_sign() {
        assert_eq!(
            parse_error("[s]\nk=v\njust words"),
            (3, ParseErrorKind::MissingEqualSign)
        );
    }

    #[test]
    fn unterminated_header_is_not_a_header() {
        assert_eq!(
            parse_error("[s\nk=v"),
            (1, ParseErrorKind::MissingEqualSign)
        );
    }

    #[test]
    fn empty_variable() {
        assert_eq!(parse_error("  = value"), (1, ParseErrorKind::EmptyVariable));
    }

    #[test]
    fn empty_value() {
        assert_eq!(parse_error("[s]\nkey =  "), (2, ParseErrorKind::EmptyValue));
    }

    #[test]
    fn error_reports_offending_line() {
        let err = parse("[s]\nbroken line").expect_err("line has no equal sign");

        assert_eq!(err.line(), Some(2));
        assert!(err.to_string().contains("broken line"));
    }
}
