//! JUnit XML reports.
//!
//! Failures are expected to carry ESLint-style text such as
//! `line 5, col 3, Error - Unexpected token (no-unused-vars)`.
//!
//! The parsed document borrows the report buffer, so the source collects
//! all problems of a report while validating it and then hands them out
//! one at a time. Laziness applies across reports, not within one.
//!
//! The structure written is:
//! - `<testsuites>` - root element
//! - `<testsuite>` - one per file name, sorted, only for files with problems
//! - `<testcase>` - one per problem, each with a `<failure>`

use std::collections::BTreeMap;
use std::io::Write;

use regex::Regex;
use report_alchemy_core::{
    AlchemyError, HandlerOptions, Position, Problem, ProblemIter, Severity, SinkHandler,
    SinkInput, SinkWriter, SourceHandler,
};
use roxmltree::{Document, Node};
use tracing::debug;

use crate::xml_text;

const FAILURE_PATTERN: &str = r"^line (\d+), col (\d+), (Error|Warning) - (.+) \((.+)\)$";

/// Reads problems from JUnit XML.
pub struct JunitSource {
    failure_pattern: Regex,
}

impl JunitSource {
    /// Creates the source handler, compiling the failure text pattern.
    pub fn new() -> Result<Self, AlchemyError> {
        let failure_pattern =
            Regex::new(FAILURE_PATTERN).map_err(|e| AlchemyError::handler_load(e.to_string()))?;
        Ok(Self { failure_pattern })
    }

    /// Parses structured failure text. Anything else, including a line or
    /// column that does not fit in `u32`, becomes an error at 1:1 whose
    /// message is the whole text.
    fn parse_failure(&self, filename: &str, text: &str) -> Problem {
        let parsed = self.failure_pattern.captures(text).and_then(|caps| {
            let line = caps[1].parse().ok()?;
            let column = caps[2].parse().ok()?;
            let severity = if &caps[3] == "Error" {
                Severity::Error
            } else {
                Severity::Warning
            };
            Some(
                Problem::new(filename, &caps[4], Position::new(line, column))
                    .with_severity(severity)
                    .with_code(&caps[5]),
            )
        });

        parsed.unwrap_or_else(|| Problem::new(filename, text, Position::default()))
    }
}

fn children_named<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |child| child.is_element() && child.has_tag_name(name))
}

fn text_of(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

impl SourceHandler for JunitSource {
    fn read(&self, buffer: Vec<u8>, _: &HandlerOptions) -> Result<ProblemIter, AlchemyError> {
        let text = String::from_utf8(buffer)
            .map_err(|e| AlchemyError::invalid_source(format!("JUnit report is not UTF-8: {}", e)))?;
        let doc = Document::parse(&text)
            .map_err(|e| AlchemyError::invalid_source(format!("Malformed JUnit XML: {}", e)))?;

        let root = doc.root_element();
        if !root.has_tag_name("testsuites") {
            return Err(AlchemyError::invalid_source(format!(
                "Expected <testsuites> root element, found <{}>",
                root.tag_name().name()
            )));
        }

        let mut problems = Vec::new();
        for suite in children_named(root, "testsuite") {
            let filename = suite.attribute("name").unwrap_or_default();

            for testcase in children_named(suite, "testcase") {
                let Some(failure) = children_named(testcase, "failure").next() else {
                    continue;
                };
                problems.push(self.parse_failure(filename, &text_of(failure)));
            }
        }

        debug!("Parsed {} problem(s) from JUnit report", problems.len());

        Ok(Box::new(problems.into_iter().map(Ok)))
    }
}

/// Writes problems as JUnit XML.
pub struct JunitSink;

impl SinkHandler for JunitSink {
    fn open(
        &self,
        mut destination: Box<dyn Write + Send>,
        _: &HandlerOptions,
    ) -> Result<Box<dyn SinkWriter>, AlchemyError> {
        destination.write_all(b"<?xml version=\"1.0\" encoding=\"utf-8\"?>\n")?;
        destination.write_all(b"<testsuites>\n")?;

        Ok(Box::new(JunitWriter {
            destination,
            problems_for_files: BTreeMap::new(),
            finished: false,
        }))
    }
}

/// Collects problems per file, since a `<testsuite>` needs its problem
/// count before any of its test cases are written.
struct JunitWriter {
    destination: Box<dyn Write + Send>,
    problems_for_files: BTreeMap<String, Vec<Problem>>,
    finished: bool,
}

impl JunitWriter {
    fn write_suite(&mut self, filename: &str, problems: &[Problem]) -> std::io::Result<()> {
        let out = &mut self.destination;

        out.write_all(b"<testsuite package=\"org.report\" time=\"0\"")?;
        write!(out, "{}", xml_text!(" tests=\"{}\"", problems.len()))?;
        write!(out, "{}", xml_text!(" errors=\"{}\"", problems.len()))?;
        write!(out, "{}", xml_text!(" name=\"{}\">\n", filename))?;

        for problem in problems {
            let code = problem.code.as_deref().filter(|code| !code.is_empty());
            let name = match code {
                Some(code) => format!("org.report.{}", code),
                None => "org.report.error".to_string(),
            };
            let severity = match problem.severity {
                Severity::Error => "Error",
                Severity::Warning | Severity::Info => "Warning",
            };
            let Position { line, column } = problem.start;

            write!(out, "{}", xml_text!("<testcase time=\"0\" name=\"{}\">", name))?;
            write!(out, "{}", xml_text!("<failure message=\"{}\">", problem.message))?;
            write!(out, "{}", xml_text!("line {}, col {}, {}", line, column, severity))?;
            write!(out, "{}", xml_text!(" - {}", problem.message))?;
            if let Some(code) = code {
                write!(out, "{}", xml_text!(" ({})", code))?;
            }
            out.write_all(b"</failure></testcase>\n")?;
        }

        out.write_all(b"</testsuite>\n")
    }

    fn finish(&mut self) -> std::io::Result<()> {
        let entries = std::mem::take(&mut self.problems_for_files);
        for (filename, problems) in entries.iter().filter(|(_, p)| !p.is_empty()) {
            self.write_suite(filename, problems)?;
        }

        self.destination.write_all(b"</testsuites>\n")?;
        self.destination.flush()
    }
}

impl SinkWriter for JunitWriter {
    fn accept(&mut self, input: SinkInput<'_>) -> Result<(), AlchemyError> {
        if self.finished {
            return Ok(());
        }

        match input {
            SinkInput::Problem(problem) => {
                self.problems_for_files
                    .entry(problem.filename.clone())
                    .or_default()
                    .push(problem.clone());
            }
            SinkInput::End => {
                self.finished = true;
                self.finish()?;
            }
        }

        Ok(())
    }
}
