//! Graph parser: logical markup lines to [`TaskRecords`].
//!
//! Parsing is a two-step state machine. [`classify_line`] maps one logical
//! line to a [`LineEvent`] given the current [`ParserState`], and
//! [`ParserState::apply`] folds that event into the records. Keeping the two
//! apart lets the transitions be tested without building whole graphs.
//!
//! The parser only understands the subset of tags written by the graph
//! builder: `<node>`, `<operator>`, `<parameters>`, `<sources>` and the
//! presentation block, which ends parsing.

use std::fs;
use std::path::Path;

use super::identity::TaskIdentity;
use super::normalize::normalize_lines;
use super::record::{TaskRecord, TaskRecords};
use crate::{glog_debug, glog_trace, glog_warn, Error, Result};

const NODE_OPEN: &str = "<node ";
const OPERATOR_OPEN: &str = "<operator>";
const PARAMETERS_CLOSE: &str = "</parameters>";
const SOURCES_OPEN: &str = "<sources>";
const SOURCES_CLOSE: &str = "</sources>";
const SOURCE_PRODUCT: &str = "sourceProduct";
const PRESENTATION_MARKER: &str = "Presentation";
const ESCAPED_QUOTE: &str = "&quot";

/// Options controlling how the parser treats ambiguous input.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Fail on a repeated task identity instead of replacing the earlier
    /// record.
    pub strict_identities: bool,
}

/// What a single logical line means to the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    NodeOpened(TaskIdentity),
    Operator(String),
    ParametersOpened,
    ParametersClosed,
    Parameter { name: String, value: String },
    SourcesOpened,
    SourcesClosed,
    Source(TaskIdentity),
    /// Start of the presentation block; nothing after it is parsed.
    Presentation,
    Ignored,
}

/// Parser position: the task being filled and which section is open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParserState {
    pub current: Option<String>,
    pub in_parameters: bool,
    pub in_sources: bool,
}

/// Classify one logical line. Checks run in a fixed priority order, so a
/// node tag always wins and the presentation marker is only seen outside
/// the parameters and sources sections.
pub fn classify_line(state: &ParserState, line: &str) -> Result<LineEvent> {
    if line.contains(NODE_OPEN) {
        let identity = TaskIdentity::from_quoted(line)
            .ok_or_else(|| Error::MalformedIdentity(line.to_string()))?;
        return Ok(LineEvent::NodeOpened(identity));
    }
    if line.contains(OPERATOR_OPEN) {
        let operator = line
            .split('>')
            .nth(1)
            .and_then(|rest| rest.split('<').next())
            .unwrap_or_default();
        return Ok(LineEvent::Operator(operator.to_string()));
    }
    if opens_parameters(line) {
        return Ok(LineEvent::ParametersOpened);
    }
    if line.contains(PARAMETERS_CLOSE) {
        return Ok(LineEvent::ParametersClosed);
    }
    if state.in_parameters {
        return Ok(parse_parameter(line).unwrap_or(LineEvent::Ignored));
    }
    if line.contains(SOURCES_OPEN) {
        return Ok(LineEvent::SourcesOpened);
    }
    if line.contains(SOURCES_CLOSE) {
        return Ok(LineEvent::SourcesClosed);
    }
    if state.in_sources {
        if !line.contains(SOURCE_PRODUCT) {
            return Ok(LineEvent::Ignored);
        }
        let identity = TaskIdentity::from_quoted(line)
            .ok_or_else(|| Error::MalformedIdentity(line.to_string()))?;
        return Ok(LineEvent::Source(identity));
    }
    if line.contains(PRESENTATION_MARKER) {
        return Ok(LineEvent::Presentation);
    }
    Ok(LineEvent::Ignored)
}

/// `<parameters>` or `<parameters attr=...>`, but not a self-closing tag.
fn opens_parameters(line: &str) -> bool {
    let Some(start) = line.find("<parameters") else {
        return false;
    };
    let rest = &line[start + "<parameters".len()..];
    let tag = rest.split('>').next().unwrap_or_default();
    (rest.starts_with('>') || rest.starts_with(' ')) && !tag.ends_with('/')
}

/// Read `<name>value</name>`. Self-closing tags, values holding an escaped
/// quote and lines without a name are not parameters.
fn parse_parameter(line: &str) -> Option<LineEvent> {
    let head = line.split("</").next().unwrap_or_default().replace('<', "");
    let mut parts = head.split('>');
    let name = parts.next()?;
    let value = parts.next()?;
    if name.is_empty() || name.ends_with('/') || value.contains(ESCAPED_QUOTE) {
        return None;
    }
    Some(LineEvent::Parameter {
        name: name.to_string(),
        value: value.to_string(),
    })
}

impl ParserState {
    /// Fold one event into `records`. Returns `false` once parsing must stop.
    pub fn apply(
        &mut self,
        records: &mut TaskRecords,
        event: LineEvent,
        options: ParseOptions,
    ) -> Result<bool> {
        match event {
            LineEvent::NodeOpened(identity) => {
                let key = identity.key();
                if records.contains(&key) {
                    if options.strict_identities {
                        return Err(Error::DuplicateTask(key));
                    }
                    glog_warn!("Task {} defined twice, keeping the later node", key);
                }
                glog_debug!("Parser: node {}", key);
                records.insert(TaskRecord::new(&identity));
                self.current = Some(key);
            }
            LineEvent::Operator(operator) => {
                self.current_record(records, "operator")?.operator = operator;
            }
            LineEvent::ParametersOpened => self.in_parameters = true,
            LineEvent::ParametersClosed => self.in_parameters = false,
            LineEvent::Parameter { name, value } => {
                self.current_record(records, "parameter")?
                    .parameters
                    .insert(&name, &value);
            }
            LineEvent::SourcesOpened => self.in_sources = true,
            LineEvent::SourcesClosed => self.in_sources = false,
            LineEvent::Source(identity) => {
                self.current_record(records, "source")?.add_source(identity);
            }
            LineEvent::Presentation => {
                glog_debug!("Parser: presentation block reached, stopping");
                return Ok(false);
            }
            LineEvent::Ignored => {}
        }
        Ok(true)
    }

    fn current_record<'r>(
        &self,
        records: &'r mut TaskRecords,
        what: &str,
    ) -> Result<&'r mut TaskRecord> {
        self.current
            .as_deref()
            .and_then(|key| records.get_mut(key))
            .ok_or_else(|| Error::Parse {
                line: 0,
                message: format!("{} outside of a node", what),
            })
    }
}

/// Parse normalized lines into records, without linking next tasks.
pub fn parse_lines<S: AsRef<str>>(lines: &[S], options: ParseOptions) -> Result<TaskRecords> {
    let mut records = TaskRecords::new();
    let mut state = ParserState::default();

    for (number, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        glog_trace!("Parser line {}: {}", number + 1, line);
        let event = classify_line(&state, line)?;
        let proceed = state.apply(&mut records, event, options).map_err(|e| match e {
            Error::Parse { message, .. } => Error::Parse {
                line: number + 1,
                message,
            },
            other => other,
        })?;
        if !proceed {
            break;
        }
    }

    Ok(records)
}

/// Normalize, parse and link a whole graph description.
pub fn parse_str(text: &str, options: ParseOptions) -> Result<TaskRecords> {
    let lines = normalize_lines(text.lines())?;
    let mut records = parse_lines(&lines, options)?;
    records.link_next_tasks()?;
    glog_debug!("Parsed {} tasks", records.len());
    Ok(records)
}

pub fn parse_file(path: &Path, options: ParseOptions) -> Result<TaskRecords> {
    glog_debug!("Parsing graph file {}", path.display());
    parse_str(&fs::read_to_string(path)?, options)
}
