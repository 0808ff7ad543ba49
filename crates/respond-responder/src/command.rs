//! Command recognition for messages addressed to the robot.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// Character that may not appear in a trigger.
pub const TRIGGER_DELIMITER: char = '|';

static ADD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)^respond\s+to\s+(.+?)\s+with\s+(.+)$").unwrap());
static DELETE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)^delete\s+respond\s+to\s+(.+)$").unwrap());
static LIST_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^list\s+responds$").unwrap());

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("trigger {0:?} contains the reserved '|' character")]
    ReservedCharacter(String),
}

/// A recognised respond command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `respond to <trigger> with <response>`
    Add { trigger: String, response: String },
    /// `delete respond to <trigger>`
    Delete { trigger: String },
    /// `list responds`
    List,
}

/// Detects messages addressed to the robot and parses their command body.
#[derive(Debug, Clone)]
pub struct CommandParser {
    address: Regex,
}

impl CommandParser {
    /// Build a parser for a robot called `name`, optionally also answering to `alias`.
    pub fn new(name: &str, alias: Option<&str>) -> Result<Self, regex::Error> {
        let mut names = vec![name_pattern(name)];
        if let Some(alias) = alias.filter(|a| !a.is_empty()) {
            names.push(name_pattern(alias));
        }
        let address = RegexBuilder::new(&format!(
            r"^\s*@?(?:{})[:,]?\s*(.*)$",
            names.join("|")
        ))
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()?;
        Ok(Self { address })
    }

    /// The command body if `text` is addressed to the robot.
    pub fn addressed<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.address
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|body| body.as_str().trim())
    }

    /// Parse an addressed message. `Ok(None)` when the message is not
    /// addressed to the robot or the body is not a known command.
    pub fn parse(&self, text: &str) -> Result<Option<Command>, CommandError> {
        match self.addressed(text) {
            Some(body) => parse_body(body),
            None => Ok(None),
        }
    }
}

/// Name regex; names ending in a word character must end on a word boundary.
fn name_pattern(name: &str) -> String {
    let escaped = regex::escape(name);
    if name.chars().last().is_some_and(|c| c.is_alphanumeric() || c == '_') {
        format!(r"{escaped}\b")
    } else {
        escaped
    }
}

/// Parse a command body (the text after the robot's name).
pub fn parse_body(body: &str) -> Result<Option<Command>, CommandError> {
    let body = body.trim();

    if LIST_RE.is_match(body) {
        return Ok(Some(Command::List));
    }

    if let Some(caps) = DELETE_RE.captures(body) {
        let trigger = caps[1].trim();
        if trigger.is_empty() {
            return Ok(None);
        }
        return Ok(Some(Command::Delete {
            trigger: trigger.to_string(),
        }));
    }

    if let Some(caps) = ADD_RE.captures(body) {
        let trigger = caps[1].trim();
        let response = caps[2].trim();
        if trigger.is_empty() || response.is_empty() {
            return Ok(None);
        }
        if trigger.contains(TRIGGER_DELIMITER) {
            return Err(CommandError::ReservedCharacter(trigger.to_string()));
        }
        return Ok(Some(Command::Add {
            trigger: trigger.to_string(),
            response: response.to_string(),
        }));
    }

    Ok(None)
}
