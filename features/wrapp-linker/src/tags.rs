//! Parsing of slot declarations.
//!
//! A slot declares what it wants through a raw tag in the usual `key:"value"` form, e.g.
//! `inject:"intVal,optional:33"`. Only the marker key (`inject` by default) is read, other keys
//! are skipped so one tag string can be shared with other tooling.
//!
//! The marker value is `name[,optional[:default]]`:
//! - an empty name matches providers by type only
//! - `optional` allows the slot to stay unbound
//! - everything after the first `:` of the modifier is the default literal, taken verbatim

use thiserror::Error;

/// The structured result of parsing one raw tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTag {
    /// Requested provider name, empty matches by type only
    pub name: String,
    pub optional: bool,
    /// Default literal used when an optional slot stays unbound
    pub default: Option<String>,
}

/// Errors while parsing a raw tag
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    /// The tag does not carry the marker key
    #[error("the tag has no '{0}' key")]
    NotFound(String),
    /// The tag is not a list of `key:"value"` pairs
    #[error("malformed tag at byte {position}: {reason}")]
    Malformed {
        position: usize,
        reason: &'static str,
    },
    /// The part after the name is not an `optional` modifier
    #[error("unexpected modifier '{0}', expected 'optional' or 'optional:<default>'")]
    InvalidModifier(String),
}

/// Turns the raw tag of a slot into a [ParsedTag]
pub trait TagParser: Send + Sync {
    fn parse(&self, raw: &str) -> Result<ParsedTag, TagError>;
}

/// Parses `key:"value"` struct tags, reading the value of a single marker key
#[derive(Debug, Clone)]
pub struct StructTagParser {
    key: String,
}
impl Default for StructTagParser {
    fn default() -> Self {
        Self::new("inject")
    }
}
impl StructTagParser {
    pub fn new(key: impl Into<String>) -> Self {
        StructTagParser { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl TagParser for StructTagParser {
    fn parse(&self, raw: &str) -> Result<ParsedTag, TagError> {
        let mut cursor = Cursor { raw, position: 0 };

        while cursor.skip_separators() {
            let (key, value) = cursor.pair()?;
            if key == self.key {
                return parse_value(value);
            }
        }

        Err(TagError::NotFound(self.key.clone()))
    }
}

/// Splits the marker value into name and modifier
fn parse_value(value: &str) -> Result<ParsedTag, TagError> {
    let Some((name, modifier)) = value.split_once(',') else {
        return Ok(ParsedTag {
            name: value.to_string(),
            ..Default::default()
        });
    };

    let default = match modifier.split_once(':') {
        Some((word, default)) if word.trim() == "optional" => {
            Some(default).filter(|default| !default.is_empty())
        }
        None if modifier.trim() == "optional" => None,
        _ => return Err(TagError::InvalidModifier(modifier.to_string())),
    };

    Ok(ParsedTag {
        name: name.to_string(),
        optional: true,
        default: default.map(str::to_string),
    })
}

struct Cursor<'a> {
    raw: &'a str,
    position: usize,
}
impl<'a> Cursor<'a> {
    fn rest(&self) -> &'a str {
        &self.raw[self.position..]
    }

    fn malformed(&self, reason: &'static str) -> TagError {
        TagError::Malformed {
            position: self.position,
            reason,
        }
    }

    /// Skips whitespace and commas between pairs
    ///
    /// Returns false once the end of the tag is reached
    fn skip_separators(&mut self) -> bool {
        let rest = self.rest();
        let trimmed = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        self.position += rest.len() - trimmed.len();
        !trimmed.is_empty()
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.position += rest.len() - rest.trim_start().len();
    }

    /// Reads one `key:"value"` pair, the value is returned without its quotes
    fn pair(&mut self) -> Result<(&'a str, &'a str), TagError> {
        let rest = self.rest();
        let key_len = rest
            .find(|c: char| c == ':' || c == '"' || c == ',' || c.is_whitespace())
            .unwrap_or(rest.len());
        let key = &rest[..key_len];
        self.position += key_len;

        if key.is_empty() {
            return Err(self.malformed("expected a key"));
        }
        if !self.rest().starts_with(':') {
            return Err(self.malformed("expected ':' after the key"));
        }
        self.position += 1;
        self.skip_whitespace();

        if !self.rest().starts_with('"') {
            return Err(self.malformed("expected a quoted value"));
        }
        self.position += 1;

        let start = self.position;
        let mut chars = self.rest().char_indices();
        while let Some((offset, c)) = chars.next() {
            match c {
                // Escapes are kept verbatim, only the escaped quote must not end the value
                '\\' => {
                    chars.next();
                }
                '"' => {
                    self.position = start + offset + 1;
                    return Ok((key, &self.raw[start..start + offset]));
                }
                _ => {}
            }
        }

        Err(self.malformed("unterminated quoted value"))
    }
}
