//! Placeholder templates for output names and launcher arguments
//!
//! Syntax:
//! - `{name}` is replaced by the value bound to `name`
//! - `{name:0N}` zero-pads the value to at least `N` characters (`N` up to
//!   [`MAX_PAD_WIDTH`])
//! - `{{` and `}}` are literal braces
//!
//! Names may contain ASCII letters, digits, `_` and `.` (`{cell.row}`).
//! Rendering fails on any name the bindings cannot resolve; nothing is ever
//! emitted with a placeholder left in it.

use std::collections::HashMap;
use std::fmt;
use std::hash::BuildHasher;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Resolves placeholder names to values
pub trait Bindings {
    fn lookup(&self, name: &str) -> Option<String>;
}

impl<S: BuildHasher> Bindings for HashMap<String, String, S> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Widest zero-padding a placeholder may ask for
pub const MAX_PAD_WIDTH: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder { name: String, width: Option<usize> },
}

/// A parsed template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, ConfigError> {
        let malformed = |reason| ConfigError::MalformedTemplate {
            template: source.to_string(),
            reason,
        };

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => return Err(malformed("unmatched `}`")),
                '{' => {
                    let mut body = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some('{') => return Err(malformed("nested `{`")),
                            Some(c) => body.push(c),
                            None => return Err(malformed("unclosed `{`")),
                        }
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(parse_placeholder(&body).map_err(malformed)?);
                }
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// Placeholder names in order of appearance
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Placeholder { name, .. } => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Fail on the first placeholder that `known` rejects
    pub fn check(&self, known: impl Fn(&str) -> bool) -> Result<(), ConfigError> {
        match self.placeholders().find(|name| !known(*name)) {
            Some(name) => Err(self.unresolved(name)),
            None => Ok(()),
        }
    }

    pub fn render(&self, bindings: &impl Bindings) -> Result<String, ConfigError> {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder { name, width } => {
                    let value = bindings
                        .lookup(name)
                        .ok_or_else(|| self.unresolved(name))?;
                    match *width {
                        Some(width) => out.push_str(&format!("{value:0>width$}")),
                        None => out.push_str(&value),
                    }
                }
            }
        }
        Ok(out)
    }

    fn unresolved(&self, name: &str) -> ConfigError {
        ConfigError::UnresolvedPlaceholder {
            name: name.to_string(),
            template: self.source.clone(),
        }
    }
}

fn parse_placeholder(body: &str) -> Result<Segment, &'static str> {
    let (name, spec) = match body.split_once(':') {
        Some((name, spec)) => (name, Some(spec)),
        None => (body, None),
    };

    if name.is_empty() {
        return Err("empty placeholder name");
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
    {
        return Err("placeholder names may only contain letters, digits, `_` and `.`");
    }

    let width = match spec {
        None => None,
        Some(spec) => {
            let digits = spec
                .strip_prefix('0')
                .ok_or("only zero-padding (`:0N`) is supported")?;
            let width: usize = digits.parse().map_err(|_| "invalid padding width")?;
            if width > MAX_PAD_WIDTH {
                return Err("padding width too large");
            }
            Some(width)
        }
    };

    Ok(Segment::Placeholder {
        name: name.to_string(),
        width,
    })
}

impl TryFrom<String> for Template {
    type Error = ConfigError;

    fn try_from(source: String) -> Result<Self, Self::Error> {
        Self::parse(&source)
    }
}

impl From<Template> for String {
    fn from(template: Template) -> Self {
        template.source
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Parse a list of templates, stopping at the first malformed one
pub fn parse_all<I, S>(sources: I) -> Result<Vec<Template>, ConfigError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    sources
        .into_iter()
        .map(|source| Template::parse(source.as_ref()))
        .collect()
}
