//! Compiled search pattern plus replacement template.
//!
//! Templates may use `\1`, `\g<1>` or `\g<name>` back-references as well as the
//! native `$1` / `${name}` forms. Everything is normalised to the `regex` crate's
//! `${...}` syntax once, when the substitution is built.
use std::borrow::Cow;

use regex::Regex;
use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct Substitution {
    regex: Regex,
    template: String,
    raw_template: String,
}

impl Substitution {
    pub fn new(pattern: &str, template: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| Error::InvalidRegex {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        let (translated, references) = translate_template(template)?;

        for reference in &references {
            let known = match reference.parse::<usize>() {
                Ok(index) => index < regex.captures_len(),
                Err(_) => regex.capture_names().flatten().any(|name| name == reference),
            };
            if !known {
                return Err(Error::InvalidTemplate {
                    template: template.to_string(),
                    reason: format!("pattern has no group '{reference}'"),
                });
            }
        }

        Ok(Self {
            regex,
            template: translated,
            raw_template: template.to_string(),
        })
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// The template as the user wrote it
    pub fn template(&self) -> &str {
        &self.raw_template
    }

    /// Replace every non-overlapping match in `value`.
    pub fn apply<'a>(&self, value: &'a str) -> Cow<'a, str> {
        self.regex.replace_all(value, self.template.as_str())
    }
}

impl Serialize for Substitution {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Substitution", 2)?;
        state.serialize_field("pattern", self.pattern())?;
        state.serialize_field("template", self.template())?;
        state.end()
    }
}

/// Translate a template into `regex` syntax, returning the group references it uses.
fn translate_template(template: &str) -> Result<(String, Vec<String>)> {
    let mut out = String::with_capacity(template.len() + 8);
    let mut references = Vec::new();
    let mut chars = template.chars().peekable();

    let invalid = |reason: &str| Error::InvalidTemplate {
        template: template.to_string(),
        reason: reason.to_string(),
    };

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.peek().copied() {
                Some(d) if d.is_ascii_digit() => {
                    let mut digits = String::new();
                    while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                        digits.push(d);
                        chars.next();
                    }
                    out.push_str(&format!("${{{digits}}}"));
                    references.push(digits);
                }
                Some('g') => {
                    chars.next();
                    if chars.next() != Some('<') {
                        return Err(invalid("expected '<' after \\g"));
                    }
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('>') => break,
                            Some(ch) => name.push(ch),
                            None => return Err(invalid("unterminated \\g<...> reference")),
                        }
                    }
                    if name.is_empty() {
                        return Err(invalid("empty \\g<> reference"));
                    }
                    out.push_str(&format!("${{{name}}}"));
                    references.push(name);
                }
                Some('\\') => {
                    chars.next();
                    out.push('\\');
                }
                Some('n') => {
                    chars.next();
                    out.push('\n');
                }
                Some('t') => {
                    chars.next();
                    out.push('\t');
                }
                _ => out.push('\\'),
            },
            '$' => match chars.peek().copied() {
                Some('$') => {
                    chars.next();
                    out.push_str("$$");
                }
                Some('{') => {
                    chars.next();
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(ch) => name.push(ch),
                            None => return Err(invalid("unterminated ${...} reference")),
                        }
                    }
                    out.push_str(&format!("${{{name}}}"));
                    references.push(name);
                }
                Some(d) if d.is_ascii_alphanumeric() || d == '_' => {
                    let mut name = String::new();
                    while let Some(ch) = chars
                        .peek()
                        .copied()
                        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
                    {
                        name.push(ch);
                        chars.next();
                    }
                    out.push_str(&format!("${{{name}}}"));
                    references.push(name);
                }
                _ => out.push_str("$$"),
            },
            other => out.push(other),
        }
    }

    Ok((out, references))
}
