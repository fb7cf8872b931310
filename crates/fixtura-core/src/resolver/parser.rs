//! Path expression parser
//!
//! Recursive descent over the grammar
//!
//! ```text
//! expression := '$'? segment? ('.' segment)*
//! segment    := (identifier | '*')? selector*
//! selector   := '[' (digits | '*' | 'last' | quoted) ']' | '{' ('key' | 'value') '}'
//! quoted     := "'" (any char but "'")* "'"
//! ```
//!
//! `[last]` selects the most recently added element or entry, `['k']` the
//! map entry whose key is the string `k`. A map part not preceded by an entry
//! selector selects that part of every entry.
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

use super::predicate::{ContainerIndex, NextNodePredicate};
use crate::tree::MapPart;
use crate::types::Value;
use crate::{Error, Result};
use std::iter::Peekable;
use std::str::Chars;

/// Path expression parser
pub struct Parser<'a> {
    /// Input string being parsed
    input: &'a str,
    chars: Peekable<Chars<'a>>,
    /// Current position in input, in characters
    position: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Result<Self> {
        if input.trim().is_empty() {
            return Err(Error::invalid_expression(input, "Empty path expression", Some(0)));
        }

        Ok(Self {
            input,
            chars: input.chars().peekable(),
            position: 0,
        })
    }

    /// Parse the expression into its predicate chain, starting with `Root`
    pub fn parse(mut self) -> Result<Vec<NextNodePredicate>> {
        let mut predicates = vec![NextNodePredicate::Root];

        if self.current_char() == Some('$') {
            self.advance();
        }
        if self.is_at_end() {
            return Ok(predicates);
        }

        // A leading segment may follow the root directly, as in `items` or `$[0]`
        if self.current_char() != Some('.') {
            self.parse_segment(&mut predicates)?;
        }

        while !self.is_at_end() {
            self.expect_char('.')?;
            if self.is_at_end() || self.current_char() == Some('.') {
                return Err(self.error("Expected a segment after '.'"));
            }
            self.parse_segment(&mut predicates)?;
        }

        Ok(predicates)
    }

    fn parse_segment(&mut self, predicates: &mut Vec<NextNodePredicate>) -> Result<()> {
        match self.current_char() {
            Some('*') => {
                self.advance();
                predicates.push(NextNodePredicate::AnyProperty);
            }
            Some(ch) if is_identifier_start(ch) => {
                let name = self.parse_identifier();
                predicates.push(NextNodePredicate::Property(name));
            }
            Some('[') | Some('{') => {}
            Some(ch) => {
                return Err(self.error(format!("Unexpected character '{}' in segment", ch)));
            }
            None => return Err(self.error("Unexpected end of input")),
        }

        loop {
            match self.current_char() {
                Some('[') => {
                    let selector = self.parse_bracket()?;
                    predicates.push(selector);
                }
                Some('{') => {
                    let part = self.parse_map_part()?;
                    if !matches!(
                        predicates.last(),
                        Some(
                            NextNodePredicate::Index(_)
                                | NextNodePredicate::LastEntry
                                | NextNodePredicate::EntryWithKey(_)
                        )
                    ) {
                        predicates.push(NextNodePredicate::Index(ContainerIndex::All));
                    }
                    predicates.push(NextNodePredicate::MapPart(part));
                }
                Some('.') | None => return Ok(()),
                Some(ch) => {
                    return Err(self.error(format!("Unexpected character '{}' after segment", ch)));
                }
            }
        }
    }

    fn parse_identifier(&mut self) -> String {
        let mut identifier = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                identifier.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        identifier
    }

    fn parse_bracket(&mut self) -> Result<NextNodePredicate> {
        let start = self.position;
        self.advance(); // consume '['

        match self.current_char() {
            Some('*') => {
                self.advance();
                self.expect_char(']')?;
                return Ok(NextNodePredicate::Index(ContainerIndex::All));
            }
            Some('\'') => {
                let key = self.parse_quoted(start)?;
                self.expect_char(']')?;
                return Ok(NextNodePredicate::EntryWithKey(Value::Str(key)));
            }
            Some(ch) if ch.is_alphabetic() => {
                let word_start = self.position;
                let word = self.parse_identifier();
                if word != "last" {
                    return Err(Error::invalid_expression(
                        self.input,
                        format!("Unknown selector '{}', expected an index, '*', 'last' or a quoted key", word),
                        Some(word_start),
                    ));
                }
                self.expect_char(']')?;
                return Ok(NextNodePredicate::LastEntry);
            }
            _ => {}
        }

        let mut digits = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        if digits.is_empty() {
            return Err(match self.current_char() {
                Some(ch) => self.error(format!("Expected an index, '*', 'last' or a quoted key, found '{}'", ch)),
                None => Error::invalid_expression(self.input, "Unterminated index selector", Some(start)),
            });
        }
        self.expect_char(']')?;

        digits
            .parse::<usize>()
            .map(|index| NextNodePredicate::Index(ContainerIndex::At(index)))
            .map_err(|e| Error::invalid_expression(self.input, format!("Invalid index: {}", e), Some(start)))
    }

    /// Text between single quotes; the opening quote is the current char
    fn parse_quoted(&mut self, start: usize) -> Result<String> {
        self.advance();
        let mut text = String::new();
        loop {
            match self.current_char() {
                Some('\'') => {
                    self.advance();
                    return Ok(text);
                }
                Some(ch) => {
                    text.push(ch);
                    self.advance();
                }
                None => return Err(Error::invalid_expression(self.input, "Unterminated quoted key", Some(start))),
            }
        }
    }

    fn parse_map_part(&mut self) -> Result<MapPart> {
        let start = self.position;
        self.advance(); // consume '{'
        let word = self.parse_identifier();
        self.expect_char('}')?;
        match word.as_str() {
            "key" => Ok(MapPart::Key),
            "value" => Ok(MapPart::Value),
            other => Err(Error::invalid_expression(
                self.input,
                format!("Unknown map part '{}', expected 'key' or 'value'", other),
                Some(start),
            )),
        }
    }

    fn expect_char(&mut self, expected: char) -> Result<()> {
        match self.current_char() {
            Some(ch) if ch == expected => {
                self.advance();
                Ok(())
            }
            Some(ch) => Err(self.error(format!("Expected '{}', found '{}'", expected, ch))),
            None => Err(self.error(format!("Expected '{}', found end of input", expected))),
        }
    }

    fn current_char(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn advance(&mut self) {
        if self.chars.next().is_some() {
            self.position += 1;
        }
    }

    fn is_at_end(&mut self) -> bool {
        self.chars.peek().is_none()
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::invalid_expression(self.input, message, Some(self.position))
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}
