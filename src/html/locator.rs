//! XPath subset used by generated locators
//!
//! Only the shapes the locator strategies emit are understood:
//!
//! ```text
//! //tag            //*
//! //tag[3]
//! //*[@id='x']
//! //tag[text()='x']
//! //tag[contains(text(),'x')]
//! //tag[@a='x' and @b='y']
//! ```

/// Syntax error in a locator expression
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid locator '{expression}': {message}")]
pub struct LocatorSyntaxError {
    pub expression: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    AttrEquals(String, String),
    TextEquals(String),
    TextContains(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// 1-based position among same-tag siblings
    Position(usize),
    /// Conjunction of conditions
    All(Vec<Condition>),
}

/// Parsed locator expression
#[derive(Debug, Clone, PartialEq)]
pub struct Locator {
    /// `None` for `*`
    pub tag: Option<String>,
    pub predicate: Option<Predicate>,
}

impl Locator {
    pub fn parse(expression: &str) -> Result<Self, LocatorSyntaxError> {
        Parser::new(expression).parse()
    }
}

/// Quote a literal for use inside an expression.
/// Returns `None` when the value contains both quote characters.
pub fn quote(value: &str) -> Option<String> {
    if !value.contains('\'') {
        Some(format!("'{}'", value))
    } else if !value.contains('"') {
        Some(format!("\"{}\"", value))
    } else {
        None
    }
}

struct Parser<'a> {
    expression: &'a str,
    rest: &'a str,
}

impl<'a> Parser<'a> {
    fn new(expression: &'a str) -> Self {
        Self {
            expression,
            rest: expression.trim(),
        }
    }

    fn error(&self, message: impl Into<String>) -> LocatorSyntaxError {
        LocatorSyntaxError {
            expression: self.expression.to_string(),
            message: message.into(),
        }
    }

    fn parse(mut self) -> Result<Locator, LocatorSyntaxError> {
        self.expect("//")?;

        let tag = if self.eat("*") {
            None
        } else {
            let name = self.take_while(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
            if name.is_empty() {
                return Err(self.error("expected tag name or '*'"));
            }
            Some(name.to_lowercase())
        };

        let predicate = if self.eat("[") {
            let predicate = self.predicate()?;
            self.skip_ws();
            self.expect("]")?;
            Some(predicate)
        } else {
            None
        };

        if !self.rest.trim().is_empty() {
            return Err(self.error(format!("unexpected trailing input '{}'", self.rest)));
        }

        Ok(Locator { tag, predicate })
    }

    fn predicate(&mut self) -> Result<Predicate, LocatorSyntaxError> {
        self.skip_ws();
        let digits = self.take_while(|c| c.is_ascii_digit());
        if !digits.is_empty() {
            let position: usize = digits
                .parse()
                .map_err(|_| self.error("position out of range"))?;
            if position == 0 {
                return Err(self.error("positions are 1-based"));
            }
            return Ok(Predicate::Position(position));
        }

        let mut conditions = vec![self.condition()?];
        loop {
            self.skip_ws();
            if !self.eat("and") {
                break;
            }
            self.skip_ws();
            conditions.push(self.condition()?);
        }
        Ok(Predicate::All(conditions))
    }

    fn condition(&mut self) -> Result<Condition, LocatorSyntaxError> {
        if self.eat("@") {
            let name = self.take_while(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':');
            if name.is_empty() {
                return Err(self.error("expected attribute name after '@'"));
            }
            let name = name.to_lowercase();
            self.skip_ws();
            self.expect("=")?;
            self.skip_ws();
            let value = self.literal()?;
            Ok(Condition::AttrEquals(name, value))
        } else if self.eat("text()") {
            self.skip_ws();
            self.expect("=")?;
            self.skip_ws();
            Ok(Condition::TextEquals(self.literal()?))
        } else if self.eat("contains(") {
            self.skip_ws();
            self.expect("text()")?;
            self.skip_ws();
            self.expect(",")?;
            self.skip_ws();
            let value = self.literal()?;
            self.skip_ws();
            self.expect(")")?;
            Ok(Condition::TextContains(value))
        } else {
            Err(self.error(format!("unsupported condition at '{}'", self.rest)))
        }
    }

    fn literal(&mut self) -> Result<String, LocatorSyntaxError> {
        let quote = match self.rest.chars().next() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(self.error("expected quoted literal")),
        };
        let body = &self.rest[1..];
        let end = body
            .find(quote)
            .ok_or_else(|| self.error("unterminated literal"))?;
        let value = body[..end].to_string();
        self.rest = &body[end + 1..];
        Ok(value)
    }

    fn eat(&mut self, token: &str) -> bool {
        match self.rest.strip_prefix(token) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    fn expect(&mut self, token: &str) -> Result<(), LocatorSyntaxError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{}' at '{}'", token, self.rest)))
        }
    }

    fn skip_ws(&mut self) {
        self.rest = self.rest.trim_start();
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let end = self
            .rest
            .char_indices()
            .find(|(_, c)| !pred(*c))
            .map(|(i, _)| i)
            .unwrap_or(self.rest.len());
        let (taken, rest) = self.rest.split_at(end);
        self.rest = rest;
        taken
    }
}
