use thiserror::Error;

use crate::dom::document::{Document, NodeId};

// ============================================================================
// Structural selector subset
// ============================================================================
//
// Supported: type/universal, #id, .class, [attr], [attr op value (i|s)],
// :not(list), :nth-of-type(n), :nth-last-of-type(n), :first-of-type,
// :last-of-type, selector lists, and the four combinators.
// Anything else is a parse error.

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid selector `{selector}` at {position}: {message}")]
pub struct SelectorError {
    pub selector: String,
    pub position: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList(Vec<ComplexSelector>);

#[derive(Debug, Clone, PartialEq)]
struct ComplexSelector {
    /// Left to right; `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`.
    compounds: Vec<Compound>,
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
    NextSibling,
    SubsequentSibling,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct Compound {
    tag: Option<String>,
    filters: Vec<Filter>,
}

#[derive(Debug, Clone, PartialEq)]
enum Filter {
    Id(String),
    Class(String),
    Attr(AttrSelector),
    Not(SelectorList),
    NthOfType(usize),
    NthLastOfType(usize),
}

#[derive(Debug, Clone, PartialEq)]
struct AttrSelector {
    name: String,
    test: Option<(AttrOp, String)>,
    case_insensitive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Equals,
    Includes,
    DashMatch,
    Prefix,
    Suffix,
    Substring,
}

impl SelectorList {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut parser = Parser::new(input);
        let list = parser.selector_list()?;
        parser.skip_ws();
        if !parser.at_end() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(list)
    }

    pub fn matches(&self, doc: &Document, id: NodeId) -> bool {
        doc.is_element(id) && self.0.iter().any(|c| c.matches(doc, id))
    }
}

impl ComplexSelector {
    fn matches(&self, doc: &Document, id: NodeId) -> bool {
        self.matches_at(doc, self.compounds.len() - 1, id)
    }

    fn matches_at(&self, doc: &Document, idx: usize, id: NodeId) -> bool {
        if !self.compounds[idx].matches(doc, id) {
            return false;
        }
        if idx == 0 {
            return true;
        }
        match self.combinators[idx - 1] {
            Combinator::Child => doc
                .parent(id)
                .is_some_and(|p| self.matches_at(doc, idx - 1, p)),
            Combinator::Descendant => doc
                .ancestors(id)
                .any(|a| self.matches_at(doc, idx - 1, a)),
            Combinator::NextSibling => doc
                .preceding_element_siblings(id)
                .next()
                .is_some_and(|s| self.matches_at(doc, idx - 1, s)),
            Combinator::SubsequentSibling => doc
                .preceding_element_siblings(id)
                .any(|s| self.matches_at(doc, idx - 1, s)),
        }
    }
}

impl Compound {
    fn matches(&self, doc: &Document, id: NodeId) -> bool {
        if let Some(tag) = &self.tag {
            if !doc.tag(id).eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        self.filters.iter().all(|f| f.matches(doc, id))
    }
}

impl Filter {
    fn matches(&self, doc: &Document, id: NodeId) -> bool {
        match self {
            Filter::Id(want) => doc.attr(id, "id") == Some(want.as_str()),
            Filter::Class(want) => doc
                .attr(id, "class")
                .is_some_and(|c| c.split_whitespace().any(|part| part == want)),
            Filter::Attr(attr) => attr.matches(doc, id),
            Filter::Not(list) => !list.matches(doc, id),
            Filter::NthOfType(n) => doc.nth_of_type(id) == *n,
            Filter::NthLastOfType(n) => doc.nth_last_of_type(id) == *n,
        }
    }
}

impl AttrSelector {
    fn matches(&self, doc: &Document, id: NodeId) -> bool {
        let Some(actual) = doc.attr(id, &self.name) else {
            return false;
        };
        let Some((op, expected)) = &self.test else {
            return true;
        };

        let (actual, expected) = if self.case_insensitive {
            (actual.to_lowercase(), expected.to_lowercase())
        } else {
            (actual.to_string(), expected.clone())
        };

        match op {
            AttrOp::Equals => actual == expected,
            AttrOp::Includes => actual.split_whitespace().any(|w| w == expected),
            AttrOp::DashMatch => {
                actual == expected || actual.starts_with(&format!("{}-", expected))
            }
            // Empty operands never match for the substring family
            AttrOp::Prefix => !expected.is_empty() && actual.starts_with(&expected),
            AttrOp::Suffix => !expected.is_empty() && actual.ends_with(&expected),
            AttrOp::Substring => !expected.is_empty() && actual.contains(&expected),
        }
    }
}

// ============================================================================
// Parser
// ============================================================================

struct Parser<'s> {
    source: &'s str,
    chars: Vec<char>,
    pos: usize,
}

impl<'s> Parser<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, message: &str) -> SelectorError {
        SelectorError {
            selector: self.source.to_string(),
            position: self.pos,
            message: message.to_string(),
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, want: char) -> bool {
        if self.peek() == Some(want) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, want: char) -> Result<(), SelectorError> {
        if self.eat(want) {
            Ok(())
        } else {
            Err(self.error(&format!("expected `{}`", want)))
        }
    }

    /// Returns true when at least one whitespace char was consumed.
    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn selector_list(&mut self) -> Result<SelectorList, SelectorError> {
        let mut selectors = Vec::new();
        loop {
            self.skip_ws();
            selectors.push(self.complex()?);
            self.skip_ws();
            if !self.eat(',') {
                break;
            }
        }
        Ok(SelectorList(selectors))
    }

    fn complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        let mut compounds = vec![self.compound()?];
        let mut combinators = Vec::new();

        loop {
            let had_ws = self.skip_ws();
            let combinator = match self.peek() {
                None | Some(',') | Some(')') => break,
                Some('>') => Combinator::Child,
                Some('+') => Combinator::NextSibling,
                Some('~') => Combinator::SubsequentSibling,
                Some(_) if had_ws => Combinator::Descendant,
                Some(_) => return Err(self.error("unexpected character")),
            };
            if combinator != Combinator::Descendant {
                self.pos += 1;
                self.skip_ws();
            }
            combinators.push(combinator);
            compounds.push(self.compound()?);
        }

        Ok(ComplexSelector {
            compounds,
            combinators,
        })
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        let mut consumed = false;

        if self.eat('*') {
            consumed = true;
        } else if self.peek().is_some_and(is_ident_start) {
            compound.tag = Some(self.ident()?.to_ascii_lowercase());
            consumed = true;
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.filters.push(Filter::Id(self.ident()?));
                }
                Some('.') => {
                    self.pos += 1;
                    compound.filters.push(Filter::Class(self.ident()?));
                }
                Some('[') => {
                    self.pos += 1;
                    compound.filters.push(Filter::Attr(self.attribute()?));
                }
                Some(':') => {
                    self.pos += 1;
                    compound.filters.push(self.pseudo()?);
                }
                _ => break,
            }
            consumed = true;
        }

        if !consumed {
            return Err(self.error("expected a selector"));
        }
        Ok(compound)
    }

    fn attribute(&mut self) -> Result<AttrSelector, SelectorError> {
        self.skip_ws();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_ws();

        if self.eat(']') {
            return Ok(AttrSelector {
                name,
                test: None,
                case_insensitive: false,
            });
        }

        let op = match self.bump() {
            Some('=') => AttrOp::Equals,
            Some(c @ ('~' | '|' | '^' | '$' | '*')) => {
                self.expect('=')?;
                match c {
                    '~' => AttrOp::Includes,
                    '|' => AttrOp::DashMatch,
                    '^' => AttrOp::Prefix,
                    '$' => AttrOp::Suffix,
                    _ => AttrOp::Substring,
                }
            }
            _ => return Err(self.error("expected attribute operator")),
        };

        self.skip_ws();
        let value = match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.pos += 1;
                self.string(q)?
            }
            _ => self.ident()?,
        };
        self.skip_ws();

        let mut case_insensitive = false;
        if let Some(flag) = self.peek().filter(|c| c.is_ascii_alphabetic()) {
            match flag.to_ascii_lowercase() {
                'i' => case_insensitive = true,
                's' => {}
                _ => return Err(self.error("unknown attribute flag")),
            }
            self.pos += 1;
            self.skip_ws();
        }

        self.expect(']')?;
        Ok(AttrSelector {
            name,
            test: Some((op, value)),
            case_insensitive,
        })
    }

    fn pseudo(&mut self) -> Result<Filter, SelectorError> {
        if self.peek() == Some(':') {
            return Err(self.error("pseudo-elements are not supported"));
        }
        let name = self.ident()?.to_ascii_lowercase();

        match name.as_str() {
            "first-of-type" => Ok(Filter::NthOfType(1)),
            "last-of-type" => Ok(Filter::NthLastOfType(1)),
            "not" => {
                self.expect('(')?;
                let inner = self.selector_list()?;
                self.skip_ws();
                self.expect(')')?;
                Ok(Filter::Not(inner))
            }
            "nth-of-type" | "nth-last-of-type" => {
                self.expect('(')?;
                self.skip_ws();
                let n = self.integer()?;
                self.skip_ws();
                self.expect(')')?;
                if name == "nth-of-type" {
                    Ok(Filter::NthOfType(n))
                } else {
                    Ok(Filter::NthLastOfType(n))
                }
            }
            _ => Err(self.error(&format!("unsupported pseudo-class `:{}`", name))),
        }
    }

    fn integer(&mut self) -> Result<usize, SelectorError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        let digits: String = self.chars[start..self.pos].iter().collect();
        match digits.parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(self.error("expected a positive integer")),
        }
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let mut out = String::new();
        if self.peek() == Some('-') {
            out.push('-');
            self.pos += 1;
        }
        loop {
            match self.peek() {
                Some('\\') => {
                    self.pos += 1;
                    out.push(self.escape()?);
                }
                Some(c) if is_ident_char(c) => {
                    out.push(c);
                    self.pos += 1;
                }
                _ => break,
            }
        }
        if out.is_empty() || out == "-" {
            return Err(self.error("expected an identifier"));
        }
        Ok(out)
    }

    fn string(&mut self, quote: char) -> Result<String, SelectorError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => {
                    // Escaped newline is a line continuation
                    if self.eat('\n') {
                        continue;
                    }
                    out.push(self.escape()?);
                }
                Some(c) => out.push(c),
            }
        }
    }

    /// Called after a backslash.
    fn escape(&mut self) -> Result<char, SelectorError> {
        let start = self.pos;
        while self.pos - start < 6 && self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
            self.pos += 1;
        }
        if self.pos > start {
            let hex: String = self.chars[start..self.pos].iter().collect();
            // A single whitespace terminates a hex escape
            if self.peek().is_some_and(char::is_whitespace) {
                self.pos += 1;
            }
            let code = u32::from_str_radix(&hex, 16).unwrap_or(0xFFFD);
            return Ok(match char::from_u32(code) {
                Some(c) if code != 0 => c,
                _ => '\u{FFFD}',
            });
        }
        self.bump()
            .ok_or_else(|| self.error("dangling escape at end of input"))
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '-' || c == '\\' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}

// ============================================================================
// Serialization helpers
// ============================================================================

/// Escape a string for use as a CSS identifier or inside a quoted attribute
/// value (`CSS.escape()` semantics).
pub fn css_escape(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let mut out = String::with_capacity(value.len());

    for (i, &c) in chars.iter().enumerate() {
        let code = c as u32;
        if code == 0 {
            out.push('\u{FFFD}');
        } else if (0x01..=0x1F).contains(&code)
            || code == 0x7F
            || (i == 0 && c.is_ascii_digit())
            || (i == 1 && c.is_ascii_digit() && chars[0] == '-')
        {
            out.push_str(&format!("\\{:x} ", code));
        } else if i == 0 && c == '-' && chars.len() == 1 {
            out.push_str("\\-");
        } else if code >= 0x80 || c == '-' || c == '_' || c.is_ascii_alphanumeric() {
            out.push(c);
        } else {
            out.push('\\');
            out.push(c);
        }
    }

    out
}
