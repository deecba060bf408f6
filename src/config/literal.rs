//! Literal evaluation of legacy `siteConfig.js` modules.
//!
//! Legacy sites declare their configuration as a CommonJS module, usually
//!
//! ```text
//! const users = [ ... ];
//! const siteConfig = {
//!   title: 'Test Site',
//!   users,
//!   copyright: `Copyright © ${new Date().getFullYear()} Me`,
//! };
//! module.exports = siteConfig;
//! ```
//!
//! There is no JavaScript engine here. A tokenizer plus a recursive-descent
//! evaluator understands the literal subset such files are written in:
//! objects, arrays, strings, numbers, booleans, `null`/`undefined`,
//! shorthand properties, spreads, references to earlier top-level bindings,
//! `'a' + 'b'` concatenation and template literals. Anything else (calls,
//! `require`, functions, `new`) evaluates to `null` and its source text is
//! reported in [`Evaluated::unresolved`].
//!
//! Scalar tokens are decoded with `json5`, which already accepts single
//! quotes, hex numbers and JS escapes.

use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum LiteralError {
    #[error("unterminated {0} starting at byte {1}")]
    Unterminated(&'static str, usize),
    #[error("unexpected '{0}' at byte {1}")]
    Unexpected(String, usize),
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("invalid literal {0}: {1}")]
    InvalidLiteral(String, String),
    #[error("no `module.exports` assignment found")]
    NoExport,
}

/// Result of evaluating a config module.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluated {
    pub value: Value,
    /// Source snippets of expressions that were replaced by `null`.
    pub unresolved: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Kind {
    Ident,
    Str,
    Num,
    Template,
    Punct,
}

#[derive(Debug, Clone, Copy)]
struct Tok<'a> {
    kind: Kind,
    /// Token text. For templates, the raw text between the backticks.
    text: &'a str,
    start: usize,
    end: usize,
}

impl Tok<'_> {
    fn is_punct(&self, p: &str) -> bool {
        self.kind == Kind::Punct && self.text == p
    }

    fn is_ident(&self, name: &str) -> bool {
        self.kind == Kind::Ident && self.text == name
    }
}

const STATEMENT_KEYWORDS: &[&str] = &["const", "let", "var", "module", "function", "export", "class"];

/// Evaluate a CommonJS config module and return its exported value.
pub fn evaluate_module(source: &str) -> Result<Evaluated, LiteralError> {
    let toks = tokenize(source)?;
    let mut eval = Evaluator {
        src: source,
        toks,
        pos: 0,
        bindings: HashMap::new(),
        unresolved: Vec::new(),
    };
    eval.module()
}

struct Binding {
    value: Value,
    unresolved: Vec<String>,
}

struct Evaluator<'a> {
    src: &'a str,
    toks: Vec<Tok<'a>>,
    pos: usize,
    bindings: HashMap<&'a str, Binding>,
    unresolved: Vec<String>,
}

impl<'a> Evaluator<'a> {
    fn peek(&self) -> Option<Tok<'a>> {
        self.toks.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<Tok<'a>> {
        self.toks.get(self.pos + offset).copied()
    }

    fn module(&mut self) -> Result<Evaluated, LiteralError> {
        let mut exported = None;
        while let Some(tok) = self.peek() {
            if matches!(tok.text, "const" | "let" | "var") && tok.kind == Kind::Ident {
                let name = self.peek_at(1);
                let eq = self.peek_at(2);
                if let (Some(name), Some(eq)) = (name, eq)
                    && name.kind == Kind::Ident
                    && eq.is_punct("=")
                {
                    self.pos += 3;
                    let mark = self.unresolved.len();
                    let value = self.value()?;
                    let unresolved = self.unresolved.split_off(mark);
                    self.bindings.insert(name.text, Binding { value, unresolved });
                    continue;
                }
            }
            if tok.is_ident("module")
                && self.peek_at(1).is_some_and(|t| t.is_punct("."))
                && self.peek_at(2).is_some_and(|t| t.is_ident("exports"))
                && self.peek_at(3).is_some_and(|t| t.is_punct("="))
            {
                self.pos += 4;
                self.unresolved.clear();
                exported = Some(self.value()?);
                continue;
            }
            if matches!(tok.text, "{" | "(" | "[") && tok.kind == Kind::Punct {
                self.skip_balanced()?;
            } else {
                self.pos += 1;
            }
        }
        match exported {
            Some(value) => Ok(Evaluated {
                value,
                unresolved: std::mem::take(&mut self.unresolved),
            }),
            None => Err(LiteralError::NoExport),
        }
    }

    fn at_delimiter(&self) -> bool {
        match self.peek() {
            None => true,
            Some(t) => is_delimiter(&t) || (t.kind == Kind::Ident && STATEMENT_KEYWORDS.contains(&t.text)),
        }
    }

    fn value(&mut self) -> Result<Value, LiteralError> {
        let tok = self.peek().ok_or(LiteralError::UnexpectedEnd)?;
        if is_delimiter(&tok) {
            return Err(LiteralError::Unexpected(tok.text.to_string(), tok.start));
        }
        let start = tok.start;
        let value = match tok.kind {
            Kind::Punct if tok.text == "{" => self.object()?,
            Kind::Punct if tok.text == "[" => self.array()?,
            Kind::Punct
                if tok.text == "-" && self.peek_at(1).is_some_and(|t| t.kind == Kind::Num) =>
            {
                let num = self.peek_at(1).map(|t| t.text).unwrap_or_default();
                self.pos += 2;
                match decode_scalar(&format!("-{num}")) {
                    Ok(v) => v,
                    Err(_) => return Ok(self.opaque(start)),
                }
            }
            Kind::Str => {
                self.pos += 1;
                decode_scalar(tok.text)?
            }
            Kind::Num => {
                self.pos += 1;
                match decode_scalar(tok.text) {
                    Ok(v) => v,
                    Err(_) => return Ok(self.opaque(start)),
                }
            }
            Kind::Template => {
                self.pos += 1;
                self.template(tok)
            }
            Kind::Ident => match tok.text {
                "true" => {
                    self.pos += 1;
                    Value::Bool(true)
                }
                "false" => {
                    self.pos += 1;
                    Value::Bool(false)
                }
                "null" | "undefined" => {
                    self.pos += 1;
                    Value::Null
                }
                name => {
                    let next_is_delimiter = match self.peek_at(1) {
                        None => true,
                        Some(t) => {
                            is_delimiter(&t)
                                || t.is_punct("+")
                                || (t.kind == Kind::Ident && STATEMENT_KEYWORDS.contains(&t.text))
                        }
                    };
                    if !next_is_delimiter {
                        return Ok(self.opaque(start));
                    }
                    self.pos += 1;
                    self.resolve(name)
                }
            },
            Kind::Punct => return Ok(self.opaque(start)),
        };

        let value = self.concatenation(value, start)?;
        if !self.at_delimiter() {
            return Ok(self.opaque(start));
        }
        Ok(value)
    }

    /// Fold `'a' + 'b' + `c`` into one string; anything else is opaque.
    fn concatenation(&mut self, mut value: Value, start: usize) -> Result<Value, LiteralError> {
        while self.peek().is_some_and(|t| t.is_punct("+")) {
            let Value::String(mut acc) = value else {
                return Ok(self.opaque(start));
            };
            let Some(rhs) = self.peek_at(1) else {
                return Err(LiteralError::UnexpectedEnd);
            };
            let piece = match rhs.kind {
                Kind::Str => decode_scalar(rhs.text)?,
                Kind::Template => self.template(rhs),
                _ => return Ok(self.opaque(start)),
            };
            self.pos += 2;
            match piece {
                Value::String(s) => acc.push_str(&s),
                other => acc.push_str(&other.to_string()),
            }
            value = Value::String(acc);
        }
        Ok(value)
    }

    fn template(&mut self, tok: Tok<'a>) -> Value {
        if tok.text.contains("${") {
            self.unresolved.push(snippet(&self.src[tok.start..tok.end]));
        }
        Value::String(cook_template(tok.text))
    }

    fn resolve(&mut self, name: &str) -> Value {
        match self.bindings.get(name) {
            Some(binding) => {
                self.unresolved.extend(binding.unresolved.iter().cloned());
                binding.value.clone()
            }
            None => {
                self.unresolved.push(name.to_string());
                Value::Null
            }
        }
    }

    fn object(&mut self) -> Result<Value, LiteralError> {
        self.pos += 1;
        let mut map = Map::new();
        loop {
            let tok = self.peek().ok_or(LiteralError::UnexpectedEnd)?;
            match tok.kind {
                Kind::Punct if tok.text == "}" => {
                    self.pos += 1;
                    break;
                }
                Kind::Punct if tok.text == "," => self.pos += 1,
                Kind::Punct if tok.text == "..." => {
                    self.pos += 1;
                    if let Value::Object(spread) = self.value()? {
                        map.extend(spread);
                    }
                }
                Kind::Punct if tok.text == "[" => {
                    // Computed key: evaluate and drop the value.
                    self.skip_balanced()?;
                    self.expect(":")?;
                    self.value()?;
                    let text = snippet(&self.src[tok.start..self.last_end()]);
                    self.unresolved.push(text);
                }
                Kind::Ident | Kind::Str | Kind::Num => {
                    let key = match tok.kind {
                        Kind::Str => match decode_scalar(tok.text)? {
                            Value::String(s) => s,
                            other => other.to_string(),
                        },
                        _ => tok.text.to_string(),
                    };
                    self.pos += 1;
                    let next = self.peek().ok_or(LiteralError::UnexpectedEnd)?;
                    if next.is_punct(":") {
                        self.pos += 1;
                        let value = self.value()?;
                        map.insert(key, value);
                    } else if tok.kind == Kind::Ident && (next.is_punct(",") || next.is_punct("}")) {
                        let value = self.resolve(tok.text);
                        map.insert(key, value);
                    } else if next.is_punct("(") {
                        // Method shorthand: `foo() { ... }`
                        self.skip_balanced()?;
                        if self.peek().is_some_and(|t| t.is_punct("{")) {
                            self.skip_balanced()?;
                        }
                        let text = snippet(&self.src[tok.start..self.last_end()]);
                        self.unresolved.push(text);
                        map.insert(key, Value::Null);
                    } else {
                        return Err(LiteralError::Unexpected(next.text.to_string(), next.start));
                    }
                }
                _ => return Err(LiteralError::Unexpected(tok.text.to_string(), tok.start)),
            }
        }
        Ok(Value::Object(map))
    }

    fn array(&mut self) -> Result<Value, LiteralError> {
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            let tok = self.peek().ok_or(LiteralError::UnexpectedEnd)?;
            if tok.is_punct("]") {
                self.pos += 1;
                break;
            }
            if tok.is_punct(",") {
                self.pos += 1;
                continue;
            }
            if tok.is_punct("...") {
                self.pos += 1;
                if let Value::Array(spread) = self.value()? {
                    items.extend(spread);
                }
                continue;
            }
            items.push(self.value()?);
        }
        Ok(Value::Array(items))
    }

    fn expect(&mut self, punct: &str) -> Result<(), LiteralError> {
        match self.peek() {
            Some(t) if t.is_punct(punct) => {
                self.pos += 1;
                Ok(())
            }
            Some(t) => Err(LiteralError::Unexpected(t.text.to_string(), t.start)),
            None => Err(LiteralError::UnexpectedEnd),
        }
    }

    /// Skip from an opening bracket to just past its matching closer.
    fn skip_balanced(&mut self) -> Result<(), LiteralError> {
        let open = self.peek().ok_or(LiteralError::UnexpectedEnd)?;
        let mut depth = 0usize;
        while let Some(t) = self.peek() {
            self.pos += 1;
            if t.kind != Kind::Punct {
                continue;
            }
            match t.text {
                "{" | "(" | "[" => depth += 1,
                "}" | ")" | "]" => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
        Err(LiteralError::Unterminated("bracket", open.start))
    }

    /// Consume the rest of a non-literal expression and evaluate it to `null`.
    fn opaque(&mut self, start: usize) -> Value {
        let mut depth = 0usize;
        let mut consumed = false;
        while let Some(t) = self.peek() {
            if depth == 0 {
                if is_delimiter(&t) {
                    break;
                }
                if consumed && t.kind == Kind::Ident && STATEMENT_KEYWORDS.contains(&t.text) {
                    break;
                }
            }
            if t.kind == Kind::Punct {
                match t.text {
                    "{" | "(" | "[" => depth += 1,
                    "}" | ")" | "]" => depth = depth.saturating_sub(1),
                    _ => {}
                }
            }
            self.pos += 1;
            consumed = true;
        }
        let end = self.last_end().max(start);
        self.unresolved.push(snippet(&self.src[start..end]));
        Value::Null
    }

    fn last_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.toks.get(i))
            .map(|t| t.end)
            .unwrap_or(0)
    }
}

fn is_delimiter(tok: &Tok<'_>) -> bool {
    tok.kind == Kind::Punct && matches!(tok.text, "," | "}" | "]" | ")" | ";")
}

fn decode_scalar(text: &str) -> Result<Value, LiteralError> {
    json5::from_str::<Value>(text)
        .map_err(|e| LiteralError::InvalidLiteral(text.to_string(), e.to_string()))
}

fn cook_template(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Whitespace-collapsed, length-capped source excerpt for warnings.
fn snippet(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() > 60 {
        let cut: String = collapsed.chars().take(57).collect();
        format!("{cut}...")
    } else {
        collapsed
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

fn tokenize(src: &str) -> Result<Vec<Tok<'_>>, LiteralError> {
    let bytes = src.as_bytes();
    let mut toks = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        let next = bytes.get(i + 1).copied();
        match c {
            b' ' | b'\t' | b'\n' | b'\r' => i += 1,
            b'/' if next == Some(b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if next == Some(b'*') => {
                let close = src[i + 2..]
                    .find("*/")
                    .ok_or(LiteralError::Unterminated("comment", i))?;
                i = i + 2 + close + 2;
            }
            b'\'' | b'"' => {
                let end = scan_string(bytes, i)?;
                toks.push(Tok {
                    kind: Kind::Str,
                    text: &src[i..end],
                    start: i,
                    end,
                });
                i = end;
            }
            b'`' => {
                let end = scan_template(bytes, i)?;
                toks.push(Tok {
                    kind: Kind::Template,
                    text: &src[i + 1..end - 1],
                    start: i,
                    end,
                });
                i = end;
            }
            b'0'..=b'9' => {
                let start = i;
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'.') {
                    i += 1;
                }
                toks.push(Tok {
                    kind: Kind::Num,
                    text: &src[start..i],
                    start,
                    end: i,
                });
            }
            c if is_ident_byte(c) => {
                let start = i;
                while i < bytes.len() && is_ident_byte(bytes[i]) {
                    i += 1;
                }
                toks.push(Tok {
                    kind: Kind::Ident,
                    text: &src[start..i],
                    start,
                    end: i,
                });
            }
            _ => {
                let len = if src[i..].starts_with("...") {
                    3
                } else if src[i..].starts_with("=>") {
                    2
                } else {
                    1
                };
                toks.push(Tok {
                    kind: Kind::Punct,
                    text: &src[i..i + len],
                    start: i,
                    end: i + len,
                });
                i += len;
            }
        }
    }
    Ok(toks)
}

fn scan_string(bytes: &[u8], start: usize) -> Result<usize, LiteralError> {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return Ok(i + 1),
            _ => i += 1,
        }
    }
    Err(LiteralError::Unterminated("string", start))
}

fn scan_template(bytes: &[u8], start: usize) -> Result<usize, LiteralError> {
    let mut i = start + 1;
    let mut depth = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' if depth == 0 => return Ok(i + 1),
            b'$' if depth == 0 && bytes.get(i + 1) == Some(&b'{') => {
                depth = 1;
                i += 2;
            }
            b'{' if depth > 0 => {
                depth += 1;
                i += 1;
            }
            b'}' if depth > 0 => {
                depth -= 1;
                i += 1;
            }
            _ => i += 1,
        }
    }
    Err(LiteralError::Unterminated("template literal", start))
}
