//! GraphQL lexer.

use crate::{DocstoreError, DocstoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Sof,
    Eof,
    Bang,
    Dollar,
    Amp,
    ParenL,
    ParenR,
    Spread,
    Colon,
    Equals,
    At,
    BracketL,
    BracketR,
    BraceL,
    Pipe,
    BraceR,
    Name,
    Int,
    Float,
    String,
    BlockString,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            TokenKind::Sof => "<SOF>",
            TokenKind::Eof => "<EOF>",
            TokenKind::Bang => "\"!\"",
            TokenKind::Dollar => "\"$\"",
            TokenKind::Amp => "\"&\"",
            TokenKind::ParenL => "\"(\"",
            TokenKind::ParenR => "\")\"",
            TokenKind::Spread => "\"...\"",
            TokenKind::Colon => "\":\"",
            TokenKind::Equals => "\"=\"",
            TokenKind::At => "\"@\"",
            TokenKind::BracketL => "\"[\"",
            TokenKind::BracketR => "\"]\"",
            TokenKind::BraceL => "\"{\"",
            TokenKind::Pipe => "\"|\"",
            TokenKind::BraceR => "\"}\"",
            TokenKind::Name => "Name",
            TokenKind::Int => "Int",
            TokenKind::Float => "Float",
            TokenKind::String => "String",
            TokenKind::BlockString => "BlockString",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
    /// Name or literal text; the decoded value for strings. Empty for punctuators.
    pub value: String,
}

impl Token {
    fn punct(kind: TokenKind, start: usize, len: usize) -> Self {
        Self {
            kind,
            start,
            end: start + len,
            value: String::new(),
        }
    }

    /// Human readable description used in syntax errors.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Name | TokenKind::Int | TokenKind::Float => {
                format!("{} \"{}\"", self.kind, self.value)
            }
            _ => self.kind.to_string(),
        }
    }
}

pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    fn peek_byte(&self, offset: usize) -> Option<u8> {
        self.source.as_bytes().get(self.pos + offset).copied()
    }

    /// Reads the next significant token, skipping ignored characters.
    pub fn next_token(&mut self) -> DocstoreResult<Token> {
        self.skip_ignored();

        let start = self.pos;
        let Some(byte) = self.peek_byte(0) else {
            return Ok(Token::punct(TokenKind::Eof, start, 0));
        };

        let single = match byte {
            b'!' => Some(TokenKind::Bang),
            b'$' => Some(TokenKind::Dollar),
            b'&' => Some(TokenKind::Amp),
            b'(' => Some(TokenKind::ParenL),
            b')' => Some(TokenKind::ParenR),
            b':' => Some(TokenKind::Colon),
            b'=' => Some(TokenKind::Equals),
            b'@' => Some(TokenKind::At),
            b'[' => Some(TokenKind::BracketL),
            b']' => Some(TokenKind::BracketR),
            b'{' => Some(TokenKind::BraceL),
            b'|' => Some(TokenKind::Pipe),
            b'}' => Some(TokenKind::BraceR),
            _ => None,
        };
        if let Some(kind) = single {
            self.pos += 1;
            return Ok(Token::punct(kind, start, 1));
        }

        match byte {
            b'.' => {
                if self.peek_byte(1) == Some(b'.') && self.peek_byte(2) == Some(b'.') {
                    self.pos += 3;
                    Ok(Token::punct(TokenKind::Spread, start, 3))
                } else {
                    Err(DocstoreError::syntax("Unexpected \".\"", start))
                }
            }
            b'_' | b'a'..=b'z' | b'A'..=b'Z' => Ok(self.read_name()),
            b'-' | b'0'..=b'9' => self.read_number(),
            b'"' => {
                if self.source[start..].starts_with("\"\"\"") {
                    self.read_block_string()
                } else {
                    self.read_string()
                }
            }
            _ => {
                let ch = self.source[start..].chars().next().unwrap_or('\u{FFFD}');
                Err(DocstoreError::syntax(
                    format!("Unexpected character {:?}", ch),
                    start,
                ))
            }
        }
    }

    fn skip_ignored(&mut self) {
        while let Some(ch) = self.source[self.pos..].chars().next() {
            match ch {
                '\u{FEFF}' | '\t' | ' ' | ',' | '\n' | '\r' => self.pos += ch.len_utf8(),
                '#' => {
                    let rest = &self.source[self.pos..];
                    let len = rest.find(['\n', '\r']).unwrap_or(rest.len());
                    self.pos += len;
                }
                _ => break,
            }
        }
    }

    fn read_name(&mut self) -> Token {
        let start = self.pos;
        while let Some(b'_' | b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z') = self.peek_byte(0) {
            self.pos += 1;
        }
        Token {
            kind: TokenKind::Name,
            start,
            end: self.pos,
            value: self.source[start..self.pos].to_string(),
        }
    }

    fn read_digits(&mut self) -> DocstoreResult<()> {
        if !matches!(self.peek_byte(0), Some(b'0'..=b'9')) {
            return Err(DocstoreError::syntax(
                "Invalid number, expected digit",
                self.pos,
            ));
        }
        while let Some(b'0'..=b'9') = self.peek_byte(0) {
            self.pos += 1;
        }
        Ok(())
    }

    fn read_number(&mut self) -> DocstoreResult<Token> {
        let start = self.pos;
        let mut is_float = false;

        if self.peek_byte(0) == Some(b'-') {
            self.pos += 1;
        }

        if self.peek_byte(0) == Some(b'0') {
            self.pos += 1;
            if let Some(b'0'..=b'9') = self.peek_byte(0) {
                return Err(DocstoreError::syntax(
                    "Invalid number, unexpected digit after 0",
                    self.pos,
                ));
            }
        } else {
            self.read_digits()?;
        }

        if self.peek_byte(0) == Some(b'.') {
            is_float = true;
            self.pos += 1;
            self.read_digits()?;
        }

        if let Some(b'e' | b'E') = self.peek_byte(0) {
            is_float = true;
            self.pos += 1;
            if let Some(b'+' | b'-') = self.peek_byte(0) {
                self.pos += 1;
            }
            self.read_digits()?;
        }

        // Numbers may not run straight into a name or another dot
        if let Some(b'.' | b'_' | b'a'..=b'z' | b'A'..=b'Z') = self.peek_byte(0) {
            return Err(DocstoreError::syntax(
                "Invalid number, expected digit",
                self.pos,
            ));
        }

        Ok(Token {
            kind: if is_float {
                TokenKind::Float
            } else {
                TokenKind::Int
            },
            start,
            end: self.pos,
            value: self.source[start..self.pos].to_string(),
        })
    }

    fn read_string(&mut self) -> DocstoreResult<Token> {
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();

        loop {
            let Some(ch) = self.source[self.pos..].chars().next() else {
                return Err(DocstoreError::syntax("Unterminated string", self.pos));
            };
            match ch {
                '"' => {
                    self.pos += 1;
                    return Ok(Token {
                        kind: TokenKind::String,
                        start,
                        end: self.pos,
                        value,
                    });
                }
                '\n' | '\r' => {
                    return Err(DocstoreError::syntax("Unterminated string", self.pos));
                }
                '\\' => {
                    let escape_pos = self.pos;
                    self.pos += 1;
                    let escaped = match self.peek_byte(0) {
                        Some(b'"') => '"',
                        Some(b'\\') => '\\',
                        Some(b'/') => '/',
                        Some(b'b') => '\u{0008}',
                        Some(b'f') => '\u{000C}',
                        Some(b'n') => '\n',
                        Some(b'r') => '\r',
                        Some(b't') => '\t',
                        Some(b'u') => {
                            self.pos += 1;
                            value.push(self.read_unicode_escape(escape_pos)?);
                            continue;
                        }
                        _ => {
                            return Err(DocstoreError::syntax(
                                "Invalid character escape sequence",
                                escape_pos,
                            ))
                        }
                    };
                    self.pos += 1;
                    value.push(escaped);
                }
                _ => {
                    self.pos += ch.len_utf8();
                    value.push(ch);
                }
            }
        }
    }

    fn read_hex4(&mut self, escape_pos: usize) -> DocstoreResult<u32> {
        let digits = self
            .source
            .get(self.pos..self.pos + 4)
            .filter(|d| d.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| {
                DocstoreError::syntax("Invalid Unicode escape sequence", escape_pos)
            })?;
        let code = u32::from_str_radix(digits, 16)
            .map_err(|_| DocstoreError::syntax("Invalid Unicode escape sequence", escape_pos))?;
        self.pos += 4;
        Ok(code)
    }

    fn read_unicode_escape(&mut self, escape_pos: usize) -> DocstoreResult<char> {
        let invalid = || DocstoreError::syntax("Invalid Unicode escape sequence", escape_pos);

        if self.peek_byte(0) == Some(b'{') {
            let rest = &self.source[self.pos + 1..];
            let close = rest.find('}').ok_or_else(invalid)?;
            let code = u32::from_str_radix(&rest[..close], 16).map_err(|_| invalid())?;
            self.pos += close + 2;
            return char::from_u32(code).ok_or_else(invalid);
        }

        let code = self.read_hex4(escape_pos)?;
        if (0xD800..0xDC00).contains(&code) {
            // Leading surrogate must be followed by an escaped trailing one
            if !self.source[self.pos..].starts_with("\\u") {
                return Err(invalid());
            }
            self.pos += 2;
            let trail = self.read_hex4(escape_pos)?;
            if !(0xDC00..0xE000).contains(&trail) {
                return Err(invalid());
            }
            let combined = 0x10000 + ((code - 0xD800) << 10) + (trail - 0xDC00);
            return char::from_u32(combined).ok_or_else(invalid);
        }
        char::from_u32(code).ok_or_else(invalid)
    }

    fn read_block_string(&mut self) -> DocstoreResult<Token> {
        let start = self.pos;
        self.pos += 3;
        let mut raw = String::new();

        loop {
            let rest = &self.source[self.pos..];
            if rest.is_empty() {
                return Err(DocstoreError::syntax("Unterminated string", self.pos));
            }
            if rest.starts_with("\"\"\"") {
                self.pos += 3;
                return Ok(Token {
                    kind: TokenKind::BlockString,
                    start,
                    end: self.pos,
                    value: dedent_block_string(&raw),
                });
            }
            if rest.starts_with("\\\"\"\"") {
                self.pos += 4;
                raw.push_str("\"\"\"");
                continue;
            }
            let ch = rest.chars().next().unwrap_or('\u{FFFD}');
            self.pos += ch.len_utf8();
            raw.push(ch);
        }
    }
}

/// Removes the common indentation and blank leading/trailing lines of a
/// block string.
pub fn dedent_block_string(raw: &str) -> String {
    let normalized = raw.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = normalized.split('\n').collect();

    let indent_of = |line: &str| line.len() - line.trim_start_matches([' ', '\t']).len();

    let mut common_indent = usize::MAX;
    let mut first_non_empty = None;
    let mut last_non_empty = None;

    for (i, &line) in lines.iter().enumerate() {
        let indent = indent_of(line);
        if indent == line.len() {
            continue;
        }
        first_non_empty.get_or_insert(i);
        last_non_empty = Some(i);
        if i != 0 && indent < common_indent {
            common_indent = indent;
        }
    }

    let (Some(first), Some(last)) = (first_non_empty, last_non_empty) else {
        return String::new();
    };

    lines[first..=last]
        .iter()
        .enumerate()
        .map(|(offset, line)| {
            if first + offset == 0 {
                *line
            } else {
                line.get(common_indent.min(line.len())..).unwrap_or("")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
