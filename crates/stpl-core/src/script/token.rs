//! Tokenizer for generated code lines

use std::fmt;

/// Punctuation and operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Sym {
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Semi,
    Dot,
    Assign,
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
}

impl Sym {
    fn text(self) -> &'static str {
        match self {
            Sym::LParen => "(",
            Sym::RParen => ")",
            Sym::LBracket => "[",
            Sym::RBracket => "]",
            Sym::LBrace => "{",
            Sym::RBrace => "}",
            Sym::Comma => ",",
            Sym::Colon => ":",
            Sym::Semi => ";",
            Sym::Dot => ".",
            Sym::Assign => "=",
            Sym::Plus => "+",
            Sym::Minus => "-",
            Sym::Star => "*",
            Sym::DoubleStar => "**",
            Sym::Slash => "/",
            Sym::DoubleSlash => "//",
            Sym::Percent => "%",
            Sym::EqEq => "==",
            Sym::NotEq => "!=",
            Sym::Lt => "<",
            Sym::Le => "<=",
            Sym::Gt => ">",
            Sym::Ge => ">=",
            Sym::PlusAssign => "+=",
            Sym::MinusAssign => "-=",
            Sym::StarAssign => "*=",
            Sym::SlashAssign => "/=",
        }
    }
}

/// Longest operators first
const SYMBOLS: [(&str, Sym); 28] = [
    ("**", Sym::DoubleStar),
    ("//", Sym::DoubleSlash),
    ("==", Sym::EqEq),
    ("!=", Sym::NotEq),
    ("<=", Sym::Le),
    (">=", Sym::Ge),
    ("+=", Sym::PlusAssign),
    ("-=", Sym::MinusAssign),
    ("*=", Sym::StarAssign),
    ("/=", Sym::SlashAssign),
    ("(", Sym::LParen),
    (")", Sym::RParen),
    ("[", Sym::LBracket),
    ("]", Sym::RBracket),
    ("{", Sym::LBrace),
    ("}", Sym::RBrace),
    (",", Sym::Comma),
    (":", Sym::Colon),
    (";", Sym::Semi),
    (".", Sym::Dot),
    ("=", Sym::Assign),
    ("+", Sym::Plus),
    ("-", Sym::Minus),
    ("*", Sym::Star),
    ("/", Sym::Slash),
    ("%", Sym::Percent),
    ("<", Sym::Lt),
    (">", Sym::Gt),
];

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Tok {
    Name(String),
    Int(i64),
    Float(f64),
    Str(String),
    Sym(Sym),
}

impl fmt::Display for Tok {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tok::Name(name) => write!(f, "{}", name),
            Tok::Int(n) => write!(f, "{}", n),
            Tok::Float(x) => write!(f, "{}", x),
            Tok::Str(_) => write!(f, "string literal"),
            Tok::Sym(sym) => write!(f, "{}", sym.text()),
        }
    }
}

/// A token plus the line offset inside its code line
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub tok: Tok,
    pub line: usize,
}

/// Tokenizer failure: message plus line offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LexError {
    pub line: usize,
    pub message: String,
}

pub(crate) fn tokenize(code: &str) -> Result<Vec<Token>, LexError> {
    Lexer {
        src: code,
        pos: 0,
        line: 0,
    }
    .run()
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
}

impl Lexer<'_> {
    fn run(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\r' => self.pos += 1,
                '\n' => {
                    self.pos += 1;
                    self.line += 1;
                }
                '\\' if self.rest().starts_with("\\\n") || self.rest().starts_with("\\\r\n") => {
                    self.pos += if self.rest().starts_with("\\\n") { 2 } else { 3 };
                    self.line += 1;
                }
                '#' => {
                    self.pos = self.rest().find('\n').map_or(self.src.len(), |i| self.pos + i);
                }
                c if c.is_ascii_digit()
                    || (c == '.' && self.rest()[1..].starts_with(|d: char| d.is_ascii_digit())) =>
                {
                    let line = self.line;
                    let tok = self.number()?;
                    tokens.push(Token { tok, line });
                }
                c if c.is_alphabetic() || c == '_' => {
                    let line = self.line;
                    let tok = match self.string_prefix() {
                        Some(prefix_len) => self.string(prefix_len)?,
                        None => Tok::Name(self.name()),
                    };
                    tokens.push(Token { tok, line });
                }
                '\'' | '"' => {
                    let line = self.line;
                    let tok = self.string(0)?;
                    tokens.push(Token { tok, line });
                }
                _ => {
                    let (text, sym) = SYMBOLS
                        .iter()
                        .find(|(text, _)| self.rest().starts_with(text))
                        .ok_or_else(|| self.error(format!("unexpected character '{}'", c)))?;
                    self.pos += text.len();
                    tokens.push(Token {
                        tok: Tok::Sym(*sym),
                        line: self.line,
                    });
                }
            }
        }
        Ok(tokens)
    }

    fn rest(&self) -> &str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn error(&self, message: impl Into<String>) -> LexError {
        LexError {
            line: self.line,
            message: message.into(),
        }
    }

    fn name(&mut self) -> String {
        let len = self
            .rest()
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(self.rest().len());
        let name = self.rest()[..len].to_string();
        self.pos += len;
        name
    }

    /// Length of an `r`/`b`/`u` prefix directly followed by a quote
    fn string_prefix(&self) -> Option<usize> {
        let bytes = self.rest().as_bytes();
        let letters = bytes
            .iter()
            .take(2)
            .take_while(|b| matches!(b, b'r' | b'R' | b'b' | b'B' | b'u' | b'U'))
            .count();
        (1..=letters).find(|&len| matches!(bytes.get(len), Some(b'\'' | b'"')))
    }

    fn number(&mut self) -> Result<Tok, LexError> {
        let rest = self.rest();
        if rest.starts_with("0x") || rest.starts_with("0X") {
            let digits: String = rest[2..]
                .chars()
                .take_while(|c| c.is_ascii_hexdigit() || *c == '_')
                .collect();
            self.pos += 2 + digits.len();
            return i64::from_str_radix(&digits.replace('_', ""), 16)
                .map(Tok::Int)
                .map_err(|_| self.error(format!("invalid hex literal '0x{}'", digits)));
        }

        let mut len = 0;
        let mut is_float = false;
        let bytes = rest.as_bytes();
        while len < bytes.len() {
            match bytes[len] {
                b'0'..=b'9' | b'_' => len += 1,
                b'.' if !is_float => {
                    is_float = true;
                    len += 1;
                }
                b'e' | b'E' => {
                    let mut exp = len + 1;
                    if matches!(bytes.get(exp), Some(b'+' | b'-')) {
                        exp += 1;
                    }
                    if !bytes.get(exp).is_some_and(u8::is_ascii_digit) {
                        break;
                    }
                    is_float = true;
                    len = exp;
                }
                _ => break,
            }
        }
        let text = rest[..len].replace('_', "");
        self.pos += len;
        if is_float {
            text.parse::<f64>()
                .map(Tok::Float)
                .map_err(|_| self.error(format!("invalid number '{}'", text)))
        } else {
            text.parse::<i64>()
                .map(Tok::Int)
                .map_err(|_| self.error(format!("integer literal '{}' out of range", text)))
        }
    }

    fn string(&mut self, prefix_len: usize) -> Result<Tok, LexError> {
        let raw = self.rest()[..prefix_len].contains(['r', 'R']);
        self.pos += prefix_len;
        let quote = self.rest().as_bytes()[0] as char;
        let triple: String = std::iter::repeat(quote).take(3).collect();
        let closing = if self.rest().starts_with(&triple) {
            triple
        } else {
            quote.to_string()
        };
        self.pos += closing.len();

        let start_line = self.line;
        let mut value = String::new();
        loop {
            let Some(c) = self.peek() else {
                return Err(LexError {
                    line: start_line,
                    message: "unterminated string literal".to_string(),
                });
            };
            if self.rest().starts_with(&closing) {
                self.pos += closing.len();
                return Ok(Tok::Str(value));
            }
            match c {
                '\n' if closing.len() == 1 => {
                    return Err(LexError {
                        line: start_line,
                        message: "unterminated string literal".to_string(),
                    });
                }
                '\\' => {
                    self.pos += 1;
                    let Some(escaped) = self.peek() else {
                        continue;
                    };
                    self.pos += escaped.len_utf8();
                    if escaped == '\n' {
                        self.line += 1;
                        if raw {
                            value.push_str("\\\n");
                        }
                    } else if raw {
                        value.push('\\');
                        value.push(escaped);
                    } else {
                        self.unescape(escaped, &mut value)?;
                    }
                }
                c => {
                    if c == '\n' {
                        self.line += 1;
                    }
                    value.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }
    }

    fn unescape(&mut self, escaped: char, value: &mut String) -> Result<(), LexError> {
        match escaped {
            'n' => value.push('\n'),
            't' => value.push('\t'),
            'r' => value.push('\r'),
            '0' => value.push('\0'),
            'a' => value.push('\u{7}'),
            'b' => value.push('\u{8}'),
            'f' => value.push('\u{c}'),
            'v' => value.push('\u{b}'),
            '\\' | '\'' | '"' => value.push(escaped),
            'x' => value.push(self.hex_escape(2)?),
            'u' => value.push(self.hex_escape(4)?),
            'U' => value.push(self.hex_escape(8)?),
            other => {
                value.push('\\');
                value.push(other);
            }
        }
        Ok(())
    }

    fn hex_escape(&mut self, digits: usize) -> Result<char, LexError> {
        let hex = self.rest().get(..digits).unwrap_or_default();
        let c = u32::from_str_radix(hex, 16)
            .ok()
            .filter(|_| hex.len() == digits)
            .and_then(char::from_u32)
            .ok_or_else(|| self.error(format!("invalid escape sequence '{}'", hex)))?;
        self.pos += digits;
        Ok(c)
    }
}
