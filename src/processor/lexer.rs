//! Hand-written lexer for the map-key (`.mf`) language.
//!
//! The lexer only classifies characters into `Token`s; it knows the ten
//! reserved words but not the directive grammar, which lives in the parser.
//
//  Lexical items (informal):
//
//      Comment  ::= '##' .* NEWLINE
//      Number   ::= [0-9]+                 (fits in u16)
//      Str      ::= '"' ( '\' . | [^"] )* '"'
//      Symbol   ::= PRINTABLE              (followed by whitespace or EOF)
//      Word     ::= PRINTABLE PRINTABLE+   (keyword or bare string)
//
//  Whitespace separates tokens and is otherwise discarded.

use std::fmt;
use std::str::Chars;

use thiserror::Error;

const COMMENT: char = '#';
const QUOTE: char = '"';
const ESCAPE: char = '\\';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Map,
    Tileset,
    Default,
    Empty,
    Tile,
    Solid,
    Void,
    Place,
    From,
    Entry,
}

impl Keyword {
    pub const ALL: [Keyword; 10] = [
        Keyword::Map,
        Keyword::Tileset,
        Keyword::Default,
        Keyword::Empty,
        Keyword::Tile,
        Keyword::Solid,
        Keyword::Void,
        Keyword::Place,
        Keyword::From,
        Keyword::Entry,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Map => "map",
            Keyword::Tileset => "tileset",
            Keyword::Default => "default",
            Keyword::Empty => "empty",
            Keyword::Tile => "tile",
            Keyword::Solid => "solid",
            Keyword::Void => "void",
            Keyword::Place => "place",
            Keyword::From => "from",
            Keyword::Entry => "entry",
        }
    }

    /// Case-sensitive lookup.
    pub fn from_word(word: &str) -> Option<Keyword> {
        Self::ALL.into_iter().find(|k| k.as_str() == word)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unterminated string")]
    UnterminatedString,
    #[error("number too large (maximum is {})", u16::MAX)]
    NumberTooLarge,
    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Keyword(Keyword),
    Str(String),
    Number(u16),
    Symbol(char),
    Error(LexError),
    Eof,
}

/// A token plus the 1-based line/column of its first character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
    pub column: u32,
}

#[inline]
fn is_printable(c: char) -> bool {
    !c.is_control() && !c.is_whitespace()
}

#[derive(Clone)]
pub struct Lexer<'a> {
    chars: Chars<'a>,
    line: u32,
    column: u32,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            chars: src.chars(),
            line: 1,
            column: 1,
            finished: false,
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.chars.clone().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.chars.clone().nth(1)
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek_char() {
                Some(c) if c.is_whitespace() => {
                    self.next_char();
                }
                Some(COMMENT) if self.peek_second() == Some(COMMENT) => {
                    while let Some(c) = self.next_char() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn read_number(&mut self) -> TokenKind {
        let mut value: u32 = 0;
        while let Some(c) = self.peek_char() {
            let Some(digit) = c.to_digit(10) else { break };
            self.next_char();
            value = value.saturating_mul(10).saturating_add(digit);
        }
        match u16::try_from(value) {
            Ok(n) => TokenKind::Number(n),
            Err(_) => TokenKind::Error(LexError::NumberTooLarge),
        }
    }

    /// Called with the opening quote already consumed.
    fn read_string(&mut self) -> TokenKind {
        let mut txt = String::new();
        while let Some(c) = self.next_char() {
            match c {
                QUOTE => return TokenKind::Str(txt),
                ESCAPE => match self.next_char() {
                    Some(escaped) => txt.push(escaped),
                    None => break,
                },
                c => txt.push(c),
            }
        }
        TokenKind::Error(LexError::UnterminatedString)
    }

    /// A lone character before whitespace is a symbol; anything longer is a
    /// word, which is either a keyword or a bare string.
    fn read_word(&mut self, first: char) -> TokenKind {
        match self.peek_char() {
            None => return TokenKind::Symbol(first),
            Some(c) if c.is_whitespace() => return TokenKind::Symbol(first),
            _ => {}
        }

        let mut word = String::new();
        word.push(first);
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                break;
            }
            word.push(c);
            self.next_char();
        }

        match Keyword::from_word(&word) {
            Some(k) => TokenKind::Keyword(k),
            None => TokenKind::Str(word),
        }
    }

    /// Reads the next token. Once the input is exhausted this keeps
    /// returning `Eof`.
    pub fn next_token(&mut self) -> Token {
        self.skip_trivia();
        let (line, column) = (self.line, self.column);

        let kind = match self.peek_char() {
            None => TokenKind::Eof,
            Some(c) if c.is_ascii_digit() => self.read_number(),
            Some(_) => match self.next_char() {
                Some(QUOTE) => self.read_string(),
                Some(c) if is_printable(c) => self.read_word(c),
                Some(c) => TokenKind::Error(LexError::UnexpectedChar(c)),
                None => TokenKind::Eof,
            },
        };

        Token { kind, line, column }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    /// Yields every token up to and including the first `Eof`.
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let tok = self.next_token();
        if tok.kind == TokenKind::Eof {
            self.finished = true;
        }
        Some(tok)
    }
}
