//! Parser that consumes the lexer and builds a `MapKey`.
//!
//! The grammar is a flat list of directives; each directive reads exactly
//! the arguments it needs. There is no recovery: the first mismatch aborts
//! the parse with a positioned `ParseError`.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::lexer::{Keyword, Lexer, Token, TokenKind};
use super::source::{self, LoadError};
use crate::model::{Coords, MAX_GRID_BYTES, MAX_PLACEMENTS, MapKey, Placement, TileCode};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{file}:{line}:{column}: {message}")]
pub struct ParseError {
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub message: String,
}

/// Everything that can go wrong loading a key file from disk.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Syntax(#[from] ParseError),
}

/// Read and parse the key file at `path`.
pub fn parse_key_file(path: &Path) -> Result<MapKey, KeyError> {
    let src = source::read_text(path, MAX_GRID_BYTES)?;
    let key = Parser::new(&src, path.display().to_string()).parse()?;
    Ok(key)
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Keyword(k) => format!("keyword `{k}`"),
        TokenKind::Str(s) => format!("string {s:?}"),
        TokenKind::Number(n) => format!("number {n}"),
        TokenKind::Symbol(c) => format!("symbol {c:?}"),
        TokenKind::Error(e) => e.to_string(),
        TokenKind::Eof => "end of input".to_string(),
    }
}

pub struct Parser<'a> {
    lex: Lexer<'a>,
    file: String,
    key: MapKey,
    origin: Coords,
}

impl<'a> Parser<'a> {
    pub fn new(src: &'a str, file: impl Into<String>) -> Self {
        Self {
            lex: Lexer::new(src),
            file: file.into(),
            key: MapKey::default(),
            origin: Coords::default(),
        }
    }

    pub fn parse(mut self) -> Result<MapKey, ParseError> {
        loop {
            let tok = self.lex.next_token();
            match tok.kind {
                TokenKind::Eof => break,
                TokenKind::Keyword(k) => self.parse_directive(k, &tok)?,
                _ => return Err(self.unexpected(&tok, "a directive")),
            }
        }

        log::debug!(
            "parsed {}: {} tile mappings, {} placements",
            self.file,
            self.key.tile_table.len(),
            self.key.objects.len()
        );
        Ok(self.key)
    }

    fn error_at(&self, tok: &Token, message: impl Into<String>) -> ParseError {
        ParseError {
            file: self.file.clone(),
            line: tok.line,
            column: tok.column,
            message: message.into(),
        }
    }

    fn unexpected(&self, tok: &Token, expected: &str) -> ParseError {
        match &tok.kind {
            // a lexical error is reported as-is, wherever it shows up
            TokenKind::Error(e) => self.error_at(tok, e.to_string()),
            other => self.error_at(
                tok,
                format!("unexpected {}, expected {expected}", describe(other)),
            ),
        }
    }

    fn parse_directive(&mut self, directive: Keyword, at: &Token) -> Result<(), ParseError> {
        match directive {
            Keyword::Map => {
                self.key.name = Some(self.expect_string(directive)?);
            }
            Keyword::Tileset => {
                self.key.tileset_path = Some(PathBuf::from(self.expect_string(directive)?));
            }
            Keyword::Default => {
                let index = self.expect_number(directive)?;
                self.key.default_tile = TileCode::tile(index, false);
            }
            Keyword::Void => {
                self.key.void_symbol = Some(self.expect_symbol(directive)?);
            }
            Keyword::Tile => self.parse_tile()?,
            Keyword::From => {
                let (x, y) = self.expect_pair(directive)?;
                self.origin = Coords::new(x.into(), y.into());
            }
            Keyword::Entry => {
                let (x, y) = self.expect_pair(directive)?;
                self.key.entry_point = self.origin.offset(x, y);
            }
            Keyword::Place => self.parse_place(at)?,
            Keyword::Solid | Keyword::Empty => {
                return Err(self.error_at(
                    at,
                    format!("`{directive}` is only valid inside a `tile` directive"),
                ));
            }
        }
        Ok(())
    }

    /// `tile (solid|empty) SYMBOL NUMBER`
    fn parse_tile(&mut self) -> Result<(), ParseError> {
        let tok = self.lex.next_token();
        let solid = match tok.kind {
            TokenKind::Keyword(Keyword::Solid) => true,
            TokenKind::Keyword(Keyword::Empty) => false,
            _ => return Err(self.unexpected(&tok, "`solid` or `empty` after `tile`")),
        };
        let symbol = self.expect_symbol(Keyword::Tile)?;
        let index = self.expect_number(Keyword::Tile)?;

        self.key.tile_table.insert(symbol, TileCode::tile(index, solid));
        Ok(())
    }

    /// `place SYMBOL NUMBER NUMBER`
    fn parse_place(&mut self, at: &Token) -> Result<(), ParseError> {
        let symbol = self.expect_symbol(Keyword::Place)?;
        let (x, y) = self.expect_pair(Keyword::Place)?;

        if self.key.objects.len() >= MAX_PLACEMENTS {
            return Err(self.error_at(
                at,
                format!("too many placements (limit is {MAX_PLACEMENTS})"),
            ));
        }
        self.key.objects.push(Placement {
            symbol,
            at: self.origin.offset(x, y),
        });
        Ok(())
    }

    fn expect_string(&mut self, directive: Keyword) -> Result<String, ParseError> {
        let tok = self.lex.next_token();
        match tok.kind {
            TokenKind::Str(s) => Ok(s),
            _ => Err(self.unexpected(&tok, &format!("a string after `{directive}`"))),
        }
    }

    fn expect_number(&mut self, directive: Keyword) -> Result<u16, ParseError> {
        let tok = self.lex.next_token();
        match tok.kind {
            TokenKind::Number(n) => Ok(n),
            _ => Err(self.unexpected(&tok, &format!("a number in `{directive}`"))),
        }
    }

    fn expect_pair(&mut self, directive: Keyword) -> Result<(u16, u16), ParseError> {
        let x = self.expect_number(directive)?;
        let y = self.expect_number(directive)?;
        Ok((x, y))
    }

    /// Grid cells are single bytes of ASCII text, so only ASCII symbols can
    /// ever match one.
    fn expect_symbol(&mut self, directive: Keyword) -> Result<u8, ParseError> {
        let tok = self.lex.next_token();
        match tok.kind {
            TokenKind::Symbol(c) if c.is_ascii() => Ok(c as u8),
            TokenKind::Symbol(c) => Err(self.error_at(
                &tok,
                format!("symbol {c:?} is out of range (symbols must be ASCII)"),
            )),
            _ => Err(self.unexpected(&tok, &format!("a symbol in `{directive}`"))),
        }
    }
}
