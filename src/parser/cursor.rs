use crate::lexer::{SpannedToken, Token};
use crate::parser::{InnerParseError, Result};

#[derive(Debug)]
pub struct Cursor<'a> {
    tokens: &'a [SpannedToken],
    position: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: &'a [SpannedToken]) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position).map(SpannedToken::get_inner)
    }

    pub fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.tokens
            .get(self.position + n)
            .map(SpannedToken::get_inner)
    }

    pub fn peek_is(&self, t: &Token) -> bool {
        self.peek() == Some(t)
    }

    pub fn bump(&mut self) {
        self.position += 1;
    }

    pub fn bump_if(&mut self, t: &Token) -> bool {
        let condition = self.peek() == Some(t);
        if condition {
            self.bump();
        }
        condition
    }

    /// Line of the current token, used to position errors. The EOF sentinel
    /// keeps this meaningful even at the end of the stream.
    pub fn get_line(&self) -> u64 {
        let last = self.tokens.len().saturating_sub(1);
        self.tokens
            .get(self.position.min(last))
            .map_or(0, SpannedToken::get_line)
    }

    pub fn expect(&mut self, t: &Token) -> Result<()> {
        let line = self.get_line();
        let next = self.next_or_error()?;
        if next == t {
            Ok(())
        } else {
            Err(InnerParseError::ExpectedButGot(t.clone(), next.clone()).set_line(line))
        }
    }

    pub fn peek_or_error(&self) -> Result<&Token> {
        let line = self.get_line();
        self.peek()
            .ok_or_else(|| InnerParseError::UnexpectedEof.set_line(line))
    }

    pub fn next_or_error(&mut self) -> Result<&Token> {
        let line = self.get_line();
        let next = self
            .tokens
            .get(self.position)
            .ok_or_else(|| InnerParseError::UnexpectedEof.set_line(line))?;
        self.position += 1;
        Ok(next)
    }
}
