use std::{error, fmt};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum InnerLexError {
    UnterminatedCharLiteral,
    UnterminatedStringLiteral,
    UnknownCharacter(char),
}

#[derive(Debug, PartialEq, Eq)]
pub struct LexError {
    inner: InnerLexError,
    line: u64,
    column: u64,
}

impl LexError {
    pub fn get_line(&self) -> u64 {
        self.line
    }

    pub fn get_column(&self) -> u64 {
        self.column
    }
}

impl InnerLexError {
    pub(super) fn set_position(self, line: u64, column: u64) -> LexError {
        LexError {
            inner: self,
            line,
            column,
        }
    }
}

impl error::Error for LexError {}
impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl error::Error for InnerLexError {}
impl fmt::Display for InnerLexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UnterminatedCharLiteral => write!(f, "unterminated character literal"),
            Self::UnterminatedStringLiteral => write!(f, "unterminated string literal"),
            Self::UnknownCharacter(c) => write!(f, "unknown character: {c}"),
        }
    }
}
