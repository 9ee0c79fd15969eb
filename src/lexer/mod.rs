//! Tokenization of SyC source text.
//!
//! [lex] scans the whole input greedily and returns the token stream
//! terminated by [Token::Eof], or the first [LexError]. Whitespace and both
//! comment forms (`//` to end of line, non-nesting `/* .. */`) are consumed
//! without being emitted.

mod cursor;
mod lexer_error;
mod token;

use cursor::Cursor;
pub use lexer_error::{InnerLexError, LexError};
pub use token::{SpannedToken, Token};

pub type Tokens = Vec<SpannedToken>;

/// Two-character operators, matched before the single-character variants.
fn lex_mcharop2(first: char, second: char) -> Option<Token> {
    match (first, second) {
        ('+', '+') => Some(Token::Increment),
        ('-', '-') => Some(Token::Decrement),
        ('-', '>') => Some(Token::Arrow),
        ('=', '=') => Some(Token::IsEqual),
        ('!', '=') => Some(Token::IsNotEqual),
        ('<', '=') => Some(Token::IsLessThanOrEqual),
        ('>', '=') => Some(Token::IsGreaterThanOrEqual),
        ('&', '&') => Some(Token::LogicalAnd),
        ('|', '|') => Some(Token::LogicalOr),
        _ => None,
    }
}

fn lex_mcharoperator(cursor: &mut Cursor) -> Result<Token, InnerLexError> {
    let first = cursor.take().expect("is always Some");

    if let Some(second) = cursor.peek() {
        if let Some(op) = lex_mcharop2(first, second) {
            cursor.take();
            return Ok(op);
        }
    }

    Token::try_from(first)
}

fn lex_number(cursor: &mut Cursor) -> Token {
    let start = cursor.as_str();
    let mut len = 0;

    while cursor.skip_if(|c| c.is_ascii_digit()) {
        len += 1;
    }

    let value = start[..len].parse::<i64>().expect("only ascii digits");
    Token::IntLiteral(value)
}

fn lex_identifier(cursor: &mut Cursor) -> Token {
    let start = cursor.as_str();
    let mut len = 0;

    let predicate = |c: char| c.is_ascii_alphanumeric() || c == '_';
    while cursor.skip_if(predicate) {
        len += 1;
    }

    Token::from(&start[..len])
}

fn decode_escape(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        '0' => '\0',
        // \\ \' \" and any unrecognized escape yield the character itself
        _ => c,
    }
}

fn lex_char_literal(cursor: &mut Cursor) -> Result<Token, InnerLexError> {
    cursor.take();

    let c = cursor
        .take()
        .ok_or(InnerLexError::UnterminatedCharLiteral)?;
    let value = if c == '\\' {
        let escaped = cursor
            .take()
            .ok_or(InnerLexError::UnterminatedCharLiteral)?;
        decode_escape(escaped)
    } else {
        c
    };

    if !cursor.bump_if('\'') {
        return Err(InnerLexError::UnterminatedCharLiteral);
    }

    Ok(Token::CharLiteral(value as u8))
}

fn lex_string_literal(cursor: &mut Cursor) -> Result<Token, InnerLexError> {
    cursor.take();

    let mut value = String::new();
    loop {
        match cursor.take() {
            None => return Err(InnerLexError::UnterminatedStringLiteral),
            Some('"') => break,
            Some('\\') => {
                let escaped = cursor
                    .take()
                    .ok_or(InnerLexError::UnterminatedStringLiteral)?;
                value.push(decode_escape(escaped));
            }
            Some(c) => value.push(c),
        }
    }

    Ok(Token::StringLiteral(value))
}

/// Consumes whitespace and comments until the next token start.
fn skip_trivia(cursor: &mut Cursor) {
    loop {
        while cursor.skip_if(char::is_whitespace) {}
        match (cursor.peek(), cursor.peek_2nd()) {
            (Some('/'), Some('/')) => {
                while cursor.peek().filter(|c| *c != '\n').is_some() {
                    cursor.take();
                }
            }
            (Some('/'), Some('*')) => {
                cursor.take();
                cursor.take();
                // non-nesting; an unterminated comment consumes to EOF
                while let Some(c) = cursor.take() {
                    if c == '*' && cursor.bump_if('/') {
                        break;
                    }
                }
            }
            _ => return,
        }
    }
}

pub fn lex(input: &str) -> Result<Tokens, LexError> {
    let mut tokens = Tokens::new();
    let mut cursor = Cursor::new(input);
    skip_trivia(&mut cursor);

    while let Some(peek) = cursor.peek() {
        let (line, column) = cursor.position();
        let set_position = |err: InnerLexError| err.set_position(line, column);
        let token = match peek {
            '(' | ')' | '{' | '}' | '[' | ']' | ';' | ',' | '.' => {
                cursor.take();
                Token::try_from(peek)
            }
            '+' | '-' | '*' | '/' | '%' | '=' | '!' | '<' | '>' | '&' | '|' => {
                lex_mcharoperator(&mut cursor)
            }
            '0'..='9' => Ok(lex_number(&mut cursor)),
            '_' | 'a'..='z' | 'A'..='Z' => Ok(lex_identifier(&mut cursor)),
            '\'' => lex_char_literal(&mut cursor),
            '"' => lex_string_literal(&mut cursor),
            _ => Err(InnerLexError::UnknownCharacter(peek)),
        }
        .map_err(set_position)?;
        tokens.push(SpannedToken::new(token, line, column));
        skip_trivia(&mut cursor);
    }

    let (line, column) = cursor.position();
    tokens.push(SpannedToken::new(Token::Eof, line, column));

    Ok(tokens)
}
