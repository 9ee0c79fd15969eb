use std::str::Chars;

/// Character cursor over the source text with line/column bookkeeping.
///
/// `line`/`column` always describe the position of the next character to be
/// consumed; the line counter advances on every `\n` taken and the column
/// resets to 1 at the start of the following line.
#[derive(Clone)]
pub struct Cursor<'a> {
    chars: Chars<'a>,
    line: u64,
    column: u64,
}

impl<'a> Cursor<'a> {
    pub fn new(s: &'a str) -> Self {
        let chars = s.chars();
        Self {
            chars,
            line: 1,
            column: 1,
        }
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }

    pub fn peek_2nd(&self) -> Option<char> {
        // cheap to clone
        let mut chars = self.chars.clone();
        chars.next();
        chars.next()
    }

    pub fn take(&mut self) -> Option<char> {
        let c = self.chars.next();
        match c {
            Some('\n') => {
                self.line += 1;
                self.column = 1;
            }
            Some(_) => self.column += 1,
            None => (),
        }
        c
    }

    pub fn skip_if(&mut self, p: impl FnOnce(char) -> bool) -> bool {
        let condition = self.peek().filter(|c| p(*c)).is_some();
        if condition {
            self.take();
        }
        condition
    }

    pub fn bump_if(&mut self, expected: char) -> bool {
        self.skip_if(|c| c == expected)
    }

    pub fn as_str(&self) -> &'a str {
        self.chars.as_str()
    }

    pub fn position(&self) -> (u64, u64) {
        (self.line, self.column)
    }
}
