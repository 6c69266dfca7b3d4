//! Data-only reader for nested `{ 'key': value }` literals.
//!
//! Accepts quoted strings, plain numbers and mappings with string keys. Anything else
//! (identifiers, calls, operators, lists) is rejected where it appears; nothing is evaluated.

use crate::parse::ParseError;

// Portfolio names, then tickers, then weights: two levels of braces.
const MAX_NESTING: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pos {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Map(Vec<Entry>),
    Number(f64),
    Str(String),
}

impl Literal {
    pub fn kind(&self) -> &'static str {
        match self {
            Literal::Map(_) => "a mapping",
            Literal::Number(_) => "a number",
            Literal::Str(_) => "a string",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key: String,
    pub key_pos: Pos,
    pub value: Literal,
    pub value_pos: Pos,
}

/// Reads exactly one literal from `text`; trailing non-comment content is an error.
pub fn read(text: &str) -> Result<(Literal, Pos), ParseError> {
    let mut reader = Reader::new(text);
    reader.skip_trivia();
    if reader.peek().is_none() {
        return Err(reader.error_here("input is empty; expected a mapping such as {'Name': {'TICKER': 1.0}}"));
    }
    let pos = reader.pos();
    let value = reader.value()?;
    reader.skip_trivia();
    if let Some(c) = reader.peek() {
        return Err(reader.error_here(format!(
            "unexpected {} after the closing brace",
            describe(c)
        )));
    }
    Ok((value, pos))
}

struct Reader {
    chars: Vec<char>,
    idx: usize,
    line: usize,
    column: usize,
    depth: usize,
}

impl Reader {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            idx: 0,
            line: 1,
            column: 1,
            depth: 0,
        }
    }

    fn pos(&self) -> Pos {
        Pos {
            line: self.line,
            column: self.column,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.idx).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.idx += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error_at(&self, pos: Pos, message: impl Into<String>) -> ParseError {
        ParseError::new(pos.line, pos.column, message)
    }

    fn error_here(&self, message: impl Into<String>) -> ParseError {
        self.error_at(self.pos(), message)
    }

    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else if c == '#' {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.bump();
                }
            } else {
                break;
            }
        }
    }

    fn value(&mut self) -> Result<Literal, ParseError> {
        match self.peek() {
            Some('{') => {
                if self.depth >= MAX_NESTING {
                    return Err(self.error_here(
                        "mappings nest deeper than portfolio -> ticker -> weight",
                    ));
                }
                self.depth += 1;
                let map = self.map();
                self.depth -= 1;
                map
            }
            Some('\'') | Some('"') => Ok(Literal::Str(self.string()?)),
            Some(c) if c.is_ascii_digit() || matches!(c, '+' | '-' | '.') => self.number(),
            Some(c) => Err(self.error_here(format!(
                "unexpected {}; only quoted strings, numbers and {{...}} mappings are allowed",
                describe(c)
            ))),
            None => Err(self.error_here("unexpected end of input; expected a value")),
        }
    }

    fn map(&mut self) -> Result<Literal, ParseError> {
        let open = self.pos();
        self.bump();
        let mut entries = Vec::new();
        loop {
            self.skip_trivia();
            match self.peek() {
                Some('}') => {
                    self.bump();
                    return Ok(Literal::Map(entries));
                }
                Some('\'') | Some('"') => {}
                Some(c) => {
                    return Err(self.error_here(format!(
                        "expected a quoted key or '}}', found {}",
                        describe(c)
                    )))
                }
                None => {
                    return Err(self.error_at(
                        open,
                        "this '{' is never closed (unbalanced braces)",
                    ))
                }
            }

            let key_pos = self.pos();
            let key = self.string()?;

            self.skip_trivia();
            match self.peek() {
                Some(':') => {
                    self.bump();
                }
                Some(c) => {
                    return Err(self.error_here(format!(
                        "expected ':' after key '{key}', found {}",
                        describe(c)
                    )))
                }
                None => return Err(self.error_at(open, "this '{' is never closed (unbalanced braces)")),
            }

            self.skip_trivia();
            let value_pos = self.pos();
            let value = self.value()?;
            entries.push(Entry {
                key,
                key_pos,
                value,
                value_pos,
            });

            self.skip_trivia();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some('}') => {}
                Some(c) => {
                    return Err(self.error_here(format!(
                        "expected ',' or '}}', found {}",
                        describe(c)
                    )))
                }
                None => return Err(self.error_at(open, "this '{' is never closed (unbalanced braces)")),
            }
        }
    }

    fn string(&mut self) -> Result<String, ParseError> {
        let start = self.pos();
        let quote = self.bump().unwrap_or('\'');
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(out),
                Some('\\') => {
                    let escape_pos = self.pos();
                    match self.bump() {
                        Some('\\') => out.push('\\'),
                        Some('\'') => out.push('\''),
                        Some('"') => out.push('"'),
                        Some('n') => out.push('\n'),
                        Some('t') => out.push('\t'),
                        Some(c) => {
                            return Err(self.error_at(
                                escape_pos,
                                format!("unsupported escape sequence '\\{c}'"),
                            ))
                        }
                        None => return Err(self.error_at(start, "unterminated string")),
                    }
                }
                Some('\n') | None => return Err(self.error_at(start, "unterminated string")),
                Some(c) => out.push(c),
            }
        }
    }

    fn number(&mut self) -> Result<Literal, ParseError> {
        let start = self.pos();
        let mut raw = String::new();

        if let Some(sign) = self.peek().filter(|c| matches!(c, '+' | '-')) {
            raw.push(sign);
            self.bump();
        }

        let int_digits = self.digits(&mut raw, start)?;
        let mut frac_digits = 0;
        if self.peek() == Some('.') {
            raw.push('.');
            self.bump();
            frac_digits = self.digits(&mut raw, start)?;
        }
        if int_digits == 0 && frac_digits == 0 {
            return Err(self.error_at(start, "malformed number"));
        }

        if let Some(e) = self.peek().filter(|c| matches!(c, 'e' | 'E')) {
            raw.push(e);
            self.bump();
            if let Some(sign) = self.peek().filter(|c| matches!(c, '+' | '-')) {
                raw.push(sign);
                self.bump();
            }
            if self.digits(&mut raw, start)? == 0 {
                return Err(self.error_at(start, "malformed number: exponent has no digits"));
            }
        }

        let value: f64 = raw
            .parse()
            .map_err(|_| self.error_at(start, format!("malformed number '{raw}'")))?;
        if !value.is_finite() {
            return Err(self.error_at(start, format!("number '{raw}' is out of range")));
        }
        Ok(Literal::Number(value))
    }

    // Consumes digits with single '_' separators between them; returns the digit count.
    fn digits(&mut self, raw: &mut String, start: Pos) -> Result<usize, ParseError> {
        let mut count = 0;
        let mut last_underscore = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                raw.push(c);
                count += 1;
                last_underscore = false;
            } else if c == '_' && count > 0 && !last_underscore {
                last_underscore = true;
            } else {
                break;
            }
            self.bump();
        }
        if last_underscore {
            return Err(self.error_at(start, "malformed number: misplaced '_'"));
        }
        Ok(count)
    }
}

fn describe(c: char) -> String {
    if c.is_control() {
        format!("character {:?}", c)
    } else {
        format!("'{c}'")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(text: &str) -> f64 {
        match read(text).unwrap().0 {
            Literal::Number(n) => n,
            other => panic!("expected number, got {other:?}"),
        }
    }

    #[test]
    fn reads_number_forms() {
        assert_eq!(number("1"), 1.0);
        assert_eq!(number("-0.25"), -0.25);
        assert_eq!(number("+.5"), 0.5);
        assert_eq!(number("5."), 5.0);
        assert_eq!(number("1_000"), 1000.0);
        assert_eq!(number("2.5e-1"), 0.25);
    }

    #[test]
    fn rejects_malformed_numbers() {
        assert!(read("-").is_err());
        assert!(read("1e").is_err());
        assert!(read("1__0").is_err());
        assert!(read("1e999").is_err());
        assert!(read("0x10").is_err());
    }

    #[test]
    fn reads_strings_with_escapes() {
        let (lit, _) = read(r#"'it\'s "ok"'"#).unwrap();
        assert_eq!(lit, Literal::Str("it's \"ok\"".to_string()));
        let (lit, _) = read(r#""a\tb""#).unwrap();
        assert_eq!(lit, Literal::Str("a\tb".to_string()));
    }

    #[test]
    fn unterminated_string_reports_its_start() {
        let err = read("{\n  'abc: 1}").unwrap_err();
        assert_eq!((err.line, err.column), (2, 3));
        assert!(err.message.contains("unterminated"));
    }

    #[test]
    fn unbalanced_brace_points_at_opening() {
        let err = read("{'a': {'X': 1}").unwrap_err();
        assert_eq!((err.line, err.column), (1, 1));
        assert!(err.message.contains("never closed"));
    }

    #[test]
    fn deep_nesting_is_an_error_not_a_crash() {
        let err = read(&"{'a': ".repeat(200_000)).unwrap_err();
        assert_eq!((err.line, err.column), (1, 13));
        assert!(err.message.contains("nest deeper"));

        assert!(read("{'a': {'b': 1}}").is_ok());
        assert!(read("{'a': {'b': {'c': 1}}}").is_err());
    }

    #[test]
    fn comments_and_trailing_commas_are_allowed() {
        let (lit, _) = read("# header\n{'a': 1, # note\n 'b': 2,}\n# footer").unwrap();
        let Literal::Map(entries) = lit else {
            panic!("expected map");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].key, "b");
        assert_eq!(entries[1].key_pos, Pos { line: 3, column: 2 });
    }

    #[test]
    fn rejects_non_literal_constructs() {
        for text in [
            "{'a': __import__('os')}",
            "{'a': True}",
            "{'a': [1, 2]}",
            "{'a': 1 + 2}",
            "{a: 1}",
            "{1: 2}",
            "{'a' 1}",
            "{'a': 1} extra",
        ] {
            assert!(read(text).is_err(), "accepted {text}");
        }
    }
}
