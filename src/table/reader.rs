use crate::{Error, Result};

/// One row of delimited text
#[derive(Debug, PartialEq)]
pub(crate) struct Row {
    /// 1-based line on which the row starts
    pub line: usize,
    pub fields: Vec<String>,
}

impl Row {
    /// A line with nothing on it
    pub fn is_blank(&self) -> bool {
        self.fields.len() == 1 && self.fields[0].trim().is_empty()
    }
}

/// Splits text into rows of fields.
///
/// Quoted fields may hold the delimiter, line breaks and doubled quotes.
pub(crate) struct Rows<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
}

impl<'a> Rows<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
            line: 1,
        }
    }
}

impl Iterator for Rows<'_> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.chars.peek()?;

        let line = self.line;
        let mut fields = Vec::new();
        let mut field = String::new();
        let mut in_quotes = false;

        loop {
            match self.chars.next() {
                None if in_quotes => {
                    return Some(Err(Error::MalformedRow {
                        line,
                        reason: "unterminated quoted field".into(),
                    }));
                }
                None => {
                    fields.push(field);
                    break;
                }
                Some('"') if in_quotes => {
                    if self.chars.peek() == Some(&'"') {
                        self.chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                Some('"') if field.is_empty() => in_quotes = true,
                Some(c) if in_quotes => {
                    if c == '\n' {
                        self.line += 1;
                    }
                    field.push(c);
                }
                Some(',') => fields.push(std::mem::take(&mut field)),
                Some('\r') if matches!(self.chars.peek(), Some(&'\n') | None) => {}
                Some('\n') => {
                    self.line += 1;
                    fields.push(field);
                    break;
                }
                Some(c) => field.push(c),
            }
        }

        Some(Ok(Row { line, fields }))
    }
}
