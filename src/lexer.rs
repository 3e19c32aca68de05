use std::iter::Peekable;
use std::str::Chars;

/// One comma-separated clause of a field spec, already split on `:`.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    /// Zero-based position of the clause in the spec string.
    pub index: usize,
    /// Raw clause text, trimmed.
    pub text: String,
    /// Colon-separated parts, each trimmed.
    pub parts: Vec<String>,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LexError {
    #[error("Unbalanced parentheses in clause {index}: `{text}`")]
    UnbalancedParens { index: usize, text: String },
}

/// Splits a field spec into clauses and parts.
///
/// Separators inside parentheses are literal, so `default(a,b)` and
/// `default(12:30)` survive as a single part. Nesting is tracked only to find
/// the matching close paren; the payload itself is never interpreted.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    depth: usize,
    index: usize,
    clause_text: String,
    part: String,
    parts: Vec<String>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            depth: 0,
            index: 0,
            clause_text: String::new(),
            part: String::new(),
            parts: Vec::new(),
        }
    }

    fn end_part(&mut self) {
        let part = std::mem::take(&mut self.part);
        self.parts.push(part.trim().to_string());
    }

    fn end_clause(&mut self) -> Result<Clause, LexError> {
        let text = std::mem::take(&mut self.clause_text).trim().to_string();
        if self.depth != 0 {
            return Err(LexError::UnbalancedParens {
                index: self.index,
                text,
            });
        }
        self.end_part();
        let mut parts = std::mem::take(&mut self.parts);
        // A clause with nothing but whitespace has no parts at all.
        if parts.len() == 1 && parts[0].is_empty() {
            parts.clear();
        }
        let clause = Clause {
            index: self.index,
            text,
            parts,
        };
        self.index += 1;
        Ok(clause)
    }

    pub fn tokenize(&mut self) -> Result<Vec<Clause>, LexError> {
        let mut clauses = Vec::new();
        let mut saw_input = false;

        while let Some(c) = self.chars.next() {
            if !c.is_whitespace() {
                saw_input = true;
            }
            match c {
                ',' if self.depth == 0 => {
                    clauses.push(self.end_clause()?);
                    continue;
                }
                ':' if self.depth == 0 => {
                    self.clause_text.push(c);
                    self.end_part();
                    continue;
                }
                '(' => self.depth += 1,
                ')' => {
                    if self.depth == 0 {
                        self.clause_text.push(c);
                        self.skip_to_clause_end();
                        return Err(LexError::UnbalancedParens {
                            index: self.index,
                            text: self.clause_text.trim().to_string(),
                        });
                    }
                    self.depth -= 1;
                }
                _ => {}
            }
            self.clause_text.push(c);
            self.part.push(c);
        }

        // Whitespace-only input is an empty spec, not one empty clause.
        if saw_input {
            clauses.push(self.end_clause()?);
        }

        Ok(clauses)
    }

    fn skip_to_clause_end(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c == ',' {
                break;
            }
            self.clause_text.push(c);
            self.chars.next();
        }
    }
}
