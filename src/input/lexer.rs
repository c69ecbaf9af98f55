//! Command-Line Tokenizer
//!
//! Splits one raw string into words with POSIX-like rules:
//! - unquoted whitespace separates words
//! - backslash escapes the next character outside quotes (so `\ ` is a
//!   literal space inside a word)
//! - single quotes pass double quotes through literally and vice versa
//! - inside double quotes, backslash escapes `"` and `\` only
//!
//! An unterminated quote at end-of-input is recorded as the open delimiter
//! so the completion engine can emit matching quotes.

/// Which quote character is open at end-of-input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Single,
    Double,
}

impl Delimiter {
    pub fn as_char(self) -> char {
        match self {
            Delimiter::Single => '\'',
            Delimiter::Double => '"',
        }
    }
}

/// Result of tokenizing one raw command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedLine {
    pub words: Vec<String>,
    /// Set iff the line ended inside an unclosed quote.
    pub open_quote: Option<Delimiter>,
    /// True iff the line ended in unquoted whitespace (the cursor sits on a
    /// fresh empty token).
    pub trailing_space: bool,
}

/// Tokenize a raw command line into shell words.
pub fn tokenize(raw: &str) -> TokenizedLine {
    let mut words: Vec<String> = Vec::new();
    let mut cur: Option<String> = None;
    let mut in_single = false;
    let mut in_double = false;
    let mut trailing_space = false;

    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if in_single {
            if c == '\'' {
                in_single = false;
            } else {
                cur.get_or_insert_with(String::new).push(c);
            }
            continue;
        }
        if in_double {
            match c {
                '"' => in_double = false,
                '\\' => match chars.peek() {
                    Some('"') | Some('\\') => {
                        let escaped = chars.next().unwrap();
                        cur.get_or_insert_with(String::new).push(escaped);
                    }
                    _ => cur.get_or_insert_with(String::new).push('\\'),
                },
                _ => cur.get_or_insert_with(String::new).push(c),
            }
            continue;
        }
        match c {
            '\'' => {
                in_single = true;
                cur.get_or_insert_with(String::new);
            }
            '"' => {
                in_double = true;
                cur.get_or_insert_with(String::new);
            }
            '\\' => {
                // Escape the next character; a trailing lone backslash is
                // kept literally.
                match chars.next() {
                    Some(escaped) => cur.get_or_insert_with(String::new).push(escaped),
                    None => cur.get_or_insert_with(String::new).push('\\'),
                }
                trailing_space = false;
            }
            c if c.is_whitespace() => {
                if let Some(word) = cur.take() {
                    words.push(word);
                }
                trailing_space = true;
            }
            _ => {
                cur.get_or_insert_with(String::new).push(c);
                trailing_space = false;
            }
        }
    }

    let open_quote = if in_single {
        Some(Delimiter::Single)
    } else if in_double {
        Some(Delimiter::Double)
    } else {
        None
    };

    if let Some(word) = cur.take() {
        words.push(word);
        trailing_space = false;
    } else if open_quote.is_some() {
        // A bare opening quote at end-of-input still starts a word.
        words.push(String::new());
        trailing_space = false;
    }
    if words.is_empty() {
        trailing_space = !raw.is_empty() || trailing_space;
    }

    TokenizedLine { words, open_quote, trailing_space }
}
