//! Input Tape
//!
//! The tokenized argument buffer every processor consumes from. The tape
//! keeps all tokens it ever saw; consumption only removes indices from the
//! ordered remaining set, so snapshot bookkeeping and transformer rewrites
//! can still address consumed tokens.
//!
//! Invariants:
//! - an index that leaves the remaining set never re-enters except through
//!   an explicit push-front (`unpop`)
//! - tokens are never reordered
//! - snapshot stamps are never removed

use crate::input::lexer::{tokenize, Delimiter};

#[derive(Debug, Clone)]
struct Token {
    text: String,
    /// Snapshot ids taken while this token was still unconsumed.
    stamps: Vec<u32>,
}

impl Token {
    fn new(text: String) -> Self {
        Self { text, stamps: Vec::new() }
    }
}

/// Terminates a list argument's consumption when encountered.
#[derive(Debug, Clone)]
pub struct ListBreaker {
    pub token: String,
    /// With discard, the breaker itself is popped and dropped.
    pub discard: bool,
}

impl ListBreaker {
    pub fn new(token: impl Into<String>, discard: bool) -> Self {
        Self { token: token.into(), discard }
    }
}

/// Outcome of a `pop_n` consumption run.
#[derive(Debug, Clone)]
pub struct PopResult {
    pub tokens: Vec<String>,
    /// Tape indices of the taken tokens, parallel to `tokens`.
    pub indices: Vec<usize>,
    /// True iff at least `required` tokens were available.
    pub enough: bool,
}

impl PopResult {
    /// True iff the cursor token was among the taken tokens.
    pub fn took_cursor(&self, tape: &InputTape) -> bool {
        match tape.cursor {
            Some(c) => self.indices.contains(&c),
            None => false,
        }
    }
}

/// Tokenized argument buffer with position cursor, remaining-index set,
/// quote state, and snapshot stamps.
#[derive(Debug, Clone)]
pub struct InputTape {
    tokens: Vec<Token>,
    /// Ordered indices of tokens not yet consumed.
    remaining: Vec<usize>,
    /// Indices in consumption order.
    consumed: Vec<usize>,
    /// Index of the token under the cursor (complete mode only).
    cursor: Option<usize>,
    open_quote: Option<Delimiter>,
    next_snapshot: u32,
}

impl InputTape {
    /// Execute-mode tape over argv-style tokens.
    pub fn new(args: &[String]) -> Self {
        let tokens: Vec<Token> = args.iter().map(|a| Token::new(a.clone())).collect();
        let remaining = (0..tokens.len()).collect();
        Self {
            tokens,
            remaining,
            consumed: Vec::new(),
            cursor: None,
            open_quote: None,
            next_snapshot: 0,
        }
    }

    /// Complete-mode tape. The raw line is tokenized (truncated at the
    /// optional cursor character offset first) and the token under the
    /// cursor is always present: a line ending in unquoted whitespace gets
    /// an empty trailing token.
    pub fn for_completion(raw: &str, cursor_char: Option<usize>) -> Self {
        let truncated = match cursor_char {
            Some(at) => {
                let mut end = at.min(raw.len());
                while end < raw.len() && !raw.is_char_boundary(end) {
                    end += 1;
                }
                &raw[..end]
            }
            None => raw,
        };
        let line = tokenize(truncated);
        let mut words = line.words;
        if words.is_empty() || line.trailing_space {
            words.push(String::new());
        }
        let tokens: Vec<Token> = words.into_iter().map(Token::new).collect();
        let remaining = (0..tokens.len()).collect();
        let cursor = Some(tokens.len() - 1);
        Self {
            tokens,
            remaining,
            consumed: Vec::new(),
            cursor,
            open_quote: line.open_quote,
            next_snapshot: 0,
        }
    }

    pub fn open_quote(&self) -> Option<Delimiter> {
        self.open_quote
    }

    pub fn cursor_index(&self) -> Option<usize> {
        self.cursor
    }

    /// Text of the cursor token.
    pub fn cursor_text(&self) -> &str {
        match self.cursor {
            Some(c) => &self.tokens[c].text,
            None => "",
        }
    }

    /// True iff the front remaining token is the cursor token.
    pub fn front_is_cursor(&self) -> bool {
        matches!((self.remaining.first(), self.cursor), (Some(&f), Some(c)) if f == c)
    }

    /// True iff the cursor token has not been consumed yet.
    pub fn cursor_remaining(&self) -> bool {
        match self.cursor {
            Some(c) => self.remaining.contains(&c),
            None => false,
        }
    }

    pub fn remaining_len(&self) -> usize {
        self.remaining.len()
    }

    pub fn fully_processed(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Current token without consuming it.
    pub fn peek(&self) -> Option<&str> {
        self.remaining.first().map(|&i| self.tokens[i].text.as_str())
    }

    pub fn peek_at(&self, offset: usize) -> Option<&str> {
        self.remaining.get(offset).map(|&i| self.tokens[i].text.as_str())
    }

    /// Consume and return the front token.
    pub fn pop(&mut self) -> Option<String> {
        self.pop_with_index().map(|(text, _)| text)
    }

    /// Consume the front token, returning its text and tape index so it can
    /// be re-inserted with `unpop`.
    pub fn pop_with_index(&mut self) -> Option<(String, usize)> {
        if self.remaining.is_empty() {
            return None;
        }
        let index = self.remaining.remove(0);
        self.consumed.push(index);
        Some((self.tokens[index].text.clone(), index))
    }

    /// Consume the token at `offset` positions into the remaining set.
    /// Used by flag extraction, which removes markers mid-stream.
    pub fn pop_at(&mut self, offset: usize) -> Option<(String, usize)> {
        if offset >= self.remaining.len() {
            return None;
        }
        let index = self.remaining.remove(offset);
        self.consumed.push(index);
        Some((self.tokens[index].text.clone(), index))
    }

    /// Consume up to `required + optional` tokens starting `start` positions
    /// into the remaining set (`optional = None` takes everything).
    /// Consumption stops before a breaker token; with discard, the breaker
    /// is popped and dropped. `enough` is true iff at least `required`
    /// tokens were taken.
    pub fn pop_n(
        &mut self,
        required: usize,
        optional: Option<usize>,
        breaker: Option<&ListBreaker>,
    ) -> PopResult {
        self.pop_n_at(0, required, optional, breaker)
    }

    pub fn pop_n_at(
        &mut self,
        start: usize,
        required: usize,
        optional: Option<usize>,
        breaker: Option<&ListBreaker>,
    ) -> PopResult {
        let limit = optional.map(|o| required + o);
        let mut tokens = Vec::new();
        let mut indices = Vec::new();
        loop {
            if let Some(limit) = limit {
                if tokens.len() >= limit {
                    break;
                }
            }
            let Some(text) = self.peek_at(start) else { break };
            if let Some(b) = breaker {
                if text == b.token {
                    if b.discard {
                        self.pop_at(start);
                    }
                    break;
                }
            }
            let (text, index) = self.pop_at(start).expect("peeked token must pop");
            tokens.push(text);
            indices.push(index);
        }
        let enough = tokens.len() >= required;
        PopResult { tokens, indices, enough }
    }

    /// Insert new tokens at the current position. The only permitted tape
    /// rewrite for wrapper processors.
    pub fn push_front(&mut self, texts: &[String]) {
        let mut new_indices = Vec::with_capacity(texts.len());
        for text in texts {
            let index = self.tokens.len();
            self.tokens.push(Token::new(text.clone()));
            new_indices.push(index);
        }
        self.remaining.splice(0..0, new_indices);
    }

    /// Re-insert a previously consumed token at the front of the remaining
    /// set, preserving its stamps.
    pub fn unpop(&mut self, index: usize) {
        debug_assert!(!self.remaining.contains(&index));
        if let Some(pos) = self.consumed.iter().rposition(|&i| i == index) {
            self.consumed.remove(pos);
        }
        self.remaining.insert(0, index);
    }

    /// Re-insert a run of consumed tokens, preserving their order.
    pub fn unpop_all(&mut self, indices: &[usize]) {
        for &index in indices.iter().rev() {
            self.unpop(index);
        }
    }

    /// Replace the text of a token (already consumed or not). Used by
    /// transformer rewriting and complete-for-execute.
    pub fn rewrite(&mut self, index: usize, text: impl Into<String>) {
        self.tokens[index].text = text.into();
    }

    pub fn text_at(&self, index: usize) -> &str {
        &self.tokens[index].text
    }

    /// Stamp all remaining tokens with a fresh snapshot id.
    pub fn snapshot(&mut self) -> u32 {
        let id = self.next_snapshot;
        self.next_snapshot += 1;
        for &index in &self.remaining {
            self.tokens[index].stamps.push(id);
        }
        id
    }

    /// Tokens that carried the snapshot stamp and have since been consumed,
    /// in consumption order.
    pub fn consumed_since(&self, id: u32) -> Vec<String> {
        self.consumed
            .iter()
            .filter(|&&i| self.tokens[i].stamps.contains(&id))
            .map(|&i| self.tokens[i].text.clone())
            .collect()
    }

    /// Unconsumed tokens in order, for diagnostics.
    pub fn remaining_slice(&self) -> Vec<String> {
        self.remaining.iter().map(|&i| self.tokens[i].text.clone()).collect()
    }
}
