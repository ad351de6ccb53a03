//! Tokenization: split text into words, punctuation and whitespace runs.
//!
//! [`Tokens`] is a lazy iterator over `&str`. It is `Clone`, so a sequence can
//! be restarted from any point by cloning it before advancing. Splitting is
//! driven by a single regex; each match is classified by the capture group
//! that fired:
//!
//! 1. a single Han / Hiragana / Katakana character (these scripts do not
//!    separate words with spaces, so one character is one word)
//! 2. a run of letters, marks and digits, allowing inner `'`, `’` or `-`
//!    (`don't`, `well-known`)
//! 3. a run of whitespace
//! 4. any other single character, treated as punctuation

use crate::output::TokenSummary;
use crate::pipeline::language;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static RE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)(?P<cjk>[\p{Han}\p{Hiragana}\p{Katakana}])|(?P<word>[[\p{L}\p{M}\p{N}]--[\p{Han}\p{Hiragana}\p{Katakana}]]+(?:['’\-][[\p{L}\p{M}\p{N}]--[\p{Han}\p{Hiragana}\p{Katakana}]]+)*)|(?P<ws>\s+)|(?P<punct>.)",
    )
    .unwrap()
});

/// Classification of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    Word,
    Punctuation,
    Whitespace,
}

/// A token borrowed from the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub kind: TokenKind,
    /// Byte offset into the source text.
    pub offset: usize,
}

impl Token<'_> {
    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Word
    }
}

/// Lazy token stream over a string slice.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    text: &'a str,
    pos: usize,
}

/// Start tokenizing `text`.
pub fn tokens(text: &str) -> Tokens<'_> {
    Tokens { text, pos: 0 }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.text.len() {
            return None;
        }
        let caps = RE_TOKEN.captures_at(self.text, self.pos)?;
        let (m, kind) = if let Some(m) = caps.name("cjk").or_else(|| caps.name("word")) {
            (m, TokenKind::Word)
        } else if let Some(m) = caps.name("ws") {
            (m, TokenKind::Whitespace)
        } else {
            (caps.name("punct")?, TokenKind::Punctuation)
        };
        self.pos = m.end();
        Some(Token {
            text: m.as_str(),
            kind,
            offset: m.start(),
        })
    }
}

/// Produces the [`TokenSummary`] returned with every ingestion.
pub trait TextTokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> TokenSummary;
}

/// Regex tokenizer plus heuristic language detection.
#[derive(Debug, Clone, Default)]
pub struct DefaultTokenizer;

impl TextTokenizer for DefaultTokenizer {
    fn tokenize(&self, text: &str) -> TokenSummary {
        tokenize_text(text)
    }
}

/// Tokenize `text`, count its words and detect its languages.
pub fn tokenize_text(text: &str) -> TokenSummary {
    let mut word_count = 0;
    let tokens: Vec<String> = tokens(text)
        .filter(|t| t.kind != TokenKind::Whitespace)
        .inspect(|t| {
            if t.is_word() {
                word_count += 1;
            }
        })
        .map(|t| t.text.to_string())
        .collect();

    TokenSummary {
        tokens,
        word_count,
        languages: language::detect_languages(text),
    }
}
