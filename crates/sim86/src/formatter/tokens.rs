/*
    sim86 token system for disassembly formatting
*/
use std::fmt::{Display, Formatter, Result as FmtResult};

use super::FormatterOutput;

/// Marker trait for all tokens; requires Display for rendering to text.
pub trait Token: Display {}

/// Tokens with semantic meaning (mnemonic, register, immediate, displacement, label, keyword)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SemanticToken {
    Mnemonic(String),
    Register(String),
    Immediate(String),
    Displacement(String),
    /// A reference to a branch target.
    Relative(String),
    /// A label declaration.
    Label(String),
    /// Size and distance qualifiers, and directives.
    Keyword(String),
}

impl Display for SemanticToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SemanticToken::Mnemonic(s)
            | SemanticToken::Register(s)
            | SemanticToken::Immediate(s)
            | SemanticToken::Displacement(s)
            | SemanticToken::Relative(s)
            | SemanticToken::Label(s)
            | SemanticToken::Keyword(s) => f.write_str(s),
        }
    }
}
impl Token for SemanticToken {}

/// Tokens describing presentation/decoration (punctuation, whitespace, raw text)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecoratorToken {
    OpenBracket,
    CloseBracket,
    Plus,
    Minus,
    Comma,
    Colon,
    Newline,
    Whitespace(String),
    Text(String),
}

impl Display for DecoratorToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DecoratorToken::OpenBracket => f.write_str("["),
            DecoratorToken::CloseBracket => f.write_str("]"),
            DecoratorToken::Plus => f.write_str("+"),
            DecoratorToken::Minus => f.write_str("-"),
            DecoratorToken::Comma => f.write_str(","),
            DecoratorToken::Colon => f.write_str(":"),
            DecoratorToken::Newline => f.write_str("\n"),
            DecoratorToken::Whitespace(s) => f.write_str(s),
            DecoratorToken::Text(s) => f.write_str(s),
        }
    }
}
impl Token for DecoratorToken {}

/// Unified token stream item
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenItem {
    Semantic(SemanticToken),
    Decorator(DecoratorToken),
}

impl Display for TokenItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            TokenItem::Semantic(t) => Display::fmt(t, f),
            TokenItem::Decorator(t) => Display::fmt(t, f),
        }
    }
}
impl Token for TokenItem {}

/// A simple collector of tokens that can also be rendered to a flat string
#[derive(Default, Debug)]
pub struct TokenStream {
    pub tokens: Vec<TokenItem>,
}

impl TokenStream {
    pub fn new() -> Self {
        Self { tokens: Vec::new() }
    }

    /// Iterate over collected tokens
    pub fn iter(&self) -> impl Iterator<Item = &TokenItem> {
        self.tokens.iter()
    }

    /// Iterate over semantic tokens only, skipping decoration.
    pub fn semantic(&self) -> impl Iterator<Item = &SemanticToken> {
        self.tokens.iter().filter_map(|t| match t {
            TokenItem::Semantic(s) => Some(s),
            TokenItem::Decorator(_) => None,
        })
    }

    /// Render collected tokens into a single String
    pub fn to_string_flat(&self) -> String {
        let mut s = String::new();
        for t in &self.tokens {
            s.push_str(&t.to_string());
        }
        s
    }

    /// Helper to push a whitespace token
    pub fn ws(&mut self) {
        self.tokens
            .push(TokenItem::Decorator(DecoratorToken::Whitespace(" ".into())));
    }

    fn push_semantic(&mut self, token: SemanticToken) {
        self.tokens.push(TokenItem::Semantic(token));
    }

    fn push_decorator(&mut self, token: DecoratorToken) {
        self.tokens.push(TokenItem::Decorator(token));
    }
}

impl FormatterOutput for TokenStream {
    fn write_text(&mut self, s: &str) {
        self.push_decorator(DecoratorToken::Text(s.to_string()));
    }

    fn write_keyword(&mut self, s: &str) {
        self.push_semantic(SemanticToken::Keyword(s.to_string()));
    }

    fn write_register(&mut self, s: &str) {
        self.push_semantic(SemanticToken::Register(s.to_string()));
    }

    fn write_mnemonic(&mut self, s: &str) {
        self.push_semantic(SemanticToken::Mnemonic(s.to_string()));
    }

    fn write_immediate(&mut self, s: &str) {
        self.push_semantic(SemanticToken::Immediate(s.to_string()));
    }

    fn write_relative(&mut self, s: &str) {
        self.push_semantic(SemanticToken::Relative(s.to_string()));
    }

    fn write_displacement(&mut self, s: &str) {
        self.push_semantic(SemanticToken::Displacement(s.to_string()));
    }

    fn write_separator(&mut self, s: &str) {
        match s {
            "[" => self.push_decorator(DecoratorToken::OpenBracket),
            "]" => self.push_decorator(DecoratorToken::CloseBracket),
            "," => self.push_decorator(DecoratorToken::Comma),
            ":" => self.push_decorator(DecoratorToken::Colon),
            "\n" => self.push_decorator(DecoratorToken::Newline),
            ws if ws.trim().is_empty() => self.push_decorator(DecoratorToken::Whitespace(ws.to_string())),
            other => self.push_decorator(DecoratorToken::Text(other.to_string())),
        }
    }

    fn write_symbol(&mut self, s: &str) {
        match s {
            "+" => self.push_decorator(DecoratorToken::Plus),
            "-" => self.push_decorator(DecoratorToken::Minus),
            ":" => self.push_decorator(DecoratorToken::Colon),
            other => self.push_decorator(DecoratorToken::Text(other.to_string())),
        }
    }

    fn write_label(&mut self, s: &str) {
        self.push_semantic(SemanticToken::Label(s.to_string()));
    }
}
