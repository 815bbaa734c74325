//! Trivia pieces attached to tokens.

use text_size::TextSize;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TriviaPieceKind {
    Whitespace,
    Newline,
    SingleLineComment,
}

/// One run of trivia; a token's leading or trailing trivia is a slice of these.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TriviaPiece {
    pub kind: TriviaPieceKind,
    pub len: TextSize,
}

impl TriviaPiece {
    pub fn new(kind: TriviaPieceKind, len: TextSize) -> Self {
        Self { kind, len }
    }

    /// `len` spaces or tabs.
    pub fn whitespace(len: u32) -> Self {
        Self::new(TriviaPieceKind::Whitespace, len.into())
    }

    /// A single `\n`.
    pub fn newline() -> Self {
        Self::new(TriviaPieceKind::Newline, 1.into())
    }

    /// A `//` comment of `len` bytes, up to but excluding the line break.
    pub fn comment(len: u32) -> Self {
        Self::new(TriviaPieceKind::SingleLineComment, len.into())
    }
}
