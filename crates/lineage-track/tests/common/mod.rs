#![allow(dead_code)]

use lineage_syntax::SyntaxKind::*;
use lineage_syntax::{
    GreenElement, GreenNode, GreenToken, GreenTrivia, SyntaxKind, SyntaxNode, TextRange,
    TriviaPiece, WalkEvent,
};

pub fn range(start: u32, end: u32) -> TextRange {
    TextRange::new(start.into(), end.into())
}

pub fn token(kind: SyntaxKind, text: &str) -> GreenElement {
    GreenToken::new(kind, text).into()
}

pub fn node(kind: SyntaxKind, children: impl IntoIterator<Item = GreenElement>) -> GreenNode {
    GreenNode::new(kind, children)
}

/// `;` followed by `spaces` spaces.
pub fn semicolon(spaces: u32) -> GreenElement {
    let text = format!(";{}", " ".repeat(spaces as usize));
    GreenToken::with_trivia(
        GreenTrivia::new(&[]),
        SEMICOLON,
        &text,
        GreenTrivia::new(&[TriviaPiece::whitespace(spaces)]),
    )
    .into()
}

/// `name(x);` with `spaces` spaces of trailing trivia.
pub fn call(name: &str, spaces: u32) -> GreenNode {
    let args = node(
        ARG_LIST,
        [
            token(LEFT_PAREN, "("),
            node(NAME_REF, [token(NAME, "x")]).into(),
            token(RIGHT_PAREN, ")"),
        ],
    );
    node(CALL_EXPR, [node(NAME_REF, [token(NAME, name)]).into(), args.into(), semicolon(spaces)])
}

/// A module with `prefix` as its first token, then `call`, then `42`.
pub fn module(prefix: &str, call: GreenNode) -> SyntaxNode {
    SyntaxNode::new_root(node(MODULE, [token(NAME, prefix), call.into(), token(NUMBER, "42")]))
}

/// The original tree: the call `foo(x);   ` spans 10..20, its arguments 13..16.
pub fn original() -> SyntaxNode {
    module("0123456789", call("foo", 3))
}

#[track_caller]
pub fn first_of_kind(root: &SyntaxNode, kind: SyntaxKind) -> SyntaxNode {
    root.preorder()
        .find_map(|event| match event {
            WalkEvent::Enter(node) if node.kind() == kind => Some(node),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no {kind:?} in\n{}", root.debug_dump()))
}
