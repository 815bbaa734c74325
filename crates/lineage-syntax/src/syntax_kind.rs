use crate::SyntaxSet;

#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
#[repr(u16)]
pub enum SyntaxKind {
    LEFT_PAREN,
    RIGHT_PAREN,
    LEFT_BRACKET,
    RIGHT_BRACKET,
    LEFT_BRACE,
    RIGHT_BRACE,
    COMMA,
    SEMICOLON,
    EQ,
    DOT,

    FUN_KW,
    VAL_KW,
    RETURN_KW,
    NAME,

    NUMBER,
    BINARY_OPERATOR,
    /// Synthesized by the parser where an array size may be left out.
    OMITTED_ARRAY_SIZE,

    UNKNOWN,
    EOF,

    MODULE,
    FUNCTION,
    PARAM_LIST,
    PARAM,
    BLOCK,
    VAL_STMT,
    EXPR_STMT,
    RETURN_STMT,
    NAME_REF,
    LITERAL,
    BINARY_EXPR,
    PAREN_EXPR,
    CALL_EXPR,
    ARG_LIST,
    ARRAY_TYPE,
    ARRAY_RANK,
    OMITTED_ARRAY_SIZE_EXPR,
    /// Grouping wrapper for repeated children; it has no source identity of its own.
    LIST,
    ERROR,
    TOMBSTONE,
}

const TOKENS: SyntaxSet = SyntaxSet::new([
    SyntaxKind::LEFT_PAREN,
    SyntaxKind::RIGHT_PAREN,
    SyntaxKind::LEFT_BRACKET,
    SyntaxKind::RIGHT_BRACKET,
    SyntaxKind::LEFT_BRACE,
    SyntaxKind::RIGHT_BRACE,
    SyntaxKind::COMMA,
    SyntaxKind::SEMICOLON,
    SyntaxKind::EQ,
    SyntaxKind::DOT,
    SyntaxKind::FUN_KW,
    SyntaxKind::VAL_KW,
    SyntaxKind::RETURN_KW,
    SyntaxKind::NAME,
    SyntaxKind::NUMBER,
    SyntaxKind::BINARY_OPERATOR,
    SyntaxKind::OMITTED_ARRAY_SIZE,
    SyntaxKind::UNKNOWN,
    SyntaxKind::EOF,
]);

impl SyntaxKind {
    /// Returns `true` for kinds that only ever appear on leaves.
    pub const fn is_token(self) -> bool {
        TOKENS.contains(self)
    }

    /// Returns `true` for synthetic grouping nodes.
    pub const fn is_list(self) -> bool {
        matches!(self, Self::LIST)
    }
}
