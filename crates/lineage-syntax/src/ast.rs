use crate::SyntaxKind::*;
use crate::{SyntaxKind, SyntaxNode, SyntaxSet, SyntaxToken};

pub trait AstNode {
    fn can_cast(kind: SyntaxKind) -> bool
    where
        Self: Sized;

    fn cast(syntax: SyntaxNode) -> Option<Self>
    where
        Self: Sized;

    fn syntax(&self) -> &SyntaxNode;
}

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                kind == $kind
            }

            fn cast(syntax: SyntaxNode) -> Option<Self> {
                Self::can_cast(syntax.kind()).then_some(Self(syntax))
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

ast_node!(Module, MODULE);
ast_node!(Block, BLOCK);
ast_node!(ValStmt, VAL_STMT);
ast_node!(NameRef, NAME_REF);
ast_node!(Literal, LITERAL);
ast_node!(BinaryExpr, BINARY_EXPR);
ast_node!(ParenExpr, PAREN_EXPR);
ast_node!(CallExpr, CALL_EXPR);
ast_node!(ArrayRank, ARRAY_RANK);
ast_node!(OmittedArraySizeExpr, OMITTED_ARRAY_SIZE_EXPR);

impl Module {
    pub fn statements(&self) -> impl Iterator<Item = SyntaxNode> + use<> {
        self.0.children().flat_map(|child| {
            if child.kind().is_list() {
                child.children().collect::<Vec<_>>()
            } else {
                vec![child]
            }
        })
    }
}

impl ValStmt {
    pub fn name(&self) -> Option<SyntaxToken> {
        token_of_kind(&self.0, NAME)
    }

    pub fn initializer(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }
}

impl NameRef {
    pub fn name(&self) -> Option<SyntaxToken> {
        token_of_kind(&self.0, NAME)
    }
}

impl BinaryExpr {
    pub fn lhs(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }

    pub fn op(&self) -> Option<SyntaxToken> {
        token_of_kind(&self.0, BINARY_OPERATOR)
    }

    pub fn rhs(&self) -> Option<Expr> {
        self.0.children().filter_map(Expr::cast).nth(1)
    }
}

impl ArrayRank {
    /// Size expressions between the brackets, omitted ones included.
    pub fn sizes(&self) -> impl Iterator<Item = Expr> + use<> {
        self.0.children().filter_map(Expr::cast)
    }
}

const EXPR: SyntaxSet = SyntaxSet::new([
    NAME_REF,
    LITERAL,
    BINARY_EXPR,
    PAREN_EXPR,
    CALL_EXPR,
    OMITTED_ARRAY_SIZE_EXPR,
]);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    NameRef(NameRef),
    Literal(Literal),
    Binary(BinaryExpr),
    Paren(ParenExpr),
    Call(CallExpr),
    OmittedArraySize(OmittedArraySizeExpr),
}

impl AstNode for Expr {
    fn can_cast(kind: SyntaxKind) -> bool {
        EXPR.contains(kind)
    }

    fn cast(syntax: SyntaxNode) -> Option<Self> {
        let expr = match syntax.kind() {
            NAME_REF => Expr::NameRef(NameRef(syntax)),
            LITERAL => Expr::Literal(Literal(syntax)),
            BINARY_EXPR => Expr::Binary(BinaryExpr(syntax)),
            PAREN_EXPR => Expr::Paren(ParenExpr(syntax)),
            CALL_EXPR => Expr::Call(CallExpr(syntax)),
            OMITTED_ARRAY_SIZE_EXPR => Expr::OmittedArraySize(OmittedArraySizeExpr(syntax)),
            _ => return None,
        };
        Some(expr)
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Expr::NameRef(it) => it.syntax(),
            Expr::Literal(it) => it.syntax(),
            Expr::Binary(it) => it.syntax(),
            Expr::Paren(it) => it.syntax(),
            Expr::Call(it) => it.syntax(),
            Expr::OmittedArraySize(it) => it.syntax(),
        }
    }
}

/// Any node; lets untyped lookups go through the typed API.
impl AstNode for SyntaxNode {
    fn can_cast(_: SyntaxKind) -> bool {
        true
    }

    fn cast(syntax: SyntaxNode) -> Option<Self> {
        Some(syntax)
    }

    fn syntax(&self) -> &SyntaxNode {
        self
    }
}

fn token_of_kind(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    node.children_with_tokens().filter_map(|it| it.into_token()).find(|it| it.kind() == kind)
}
