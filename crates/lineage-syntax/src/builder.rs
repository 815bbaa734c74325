//! Incremental builder for green trees.

use crate::{GreenElement, GreenNode, GreenToken, GreenTrivia, SyntaxKind, TriviaPiece};

/// Builds a green tree from start/finish events.
#[derive(Default)]
pub struct Builder {
    /// Kind of each opened node and where its children start in `children`.
    parents: Vec<(SyntaxKind, usize)>,
    children: Vec<GreenElement>,
}

impl Drop for Builder {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.parents.is_empty() {
            panic!("you should call `Builder::finish()`");
        }
    }
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new node of the given kind.
    pub fn start_node(&mut self, kind: SyntaxKind) {
        self.parents.push((kind, self.children.len()));
    }

    /// Finishes the most recently started node.
    #[track_caller]
    pub fn finish_node(&mut self) {
        let (kind, first_child) = self.parents.pop().expect("no opened nodes?");
        let children = self.children.split_off(first_child);
        self.children.push(GreenNode::new(kind, children).into());
    }

    /// Starts a list under the current node.
    pub fn start_list(&mut self) {
        self.start_node(SyntaxKind::LIST);
    }

    /// Finishes the most recently started list.
    #[track_caller]
    pub fn finish_list(&mut self) {
        match self.parents.last() {
            Some((SyntaxKind::LIST, _)) => self.finish_node(),
            Some(_) => panic!("expected an opened list, found an opened node"),
            None => panic!("no opened lists?"),
        }
    }

    /// Adds a token without trivia.
    pub fn token(&mut self, kind: SyntaxKind, text: &str) {
        self.push(GreenToken::new(kind, text));
    }

    /// Adds a token whose `text` covers its leading and trailing trivia.
    #[track_caller]
    pub fn token_with_trivia(
        &mut self,
        leading: &[TriviaPiece],
        kind: SyntaxKind,
        text: &str,
        trailing: &[TriviaPiece],
    ) {
        self.push(GreenToken::with_trivia(
            GreenTrivia::new(leading),
            kind,
            text,
            GreenTrivia::new(trailing),
        ));
    }

    /// Adds a zero-width token, e.g. for a construct the source left out.
    pub fn missing(&mut self, kind: SyntaxKind) {
        self.token(kind, "");
    }

    /// Splices an existing green element in; it is shared, not copied.
    pub fn push(&mut self, element: impl Into<GreenElement>) {
        self.children.push(element.into());
    }

    /// Finishes building and returns the root.
    #[track_caller]
    pub fn finish(mut self) -> GreenNode {
        assert!(self.parents.is_empty(), "unfinished nodes left in the builder");
        assert_eq!(self.children.len(), 1, "a tree must have exactly one root");
        match self.children.pop() {
            Some(GreenElement::Node(root)) => root,
            _ => panic!("the root of a tree must be a node"),
        }
    }
}
