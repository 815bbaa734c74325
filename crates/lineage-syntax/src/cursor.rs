//! Preorder walks over a positioned tree.

use crate::{SyntaxElement, SyntaxElementChildren, SyntaxNode, SyntaxToken};

/// Preorder traversal over nodes.
#[derive(Clone)]
pub struct Preorder {
    inner: PreorderWithTokens,
}

impl Preorder {
    #[inline]
    pub(crate) fn new(start: SyntaxNode) -> Self {
        Self { inner: PreorderWithTokens::new(start) }
    }

    /// Skips the subtree of the node that was just entered.
    ///
    /// No `Leave` event is produced for that node.
    #[inline]
    pub fn skip_subtree(&mut self) {
        self.inner.skip_subtree();
    }
}

impl Iterator for Preorder {
    type Item = WalkEvent;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.find_map(|item| match item {
            WalkEventWithTokens::EnterNode(it) => Some(WalkEvent::Enter(it)),
            WalkEventWithTokens::LeaveNode(it) => Some(WalkEvent::Leave(it)),
            WalkEventWithTokens::Token(_) => None,
        })
    }
}

/// Preorder walk event for nodes.
#[derive(Clone, Debug)]
pub enum WalkEvent {
    Enter(SyntaxNode),
    Leave(SyntaxNode),
}

/// Preorder traversal over nodes and tokens.
#[derive(Clone)]
pub struct PreorderWithTokens {
    stack: Vec<(SyntaxNode, SyntaxElementChildren)>,
    root: Option<SyntaxNode>,
}

impl PreorderWithTokens {
    #[inline]
    pub(crate) fn new(start: SyntaxNode) -> Self {
        Self { stack: Vec::with_capacity(32), root: Some(start) }
    }

    /// Skips the subtree of the node that was just entered.
    ///
    /// No `LeaveNode` event is produced for that node.
    #[inline]
    pub fn skip_subtree(&mut self) {
        assert!(self.stack.pop().is_some(), "must have a subtree to skip");
    }
}

impl Iterator for PreorderWithTokens {
    type Item = WalkEventWithTokens;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(root) = self.root.take() {
            let children = root.children_with_tokens();
            self.stack.push((root.clone(), children));
            return Some(WalkEventWithTokens::EnterNode(root));
        }
        let (_, active_node) = self.stack.last_mut()?;
        match active_node.next() {
            Some(SyntaxElement::Node(child)) => {
                self.stack.push((child.clone(), child.children_with_tokens()));
                Some(WalkEventWithTokens::EnterNode(child))
            }
            Some(SyntaxElement::Token(child)) => Some(WalkEventWithTokens::Token(child)),
            None => {
                let (exited_node, _) = self.stack.pop()?;
                Some(WalkEventWithTokens::LeaveNode(exited_node))
            }
        }
    }
}

/// Preorder walk event including tokens.
#[derive(Clone, Debug)]
pub enum WalkEventWithTokens {
    EnterNode(SyntaxNode),
    LeaveNode(SyntaxNode),
    Token(SyntaxToken),
}
