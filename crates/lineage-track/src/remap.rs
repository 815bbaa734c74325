//! Mapping text ranges of a transformed tree back to the tree it came from.

use lineage_syntax::{SyntaxNode, TextRange, TextSize};

use crate::locator::innermost_node;
use crate::{Result, Tracker};

/// A range within a particular tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub root: SyntaxNode,
    pub range: TextRange,
}

impl Location {
    pub fn new(root: SyntaxNode, range: TextRange) -> Self {
        Self { root, range }
    }
}

/// Outcome of [`Tracker::get_pre_transformation_location`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Remapped {
    Mapped(Location),
    /// Mapped to an empty range at offset zero. Kept apart from `Mapped`
    /// because callers that only see ranges cannot tell it from a failure.
    EmptyAtStart(Location),
    /// Mapped through a token that was matched by kind alone, such as a
    /// renamed identifier.
    Approximate(Location),
    Unmappable,
}

impl Remapped {
    fn from_location(location: Location) -> Self {
        Self::from_match(location, true)
    }

    fn from_match(location: Location, exact: bool) -> Self {
        if !exact {
            Self::Approximate(location)
        } else if location.range == TextRange::empty(TextSize::new(0)) {
            Self::EmptyAtStart(location)
        } else {
            Self::Mapped(location)
        }
    }

    pub fn location(&self) -> Option<&Location> {
        match self {
            Self::Mapped(location) | Self::EmptyAtStart(location) | Self::Approximate(location) => {
                Some(location)
            }
            Self::Unmappable => None,
        }
    }

    pub fn into_location(self) -> Option<Location> {
        match self {
            Self::Mapped(location) | Self::EmptyAtStart(location) | Self::Approximate(location) => {
                Some(location)
            }
            Self::Unmappable => None,
        }
    }

    pub fn is_unmappable(&self) -> bool {
        matches!(self, Self::Unmappable)
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Self::Mapped(_) | Self::EmptyAtStart(_))
    }
}

impl Tracker {
    /// Maps `location` in a transformed tree to the corresponding range in
    /// the tree it was derived from.
    ///
    /// A range matching a node maps through that node, otherwise through the
    /// tokens at its start and end. An empty range maps to the start of the
    /// original token. A range inside a single token is translated only if
    /// the token kept its width.
    pub fn get_pre_transformation_location(&self, location: &Location) -> Result<Remapped> {
        let root = &location.root;
        let span = location.range;

        if !root.contains_annotations() {
            return Ok(Remapped::from_location(location.clone()));
        }
        let Some(node) = innermost_node(root, span) else {
            return Ok(Remapped::Unmappable);
        };

        if node.range() == span {
            return Ok(match self.get_pre_transformation_syntax(&node)? {
                Some(pre) => Remapped::from_location(Location::new(pre.root(), pre.range())),
                None => Remapped::Unmappable,
            });
        }

        let Some(start) = root.find_token(span.start(), false) else {
            return Ok(Remapped::Unmappable);
        };
        let Some(pre_start) = self.get_pre_transformation_token(&start)? else {
            return Ok(Remapped::Unmappable);
        };
        let pre_root = pre_start.token.parent().root();
        let start_exact = pre_start.exact;
        let pre_start = pre_start.token;

        if start.range() == span {
            let location = Location::new(pre_root, pre_start.range());
            return Ok(Remapped::from_match(location, start_exact));
        }
        if span.is_empty() {
            let location = Location::new(pre_root, TextRange::empty(pre_start.range().start()));
            return Ok(Remapped::from_match(location, start_exact));
        }
        if start.full_range().contains_range(span) {
            if pre_start.full_range().len() != start.full_range().len() {
                return Ok(Remapped::Unmappable);
            }
            let delta = span.start() - start.offset();
            let range = TextRange::at(pre_start.offset() + delta, span.len());
            return Ok(Remapped::from_match(Location::new(pre_root, range), start_exact));
        }

        let Some(end) = root.find_token(span.end() - TextSize::new(1), false) else {
            return Ok(Remapped::Unmappable);
        };
        if TextRange::new(start.range().start(), end.range().end()) != span {
            return Ok(Remapped::Unmappable);
        }
        let Some(pre_end) = self.get_pre_transformation_token(&end)? else {
            return Ok(Remapped::Unmappable);
        };

        let (start_offset, end_offset) = (pre_start.range().start(), pre_end.token.range().end());
        if pre_root != pre_end.token.parent().root() || start_offset > end_offset {
            return Ok(Remapped::Unmappable);
        }
        let range = TextRange::new(start_offset, end_offset);
        Ok(Remapped::from_match(Location::new(pre_root, range), start_exact && pre_end.exact))
    }
}
