use lineage_syntax::{AnnotationId, SyntaxKind, TextRange};
use thiserror::Error;

/// Broken invariants of the tracking protocol.
///
/// "No provenance" is not an error; lookups report it as `Ok(None)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackingError {
    #[error("{kind:?}@{range:?} already carries a tracking annotation")]
    AlreadyTracked { kind: SyntaxKind, range: TextRange },

    #[error("annotation {0} has no recorded provenance in this store")]
    MissingProvenance(AnnotationId),

    #[error("annotation {id} records a {found} where a {expected} was expected")]
    ProvenanceMismatch { id: AnnotationId, expected: &'static str, found: &'static str },

    #[error("annotation {0} is not a tracking annotation")]
    NotTrackingAnnotation(AnnotationId),
}

pub type Result<T, E = TrackingError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use expect_test::expect;

    use super::*;

    #[test]
    fn messages() {
        let span = TextRange::new(10.into(), 16.into());

        expect!["CALL_EXPR@10..16 already carries a tracking annotation"].assert_eq(
            &TrackingError::AlreadyTracked { kind: SyntaxKind::CALL_EXPR, range: span }
                .to_string(),
        );
    }
}
