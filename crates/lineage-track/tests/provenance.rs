mod common;

use common::*;
use lineage_syntax::SyntaxKind::*;
use lineage_syntax::{Builder, SyntaxNode, TextSize};
use lineage_track::{AnnotationStore, TokenMatch, Tracker, TrackerConfig, TrackingError};

/// Replaces the call of `original` with `replacement`, annotated with the
/// original call.
fn rewrite_call(
    tracker: &Tracker,
    original: &SyntaxNode,
    prefix: &str,
    replacement: lineage_syntax::GreenNode,
    include_descendants: bool,
) -> SyntaxNode {
    let call = first_of_kind(original, CALL_EXPR);
    let annotated = tracker.annotate(&replacement, &call, include_descendants).unwrap();
    module(prefix, annotated)
}

#[test]
fn replacement_maps_to_the_node_it_replaced() {
    let tracker = Tracker::default();
    let original = original();
    let rewritten = rewrite_call(&tracker, &original, "0123456789", call("foo", 6), true);

    let call = first_of_kind(&rewritten, CALL_EXPR);
    assert_eq!(call.full_range(), range(10, 23));

    let pre = tracker.get_pre_transformation_syntax(&call).unwrap().unwrap();
    assert_eq!(pre, first_of_kind(&original, CALL_EXPR));
    assert_eq!(pre.full_range(), range(10, 20));
}

#[test]
fn descendants_translate_into_the_original() {
    let tracker = Tracker::default();
    let original = original();
    let args = first_of_kind(&original, ARG_LIST);
    assert_eq!(args.full_range(), range(13, 16));

    let rewritten = rewrite_call(&tracker, &original, "0123456789", call("foo", 6), true);
    let new_args = first_of_kind(&rewritten, ARG_LIST);
    assert_eq!(new_args.full_range(), range(13, 16));
    assert_eq!(tracker.get_pre_transformation_syntax(&new_args), Ok(Some(args.clone())));

    let shifted = rewrite_call(&tracker, &original, "012345678901234", call("foo", 6), true);
    let shifted_call = first_of_kind(&shifted, CALL_EXPR);
    let shifted_args = first_of_kind(&shifted, ARG_LIST);
    assert_eq!(shifted_call.full_range(), range(15, 28));
    assert_eq!(shifted_args.full_range(), range(18, 21));
    assert_eq!(tracker.get_pre_transformation_syntax(&shifted_args), Ok(Some(args)));
}

#[test]
fn descendant_tokens_translate_too() {
    let tracker = Tracker::default();
    let original = original();
    let rewritten = rewrite_call(&tracker, &original, "012345678901234", call("foo", 6), true);

    let paren = rewritten.find_token(TextSize::new(18), false).unwrap();
    assert_eq!(paren.kind(), LEFT_PAREN);

    let pre = tracker.get_pre_transformation_token(&paren).unwrap().unwrap();
    assert!(pre.exact);
    assert_eq!(pre.token.full_range(), range(13, 14));
    assert_eq!(pre.token.parent().root(), original);
}

#[test]
fn excluded_descendants_have_no_provenance() {
    let tracker = Tracker::default();
    let original = original();
    let rewritten = rewrite_call(&tracker, &original, "0123456789", call("foo", 6), false);

    let new_call = first_of_kind(&rewritten, CALL_EXPR);
    let new_args = first_of_kind(&rewritten, ARG_LIST);
    let x = rewritten.find_token(TextSize::new(14), false).unwrap();

    assert_eq!(tracker.get_pre_transformation_syntax(&new_args), Ok(None));
    assert_eq!(tracker.get_pre_transformation_token(&x), Ok(None));
    assert_eq!(tracker.needs_tracking(&new_args), Ok(None));
    assert_eq!(
        tracker.get_pre_transformation_syntax(&new_call),
        Ok(Some(first_of_kind(&original, CALL_EXPR)))
    );
}

#[test]
fn elements_outside_annotated_subtrees_are_untracked() {
    let tracker = Tracker::default();
    let original = original();
    let rewritten = rewrite_call(&tracker, &original, "0123456789", call("foo", 6), true);

    let prefix = rewritten.find_token(TextSize::new(0), false).unwrap();
    assert_eq!(tracker.get_pre_transformation_token(&prefix), Ok(None));
    assert_eq!(tracker.get_pre_transformation_syntax(&rewritten), Ok(None));
    assert_eq!(tracker.needs_tracking(&rewritten), Ok(None));
}

#[test]
fn untouched_trees_map_to_themselves() {
    let tracker = Tracker::default();
    let original = original();
    let args = first_of_kind(&original, ARG_LIST);
    let x = original.find_token(TextSize::new(14), false).unwrap();

    assert_eq!(tracker.get_pre_transformation_syntax(&args), Ok(Some(args.clone())));
    assert_eq!(
        tracker.get_pre_transformation_token(&x),
        Ok(Some(TokenMatch { token: x.clone(), exact: true }))
    );
}

#[test]
fn track_if_needed_is_idempotent() {
    let tracker = Tracker::default();
    let original = original();
    let rewritten = rewrite_call(&tracker, &original, "0123456789", call("foo", 6), true);
    let new_args = first_of_kind(&rewritten, ARG_LIST);

    let tracked = tracker.track_if_needed(&new_args).unwrap();
    assert!(!tracked.ptr_eq(new_args.green()));

    let moved = SyntaxNode::new_root(tracked.clone());
    assert!(tracker.is_tracked(&moved));
    assert_eq!(tracker.needs_tracking(&moved), Ok(None));
    assert!(tracker.track_if_needed(&moved).unwrap().ptr_eq(&tracked));
}

#[test]
fn moved_nodes_keep_their_provenance() {
    let tracker = Tracker::default();
    let original = original();
    let args = first_of_kind(&original, ARG_LIST);
    let rewritten = rewrite_call(&tracker, &original, "0123456789", call("foo", 6), true);

    // Second pass: hoist the arguments out of the call, in front of it.
    let new_args = first_of_kind(&rewritten, ARG_LIST);
    let tracked = tracker.track_if_needed(&new_args).unwrap();
    let new_call = first_of_kind(&rewritten, CALL_EXPR);
    let hoisted = SyntaxNode::new_root(node(
        MODULE,
        [tracked.into(), tracker.track_if_needed(&new_call).unwrap().into()],
    ));

    let moved_args = first_of_kind(&hoisted, ARG_LIST);
    assert_eq!(moved_args.full_range(), range(0, 3));
    assert_eq!(tracker.get_pre_transformation_syntax(&moved_args), Ok(Some(args)));

    let moved_x = hoisted.find_token(TextSize::new(1), false).unwrap();
    let pre_x = tracker.get_pre_transformation_token(&moved_x).unwrap().unwrap();
    assert_eq!(pre_x.token.full_range(), range(14, 15));
}

#[test]
fn sibling_edits_shift_tracked_subtrees() {
    let tracker = Tracker::default();
    let original = original();
    let rewritten = rewrite_call(&tracker, &original, "0123456789", call("foo", 6), true);

    // Swap the ten character prefix for a three character one.
    let edited = rewritten.green().insert_child(0, token(NAME, "abc")).remove_child(1);
    let edited = SyntaxNode::new_root(edited);

    let new_call = first_of_kind(&edited, CALL_EXPR);
    assert_eq!(new_call.full_range(), range(3, 16));
    assert_eq!(
        tracker.get_pre_transformation_syntax(&new_call),
        Ok(Some(first_of_kind(&original, CALL_EXPR)))
    );

    let x = edited.find_token(TextSize::new(7), false).unwrap();
    assert_eq!(x.text(), "x");
    let pre_x = tracker.get_pre_transformation_token(&x).unwrap().unwrap();
    assert!(pre_x.exact);
    assert_eq!(pre_x.token.full_range(), range(14, 15));
}

#[test]
fn tokens_are_tracked_like_nodes() {
    let tracker = Tracker::default();
    let original = original();
    let rewritten = rewrite_call(&tracker, &original, "0123456789", call("foo", 6), true);

    let foo = rewritten.find_token(TextSize::new(10), false).unwrap();
    let pre_foo = tracker.needs_tracking(&foo).unwrap().unwrap();
    assert_eq!(pre_foo.text(), "foo");

    let tracked = tracker.track_if_needed(&foo).unwrap();
    let renamed = tracker.annotate_token(&tracked.with_text_trimmed("bar"), &pre_foo);
    assert!(matches!(renamed, Err(TrackingError::AlreadyTracked { kind: NAME, .. })));
}

#[test]
fn renamed_tokens_match_approximately() {
    let original = original();
    let store = AnnotationStore::new();
    let approximate = Tracker::new(store.clone(), TrackerConfig::default());
    let exact = Tracker::new(store, TrackerConfig::exact());

    let rewritten = rewrite_call(&approximate, &original, "0123456789", call("fooBar", 3), true);
    let renamed = rewritten.find_token(TextSize::new(10), false).unwrap();
    assert_eq!(renamed.text(), "fooBar");

    let pre = approximate.get_pre_transformation_token(&renamed).unwrap().unwrap();
    assert!(!pre.exact);
    assert_eq!(pre.token.text(), "foo");
    assert_eq!(pre.token.full_range(), range(10, 13));

    // Without the kind scan the renamed token has no counterpart.
    assert_eq!(exact.get_pre_transformation_token(&renamed), Ok(None));
    assert!(exact.track_if_needed(&renamed).unwrap().ptr_eq(renamed.green()));

    let paren = rewritten.find_token(TextSize::new(16), false).unwrap();
    let pre = approximate.get_pre_transformation_token(&paren).unwrap().unwrap();
    assert_eq!(pre.token.kind(), LEFT_PAREN);
    assert!(!pre.exact);
}

#[test]
fn shifted_descendants_without_counterpart_are_untracked() {
    let tracker = Tracker::default();
    let original = original();
    let rewritten = rewrite_call(&tracker, &original, "0123456789", call("fooBar", 3), true);

    // `(x)` moved by three, and nothing of its kind starts there in `foo(x);`.
    let new_args = first_of_kind(&rewritten, ARG_LIST);
    assert_eq!(new_args.full_range(), range(16, 19));

    assert_eq!(tracker.get_pre_transformation_syntax(&new_args), Ok(None));
    assert_eq!(tracker.needs_tracking(&new_args), Ok(None));
    let tracked = tracker.track_if_needed(&new_args).unwrap();
    assert!(tracked.ptr_eq(new_args.green()));

    // The call itself still resolves.
    let new_call = first_of_kind(&rewritten, CALL_EXPR);
    assert_eq!(
        tracker.get_pre_transformation_syntax(&new_call),
        Ok(Some(first_of_kind(&original, CALL_EXPR)))
    );
}

#[test]
fn zero_width_nodes_are_found() {
    // `x[]` where the size is omitted, and a zero-width error at the end.
    let array = || {
        let mut builder = Builder::new();
        builder.start_node(ARRAY_TYPE);
        builder.start_node(NAME_REF);
        builder.token(NAME, "x");
        builder.finish_node();
        builder.start_node(ARRAY_RANK);
        builder.token(LEFT_BRACKET, "[");
        builder.start_node(OMITTED_ARRAY_SIZE_EXPR);
        builder.missing(OMITTED_ARRAY_SIZE);
        builder.finish_node();
        builder.token(RIGHT_BRACKET, "]");
        builder.start_node(ERROR);
        builder.finish_node();
        builder.finish_node();
        builder.finish_node();
        builder.finish()
    };

    let tracker = Tracker::default();
    let original = SyntaxNode::new_root(node(MODULE, [token(NAME, "prefix"), array().into()]));
    let array_type = first_of_kind(&original, ARRAY_TYPE);
    let annotated = tracker.annotate(&array(), &array_type, true).unwrap();
    let rewritten = SyntaxNode::new_root(node(MODULE, [token(NAME, "p"), annotated.into()]));

    let omitted = first_of_kind(&rewritten, OMITTED_ARRAY_SIZE_EXPR);
    assert_eq!(omitted.full_range(), range(3, 3));
    let pre = tracker.get_pre_transformation_syntax(&omitted).unwrap().unwrap();
    assert_eq!(pre, first_of_kind(&original, OMITTED_ARRAY_SIZE_EXPR));
    assert_eq!(pre.full_range(), range(8, 8));

    let error = first_of_kind(&rewritten, ERROR);
    assert_eq!(error.full_range(), range(4, 4));
    let pre = tracker.get_pre_transformation_syntax(&error).unwrap().unwrap();
    assert_eq!(pre.kind(), ERROR);
    assert_eq!(pre.full_range(), range(9, 9));

    let missing = rewritten.find_token(TextSize::new(3), true).unwrap();
    assert_eq!(missing.kind(), OMITTED_ARRAY_SIZE);
    let pre = tracker.get_pre_transformation_token(&missing).unwrap().unwrap();
    assert!(pre.exact);
    assert_eq!(pre.token.kind(), OMITTED_ARRAY_SIZE);
    assert_eq!(pre.token.offset(), TextSize::new(8));
}
