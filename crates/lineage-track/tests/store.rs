mod common;

use std::thread;

use common::*;
use lineage_syntax::SyntaxKind::*;
use lineage_syntax::TextSize;
use lineage_track::{AnnotationStore, Location, Remapped, Tracker, TrackerConfig};

#[test]
fn entries_live_as_long_as_the_rewritten_tree() {
    let store = AnnotationStore::new();
    let tracker = Tracker::new(store.clone(), TrackerConfig::default());
    let original = original();

    let rewritten = {
        let call = first_of_kind(&original, CALL_EXPR);
        module("0123456789", tracker.annotate(call.green(), &call, true).unwrap())
    };
    assert_eq!(store.len(), 1);

    let args = first_of_kind(&rewritten, ARG_LIST);
    let tracked = tracker.track_if_needed(&args).unwrap();
    assert_eq!(store.len(), 2);

    drop(tracked);
    assert_eq!(store.len(), 1);

    drop(args);
    drop(rewritten);
    assert!(store.is_empty());
}

#[test]
fn chained_rewrites_release_every_entry() {
    let store = AnnotationStore::new();
    let tracker = Tracker::new(store.clone(), TrackerConfig::default());

    let mut current = original();
    for _ in 0..4 {
        let previous = first_of_kind(&current, CALL_EXPR);
        let annotated = tracker.annotate(&call("foo", 3), &previous, true).unwrap();
        current = module("0123456789", annotated);
    }
    assert_eq!(store.len(), 4);

    drop(current);
    assert!(store.is_empty());
}

#[test]
fn concurrent_rewrites_and_lookups() {
    let tracker = Tracker::default();
    let original = original();
    let args = first_of_kind(&original, ARG_LIST);
    let shared = {
        let call = first_of_kind(&original, CALL_EXPR);
        module("012345678901234", tracker.annotate(call.green(), &call, true).unwrap())
    };

    thread::scope(|scope| {
        for worker in 0..4u32 {
            let tracker = &tracker;
            let original = &original;
            let shared = &shared;
            let args = &args;
            scope.spawn(move || {
                for round in 0..50u32 {
                    let prefix = "p".repeat((worker * 50 + round + 1) as usize);
                    let call = first_of_kind(original, CALL_EXPR);
                    let annotated = tracker.annotate(call.green(), &call, true).unwrap();
                    let rewritten = module(&prefix, annotated);

                    let new_args = first_of_kind(&rewritten, ARG_LIST);
                    assert_eq!(
                        tracker.get_pre_transformation_syntax(&new_args).unwrap().as_ref(),
                        Some(args)
                    );

                    let shared_args = first_of_kind(shared, ARG_LIST);
                    assert_eq!(
                        tracker.get_pre_transformation_syntax(&shared_args).unwrap().as_ref(),
                        Some(args)
                    );

                    let x = shared.find_token(TextSize::new(19), false).unwrap();
                    let location = Location::new(shared.clone(), x.range());
                    let remapped = tracker.get_pre_transformation_location(&location).unwrap();
                    assert_eq!(
                        remapped,
                        Remapped::Mapped(Location::new(original.clone(), range(14, 15)))
                    );
                }
            });
        }
    });

    drop(shared);
    assert!(tracker.store().is_empty());
}

#[test]
fn handles_cross_threads() {
    let tracker = Tracker::default();
    let original = original();
    let call = first_of_kind(&original, CALL_EXPR);
    let rewritten = module("0123456789", tracker.annotate(call.green(), &call, true).unwrap());

    let pre = thread::spawn({
        let tracker = tracker.clone();
        let call = first_of_kind(&rewritten, CALL_EXPR);
        move || tracker.get_pre_transformation_syntax(&call).unwrap()
    })
    .join()
    .unwrap();

    assert_eq!(pre, Some(call));
}
