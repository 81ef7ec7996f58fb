use super::*;
use crate::{
    foundation::core::{Bracket, Cursor},
    search::{
        generator::{generate, generate_within},
        model::Variant,
    },
};

use IndexMark::*;

#[test]
fn binary_found_marks_scanned_skipped_found_and_excluded() {
    // low=0 high=4 mid=2 (8 < 13) -> low=3; mid=3 (13 == 13).
    let trace = generate(&[2, 5, 8, 13, 17], Some(13), Variant::Binary).unwrap();
    let frames = replay(&trace).unwrap();

    assert_eq!(frames[0].marks, vec![Untouched, Untouched, Scanned, Untouched, Untouched]);
    assert_eq!(
        frames[0].transitions,
        vec![
            MarkTransition { index: 2, from: Untouched, to: UnderTest },
            MarkTransition { index: 2, from: UnderTest, to: Scanned },
        ]
    );
    assert_eq!(frames[1].marks, vec![Skipped, Skipped, Scanned, Untouched, Untouched]);
    assert_eq!(frames.last().unwrap().marks, vec![Skipped, Skipped, Scanned, Found, Excluded]);
}

#[test]
fn found_step_after_equal_probe_changes_nothing() {
    let trace = generate(&[1, 2, 3], Some(2), Variant::Binary).unwrap();
    let frames = replay(&trace).unwrap();
    assert_eq!(frames.len(), 2);
    assert!(frames[1].transitions.is_empty());
    assert_eq!(frames[1].marks, vec![Excluded, Found, Excluded]);
}

#[test]
fn linear_not_found_scans_everything_and_never_skips() {
    let trace = generate(&[2, 5, 8, 13, 17], Some(99), Variant::Linear).unwrap();
    let frames = replay(&trace).unwrap();
    assert_eq!(frames.last().unwrap().marks, vec![Scanned; 5]);
    assert!(
        frames
            .iter()
            .flat_map(|f| &f.marks)
            .all(|m| *m != Skipped)
    );
}

#[test]
fn linear_found_excludes_the_unvisited_tail() {
    let trace = generate(&[4, 9, 1, 7], Some(9), Variant::Linear).unwrap();
    let frames = replay(&trace).unwrap();
    assert_eq!(frames.last().unwrap().marks, vec![Scanned, Found, Excluded, Excluded]);
}

#[test]
fn peak_probe_holds_the_cursor_set_under_test() {
    let trace = generate_within(
        &[3, 4, 9, 6, 4],
        None,
        Variant::BinaryPeak,
        Bracket { low: 1, high: 3 },
    )
    .unwrap();
    let frames = replay(&trace).unwrap();

    // low=1 mid=2 high=3, falling edge: mid stays a candidate.
    assert_eq!(frames[0].marks, vec![Untouched, UnderTest, UnderTest, UnderTest, Untouched]);
    // high = mid: index 3 leaves the bracket.
    assert_eq!(frames[1].marks, vec![Untouched, UnderTest, UnderTest, Skipped, Untouched]);
    // low=1 mid=1 high=2, rising edge: index 1 is ruled out.
    assert_eq!(frames[2].marks, vec![Untouched, Scanned, UnderTest, Skipped, Untouched]);
    let last = frames.last().unwrap();
    assert_eq!(last.marks, vec![Excluded, Scanned, Found, Skipped, Excluded]);
}

#[test]
fn peak_release_returns_stale_pointers_to_untouched() {
    let mut tracker = MarkTracker::new(6);
    let probe = |low: i64, mid: i64, high: i64, cmp| Step::<i32> {
        step_index: 0,
        kind: StepKind::Probe,
        cursor: Cursor::new(low, high).with_mid(mid),
        index_under_test: Some(mid as usize),
        probed_value: None,
        comparison: Some(cmp),
        excluded: None,
        reasoning: String::new(),
        terminal: false,
    };
    tracker.apply(&probe(0, 2, 5, Comparison::FallingEdge)).unwrap();
    let changes = tracker.apply(&probe(0, 1, 2, Comparison::FallingEdge)).unwrap();
    assert!(changes.contains(&MarkTransition { index: 5, from: UnderTest, to: Untouched }));
    assert_eq!(tracker.mark(1), Some(UnderTest));
}

#[test]
fn settled_marks_cannot_be_rewritten() {
    let mut tracker = MarkTracker::new(3);
    let trace = generate(&[1, 2, 3], Some(1), Variant::Binary).unwrap();
    for s in &trace.steps {
        tracker.apply(s).unwrap();
    }
    // Replaying the same found step onto a finished session re-asserts the same marks.
    assert!(tracker.apply(trace.steps.last().unwrap()).unwrap().is_empty());

    let mut other = trace.steps[0].clone();
    other.index_under_test = Some(2);
    other.comparison = Some(Comparison::Less);
    let err = tracker.apply(&other).unwrap_err();
    assert!(matches!(err, SearchVizError::MarkInvariant(_)));
}

#[test]
fn out_of_range_probe_is_reported() {
    let mut tracker = MarkTracker::new(2);
    let mut step = generate(&[1, 2, 3], Some(1), Variant::Binary).unwrap().steps[0].clone();
    step.index_under_test = Some(7);
    assert!(matches!(
        tracker.apply(&step),
        Err(SearchVizError::IndexOutOfRange { index: 7, len: 2 })
    ));
}

#[test]
fn reset_clears_marks() {
    let trace = generate(&[1, 2, 3], Some(3), Variant::Linear).unwrap();
    let mut tracker = MarkTracker::new(3);
    for s in &trace.steps {
        tracker.apply(s).unwrap();
    }
    tracker.reset(4);
    assert_eq!(tracker.marks(), &[Untouched; 4]);
}
