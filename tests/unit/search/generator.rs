use super::*;

fn kinds<T>(trace: &Trace<T>) -> Vec<StepKind> {
    trace.steps.iter().map(|s| s.kind).collect()
}

#[test]
fn step_indices_are_dense_and_only_the_last_step_is_terminal() {
    let arr = [1, 3, 5, 7, 9, 11];
    let trace = generate(&arr, Some(2), Variant::Binary).unwrap();
    for (i, s) in trace.steps.iter().enumerate() {
        assert_eq!(s.step_index, i);
        assert_eq!(s.terminal, i + 1 == trace.steps.len());
    }
}

#[test]
fn binary_probe_then_advance_pairs() {
    let trace = generate(&[10, 20, 30], Some(30), Variant::Binary).unwrap();
    assert_eq!(
        kinds(&trace),
        vec![
            StepKind::Probe,
            StepKind::Advance,
            StepKind::Probe,
            StepKind::Found
        ]
    );
    let advance = &trace.steps[1];
    assert_eq!(advance.cursor, Cursor::new(2, 2));
    assert_eq!(advance.excluded, Some(IndexSpan { start: 0, end: 1 }));
    assert_eq!(advance.comparison, Some(Comparison::Less));
    assert_eq!(trace.found_index(), Some(2));
}

#[test]
fn binary_narrowing_below_zero_ends_with_negative_high() {
    let trace = generate(&[5], Some(1), Variant::Binary).unwrap();
    let last = trace.steps.last().unwrap();
    assert_eq!(last.kind, StepKind::NotFound);
    assert_eq!(last.cursor, Cursor::new(0, -1));
    assert_eq!(trace.probe_count(), 1);
}

#[test]
fn empty_array_fails_fast_in_generate() {
    let empty: [i32; 0] = [];
    assert!(matches!(
        generate(&empty, Some(1), Variant::Binary),
        Err(SearchVizError::EmptyArray)
    ));
}

#[test]
fn empty_array_yields_only_not_found_from_lazy_steps() {
    let empty: [i32; 0] = [];
    for variant in [Variant::Linear, Variant::Binary, Variant::BinaryPeak] {
        let target = (variant != Variant::BinaryPeak).then_some(1);
        let all = steps(&empty, target, variant)
            .unwrap()
            .collect::<SearchVizResult<Vec<_>>>()
            .unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].kind, StepKind::NotFound);
        assert!(all[0].terminal);
    }
}

#[test]
fn unsorted_input_is_rejected_before_any_step() {
    let err = generate(&[3, 1, 2], Some(2), Variant::Binary).unwrap_err();
    assert!(matches!(err, SearchVizError::PreconditionViolation(_)));
    let err = generate(&[1, 5, 2, 6], None, Variant::BinaryPeak).unwrap_err();
    assert!(matches!(err, SearchVizError::PreconditionViolation(_)));
}

#[test]
fn missing_target_is_a_validation_error() {
    assert!(matches!(
        generate(&[1, 2, 3], None, Variant::Linear),
        Err(SearchVizError::Validation(_))
    ));
}

#[test]
fn peak_ignores_the_target() {
    let trace = generate(&[1, 4, 9], Some(100), Variant::BinaryPeak).unwrap();
    assert!(trace.target.is_none());
    assert_eq!(trace.found_index(), Some(2));
    let found = trace.outcome().unwrap();
    assert_eq!(found.comparison, Some(Comparison::PeakHere));
    assert_eq!(found.probed_value, Some(9));
}

#[test]
fn peak_falling_edge_keeps_mid_in_bracket() {
    let trace = generate(&[9, 6, 4, 2, 1], None, Variant::BinaryPeak).unwrap();
    let first_advance = trace
        .steps
        .iter()
        .find(|s| s.kind == StepKind::Advance)
        .unwrap();
    assert_eq!(first_advance.comparison, Some(Comparison::FallingEdge));
    assert_eq!(first_advance.cursor, Cursor::new(0, 2));
    assert_eq!(first_advance.excluded, Some(IndexSpan { start: 3, end: 4 }));
    assert_eq!(trace.found_index(), Some(0));
}

#[test]
fn peak_corner_cases_converge() {
    let cases: [(&[i32], usize, Bracket); 5] = [
        (&[3, 4, 9, 6, 4], 2, Bracket { low: 1, high: 3 }),
        (&[3, 9, 6, 4, 2], 1, Bracket { low: 1, high: 3 }),
        (&[3, 4, 9, 6, 4], 2, Bracket { low: 0, high: 2 }),
        (&[9, 6, 4, 2, 1], 0, Bracket { low: 0, high: 2 }),
        (&[1, 4, 9], 2, Bracket { low: 0, high: 2 }),
    ];
    for (arr, peak, bracket) in cases {
        let trace = generate_within(arr, None, Variant::BinaryPeak, bracket).unwrap();
        assert_eq!(trace.found_index(), Some(peak), "{arr:?} from {bracket:?}");
        for s in &trace.steps {
            assert!(s.cursor.brackets(peak), "{arr:?}: step {s:?}");
        }
    }
}

#[test]
fn peak_bracket_must_contain_the_peak() {
    let err = generate_within(&[1, 4, 9, 6, 4], None, Variant::BinaryPeak, Bracket { low: 3, high: 4 })
        .unwrap_err();
    assert!(matches!(err, SearchVizError::PreconditionViolation(_)), "{err}");

    let spec = SessionSpec {
        variant: Variant::BinaryPeak,
        array: vec![1, 4, 9, 6, 4],
        target: None,
        bracket: Some(Bracket { low: 0, high: 1 }),
    };
    assert!(matches!(
        generate_session(&spec),
        Err(SearchVizError::PreconditionViolation(_))
    ));

    let trace =
        generate_within(&[1, 4, 9, 6, 4], None, Variant::BinaryPeak, Bracket { low: 2, high: 4 })
            .unwrap();
    assert_eq!(trace.found_index(), Some(2));
}

#[test]
fn linear_scans_only_the_bracket() {
    let trace = generate_within(&[7, 7, 1, 2], Some(7), Variant::Linear, Bracket { low: 1, high: 3 })
        .unwrap();
    assert_eq!(trace.probe_count(), 1);
    assert_eq!(trace.found_index(), Some(1));
}

#[test]
fn linear_never_advances() {
    let trace = generate(&[4, 8, 15, 16, 23, 42], Some(23), Variant::Linear).unwrap();
    assert!(trace.steps.iter().all(|s| s.kind != StepKind::Advance));
    let probed: Vec<_> = trace.probes().filter_map(|s| s.index_under_test).collect();
    assert_eq!(probed, vec![0, 1, 2, 3, 4]);
}

#[test]
fn lazy_and_eager_agree() {
    let arr = [2, 5, 8, 13, 17, 22, 26, 31];
    let eager = generate(&arr, Some(26), Variant::Binary).unwrap();
    let lazy = steps(&arr, Some(26), Variant::Binary)
        .unwrap()
        .collect::<SearchVizResult<Vec<_>>>()
        .unwrap();
    assert_eq!(eager.steps, lazy);
}

#[test]
fn lazy_iterator_stops_after_terminal() {
    let mut it = steps(&[1, 2, 3], Some(2), Variant::Binary).unwrap();
    let mut n = 0;
    while let Some(step) = it.next() {
        step.unwrap();
        n += 1;
    }
    assert_eq!(n, 2);
    assert!(it.next().is_none());
}

#[test]
fn session_spec_round_trip_through_generator() {
    let spec: SessionSpec<i64> = serde_json::from_str(
        r#"{"variant":"binary-peak","array":[3,4,9,6,4],"bracket":{"low":1,"high":3}}"#,
    )
    .unwrap();
    let trace = generate_session(&spec).unwrap();
    assert_eq!(trace.bracket, Bracket { low: 1, high: 3 });
    assert_eq!(trace.found_index(), Some(2));
}

#[test]
fn reasoning_uses_floor_division_narration() {
    let trace = generate(&[2, 5, 8, 13], Some(5), Variant::Binary).unwrap();
    assert_eq!(
        trace.steps[0].reasoning,
        "mid = (low + high) // 2 = (0 + 3) // 2 = 1; list[1] = 5 == 5"
    );
    assert_eq!(trace.steps[1].reasoning, "target 5 found at index 1");
}
