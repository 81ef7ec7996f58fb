use super::*;
use crate::search::{generator::generate, model::Variant};

#[derive(Default)]
struct Recorder {
    began: bool,
    seen: Vec<usize>,
    finished: bool,
}

impl StepSink<i32> for Recorder {
    fn begin(&mut self, _trace: &Trace<i32>) -> SearchVizResult<()> {
        self.began = true;
        Ok(())
    }

    fn step(&mut self, step: &Step<i32>, marks: &MarkFrame) -> SearchVizResult<()> {
        assert_eq!(step.step_index, marks.step_index);
        self.seen.push(step.step_index);
        Ok(())
    }

    fn finish(&mut self) -> SearchVizResult<()> {
        self.finished = true;
        Ok(())
    }
}

#[test]
fn drive_visits_every_step_in_order() {
    let trace = generate(&[1, 3, 5, 7, 9], Some(4), Variant::Binary).unwrap();
    let mut rec = Recorder::default();
    drive(&trace, &mut rec).unwrap();
    assert!(rec.began && rec.finished);
    assert_eq!(rec.seen, (0..trace.steps.len()).collect::<Vec<_>>());
}

#[test]
fn drive_rejects_reordered_steps() {
    let mut trace = generate(&[1, 3, 5, 7, 9], Some(4), Variant::Binary).unwrap();
    trace.steps.swap(0, 1);
    let mut rec = Recorder::default();
    assert!(drive(&trace, &mut rec).is_err());
    assert!(!rec.finished);
}

#[test]
fn json_lines_sink_writes_one_line_per_step() {
    let trace = generate(&[2, 5, 8, 13, 17], Some(99), Variant::Linear).unwrap();
    let mut sink = JsonLinesSink::new(Vec::new());
    drive(&trace, &mut sink).unwrap();
    assert_eq!(sink.lines_written(), 6);

    let text = String::from_utf8(sink.into_inner()).unwrap();
    let last: serde_json::Value = serde_json::from_str(text.lines().last().unwrap()).unwrap();
    assert_eq!(last["step"]["kind"], "not_found");
    assert_eq!(last["step"]["terminal"], true);
    assert_eq!(last["marks"].as_array().unwrap().len(), 5);
    assert_eq!(last["marks"][4], "scanned");
}
