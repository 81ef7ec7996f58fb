use std::io::Write;

use crate::{
    foundation::error::{SearchVizError, SearchVizResult},
    marks::tracker::{IndexMark, MarkFrame, MarkTracker},
    search::model::{Step, Trace},
};

/// Consumer of a replayed trace.
///
/// [`drive`] calls [`StepSink::step`] exactly once per step, in trace order, after the
/// marks for that step have been applied, then calls [`StepSink::finish`] once.
pub trait StepSink<T> {
    fn begin(&mut self, _trace: &Trace<T>) -> SearchVizResult<()> {
        Ok(())
    }

    fn step(&mut self, step: &Step<T>, marks: &MarkFrame) -> SearchVizResult<()>;

    fn finish(&mut self) -> SearchVizResult<()> {
        Ok(())
    }
}

/// Replay `trace` into `sink`.
pub fn drive<T, S>(trace: &Trace<T>, sink: &mut S) -> SearchVizResult<()>
where
    S: StepSink<T> + ?Sized,
{
    let mut tracker = MarkTracker::new(trace.array.len());
    sink.begin(trace)?;
    for (expected, step) in trace.steps.iter().enumerate() {
        if step.step_index != expected {
            return Err(SearchVizError::validation(format!(
                "trace step {expected} is labelled {}; steps must be replayed in order",
                step.step_index
            )));
        }
        let transitions = tracker.apply(step)?;
        let frame = MarkFrame {
            step_index: step.step_index,
            marks: tracker.marks().to_vec(),
            transitions,
        };
        sink.step(step, &frame)?;
    }
    sink.finish()
}

#[derive(serde::Serialize)]
struct StepRecord<'a, T> {
    step: &'a Step<T>,
    marks: &'a [IndexMark],
}

/// Writes one JSON object per step: `{"step": {...}, "marks": [...]}`.
pub struct JsonLinesSink<W: Write> {
    out: W,
    lines: usize,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, lines: 0 }
    }

    pub fn lines_written(&self) -> usize {
        self.lines
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<T, W> StepSink<T> for JsonLinesSink<W>
where
    T: serde::Serialize,
    W: Write,
{
    fn step(&mut self, step: &Step<T>, marks: &MarkFrame) -> SearchVizResult<()> {
        let record = StepRecord {
            step,
            marks: &marks.marks,
        };
        serde_json::to_writer(&mut self.out, &record)?;
        self.out
            .write_all(b"\n")
            .map_err(|e| SearchVizError::Other(anyhow::Error::new(e)))?;
        self.lines += 1;
        Ok(())
    }

    fn finish(&mut self) -> SearchVizResult<()> {
        self.out
            .flush()
            .map_err(|e| SearchVizError::Other(anyhow::Error::new(e)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/sink.rs"]
mod tests;
