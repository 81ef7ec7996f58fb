use crate::{
    foundation::error::{SearchVizError, SearchVizResult},
    search::model::{Comparison, Step, StepKind, Trace},
};

/// Visual state of one array index.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum IndexMark {
    /// Not yet looked at.
    #[default]
    Untouched,
    /// Currently pointed at by the search.
    UnderTest,
    /// Probed and did not match.
    Scanned,
    /// Dropped from the bracket without being probed individually.
    Skipped,
    /// The answer.
    Found,
    /// Left unexamined because the answer was found elsewhere.
    Excluded,
}

impl IndexMark {
    /// Settled marks never change again within a session.
    pub fn is_settled(self) -> bool {
        !matches!(self, IndexMark::Untouched | IndexMark::UnderTest)
    }
}

/// One mark change made while applying a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MarkTransition {
    pub index: usize,
    pub from: IndexMark,
    pub to: IndexMark,
}

/// Mark state after one step, with the changes that step made.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MarkFrame {
    pub step_index: usize,
    pub marks: Vec<IndexMark>,
    pub transitions: Vec<MarkTransition>,
}

/// Derives per-index marks from a step sequence.
///
/// The tracker owns nothing but the mark array: feeding it the same steps after a
/// [`reset`](MarkTracker::reset) always produces the same marks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarkTracker {
    marks: Vec<IndexMark>,
}

impl MarkTracker {
    pub fn new(len: usize) -> Self {
        Self {
            marks: vec![IndexMark::Untouched; len],
        }
    }

    /// Start a new session over `len` indices.
    pub fn reset(&mut self, len: usize) {
        self.marks.clear();
        self.marks.resize(len, IndexMark::Untouched);
    }

    pub fn marks(&self) -> &[IndexMark] {
        &self.marks
    }

    pub fn mark(&self, index: usize) -> Option<IndexMark> {
        self.marks.get(index).copied()
    }

    /// Apply the next step of the session and return the transitions it caused.
    ///
    /// Must be called once per step, in trace order.
    pub fn apply<T>(&mut self, step: &Step<T>) -> SearchVizResult<Vec<MarkTransition>> {
        let mut out = Vec::new();
        match step.kind {
            StepKind::Probe => {
                let index = self.checked_index(step.index_under_test)?;
                let comparison = step.comparison.ok_or_else(|| {
                    SearchVizError::mark_invariant(format!(
                        "probe step {} carries no comparison",
                        step.step_index
                    ))
                })?;
                if comparison.is_edge() {
                    self.apply_peak_probe(step, index, comparison, &mut out)?;
                } else {
                    self.set(index, IndexMark::UnderTest, &mut out)?;
                    if comparison == Comparison::Equal {
                        self.settle_found(index, &mut out)?;
                    } else {
                        self.set(index, IndexMark::Scanned, &mut out)?;
                    }
                }
            }
            StepKind::Advance => {
                let span = step.excluded.ok_or_else(|| {
                    SearchVizError::mark_invariant(format!(
                        "advance step {} carries no excluded span",
                        step.step_index
                    ))
                })?;
                if span.end >= self.marks.len() {
                    return Err(SearchVizError::IndexOutOfRange {
                        index: span.end as i64,
                        len: self.marks.len(),
                    });
                }
                for i in span.indices() {
                    if !self.marks[i].is_settled() {
                        self.set(i, IndexMark::Skipped, &mut out)?;
                    }
                }
            }
            StepKind::Found => {
                let index = self.checked_index(step.index_under_test)?;
                self.settle_found(index, &mut out)?;
            }
            StepKind::NotFound => self.release_under_test(|_| false, &mut out)?,
        }
        Ok(out)
    }

    fn apply_peak_probe<T>(
        &mut self,
        step: &Step<T>,
        mid: usize,
        comparison: Comparison,
        out: &mut Vec<MarkTransition>,
    ) -> SearchVizResult<()> {
        let cursor = step.cursor;
        let in_set = |i: usize| i == mid || i as i64 == cursor.low || i as i64 == cursor.high;
        self.release_under_test(in_set, out)?;

        for c in [cursor.low, mid as i64, cursor.high] {
            let i = self.checked_index(usize::try_from(c).ok())?;
            if self.marks[i] == IndexMark::Untouched {
                self.set(i, IndexMark::UnderTest, out)?;
            }
        }
        if comparison == Comparison::RisingEdge {
            self.set(mid, IndexMark::Scanned, out)?;
        }
        Ok(())
    }

    fn settle_found(&mut self, index: usize, out: &mut Vec<MarkTransition>) -> SearchVizResult<()> {
        self.set(index, IndexMark::Found, out)?;
        for i in 0..self.marks.len() {
            if i != index && !self.marks[i].is_settled() {
                self.set(i, IndexMark::Excluded, out)?;
            }
        }
        Ok(())
    }

    /// Return indices that are no longer pointed at to `Untouched`.
    fn release_under_test(
        &mut self,
        keep: impl Fn(usize) -> bool,
        out: &mut Vec<MarkTransition>,
    ) -> SearchVizResult<()> {
        for i in 0..self.marks.len() {
            if self.marks[i] == IndexMark::UnderTest && !keep(i) {
                self.set(i, IndexMark::Untouched, out)?;
            }
        }
        Ok(())
    }

    fn checked_index(&self, index: Option<usize>) -> SearchVizResult<usize> {
        match index {
            Some(i) if i < self.marks.len() => Ok(i),
            Some(i) => Err(SearchVizError::IndexOutOfRange {
                index: i as i64,
                len: self.marks.len(),
            }),
            None => Err(SearchVizError::mark_invariant(
                "step does not name an index",
            )),
        }
    }

    fn set(
        &mut self,
        index: usize,
        to: IndexMark,
        out: &mut Vec<MarkTransition>,
    ) -> SearchVizResult<()> {
        let from = self.marks[index];
        if from == to {
            return Ok(());
        }
        if from.is_settled() {
            return Err(SearchVizError::mark_invariant(format!(
                "index {index} is {from:?} and cannot become {to:?}"
            )));
        }
        self.marks[index] = to;
        out.push(MarkTransition { index, from, to });
        Ok(())
    }
}

/// Replay a whole trace, producing the mark state after each step.
pub fn replay<T>(trace: &Trace<T>) -> SearchVizResult<Vec<MarkFrame>> {
    let mut tracker = MarkTracker::new(trace.array.len());
    trace
        .steps
        .iter()
        .map(|step| {
            let transitions = tracker.apply(step)?;
            Ok(MarkFrame {
                step_index: step.step_index,
                marks: tracker.marks().to_vec(),
                transitions,
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/marks/tracker.rs"]
mod tests;
