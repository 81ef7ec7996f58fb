use std::{cmp::Ordering, collections::VecDeque, fmt::Display};

use crate::{
    foundation::{
        core::{Bracket, Cursor, IndexSpan},
        error::{SearchVizError, SearchVizResult},
    },
    search::{
        model::{Comparison, SessionSpec, Step, StepKind, Trace, Variant},
        precondition::{check_preconditions, check_unimodal},
    },
};

/// Trace a whole-array search.
///
/// Fails with [`SearchVizError::EmptyArray`] for an empty array and with
/// [`SearchVizError::PreconditionViolation`] when the array does not have the ordering
/// `variant` relies on. Both checks run before the first step is produced. A target that
/// is not present is a normal outcome: the trace ends with a `NotFound` step.
pub fn generate<T>(array: &[T], target: Option<T>, variant: Variant) -> SearchVizResult<Trace<T>>
where
    T: Ord + Clone + Display,
{
    let bracket = Bracket::full(array.len())?;
    generate_within(array, target, variant, bracket)
}

/// Trace a search that starts from a caller-chosen bracket instead of `[0, n - 1]`.
///
/// For peak finding the bracket must contain the peak; a bracket that cannot converge on
/// it is rejected as a precondition violation.
#[tracing::instrument(skip(array, target), fields(len = array.len()))]
pub fn generate_within<T>(
    array: &[T],
    target: Option<T>,
    variant: Variant,
    bracket: Bracket,
) -> SearchVizResult<Trace<T>>
where
    T: Ord + Clone + Display,
{
    if array.is_empty() {
        return Err(SearchVizError::EmptyArray);
    }
    check_preconditions(array, variant)?;
    bracket.validate(array.len())?;
    if variant == Variant::BinaryPeak {
        let peak = check_unimodal(array)?;
        if !bracket.contains(peak) {
            return Err(SearchVizError::precondition(format!(
                "peak index {peak} lies outside the starting bracket [{}, {}]",
                bracket.low, bracket.high
            )));
        }
    }

    let steps = steps_within(array, target.clone(), variant, bracket)?
        .collect::<SearchVizResult<Vec<_>>>()?;
    tracing::debug!(steps = steps.len(), "generated search trace");

    Ok(Trace {
        variant,
        array: array.to_vec(),
        target: if variant == Variant::BinaryPeak {
            None
        } else {
            target
        },
        bracket,
        steps,
    })
}

/// Trace the session described by a configuration file.
pub fn generate_session<T>(spec: &SessionSpec<T>) -> SearchVizResult<Trace<T>>
where
    T: Ord + Clone + Display,
{
    spec.validate()?;
    generate_within(
        &spec.array,
        spec.target.clone(),
        spec.variant,
        spec.bracket_or_full()?,
    )
}

/// Lazy, unchecked form of [`generate`].
///
/// No ordering pre-check runs here. An empty array yields a single `NotFound` step
/// instead of an error.
pub fn steps<T>(array: &[T], target: Option<T>, variant: Variant) -> SearchVizResult<Steps<'_, T>>
where
    T: Ord + Clone + Display,
{
    let cursor = Cursor::new(0, array.len() as i64 - 1);
    Steps::start(array, target, variant, cursor)
}

/// Lazy, unchecked form of [`generate_within`].
pub fn steps_within<T>(
    array: &[T],
    target: Option<T>,
    variant: Variant,
    bracket: Bracket,
) -> SearchVizResult<Steps<'_, T>>
where
    T: Ord + Clone + Display,
{
    bracket.validate(array.len())?;
    let cursor = Cursor::new(bracket.low as i64, bracket.high as i64);
    Steps::start(array, target, variant, cursor)
}

/// Iterator over the steps of one search session.
///
/// Each call to [`Iterator::next`] advances the state machine by at most one algorithm
/// iteration; the one to three steps an iteration emits are buffered. After an error or
/// a terminal step the iterator is exhausted.
#[derive(Clone, Debug)]
pub struct Steps<'a, T> {
    array: &'a [T],
    target: Option<T>,
    variant: Variant,
    cursor: Cursor,
    pending: VecDeque<Step<T>>,
    emitted: usize,
    done: bool,
}

impl<'a, T> Steps<'a, T>
where
    T: Ord + Clone + Display,
{
    fn start(
        array: &'a [T],
        target: Option<T>,
        variant: Variant,
        cursor: Cursor,
    ) -> SearchVizResult<Self> {
        if variant != Variant::BinaryPeak && target.is_none() {
            return Err(SearchVizError::validation(format!(
                "{variant} search requires a target"
            )));
        }
        Ok(Self {
            array,
            target,
            variant,
            cursor,
            pending: VecDeque::new(),
            emitted: 0,
            done: false,
        })
    }

    /// Pointers as of the last emitted step.
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    fn value_at(&self, index: i64) -> SearchVizResult<&'a T> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.array.get(i))
            .ok_or(SearchVizError::IndexOutOfRange {
                index,
                len: self.array.len(),
            })
    }

    fn target(&self) -> SearchVizResult<&T> {
        self.target
            .as_ref()
            .ok_or_else(|| SearchVizError::validation("search target is missing"))
    }

    fn push(&mut self, draft: StepDraft<T>) {
        let terminal = draft.kind.is_terminal();
        self.pending.push_back(Step {
            step_index: self.emitted + self.pending.len(),
            kind: draft.kind,
            cursor: draft.cursor,
            index_under_test: draft.index.map(|i| i as usize),
            probed_value: draft.value,
            comparison: draft.comparison,
            excluded: draft.excluded,
            reasoning: draft.reasoning,
            terminal,
        });
        if terminal {
            self.done = true;
        }
    }

    fn iterate(&mut self) -> SearchVizResult<()> {
        if !self.cursor.is_open() {
            let reasoning = match (self.variant, self.target.as_ref()) {
                (Variant::Linear, Some(t)) => format!("target {t} is not in the list"),
                (_, Some(t)) => format!(
                    "low {} > high {}: target {t} is not in the list",
                    self.cursor.low, self.cursor.high
                ),
                (_, None) => "the search range is empty".to_string(),
            };
            self.push(StepDraft::new(StepKind::NotFound, self.cursor, reasoning));
            return Ok(());
        }

        match self.variant {
            Variant::Linear => self.iterate_linear(),
            Variant::Binary => self.iterate_binary(),
            Variant::BinaryPeak => self.iterate_peak(),
        }
    }

    fn iterate_linear(&mut self) -> SearchVizResult<()> {
        let i = self.cursor.low;
        let value = self.value_at(i)?;
        let cmp = compare(value, self.target()?);
        let target = self.target()?.to_string();

        self.push(
            StepDraft::new(
                StepKind::Probe,
                self.cursor,
                format!("check list[{i}] = {value} {} {target}", cmp.symbol()),
            )
            .probe(i, value.clone(), cmp),
        );

        if cmp == Comparison::Equal {
            self.push(
                StepDraft::new(
                    StepKind::Found,
                    self.cursor,
                    format!("target {target} found at index {i}"),
                )
                .probe(i, value.clone(), cmp),
            );
        } else {
            self.cursor = Cursor::new(i + 1, self.cursor.high);
        }
        Ok(())
    }

    fn iterate_binary(&mut self) -> SearchVizResult<()> {
        let Cursor { low, high, .. } = self.cursor;
        let mid = self.cursor.midpoint();
        let value = self.value_at(mid)?;
        let cmp = compare(value, self.target()?);
        let target = self.target()?.to_string();
        let probing = self.cursor.with_mid(mid);

        self.push(
            StepDraft::new(
                StepKind::Probe,
                probing,
                format!(
                    "mid = (low + high) // 2 = ({low} + {high}) // 2 = {mid}; list[{mid}] = {value} {} {target}",
                    cmp.symbol()
                ),
            )
            .probe(mid, value.clone(), cmp),
        );

        let (next, excluded, reasoning) = match cmp {
            Comparison::Equal => {
                self.push(
                    StepDraft::new(
                        StepKind::Found,
                        probing,
                        format!("target {target} found at index {mid}"),
                    )
                    .probe(mid, value.clone(), cmp),
                );
                return Ok(());
            }
            Comparison::Less => (
                Cursor::new(mid + 1, high),
                span(low, mid)?,
                format!(
                    "list[{mid}] = {value} < {target}, update low = mid + 1 = {}",
                    mid + 1
                ),
            ),
            _ => (
                Cursor::new(low, mid - 1),
                span(mid, high)?,
                format!(
                    "list[{mid}] = {value} > {target}, update high = mid - 1 = {}",
                    mid - 1
                ),
            ),
        };

        self.cursor = next;
        self.push(StepDraft::new(StepKind::Advance, next, reasoning).narrowing(cmp, excluded));
        Ok(())
    }

    fn iterate_peak(&mut self) -> SearchVizResult<()> {
        let Cursor { low, high, .. } = self.cursor;
        if low == high {
            let value = self.value_at(low)?;
            self.push(
                StepDraft::new(
                    StepKind::Found,
                    self.cursor.with_mid(low),
                    format!("low == high == {low}: peak list[{low}] = {value}"),
                )
                .probe(low, value.clone(), Comparison::PeakHere),
            );
            return Ok(());
        }

        let mid = self.cursor.midpoint();
        let value = self.value_at(mid)?;
        let right = self.value_at(mid + 1)?;
        // Equal neighbours are ruled out by the unimodal pre-check; the unchecked
        // iterator treats them as a falling edge so the bracket still shrinks.
        let cmp = if value < right {
            Comparison::RisingEdge
        } else {
            Comparison::FallingEdge
        };

        self.push(
            StepDraft::new(
                StepKind::Probe,
                self.cursor.with_mid(mid),
                format!(
                    "mid = (low + high) // 2 = ({low} + {high}) // 2 = {mid}; list[{mid}] = {value} {} list[{}] = {right}",
                    cmp.symbol(),
                    mid + 1
                ),
            )
            .probe(mid, value.clone(), cmp),
        );

        let (next, excluded, reasoning) = if cmp == Comparison::RisingEdge {
            (
                Cursor::new(mid + 1, high),
                span(low, mid)?,
                format!(
                    "rising edge at {mid}, the peak is right of mid: update low = mid + 1 = {}",
                    mid + 1
                ),
            )
        } else {
            (
                Cursor::new(low, mid),
                span(mid + 1, high)?,
                format!("falling edge at {mid}, the peak is at or left of mid: update high = mid = {mid}"),
            )
        };

        self.cursor = next;
        self.push(StepDraft::new(StepKind::Advance, next, reasoning).narrowing(cmp, excluded));
        Ok(())
    }
}

impl<T> Iterator for Steps<'_, T>
where
    T: Ord + Clone + Display,
{
    type Item = SearchVizResult<Step<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pending.is_empty() && !self.done {
            if let Err(e) = self.iterate() {
                self.done = true;
                return Some(Err(e));
            }
        }
        let step = self.pending.pop_front()?;
        self.emitted += 1;
        Some(Ok(step))
    }
}

struct StepDraft<T> {
    kind: StepKind,
    cursor: Cursor,
    index: Option<i64>,
    value: Option<T>,
    comparison: Option<Comparison>,
    excluded: Option<IndexSpan>,
    reasoning: String,
}

impl<T> StepDraft<T> {
    fn new(kind: StepKind, cursor: Cursor, reasoning: String) -> Self {
        Self {
            kind,
            cursor,
            index: None,
            value: None,
            comparison: None,
            excluded: None,
            reasoning,
        }
    }

    fn probe(mut self, index: i64, value: T, comparison: Comparison) -> Self {
        self.index = Some(index);
        self.value = Some(value);
        self.comparison = Some(comparison);
        self
    }

    fn narrowing(mut self, comparison: Comparison, excluded: IndexSpan) -> Self {
        self.comparison = Some(comparison);
        self.excluded = Some(excluded);
        self
    }
}

fn compare<T: Ord>(value: &T, target: &T) -> Comparison {
    match value.cmp(target) {
        Ordering::Equal => Comparison::Equal,
        Ordering::Less => Comparison::Less,
        Ordering::Greater => Comparison::Greater,
    }
}

fn span(start: i64, end: i64) -> SearchVizResult<IndexSpan> {
    let start = usize::try_from(start).map_err(|_| SearchVizError::IndexOutOfRange {
        index: start,
        len: 0,
    })?;
    let end = usize::try_from(end).map_err(|_| SearchVizError::IndexOutOfRange {
        index: end,
        len: 0,
    })?;
    IndexSpan::new(start, end)
}

#[cfg(test)]
#[path = "../../tests/unit/search/generator.rs"]
mod tests;
