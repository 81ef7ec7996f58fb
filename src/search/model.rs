use std::fmt;

use crate::foundation::{
    core::{Bracket, Cursor, IndexSpan},
    error::{SearchVizError, SearchVizResult},
};

/// Which search algorithm a session traces.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, Default,
)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    /// Scan every index in ascending order.
    Linear,
    /// Classic binary search over a non-decreasing array.
    #[default]
    Binary,
    /// Binary search for the peak of a unimodal array.
    BinaryPeak,
}

impl Variant {
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Linear => "linear",
            Variant::Binary => "binary",
            Variant::BinaryPeak => "binary-peak",
        }
    }

    /// Whether the variant narrows a `[low, high]` bracket.
    pub fn is_bisecting(self) -> bool {
        !matches!(self, Variant::Linear)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Variant {
    type Err = SearchVizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(Variant::Linear),
            "binary" => Ok(Variant::Binary),
            "binary-peak" | "peak" => Ok(Variant::BinaryPeak),
            other => Err(SearchVizError::validation(format!(
                "unknown search variant '{other}' (expected linear, binary or binary-peak)"
            ))),
        }
    }
}

/// Outcome of the comparison made by a probe.
///
/// For linear and binary search the probed value is compared against the target
/// (`Less` means `array[i] < target`). Peak finding compares `array[mid]` with its right
/// neighbour instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Equal,
    Less,
    Greater,
    /// `array[mid] < array[mid + 1]`: the peak lies to the right of `mid`.
    RisingEdge,
    /// `array[mid] > array[mid + 1]`: `mid` or something left of it is the peak.
    FallingEdge,
    /// The bracket collapsed onto a single index, which is the peak.
    PeakHere,
}

impl Comparison {
    /// The operator the narration shows between the probed value and what it was
    /// compared with.
    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Equal | Comparison::PeakHere => "==",
            Comparison::Less | Comparison::RisingEdge => "<",
            Comparison::Greater | Comparison::FallingEdge => ">",
        }
    }

    /// Peak-finding outcomes.
    pub fn is_edge(self) -> bool {
        matches!(
            self,
            Comparison::RisingEdge | Comparison::FallingEdge | Comparison::PeakHere
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// A value was read and compared.
    Probe,
    /// The bracket narrowed.
    Advance,
    /// Terminal: the answer index is known.
    Found,
    /// Terminal: the bracket emptied without a match.
    NotFound,
}

impl StepKind {
    pub fn is_terminal(self) -> bool {
        matches!(self, StepKind::Found | StepKind::NotFound)
    }
}

/// One immutable record of algorithm progress.
///
/// Replaying a trace's steps in order, and only in order, reproduces the search exactly.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Step<T> {
    /// Position of this step in its trace, starting at 0.
    pub step_index: usize,
    pub kind: StepKind,
    /// Pointers after this step took effect.
    pub cursor: Cursor,
    /// Index that was read by a probe, or the answer index of a `Found` step.
    pub index_under_test: Option<usize>,
    /// `array[index_under_test]`.
    pub probed_value: Option<T>,
    pub comparison: Option<Comparison>,
    /// Indices that left the bracket in this step (`Advance` only).
    pub excluded: Option<IndexSpan>,
    /// Narration for the step, e.g. `list[9] = 39 < 53, update low = mid + 1 = 10`.
    pub reasoning: String,
    pub terminal: bool,
}

/// The complete, ordered step sequence of one session.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Trace<T> {
    pub variant: Variant,
    pub array: Vec<T>,
    pub target: Option<T>,
    pub bracket: Bracket,
    pub steps: Vec<Step<T>>,
}

impl<T> Trace<T> {
    pub fn len(&self) -> usize {
        self.array.len()
    }

    pub fn is_empty(&self) -> bool {
        self.array.is_empty()
    }

    /// The terminal step; every trace built by the generator ends with one.
    pub fn outcome(&self) -> Option<&Step<T>> {
        self.steps.last().filter(|s| s.terminal)
    }

    /// Answer index when the search succeeded.
    pub fn found_index(&self) -> Option<usize> {
        self.outcome()
            .filter(|s| s.kind == StepKind::Found)
            .and_then(|s| s.index_under_test)
    }

    pub fn probes(&self) -> impl Iterator<Item = &Step<T>> {
        self.steps.iter().filter(|s| s.kind == StepKind::Probe)
    }

    pub fn probe_count(&self) -> usize {
        self.probes().count()
    }
}

/// Session description as read from JSON configuration.
///
/// ```json
/// { "variant": "binary", "array": [2, 5, 8, 13], "target": 8 }
/// ```
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SessionSpec<T> {
    #[serde(default)]
    pub variant: Variant,
    pub array: Vec<T>,
    /// Required for linear and binary search; ignored by peak finding.
    #[serde(default)]
    pub target: Option<T>,
    /// Optional starting bracket; defaults to the whole array.
    #[serde(default)]
    pub bracket: Option<Bracket>,
}

impl<T> SessionSpec<T> {
    /// Structural checks that do not look at the element order.
    pub fn validate(&self) -> SearchVizResult<()> {
        if self.array.is_empty() {
            return Err(SearchVizError::EmptyArray);
        }
        if self.variant != Variant::BinaryPeak && self.target.is_none() {
            return Err(SearchVizError::validation(format!(
                "{} search requires a target",
                self.variant
            )));
        }
        if let Some(b) = self.bracket {
            b.validate(self.array.len())?;
        }
        Ok(())
    }

    pub fn bracket_or_full(&self) -> SearchVizResult<Bracket> {
        match self.bracket {
            Some(b) => Ok(b),
            None => Bracket::full(self.array.len()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/search/model.rs"]
mod tests;
