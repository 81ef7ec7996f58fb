use crate::foundation::error::{SearchVizError, SearchVizResult};

/// Inclusive `[low, high]` index range a search session starts from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Bracket {
    /// First index inside the bracket.
    pub low: usize,
    /// Last index inside the bracket.
    pub high: usize,
}

impl Bracket {
    /// Build a bracket over an array of `len` elements.
    pub fn new(low: usize, high: usize, len: usize) -> SearchVizResult<Self> {
        let b = Self { low, high };
        b.validate(len)?;
        Ok(b)
    }

    /// The bracket spanning a whole non-empty array.
    pub fn full(len: usize) -> SearchVizResult<Self> {
        if len == 0 {
            return Err(SearchVizError::EmptyArray);
        }
        Ok(Self {
            low: 0,
            high: len - 1,
        })
    }

    /// Check `low <= high < len`.
    pub fn validate(self, len: usize) -> SearchVizResult<()> {
        if self.low > self.high {
            return Err(SearchVizError::validation(format!(
                "bracket low {} must be <= high {}",
                self.low, self.high
            )));
        }
        if self.high >= len {
            return Err(SearchVizError::validation(format!(
                "bracket high {} is outside an array of length {len}",
                self.high
            )));
        }
        Ok(())
    }

    pub fn contains(self, index: usize) -> bool {
        self.low <= index && index <= self.high
    }

    pub fn width(self) -> usize {
        self.high - self.low + 1
    }
}

/// Snapshot of the `{low, high, mid}` search pointers.
///
/// `high` is signed because a binary search that narrows below index 0 ends with
/// `high == -1`. `mid` is only present while a probe is in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Cursor {
    pub low: i64,
    pub high: i64,
    pub mid: Option<i64>,
}

impl Cursor {
    pub fn new(low: i64, high: i64) -> Self {
        Self {
            low,
            high,
            mid: None,
        }
    }

    pub fn with_mid(self, mid: i64) -> Self {
        Self {
            mid: Some(mid),
            ..self
        }
    }

    /// `low <= high`: there is still something to search.
    pub fn is_open(self) -> bool {
        self.low <= self.high
    }

    /// `floor((low + high) / 2)`; callers only ask while the cursor is open, so both
    /// bounds are non-negative and plain integer division floors.
    pub fn midpoint(self) -> i64 {
        (self.low + self.high).div_euclid(2)
    }

    /// Whether `index` lies inside `[low, high]`.
    pub fn brackets(self, index: usize) -> bool {
        let i = index as i64;
        self.low <= i && i <= self.high
    }
}

/// Inclusive run of indices removed from the bracket by one narrowing step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct IndexSpan {
    pub start: usize,
    pub end: usize, // inclusive
}

impl IndexSpan {
    pub fn new(start: usize, end: usize) -> SearchVizResult<Self> {
        if start > end {
            return Err(SearchVizError::validation(
                "IndexSpan start must be <= end",
            ));
        }
        Ok(Self { start, end })
    }

    pub fn len(self) -> usize {
        self.end - self.start + 1
    }

    pub fn contains(self, index: usize) -> bool {
        self.start <= index && index <= self.end
    }

    pub fn indices(self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.end
    }
}

/// Rational frame rate, as reported by ffprobe (`30000/1001`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> SearchVizResult<Self> {
        if den == 0 {
            return Err(SearchVizError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(SearchVizError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Elapsed seconds at the start of `frame`.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * f64::from(self.den) / f64::from(self.num)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
