use crate::{
    foundation::error::{SearchVizError, SearchVizResult},
    search::model::Variant,
};

/// Check the ordering `variant` relies on.
///
/// This is a separate O(n) pass run once before generation; it never contributes steps
/// to a trace. Linear search has no ordering requirement.
pub fn check_preconditions<T: Ord>(array: &[T], variant: Variant) -> SearchVizResult<()> {
    if array.is_empty() {
        return Err(SearchVizError::EmptyArray);
    }
    match variant {
        Variant::Linear => Ok(()),
        Variant::Binary => check_sorted(array),
        Variant::BinaryPeak => check_unimodal(array).map(|_| ()),
    }
}

/// Binary search needs a non-decreasing array.
pub fn check_sorted<T: Ord>(array: &[T]) -> SearchVizResult<()> {
    match array.windows(2).position(|w| w[0] > w[1]) {
        None => Ok(()),
        Some(i) => Err(SearchVizError::precondition(format!(
            "binary search needs a non-decreasing array, but index {} is greater than index {}",
            i,
            i + 1
        ))),
    }
}

/// Peak finding needs a strictly increasing run followed by a strictly decreasing run
/// (either may be empty). Returns the peak index.
pub fn check_unimodal<T: Ord>(array: &[T]) -> SearchVizResult<usize> {
    if array.is_empty() {
        return Err(SearchVizError::EmptyArray);
    }

    let mut i = 0;
    while i + 1 < array.len() && array[i] < array[i + 1] {
        i += 1;
    }
    let peak = i;
    while i + 1 < array.len() && array[i] > array[i + 1] {
        i += 1;
    }

    if i + 1 < array.len() {
        let what = if array[i] == array[i + 1] {
            "equal neighbours"
        } else {
            "a second rise"
        };
        return Err(SearchVizError::precondition(format!(
            "peak finding needs a unimodal array, but indices {} and {} form {what}",
            i,
            i + 1
        )));
    }
    Ok(peak)
}

#[cfg(test)]
#[path = "../../tests/unit/search/precondition.rs"]
mod tests;
