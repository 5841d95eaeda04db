//! Sequential top-down merge sort.

/// Merge two sorted runs into `out`.
///
/// Ties take the element from `left` first, so the merge is stable.
/// `out` must be exactly `left.len() + right.len()` long.
pub fn merge<T: Ord + Copy>(left: &[T], right: &[T], out: &mut [T]) {
    debug_assert_eq!(out.len(), left.len() + right.len());

    let (mut i, mut j) = (0, 0);
    for slot in out.iter_mut() {
        if j >= right.len() || (i < left.len() && left[i] <= right[j]) {
            *slot = left[i];
            i += 1;
        } else {
            *slot = right[j];
            j += 1;
        }
    }
}

/// Sort `data` in place, using `scratch` as the merge buffer.
///
/// Both slices must have the same length.
pub fn merge_sort<T: Ord + Copy>(data: &mut [T], scratch: &mut [T]) {
    debug_assert_eq!(data.len(), scratch.len());
    if data.len() <= 1 {
        return;
    }

    let mid = data.len() / 2;
    {
        let (left, right) = data.split_at_mut(mid);
        let (left_scratch, right_scratch) = scratch.split_at_mut(mid);
        merge_sort(left, left_scratch);
        merge_sort(right, right_scratch);
    }
    merge_halves(data, scratch, mid);
}

/// Merge the sorted halves `data[..mid]` and `data[mid..]` back into `data`.
pub(crate) fn merge_halves<T: Ord + Copy>(data: &mut [T], scratch: &mut [T], mid: usize) {
    // Already in order: the halves concatenate to a sorted run.
    if data[mid - 1] <= data[mid] {
        return;
    }

    let (left, right) = data.split_at(mid);
    merge(left, right, scratch);
    data.copy_from_slice(scratch);
}

/// Sort an owned vector on the calling thread.
pub fn sort_sequential<T: Ord + Copy>(mut values: Vec<T>) -> Vec<T> {
    let mut scratch = values.clone();
    merge_sort(&mut values, &mut scratch);
    values
}
