//! Cursor arithmetic shared by books and the bookshelf
//!
//! A cursor is `Option<usize>`: `None` means nothing is selected. Each
//! function returns where the cursor must point after a structural edit so
//! that it keeps naming the same element.

/// Cursor after the element at `removed` is taken out, leaving `new_len`
/// elements.
///
/// Removing the selected element reselects the first remaining element.
pub(crate) fn after_remove(
    selected: Option<usize>,
    removed: usize,
    new_len: usize,
) -> Option<usize> {
    if new_len == 0 {
        return None;
    }

    match selected {
        Some(s) if removed < s => Some(s - 1),
        Some(s) if removed == s => Some(0),
        other => other,
    }
}

/// Cursor after the element at `from` is removed and reinserted at `to`.
pub(crate) fn after_move(selected: Option<usize>, from: usize, to: usize) -> Option<usize> {
    let s = selected?;

    let moved = if s == from {
        to
    } else if from < s && s <= to {
        s - 1
    } else if to <= s && s < from {
        s + 1
    } else {
        s
    };

    Some(moved)
}

/// Cursor after the elements at `a` and `b` exchange places.
pub(crate) fn after_swap(selected: Option<usize>, a: usize, b: usize) -> Option<usize> {
    selected.map(|s| match s {
        s if s == a => b,
        s if s == b => a,
        s => s,
    })
}
