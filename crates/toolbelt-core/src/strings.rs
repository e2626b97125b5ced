//! String list helpers.

/// Sort `items` and remove duplicates.
///
/// Cheap when there are no duplicates: one sort and a linear pass.
pub fn remove_duplicate_strings(mut items: Vec<String>) -> Vec<String> {
    if items.len() < 2 {
        return items;
    }
    items.sort_unstable();
    items.dedup();
    items
}

/// Drop the first element of `items`, shifting the rest down.
pub fn remove_first<T>(mut items: Vec<T>) -> Vec<T> {
    if !items.is_empty() {
        items.remove(0);
    }
    items
}
