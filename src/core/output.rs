//! Compact rendering helpers for terminal summaries.

/// Collapse whitespace and bound length for one-line display.
pub fn compact_line(input: &str, max_chars: usize) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    let preview: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", preview)
    } else {
        preview
    }
}

/// Comma-separated preview of at most `max_items` names.
pub fn preview_list<S: AsRef<str>>(items: &[S], max_items: usize) -> String {
    let shown = items
        .iter()
        .take(max_items)
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(", ");
    if items.len() > max_items {
        format!("{} (+{} more)", shown, items.len() - max_items)
    } else {
        shown
    }
}
