use std::sync::atomic::{AtomicUsize, Ordering};

const PREFIX: &str = "tasks"; // Must NOT contain "/" or "-"

/// Unique DOM id for an element kind, e.g. `popover_tasks_3`.
pub fn use_random_id_for(element: &str) -> String {
    format!("{element}_{PREFIX}_{}", next_id())
}

static COUNTER: AtomicUsize = AtomicUsize::new(1);

fn next_id() -> usize {
    COUNTER.fetch_add(1, Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_distinct_and_prefixed() {
        let a = use_random_id_for("popover");
        let b = use_random_id_for("popover");
        assert_ne!(a, b);
        assert!(a.starts_with("popover_tasks_"));
    }
}
