/// The list's single edit popover.
///
/// At most one task is edited at a time; opening another row moves the
/// session there in one step.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum EditSession {
    #[default]
    Closed,
    Open {
        /// Row position in the sorted list.
        index: usize,
        task_id: String,
        draft: String,
    },
}

/// What `open` did to the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EditTransition {
    Opened,
    /// Another row was open; the session moved without closing in between.
    Replaced,
    /// Same row was already open; the draft is kept.
    Unchanged,
}

impl EditSession {
    pub fn open(&mut self, index: usize, task_id: &str, text: &str) -> EditTransition {
        let transition = match &*self {
            Self::Open { task_id: open_id, .. } if open_id.as_str() == task_id => {
                return EditTransition::Unchanged;
            }
            Self::Open { .. } => EditTransition::Replaced,
            Self::Closed => EditTransition::Opened,
        };

        *self = Self::Open {
            index,
            task_id: task_id.to_string(),
            draft: text.to_string(),
        };
        transition
    }

    /// Replace the draft. Ignored while closed.
    pub fn edit(&mut self, text: &str) {
        if let Self::Open { draft, .. } = self {
            *draft = text.to_string();
        }
    }

    pub fn close(&mut self) {
        *self = Self::Closed;
    }

    #[cfg(test)]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }

    #[cfg(test)]
    pub fn is_open_at(&self, row: usize) -> bool {
        matches!(self, Self::Open { index, .. } if *index == row)
    }

    pub fn task_id(&self) -> Option<&str> {
        match self {
            Self::Open { task_id, .. } => Some(task_id),
            Self::Closed => None,
        }
    }

    pub fn draft(&self) -> Option<&str> {
        match self {
            Self::Open { draft, .. } => Some(draft),
            Self::Closed => None,
        }
    }

    /// Follow the edited task to its row in a freshly sorted list, or close if
    /// it is gone.
    pub fn reindex(&mut self, position_of: impl Fn(&str) -> Option<usize>) {
        let row = match &*self {
            Self::Open { task_id, .. } => position_of(task_id),
            Self::Closed => return,
        };
        match (row, self) {
            (Some(row), Self::Open { index, .. }) => *index = row,
            (_, session) => session.close(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_closed() {
        let s = EditSession::default();
        assert!(!s.is_open());
        assert!(s.draft().is_none());
    }

    #[test]
    fn test_open_edit_close() {
        let mut s = EditSession::default();
        assert_eq!(s.open(2, "-c", "original"), EditTransition::Opened);
        assert!(s.is_open_at(2));
        assert_eq!(s.draft(), Some("original"));

        s.edit("changed");
        assert_eq!(s.draft(), Some("changed"));
        assert_eq!(s.task_id(), Some("-c"));

        s.close();
        assert_eq!(s, EditSession::Closed);
        assert!(s.draft().is_none());
    }

    #[test]
    fn test_open_other_row_replaces_directly() {
        let mut s = EditSession::default();
        s.open(0, "-a", "a");
        s.edit("half typed");

        assert_eq!(s.open(1, "-b", "b"), EditTransition::Replaced);
        assert!(s.is_open_at(1));
        assert!(!s.is_open_at(0));
        assert_eq!(s.draft(), Some("b"));
    }

    #[test]
    fn test_reopen_same_row_keeps_draft() {
        let mut s = EditSession::default();
        s.open(0, "-a", "a");
        s.edit("typed");
        assert_eq!(s.open(0, "-a", "a"), EditTransition::Unchanged);
        assert_eq!(s.draft(), Some("typed"));
    }

    #[test]
    fn test_edit_while_closed_is_ignored() {
        let mut s = EditSession::default();
        s.edit("nothing");
        assert_eq!(s, EditSession::Closed);
    }

    #[test]
    fn test_reindex_follows_or_closes() {
        let mut s = EditSession::default();
        s.open(0, "-a", "a");

        s.reindex(|id| (id == "-a").then_some(3));
        assert!(s.is_open_at(3));
        assert_eq!(s.draft(), Some("a"));

        s.reindex(|_| None);
        assert!(!s.is_open());
    }
}
