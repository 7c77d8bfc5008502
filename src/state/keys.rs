/// What a key press in the compose or edit box means.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum KeyAction {
    Submit,
    /// Let the textarea insert a line break.
    Newline,
    Cancel,
    /// Not ours; leave the event alone.
    Ignore,
}

impl KeyAction {
    /// `key` is `KeyboardEvent.key`.
    pub fn classify(key: &str, shift: bool) -> Self {
        match key {
            "Enter" if shift => Self::Newline,
            "Enter" => Self::Submit,
            "Escape" => Self::Cancel,
            _ => Self::Ignore,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_submits_shift_enter_breaks_line() {
        assert_eq!(KeyAction::classify("Enter", false), KeyAction::Submit);
        assert_eq!(KeyAction::classify("Enter", true), KeyAction::Newline);
    }

    #[test]
    fn test_other_keys() {
        assert_eq!(KeyAction::classify("Escape", false), KeyAction::Cancel);
        assert_eq!(KeyAction::classify("a", false), KeyAction::Ignore);
        assert_eq!(KeyAction::classify("A", true), KeyAction::Ignore);
    }
}
