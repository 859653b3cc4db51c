/// Literal opening marker of the plan block.
pub const PLAN_START: &str = "[PLAN_START]";

/// Literal closing marker of the plan block.
pub const PLAN_END: &str = "[PLAN_END]";

/// Opening prefix of a code block tag. The artifact path follows, up to
/// the first [`TAG_CLOSE`].
pub const CODE_START: &str = "[CODE_START:";

/// Literal closing marker of a code block.
pub const CODE_END: &str = "[CODE_END]";

/// Opening prefix of the terminal success marker. The completion message
/// follows, up to the first [`TAG_CLOSE`].
pub const SUCCESS: &str = "[SUCCESS:";

/// Terminator of the `[CODE_START:` and `[SUCCESS:` tags.
pub const TAG_CLOSE: &str = "]";

/// Every marker literal, openers and closers alike.
///
/// Anything outside a unit (whitespace, stray prose, a lone `[CODE_END]`)
/// is inert padding.
///
/// ```text
/// ┌────────────────┬───────────────────────────────┐
/// │ Opener         │ Closed by                     │
/// ├────────────────┼───────────────────────────────┤
/// │ [PLAN_START]   │ [PLAN_END]                    │
/// │ [CODE_START:   │ ] (path), then [CODE_END]     │
/// │ [SUCCESS:      │ ] (message)                   │
/// └────────────────┴───────────────────────────────┘
/// ```
pub const ALL_LITERALS: [&str; 5] = [PLAN_START, PLAN_END, CODE_START, CODE_END, SUCCESS];

/// The first marker literal found in `text`, if any.
///
/// Field text that contains a marker can be read as protocol structure
/// by a decoder that sees it before the unit around it has closed.
#[must_use]
pub fn find_marker(text: &str) -> Option<&'static str> {
    ALL_LITERALS.into_iter().find(|literal| text.contains(literal))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_are_ascii() {
        for literal in [PLAN_START, PLAN_END, CODE_START, CODE_END, SUCCESS, TAG_CLOSE] {
            assert!(literal.is_ascii(), "{literal} must be ASCII");
        }
    }

    #[test]
    fn find_marker_reports_the_literal() {
        assert_eq!(find_marker("see [SUCCESS:x"), Some(SUCCESS));
        assert_eq!(find_marker("a[CODE_END]"), Some(CODE_END));
        assert_eq!(find_marker("[PLAN_STAR] [note]"), None);
    }

    #[test]
    fn literals_start_with_a_single_bracket() {
        for literal in ALL_LITERALS {
            assert!(literal.starts_with('['));
            assert_eq!(literal.matches('[').count(), 1);
        }
    }
}
