use std::sync::LazyLock;

use regex::Regex;

static RE_TICKET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Z]+-\d+").unwrap());
static RE_LEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\]\s*|\s*)").unwrap());
static RE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[TOGGL_ID:([0-9]+)\]").unwrap());

/// Ticket reference and remaining text extracted from a time entry description.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedDescription {
    pub ticket: Option<String>,
    pub comment: Option<String>,
}

/// Split a free-text description into a ticket key and a comment.
///
/// The first `ABC-123` style key anywhere in the text wins, whatever surrounds
/// it (`[ABC-1]`, `https://host/browse/ABC-1`, ...). Everything after the key,
/// minus a closing bracket and leading whitespace, becomes the comment. Later
/// keys are left in the comment untouched.
///
/// Without a key both parts are `None`.
pub fn parse_description(text: &str) -> ParsedDescription {
    let Some(found) = RE_TICKET.find(text) else {
        return ParsedDescription::default();
    };

    let rest = RE_LEADING.replace(&text[found.end()..], "");
    let comment = if rest.is_empty() {
        None
    } else {
        Some(rest.into_owned())
    };

    ParsedDescription {
        ticket: Some(found.as_str().to_string()),
        comment,
    }
}

/// The identity marker appended to every worklog comment we create.
///
/// Existing worklogs in Jira carry exactly this spelling, so it must never change.
pub fn format_marker(toggl_id: u64) -> String {
    format!("[TOGGL_ID:{toggl_id}]")
}

/// Recover the Toggl ID from a worklog comment written by a previous run.
///
/// The marker is always appended last, so the last occurrence wins. A comment
/// written elsewhere that carries several markers only counts as synced for
/// the last one.
pub fn extract_toggl_id(comment: &str) -> Option<u64> {
    let caps = RE_MARKER.captures_iter(comment).last()?;
    let digits = caps.get(1)?.as_str();
    match digits.parse::<u64>() {
        Ok(id) => Some(id),
        Err(e) => {
            log::debug!("Ignoring unparsable marker id '{digits}': {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(ticket: Option<&str>, comment: Option<&str>) -> ParsedDescription {
        ParsedDescription {
            ticket: ticket.map(String::from),
            comment: comment.map(String::from),
        }
    }

    #[test]
    fn test_bracketed_ticket_with_comment() {
        assert_eq!(
            parse_description("[ABC-54321] my comment"),
            parsed(Some("ABC-54321"), Some("my comment"))
        );
        assert_eq!(
            parse_description("[XYZ-12345] my comment 2"),
            parsed(Some("XYZ-12345"), Some("my comment 2"))
        );
    }

    #[test]
    fn test_bracketed_ticket_only() {
        assert_eq!(parse_description("[ABC-54321]"), parsed(Some("ABC-54321"), None));
    }

    #[test]
    fn test_no_ticket() {
        assert_eq!(parse_description("my comment"), parsed(None, None));
    }

    #[test]
    fn test_ticket_in_url() {
        assert_eq!(
            parse_description("https://host/browse/XYZ-12345"),
            parsed(Some("XYZ-12345"), None)
        );
        assert_eq!(
            parse_description("https://host/browse/XYZ-12345 comment"),
            parsed(Some("XYZ-12345"), Some("comment"))
        );
    }

    #[test]
    fn test_bare_ticket() {
        assert_eq!(parse_description("ABC-54321"), parsed(Some("ABC-54321"), None));
        assert_eq!(
            parse_description("GGG-12345 my comment 2"),
            parsed(Some("GGG-12345"), Some("my comment 2"))
        );
    }

    #[test]
    fn test_only_first_ticket_is_consumed() {
        assert_eq!(
            parse_description("ABC-54321 ABC-5555 [XYZ-12345]"),
            parsed(Some("ABC-54321"), Some("ABC-5555 [XYZ-12345]"))
        );
    }

    #[test]
    fn test_empty() {
        assert_eq!(parse_description(""), parsed(None, None));
    }

    #[test]
    fn test_underscore_is_not_a_hyphen() {
        assert_eq!(parse_description("XYZ_12345 comment"), parsed(None, None));
    }

    #[test]
    fn test_leading_words_before_ticket() {
        assert_eq!(
            parse_description("review of ABC-7: second pass"),
            parsed(Some("ABC-7"), Some(": second pass"))
        );
    }

    #[test]
    fn test_lowercase_key_does_not_match() {
        assert_eq!(parse_description("abc-123 something"), parsed(None, None));
    }

    #[test]
    fn test_extract_marker() {
        assert_eq!(extract_toggl_id("did work [TOGGL_ID:1]"), Some(1));
        assert_eq!(extract_toggl_id("[TOGGL_ID:1702917845]"), Some(1702917845));
    }

    #[test]
    fn test_extract_marker_absent_or_malformed() {
        assert_eq!(extract_toggl_id("did work"), None);
        assert_eq!(extract_toggl_id(""), None);
        assert_eq!(extract_toggl_id("[TOGGL_ID:]"), None);
        assert_eq!(extract_toggl_id("[TOGGL_ID: 12]"), None);
        assert_eq!(extract_toggl_id("[toggl_id:12]"), None);
        assert_eq!(extract_toggl_id("[ABC-12] [OTHER:5]"), None);
        assert_eq!(extract_toggl_id("[TOGGL_ID:99999999999999999999999]"), None);
    }

    #[test]
    fn test_extract_marker_prefers_last() {
        assert_eq!(extract_toggl_id("see [TOGGL_ID:5] again [TOGGL_ID:6]"), Some(6));
    }

    #[test]
    fn test_marker_round_trip() {
        for id in [0u64, 7, 1702917845, u64::MAX] {
            assert_eq!(extract_toggl_id(&format_marker(id)), Some(id));
        }
    }
}
