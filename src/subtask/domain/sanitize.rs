//! Display-text sanitization for server-supplied failure copy.

/// Script the user-facing copy is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocalScript {
    /// Hebrew letters (U+0590–U+05FF and presentation forms).
    #[default]
    Hebrew,
    /// Latin letters (ASCII and Latin-1/Extended-A/B).
    Latin,
}

impl LocalScript {
    /// Returns `true` when `ch` is a letter of this script.
    #[must_use]
    pub const fn is_letter(self, ch: char) -> bool {
        match self {
            Self::Hebrew => matches!(ch, '\u{0590}'..='\u{05FF}' | '\u{FB1D}'..='\u{FB4F}'),
            Self::Latin => ch.is_ascii_alphabetic() || matches!(ch, '\u{00C0}'..='\u{024F}'),
        }
    }
}

const fn is_neutral(ch: char) -> bool {
    ch.is_ascii_digit()
        || matches!(
            ch,
            '.' | ',' | '!' | '?' | ':' | ';' | '-' | '(' | ')' | '\'' | '"'
        )
}

/// Strips every character that is not a letter of `script`, a digit, common
/// punctuation or whitespace. Whitespace runs collapse to one space.
///
/// Returns `None` when no letter of `script` survives, so callers can fall
/// back to their own copy.
///
/// # Examples
///
/// ```
/// use staircase::subtask::domain::{LocalScript, sanitize_display_text};
///
/// assert_eq!(
///     sanitize_display_text("שגיאה <b>זמנית</b> 42", LocalScript::Hebrew).as_deref(),
///     Some("שגיאה זמנית 42"),
/// );
/// assert_eq!(sanitize_display_text("SERVER_DOWN", LocalScript::Hebrew), None);
/// ```
#[must_use]
pub fn sanitize_display_text(raw: &str, script: LocalScript) -> Option<String> {
    let kept: String = raw
        .chars()
        .map(|ch| {
            if script.is_letter(ch) || is_neutral(ch) {
                ch
            } else {
                ' '
            }
        })
        .collect();
    let collapsed = kept.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .chars()
        .any(|ch| script.is_letter(ch))
        .then_some(collapsed)
}
