//! Input helpers shared by the engine and the CLI: player id normalization, command
//! tokenization and log sanitizing.

/// Longest player id accepted after normalization (Twitch logins are at most 25).
pub const MAX_PLAYER_ID_LEN: usize = 32;

/// Canonical storage key for a chat username.
///
/// Trims, lowercases, strips one leading `@` and keeps only `[a-z0-9_]`. Returns `None` when
/// nothing usable remains.
pub fn normalize_player_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('@').unwrap_or(trimmed);
    let id: String = trimmed
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .take(MAX_PLAYER_ID_LEN)
        .collect();
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

/// Lowercase `text` and split it into the command word and the (trimmed) remainder.
pub fn split_command(text: &str) -> (String, String) {
    let lowered = text.trim().to_lowercase();
    match lowered.split_once(char::is_whitespace) {
        Some((head, rest)) => (head.to_string(), rest.trim().to_string()),
        None => (lowered, String::new()),
    }
}

/// Escape a string for single-line logging:
/// - `\n` => `\\n`
/// - `\r` => `\\r`
/// - `\t` => `\\t`
/// - backslash => `\\\\`
///
/// Long strings are cut with an ellipsis.
pub fn escape_log(s: &str) -> String {
    const MAX_PREVIEW: usize = 200;
    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW) + 8);
    for (count, ch) in s.chars().enumerate() {
        if count >= MAX_PREVIEW {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                use std::fmt::Write;
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_chat_usernames() {
        assert_eq!(normalize_player_id("  @SomeUser_42 ").as_deref(), Some("someuser_42"));
        assert_eq!(normalize_player_id("we!rd-name").as_deref(), Some("werdname"));
        assert_eq!(normalize_player_id("@@double").as_deref(), Some("double"));
        assert_eq!(normalize_player_id("@"), None);
        assert_eq!(normalize_player_id("   "), None);
        assert_eq!(normalize_player_id("日本"), None);
    }

    #[test]
    fn caps_id_length() {
        let long = "a".repeat(80);
        assert_eq!(normalize_player_id(&long).map(|id| id.len()), Some(MAX_PLAYER_ID_LEN));
    }

    #[test]
    fn splits_command_and_parameter() {
        assert_eq!(
            split_command("  SHOP Sell   Health Potion "),
            ("shop".to_string(), "sell   health potion".to_string())
        );
        assert_eq!(split_command("quest"), ("quest".to_string(), String::new()));
        assert_eq!(split_command(""), (String::new(), String::new()));
    }

    #[test]
    fn escapes_newlines_and_truncates() {
        let esc = escape_log("Line1\nLine2\r\tEnd\\");
        assert_eq!(esc, "Line1\\nLine2\\r\\tEnd\\\\");
        let long = "x".repeat(500);
        let esc = escape_log(&long);
        assert!(esc.ends_with('…'));
        assert_eq!(esc.chars().count(), 201);
    }
}
