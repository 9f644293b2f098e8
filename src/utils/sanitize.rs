//! Utilities for sanitizing text quoted in check messages.
//!
//! Removes control characters and potentially problematic content from
//! response bodies before they are quoted in a Slack message or a log line.
//!
//! Also provides truncation to keep messages a reasonable size.

/// Sanitizes text by removing control characters.
///
/// Control characters (0x00-0x1F, except newline/tab/carriage return) can cause
/// issues when displayed in chat clients or logs. This function removes
/// them while preserving readability.
///
/// # Arguments
///
/// * `text` - The text to sanitize
///
/// # Returns
///
/// A sanitized version of the text with control characters removed.
pub fn sanitize_text(text: &str) -> String {
    text.chars()
        .filter(|c| {
            // Allow printable ASCII, newline, tab, carriage return
            // Remove other control characters (0x00-0x1F except \n, \t, \r)
            let code = *c as u32;
            code >= 0x20 // Printable ASCII starts at 0x20 (space)
                || code == 0x09 // Tab
                || code == 0x0A // Newline
                || code == 0x0D // Carriage return
        })
        .collect()
}

/// Sanitizes and truncates text to at most `max_chars` characters.
///
/// This function:
/// 1. Sanitizes the text by removing control characters
/// 2. Truncates to `max_chars` characters if necessary
/// 3. Appends a truncation indicator if the text was truncated
///
/// Truncation counts characters, not bytes, so multi-byte text is never cut
/// in the middle of a character.
pub fn sanitize_and_truncate(text: &str, max_chars: usize) -> String {
    let sanitized = sanitize_text(text);
    let total_chars = sanitized.chars().count();

    if total_chars > max_chars {
        let truncated: String = sanitized.chars().take(max_chars).collect();
        format!(
            "{}... (truncated, original length: {} chars)",
            truncated, total_chars
        )
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_text_removes_control_chars() {
        let input = "Error\x00message\x01with\x02control\x03chars";
        let output = sanitize_text(input);
        assert_eq!(output, "Errormessagewithcontrolchars");
    }

    #[test]
    fn test_sanitize_text_preserves_newlines_and_tabs() {
        let input = "line one\n\tline two";
        assert_eq!(sanitize_text(input), input);
    }

    #[test]
    fn test_sanitize_text_preserves_unicode() {
        let input = "Bienvenue à la bibliothèque 📚";
        assert_eq!(sanitize_text(input), input);
    }

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(sanitize_and_truncate("Welcome", 100), "Welcome");
    }

    #[test]
    fn test_truncate_long_text() {
        let input = "a".repeat(30);
        let output = sanitize_and_truncate(&input, 10);
        assert_eq!(
            output,
            "aaaaaaaaaa... (truncated, original length: 30 chars)"
        );
    }

    #[test]
    fn test_truncate_multibyte_on_char_boundary() {
        let input = "é".repeat(5);
        let output = sanitize_and_truncate(&input, 2);
        assert!(output.starts_with("éé..."));
    }
}
