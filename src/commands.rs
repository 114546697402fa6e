//! Save-command detection in chat messages.
//!
//! A message whose trimmed text starts with the Arabic prefix `احفظ:`
//! ("save:") instructs the service to persist the remainder as a user fact
//! instead of querying the model.

/// Literal command token marking a save instruction.
pub const SAVE_COMMAND: &str = "احفظ:";

/// True iff the trimmed message starts with the save-command token.
pub fn is_save_command(message: &str) -> bool {
    message.trim().starts_with(SAVE_COMMAND)
}

/// Strip every occurrence of the command token and trim whitespace. The
/// result may be empty when the message held only the token — callers treat
/// that as nothing to save.
pub fn extract_fact(message: &str) -> String {
    message.replace(SAVE_COMMAND, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_save_command_with_surrounding_whitespace() {
        assert!(is_save_command("  احفظ: اسمي علي "));
        assert!(is_save_command("احفظ:"));
    }

    #[test]
    fn plain_messages_are_not_commands() {
        assert!(!is_save_command("hello"));
        assert!(!is_save_command("قل لي احفظ: لاحقاً"));
    }

    #[test]
    fn extracts_fact_text() {
        assert_eq!(extract_fact("  احفظ: اسمي علي "), "اسمي علي");
    }

    #[test]
    fn bare_command_extracts_empty_fact() {
        assert_eq!(extract_fact("احفظ:"), "");
        assert_eq!(extract_fact("  احفظ:   "), "");
    }

    #[test]
    fn all_occurrences_of_the_token_are_removed() {
        assert_eq!(extract_fact("احفظ: احفظ: تذكرني"), "تذكرني");
    }
}
