use super::ChatMessage;

/// System instruction asking for a bare translation from `from` to `to`
pub fn instruction(from: &str, to: &str) -> String {
    format!(
        "Translate the following text from {} to {}. Give only the translation and no meaning.",
        from, to
    )
}

/// The two-message exchange: system instruction, then the text verbatim
pub fn build_messages(from: &str, to: &str, text: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::system(instruction(from, to)), ChatMessage::user(text)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::ChatRole;

    #[test]
    fn test_instruction_text() {
        assert_eq!(
            instruction("English", "Korean"),
            "Translate the following text from English to Korean. Give only the translation and no meaning."
        );
    }

    #[test]
    fn test_user_text_is_verbatim() {
        let messages = build_messages("Korean", "English", "  안녕하세요\n");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::System);
        assert_eq!(messages[1].role, ChatRole::User);
        assert_eq!(messages[1].content, "  안녕하세요\n");
    }
}
