//! Command routing: decide whether raw chat input is an image directive or a plain message.

/// Reserved prefix that turns a message into an image request. Matched case-insensitively.
pub const IMAGE_COMMAND: &str = "/image";

/// Slash commands offered as completions while typing.
const SUGGESTABLE_COMMANDS: &[&str] = &[IMAGE_COMMAND];

/// Classified user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatRequest {
    /// Generate an image for `prompt` (may be empty; forwarded as-is).
    Image { prompt: String },
    /// Send `message` to the completion gateway.
    Text { message: String },
}

/// Classify input. Total: every string maps to exactly one request.
pub fn classify(input: &str) -> ChatRequest {
    let input = input.trim();
    match strip_command(input, IMAGE_COMMAND) {
        Some(rest) => ChatRequest::Image {
            prompt: rest.trim_start().to_string(),
        },
        None => ChatRequest::Text {
            message: input.to_string(),
        },
    }
}

/// Case-insensitive ASCII prefix strip.
fn strip_command<'a>(input: &'a str, command: &str) -> Option<&'a str> {
    let head = input.get(..command.len())?;
    if head.eq_ignore_ascii_case(command) {
        Some(&input[command.len()..])
    } else {
        None
    }
}

/// Suggest a slash command the input is a strict prefix of (e.g. `/im` -> `/image`).
pub fn suggest_command(input: &str) -> Option<&'static str> {
    let input = input.trim_start();
    if !input.starts_with('/') {
        return None;
    }
    SUGGESTABLE_COMMANDS.iter().copied().find(|cmd| {
        input.len() < cmd.len()
            && cmd
                .get(..input.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(input))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(prompt: &str) -> ChatRequest {
        ChatRequest::Image {
            prompt: prompt.to_string(),
        }
    }

    fn text(message: &str) -> ChatRequest {
        ChatRequest::Text {
            message: message.to_string(),
        }
    }

    #[test]
    fn plain_text() {
        assert_eq!(classify("Hello!"), text("Hello!"));
        assert_eq!(classify("  Hello!  "), text("Hello!"));
        assert_eq!(classify(""), text(""));
    }

    #[test]
    fn image_command_strips_token_and_whitespace() {
        assert_eq!(classify("/image a red fox"), image("a red fox"));
        assert_eq!(classify("/image    a red fox"), image("a red fox"));
        assert_eq!(classify("  /image a red fox "), image("a red fox"));
    }

    #[test]
    fn image_command_is_case_insensitive() {
        assert_eq!(classify("/IMAGE a red fox"), image("a red fox"));
        assert_eq!(classify("/Image cat"), image("cat"));
    }

    #[test]
    fn empty_image_prompt_is_still_image() {
        assert_eq!(classify("/image"), image(""));
        assert_eq!(classify("/image   "), image(""));
    }

    #[test]
    fn command_must_be_a_prefix() {
        assert_eq!(classify("draw /image of a fox"), text("draw /image of a fox"));
        assert_eq!(classify("/imag"), text("/imag"));
        assert_eq!(classify("image a fox"), text("image a fox"));
    }

    #[test]
    fn multibyte_input_never_panics() {
        assert_eq!(classify("ねこ"), text("ねこ"));
        assert_eq!(classify("/imagé"), text("/imagé"));
        assert_eq!(classify("/imageねこ"), image("ねこ"));
    }

    #[test]
    fn suggestions() {
        assert_eq!(suggest_command("/"), Some("/image"));
        assert_eq!(suggest_command("/IM"), Some("/image"));
        assert_eq!(suggest_command("/image"), None);
        assert_eq!(suggest_command("/x"), None);
        assert_eq!(suggest_command("hello"), None);
        assert_eq!(suggest_command(""), None);
    }
}
