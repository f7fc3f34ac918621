//! Inbound chat command parsing.

/// A recognized bot command. Arguments are kept as raw text; validation
/// (address shape, threshold parsing) happens in the engine so the reply
/// can explain what was wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start {
        wallet: Option<String>,
        threshold: Option<String>,
    },
    Status,
    Stop,
    Help,
    List,
}

impl Command {
    /// Parse a message text. Returns `None` for plain text and unknown
    /// commands; both are ignored without a reply.
    pub fn parse(text: &str) -> Option<Command> {
        let mut parts = text.split_whitespace();
        let first = parts.next()?;
        if !first.starts_with('/') {
            return None;
        }

        // Group chats suffix commands with the bot's username.
        let command = first.split('@').next().unwrap_or(first).to_lowercase();

        match command.as_str() {
            "/start" => Some(Command::Start {
                wallet: parts.next().map(str::to_string),
                threshold: parts.next().map(str::to_string),
            }),
            "/status" => Some(Command::Status),
            "/stop" => Some(Command::Stop),
            "/help" => Some(Command::Help),
            "/list" => Some(Command::List),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_start_with_wallet_and_threshold() {
        let command = Command::parse("/start 0xabc 10").unwrap();
        assert_eq!(
            command,
            Command::Start {
                wallet: Some("0xabc".to_string()),
                threshold: Some("10".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_start_with_wallet_only() {
        let command = Command::parse("/start 0xabc").unwrap();
        assert_eq!(
            command,
            Command::Start {
                wallet: Some("0xabc".to_string()),
                threshold: None,
            }
        );
    }

    #[test]
    fn test_parse_bare_start() {
        let command = Command::parse("/start").unwrap();
        assert_eq!(
            command,
            Command::Start {
                wallet: None,
                threshold: None,
            }
        );
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(Command::parse("/status"), Some(Command::Status));
        assert_eq!(Command::parse("/stop"), Some(Command::Stop));
        assert_eq!(Command::parse("/help"), Some(Command::Help));
        assert_eq!(Command::parse("/list"), Some(Command::List));
    }

    #[test]
    fn test_parse_strips_bot_username() {
        assert_eq!(Command::parse("/status@sentinel_bot"), Some(Command::Status));
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Command::parse("/STOP"), Some(Command::Stop));
    }

    #[test]
    fn test_parse_ignores_plain_text_and_unknown() {
        assert_eq!(Command::parse("hello there"), None);
        assert_eq!(Command::parse("/settings 3"), None);
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("   "), None);
    }
}
