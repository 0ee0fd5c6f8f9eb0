//! Line protocol definitions
//!
//! Plain-text, newline-delimited protocol. Clients send raw lines; the
//! server answers with `ServerMessage`s whose `Display` output is written to
//! the socket verbatim. Input validation for names and chat lines lives
//! here too.

use std::fmt;

use chrono::Local;

use crate::error::ValidationError;

/// Timestamp layout used in prompts and chat lines
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Prompt asking for a display name
pub const NAME_PROMPT: &str = "[ENTER YOUR NAME]: ";

const WELCOME: &str = "Welcome to TCP-Chat!\n";

const LOGO: &str = concat!(
    "         _nnnn_\n",
    "        dGGGGMMb\n",
    "       @p~qp~~qMb\n",
    "       M|@||@) M|\n",
    "       @,----.JM|\n",
    r"      JS^\__/  qKL", "\n",
    "     dZP        qKRb\n",
    "    dZP          qKKb\n",
    "   fZP            SMMb\n",
    "   HZM            MMMM\n",
    "   FqM            MMMM\n",
    r#" __| ".        |\dS"qML"#, "\n",
    r" |    .       | ' \Zq", "\n",
    r"_)      \.___.,|     .'", "\n",
    r"\____   )MMMMMP|   .'", "\n",
    "     -'       --'\n",
);

/// Server → Client message
///
/// Everything the server writes to a connection goes through one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// Greeting plus the first name prompt
    Banner,
    /// Input rejected; name rejections re-ask for the name
    Rejected(ValidationError),
    /// Capacity reached, connection is about to close
    ServerFull,
    /// Input prompt carrying the session's own name
    Prompt { name: String },
    /// One replayed history entry
    History { line: String },
    /// A broadcast line followed by the recipient's own prompt
    Delivery { line: String, recipient: String },
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerMessage::Banner => write!(f, "{WELCOME}{LOGO}{WELCOME}{NAME_PROMPT}"),
            ServerMessage::Rejected(err) if err.is_name_error() => {
                write!(f, "{err}\n{NAME_PROMPT}")
            }
            ServerMessage::Rejected(err) => writeln!(f, "{err}"),
            ServerMessage::ServerFull => writeln!(f, "Server is full. Try again later."),
            ServerMessage::Prompt { name } => write!(f, "{}", prompt(name)),
            ServerMessage::History { line } => writeln!(f, "{line}"),
            ServerMessage::Delivery { line, recipient } => {
                write!(f, "\n{line}\n{}", prompt(recipient))
            }
        }
    }
}

/// Convert a rejection into the in-band reply for the sender
impl From<ValidationError> for ServerMessage {
    fn from(err: ValidationError) -> Self {
        ServerMessage::Rejected(err)
    }
}

/// Current local time in `TIMESTAMP_FORMAT`
pub fn timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// `[<timestamp>][<name>]:`
pub fn prompt(name: &str) -> String {
    format!("[{}][{}]:", timestamp(), name)
}

/// `[<timestamp>][<name>]: <text>`, the form stored in history
pub fn chat_line(name: &str, text: &str) -> String {
    format!("[{}][{}]: {}", timestamp(), name, text)
}

pub fn joined_notice(name: &str) -> String {
    format!("{name} has joined the chat")
}

pub fn left_notice(name: &str) -> String {
    format!("{name} has left the chat")
}

/// Trim a candidate display name and check it is non-empty ASCII alphanumeric
///
/// Uniqueness is the registry's concern and is not checked here.
pub fn validate_name(raw: &str) -> Result<&str, ValidationError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidName);
    }
    Ok(name)
}

/// Trim a chat line and check it is non-empty, alphanumerics and spaces only
pub fn validate_message(raw: &str) -> Result<&str, ValidationError> {
    let text = raw.trim();
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_alphanumeric() || c == ' ') {
        return Err(ValidationError::InvalidMessage);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  Alice \r"), Ok("Alice"));
        assert_eq!(validate_name("bob42"), Ok("bob42"));
        assert_eq!(validate_name("   "), Err(ValidationError::EmptyName));
        assert_eq!(validate_name(""), Err(ValidationError::EmptyName));
        assert_eq!(validate_name("Al ice"), Err(ValidationError::InvalidName));
        assert_eq!(validate_name("Alice!"), Err(ValidationError::InvalidName));
        assert_eq!(validate_name("Zoë"), Err(ValidationError::InvalidName));
    }

    #[test]
    fn test_validate_message() {
        assert_eq!(validate_message(" hello there \n"), Ok("hello there"));
        assert_eq!(validate_message("a  b 3"), Ok("a  b 3"));
        assert_eq!(validate_message(""), Err(ValidationError::InvalidMessage));
        assert_eq!(validate_message("  \t "), Err(ValidationError::InvalidMessage));
        assert_eq!(validate_message("hi!"), Err(ValidationError::InvalidMessage));
        assert_eq!(validate_message("tab\there"), Err(ValidationError::InvalidMessage));
    }

    #[test]
    fn test_banner_ends_with_name_prompt() {
        let banner = ServerMessage::Banner.to_string();
        assert!(banner.starts_with("Welcome to TCP-Chat!\n"));
        assert!(banner.contains(r"JS^\__/  qKL"));
        assert!(banner.ends_with("Welcome to TCP-Chat!\n[ENTER YOUR NAME]: "));
    }

    #[test]
    fn test_rejections() {
        assert_eq!(
            ServerMessage::from(ValidationError::NameTaken).to_string(),
            "This name is already taken. Please enter a different name:\n[ENTER YOUR NAME]: "
        );
        assert_eq!(
            ServerMessage::from(ValidationError::InvalidMessage).to_string(),
            "Message can only contain letters and numbers. Please try again:\n"
        );
        assert_eq!(
            ServerMessage::ServerFull.to_string(),
            "Server is full. Try again later.\n"
        );
    }

    #[test]
    fn test_prompt_shape() {
        let p = prompt("Alice");
        assert!(p.starts_with('['));
        assert!(p.ends_with("][Alice]:"));
        // "[" + 19-char timestamp + "]"
        assert_eq!(&p[20..21], "]");
    }

    #[test]
    fn test_delivery_and_history() {
        let delivery = ServerMessage::Delivery {
            line: "Alice has joined the chat".to_string(),
            recipient: "Bob".to_string(),
        }
        .to_string();
        assert!(delivery.starts_with("\nAlice has joined the chat\n["));
        assert!(delivery.ends_with("][Bob]:"));

        let history = ServerMessage::History {
            line: "[2024-01-01 00:00:00][Alice]: hi".to_string(),
        };
        assert_eq!(history.to_string(), "[2024-01-01 00:00:00][Alice]: hi\n");
    }

    #[test]
    fn test_notices() {
        assert_eq!(joined_notice("Alice"), "Alice has joined the chat");
        assert_eq!(left_notice("Alice"), "Alice has left the chat");
        assert!(chat_line("Alice", "hello there").ends_with("][Alice]: hello there"));
    }
}
