//! Module `commands`
//!
//! Classifies the newline-delimited text a client sends after its username.

/// Literal line a client sends to leave the chat. Matched case-sensitively.
pub const EXIT_SENTINEL: &str = "/exit";

/// Represents one inbound line after its terminator has been stripped.
#[derive(Debug, PartialEq)]
pub enum ChatLine {
    Exit,
    Blank,
    TooLong(usize),
    Message(String),
}

/// Strips a trailing `\n` or `\r\n` from a raw line read off the socket.
pub fn strip_terminator(raw: &str) -> &str {
    let line = raw.strip_suffix('\n').unwrap_or(raw);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Parses a raw line received from a registered client into a `ChatLine`.
///
/// The message body is kept as sent (minus the terminator); only the blank
/// check looks at the trimmed form.
pub fn parse_line(raw: &str, max_len: usize) -> ChatLine {
    let line = strip_terminator(raw);

    if line == EXIT_SENTINEL {
        ChatLine::Exit
    } else if line.trim().is_empty() {
        ChatLine::Blank
    } else if line.len() > max_len {
        ChatLine::TooLong(line.len())
    } else {
        ChatLine::Message(line.to_string())
    }
}

/// Extracts the requested username from the first line of a connection.
///
/// Returns `None` when the line is blank after trimming.
pub fn parse_username(raw: &str) -> Option<String> {
    let name = raw.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_is_case_sensitive() {
        assert_eq!(parse_line("/exit\r\n", 64), ChatLine::Exit);
        assert_eq!(parse_line("/exit", 64), ChatLine::Exit);
        assert_eq!(
            parse_line("/EXIT\n", 64),
            ChatLine::Message("/EXIT".to_string())
        );
        assert_eq!(
            parse_line(" /exit\n", 64),
            ChatLine::Message(" /exit".to_string())
        );
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert_eq!(parse_line("\n", 64), ChatLine::Blank);
        assert_eq!(parse_line("   \t\r\n", 64), ChatLine::Blank);
    }

    #[test]
    fn overlong_lines_are_flagged() {
        let long = "x".repeat(10);
        assert_eq!(parse_line(&format!("{long}\n"), 9), ChatLine::TooLong(10));
        assert_eq!(parse_line(&format!("{long}\n"), 10), ChatLine::Message(long));
    }

    #[test]
    fn username_is_trimmed() {
        assert_eq!(parse_username("  alice \r\n"), Some("alice".to_string()));
        assert_eq!(parse_username(" \n"), None);
        assert_eq!(parse_username(""), None);
    }
}
