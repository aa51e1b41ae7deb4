//! Operator commands read from a line-oriented input such as stdin.
//!
//! One command per line:
//!
//! ```text
//! refresh          start a manual refresh
//! range <range>    change the chart time range (e.g. `range 24h`)
//! logout | quit    close the session
//! ```

use std::str::FromStr;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::{DashboardError, Result};

/// User action forwarded to the session controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Refresh,
    Range(String),
    Logout,
}

impl FromStr for Command {
    type Err = DashboardError;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let command = match (words.next(), words.next(), words.next()) {
            (Some("refresh"), None, _) => Command::Refresh,
            (Some("range"), Some(range), None) => Command::Range(range.to_string()),
            (Some("logout" | "quit"), None, _) => Command::Logout,
            _ => return Err(DashboardError::Command(line.trim().to_string())),
        };
        Ok(command)
    }
}

/// Parse commands from `reader` and send them to the controller
///
/// Blank lines are skipped and unknown commands are logged. Returns at end
/// of input or once the controller has dropped its receiver.
///
/// # Errors
///
/// Returns error if reading from `reader` fails.
pub async fn forward_commands<R>(reader: R, commands: mpsc::Sender<Command>) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<Command>() {
            Ok(command) => {
                if commands.send(command).await.is_err() {
                    debug!("Session gone, no longer reading commands");
                    break;
                }
            }
            Err(e) => warn!("{}", e),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!("refresh".parse::<Command>().unwrap(), Command::Refresh);
        assert_eq!(
            "  range 24h ".parse::<Command>().unwrap(),
            Command::Range("24h".to_string())
        );
        assert_eq!("logout".parse::<Command>().unwrap(), Command::Logout);
        assert_eq!("quit".parse::<Command>().unwrap(), Command::Logout);
    }

    #[test]
    fn test_parse_rejects_unknown_and_malformed() {
        for line in ["", "reboot", "range", "range 1h 6h", "refresh now", "REFRESH"] {
            let err = line.parse::<Command>().unwrap_err();
            assert!(
                matches!(err, DashboardError::Command(_)),
                "Expected Command error for {:?}, got: {:?}",
                line,
                err
            );
        }
    }

    #[tokio::test]
    async fn test_forward_commands_skips_bad_lines() {
        let input: &[u8] = b"refresh\n\nbogus\nrange 6h\nquit\n";
        let (tx, mut rx) = mpsc::channel(8);

        forward_commands(input, tx).await.unwrap();

        let mut received = Vec::new();
        while let Some(command) = rx.recv().await {
            received.push(command);
        }
        assert_eq!(
            received,
            vec![
                Command::Refresh,
                Command::Range("6h".to_string()),
                Command::Logout
            ]
        );
    }

    #[tokio::test]
    async fn test_forward_commands_stops_when_receiver_dropped() {
        let input: &[u8] = b"refresh\nrefresh\nrefresh\n";
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        tokio_test::assert_ok!(forward_commands(input, tx).await);
    }
}
