use std::env;
use std::fs::OpenOptions;
use std::io::{self, IsTerminal, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// OSC 52 payloads larger than this are rejected by most terminals, so we
/// refuse to emit them rather than silently truncating the copied text.
const MAX_OSC52_BYTES: usize = 100_000;

/// Best-effort guess at whether the hosting terminal honours OSC 52.
/// `NO_OSC52` opts out explicitly; otherwise we go by TERM.
pub fn osc52_likely() -> bool {
    if env::var_os("NO_OSC52").is_some() {
        return false;
    }
    let term = env::var("TERM").unwrap_or_default();
    if term == "dumb" || term == "linux" {
        return false;
    }
    const KNOWN: [&str; 8] = [
        "xterm", "tmux", "screen", "rxvt", "alacritty", "foot", "kitty", "wezterm",
    ];
    KNOWN.iter().any(|name| term.contains(name))
}

/// Status-line message describing the copy outcome for this terminal.
pub fn clipboard_status_message() -> &'static str {
    if osc52_likely() {
        if env::var_os("TMUX").is_some() {
            "JSON copied to clipboard! (tmux: needs 'set -g set-clipboard on')"
        } else {
            "JSON copied to clipboard!"
        }
    } else {
        "Clipboard not supported by this terminal"
    }
}

/// Copy `text` to the system clipboard via an OSC 52 escape sequence.
/// Writes to /dev/tty so the sequence reaches the terminal even while
/// stdout is redirected; falls back to stdout when no tty is available.
pub fn copy_to_clipboard(text: &str) -> io::Result<()> {
    let encoded = STANDARD.encode(text.as_bytes());
    if encoded.len() > MAX_OSC52_BYTES {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "selection too large for the clipboard",
        ));
    }
    let sequence = format!("\x1b]52;c;{encoded}\x07");

    match OpenOptions::new().write(true).open("/dev/tty") {
        Ok(mut tty) => {
            tty.write_all(sequence.as_bytes())?;
            tty.flush()
        }
        Err(_) => {
            let mut out = io::stdout();
            if !out.is_terminal() {
                return Err(io::Error::new(
                    io::ErrorKind::Unsupported,
                    "no terminal available for clipboard escape",
                ));
            }
            out.write_all(sequence.as_bytes())?;
            out.flush()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_payload_encodes() {
        let encoded = STANDARD.encode("hello");
        assert_eq!(encoded, "aGVsbG8=");
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let big = "x".repeat(MAX_OSC52_BYTES);
        let err = copy_to_clipboard(&big);
        // base64 inflates the payload past the cap regardless of tty state.
        assert!(err.is_err());
    }
}
