//! Command dispatcher — reads one line, executes it, writes one reply.
//!
//! End of stream between commands ends the session cleanly. End of stream
//! after part of a command has arrived means the client hung up mid-command
//! and is a transport error.
//!
//! Commands are strictly sequential: each is parsed, validated, applied and
//! acknowledged (reply flushed) before the next byte is read.

use std::io::{BufRead, Read, Write};

use crate::driver::StripDriver;
use crate::error::{BlinkchainError, Result};
use crate::protocol::{Reply, parse_command};
use crate::session::Session;

/// Default cap on a single command line, payload included.
pub const DEFAULT_MAX_LINE_BYTES: usize = 16 * 1024 * 1024;

/// Stream limits for [`serve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServeOptions {
    pub max_line_bytes: usize,
}

impl Default for ServeOptions {
    fn default() -> Self {
        ServeOptions {
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }
}

/// Counters reported when a session ends cleanly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeStats {
    pub commands: usize,
    pub errors: usize,
}

/// Read the next command line into `buf`, without its terminator.
///
/// `max` counts content bytes only; a trailing `\r\n` or `\n` is free.
/// Returns `Ok(false)` on a clean end of stream.
fn read_line(reader: &mut impl BufRead, buf: &mut Vec<u8>, max: usize) -> Result<bool> {
    buf.clear();
    let limit = u64::try_from(max).unwrap_or(u64::MAX).saturating_add(2);
    reader.by_ref().take(limit).read_until(b'\n', buf)?;

    let terminated = buf.last() == Some(&b'\n');
    if terminated {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    if buf.len() > max {
        return Err(BlinkchainError::Transport(format!(
            "command line exceeds {max} bytes"
        )));
    }
    if terminated {
        Ok(true)
    } else if buf.iter().all(u8::is_ascii_whitespace) {
        Ok(false)
    } else {
        Err(BlinkchainError::Transport(
            "end of stream in the middle of a command".into(),
        ))
    }
}

/// Serve commands from `reader` until end of stream or a fatal error.
///
/// Command-local errors are answered with `ERR:` and the loop continues.
/// Transport and driver failures are returned without a reply.
pub fn serve<D: StripDriver>(
    session: &mut Session<D>,
    mut reader: impl BufRead,
    mut writer: impl Write,
    options: ServeOptions,
) -> Result<ServeStats> {
    let mut stats = ServeStats::default();
    let mut buf = Vec::new();

    while read_line(&mut reader, &mut buf, options.max_line_bytes)? {
        let outcome = match std::str::from_utf8(&buf) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => parse_command(line).and_then(|cmd| session.execute(cmd)),
            Err(_) => Err(BlinkchainError::Argument("command is not valid UTF-8".into())),
        };
        stats.commands += 1;

        let reply = match outcome {
            Ok(reply) => reply,
            Err(e) if e.is_fatal() => {
                log::error!("{e}");
                return Err(e);
            }
            Err(e) => {
                log::debug!("  -> {e}");
                stats.errors += 1;
                Reply::error(&e)
            }
        };
        reply.write_to(&mut writer)?;
    }

    log::debug!("EOF");
    Ok(stats)
}
