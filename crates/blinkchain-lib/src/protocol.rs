//! Text protocol — command grammar and reply format.
//!
//! One command per line: a case-insensitive name followed by its fixed list
//! of whitespace-separated fields. Binary payloads (gamma tables, blit
//! pixels) travel as base64 tokens inside the line, preceded by their
//! encoded length.
//!
//! Replies are a single line each:
//! - `OK`
//! - `OK: <payload>`
//! - `ERR: <message>`
//!
//! terminated by `\r\n`.

use std::fmt;
use std::io::Write;
use std::str::{FromStr, SplitAsciiWhitespace};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{BlinkchainError, Result};
use crate::led::pack_wrgb;
use crate::topology::Rect;

/// Line terminator appended to every reply.
pub const REPLY_TERMINATOR: &str = "\r\n";

// ── Commands ──

/// A fully parsed command. Field values are type-checked but not yet
/// validated against the canvas or channel ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    InitCanvas {
        width: u16,
        height: u16,
    },
    InitPixels {
        channel: u8,
        offset: u16,
        x: u16,
        y: u16,
        count: u16,
        dx: i8,
        dy: i8,
    },
    SetInvert {
        channel: u8,
        invert: u8,
    },
    SetBrightness {
        channel: u8,
        brightness: u8,
    },
    SetGamma {
        channel: u8,
        table: Vec<u8>,
    },
    SetPixel {
        x: u16,
        y: u16,
        color: u32,
    },
    GetPixel {
        x: u16,
        y: u16,
    },
    Fill {
        rect: Rect,
        color: u32,
    },
    /// `copy` (transparent pixels included) and `copy_blit` (masked).
    Copy {
        src: Rect,
        dst_x: u16,
        dst_y: u16,
        include_transparent: bool,
    },
    Blit {
        rect: Rect,
        pixels: Vec<u8>,
    },
    Render,
    PrintTopology,
}

impl Command {
    /// Wire name of the command.
    pub fn name(&self) -> &'static str {
        match self {
            Command::InitCanvas { .. } => "init_canvas",
            Command::InitPixels { .. } => "init_pixels",
            Command::SetInvert { .. } => "set_invert",
            Command::SetBrightness { .. } => "set_brightness",
            Command::SetGamma { .. } => "set_gamma",
            Command::SetPixel { .. } => "set_pixel",
            Command::GetPixel { .. } => "get_pixel",
            Command::Fill { .. } => "fill",
            Command::Copy {
                include_transparent: true,
                ..
            } => "copy",
            Command::Copy { .. } => "copy_blit",
            Command::Blit { .. } => "blit",
            Command::Render => "render",
            Command::PrintTopology => "print_topology",
        }
    }
}

/// Typed field extraction over the tokens of one command line.
struct Fields<'a> {
    tokens: SplitAsciiWhitespace<'a>,
}

impl<'a> Fields<'a> {
    fn raw(&mut self, field: &str) -> Result<&'a str> {
        self.tokens
            .next()
            .ok_or_else(|| BlinkchainError::Argument(format!("missing {field}")))
    }

    fn next<T: FromStr>(&mut self, field: &str) -> Result<T> {
        let tok = self.raw(field)?;
        tok.parse()
            .map_err(|_| BlinkchainError::Argument(format!("invalid {field} '{tok}'")))
    }

    /// A base64 token whose encoded length was announced as `len`.
    fn payload(&mut self, len: u32) -> Result<Vec<u8>> {
        if len == 0 {
            return Ok(Vec::new());
        }
        let encoded = self.raw("payload")?;
        decode_framed_payload(len, encoded)
    }

    fn rect(&mut self) -> Result<Rect> {
        Ok(Rect::new(
            self.next("x")?,
            self.next("y")?,
            self.next("width")?,
            self.next("height")?,
        ))
    }

    fn color(&mut self) -> Result<u32> {
        let r = self.next("r")?;
        let g = self.next("g")?;
        let b = self.next("b")?;
        let w = self.next("w")?;
        Ok(pack_wrgb(r, g, b, w))
    }

    fn remaining(&mut self) -> Vec<&'a str> {
        self.tokens.by_ref().collect()
    }

    fn finish(mut self) -> Result<()> {
        match self.tokens.next() {
            Some(extra) => Err(BlinkchainError::Argument(format!(
                "unexpected argument '{extra}'"
            ))),
            None => Ok(()),
        }
    }
}

/// Decode a base64 token after checking it against its announced length.
fn decode_framed_payload(len: u32, encoded: &str) -> Result<Vec<u8>> {
    if encoded.len() != len as usize {
        return Err(BlinkchainError::Argument(format!(
            "Unable to read base64-encoded binary: expected {len} characters, got {}",
            encoded.len()
        )));
    }
    decode_payload(encoded)
}

fn decode_payload(encoded: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(encoded)
        .map_err(|e| BlinkchainError::Argument(format!("invalid base64 payload: {e}")))
}

/// Parse one non-blank command line.
pub fn parse_command(line: &str) -> Result<Command> {
    let mut tokens = line.split_ascii_whitespace();
    let Some(name) = tokens.next() else {
        return Err(BlinkchainError::Argument("empty command".into()));
    };
    let mut f = Fields { tokens };

    let cmd = match name.to_ascii_lowercase().as_str() {
        "init_canvas" => Command::InitCanvas {
            width: f.next("width")?,
            height: f.next("height")?,
        },
        "init_pixels" => Command::InitPixels {
            channel: f.next("channel")?,
            offset: f.next("offset")?,
            x: f.next("x")?,
            y: f.next("y")?,
            count: f.next("count")?,
            dx: f.next("dx")?,
            dy: f.next("dy")?,
        },
        "set_invert" => Command::SetInvert {
            channel: f.next("channel")?,
            invert: f.next("invert")?,
        },
        "set_brightness" => Command::SetBrightness {
            channel: f.next("channel")?,
            brightness: f.next("brightness")?,
        },
        "set_gamma" => {
            let channel = f.next("channel")?;
            // Encoded length prefix is optional for gamma tables.
            let table = match f.remaining().as_slice() {
                [encoded] => decode_payload(encoded)?,
                [len, encoded] => {
                    let len: u32 = len
                        .parse()
                        .map_err(|_| BlinkchainError::Argument(format!("invalid length '{len}'")))?;
                    decode_framed_payload(len, encoded)?
                }
                [] => return Err(BlinkchainError::Argument("missing payload".into())),
                [_, _, extra, ..] => {
                    return Err(BlinkchainError::Argument(format!(
                        "unexpected argument '{extra}'"
                    )));
                }
            };
            Command::SetGamma { channel, table }
        }
        "set_pixel" => Command::SetPixel {
            x: f.next("x")?,
            y: f.next("y")?,
            color: f.color()?,
        },
        "get_pixel" => Command::GetPixel {
            x: f.next("x")?,
            y: f.next("y")?,
        },
        "fill" => Command::Fill {
            rect: f.rect()?,
            color: f.color()?,
        },
        "copy" | "copy_blit" => {
            let (xs, ys) = (f.next("xs")?, f.next("ys")?);
            let (dst_x, dst_y) = (f.next("xd")?, f.next("yd")?);
            let (width, height) = (f.next("width")?, f.next("height")?);
            Command::Copy {
                src: Rect::new(xs, ys, width, height),
                dst_x,
                dst_y,
                include_transparent: name.eq_ignore_ascii_case("copy"),
            }
        }
        "blit" => {
            let rect = f.rect()?;
            let len = f.next("length")?;
            Command::Blit {
                rect,
                pixels: f.payload(len)?,
            }
        }
        "render" => Command::Render,
        "print_topology" => Command::PrintTopology,
        _ => return Err(BlinkchainError::UnknownCommand(name.to_string())),
    };
    f.finish()?;
    Ok(cmd)
}

// ── Replies ──

/// One reply line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Ok,
    OkPayload(String),
    Err(String),
}

impl Reply {
    pub fn error(e: &BlinkchainError) -> Self {
        Reply::Err(e.to_string())
    }

    pub fn is_ok(&self) -> bool {
        !matches!(self, Reply::Err(_))
    }

    /// Write the reply line and flush so the client sees it immediately.
    pub fn write_to(&self, out: &mut impl Write) -> std::io::Result<()> {
        write!(out, "{self}{REPLY_TERMINATOR}")?;
        out.flush()
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Ok => write!(f, "OK"),
            Reply::OkPayload(p) => write!(f, "OK: {p}"),
            Reply::Err(m) => write!(f, "ERR: {m}"),
        }
    }
}
