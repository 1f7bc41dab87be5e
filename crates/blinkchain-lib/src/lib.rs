//! Blinkchain — line-oriented command server for addressable LED strips.
//!
//! A client lays out a 2D canvas, maps strip LEDs onto it, draws with
//! fill/copy/blit primitives and then asks for a render. Every command gets
//! exactly one `OK` or `ERR:` reply.

pub mod config;
pub mod dispatch;
pub mod driver;
pub mod error;
pub mod led;
pub mod pixel;
pub mod protocol;
pub mod session;
pub mod topology;

pub use error::BlinkchainError;
