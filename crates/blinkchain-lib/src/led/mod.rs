//! LED pixel values and strip color orderings.

mod color;
mod strip_type;

pub use color::{TRANSPARENT, format_color, from_wrgb_bytes, pack_wrgb};
pub use strip_type::StripType;
