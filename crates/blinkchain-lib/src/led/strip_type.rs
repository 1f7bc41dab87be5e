//! Strip color orderings accepted at startup.

use std::fmt;
use std::str::FromStr;

use crate::error::BlinkchainError;

/// Order in which a strip expects color components on the wire.
///
/// Three-component orderings drive WS2811-style strips; the `*w` variants
/// drive SK6812 RGBW strips with a dedicated white LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StripType {
    Rgb,
    Rbg,
    Grb,
    Gbr,
    Brg,
    Bgr,
    Rgbw,
    Rbgw,
    Grbw,
    Gbrw,
    Brgw,
    Bgrw,
}

impl StripType {
    pub const ALL: [StripType; 12] = [
        StripType::Rgb,
        StripType::Rbg,
        StripType::Grb,
        StripType::Gbr,
        StripType::Brg,
        StripType::Bgr,
        StripType::Rgbw,
        StripType::Rbgw,
        StripType::Grbw,
        StripType::Gbrw,
        StripType::Brgw,
        StripType::Bgrw,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StripType::Rgb => "rgb",
            StripType::Rbg => "rbg",
            StripType::Grb => "grb",
            StripType::Gbr => "gbr",
            StripType::Brg => "brg",
            StripType::Bgr => "bgr",
            StripType::Rgbw => "rgbw",
            StripType::Rbgw => "rbgw",
            StripType::Grbw => "grbw",
            StripType::Gbrw => "gbrw",
            StripType::Brgw => "brgw",
            StripType::Bgrw => "bgrw",
        }
    }
}

impl fmt::Display for StripType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StripType {
    type Err = BlinkchainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        StripType::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| BlinkchainError::Config(format!("Invalid strip type {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_every_ordering() {
        for t in StripType::ALL {
            assert_eq!(t.name().parse::<StripType>().unwrap(), t);
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("GRB".parse::<StripType>().unwrap(), StripType::Grb);
        assert_eq!("GrbW".parse::<StripType>().unwrap(), StripType::Grbw);
        assert_eq!(" bgr ".parse::<StripType>().unwrap(), StripType::Bgr);
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "rgbx".parse::<StripType>().unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("Invalid strip type rgbx"));
    }

    #[test]
    fn parse_rejects_prefix() {
        assert!("rg".parse::<StripType>().is_err());
        assert!("rgbww".parse::<StripType>().is_err());
    }

    #[test]
    fn display_matches_name() {
        assert_eq!(StripType::Brgw.to_string(), "brgw");
    }
}
