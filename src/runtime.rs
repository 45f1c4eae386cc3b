// Copyright (c) 2026 rezky_nightky

use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

/// Which rain the drawer produces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DrawVariant {
    /// Glyphs driven by the epidemic state machine.
    #[default]
    Corona,
    /// Solid blocks, no state machine.
    Pixel,
    /// Random decorative glyphs, no state machine.
    Random,
}

impl FromStr for DrawVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "corona" => Ok(DrawVariant::Corona),
            "pixel" => Ok(DrawVariant::Pixel),
            "random" => Ok(DrawVariant::Random),
            _ => Err(format!("unknown draw variant: {} (corona, pixel, random)", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_variant_parses_case_insensitively() {
        assert_eq!("Pixel".parse::<DrawVariant>(), Ok(DrawVariant::Pixel));
        assert_eq!(" random ".parse::<DrawVariant>(), Ok(DrawVariant::Random));
        assert!("matrix".parse::<DrawVariant>().is_err());
    }
}
