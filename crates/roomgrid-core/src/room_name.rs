//! Room-name codec: `"W7N4"` ↔ [`MapPosition`].
//!
//! A room name is `[WE]<n>[NS]<m>` with `n, m` decimal in `[0, 127]`.
//! The western/northern half of the map counts down toward the centre
//! (`W0` is column 127, `N0` is row 127); the eastern/southern half counts
//! up from it (`E0` is column 128, `S0` is row 128). Parsing is
//! case-insensitive; out-of-range coordinates and trailing input are
//! rejected rather than clamped.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::geom::MapPosition;

/// Reasons a room name fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomNameError {
    /// Not of the form `[WE]<n>[NS]<m>`.
    #[error("room name `{0}` is not of the form W|E<n>N|S<m>")]
    Malformed(String),
    /// Syntactically valid, but a coordinate exceeds 127.
    #[error("room name `{0}` has a coordinate outside 0..=127")]
    OutOfRange(String),
}

/// Parse a room name into a map position.
pub fn parse(name: &str) -> Result<MapPosition, RoomNameError> {
    let malformed = || RoomNameError::Malformed(name.to_owned());

    let mut chars = name.chars().peekable();
    let horizontal = chars.next().ok_or_else(malformed)?;
    let n = take_number(&mut chars).ok_or_else(malformed)?;
    let vertical = chars.next().ok_or_else(malformed)?;
    let m = take_number(&mut chars).ok_or_else(malformed)?;
    if chars.next().is_some() {
        return Err(malformed());
    }
    if n > 127 || m > 127 {
        return Err(RoomNameError::OutOfRange(name.to_owned()));
    }

    let xx = match horizontal.to_ascii_uppercase() {
        'W' => 127 - n,
        'E' => 128 + n,
        _ => return Err(malformed()),
    };
    let yy = match vertical.to_ascii_uppercase() {
        'N' => 127 - m,
        'S' => 128 + m,
        _ => return Err(malformed()),
    };
    Ok(MapPosition::new(xx as u8, yy as u8))
}

/// Format a map position as a room name.
pub fn format(pos: MapPosition) -> String {
    pos.to_string()
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<u32> {
    let mut value: u32 = 0;
    let mut seen = false;
    while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
        chars.next();
        // Cap instead of overflowing; the range check rejects it anyway.
        value = value.saturating_mul(10).saturating_add(digit);
        seen = true;
    }
    seen.then_some(value)
}

impl FromStr for MapPosition {
    type Err = RoomNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl fmt::Display for MapPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (h, n) = if self.xx <= 127 {
            ('W', 127 - self.xx)
        } else {
            ('E', self.xx - 128)
        };
        let (v, m) = if self.yy <= 127 {
            ('N', 127 - self.yy)
        } else {
            ('S', self.yy - 128)
        };
        write!(f, "{h}{n}{v}{m}")
    }
}
