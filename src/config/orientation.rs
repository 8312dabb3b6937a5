// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::str::FromStr;

const AXIS_PAIRS: [(char, char); 3] = [('L', 'R'), ('A', 'P'), ('S', 'I')];

/// Three-letter anatomical orientation code such as `PIR` or `RAS`.
///
/// Each letter names the direction an image axis increases towards; every
/// anatomical axis (left/right, anterior/posterior, superior/inferior) must
/// appear exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Orientation([char; 3]);

impl Orientation {
    pub fn letters(&self) -> [char; 3] {
        self.0
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        let letters: Vec<char> = code.trim().chars().map(|c| c.to_ascii_uppercase()).collect();
        if letters.len() != 3 {
            return Err(format!("expected 3 letters, found {}", letters.len()));
        }

        let mut seen = [false; 3];
        for &letter in &letters {
            let pair = AXIS_PAIRS
                .iter()
                .position(|(a, b)| letter == *a || letter == *b)
                .ok_or_else(|| format!("'{}' is not one of L, R, A, P, S, I", letter))?;
            if seen[pair] {
                let (a, b) = AXIS_PAIRS[pair];
                return Err(format!("axis {}/{} appears more than once", a, b));
            }
            seen[pair] = true;
        }

        Ok(Orientation([letters[0], letters[1], letters[2]]))
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|c| write!(f, "{}", c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_codes_in_any_case() {
        assert_eq!("PIR".parse::<Orientation>().unwrap().to_string(), "PIR");
        assert_eq!("ras".parse::<Orientation>().unwrap().letters(), ['R', 'A', 'S']);
    }

    #[test]
    fn rejects_wrong_length() {
        assert_eq!(
            "PI".parse::<Orientation>().unwrap_err(),
            "expected 3 letters, found 2"
        );
    }

    #[test]
    fn rejects_unknown_letters_and_repeated_axes() {
        assert!("PIX".parse::<Orientation>().unwrap_err().contains("'X'"));
        assert!("LRS"
            .parse::<Orientation>()
            .unwrap_err()
            .contains("axis L/R appears more than once"));
    }
}
