//! Goal cell grammar.
//!
//! A goal cell is `TYPE` or `TYPE_ATTRIBUTE` (case-insensitive). The live
//! service also emits the attribute first (`BLUE_SOLOON`, `UP_COMETH`), so
//! both orders decode to the same variant.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Soloon colors accepted by the `/soloons` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoloonColor {
    Blue,
    Red,
    Purple,
    White,
}

impl SoloonColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blue => "blue",
            Self::Red => "red",
            Self::Purple => "purple",
            Self::White => "white",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blue" => Some(Self::Blue),
            "red" => Some(Self::Red),
            "purple" => Some(Self::Purple),
            "white" => Some(Self::White),
            _ => None,
        }
    }
}

impl fmt::Display for SoloonColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cometh directions accepted by the `/comeths` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComethDirection {
    Up,
    Down,
    Left,
    Right,
}

impl ComethDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

impl fmt::Display for ComethDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded form of one goal cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellCode {
    /// `SPACE` or an empty string.
    Space,
    Polyanet,
    Soloon(SoloonColor),
    Cometh(ComethDirection),
    /// Anything else, including a Soloon/Cometh with a bad attribute.
    /// Carries the raw cell text for diagnostics.
    Unknown(String),
}

impl CellCode {
    /// True for cells that produce no object.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Space | Self::Unknown(_))
    }
}

/// Decode one goal cell string.
pub fn parse_cell(raw: &str) -> CellCode {
    let cell = raw.trim();
    if cell.is_empty() {
        return CellCode::Space;
    }

    let upper = cell.to_ascii_uppercase();
    let (head, tail) = match upper.split_once('_') {
        Some((head, tail)) => (head, Some(tail)),
        None => (upper.as_str(), None),
    };

    match (head, tail) {
        ("SPACE", None) => CellCode::Space,
        // Trailing attributes on a Polyanet carry no meaning; the object is still placed.
        ("POLYANET", _) => CellCode::Polyanet,
        ("SOLOON", Some(attr)) => soloon(attr, cell),
        ("COMETH", Some(attr)) => cometh(attr, cell),
        (attr, Some("SOLOON")) => soloon(attr, cell),
        (attr, Some("COMETH")) => cometh(attr, cell),
        _ => CellCode::Unknown(cell.to_string()),
    }
}

fn soloon(attr: &str, raw: &str) -> CellCode {
    SoloonColor::parse(attr)
        .map(CellCode::Soloon)
        .unwrap_or_else(|| CellCode::Unknown(raw.to_string()))
}

fn cometh(attr: &str, raw: &str) -> CellCode {
    ComethDirection::parse(attr)
        .map(CellCode::Cometh)
        .unwrap_or_else(|| CellCode::Unknown(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_types() {
        assert_eq!(parse_cell("POLYANET"), CellCode::Polyanet);
        assert_eq!(parse_cell("SPACE"), CellCode::Space);
        assert_eq!(parse_cell(""), CellCode::Space);
        assert_eq!(parse_cell("   "), CellCode::Space);
    }

    #[test]
    fn test_parse_type_then_attribute() {
        assert_eq!(parse_cell("SOLOON_BLUE"), CellCode::Soloon(SoloonColor::Blue));
        assert_eq!(parse_cell("COMETH_UP"), CellCode::Cometh(ComethDirection::Up));
    }

    #[test]
    fn test_parse_attribute_then_type() {
        assert_eq!(parse_cell("PURPLE_SOLOON"), CellCode::Soloon(SoloonColor::Purple));
        assert_eq!(parse_cell("LEFT_COMETH"), CellCode::Cometh(ComethDirection::Left));
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(parse_cell("polyanet"), CellCode::Polyanet);
        assert_eq!(parse_cell("Soloon_White"), CellCode::Soloon(SoloonColor::White));
        assert_eq!(parse_cell("cometh_down"), CellCode::Cometh(ComethDirection::Down));
    }

    #[test]
    fn test_polyanet_ignores_attribute() {
        assert_eq!(parse_cell("POLYANET_RED"), CellCode::Polyanet);
    }

    #[test]
    fn test_unknown_cells() {
        assert_eq!(parse_cell("ASTEROID"), CellCode::Unknown("ASTEROID".into()));
        // Soloon without a color, Cometh with a bad direction
        assert_eq!(parse_cell("SOLOON"), CellCode::Unknown("SOLOON".into()));
        assert_eq!(parse_cell("COMETH_SIDEWAYS"), CellCode::Unknown("COMETH_SIDEWAYS".into()));
        assert!(parse_cell("SPACE_X").is_empty());
    }

    #[test]
    fn test_attribute_strings_are_lowercase() {
        assert_eq!(SoloonColor::Red.to_string(), "red");
        assert_eq!(ComethDirection::Right.to_string(), "right");
        assert_eq!(serde_json::to_value(SoloonColor::Blue).unwrap(), "blue");
    }
}
