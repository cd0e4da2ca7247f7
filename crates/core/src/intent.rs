use serde::Serialize;
use serde_json::json;

use crate::cell::{CellCode, ComethDirection, SoloonColor};

/// The three object classes the megaverse service can place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Polyanet,
    Soloon,
    Cometh,
}

impl ObjectKind {
    /// API path segment for this object class.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Polyanet => "polyanets",
            Self::Soloon => "soloons",
            Self::Cometh => "comeths",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Polyanet => write!(f, "polyanet"),
            Self::Soloon => write!(f, "soloon"),
            Self::Cometh => write!(f, "cometh"),
        }
    }
}

/// An object together with its type-specific attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AstralObject {
    Polyanet,
    Soloon { color: SoloonColor },
    Cometh { direction: ComethDirection },
}

impl AstralObject {
    /// `None` for cells that place nothing.
    pub fn from_cell(cell: &CellCode) -> Option<Self> {
        match cell {
            CellCode::Polyanet => Some(Self::Polyanet),
            CellCode::Soloon(color) => Some(Self::Soloon { color: *color }),
            CellCode::Cometh(direction) => Some(Self::Cometh { direction: *direction }),
            CellCode::Space | CellCode::Unknown(_) => None,
        }
    }

    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Polyanet => ObjectKind::Polyanet,
            Self::Soloon { .. } => ObjectKind::Soloon,
            Self::Cometh { .. } => ObjectKind::Cometh,
        }
    }

    /// Wire value of the attribute, lower-case.
    pub fn attribute(&self) -> Option<&'static str> {
        match self {
            Self::Polyanet => None,
            Self::Soloon { color } => Some(color.as_str()),
            Self::Cometh { direction } => Some(direction.as_str()),
        }
    }
}

/// "Create this object at (row, column)". Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ObjectIntent {
    pub row: usize,
    pub column: usize,
    #[serde(flatten)]
    pub object: AstralObject,
}

impl ObjectIntent {
    pub fn new(row: usize, column: usize, object: AstralObject) -> Self {
        Self { row, column, object }
    }

    pub fn kind(&self) -> ObjectKind {
        self.object.kind()
    }

    pub fn endpoint(&self) -> &'static str {
        self.kind().endpoint()
    }

    /// Request body for `POST /{endpoint}`.
    pub fn payload(&self, candidate_id: &str) -> serde_json::Value {
        let mut body = json!({
            "candidateId": candidate_id,
            "row": self.row,
            "column": self.column,
        });
        match self.object {
            AstralObject::Polyanet => {}
            AstralObject::Soloon { color } => {
                body["color"] = json!(color.as_str());
            }
            AstralObject::Cometh { direction } => {
                body["direction"] = json!(direction.as_str());
            }
        }
        body
    }

    /// Short label for log lines, e.g. `soloon(blue) at (1, 1)`.
    pub fn label(&self) -> String {
        match self.object.attribute() {
            Some(attr) => format!("{}({}) at ({}, {})", self.kind(), attr, self.row, self.column),
            None => format!("{} at ({}, {})", self.kind(), self.row, self.column),
        }
    }
}

/// Positional delete. Only Polyanets support deletion by coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClearIntent {
    pub row: usize,
    pub column: usize,
}

impl ClearIntent {
    pub fn endpoint(&self) -> &'static str {
        ObjectKind::Polyanet.endpoint()
    }

    /// Request body for `DELETE /polyanets`.
    pub fn payload(&self, candidate_id: &str) -> serde_json::Value {
        json!({
            "candidateId": candidate_id,
            "row": self.row,
            "column": self.column,
        })
    }
}
