use crate::catalog::Column;
use serde::Serialize;
use std::fmt;

//==============================================================================
// Field Values
//==============================================================================

/// Expected shape of an extracted value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValueKind {
    Text,
    Number,
}

/// Why a field has no value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Missing {
    SheetNotFound,
    AnchorNotFound,
    KeywordNotFound,
}

impl Missing {
    /// Text written into the Results sheet in place of the value
    pub fn display_text(self) -> &'static str {
        match self {
            Missing::SheetNotFound => "Sheet Not Found",
            Missing::AnchorNotFound => "Anchor Not Found",
            Missing::KeywordNotFound => "TIDAK DITEMUKAN",
        }
    }
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_text())
    }
}

/// Outcome of extracting one field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    /// Formula column; the composer writes the formula
    Pending,
    Missing(Missing),
}

impl FieldValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing(_))
    }
}

//==============================================================================
// Extracted Records
//==============================================================================

/// One source file's values, in catalog order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedRecord {
    /// File the record came from
    pub source: String,
    pub values: Vec<(Column, FieldValue)>,
}

impl ExtractedRecord {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            values: Vec::new(),
        }
    }

    pub fn push(&mut self, column: Column, value: FieldValue) {
        self.values.push((column, value));
    }

    pub fn get(&self, column: Column) -> Option<&FieldValue> {
        self.values
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, v)| v)
    }

    /// Labels in record order
    pub fn labels(&self) -> Vec<&'static str> {
        self.values.iter().map(|(c, _)| c.label()).collect()
    }

    /// Fields that could not be located
    pub fn missing(&self) -> impl Iterator<Item = (Column, Missing)> + '_ {
        self.values.iter().filter_map(|(c, v)| match v {
            FieldValue::Missing(m) => Some((*c, *m)),
            _ => None,
        })
    }
}
