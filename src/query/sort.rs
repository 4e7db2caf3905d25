//! Sort order of a list query.

use serde::{Deserialize, Serialize};

use crate::error::VitrineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

enum_display_fromstr!(
    SortDirection,
    |s| VitrineError::InvalidInput(format!("unknown sort direction '{s}', expected asc or desc")),
    {
        Asc => "asc" | "ascending",
        Desc => "desc" | "descending",
    }
);

/// A sortable field and its direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }
}

/// A sort as typed on the command line: `field` or `field:dir`. A bare field
/// leaves the direction to the list's default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: Option<SortDirection>,
}

impl SortSpec {
    pub fn resolve(&self, default_direction: SortDirection) -> Sort {
        Sort::new(
            self.field.clone(),
            self.direction.unwrap_or(default_direction),
        )
    }
}

impl std::str::FromStr for SortSpec {
    type Err = VitrineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = match s.split_once(':') {
            Some((field, dir)) => (field.trim(), Some(dir.parse()?)),
            None => (s.trim(), None),
        };
        if field.is_empty() {
            return Err(VitrineError::InvalidInput(format!(
                "sort '{s}' is missing a field name"
            )));
        }
        Ok(SortSpec {
            field: field.to_string(),
            direction,
        })
    }
}
