use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Item;

/// Scan direction over a sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }

    pub fn is_forward(&self) -> bool {
        matches!(self, Direction::Asc)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    /// Parses `asc` or `desc`, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(Direction::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(Direction::Desc)
        } else {
            Err(format!("unknown direction `{s}`"))
        }
    }
}

/// Where a query reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryTarget {
    /// One primary partition, ordered by sort key.
    Table {
        pk: String,
        sk_begins_with: Option<String>,
    },
    /// One secondary partition, ordered by the secondary sort value.
    Index { gsi1pk: String },
}

/// Builder for item queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemQuery {
    pub target: QueryTarget,
    pub direction: Direction,
    pub limit: Option<usize>,
}

impl ItemQuery {
    /// Queries a primary partition.
    pub fn table(pk: impl Into<String>) -> Self {
        Self {
            target: QueryTarget::Table {
                pk: pk.into(),
                sk_begins_with: None,
            },
            direction: Direction::Asc,
            limit: None,
        }
    }

    /// Queries a secondary partition.
    pub fn index(gsi1pk: impl Into<String>) -> Self {
        Self {
            target: QueryTarget::Index {
                gsi1pk: gsi1pk.into(),
            },
            direction: Direction::Asc,
            limit: None,
        }
    }

    /// Restricts a primary-partition query to sort keys with this prefix.
    /// Has no effect on secondary-partition queries.
    pub fn sort_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        if let QueryTarget::Table { sk_begins_with, .. } = &mut self.target {
            *sk_begins_with = Some(prefix.into());
        }
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn descending(self) -> Self {
        self.direction(Direction::Desc)
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Result of a query.
///
/// `items` is `None` when the engine returned no collection at all, which
/// callers treat the same as an empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOutput {
    pub items: Option<Vec<Item>>,
}

impl QueryOutput {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items: Some(items) }
    }

    pub fn absent() -> Self {
        Self { items: None }
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items.unwrap_or_default()
    }
}
