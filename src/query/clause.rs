//! Logical clause kinds in canonical evaluation order.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A logical clause of a SELECT statement.
///
/// The derived ordering is the conceptual evaluation order
/// `FROM < JOIN < WHERE < GROUP BY < HAVING < SELECT < ORDER BY`, which is
/// not the lexical order of the query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClauseKind {
    #[serde(rename = "FROM")]
    From,
    #[serde(rename = "JOIN")]
    Join,
    #[serde(rename = "WHERE")]
    Where,
    #[serde(rename = "GROUP BY")]
    GroupBy,
    #[serde(rename = "HAVING")]
    Having,
    #[serde(rename = "SELECT")]
    Select,
    #[serde(rename = "ORDER BY")]
    OrderBy,
}

impl ClauseKind {
    /// All clause kinds in canonical order.
    pub const CANONICAL: [ClauseKind; 7] = [
        ClauseKind::From,
        ClauseKind::Join,
        ClauseKind::Where,
        ClauseKind::GroupBy,
        ClauseKind::Having,
        ClauseKind::Select,
        ClauseKind::OrderBy,
    ];

    /// SQL keyword label, e.g. `GROUP BY`.
    pub fn label(self) -> &'static str {
        match self {
            ClauseKind::From => "FROM",
            ClauseKind::Join => "JOIN",
            ClauseKind::Where => "WHERE",
            ClauseKind::GroupBy => "GROUP BY",
            ClauseKind::Having => "HAVING",
            ClauseKind::Select => "SELECT",
            ClauseKind::OrderBy => "ORDER BY",
        }
    }

    /// Clauses that come strictly after `self` in canonical order.
    pub fn following(self) -> impl Iterator<Item = ClauseKind> {
        Self::CANONICAL.into_iter().filter(move |c| *c > self)
    }
}

impl fmt::Display for ClauseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
