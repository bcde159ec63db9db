//! Text-pattern advice for learner queries.
//!
//! Every rule is a cheap lexical check over the query text. Rules never
//! fail; a query that does not parse simply skips the rules that need a
//! parse.

mod complexity;

pub use complexity::{complexity_score, Complexity, ComplexityLevel};

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;

static LEADING_WILDCARD_LIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\blike\s*['"]%"#).unwrap());

/// Keywords checked for lowercase spelling.
const STYLE_KEYWORDS: &[&str] = &["select", "from", "where", "join", "group", "order", "having"];

/// Category of a tip, shown as a badge by the frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TipKind {
    BestPractice,
    Performance,
    Readability,
    Warning,
    Correctness,
    Knowledge,
}

impl TipKind {
    fn title(self) -> &'static str {
        match self {
            TipKind::BestPractice => "💡 Best Practice Tip",
            TipKind::Performance => "⚡ Performance Tip",
            TipKind::Readability => "📖 Readability Tip",
            TipKind::Warning => "⚠️ Safety Warning",
            TipKind::Correctness => "🔍 Correctness Tip",
            TipKind::Knowledge => "📚 Knowledge Tip",
        }
    }
}

/// A single piece of advice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tip {
    #[serde(rename = "type")]
    pub kind: TipKind,
    pub title: String,
    pub message: String,
}

impl Tip {
    fn new(kind: TipKind, message: &str) -> Self {
        Self {
            kind,
            title: kind.title().to_string(),
            message: message.to_string(),
        }
    }
}

/// Run every rule over `query` and collect the tips that apply, in rule order.
pub fn analyze_query(query: &str) -> Vec<Tip> {
    let text = query.trim();
    let lower = text.to_lowercase();
    let parses = parses(text);
    let mut tips = Vec::new();

    if lower.contains("select *") || lower.contains("select*") {
        tips.push(Tip::new(
            TipKind::BestPractice,
            "Avoid using `SELECT *` in production code. Explicitly naming your columns makes \
             the query more readable, maintainable, and less prone to breaking if the table \
             schema changes. It also reduces network overhead by only retrieving the data you need.",
        ));
    }

    if LEADING_WILDCARD_LIKE.is_match(text) {
        tips.push(Tip::new(
            TipKind::Performance,
            "Using a wildcard `%` at the beginning of a `LIKE` pattern (e.g., `LIKE '%text'`) \
             prevents the database from using indexes, which can lead to slow performance on \
             large tables. Consider using full-text search features or restructuring your query \
             if possible.",
        ));
    }

    if parses && has_lowercase_keyword(text, &lower) {
        tips.push(Tip::new(
            TipKind::Readability,
            "It's a common SQL convention to write keywords (SELECT, FROM, WHERE, JOIN, etc.) in \
             uppercase to make queries easier to read and maintain. This helps distinguish \
             keywords from table and column names.",
        ));
    }

    if (lower.contains("update ") || lower.contains("delete ")) && !lower.contains("where") {
        tips.push(Tip::new(
            TipKind::Warning,
            "UPDATE or DELETE without a WHERE clause will affect ALL rows in the table! This is \
             rarely what you want. Always use a WHERE clause to specify which rows should be \
             modified.",
        ));
    }

    if lower.contains("not in") {
        tips.push(Tip::new(
            TipKind::Correctness,
            "Be careful with `NOT IN` when the subquery might return NULL values. NULLs can cause \
             unexpected behavior. Consider using `NOT EXISTS` or `LEFT JOIN ... WHERE ... IS NULL` \
             instead.",
        ));
    }

    let joins = lower.matches("join").count();
    let explicit_joins: usize = ["inner join", "left join", "right join", "full join"]
        .iter()
        .map(|kind| lower.matches(kind).count())
        .sum();
    if joins > 1 && explicit_joins < joins {
        tips.push(Tip::new(
            TipKind::BestPractice,
            "When using multiple JOINs, explicitly specify the JOIN type (INNER, LEFT, RIGHT) for \
             each one. This makes your intent clear and helps prevent errors. While 'JOIN' \
             defaults to INNER JOIN, being explicit improves readability.",
        ));
    }

    if lower.contains("count(") && !lower.contains("count(*)") {
        tips.push(Tip::new(
            TipKind::Knowledge,
            "Remember: `COUNT(column_name)` counts non-NULL values in that column, while \
             `COUNT(*)` counts all rows regardless of NULL values. Choose based on your specific \
             needs.",
        ));
    }

    if lower.contains("order by") && !lower.contains("limit") && !lower.contains("top") {
        tips.push(Tip::new(
            TipKind::Performance,
            "If you're only interested in the top N results, add a LIMIT clause. Sorting the \
             entire result set and then only using a few rows is inefficient. For example: \
             `ORDER BY salary DESC LIMIT 10`.",
        ));
    }

    if lower.contains("from") && lower.contains("join") && parses && !has_short_alias(text) {
        tips.push(Tip::new(
            TipKind::Readability,
            "When joining tables, use short table aliases (e.g., `FROM employees e JOIN \
             departments d`) to make your query more concise and easier to read, especially when \
             referencing columns.",
        ));
    }

    if lower.contains("join")
        && lower.contains("select")
        && !lower.contains("select *")
        && has_unqualified_column(&lower)
    {
        tips.push(Tip::new(
            TipKind::BestPractice,
            "When joining tables, qualify column names with their table name or alias (e.g., \
             `e.name` instead of just `name`). This prevents ambiguity and makes it clear which \
             table each column comes from.",
        ));
    }

    tips
}

fn parses(text: &str) -> bool {
    Parser::parse_sql(&SQLiteDialect {}, text).is_ok_and(|statements| !statements.is_empty())
}

/// True when some style keyword is written in lowercase at its first occurrence.
fn has_lowercase_keyword(text: &str, lower: &str) -> bool {
    STYLE_KEYWORDS.iter().any(|keyword| {
        lower
            .find(keyword)
            .and_then(|at| text.get(at..at + keyword.len()))
            .is_some_and(|original| original == *keyword)
    })
}

/// Any single-letter word counts as a table alias.
fn has_short_alias(text: &str) -> bool {
    text.split_whitespace()
        .any(|word| word.chars().count() == 1 && word.chars().all(char::is_alphabetic))
}

/// Whether a SELECT-list item is neither qualified nor aliased.
fn has_unqualified_column(lower: &str) -> bool {
    let head = lower.split("from").next().unwrap_or_default();
    head.replace("select", "")
        .trim()
        .split(',')
        .map(str::trim)
        .any(|column| !column.contains('.') && !column.contains(" as ") && column != "*")
}
