//! Rough complexity scoring of a query.

use serde::Serialize;

const AGGREGATE_CALLS: &[&str] = &["count(", "sum(", "avg(", "max(", "min("];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComplexityLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl ComplexityLevel {
    fn from_score(score: u32) -> Self {
        match score {
            0..=2 => ComplexityLevel::Beginner,
            3..=5 => ComplexityLevel::Intermediate,
            6..=8 => ComplexityLevel::Advanced,
            _ => ComplexityLevel::Expert,
        }
    }
}

/// Score plus the human-readable factors that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Complexity {
    pub score: u32,
    pub level: ComplexityLevel,
    pub factors: Vec<String>,
}

pub fn complexity_score(query: &str) -> Complexity {
    let lower = query.to_lowercase();
    let mut score = 1;
    let mut factors = vec!["Basic SELECT: +1".to_string()];

    if lower.contains("where") {
        score += 1;
        factors.push("WHERE clause: +1".to_string());
    }

    let joins = lower.matches("join").count() as u32;
    if joins > 0 {
        score += joins * 2;
        factors.push(format!("JOINs ({}): +{}", joins, joins * 2));
    }

    if lower.contains("group by") {
        score += 2;
        factors.push("GROUP BY: +2".to_string());
    }

    if lower.contains("having") {
        score += 2;
        factors.push("HAVING: +2".to_string());
    }

    if lower.contains("order by") {
        score += 1;
        factors.push("ORDER BY: +1".to_string());
    }

    let aggregates = AGGREGATE_CALLS
        .iter()
        .map(|call| lower.matches(call).count() as u32)
        .sum::<u32>();
    if aggregates > 0 {
        score += aggregates;
        factors.push(format!("Aggregate functions ({}): +{}", aggregates, aggregates));
    }

    Complexity {
        score,
        level: ComplexityLevel::from_score(score),
        factors,
    }
}
