//! Rendering of step titles and descriptions.

use crate::query::{ClauseKind, QueryStructure};
use crate::store::QueryResult;

use super::{StepKind, VisualizationStep};

pub(super) fn title(number: usize, clause: ClauseKind) -> String {
    match clause {
        ClauseKind::Join => format!("Step {}: JOIN Operation", number),
        other => format!("Step {}: {} Clause", number, other.label()),
    }
}

pub(super) fn describe(clause: ClauseKind, structure: &QueryStructure) -> String {
    match clause {
        ClauseKind::From => format!(
            "Starting with all rows from the '{}' table.",
            structure.driving_table().unwrap_or_default()
        ),
        ClauseKind::Join => match structure.joins.first() {
            Some(join) => {
                let mut desc = format!("{} JOIN with {}", join.kind, join.target_table);
                if let Some(condition) = &join.condition {
                    desc.push_str(" ON ");
                    desc.push_str(condition);
                }
                desc
            }
            None => String::new(),
        },
        ClauseKind::Where => format!(
            "Filtering rows where: {}",
            structure.filter.as_deref().unwrap_or_default()
        ),
        ClauseKind::GroupBy => {
            let mut desc = format!("Grouping by {}", structure.group_by.join(", "));
            let aggregates = structure.aggregate_columns();
            if !aggregates.is_empty() {
                desc.push_str(" and calculating: ");
                desc.push_str(&aggregates.join(", "));
            }
            desc
        }
        ClauseKind::Having => format!(
            "Filtering groups where: {}",
            structure.group_filter.as_deref().unwrap_or_default()
        ),
        ClauseKind::Select => format!("Selecting columns: {}", structure.projection.join(", ")),
        ClauseKind::OrderBy => {
            let items: Vec<String> = structure
                .order_by
                .iter()
                .map(|item| format!("{} {}", item.column, item.direction.as_str()))
                .collect();
            format!("Sorting results by: {}", items.join(", "))
        }
    }
}

pub(super) fn clause_step(
    number: usize,
    clause: ClauseKind,
    structure: &QueryStructure,
    result: &QueryResult,
) -> VisualizationStep {
    VisualizationStep {
        title: title(number, clause),
        description: describe(clause, structure),
        rows: result.row_maps(),
        clause: StepKind::Clause(clause),
    }
}

pub(super) fn fallback_step(result: &QueryResult) -> VisualizationStep {
    VisualizationStep {
        title: "Step 1: Query Results".to_string(),
        description: "Final query results (detailed visualization unavailable)".to_string(),
        rows: result.row_maps(),
        clause: StepKind::Result,
    }
}
