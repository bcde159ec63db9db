//! Structural extraction of clause pieces from a parsed query.
//!
//! Extraction never fails. A clause that is not present simply yields an
//! empty list or `None`; absence is what tells the step sequencer to skip it.

use std::ops::ControlFlow;

use serde::Serialize;
use sqlparser::ast::{
    visit_relations, GroupByExpr, JoinConstraint, JoinOperator, ObjectName, Query, SelectItem,
    SetExpr, TableFactor, TableWithJoins,
};

use super::clause::ClauseKind;
use super::parse::ParsedQuery;

/// Function names that mark a projected expression as an aggregate.
const AGGREGATE_FUNCTIONS: &[&str] = &["COUNT", "SUM", "AVG", "MAX", "MIN"];

/// One JOIN of the top-level FROM clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinDescriptor {
    /// Join kind keyword, `INNER` when the query says plain `JOIN`.
    pub kind: String,
    /// Joined table name, or the rendered factor for derived tables.
    pub target_table: String,
    /// `ON` expression or `USING (...)` text.
    pub condition: Option<String>,
}

/// Sort direction of an ORDER BY item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// One ORDER BY item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDescriptor {
    pub column: String,
    pub direction: SortDirection,
}

/// Everything the step sequencer needs to know about a query's clauses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryStructure {
    /// Distinct referenced tables, FROM clauses first; the first is the
    /// driving table.
    pub tables: Vec<String>,
    pub joins: Vec<JoinDescriptor>,
    /// WHERE predicate text.
    pub filter: Option<String>,
    pub group_by: Vec<String>,
    /// HAVING predicate text.
    pub group_filter: Option<String>,
    pub order_by: Vec<OrderDescriptor>,
    /// Rendered SELECT list items.
    pub projection: Vec<String>,
}

impl QueryStructure {
    /// The first referenced table, subject of the FROM step.
    pub fn driving_table(&self) -> Option<&str> {
        self.tables.first().map(String::as_str)
    }

    /// Whether the query carries the given clause.
    ///
    /// SELECT counts as present only when the projection is something other
    /// than a bare `*`.
    pub fn has(&self, clause: ClauseKind) -> bool {
        match clause {
            ClauseKind::From => !self.tables.is_empty(),
            ClauseKind::Join => !self.joins.is_empty(),
            ClauseKind::Where => self.filter.is_some(),
            ClauseKind::GroupBy => !self.group_by.is_empty(),
            ClauseKind::Having => self.group_filter.is_some(),
            ClauseKind::Select => !self.projection.is_empty() && !self.is_wildcard_projection(),
            ClauseKind::OrderBy => !self.order_by.is_empty(),
        }
    }

    /// Present clauses in canonical order.
    pub fn present_clauses(&self) -> Vec<ClauseKind> {
        ClauseKind::CANONICAL
            .into_iter()
            .filter(|clause| self.has(*clause))
            .collect()
    }

    /// The most specific clause before SELECT that the query carries.
    ///
    /// This is the truncation boundary used for the SELECT step.
    pub fn last_clause_before_select(&self) -> Option<ClauseKind> {
        ClauseKind::CANONICAL
            .into_iter()
            .filter(|clause| *clause < ClauseKind::Select)
            .rev()
            .find(|clause| self.has(*clause))
    }

    /// True when the SELECT list is exactly `*`.
    pub fn is_wildcard_projection(&self) -> bool {
        matches!(self.projection.as_slice(), [only] if only == "*")
    }

    /// Projected expressions that call an aggregate function.
    pub fn aggregate_columns(&self) -> Vec<&str> {
        self.projection
            .iter()
            .filter(|column| {
                let upper = column.to_uppercase();
                AGGREGATE_FUNCTIONS.iter().any(|agg| upper.contains(agg))
            })
            .map(String::as_str)
            .collect()
    }
}

/// Extract clause pieces from `parsed`.
pub fn extract(parsed: &ParsedQuery) -> QueryStructure {
    let query = parsed.query();
    let mut structure = QueryStructure::default();

    structure.tables = collect_tables(query);

    if let Some(order_by) = &query.order_by {
        structure.order_by = order_by
            .exprs
            .iter()
            .map(|item| OrderDescriptor {
                column: item.expr.to_string(),
                direction: match item.asc {
                    Some(false) => SortDirection::Desc,
                    _ => SortDirection::Asc,
                },
            })
            .collect();
    }

    let Some(select) = parsed.select() else {
        return structure;
    };

    structure.joins = select
        .from
        .iter()
        .flat_map(|twj| twj.joins.iter())
        .map(|join| JoinDescriptor {
            kind: join_kind(&join.join_operator).to_string(),
            target_table: factor_name(&join.relation),
            condition: join_constraint(&join.join_operator).and_then(render_constraint),
        })
        .collect();

    structure.filter = select.selection.as_ref().map(ToString::to_string);
    structure.group_by = match &select.group_by {
        GroupByExpr::Expressions(exprs, _) => exprs.iter().map(ToString::to_string).collect(),
        GroupByExpr::All(_) => vec!["ALL".to_string()],
    };
    structure.group_filter = select.having.as_ref().map(ToString::to_string);
    structure.projection = select.projection.iter().map(render_select_item).collect();

    structure
}

// ============================================================================
// Table traversal
// ============================================================================

/// FROM-clause tables come first, in join order, so the outermost FROM
/// relation drives. Every other reference (CTE bodies, projections,
/// predicates, function arguments) follows in tree order. Each name is
/// listed once.
fn collect_tables(query: &Query) -> Vec<String> {
    let mut tables = Vec::new();
    collect_query_tables(query, &mut tables);

    let _ = visit_relations(query, |relation: &ObjectName| {
        push_unique(&mut tables, object_name(relation));
        ControlFlow::<()>::Continue(())
    });

    tables
}

fn collect_query_tables(query: &Query, out: &mut Vec<String>) {
    collect_set_expr_tables(&query.body, out);
}

fn collect_set_expr_tables(body: &SetExpr, out: &mut Vec<String>) {
    match body {
        SetExpr::Select(select) => {
            for twj in &select.from {
                collect_table_with_joins(twj, out);
            }
        }
        SetExpr::Query(inner) => collect_query_tables(inner, out),
        SetExpr::SetOperation { left, right, .. } => {
            collect_set_expr_tables(left, out);
            collect_set_expr_tables(right, out);
        }
        _ => {}
    }
}

fn collect_table_with_joins(twj: &TableWithJoins, out: &mut Vec<String>) {
    collect_factor_tables(&twj.relation, out);
    for join in &twj.joins {
        collect_factor_tables(&join.relation, out);
    }
}

fn collect_factor_tables(factor: &TableFactor, out: &mut Vec<String>) {
    match factor {
        TableFactor::Table { name, .. } => push_unique(out, object_name(name)),
        TableFactor::Derived { subquery, .. } => collect_query_tables(subquery, out),
        TableFactor::NestedJoin {
            table_with_joins, ..
        } => collect_table_with_joins(table_with_joins, out),
        _ => {}
    }
}

fn push_unique(out: &mut Vec<String>, name: String) {
    if !out.contains(&name) {
        out.push(name);
    }
}

// ============================================================================
// Rendering helpers
// ============================================================================

/// Plain table name for table references, rendered text otherwise.
fn factor_name(factor: &TableFactor) -> String {
    match factor {
        TableFactor::Table { name, .. } => object_name(name),
        other => other.to_string(),
    }
}

/// Unqualified name: the last part of `schema.table`.
fn object_name(name: &ObjectName) -> String {
    name.0
        .last()
        .map(|ident| ident.value.clone())
        .unwrap_or_else(|| name.to_string())
}

fn join_kind(operator: &JoinOperator) -> &'static str {
    match operator {
        JoinOperator::Inner(_) => "INNER",
        JoinOperator::LeftOuter(_) => "LEFT",
        JoinOperator::RightOuter(_) => "RIGHT",
        JoinOperator::FullOuter(_) => "FULL",
        JoinOperator::CrossJoin => "CROSS",
        JoinOperator::LeftSemi(_) => "LEFT SEMI",
        JoinOperator::RightSemi(_) => "RIGHT SEMI",
        JoinOperator::LeftAnti(_) => "LEFT ANTI",
        JoinOperator::RightAnti(_) => "RIGHT ANTI",
        JoinOperator::CrossApply => "CROSS APPLY",
        JoinOperator::OuterApply => "OUTER APPLY",
        _ => "INNER",
    }
}

fn join_constraint(operator: &JoinOperator) -> Option<&JoinConstraint> {
    match operator {
        JoinOperator::Inner(constraint)
        | JoinOperator::LeftOuter(constraint)
        | JoinOperator::RightOuter(constraint)
        | JoinOperator::FullOuter(constraint)
        | JoinOperator::LeftSemi(constraint)
        | JoinOperator::RightSemi(constraint)
        | JoinOperator::LeftAnti(constraint)
        | JoinOperator::RightAnti(constraint) => Some(constraint),
        _ => None,
    }
}

fn render_constraint(constraint: &JoinConstraint) -> Option<String> {
    match constraint {
        JoinConstraint::On(expr) => Some(expr.to_string()),
        JoinConstraint::Using(columns) => {
            let columns: Vec<String> = columns.iter().map(ToString::to_string).collect();
            Some(format!("USING ({})", columns.join(", ")))
        }
        _ => None,
    }
}

fn render_select_item(item: &SelectItem) -> String {
    match item {
        SelectItem::UnnamedExpr(expr) => expr.to_string(),
        SelectItem::ExprWithAlias { expr, alias } => format!("{} AS {}", expr, alias),
        other => other.to_string(),
    }
}
