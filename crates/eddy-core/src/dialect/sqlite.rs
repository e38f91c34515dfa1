//! The SQLite dialect.
//!
//! Rendering rules: double-quoted identifiers, `?` placeholders,
//! null-safe `IS`/`IS NOT` for equality operators, and a final coercion
//! of boolean parameters to integers since SQLite has no boolean literal
//! type. Aliases are assigned per compilation from the reversed table
//! list, so the last table in declaration order is always `a`.

use std::collections::HashMap;

use tracing::debug;

use crate::dialect::Dialect;
use crate::error::{CompileError, Result};
use crate::expr::{Expr, FunctionName};
use crate::join::{Dataset, JoinCondition, JoinDirection, JoinKind};
use crate::predicate::{BinaryOp, Predicate};
use crate::query::{Limit, Query};
use crate::sql::Sql;
use crate::table::{Columns, Table};
use crate::value::Value;

type Aliases = HashMap<String, String>;

/// Bijective base-26 alias for position `i`: 0 → `a`, 25 → `z`,
/// 26 → `aa`, 27 → `ab`, …
fn alias_at(mut i: usize) -> String {
    let mut alias = String::new();
    loop {
        alias.insert(0, char::from(b'a' + (i % 26) as u8));
        if i < 26 {
            break;
        }
        i = i / 26 - 1;
    }
    alias
}

/// Column qualification mode. INSERT/UPDATE/DELETE statements render
/// columns bare; SELECT qualifies them through the alias map.
#[derive(Clone, Copy)]
enum Scope<'a> {
    Aliased(&'a Aliases),
    Bare,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl SqliteDialect {
    pub fn new() -> Self {
        Self
    }

    /// Maps table names to aliases `a, b, …, z, aa, ab, …` over the
    /// reversed declaration order. Aliases never collide, whatever the
    /// table count.
    fn aliases(&self, dataset: &Dataset) -> Aliases {
        dataset
            .tables()
            .into_iter()
            .rev()
            .enumerate()
            .map(|(i, table)| (table.name().to_string(), alias_at(i)))
            .collect()
    }

    fn param(&self, value: Value) -> Sql {
        Sql::with_params("?", vec![value])
    }

    fn quote(&self, identifier: &str) -> String {
        format!("\"{identifier}\"")
    }

    fn render_column(&self, column: &str, table: Option<&str>, escape: bool) -> Sql {
        let col = if escape {
            self.quote(column)
        } else {
            column.to_string()
        };
        match table {
            Some(prefix) => Sql::new(format!("{prefix}.{col}")),
            None => Sql::new(col),
        }
    }

    fn render_table_columns(&self, table: &Table, scope: Scope) -> Sql {
        let prefix = match scope {
            Scope::Aliased(aliases) => Some(
                aliases
                    .get(table.name())
                    .cloned()
                    .unwrap_or_else(|| table.name().to_string()),
            ),
            Scope::Bare => None,
        };
        match table.columns() {
            Columns::All => self.render_column("*", prefix.as_deref(), false),
            Columns::List(names) => Sql::join(
                names
                    .iter()
                    .map(|name| self.render_column(name, prefix.as_deref(), true)),
                ", ",
            ),
        }
    }

    fn render_leaf(&self, expr: &Expr, scope: Scope) -> Result<Sql> {
        match expr {
            Expr::Column(column) => {
                let prefix = match scope {
                    Scope::Aliased(aliases) => Some(
                        aliases
                            .get(column.table().name())
                            .cloned()
                            .unwrap_or_else(|| column.table().name().to_string()),
                    ),
                    Scope::Bare => None,
                };
                Ok(self.render_column(column.name(), prefix.as_deref(), true))
            }
            Expr::Literal(value) => Ok(self.param(value.clone())),
            Expr::Table(table) => Ok(self.render_table_columns(table, scope)),
            Expr::Function { name, args } => {
                let rendered = args
                    .iter()
                    .map(|arg| self.render_leaf(arg, scope))
                    .collect::<Result<Vec<_>>>()?;
                let mut sql = Sql::new(format!("{}(", self.function_name(name)));
                sql.append(Sql::join(rendered, ", "));
                sql.push(")");
                Ok(sql)
            }
            Expr::Tuple(_) => Err(CompileError::UnsupportedExpression(
                "tuple in leaf position".to_string(),
            )),
        }
    }

    fn render_projection(&self, projection: &Expr, scope: Scope) -> Result<Sql> {
        let leaves = projection
            .stripe()
            .into_iter()
            .map(|leaf| self.render_leaf(leaf, scope))
            .collect::<Result<Vec<_>>>()?;
        Ok(Sql::join(leaves, ", "))
    }

    fn render_source_table(&self, table: &Table, aliases: &Aliases) -> Sql {
        match aliases.get(table.name()) {
            Some(alias) => Sql::new(format!("{} as {alias}", self.quote(table.name()))),
            None => Sql::new(self.quote(table.name())),
        }
    }

    fn render_dataset(&self, dataset: &Dataset, aliases: &Aliases) -> Result<Sql> {
        match dataset {
            Dataset::Table(table) => Ok(self.render_source_table(table, aliases)),
            Dataset::Join(join) => {
                let left = self.render_dataset(&join.left, aliases)?;
                let right = self.render_source_table(&join.right, aliases);

                let mut sql = left;
                match &join.kind {
                    JoinKind::Cross => {
                        sql.push(" CROSS JOIN ");
                        sql.append(right);
                    }
                    JoinKind::Inner(JoinCondition::Natural) => {
                        sql.push(" NATURAL JOIN ");
                        sql.append(right);
                    }
                    JoinKind::Inner(condition) => {
                        sql.push(" INNER JOIN ");
                        sql.append(right);
                        sql.append(self.render_join_condition(condition, aliases)?);
                    }
                    JoinKind::Outer(_, JoinCondition::Natural) => {
                        return Err(CompileError::UnsupportedExpression(
                            "natural outer join".to_string(),
                        ));
                    }
                    JoinKind::Outer(direction, condition) => {
                        sql.push(&format!(" {} OUTER JOIN ", self.direction(*direction)));
                        sql.append(right);
                        sql.append(self.render_join_condition(condition, aliases)?);
                    }
                }
                Ok(sql)
            }
        }
    }

    fn render_join_condition(
        &self,
        condition: &JoinCondition,
        aliases: &Aliases,
    ) -> Result<Sql> {
        match condition {
            JoinCondition::Using(columns) => {
                let quoted = columns
                    .iter()
                    .map(|c| self.quote(c))
                    .collect::<Vec<_>>()
                    .join(", ");
                Ok(Sql::new(format!(" USING({quoted})")))
            }
            JoinCondition::On(predicate) => {
                // an absent ON predicate degrades to a literal true
                let on = self
                    .render_predicate(predicate, Scope::Aliased(aliases))?
                    .unwrap_or_else(|| self.param(Value::Bool(true)));
                let mut sql = Sql::new(" ON ");
                sql.append(on);
                Ok(sql)
            }
            JoinCondition::Natural => Ok(Sql::new("")),
        }
    }

    fn render_predicate(&self, predicate: &Predicate, scope: Scope) -> Result<Option<Sql>> {
        match predicate {
            Predicate::Null => Ok(None),
            Predicate::Bool(b) => Ok(Some(self.param(Value::Bool(*b)))),
            Predicate::Comparison { op, a, b } => {
                let a = self.render_leaf(a, scope)?;
                let b = self.render_leaf(b, scope)?;
                Ok(Some(self.render_op(*op, a, b)))
            }
            Predicate::Compound { op, a, b } => {
                let a = self
                    .render_predicate(a, scope)?
                    .unwrap_or_else(|| self.param(Value::Null));
                let b = self
                    .render_predicate(b, scope)?
                    .unwrap_or_else(|| self.param(Value::Null));
                Ok(Some(self.render_op(*op, a, b)))
            }
        }
    }

    fn render_op(&self, op: BinaryOp, a: Sql, b: Sql) -> Sql {
        let spelling = match op {
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
            // IS / IS NOT are null-safe, unlike = / <>
            BinaryOp::Eq => "IS",
            BinaryOp::Neq | BinaryOp::Xor => "IS NOT",
            BinaryOp::Gt => ">",
            BinaryOp::Lt => "<",
            BinaryOp::Gte => ">=",
            BinaryOp::Lte => "<=",
            BinaryOp::Like => "LIKE",
        };
        let mut sql = Sql::new("(");
        sql.append(a);
        sql.push(&format!(" {spelling} "));
        sql.append(b);
        sql.push(")");
        sql
    }

    fn render_limit(&self, limit: Limit) -> String {
        match limit {
            Limit::Rows(rows) => format!("LIMIT {rows}"),
            Limit::OffsetRows { offset, rows } => format!("LIMIT {rows} OFFSET {offset}"),
        }
    }

    fn function_name(&self, name: &FunctionName) -> String {
        match name {
            FunctionName::Upper => "UPPER".to_string(),
            FunctionName::Lower => "LOWER".to_string(),
            FunctionName::Custom(name) => name.clone(),
        }
    }

    fn direction(&self, direction: JoinDirection) -> &'static str {
        match direction {
            JoinDirection::Left => "LEFT",
            JoinDirection::Right => "RIGHT",
            JoinDirection::Full => "FULL",
        }
    }

    /// SQLite has no boolean parameters; rewrite them as 1/0.
    fn coerce_params(&self, mut sql: Sql) -> Sql {
        for param in &mut sql.params {
            if let Value::Bool(b) = param {
                *param = Value::Integer(if *b { 1 } else { 0 });
            }
        }
        sql
    }

    /// Column names for an INSERT/UPDATE target, from the projection's
    /// stripe. `None` means "whole table, omit the column list".
    fn target_columns(&self, projection: &Expr) -> Result<Option<Vec<String>>> {
        if let Expr::Table(table) = projection {
            if matches!(table.columns(), Columns::All) {
                return Ok(None);
            }
        }
        let mut names = Vec::new();
        for leaf in projection.stripe() {
            match leaf {
                Expr::Column(column) => names.push(column.name().to_string()),
                Expr::Table(table) => match table.columns() {
                    Columns::List(list) => names.extend(list.iter().cloned()),
                    Columns::All => {
                        return Err(CompileError::UnsupportedExpression(
                            "whole-table stripe mixed into a column list".to_string(),
                        ))
                    }
                },
                other => {
                    return Err(CompileError::UnsupportedExpression(format!(
                        "{other:?} as an insert/update target"
                    )))
                }
            }
        }
        Ok(Some(names))
    }
}

impl Dialect for SqliteDialect {
    fn proto(&self) -> &'static str {
        "sqlite"
    }

    fn compile_select(&self, query: &Query) -> Result<Sql> {
        let aliases = self.aliases(query.dataset());

        let mut sql = Sql::new("SELECT ");
        sql.append(self.render_projection(query.projection(), Scope::Aliased(&aliases))?);
        sql.push(" FROM ");
        sql.append(self.render_dataset(query.dataset(), &aliases)?);

        if let Some(filter) =
            self.render_predicate(query.predicate(), Scope::Aliased(&aliases))?
        {
            sql.push(" WHERE ");
            sql.append(filter);
        }

        if let Some(limit) = query.limit() {
            sql.push(" ");
            sql.push(&self.render_limit(limit));
        }

        let sql = self.coerce_params(sql);
        debug!(params = sql.params.len(), "compiled select: {}", sql.text);
        Ok(sql)
    }

    fn compile_insert(
        &self,
        table: &Table,
        projection: &Expr,
        rows: &[Vec<Value>],
    ) -> Result<Sql> {
        if rows.is_empty() {
            return Err(CompileError::UnsupportedExpression(
                "insert of zero rows".to_string(),
            ));
        }
        let columns = self.target_columns(projection)?;
        if let Some(columns) = &columns {
            if let Some(row) = rows.iter().find(|row| row.len() != columns.len()) {
                return Err(CompileError::UnsupportedExpression(format!(
                    "insert row with {} values for {} columns",
                    row.len(),
                    columns.len()
                )));
            }
        }

        let mut sql = Sql::new(format!("INSERT INTO {}", self.quote(table.name())));
        if let Some(columns) = columns {
            let quoted = columns
                .iter()
                .map(|c| self.quote(c))
                .collect::<Vec<_>>()
                .join(", ");
            sql.push(&format!(" ({quoted})"));
        }
        sql.push(" VALUES ");

        let tuples = rows.iter().map(|row| {
            let mut tuple = Sql::new("(");
            tuple.append(Sql::join(
                row.iter().map(|value| self.param(value.clone())),
                ", ",
            ));
            tuple.push(")");
            tuple
        });
        sql.append(Sql::join(tuples, ", "));

        let sql = self.coerce_params(sql);
        debug!(params = sql.params.len(), "compiled insert: {}", sql.text);
        Ok(sql)
    }

    fn compile_update(
        &self,
        table: &Table,
        projection: &Expr,
        values: &[Value],
        predicate: &Predicate,
    ) -> Result<Sql> {
        let columns = self.target_columns(projection)?.ok_or_else(|| {
            CompileError::UnsupportedExpression(
                "update requires an explicit column list".to_string(),
            )
        })?;
        if columns.len() != values.len() {
            return Err(CompileError::UnsupportedExpression(format!(
                "update with {} values for {} columns",
                values.len(),
                columns.len()
            )));
        }

        let mut sql = Sql::new(format!("UPDATE {} SET ", self.quote(table.name())));
        let assignments = columns.iter().zip(values).map(|(column, value)| {
            let mut assignment = Sql::new(format!("{} = ", self.quote(column)));
            assignment.append(self.param(value.clone()));
            assignment
        });
        sql.append(Sql::join(assignments, ", "));

        if let Some(filter) = self.render_predicate(predicate, Scope::Bare)? {
            sql.push(" WHERE ");
            sql.append(filter);
        }

        let sql = self.coerce_params(sql);
        debug!(params = sql.params.len(), "compiled update: {}", sql.text);
        Ok(sql)
    }

    fn compile_delete(&self, table: &Table, predicate: &Predicate) -> Result<Sql> {
        let mut sql = Sql::new(format!("DELETE FROM {}", self.quote(table.name())));

        if let Some(filter) = self.render_predicate(predicate, Scope::Bare)? {
            sql.push(" WHERE ");
            sql.append(filter);
        }

        let sql = self.coerce_params(sql);
        debug!(params = sql.params.len(), "compiled delete: {}", sql.text);
        Ok(sql)
    }
}
