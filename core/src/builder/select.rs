//! Stage markers and the per-stage method surface of [`SelectBuilder`].
//!
//! Each marker is a zero-sized type naming how far a chain has progressed.
//! Methods are generated per stage, so an illegal call order (say,
//! `select_all` after `group_by`, or a second `select_distinct`) fails to
//! compile instead of failing at render time.

use super::{ClauseKind, ExecutableStage, JoinCheck, SelectBuilder};
use crate::criteria::Criteria;
use crate::error::Result;
use crate::expr::{Expr, FnContext};
use serde_json::Value;

/// Base table bound, nothing else yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct FromSet;

/// At least one JOIN bound.
#[derive(Debug, Clone, Copy, Default)]
pub struct JoinSet;

/// At least one WHERE entry accumulated.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhereSet;

/// GROUP BY set. Grouped queries enumerate their selected columns, so the
/// star selections disappear from this point on.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupSet;

/// At least one HAVING entry accumulated.
#[derive(Debug, Clone, Copy, Default)]
pub struct HavingSet;

/// Individual select items accumulated; more may follow.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectSet;

/// A whole-row selection was made; the select list is closed.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectAllSet;

/// ORDER BY set.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderSet;

/// LIMIT set.
#[derive(Debug, Clone, Copy, Default)]
pub struct LimitSet;

/// OFFSET set; only rendering and execution remain.
#[derive(Debug, Clone, Copy, Default)]
pub struct OffsetSet;

impl ExecutableStage for FromSet {}
impl ExecutableStage for JoinSet {}
impl ExecutableStage for WhereSet {}
impl ExecutableStage for GroupSet {}
impl ExecutableStage for HavingSet {}
impl ExecutableStage for SelectSet {}
impl ExecutableStage for SelectAllSet {}
impl ExecutableStage for OrderSet {}
impl ExecutableStage for LimitSet {}
impl ExecutableStage for OffsetSet {}

macro_rules! join_methods {
    () => {
        /// Joins a table over a recorded foreign-key path.
        ///
        /// `local` is a column on the joined table; `remote` names a column
        /// on an already-bound source. The pair must match one of the
        /// relationship's recorded column pairs and share a value type.
        pub fn join(
            self,
            table: &str,
            local: &str,
            remote: &str,
        ) -> Result<SelectBuilder<'a, JoinSet>> {
            self.push_join(table, None, local, remote, JoinCheck::Related)
        }

        /// [`Self::join`] with the joined occurrence bound under an alias;
        /// this is how the same table joins twice.
        pub fn join_as(
            self,
            table: &str,
            alias: &str,
            local: &str,
            remote: &str,
        ) -> Result<SelectBuilder<'a, JoinSet>> {
            self.push_join(table, Some(alias), local, remote, JoinCheck::Related)
        }

        /// Joins without consulting the relation graph. Both columns must
        /// exist and their value types must be compatible.
        pub fn join_unchecked(
            self,
            table: &str,
            local: &str,
            remote: &str,
        ) -> Result<SelectBuilder<'a, JoinSet>> {
            self.push_join(table, None, local, remote, JoinCheck::Typed)
        }

        /// [`Self::join_unchecked`] with an alias.
        pub fn join_unchecked_as(
            self,
            table: &str,
            alias: &str,
            local: &str,
            remote: &str,
        ) -> Result<SelectBuilder<'a, JoinSet>> {
            self.push_join(table, Some(alias), local, remote, JoinCheck::Typed)
        }

        /// Joins checking only that both columns exist.
        pub fn join_untyped(
            self,
            table: &str,
            local: &str,
            remote: &str,
        ) -> Result<SelectBuilder<'a, JoinSet>> {
            self.push_join(table, None, local, remote, JoinCheck::Loose)
        }

        /// [`Self::join_untyped`] with an alias.
        pub fn join_untyped_as(
            self,
            table: &str,
            alias: &str,
            local: &str,
            remote: &str,
        ) -> Result<SelectBuilder<'a, JoinSet>> {
            self.push_join(table, Some(alias), local, remote, JoinCheck::Loose)
        }
    };
}

macro_rules! where_methods {
    () => {
        /// Appends one criteria object to the WHERE clause. Objects from
        /// repeated calls are AND-joined.
        pub fn r#where(self, criteria: Criteria) -> Result<SelectBuilder<'a, WhereSet>> {
            self.push_criteria(criteria, ClauseKind::Where)
        }

        /// [`Self::where`](Self::r#where) over the JSON object form
        /// (`$AND`/`$OR`/`$NOT`/`$NOR` keys, implicit equality and IN).
        pub fn where_json(self, value: &Value) -> Result<SelectBuilder<'a, WhereSet>> {
            self.push_criteria(Criteria::from_json(value)?, ClauseKind::Where)
        }

        /// Appends a verbatim WHERE fragment. Rejects fragments that begin
        /// with the `WHERE` keyword itself; the renderer adds it.
        pub fn where_raw(self, fragment: &str) -> Result<SelectBuilder<'a, WhereSet>> {
            self.push_where_raw(fragment)
        }

        /// Appends `column IS NULL`.
        pub fn where_is_null(self, column: &str) -> Result<SelectBuilder<'a, WhereSet>> {
            self.push_null_check(column, false)
        }

        /// Appends `column IS NOT NULL`.
        pub fn where_not_null(self, column: &str) -> Result<SelectBuilder<'a, WhereSet>> {
            self.push_null_check(column, true)
        }
    };
}

macro_rules! group_by_method {
    () => {
        /// Sets the GROUP BY columns.
        pub fn group_by(self, columns: &[&str]) -> Result<SelectBuilder<'a, GroupSet>> {
            self.push_group_by(columns)
        }
    };
}

macro_rules! having_method {
    () => {
        /// Appends one criteria object to the HAVING clause.
        ///
        /// Bare field names that are not bound columns are passed through;
        /// they may name a select alias introduced later in the chain.
        pub fn having(self, criteria: Criteria) -> Result<SelectBuilder<'a, HavingSet>> {
            self.push_criteria(criteria, ClauseKind::Having)
        }
    };
}

macro_rules! select_methods {
    () => {
        /// Appends a select item: `*`, `Table.*`, `Table.column`, or a bare
        /// column name.
        ///
        /// A bare name must be unambiguous across the bound sources. Star
        /// selectors expand at render time.
        pub fn select(self, selector: &str) -> Result<SelectBuilder<'a, SelectSet>> {
            self.push_select_column(selector, None)
        }

        /// Appends a single-column select item under an explicit result
        /// alias.
        pub fn select_as(
            self,
            selector: &str,
            alias: &str,
        ) -> Result<SelectBuilder<'a, SelectSet>> {
            self.push_select_column(selector, Some(alias))
        }

        /// Appends a select item built from the function context, e.g.
        /// `|ctx| ctx.upper("User.name")`.
        pub fn select_with<T>(
            self,
            build: impl FnOnce(&FnContext) -> Result<Expr<T>>,
        ) -> Result<SelectBuilder<'a, SelectSet>> {
            self.push_select_expr(build, None)
        }

        /// [`Self::select_with`] under an explicit result alias.
        pub fn select_with_as<T>(
            self,
            build: impl FnOnce(&FnContext) -> Result<Expr<T>>,
            alias: &str,
        ) -> Result<SelectBuilder<'a, SelectSet>> {
            self.push_select_expr(build, Some(alias))
        }
    };
}

macro_rules! distinct_method {
    () => {
        /// Marks the query DISTINCT. Must precede any select call; the
        /// select list is then built with the ordinary select methods.
        pub fn select_distinct(self) -> SelectBuilder<'a, SelectSet> {
            self.set_distinct()
        }
    };
}

macro_rules! select_all_methods {
    () => {
        /// Selects every column of every bound source and closes the select
        /// list.
        pub fn select_all(self) -> SelectBuilder<'a, SelectAllSet> {
            self.push_select_all()
        }

        /// [`Self::select_all`] minus the named columns. Only concrete
        /// single-column references are valid omissions.
        pub fn select_all_omit(
            self,
            columns: &[&str],
        ) -> Result<SelectBuilder<'a, SelectAllSet>> {
            self.push_select_all_omit(columns)
        }
    };
}

macro_rules! tail_methods {
    () => {
        /// Sets the ORDER BY clauses. Each clause is a column reference or
        /// select alias with an optional trailing `ASC`/`DESC`.
        pub fn order_by(self, clauses: &[&str]) -> Result<SelectBuilder<'a, OrderSet>> {
            self.push_order_by(clauses)
        }

        /// Caps the number of returned rows.
        pub fn limit(self, n: u64) -> SelectBuilder<'a, LimitSet> {
            self.set_limit(n)
        }

        /// Skips the first `n` rows.
        pub fn offset(self, n: u64) -> SelectBuilder<'a, OffsetSet> {
            self.set_offset(n)
        }
    };
}

impl<'a> SelectBuilder<'a, FromSet> {
    join_methods!();
    where_methods!();
    group_by_method!();
    select_methods!();
    distinct_method!();
    select_all_methods!();
    tail_methods!();
}

impl<'a> SelectBuilder<'a, JoinSet> {
    join_methods!();
    where_methods!();
    group_by_method!();
    select_methods!();
    distinct_method!();
    select_all_methods!();
    tail_methods!();
}

impl<'a> SelectBuilder<'a, WhereSet> {
    where_methods!();
    group_by_method!();
    select_methods!();
    distinct_method!();
    select_all_methods!();
    tail_methods!();
}

impl<'a> SelectBuilder<'a, GroupSet> {
    having_method!();
    select_methods!();
    distinct_method!();
    tail_methods!();
}

impl<'a> SelectBuilder<'a, HavingSet> {
    having_method!();
    select_methods!();
    distinct_method!();
    tail_methods!();
}

impl<'a> SelectBuilder<'a, SelectSet> {
    select_methods!();
    tail_methods!();
}

impl<'a> SelectBuilder<'a, SelectAllSet> {
    tail_methods!();
}

impl<'a> SelectBuilder<'a, OrderSet> {
    /// Caps the number of returned rows.
    pub fn limit(self, n: u64) -> SelectBuilder<'a, LimitSet> {
        self.set_limit(n)
    }

    /// Skips the first `n` rows.
    pub fn offset(self, n: u64) -> SelectBuilder<'a, OffsetSet> {
        self.set_offset(n)
    }
}

impl<'a> SelectBuilder<'a, LimitSet> {
    /// Skips the first `n` rows.
    pub fn offset(self, n: u64) -> SelectBuilder<'a, OffsetSet> {
        self.set_offset(n)
    }
}
