//! The staged query builder.
//!
//! Stage ordering is enforced structurally: [`SelectBuilder`] carries a
//! marker type parameter and every method is defined only on the stages
//! where the call is legal, consuming the builder and returning it
//! re-typed. The state record itself is persistent — clone a builder to
//! branch a chain.

use crate::criteria::Criteria;
use crate::dialect::{Dialect, split_direction};
use crate::error::{Error, Result};
use crate::executor::{Executor, Row};
use crate::expr::{Expr, FnContext};
use crate::render::{self, RenderStyle};
use crate::resolve::{Source, SourceSet, is_column_ref};
use crate::schema::Schema;
use smallvec::SmallVec;
use std::marker::PhantomData;

pub mod select;

pub use select::{
    FromSet, GroupSet, HavingSet, JoinSet, LimitSet, OffsetSet, OrderSet, SelectAllSet, SelectSet,
    WhereSet,
};

/// Marker trait for stages from which the accumulated query can be
/// rendered or executed. Every stage is renderable; a partially built
/// query is always a valid fragment.
pub trait ExecutableStage {}

/// How strictly a join is validated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum JoinCheck {
    /// Relationship existence, column pair, and value types.
    Related,
    /// Column existence and value types; the relation graph is not consulted.
    Typed,
    /// Column existence only.
    Loose,
}

/// Which condition clause a criteria object lands in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ClauseKind {
    Where,
    Having,
}

/// One JOIN entry, fully resolved when it was bound.
#[derive(Clone, Debug)]
pub(crate) struct JoinClause {
    pub source: Source,
    /// Column on the joined table.
    pub local: String,
    /// Binding key of the source the join points at.
    pub remote_key: String,
    /// Column on that source.
    pub remote: String,
}

#[derive(Clone, Debug)]
pub(crate) enum WhereEntry {
    Criteria(Criteria),
    Raw(String),
}

#[derive(Clone, Debug)]
pub(crate) enum SelectItem {
    /// `*`: every column of every bound source, expanded at render time.
    Star,
    /// `*` minus the named `(source key, column)` pairs.
    StarExcept { omit: Vec<(String, String)> },
    /// `Table.*`: every column of one bound source.
    TableStar { key: String },
    /// A fully resolved select item and its result key.
    Rendered { sql: String, key: String },
}

/// The accumulated query. Every builder method produces a new value; no
/// two chained calls alias the same mutable record.
#[derive(Clone, Debug)]
pub(crate) struct QueryState {
    pub base: Source,
    pub joins: SmallVec<[JoinClause; 2]>,
    pub selects: SmallVec<[SelectItem; 4]>,
    pub distinct: bool,
    pub wheres: SmallVec<[WhereEntry; 2]>,
    pub group_by: Vec<String>,
    pub havings: SmallVec<[WhereEntry; 1]>,
    pub order_by: Vec<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl QueryState {
    fn new(base: Source) -> Self {
        Self {
            base,
            joins: SmallVec::new(),
            selects: SmallVec::new(),
            distinct: false,
            wheres: SmallVec::new(),
            group_by: Vec::new(),
            havings: SmallVec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }
}

/// Entry point: pairs a schema with a dialect and starts chains.
///
/// One `QueryBuilder` can start any number of independent chains; the
/// schema and dialect are shared read-only.
#[derive(Clone, Copy, Debug)]
pub struct QueryBuilder<'a> {
    schema: &'a Schema,
    dialect: &'a dyn Dialect,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(schema: &'a Schema, dialect: &'a dyn Dialect) -> Self {
        Self { schema, dialect }
    }

    /// Binds the base table, entering the FROM stage.
    pub fn from(&self, table: &str) -> Result<SelectBuilder<'a, FromSet>> {
        self.bind(table, None)
    }

    /// Binds the base table under an alias.
    pub fn from_as(&self, table: &str, alias: &str) -> Result<SelectBuilder<'a, FromSet>> {
        self.bind(table, Some(alias))
    }

    fn bind(&self, table: &str, alias: Option<&str>) -> Result<SelectBuilder<'a, FromSet>> {
        self.schema.require(table)?;
        Ok(SelectBuilder {
            schema: self.schema,
            dialect: self.dialect,
            state: QueryState::new(Source::new(table, alias)),
            _stage: PhantomData,
        })
    }
}

/// A query chain in progress.
///
/// The `Stage` parameter tracks how far the chain has progressed and
/// restricts which methods are callable; see the stage marker types in
/// [`select`].
#[derive(Clone, Debug)]
pub struct SelectBuilder<'a, Stage> {
    schema: &'a Schema,
    dialect: &'a dyn Dialect,
    state: QueryState,
    _stage: PhantomData<Stage>,
}

impl<'a, Stage> SelectBuilder<'a, Stage> {
    fn retag<Next>(self) -> SelectBuilder<'a, Next> {
        SelectBuilder {
            schema: self.schema,
            dialect: self.dialect,
            state: self.state,
            _stage: PhantomData,
        }
    }

    fn sources(&self) -> SourceSet<'_> {
        SourceSet::new(
            self.schema,
            &self.state.base,
            self.state.joins.iter().map(|join| &join.source),
        )
    }

    fn select_keys(&self) -> impl Iterator<Item = &str> {
        self.state.selects.iter().filter_map(|item| match item {
            SelectItem::Rendered { key, .. } => Some(key.as_str()),
            _ => None,
        })
    }

    fn check_new_key(&self, key: &str) -> Result<()> {
        if self.select_keys().any(|existing| existing == key) {
            return Err(Error::DuplicateSelectKey(key.to_string()));
        }
        Ok(())
    }

    pub(crate) fn push_join<Next>(
        mut self,
        table: &str,
        alias: Option<&str>,
        local: &str,
        remote: &str,
        check: JoinCheck,
    ) -> Result<SelectBuilder<'a, Next>> {
        let joined = self.schema.require(table)?;
        let source = Source::new(table, alias);
        let key = source.key().to_string();

        if self.sources().find(&key).is_some() {
            return Err(Error::DuplicateSource(key));
        }

        // The local column lives on the joined table; a qualifier, if
        // present, must name this occurrence.
        let local_column = match local.split_once('.') {
            Some((qualifier, column)) if qualifier == key || qualifier == table => column,
            Some((qualifier, _)) => return Err(Error::UnknownTable(qualifier.to_string())),
            None => local,
        };
        let local_tag = joined.field(local_column).ok_or_else(|| Error::UnknownColumn {
            table: key.clone(),
            column: local_column.to_string(),
        })?;

        let (remote_key, remote_column, remote_tag, remote_table) = {
            let sources = self.sources();
            let hit = sources.resolve(remote)?;
            (
                hit.source.key().to_string(),
                hit.column,
                hit.tag,
                hit.source.table.clone(),
            )
        };

        if check == JoinCheck::Related {
            if !self.schema.related(table, &remote_table) {
                return Err(Error::InvalidJoin {
                    table: table.to_string(),
                    source_table: remote_table,
                });
            }
            if !self
                .schema
                .relation_pair(table, local_column, &remote_table, &remote_column)
            {
                return Err(Error::JoinColumnMismatch {
                    table: table.to_string(),
                    local: local_column.to_string(),
                    source_table: remote_table,
                    remote: remote_column,
                });
            }
        }
        if check != JoinCheck::Loose && !local_tag.ty.compatible_with(remote_tag.ty) {
            return Err(Error::IncompatibleJoinTypes {
                local: format!("{key}.{local_column}"),
                local_ty: local_tag.ty.to_string(),
                remote: format!("{remote_key}.{remote_column}"),
                remote_ty: remote_tag.ty.to_string(),
            });
        }

        self.state.joins.push(JoinClause {
            source,
            local: local_column.to_string(),
            remote_key,
            remote: remote_column,
        });
        Ok(self.retag())
    }

    pub(crate) fn push_criteria<Next>(
        mut self,
        criteria: Criteria,
        clause: ClauseKind,
    ) -> Result<SelectBuilder<'a, Next>> {
        if criteria.is_empty() {
            return Err(Error::MalformedCriteria("empty criteria object".to_string()));
        }

        {
            let sources = self.sources();
            for field in criteria.fields() {
                if !is_column_ref(field) {
                    // Expression fields pass through verbatim.
                    continue;
                }
                match (clause, sources.resolve(field)) {
                    (_, Ok(_)) => {}
                    (_, Err(err @ Error::AmbiguousColumn(_))) => return Err(err),
                    // HAVING may reference a select alias introduced later
                    // in the chain; bare unknown names are deferred to the
                    // database.
                    (ClauseKind::Having, Err(_)) if !field.contains('.') => {}
                    (_, Err(err)) => return Err(err),
                }
            }
        }

        let entry = WhereEntry::Criteria(criteria);
        match clause {
            ClauseKind::Where => self.state.wheres.push(entry),
            ClauseKind::Having => self.state.havings.push(entry),
        }
        Ok(self.retag())
    }

    pub(crate) fn push_where_raw<Next>(mut self, fragment: &str) -> Result<SelectBuilder<'a, Next>> {
        let leading = fragment.split_whitespace().next().unwrap_or("");
        if leading.eq_ignore_ascii_case("WHERE") {
            return Err(Error::GuardedRaw("WHERE".to_string()));
        }
        self.state.wheres.push(WhereEntry::Raw(fragment.to_string()));
        Ok(self.retag())
    }

    pub(crate) fn push_null_check<Next>(
        mut self,
        column: &str,
        negated: bool,
    ) -> Result<SelectBuilder<'a, Next>> {
        self.sources().resolve(column)?;
        let condition = if negated {
            crate::criteria::Condition::IsNotNull
        } else {
            crate::criteria::Condition::IsNull
        };
        self.state
            .wheres
            .push(WhereEntry::Criteria(Criteria::new().field(column, condition)));
        Ok(self.retag())
    }

    pub(crate) fn push_select_column<Next>(
        mut self,
        selector: &str,
        alias: Option<&str>,
    ) -> Result<SelectBuilder<'a, Next>> {
        if selector == "*" || selector.ends_with(".*") {
            if alias.is_some() {
                return Err(Error::InvalidSelector(format!(
                    "star selection {selector} cannot take an alias"
                )));
            }
            let item = if selector == "*" {
                SelectItem::Star
            } else {
                let qualifier = selector.strip_suffix(".*").unwrap_or(selector);
                let source = self
                    .sources()
                    .find(qualifier)
                    .ok_or_else(|| Error::UnknownTable(qualifier.to_string()))?;
                SelectItem::TableStar {
                    key: source.key().to_string(),
                }
            };
            self.state.selects.push(item);
            return Ok(self.retag());
        }

        let (sql, key) = {
            let hit = self.sources().resolve(selector)?;
            render::render_select_column(self.dialect, &hit, alias)
        };
        self.check_new_key(&key)?;
        self.state.selects.push(SelectItem::Rendered { sql, key });
        Ok(self.retag())
    }

    pub(crate) fn push_select_expr<Next, T>(
        self,
        build: impl FnOnce(&FnContext) -> Result<Expr<T>>,
        alias: Option<&str>,
    ) -> Result<SelectBuilder<'a, Next>> {
        let fragment = {
            let sources = self.sources();
            let ctx = FnContext::new(self.dialect, &sources);
            build(&ctx)?.into_sql()
        };
        self.push_fragment(fragment, alias)
    }

    fn push_fragment<Next>(
        mut self,
        fragment: String,
        alias: Option<&str>,
    ) -> Result<SelectBuilder<'a, Next>> {
        let (sql, key) = match alias {
            Some(alias) => (
                format!("{fragment} AS {}", self.dialect.quote_ident(alias, true)),
                alias.to_string(),
            ),
            None => (fragment.clone(), fragment),
        };
        self.check_new_key(&key)?;
        self.state.selects.push(SelectItem::Rendered { sql, key });
        Ok(self.retag())
    }

    pub(crate) fn push_select_all<Next>(mut self) -> SelectBuilder<'a, Next> {
        self.state.selects.push(SelectItem::Star);
        self.retag()
    }

    pub(crate) fn push_select_all_omit<Next>(
        mut self,
        columns: &[&str],
    ) -> Result<SelectBuilder<'a, Next>> {
        let mut omit = Vec::with_capacity(columns.len());
        {
            let sources = self.sources();
            for column in columns {
                if *column == "*" || column.ends_with(".*") {
                    return Err(Error::InvalidSelector(format!(
                        "{column} is not a single-column omission"
                    )));
                }
                let hit = sources.resolve(column)?;
                omit.push((hit.source.key().to_string(), hit.column));
            }
        }
        self.state.selects.push(SelectItem::StarExcept { omit });
        Ok(self.retag())
    }

    pub(crate) fn set_distinct<Next>(mut self) -> SelectBuilder<'a, Next> {
        self.state.distinct = true;
        self.retag()
    }

    pub(crate) fn push_group_by<Next>(mut self, columns: &[&str]) -> Result<SelectBuilder<'a, Next>> {
        {
            let sources = self.sources();
            for column in columns {
                sources.resolve(column)?;
            }
        }
        self.state
            .group_by
            .extend(columns.iter().map(|c| (*c).to_string()));
        Ok(self.retag())
    }

    pub(crate) fn push_order_by<Next>(mut self, clauses: &[&str]) -> Result<SelectBuilder<'a, Next>> {
        {
            let keys: Vec<String> = self.select_keys().map(str::to_string).collect();
            let sources = self.sources();
            for clause in clauses {
                let (reference, _) = split_direction(clause);
                if keys.iter().any(|key| key == reference) {
                    continue;
                }
                sources.resolve(reference)?;
            }
        }
        self.state
            .order_by
            .extend(clauses.iter().map(|c| (*c).to_string()));
        Ok(self.retag())
    }

    pub(crate) fn set_limit<Next>(mut self, n: u64) -> SelectBuilder<'a, Next> {
        self.state.limit = Some(n);
        self.retag()
    }

    pub(crate) fn set_offset<Next>(mut self, n: u64) -> SelectBuilder<'a, Next> {
        self.state.offset = Some(n);
        self.retag()
    }
}

impl<'a, Stage: ExecutableStage> SelectBuilder<'a, Stage> {
    /// Renders the accumulated query as a single-line SQL string.
    ///
    /// Rendering is pure; repeated calls return identical strings.
    pub fn to_sql(&self) -> String {
        render::render(self.schema, self.dialect, &self.state, RenderStyle::Compact)
    }

    /// Renders the query clause-per-line. Semantically identical to
    /// [`Self::to_sql`].
    pub fn to_formatted_sql(&self) -> String {
        render::render(self.schema, self.dialect, &self.state, RenderStyle::Pretty)
    }

    /// Renders the query and hands it to the executor, returning its rows.
    ///
    /// The builder imposes no retry or timeout policy; executor failures
    /// propagate untouched.
    pub async fn run<E: Executor>(&self, executor: &E) -> Result<Vec<Row>> {
        let sql = self.to_sql();
        tracing::debug!(%sql, "handing query to executor");
        let rows = executor.execute_query(&sql).await?;
        tracing::debug!(rows = rows.len(), "executor returned");
        Ok(rows)
    }
}
