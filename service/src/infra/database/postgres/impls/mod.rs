//! [`Database`] implementations.

#![allow(
    clippy::items_after_statements,
    reason = "`const SQL` after statements"
)]
#![allow(clippy::too_many_lines, reason = "SQL-related code a bit verbose")]

mod announcement;
mod comment;
mod company;
mod real_estate;
mod report;
mod user;

use std::fmt;

use async_trait::async_trait;
use common::{
    operations::{Commit, Transact},
    pagination::{Arguments, Page},
};
use itertools::Itertools as _;
use postgres_types::ToSql;
use refinery_core::{
    traits::r#async::{AsyncQuery, AsyncTransaction},
    AsyncMigrate, Migration,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::infra::{database, postgres, Database};

use super::{Connection, NonTx, Postgres, Tx};

/// Implements row-level operations of an entity stored in the provided SQL
/// table, selecting the provided columns and mapping them with the provided
/// function.
macro_rules! impl_rows {
    (
        $entity:ty,
        $id:ty,
        table = $table:literal,
        columns = $columns:literal,
        from_row = $from_row:path $(,)?
    ) => {
        impl<C, IDs> Database<Select<By<HashMap<$id, $entity>, IDs>>>
            for Postgres<C>
        where
            C: Connection,
            IDs: AsRef<[$id]>,
        {
            type Ok = HashMap<$id, $entity>;
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                Select(by): Select<By<HashMap<$id, $entity>, IDs>>,
            ) -> Result<Self::Ok, Self::Err> {
                let ids = by.into_inner();
                // Avoid subtle change for SQL.
                let ids: &[$id] = ids.as_ref();
                if ids.is_empty() {
                    return Ok(HashMap::new());
                }

                const SQL: &str = concat!(
                    "SELECT ", $columns, " ",
                    "FROM ", $table, " ",
                    "WHERE id = ANY($1::UUID[])",
                );
                Ok(self
                    .query(SQL, &[&ids])
                    .await
                    .map_err(tracerr::wrap!())?
                    .iter()
                    .map(|row| {
                        let e: $entity = $from_row(row);
                        (e.id, e)
                    })
                    .collect())
            }
        }

        impl<C> Database<Select<By<Option<$entity>, $id>>> for Postgres<C>
        where
            C: Connection,
            Self: Database<
                Select<By<HashMap<$id, $entity>, [$id; 1]>>,
                Ok = HashMap<$id, $entity>,
                Err = Traced<database::Error>,
            >,
        {
            type Ok = Option<$entity>;
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                Select(by): Select<By<Option<$entity>, $id>>,
            ) -> Result<Self::Ok, Self::Err> {
                let id = by.into_inner();
                Ok(self
                    .execute(Select(By::new([id])))
                    .await
                    .map_err(tracerr::wrap!())?
                    .remove(&id))
            }
        }

        impl<C> Database<Insert<$entity>> for Postgres<C>
        where
            C: Connection,
            Self: Database<
                Update<$entity>,
                Ok = (),
                Err = Traced<database::Error>,
            >,
        {
            type Ok = ();
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                Insert(e): Insert<$entity>,
            ) -> Result<Self::Ok, Self::Err> {
                self.execute(Update(e)).await.map_err(tracerr::wrap!())
            }
        }

        impl<C> Database<Delete<By<$entity, $id>>> for Postgres<C>
        where
            C: Connection,
        {
            type Ok = ();
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                Delete(by): Delete<By<$entity, $id>>,
            ) -> Result<Self::Ok, Self::Err> {
                let id: $id = by.into_inner();

                const SQL: &str =
                    concat!("DELETE FROM ", $table, " WHERE id = $1::UUID");
                self.exec(SQL, &[&id])
                    .await
                    .map_err(tracerr::wrap!())
                    .map(drop)
            }
        }

        impl<C> Database<Lock<By<$entity, $id>>> for Postgres<C>
        where
            C: Connection,
        {
            type Ok = ();
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                Lock(by): Lock<By<$entity, $id>>,
            ) -> Result<Self::Ok, Self::Err> {
                let id: $id = by.into_inner();

                const SQL: &str = concat!(
                    "SELECT id FROM ", $table, " ",
                    "WHERE id = $1::UUID ",
                    "FOR UPDATE",
                );
                self.query(SQL, &[&id])
                    .await
                    .map_err(tracerr::wrap!())
                    .map(drop)
            }
        }
    };
}
use impl_rows;

/// SQL `WHERE` conditions along with their positional parameters.
#[derive(Default)]
struct Conditions<'p> {
    /// SQL conditions joined with `AND`.
    clauses: Vec<String>,

    /// Parameters referred by the [`Conditions::clauses`].
    params: Vec<&'p (dyn ToSql + Sync)>,
}

impl<'p> Conditions<'p> {
    /// Adds a new condition referring the provided `param` by its index.
    fn push(
        &mut self,
        param: &'p (dyn ToSql + Sync),
        clause: impl FnOnce(usize) -> String,
    ) {
        self.params.push(param);
        self.clauses.push(clause(self.params.len()));
    }

    /// Adds a new condition only if the provided `param` is present.
    fn push_opt<T: ToSql + Sync>(
        &mut self,
        param: Option<&'p T>,
        clause: impl FnOnce(usize) -> String,
    ) {
        if let Some(p) = param {
            self.push(p, clause);
        }
    }

    /// Renders these [`Conditions`] as an SQL `WHERE` clause.
    fn sql(&self) -> impl fmt::Display + '_ {
        self.clauses
            .iter()
            .format_with("", |c, f| f(&format_args!(" AND {c}")))
    }
}

/// Selects a [`Page`] of rows from the provided SQL `from` clause.
///
/// `columns` are selected and rows are sorted by `order_by`, so the provided
/// `from_row` mapping could build an item out of each row.
async fn select_page<C, T>(
    db: &Postgres<C>,
    columns: &str,
    from: &str,
    order_by: &str,
    conds: &Conditions<'_>,
    arguments: Arguments,
    from_row: impl Fn(&Row) -> T,
) -> Result<Page<T>, Traced<database::Error>>
where
    C: Connection,
{
    let count_sql =
        format!("SELECT COUNT(*) FROM {from} WHERE TRUE{}", conds.sql());
    let total = db
        .query(&count_sql, &conds.params)
        .await
        .map_err(tracerr::wrap!())?
        .first()
        .map_or(0, |row| row.get::<_, i64>(0));

    let limit = i64::try_from(arguments.limit()).unwrap_or(i64::MAX);
    let offset = i64::try_from(arguments.offset()).unwrap_or(i64::MAX);
    let mut ps: Vec<&(dyn ToSql + Sync)> = conds.params.clone();
    ps.push(&limit);
    ps.push(&offset);

    let sql = format!(
        "SELECT {columns} \
         FROM {from} \
         WHERE TRUE{conds} \
         ORDER BY {order_by} \
         LIMIT ${limit_idx}::INT8 OFFSET ${offset_idx}::INT8",
        conds = conds.sql(),
        limit_idx = ps.len() - 1,
        offset_idx = ps.len(),
    );
    let items = db
        .query(&sql, &ps)
        .await
        .map_err(tracerr::wrap!())?
        .iter()
        .map(from_row)
        .collect::<Vec<_>>();

    Ok(Page::new(
        arguments,
        items,
        usize::try_from(total).unwrap_or_default(),
    ))
}

impl Database<Transact> for Postgres<NonTx> {
    type Ok = Postgres<Tx>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(Postgres(Tx::from_non_tx(self.0.clone())))
    }
}

impl Database<Transact> for Postgres<Tx> {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Postgres<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        self.commit().await.map_err(tracerr::wrap!())
    }
}

#[async_trait]
impl AsyncTransaction for Postgres {
    type Error = Traced<database::Error>;

    async fn execute(
        &mut self,
        queries: &[&str],
    ) -> Result<usize, Self::Error> {
        let mut conn = self
            .0
            .pool
            .get()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)?;
        AsyncTransaction::execute(&mut **conn, queries)
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}

#[async_trait]
impl AsyncQuery<Vec<Migration>> for Postgres {
    async fn query(
        &mut self,
        query: &str,
    ) -> Result<Vec<Migration>, <Self as AsyncTransaction>::Error> {
        let mut conn = self
            .0
            .pool
            .get()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)?;
        AsyncQuery::query(&mut **conn, query)
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}

impl AsyncMigrate for Postgres {}
