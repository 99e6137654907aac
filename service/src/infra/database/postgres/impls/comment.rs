//! [`Comment`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{announcement, comment, Comment},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

use super::{impl_rows, select_page, Conditions};

/// Builds a [`Comment`] out of the provided [`Row`].
fn comment(row: &Row) -> Comment {
    Comment {
        id: row.get("id"),
        content: row.get("content"),
        date: row.get("date"),
        announcement_id: row.get("announcement_id"),
        author_id: row.get("author_id"),
    }
}

impl_rows!(
    Comment,
    comment::Id,
    table = "comments",
    columns = "id, content, date, announcement_id, author_id",
    from_row = comment,
);

impl<C> Database<Update<Comment>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(comment): Update<Comment>,
    ) -> Result<Self::Ok, Self::Err> {
        let Comment {
            id,
            content,
            date,
            announcement_id,
            author_id,
        } = comment;

        const SQL: &str = "\
            INSERT INTO comments (\
                id, content, date, announcement_id, author_id\
            ) \
            VALUES (\
                $1::UUID, $2::VARCHAR, $3::TIMESTAMPTZ, $4::UUID, $5::UUID\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET content = EXCLUDED.content, \
                date = EXCLUDED.date, \
                announcement_id = EXCLUDED.announcement_id, \
                author_id = EXCLUDED.author_id";
        self.exec(SQL, &[&id, &content, &date, &announcement_id, &author_id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C>
    Database<
        Select<By<read::comment::list::Page, read::comment::list::Selector>>,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::comment::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::comment::list::Page, read::comment::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::comment::list::Selector {
            arguments,
            filter: read::comment::list::Filter { announcement_id },
        } = by.into_inner();

        let mut conds = Conditions::default();
        conds.push_opt(announcement_id.as_ref(), |i| {
            format!("announcement_id = ${i}::UUID")
        });

        select_page(
            self,
            "id, content, date, announcement_id, author_id",
            "comments",
            "date, id",
            &conds,
            arguments,
            comment,
        )
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Delete<By<Comment, announcement::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Comment, announcement::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id: announcement::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM comments \
            WHERE announcement_id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
