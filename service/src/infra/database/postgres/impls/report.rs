//! [`Report`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{announcement, report, Report},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

use super::{impl_rows, select_page, Conditions};

/// Builds a [`Report`] out of the provided [`Row`].
fn report(row: &Row) -> Report {
    Report {
        id: row.get("id"),
        email: row.get("email"),
        content: row.get("content"),
        status: row.get("status"),
        announcement_id: row.get("announcement_id"),
        reporter_id: row.get("reporter_id"),
    }
}

impl_rows!(
    Report,
    report::Id,
    table = "reports",
    columns = "id, email, content, status, announcement_id, reporter_id",
    from_row = report,
);

impl<C> Database<Update<Report>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(report): Update<Report>,
    ) -> Result<Self::Ok, Self::Err> {
        let Report {
            id,
            email,
            content,
            status,
            announcement_id,
            reporter_id,
        } = report;

        const SQL: &str = "\
            INSERT INTO reports (\
                id, email, content, status, announcement_id, reporter_id\
            ) \
            VALUES (\
                $1::UUID, $2::VARCHAR, $3::VARCHAR, $4::INT2, \
                $5::UUID, $6::UUID\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET email = EXCLUDED.email, \
                content = EXCLUDED.content, \
                status = EXCLUDED.status, \
                announcement_id = EXCLUDED.announcement_id, \
                reporter_id = EXCLUDED.reporter_id";
        self.exec(
            SQL,
            &[
                &id,
                &email,
                &content,
                &status,
                &announcement_id,
                &reporter_id,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C>
    Database<
        Select<By<read::report::list::Page, read::report::list::Selector>>,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::report::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::report::list::Page, read::report::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::report::list::Selector {
            arguments,
            filter: read::report::list::Filter { status, email },
        } = by.into_inner();

        let mut conds = Conditions::default();
        conds.push_opt(status.as_ref(), |i| format!("status = ${i}::INT2"));
        conds.push_opt(email.as_ref(), |i| format!("email = ${i}::VARCHAR"));

        select_page(
            self,
            "id, email, content, status, announcement_id, reporter_id",
            "reports",
            "id",
            &conds,
            arguments,
            report,
        )
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Delete<By<Report, announcement::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Report, announcement::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id: announcement::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM reports \
            WHERE announcement_id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
