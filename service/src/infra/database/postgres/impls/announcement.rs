//! [`Announcement`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{announcement, user, Announcement},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

use super::{impl_rows, select_page, Conditions};

/// Builds an [`Announcement`] out of the provided [`Row`].
fn announcement(row: &Row) -> Announcement {
    Announcement {
        id: row.get("id"),
        price: row.get("price"),
        announced_at: row.get("announced_at"),
        modified_at: row.get("modified_at"),
        expiration_date: row.get("expiration_date"),
        phone_number: row.get("phone_number"),
        kind: row.get("kind"),
        verification: row.get("verification"),
        deleted: row.get("deleted"),
        real_estate_id: row.get("real_estate_id"),
        author_id: row.get("author_id"),
    }
}

impl_rows!(
    Announcement,
    announcement::Id,
    table = "announcements",
    columns = "id, price, announced_at, modified_at, expiration_date, \
               phone_number, kind, verification, deleted, \
               real_estate_id, author_id",
    from_row = announcement,
);

/// Columns of [`Announcement`]s joined with their authors.
const JOINED_COLUMNS: &str = "\
    a.id, a.price, a.announced_at, a.modified_at, a.expiration_date, \
    a.phone_number, a.kind, a.verification, a.deleted, \
    a.real_estate_id, a.author_id";

/// [`Announcement`]s joined with their authors.
const JOINED: &str = "announcements a JOIN users u ON u.id = a.author_id";

impl<C> Database<Update<Announcement>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(announcement): Update<Announcement>,
    ) -> Result<Self::Ok, Self::Err> {
        let Announcement {
            id,
            price,
            announced_at,
            modified_at,
            expiration_date,
            phone_number,
            kind,
            verification,
            deleted,
            real_estate_id,
            author_id,
        } = announcement;

        const SQL: &str = "\
            INSERT INTO announcements (\
                id, price, \
                announced_at, modified_at, expiration_date, \
                phone_number, kind, verification, deleted, \
                real_estate_id, author_id\
            ) \
            VALUES (\
                $1::UUID, $2::NUMERIC, \
                $3::TIMESTAMPTZ, $4::TIMESTAMPTZ, $5::DATE, \
                $6::VARCHAR, $7::VARCHAR, $8::INT2, $9::BOOL, \
                $10::UUID, $11::UUID\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET price = EXCLUDED.price, \
                announced_at = EXCLUDED.announced_at, \
                modified_at = EXCLUDED.modified_at, \
                expiration_date = EXCLUDED.expiration_date, \
                phone_number = EXCLUDED.phone_number, \
                kind = EXCLUDED.kind, \
                verification = EXCLUDED.verification, \
                deleted = EXCLUDED.deleted, \
                real_estate_id = EXCLUDED.real_estate_id, \
                author_id = EXCLUDED.author_id";
        self.exec(
            SQL,
            &[
                &id,
                &price,
                &announced_at,
                &modified_at,
                &expiration_date,
                &phone_number,
                &kind,
                &verification,
                &deleted,
                &real_estate_id,
                &author_id,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C>
    Database<
        Select<
            By<read::announcement::list::Page, read::announcement::list::Selector>,
        >,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::announcement::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<
                read::announcement::list::Page,
                read::announcement::list::Selector,
            >,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::announcement::list::Selector { arguments, filter } =
            by.into_inner();
        let read::announcement::list::Filter {
            deleted,
            verification,
            author_email,
            company_id,
        } = filter;
        let accepted = user::Membership::Accepted;

        let mut conds = Conditions::default();
        conds.push_opt(deleted.as_ref(), |i| format!("a.deleted = ${i}::BOOL"));
        conds.push_opt(verification.as_ref(), |i| {
            format!("a.verification = ${i}::INT2")
        });
        conds.push_opt(author_email.as_ref(), |i| {
            format!("u.email = ${i}::VARCHAR")
        });
        if let Some(company_id) = company_id.as_ref() {
            conds.push(company_id, |i| format!("u.company_id = ${i}::UUID"));
            conds.push(&accepted, |i| format!("u.membership = ${i}::INT2"));
        }

        select_page(
            self,
            JOINED_COLUMNS,
            JOINED,
            "a.announced_at, a.id",
            &conds,
            arguments,
            announcement,
        )
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<Vec<Announcement>, read::announcement::Top>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Announcement>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Announcement>, read::announcement::Top>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::announcement::Top { company_id, limit } = by.into_inner();
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let sql = format!(
            "SELECT {JOINED_COLUMNS} \
             FROM {JOINED} \
             WHERE u.company_id = $1::UUID \
               AND u.membership = $2::INT2 \
             ORDER BY a.price, a.announced_at, a.id \
             LIMIT $3::INT8",
        );
        Ok(self
            .query(&sql, &[&company_id, &user::Membership::Accepted, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(announcement)
            .collect())
    }
}
