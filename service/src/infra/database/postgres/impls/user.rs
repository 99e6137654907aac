//! [`User`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

use super::{impl_rows, select_page, Conditions};

/// Selected columns of a [`User`].
const COLUMNS: &str = "\
    id, username, email, password_hash, role, \
    company_id, membership, created_at";

/// Builds a [`User`] out of the provided [`Row`].
fn user(row: &Row) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role: row.get("role"),
        company_id: row.get("company_id"),
        membership: row.get("membership"),
        created_at: row.get("created_at"),
    }
}

impl_rows!(
    User,
    user::Id,
    table = "users",
    columns = "id, username, email, password_hash, role, \
               company_id, membership, created_at",
    from_row = user,
);

impl<C> Database<Update<User>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(user): Update<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let User {
            id,
            username,
            email,
            password_hash,
            role,
            company_id,
            membership,
            created_at,
        } = user;

        const SQL: &str = "\
            INSERT INTO users (\
                id, username, email, password_hash, role, \
                company_id, membership, created_at\
            ) \
            VALUES (\
                $1::UUID, $2::VARCHAR, $3::VARCHAR, $4::VARCHAR, $5::INT2, \
                $6::UUID, $7::INT2, $8::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET username = EXCLUDED.username, \
                email = EXCLUDED.email, \
                password_hash = EXCLUDED.password_hash, \
                role = EXCLUDED.role, \
                company_id = EXCLUDED.company_id, \
                membership = EXCLUDED.membership, \
                created_at = EXCLUDED.created_at";
        self.exec(
            SQL,
            &[
                &id,
                &username,
                &email,
                &password_hash,
                &role,
                &company_id,
                &membership,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<'l, C> Database<Select<By<Option<User>, &'l user::Username>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Username>>,
    ) -> Result<Self::Ok, Self::Err> {
        let username = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM users \
             WHERE username = $1::VARCHAR \
             LIMIT 1",
        );
        Ok(self
            .query_opt(&sql, &[&username])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(user))
    }
}

impl<C> Database<Select<By<read::user::list::Page, read::user::list::Selector>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::user::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::user::list::Page, read::user::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::user::list::Selector {
            arguments,
            filter:
                read::user::list::Filter {
                    company_id,
                    membership,
                },
        } = by.into_inner();

        let mut conds = Conditions::default();
        conds.push_opt(company_id.as_ref(), |i| {
            format!("company_id = ${i}::UUID")
        });
        conds.push_opt(membership.as_ref(), |i| {
            format!("membership = ${i}::INT2")
        });

        select_page(
            self,
            COLUMNS,
            "users",
            "created_at, id",
            &conds,
            arguments,
            user,
        )
        .await
        .map_err(tracerr::wrap!())
    }
}
