//! [`Company`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{company, Company},
    infra::{
        database::{
            self,
            postgres::{Connection, FuzzPattern},
            Postgres,
        },
        Database,
    },
    read,
};

use super::{impl_rows, select_page, Conditions};

/// Builds a [`Company`] out of the provided [`Row`].
fn company(row: &Row) -> Company {
    Company {
        id: row.get("id"),
        name: row.get("name"),
        address: row.get("address"),
        phone_number: row.get("phone_number"),
    }
}

impl_rows!(
    Company,
    company::Id,
    table = "companies",
    columns = "id, name, address, phone_number",
    from_row = company,
);

impl<C> Database<Update<Company>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(company): Update<Company>,
    ) -> Result<Self::Ok, Self::Err> {
        let Company {
            id,
            name,
            address,
            phone_number,
        } = company;

        const SQL: &str = "\
            INSERT INTO companies (id, name, address, phone_number) \
            VALUES ($1::UUID, $2::VARCHAR, $3::VARCHAR, $4::VARCHAR) \
            ON CONFLICT (id) DO UPDATE \
            SET name = EXCLUDED.name, \
                address = EXCLUDED.address, \
                phone_number = EXCLUDED.phone_number";
        self.exec(SQL, &[&id, &name, &address, &phone_number])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C>
    Database<
        Select<By<read::company::list::Page, read::company::list::Selector>>,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::company::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::company::list::Page, read::company::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::company::list::Selector {
            arguments,
            filter:
                read::company::list::Filter {
                    name,
                    address,
                    phone_number,
                },
        } = by.into_inner();
        let name = name.as_deref().map(FuzzPattern::new);
        let address = address.as_deref().map(FuzzPattern::new);
        let phone_number = phone_number.as_deref().map(FuzzPattern::new);

        let mut conds = Conditions::default();
        conds.push_opt(name.as_ref(), |i| format!("name ILIKE ${i}::VARCHAR"));
        conds.push_opt(address.as_ref(), |i| {
            format!("address ILIKE ${i}::VARCHAR")
        });
        conds.push_opt(phone_number.as_ref(), |i| {
            format!("phone_number ILIKE ${i}::VARCHAR")
        });

        select_page(
            self,
            "id, name, address, phone_number",
            "companies",
            r#"name COLLATE "C", id"#,
            &conds,
            arguments,
            company,
        )
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<read::company::HasMembers, company::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::company::HasMembers;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::company::HasMembers, company::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id: company::Id = by.into_inner();

        const SQL: &str = "\
            SELECT 1 \
            FROM users \
            WHERE company_id = $1::UUID \
            LIMIT 1";
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| read::company::HasMembers(row.is_some()))
    }
}
