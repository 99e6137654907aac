//! [`RealEstate`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{real_estate, RealEstate},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

use super::{impl_rows, select_page, Conditions};

/// Selected columns of a [`RealEstate`].
const COLUMNS: &str = "\
    id, name, kind, area, heating_type, equipment, deleted, \
    country, city, region, street, number";

/// Builds a [`RealEstate`] out of the provided [`Row`].
fn real_estate(row: &Row) -> RealEstate {
    RealEstate {
        id: row.get("id"),
        name: row.get("name"),
        kind: row.get("kind"),
        area: row.get("area"),
        heating_type: row.get("heating_type"),
        equipment: row.get("equipment"),
        deleted: row.get("deleted"),
        location: real_estate::Location {
            country: row.get("country"),
            city: row.get("city"),
            region: row.get("region"),
            street: row.get("street"),
            number: row.get("number"),
        },
    }
}

impl_rows!(
    RealEstate,
    real_estate::Id,
    table = "real_estates",
    columns = "id, name, kind, area, heating_type, equipment, deleted, \
               country, city, region, street, number",
    from_row = real_estate,
);

impl<C> Database<Update<RealEstate>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(real_estate): Update<RealEstate>,
    ) -> Result<Self::Ok, Self::Err> {
        let RealEstate {
            id,
            name,
            kind,
            area,
            heating_type,
            equipment,
            deleted,
            location:
                real_estate::Location {
                    country,
                    city,
                    region,
                    street,
                    number,
                },
        } = real_estate;

        const SQL: &str = "\
            INSERT INTO real_estates (\
                id, name, kind, area, \
                heating_type, equipment, deleted, \
                country, city, region, street, number\
            ) \
            VALUES (\
                $1::UUID, $2::VARCHAR, $3::VARCHAR, $4::NUMERIC, \
                $5::VARCHAR, $6::VARCHAR, $7::BOOL, \
                $8::VARCHAR, $9::VARCHAR, $10::VARCHAR, \
                $11::VARCHAR, $12::VARCHAR\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET name = EXCLUDED.name, \
                kind = EXCLUDED.kind, \
                area = EXCLUDED.area, \
                heating_type = EXCLUDED.heating_type, \
                equipment = EXCLUDED.equipment, \
                deleted = EXCLUDED.deleted, \
                country = EXCLUDED.country, \
                city = EXCLUDED.city, \
                region = EXCLUDED.region, \
                street = EXCLUDED.street, \
                number = EXCLUDED.number";
        self.exec(
            SQL,
            &[
                &id,
                &name,
                &kind,
                &area,
                &heating_type,
                &equipment,
                &deleted,
                &country,
                &city,
                &region,
                &street,
                &number,
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
            By<read::real_estate::list::Page, read::real_estate::list::Selector>,
        >,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::real_estate::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<
                read::real_estate::list::Page,
                read::real_estate::list::Selector,
            >,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::real_estate::list::Selector {
            arguments,
            filter: read::real_estate::list::Filter { deleted },
        } = by.into_inner();

        let mut conds = Conditions::default();
        conds.push_opt(deleted.as_ref(), |i| format!("deleted = ${i}::BOOL"));

        select_page(
            self,
            COLUMNS,
            "real_estates",
            r#"name COLLATE "C", id"#,
            &conds,
            arguments,
            real_estate,
        )
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<Vec<RealEstate>, read::real_estate::Similar>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<RealEstate>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<RealEstate>, read::real_estate::Similar>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::real_estate::Similar {
            area,
            location:
                real_estate::Location {
                    country,
                    city,
                    region,
                    street,
                    number,
                },
        } = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM real_estates \
             WHERE area = $1::NUMERIC \
               AND country = $2::VARCHAR \
               AND city = $3::VARCHAR \
               AND region = $4::VARCHAR \
               AND street = $5::VARCHAR \
               AND number = $6::VARCHAR \
             ORDER BY id",
        );
        Ok(self
            .query(&sql, &[&area, &country, &city, &region, &street, &number])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(real_estate)
            .collect())
    }
}

impl<C> Database<Select<By<read::real_estate::IsUsed, real_estate::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::real_estate::IsUsed;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::real_estate::IsUsed, real_estate::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id: real_estate::Id = by.into_inner();

        const SQL: &str = "\
            SELECT 1 \
            FROM announcements \
            WHERE real_estate_id = $1::UUID \
            LIMIT 1";
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| read::real_estate::IsUsed(row.is_some()))
    }
}
