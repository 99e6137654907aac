//! Entities and [`Service`] prepared for tests.

use common::{operations::Insert, Date, DateTime};
use rust_decimal::Decimal;

use crate::{
    access::Caller,
    command::create_real_estate::Details,
    domain::{
        announcement, company, real_estate, user, Announcement, Company,
        RealEstate, User,
    },
    infra::{Database, Memory},
    Config, Service,
};

/// [`Service`] over a [`Memory`] database.
pub(crate) type TestService = Service<Memory>;

/// Creates a new [`TestService`] over an empty [`Memory`] database.
pub(crate) fn service() -> TestService {
    Service::new(Config::default(), Memory::new())
}

/// Creates a new [`User`] with the provided [`user::Role`] and no
/// [`Company`].
pub(crate) fn user(role: user::Role) -> User {
    let id = user::Id::new();
    User {
        id,
        username: user::Username::new(format!("user-{id}")).unwrap(),
        email: user::Email::new(format!("{id}@example.com")).unwrap(),
        password_hash: user::PasswordHash::new(&"password".into()),
        role,
        company_id: None,
        membership: user::Membership::NotRequested,
        created_at: DateTime::now().coerce(),
    }
}

/// Creates a new advertiser [`User`] with the provided [`user::Membership`]
/// in the provided [`Company`].
pub(crate) fn member(
    company_id: company::Id,
    membership: user::Membership,
) -> User {
    User {
        company_id: Some(company_id),
        membership,
        ..user(user::Role::Advertiser)
    }
}

/// Returns the [`Caller`] authenticated as the provided [`User`].
pub(crate) fn caller(u: &User) -> Caller {
    Caller::User {
        id: u.id,
        role: u.role,
    }
}

/// Creates a new [`Company`].
pub(crate) fn company() -> Company {
    Company {
        id: company::Id::new(),
        name: company::Name::new("Sunny Homes").unwrap(),
        address: company::Address::new("Bulevar oslobodjenja 12").unwrap(),
        phone_number: user::Phone::new("021 555 333").unwrap(),
    }
}

/// Creates a new [`RealEstate`].
pub(crate) fn real_estate() -> RealEstate {
    RealEstate {
        id: real_estate::Id::new(),
        name: real_estate::Name::new("Cozy flat").unwrap(),
        kind: real_estate::Kind::new("flat").unwrap(),
        area: real_estate::Area::new(Decimal::new(55, 0)).unwrap(),
        heating_type: real_estate::HeatingType::new("central").unwrap(),
        equipment: None,
        deleted: false,
        location: real_estate::Location {
            country: "Serbia".into(),
            city: "Novi Sad".into(),
            region: "Liman".into(),
            street: "Narodnog fronta".into(),
            number: "12".into(),
        },
    }
}

/// Returns [`Details`] describing the provided [`RealEstate`].
pub(crate) fn details(r: &RealEstate) -> Details {
    Details {
        name: r.name.clone(),
        kind: r.kind.clone(),
        area: r.area,
        heating_type: r.heating_type.clone(),
        equipment: r.equipment.clone(),
        deleted: r.deleted,
        location: r.location.clone(),
    }
}

/// Creates a new not verified [`Announcement`] of the provided
/// [`RealEstate`] authored by the provided [`User`].
pub(crate) fn announcement(
    author_id: user::Id,
    real_estate_id: real_estate::Id,
) -> Announcement {
    Announcement {
        id: announcement::Id::new(),
        price: announcement::Price::new(Decimal::new(120_000, 0)).unwrap(),
        announced_at: DateTime::now().coerce(),
        modified_at: None,
        expiration_date: Date::from_calendar(2999, 1, 1).unwrap(),
        phone_number: user::Phone::new("0651234567").unwrap(),
        kind: announcement::Kind::new("sale").unwrap(),
        verification: announcement::Verification::NotVerified,
        deleted: false,
        real_estate_id,
        author_id,
    }
}

/// Stores the provided entity in the [`Memory`] database of the provided
/// [`TestService`].
pub(crate) async fn store<T>(svc: &TestService, entity: T)
where
    Memory: Database<Insert<T>, Ok = ()>,
    <Memory as Database<Insert<T>>>::Err: std::fmt::Debug,
{
    svc.database().execute(Insert(entity)).await.unwrap();
}
