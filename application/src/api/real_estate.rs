//! [`RealEstate`]-related definitions.

use std::str::FromStr as _;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query,
    },
    routing::get,
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service::{
    access::Operation,
    command::{self, create_real_estate::Details, Command as _},
    domain::{self, real_estate},
    query,
    read,
};

use crate::{
    api::{self, field, Created, Pagination},
    define_error, AsError, Context, Error,
};

/// Builds the [`Router`] of [`RealEstate`] endpoints.
pub(crate) fn router() -> Router {
    Router::new()
        .route("/", get(list).post(create).put(update))
        .route("/similar", get(similar))
        .route("/deleted/:status", get(by_deleted))
        .route("/:id", get(by_id).delete(delete))
}

/// An advertised real estate.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealEstate {
    /// Unique identifier of this [`RealEstate`].
    pub id: real_estate::Id,

    /// Name of this [`RealEstate`].
    pub name: String,

    /// Kind of this [`RealEstate`].
    #[serde(rename = "type")]
    pub kind: String,

    /// Area of this [`RealEstate`] in square meters.
    pub area: Decimal,

    /// Heating type of this [`RealEstate`].
    pub heating_type: String,

    /// Equipment description of this [`RealEstate`].
    pub equipment: Option<String>,

    /// Whether this [`RealEstate`] is marked as deleted.
    pub deleted: bool,

    /// [`Location`] of this [`RealEstate`].
    pub location: Location,
}

impl From<domain::RealEstate> for RealEstate {
    fn from(r: domain::RealEstate) -> Self {
        Self {
            id: r.id,
            name: r.name.into_inner(),
            kind: r.kind.into_inner(),
            area: r.area.into(),
            heating_type: r.heating_type.into_inner(),
            equipment: r.equipment.map(real_estate::Equipment::into_inner),
            deleted: r.deleted,
            location: r.location.into(),
        }
    }
}

/// Location of a [`RealEstate`].
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Location {
    /// Country.
    pub country: String,

    /// City.
    pub city: String,

    /// Region of the city.
    pub region: String,

    /// Street.
    pub street: String,

    /// Building number.
    pub number: String,
}

impl From<real_estate::Location> for Location {
    fn from(l: real_estate::Location) -> Self {
        let real_estate::Location {
            country,
            city,
            region,
            street,
            number,
        } = l;
        Self {
            country,
            city,
            region,
            street,
            number,
        }
    }
}

impl From<Location> for real_estate::Location {
    fn from(l: Location) -> Self {
        let Location {
            country,
            city,
            region,
            street,
            number,
        } = l;
        Self {
            country,
            city,
            region,
            street,
            number,
        }
    }
}

/// [`RealEstate`] details in a request.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Input {
    /// ID of the updated [`RealEstate`].
    pub id: Option<real_estate::Id>,

    /// Name of the [`RealEstate`].
    pub name: String,

    /// Kind of the [`RealEstate`].
    #[serde(rename = "type")]
    pub kind: String,

    /// Area of the [`RealEstate`].
    pub area: Decimal,

    /// Heating type of the [`RealEstate`].
    pub heating_type: String,

    /// Equipment description of the [`RealEstate`].
    pub equipment: Option<String>,

    /// Whether the [`RealEstate`] is marked as deleted.
    pub deleted: bool,

    /// [`Location`] of the [`RealEstate`].
    #[serde(default)]
    pub location: Location,
}

impl Input {
    /// Validates this [`Input`] into [`Details`].
    pub(crate) fn parse(self) -> Result<Details, Error> {
        Ok(Details {
            name: field("name", real_estate::Name::new(self.name))?,
            kind: field("type", real_estate::Kind::new(self.kind))?,
            area: field("area", real_estate::Area::new(self.area))?,
            heating_type: field(
                "heatingType",
                real_estate::HeatingType::new(self.heating_type),
            )?,
            equipment: self
                .equipment
                .map(|e| field("equipment", real_estate::Equipment::new(e)))
                .transpose()?,
            deleted: self.deleted,
            location: self.location.into(),
        })
    }
}

/// Criteria of similar [`RealEstate`]s.
#[derive(Clone, Debug, Deserialize)]
pub struct Similarity {
    /// Area of the [`RealEstate`].
    pub area: String,

    /// [`Location`] of the [`RealEstate`].
    #[serde(flatten)]
    pub location: Location,
}

#[tracing::instrument(skip_all)]
async fn create(
    ctx: Context,
    input: Result<Json<Input>, JsonRejection>,
) -> Result<Created<RealEstate>, Error> {
    ctx.authorize(Operation::CreateRealEstate)?;
    let Json(input) = input.map_err(AsError::into_error)?;

    let real_estate = ctx
        .service()
        .execute(command::CreateRealEstate {
            caller: ctx.caller(),
            details: input.parse()?,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Created {
        location: format!("/api/real-estates/{}", real_estate.id),
        body: real_estate.into(),
    })
}

#[tracing::instrument(skip_all)]
async fn update(
    ctx: Context,
    input: Result<Json<Input>, JsonRejection>,
) -> Result<Json<RealEstate>, Error> {
    ctx.authorize(Operation::UpdateRealEstate)?;
    let Json(input) = input.map_err(AsError::into_error)?;
    let id = field("id", input.id)?;

    ctx.service()
        .execute(command::UpdateRealEstate {
            caller: ctx.caller(),
            id,
            details: input.parse()?,
        })
        .await
        .map_err(AsError::into_error)
        .map(|r| Json(r.into()))
}

#[tracing::instrument(skip_all)]
async fn list(
    ctx: Context,
    pagination: Result<Query<Pagination>, QueryRejection>,
) -> Result<Json<api::Page<RealEstate>>, Error> {
    ctx.authorize(Operation::ListRealEstates)?;
    let Query(pagination) = pagination.map_err(AsError::into_error)?;

    select(&ctx, pagination, None).await
}

#[tracing::instrument(skip_all)]
async fn by_deleted(
    ctx: Context,
    deleted: Result<Path<bool>, PathRejection>,
    pagination: Result<Query<Pagination>, QueryRejection>,
) -> Result<Json<api::Page<RealEstate>>, Error> {
    let Path(deleted) = deleted.map_err(AsError::into_error)?;
    ctx.authorize(Operation::ListRealEstatesByDeleted { deleted })?;
    let Query(pagination) = pagination.map_err(AsError::into_error)?;

    select(&ctx, pagination, Some(deleted)).await
}

/// Selects a page of [`RealEstate`]s, optionally filtered by their deletion
/// mark.
async fn select(
    ctx: &Context,
    pagination: Pagination,
    deleted: Option<bool>,
) -> Result<Json<api::Page<RealEstate>>, Error> {
    ctx.service()
        .execute(query::real_estate::List::by(
            read::real_estate::list::Selector {
                arguments: pagination.arguments()?,
                filter: read::real_estate::list::Filter { deleted },
            },
        ))
        .await
        .map_err(AsError::into_error)
        .map(|p| Json(api::Page::from(p.map(RealEstate::from))))
}

#[tracing::instrument(skip_all)]
async fn similar(
    ctx: Context,
    similarity: Result<Query<Similarity>, QueryRejection>,
) -> Result<Json<Vec<RealEstate>>, Error> {
    ctx.authorize(Operation::FindSimilarRealEstates)?;
    let Query(Similarity { area, location }) =
        similarity.map_err(AsError::into_error)?;
    let area = field(
        "area",
        Decimal::from_str(&area).ok().and_then(real_estate::Area::new),
    )?;

    ctx.service()
        .execute(query::real_estate::Similar::by(read::real_estate::Similar {
            area,
            location: location.into(),
        }))
        .await
        .map_err(AsError::into_error)
        .map(|rs| Json(rs.into_iter().map(Into::into).collect()))
}

#[tracing::instrument(skip_all)]
async fn by_id(
    ctx: Context,
    id: Result<Path<real_estate::Id>, PathRejection>,
) -> Result<Json<RealEstate>, Error> {
    ctx.authorize(Operation::ViewRealEstate)?;
    let Path(id) = id.map_err(AsError::into_error)?;

    ctx.service()
        .execute(query::real_estate::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| RealEstateError::NotExists.into())
        .map(|r| Json(r.into()))
}

#[tracing::instrument(skip_all)]
async fn delete(
    ctx: Context,
    id: Result<Path<real_estate::Id>, PathRejection>,
) -> Result<Json<RealEstate>, Error> {
    ctx.authorize(Operation::DeleteRealEstate)?;
    let Path(id) = id.map_err(AsError::into_error)?;

    ctx.service()
        .execute(command::DeleteRealEstate {
            caller: ctx.caller(),
            id,
        })
        .await
        .map_err(AsError::into_error)
        .map(|r| Json(r.into()))
}

define_error! {
    enum RealEstateError {
        #[code = "NON_EXISTING_ENTITY"]
        #[number = 1]
        #[status = NOT_FOUND]
        #[message = "There is no real estate with specified id"]
        NotExists,

        #[code = "REAL_ESTATE_IN_USE"]
        #[status = CONFLICT]
        #[message = "Real estate is advertised by an announcement"]
        InUse,
    }
}

impl AsError for command::create_real_estate::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Access(e) => e.try_as_error(),
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::update_real_estate::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Access(e) => e.try_as_error(),
            Self::Db(e) => e.try_as_error(),
            Self::RealEstateNotExists(_) => {
                Some(RealEstateError::NotExists.into())
            }
        }
    }
}

impl AsError for command::delete_real_estate::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Access(e) => e.try_as_error(),
            Self::Db(e) => e.try_as_error(),
            Self::RealEstateInUse(_) => Some(RealEstateError::InUse.into()),
            Self::RealEstateNotExists(_) => {
                Some(RealEstateError::NotExists.into())
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use serde_json::{json, Value};
    use service::domain::user;

    use crate::api::spec;

    fn flat() -> Value {
        json!({
            "name": "Cozy flat",
            "type": "flat",
            "area": 55.5,
            "heatingType": "central",
            "deleted": false,
            "location": {
                "country": "Serbia",
                "city": "Novi Sad",
                "region": "Liman",
                "street": "Narodnog fronta",
                "number": "12",
            },
        })
    }

    #[tokio::test]
    async fn created_real_estate_reads_back_equal() {
        let (app, svc) = spec::app();
        let (_, token) = spec::login(&svc, user::Role::Advertiser, None).await;

        let (status, headers, created) = spec::send(
            app.clone(),
            http::Method::POST,
            "/api/real-estates",
            Some(&token),
            Some(flat()),
        )
        .await;
        assert_eq!(status, http::StatusCode::CREATED);

        let location = headers[http::header::LOCATION].to_str().unwrap();
        let (status, _, fetched) =
            spec::send(app, http::Method::GET, location, None, None).await;
        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(fetched, created);
        for key in ["name", "type", "heatingType", "deleted", "location"] {
            assert_eq!(fetched[key], flat()[key], "field: {key}");
        }
        assert_eq!(fetched["area"].as_f64(), Some(55.5));
    }

    #[tokio::test]
    async fn finds_similar_real_estates() {
        let (app, svc) = spec::app();
        let (_, token) = spec::login(&svc, user::Role::Advertiser, None).await;
        _ = spec::send(
            app.clone(),
            http::Method::POST,
            "/api/real-estates",
            Some(&token),
            Some(flat()),
        )
        .await;

        let (status, _, body) = spec::send(
            app.clone(),
            http::Method::GET,
            "/api/real-estates/similar?area=55.5&country=Serbia&city=Novi%20Sad\
             &region=Liman&street=Narodnog%20fronta&number=12",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(1));

        let (status, _, body) = spec::send(
            app,
            http::Method::GET,
            "/api/real-estates/similar?area=55.5&country=Serbia&city=Beograd\
             &region=Liman&street=Narodnog%20fronta&number=12",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn rejects_missing_required_field() {
        let (app, svc) = spec::app();
        let (_, token) = spec::login(&svc, user::Role::Advertiser, None).await;
        let mut payload = flat();
        _ = payload.as_object_mut().unwrap().remove("heatingType");

        let (status, _, body) = spec::send(
            app,
            http::Method::POST,
            "/api/real-estates",
            Some(&token),
            Some(payload),
        )
        .await;

        assert_eq!(status, http::StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "MISSING_FIELD");
        assert_eq!(body["field"], "heatingType");
        assert_eq!(body["message"], "`heatingType` is required");
    }

    #[tokio::test]
    async fn guest_cannot_list_not_deleted() {
        let (app, _) = spec::app();

        let (status, _, _) = spec::send(
            app,
            http::Method::GET,
            "/api/real-estates/deleted/false",
            None,
            None,
        )
        .await;

        assert_eq!(status, http::StatusCode::UNAUTHORIZED);
    }
}
