use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, warn};

use crate::domain::{Property, PropertyId, PropertyRequest, RequestId, ShortlistEntry};
use crate::geocoding::{AddressSuggestion, Geocoder, GeocodingError, MIN_QUERY_CHARS};
use crate::store::{RentalStore, StoreError};
use crate::workflows::access::{
    AccessError, AuthError, AuthProvider, AuthUser, HomeGraph, Screen, SessionToken, SignInForm,
    SignUpForm, SignedIn, Viewer,
};
use crate::workflows::listings::{
    ListingError, ListingScope, PropertyDetail, PropertyDraft, PropertyEdit,
};
use crate::workflows::requests::{AcceptOutcome, PendingRequests, RequestError};
use crate::workflows::shortlist::{ShortlistError, ShortlistedProperty};
use crate::workflows::RentHub;

/// Shared handler state: the workflows plus an optional geocoder.
pub struct ApiState<S, A> {
    pub hub: Arc<RentHub<S, A>>,
    pub geocoder: Option<Arc<dyn Geocoder>>,
}

impl<S, A> Clone for ApiState<S, A> {
    fn clone(&self) -> Self {
        Self {
            hub: Arc::clone(&self.hub),
            geocoder: self.geocoder.clone(),
        }
    }
}

impl<S, A> ApiState<S, A> {
    pub fn new(hub: Arc<RentHub<S, A>>, geocoder: Option<Arc<dyn Geocoder>>) -> Self {
        Self { hub, geocoder }
    }
}

/// JSON API over every rental workflow.
pub fn rental_router<S, A>(state: ApiState<S, A>) -> Router
where
    S: RentalStore + 'static,
    A: AuthProvider + 'static,
{
    Router::new()
        .route("/api/v1/auth/sign-up", post(sign_up_handler::<S, A>))
        .route("/api/v1/auth/sign-in", post(sign_in_handler::<S, A>))
        .route("/api/v1/auth/sign-out", post(sign_out_handler::<S, A>))
        .route("/api/v1/session", get(session_handler::<S, A>))
        .route(
            "/api/v1/properties",
            get(list_properties_handler::<S, A>).post(add_property_handler::<S, A>),
        )
        .route(
            "/api/v1/properties/:property_id",
            get(property_detail_handler::<S, A>).patch(edit_property_handler::<S, A>),
        )
        .route(
            "/api/v1/properties/:property_id/listing",
            post(toggle_listed_handler::<S, A>),
        )
        .route(
            "/api/v1/properties/:property_id/requests",
            get(pending_requests_handler::<S, A>).post(create_request_handler::<S, A>),
        )
        .route(
            "/api/v1/properties/:property_id/requests/:request_id/accept",
            post(accept_request_handler::<S, A>),
        )
        .route("/api/v1/requests", get(my_requests_handler::<S, A>))
        .route(
            "/api/v1/requests/:request_id/deny",
            post(deny_request_handler::<S, A>),
        )
        .route(
            "/api/v1/shortlist",
            get(shortlisted_handler::<S, A>).post(shortlist_handler::<S, A>),
        )
        .route(
            "/api/v1/geocode/autocomplete",
            get(autocomplete_handler::<S, A>),
        )
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub user: Option<AuthUser>,
    pub home: HomeGraph,
    pub initial_screen: Screen,
    pub screens: &'static [Screen],
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub scope: ListingScope,
}

#[derive(Debug, Deserialize)]
pub struct OfferBody {
    pub offered_price: f64,
}

#[derive(Debug, Deserialize)]
pub struct ShortlistBody {
    pub property_id: PropertyId,
}

#[derive(Debug, Deserialize)]
pub struct AutocompleteQuery {
    #[serde(default)]
    pub text: String,
}

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<SessionToken> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(SessionToken(token.to_string()))
    }
}

fn viewer<S, A>(state: &ApiState<S, A>, headers: &HeaderMap) -> Result<Viewer, ApiError>
where
    S: RentalStore + 'static,
    A: AuthProvider + 'static,
{
    Ok(state.hub.access.viewer(bearer_token(headers).as_ref())?)
}

pub(crate) async fn sign_up_handler<S, A>(
    State(state): State<ApiState<S, A>>,
    Json(form): Json<SignUpForm>,
) -> Result<(StatusCode, Json<SignedIn>), ApiError>
where
    S: RentalStore + 'static,
    A: AuthProvider + 'static,
{
    let signed_in = state.hub.access.sign_up(form)?;
    Ok((StatusCode::CREATED, Json(signed_in)))
}

pub(crate) async fn sign_in_handler<S, A>(
    State(state): State<ApiState<S, A>>,
    Json(form): Json<SignInForm>,
) -> Result<Json<SignedIn>, ApiError>
where
    S: RentalStore + 'static,
    A: AuthProvider + 'static,
{
    Ok(Json(state.hub.access.sign_in(form)?))
}

pub(crate) async fn sign_out_handler<S, A>(
    State(state): State<ApiState<S, A>>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError>
where
    S: RentalStore + 'static,
    A: AuthProvider + 'static,
{
    let token = bearer_token(&headers).ok_or(AccessError::Unauthenticated)?;
    state.hub.access.sign_out(&token)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn session_handler<S, A>(
    State(state): State<ApiState<S, A>>,
    headers: HeaderMap,
) -> Result<Json<SessionView>, ApiError>
where
    S: RentalStore + 'static,
    A: AuthProvider + 'static,
{
    let (user, home) = state.hub.access.home(bearer_token(&headers).as_ref())?;
    Ok(Json(SessionView {
        user,
        home,
        initial_screen: home.initial_screen(),
        screens: home.screens(),
    }))
}

pub(crate) async fn list_properties_handler<S, A>(
    State(state): State<ApiState<S, A>>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Property>>, ApiError>
where
    S: RentalStore + 'static,
    A: AuthProvider + 'static,
{
    let viewer = viewer(&state, &headers)?;
    Ok(Json(state.hub.listings.list_properties(&viewer, query.scope)?))
}

pub(crate) async fn add_property_handler<S, A>(
    State(state): State<ApiState<S, A>>,
    headers: HeaderMap,
    Json(draft): Json<PropertyDraft>,
) -> Result<(StatusCode, Json<Property>), ApiError>
where
    S: RentalStore + 'static,
    A: AuthProvider + 'static,
{
    let viewer = viewer(&state, &headers)?;
    let property = state.hub.listings.add_property(&viewer, draft)?;
    Ok((StatusCode::CREATED, Json(property)))
}

pub(crate) async fn property_detail_handler<S, A>(
    State(state): State<ApiState<S, A>>,
    headers: HeaderMap,
    Path(property_id): Path<String>,
) -> Result<Json<PropertyDetail>, ApiError>
where
    S: RentalStore + 'static,
    A: AuthProvider + 'static,
{
    let viewer = viewer(&state, &headers)?;
    let detail = state
        .hub
        .listings
        .property_detail(&viewer, &PropertyId(property_id))?;
    Ok(Json(detail))
}

pub(crate) async fn edit_property_handler<S, A>(
    State(state): State<ApiState<S, A>>,
    headers: HeaderMap,
    Path(property_id): Path<String>,
    Json(edit): Json<PropertyEdit>,
) -> Result<Json<Property>, ApiError>
where
    S: RentalStore + 'static,
    A: AuthProvider + 'static,
{
    let viewer = viewer(&state, &headers)?;
    let property = state
        .hub
        .listings
        .edit_property(&viewer, &PropertyId(property_id), edit)?;
    Ok(Json(property))
}

pub(crate) async fn toggle_listed_handler<S, A>(
    State(state): State<ApiState<S, A>>,
    headers: HeaderMap,
    Path(property_id): Path<String>,
) -> Result<Json<Property>, ApiError>
where
    S: RentalStore + 'static,
    A: AuthProvider + 'static,
{
    let viewer = viewer(&state, &headers)?;
    let property = state
        .hub
        .listings
        .toggle_listed(&viewer, &PropertyId(property_id))?;
    Ok(Json(property))
}

pub(crate) async fn pending_requests_handler<S, A>(
    State(state): State<ApiState<S, A>>,
    headers: HeaderMap,
    Path(property_id): Path<String>,
) -> Result<Json<PendingRequests>, ApiError>
where
    S: RentalStore + 'static,
    A: AuthProvider + 'static,
{
    let viewer = viewer(&state, &headers)?;
    let pending = state
        .hub
        .requests
        .pending_requests(&viewer, &PropertyId(property_id))?;
    Ok(Json(pending))
}

pub(crate) async fn create_request_handler<S, A>(
    State(state): State<ApiState<S, A>>,
    headers: HeaderMap,
    Path(property_id): Path<String>,
    Json(offer): Json<OfferBody>,
) -> Result<(StatusCode, Json<PropertyRequest>), ApiError>
where
    S: RentalStore + 'static,
    A: AuthProvider + 'static,
{
    let viewer = viewer(&state, &headers)?;
    let request = state.hub.requests.create_request(
        &viewer,
        &PropertyId(property_id),
        offer.offered_price,
    )?;
    Ok((StatusCode::CREATED, Json(request)))
}

pub(crate) async fn my_requests_handler<S, A>(
    State(state): State<ApiState<S, A>>,
    headers: HeaderMap,
) -> Result<Json<Vec<PropertyRequest>>, ApiError>
where
    S: RentalStore + 'static,
    A: AuthProvider + 'static,
{
    let viewer = viewer(&state, &headers)?;
    Ok(Json(state.hub.requests.requests_for_user(&viewer)?))
}

pub(crate) async fn accept_request_handler<S, A>(
    State(state): State<ApiState<S, A>>,
    headers: HeaderMap,
    Path((property_id, request_id)): Path<(String, String)>,
) -> Result<Json<AcceptOutcome>, ApiError>
where
    S: RentalStore + 'static,
    A: AuthProvider + 'static,
{
    let viewer = viewer(&state, &headers)?;
    let outcome = state.hub.requests.accept_request(
        &viewer,
        &RequestId(request_id),
        &PropertyId(property_id),
    )?;
    Ok(Json(outcome))
}

pub(crate) async fn deny_request_handler<S, A>(
    State(state): State<ApiState<S, A>>,
    headers: HeaderMap,
    Path(request_id): Path<String>,
) -> Result<Json<PropertyRequest>, ApiError>
where
    S: RentalStore + 'static,
    A: AuthProvider + 'static,
{
    let viewer = viewer(&state, &headers)?;
    let request = state
        .hub
        .requests
        .deny_request(&viewer, &RequestId(request_id))?;
    Ok(Json(request))
}

pub(crate) async fn shortlisted_handler<S, A>(
    State(state): State<ApiState<S, A>>,
    headers: HeaderMap,
) -> Result<Json<Vec<ShortlistedProperty>>, ApiError>
where
    S: RentalStore + 'static,
    A: AuthProvider + 'static,
{
    let viewer = viewer(&state, &headers)?;
    Ok(Json(state.hub.shortlist.shortlisted(&viewer)?))
}

pub(crate) async fn shortlist_handler<S, A>(
    State(state): State<ApiState<S, A>>,
    headers: HeaderMap,
    Json(body): Json<ShortlistBody>,
) -> Result<Json<ShortlistEntry>, ApiError>
where
    S: RentalStore + 'static,
    A: AuthProvider + 'static,
{
    let viewer = viewer(&state, &headers)?;
    Ok(Json(state.hub.shortlist.shortlist(&viewer, &body.property_id)?))
}

pub(crate) async fn autocomplete_handler<S, A>(
    State(state): State<ApiState<S, A>>,
    Query(query): Query<AutocompleteQuery>,
) -> Result<Json<Vec<AddressSuggestion>>, ApiError>
where
    S: RentalStore + 'static,
    A: AuthProvider + 'static,
{
    let geocoder = state
        .geocoder
        .as_ref()
        .ok_or(ApiError::Geocoding(GeocodingError::Disabled))?;
    if query.text.chars().count() <= MIN_QUERY_CHARS {
        return Ok(Json(Vec::new()));
    }
    Ok(Json(geocoder.autocomplete(&query.text).await?))
}

/// Workflow failures as HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Listing(#[from] ListingError),
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error(transparent)]
    Shortlist(#[from] ShortlistError),
    #[error(transparent)]
    Geocoding(#[from] GeocodingError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Access(err) => match err {
                AccessError::MissingCredentials => StatusCode::BAD_REQUEST,
                AccessError::AlreadyRegistered { .. } => StatusCode::CONFLICT,
                AccessError::Unauthenticated => StatusCode::UNAUTHORIZED,
                AccessError::Auth(AuthError::EmailInUse(_)) => StatusCode::CONFLICT,
                AccessError::Auth(AuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
                AccessError::Auth(AuthError::WeakPassword { .. }) => StatusCode::BAD_REQUEST,
                AccessError::Auth(AuthError::Unavailable(_)) => StatusCode::INTERNAL_SERVER_ERROR,
                AccessError::Store(err) => store_status(err),
            },
            ApiError::Listing(err) => match err {
                ListingError::MissingFields => StatusCode::BAD_REQUEST,
                ListingError::LandlordOnly | ListingError::NotOwner => StatusCode::FORBIDDEN,
                ListingError::NotFound(_) => StatusCode::NOT_FOUND,
                ListingError::Store(err) => store_status(err),
            },
            ApiError::Request(err) => match err {
                RequestError::InvalidOffer => StatusCode::BAD_REQUEST,
                RequestError::PropertyNotFound(_)
                | RequestError::RequestNotFound(_)
                | RequestError::PropertyMismatch { .. } => StatusCode::NOT_FOUND,
                RequestError::OwnProperty | RequestError::NotOwner => StatusCode::FORBIDDEN,
                RequestError::NotListed(_)
                | RequestError::DuplicatePending(_)
                | RequestError::Transition(_) => StatusCode::CONFLICT,
                RequestError::Store(err) => store_status(err),
            },
            ApiError::Shortlist(err) => match err {
                ShortlistError::PropertyNotFound(_) => StatusCode::NOT_FOUND,
                ShortlistError::Store(err) => store_status(err),
            },
            ApiError::Geocoding(GeocodingError::Disabled) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Geocoding(GeocodingError::Http(_)) => StatusCode::BAD_GATEWAY,
        }
    }
}

fn store_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::PreconditionFailed { .. } => StatusCode::CONFLICT,
        StoreError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "request rejected");
        }

        let payload = json!({ "error": self.to_string() });
        (status, Json(payload)).into_response()
    }
}
