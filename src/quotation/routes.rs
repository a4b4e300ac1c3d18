//! HTTP route handlers for the quotation API.

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::error::Result;
use crate::AppState;

use super::clients::ClientInput;
use super::document::QuotationDocument;
use super::requests::{
    LineTotalRequest, ListClientsQuery, ListQuotationsQuery, QuotationRequest, SendEmailRequest,
    StatusRequest,
};
use super::responses::{
    catalog, CatalogEntry, ClientDetailResponse, ClientResponse, LineTotalResponse,
    PreviewResponse, QuotationDetailResponse, QuotationListResponse, QuotationResponse,
    SendEmailResponse,
};
use super::services;

/// Header carrying the acting user's email address.
pub const USER_HEADER: &str = "x-user-email";

/// Acting user, when the caller identifies one.
#[derive(Debug, Clone, Default)]
pub struct Actor(pub Option<String>);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Actor {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let user = parts
            .headers
            .get(USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        Ok(Actor(user))
    }
}

/// Quotation API router, mounted under `/api`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/catalog", get(get_catalog))
        .route("/pricing/line-total", post(line_total))
        .route("/pricing/preview", post(preview))
        .route("/clients", get(list_clients).post(create_client))
        .route("/clients/:id", get(client_detail).put(update_client))
        .route("/clients/:id/toggle-status", post(toggle_client_status))
        .route("/quotations", get(list_quotations).post(create_quotation))
        .route("/quotations/:id", get(quotation_detail).put(update_quotation))
        .route("/quotations/:id/status", put(set_status))
        .route("/quotations/:id/document", get(document))
        .route("/quotations/:id/send", post(send_quotation))
}

async fn get_catalog() -> Json<Vec<CatalogEntry>> {
    Json(catalog())
}

async fn line_total(Json(body): Json<LineTotalRequest>) -> Result<Json<LineTotalResponse>> {
    Ok(Json(services::line_total(&body)?))
}

async fn preview(
    State(state): State<AppState>,
    Json(body): Json<QuotationRequest>,
) -> Json<PreviewResponse> {
    Json(services::preview(&state, &body))
}

async fn list_clients(
    State(state): State<AppState>,
    Query(query): Query<ListClientsQuery>,
) -> Result<Json<Vec<ClientResponse>>> {
    let clients = services::list_clients(&state, query.include_inactive).await?;
    Ok(Json(clients.iter().cloned().map(ClientResponse::from).collect()))
}

async fn create_client(
    State(state): State<AppState>,
    Actor(user): Actor,
    Json(body): Json<ClientInput>,
) -> Result<impl IntoResponse> {
    let client = services::create_client(&state, &body, user).await?;
    Ok((StatusCode::CREATED, Json(ClientResponse::from(client))))
}

async fn client_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClientDetailResponse>> {
    Ok(Json(services::client_detail(&state, id).await?))
}

async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Actor(user): Actor,
    Json(body): Json<ClientInput>,
) -> Result<Json<ClientResponse>> {
    let client = services::update_client(&state, id, &body, user).await?;
    Ok(Json(ClientResponse::from(client)))
}

async fn toggle_client_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Actor(user): Actor,
) -> Result<Json<ClientResponse>> {
    let client = services::toggle_client_status(&state, id, user).await?;
    Ok(Json(ClientResponse::from(client)))
}

async fn list_quotations(
    State(state): State<AppState>,
    Query(query): Query<ListQuotationsQuery>,
) -> Result<Json<QuotationListResponse>> {
    Ok(Json(services::list_quotations(&state, &query).await?))
}

async fn create_quotation(
    State(state): State<AppState>,
    Actor(user): Actor,
    Json(body): Json<QuotationRequest>,
) -> Result<impl IntoResponse> {
    let quotation = services::create_quotation(&state, &body, user).await?;
    Ok((StatusCode::CREATED, Json(QuotationResponse::from(&quotation))))
}

async fn quotation_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuotationDetailResponse>> {
    Ok(Json(services::quotation_detail(&state, id).await?))
}

async fn update_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Actor(user): Actor,
    Json(body): Json<QuotationRequest>,
) -> Result<Json<QuotationResponse>> {
    let quotation = services::update_quotation(&state, id, &body, user).await?;
    Ok(Json(QuotationResponse::from(&quotation)))
}

async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Actor(user): Actor,
    Json(body): Json<StatusRequest>,
) -> Result<Json<QuotationResponse>> {
    let quotation = services::set_status(&state, id, body.status, user).await?;
    Ok(Json(QuotationResponse::from(&quotation)))
}

async fn document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Actor(user): Actor,
) -> Result<Json<QuotationDocument>> {
    Ok(Json(services::generate_document(&state, id, user).await?))
}

async fn send_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Actor(user): Actor,
    Json(body): Json<SendEmailRequest>,
) -> Result<Json<SendEmailResponse>> {
    Ok(Json(services::send_quotation(&state, id, &body, user).await?))
}
