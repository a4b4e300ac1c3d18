//! Quotation service functions with store access.
//!
//! Each operation loads what it needs through the store and the cache,
//! applies the edit to the in-memory aggregate, saves it, and records the
//! audit entry. Handlers stay thin.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use crate::cache::AppCache;
use crate::db::QuotationFilter;
use crate::error::{AppError, Result};
use crate::AppState;

use super::amount::Amount;
use super::audit::{
    track_changes, track_client_changes, AuditAction, AuditEntry, ClientAuditAction,
    ClientAuditEntry,
};
use super::calculators::line_total as price_line;
use super::clients::{Client, ClientInput};
use super::document::QuotationDocument;
use super::email::{compose, Sender};
use super::models::{Quotation, QuotationHeader, QuotationStatus};
use super::requests::{LineTotalRequest, ListQuotationsQuery, QuotationRequest, SendEmailRequest};
use super::responses::{
    ClientDetailResponse, LineTotalResponse, PreviewResponse, QuotationDetailResponse,
    QuotationListResponse, QuotationResponse, QuotationSummaryResponse, SendEmailResponse,
};
use super::validation::{normalize_email, parse_cc_list, FieldError, ValidationErrors};

/// Quotations per listing page
pub const PAGE_SIZE: i64 = 20;

/// Audit entries shown on the detail view
pub const AUDIT_LOG_LIMIT: i64 = 10;

/// Price one line from raw input.
pub fn line_total(request: &LineTotalRequest) -> Result<LineTotalResponse> {
    let mut errors = ValidationErrors::default();
    let unit_cost = Amount::parse_cost(&request.unit_cost)
        .map_err(|e| errors.push("unit_cost", e.to_string()))
        .ok();
    let quantity = Amount::parse_quantity(&request.quantity)
        .map_err(|e| errors.push("quantity", e.to_string()))
        .ok();

    match (unit_cost, quantity) {
        (Some(unit_cost), Some(quantity)) => Ok(LineTotalResponse {
            line_total: price_line(&unit_cost, &quantity),
            unit_cost,
            quantity,
        }),
        _ => Err(errors.into()),
    }
}

fn blank_quotation(state: &AppState, date: NaiveDate) -> Quotation {
    Quotation::new(
        date,
        QuotationHeader {
            client_id: None,
            point_of_contact: String::new(),
            validity_period_days: state.config.default_validity_days,
            status: QuotationStatus::Draft,
        },
    )
}

/// Apply a request and validate the result, collecting every problem.
fn apply_and_validate(request: &QuotationRequest, quotation: &mut Quotation) -> ValidationErrors {
    let mut errors = ValidationErrors::default();
    if let Err(e) = request.apply_to(quotation) {
        errors.extend(e);
    }
    if let Err(e) = quotation.validate() {
        errors.extend(e);
    }
    errors
}

/// Live totals for an unsaved working copy. Nothing is stored.
pub fn preview(state: &AppState, request: &QuotationRequest) -> PreviewResponse {
    let mut quotation = blank_quotation(state, Utc::now().date_naive());
    let errors = apply_and_validate(request, &mut quotation);
    PreviewResponse {
        quotation: QuotationResponse::from(&quotation),
        errors,
    }
}

/// The chosen client must exist and be active. A quotation already
/// addressed to a since-deactivated client may keep it.
async fn check_client(
    state: &AppState,
    quotation: &Quotation,
    current: Option<Uuid>,
    errors: &mut ValidationErrors,
) -> Result<()> {
    if let Some(client_id) = quotation.header.client_id {
        let selectable = match state.store.get_client(client_id).await? {
            Some(client) => client.is_active || current == Some(client_id),
            None => false,
        };
        if !selectable {
            errors.push("client", "Select a valid choice");
        }
    }
    Ok(())
}

/// `<prefix>-<YYYYMMDD>-<NNNN>`, counting existing numbers for the day.
async fn next_quotation_number(state: &AppState, date: NaiveDate) -> Result<String> {
    let prefix = format!("{}-{}", state.config.quotation_prefix, date.format("%Y%m%d"));
    let count = state.store.count_numbers_with_prefix(&prefix).await?;
    Ok(format!("{}-{:04}", prefix, count + 1))
}

fn saved_id(quotation: &Quotation) -> Result<Uuid> {
    quotation
        .id
        .ok_or_else(|| AppError::Internal("store returned a quotation without id".to_string()))
}

pub async fn create_quotation(
    state: &AppState,
    request: &QuotationRequest,
    user: Option<String>,
) -> Result<Quotation> {
    let date = Utc::now().date_naive();
    let mut quotation = blank_quotation(state, date);

    let mut errors = apply_and_validate(request, &mut quotation);
    check_client(state, &quotation, None, &mut errors).await?;
    errors.into_result()?;

    quotation.quotation_number = Some(next_quotation_number(state, date).await?);
    quotation.created_by = user.clone();

    let saved = state.store.save_quotation(&quotation).await?;
    let id = saved_id(&saved)?;
    state
        .store
        .append_audit(&AuditEntry::new(id, AuditAction::Created, user))
        .await?;

    info!(
        quotation_id = %id,
        number = saved.quotation_number.as_deref().unwrap_or_default(),
        grand_total = %saved.overall_grand_total(),
        "Quotation created"
    );
    Ok(saved)
}

/// Cached read of a saved quotation.
pub async fn get_quotation(state: &AppState, id: Uuid) -> Result<Arc<Quotation>> {
    if let Some(cached) = state.cache.quotations.get(&id).await {
        debug!("Cache HIT for quotation: {}", id);
        return Ok(cached);
    }
    debug!("Cache MISS for quotation: {}", id);
    let quotation = state
        .store
        .get_quotation(id)
        .await?
        .ok_or(AppError::NotFound("Quotation"))?;
    let quotation = Arc::new(quotation);
    state.cache.quotations.insert(id, quotation.clone()).await;
    Ok(quotation)
}

async fn quotation_client(state: &AppState, quotation: &Quotation) -> Result<Client> {
    let client_id = quotation.header.client_id.ok_or(AppError::NotFound("Client"))?;
    state
        .store
        .get_client(client_id)
        .await?
        .ok_or(AppError::NotFound("Client"))
}

pub async fn quotation_detail(state: &AppState, id: Uuid) -> Result<QuotationDetailResponse> {
    let quotation = get_quotation(state, id).await?;
    let client = match quotation.header.client_id {
        Some(client_id) => state.store.get_client(client_id).await?,
        None => None,
    };
    let audit_log = state.store.audit_log(id, AUDIT_LOG_LIMIT).await?;

    Ok(QuotationDetailResponse {
        quotation: QuotationResponse::from(quotation.as_ref()),
        client: client.map(Into::into),
        audit_log,
    })
}

/// Save a changed quotation and drop its cached copy.
async fn store_quotation(state: &AppState, quotation: &Quotation) -> Result<Quotation> {
    let saved = state.store.save_quotation(quotation).await?;
    state.cache.invalidate_quotation(saved_id(&saved)?).await;
    Ok(saved)
}

/// Edit a draft. Sent, accepted and rejected quotations are read-only.
pub async fn update_quotation(
    state: &AppState,
    id: Uuid,
    request: &QuotationRequest,
    user: Option<String>,
) -> Result<Quotation> {
    let mut quotation = get_quotation(state, id).await?.as_ref().clone();
    if !quotation.header.status.is_editable() {
        return Err(AppError::Conflict(format!(
            "Only draft quotations can be edited; this one is {}",
            quotation.header.status
        )));
    }
    let before = quotation.header.clone();

    let mut errors = apply_and_validate(request, &mut quotation);
    check_client(state, &quotation, before.client_id, &mut errors).await?;
    errors.into_result()?;

    let saved = store_quotation(state, &quotation).await?;
    let changes = track_changes(&before, &saved.header);
    state
        .store
        .append_audit(&AuditEntry::new(id, AuditAction::Modified, user).with_changes(changes))
        .await?;

    info!(quotation_id = %id, grand_total = %saved.overall_grand_total(), "Quotation updated");
    Ok(saved)
}

pub async fn set_status(
    state: &AppState,
    id: Uuid,
    status: QuotationStatus,
    user: Option<String>,
) -> Result<Quotation> {
    let mut quotation = get_quotation(state, id).await?.as_ref().clone();
    if quotation.header.status == status {
        return Ok(quotation);
    }
    let before = quotation.header.clone();
    quotation.header.status = status;

    let saved = store_quotation(state, &quotation).await?;
    let changes = track_changes(&before, &saved.header);
    state
        .store
        .append_audit(&AuditEntry::new(id, AuditAction::StatusChanged, user).with_changes(changes))
        .await?;

    info!(quotation_id = %id, from = %before.status, to = %status, "Quotation status changed");
    Ok(saved)
}

pub async fn list_quotations(
    state: &AppState,
    query: &ListQuotationsQuery,
) -> Result<QuotationListResponse> {
    let status = match query.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Some(QuotationStatus::parse(raw).ok_or_else(|| {
            ValidationErrors::from(FieldError::new("status", "Select a valid choice"))
        })?),
        None => None,
    };
    let page = query.page.unwrap_or(1).max(1);

    let result = state
        .store
        .list_quotations(&QuotationFilter {
            search: query.search.clone(),
            status,
            limit: PAGE_SIZE,
            offset: (page - 1).saturating_mul(PAGE_SIZE),
        })
        .await?;

    let clients: HashMap<Uuid, Client> = state
        .store
        .list_clients(false)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    let quotations = result
        .quotations
        .iter()
        .filter_map(|q| {
            let client = q.header.client_id.and_then(|id| clients.get(&id));
            Some(QuotationSummaryResponse {
                id: q.id?,
                quotation_number: q.quotation_number.clone().unwrap_or_default(),
                date: q.date,
                client_name: client.map(|c| c.client_name.clone()).unwrap_or_default(),
                company_name: client.map(|c| c.company_name.clone()).unwrap_or_default(),
                status: q.header.status,
                grand_total: q.overall_grand_total(),
            })
        })
        .collect();

    Ok(QuotationListResponse {
        quotations,
        page,
        total_pages: ((result.total + PAGE_SIZE - 1) / PAGE_SIZE).max(1),
        total: result.total,
    })
}

/// Finalized document view; logged as a generated document.
pub async fn generate_document(
    state: &AppState,
    id: Uuid,
    user: Option<String>,
) -> Result<QuotationDocument> {
    let quotation = get_quotation(state, id).await?;
    let client = quotation_client(state, &quotation).await?;
    let document = QuotationDocument::build(&quotation, &client);

    state
        .store
        .append_audit(
            &AuditEntry::new(id, AuditAction::DocumentGenerated, user)
                .with_metadata(json!({ "quotation_number": document.quotation_number })),
        )
        .await?;

    Ok(document)
}

/// Compose and send the quotation email. A draft becomes sent.
pub async fn send_quotation(
    state: &AppState,
    id: Uuid,
    request: &SendEmailRequest,
    user: Option<String>,
) -> Result<SendEmailResponse> {
    let mut quotation = get_quotation(state, id).await?.as_ref().clone();
    let client = quotation_client(state, &quotation).await?;

    let mut errors = ValidationErrors::default();
    let recipient = request
        .recipient_email
        .as_deref()
        .filter(|r| !r.trim().is_empty())
        .unwrap_or(client.email.as_str());
    let to = normalize_email("recipient_email", recipient)
        .map_err(|e| errors.add(e))
        .ok();
    let cc = parse_cc_list("cc_emails", &request.cc_emails)
        .map_err(|e| errors.add(e))
        .ok();
    let sender = Sender::resolve(
        quotation.created_by.as_deref(),
        state.config.default_from_email.as_deref(),
        &state.config.company_name,
    )
    .map_err(|e| errors.add(e))
    .ok();
    let (Some(to), Some(cc), Some(sender)) = (to, cc, sender) else {
        return Err(errors.into());
    };

    let number = quotation.quotation_number.clone().unwrap_or_default();
    let mut attachments = Vec::new();
    if request.include_docx {
        attachments.push(format!("{}.docx", number));
    }
    if request.include_pdf {
        attachments.push(format!("{}.pdf", number));
    }

    let email = compose(
        &quotation,
        &client,
        &sender,
        &state.config.company_name,
        to,
        cc,
        attachments,
    );
    state.mailer.send(&email).await?;

    if quotation.header.status == QuotationStatus::Draft {
        quotation.header.status = QuotationStatus::Sent;
        quotation = store_quotation(state, &quotation).await?;
    }

    state
        .store
        .append_audit(
            &AuditEntry::new(id, AuditAction::EmailSent, user).with_metadata(json!({
                "recipient": email.to,
                "cc": email.cc,
                "attachments": email.attachments,
            })),
        )
        .await?;

    info!(quotation_id = %id, to = %email.to, "Quotation emailed");
    Ok(SendEmailResponse {
        recipient: email.to,
        cc: email.cc,
        subject: email.subject,
        status: quotation.header.status,
    })
}

/// Client directory, served from cache when warm.
pub async fn list_clients(state: &AppState, include_inactive: bool) -> Result<Arc<Vec<Client>>> {
    let active_only = !include_inactive;
    let key = AppCache::client_listing_key(active_only);
    if let Some(cached) = state.cache.clients.get(&key).await {
        return Ok(cached);
    }
    let clients = Arc::new(state.store.list_clients(active_only).await?);
    state.cache.clients.insert(key, clients.clone()).await;
    Ok(clients)
}

pub async fn create_client(
    state: &AppState,
    input: &ClientInput,
    user: Option<String>,
) -> Result<Client> {
    let client = input.validate()?;
    let client = state.store.insert_client(client).await?;
    state.cache.invalidate_clients();
    state
        .store
        .append_client_audit(&ClientAuditEntry::new(client.id, ClientAuditAction::Created, user))
        .await?;
    info!(client_id = %client.id, "Client created");
    Ok(client)
}

async fn find_client(state: &AppState, id: Uuid) -> Result<Client> {
    state.store.get_client(id).await?.ok_or(AppError::NotFound("Client"))
}

pub async fn client_detail(state: &AppState, id: Uuid) -> Result<ClientDetailResponse> {
    let client = find_client(state, id).await?;
    let audit_log = state.store.client_audit_log(id, AUDIT_LOG_LIMIT).await?;
    Ok(ClientDetailResponse {
        client: client.into(),
        audit_log,
    })
}

/// Edit a client's details. Only fields that actually changed are logged.
pub async fn update_client(
    state: &AppState,
    id: Uuid,
    input: &ClientInput,
    user: Option<String>,
) -> Result<Client> {
    let before = find_client(state, id).await?;
    let cleaned = input.validate()?;
    let changes = track_client_changes(&before, &cleaned);

    let client = state
        .store
        .update_client(id, cleaned)
        .await?
        .ok_or(AppError::NotFound("Client"))?;
    state.cache.invalidate_clients();
    state
        .store
        .append_client_audit(
            &ClientAuditEntry::new(id, ClientAuditAction::Modified, user).with_changes(changes),
        )
        .await?;

    info!(client_id = %id, "Client updated");
    Ok(client)
}

/// Flip a client between active and inactive. Clients are never deleted.
pub async fn toggle_client_status(
    state: &AppState,
    id: Uuid,
    user: Option<String>,
) -> Result<Client> {
    let before = find_client(state, id).await?;
    let client = state
        .store
        .set_client_active(id, !before.is_active)
        .await?
        .ok_or(AppError::NotFound("Client"))?;
    state.cache.invalidate_clients();

    let changes = json!({
        "is_active": { "old": before.is_active.to_string(), "new": client.is_active.to_string() }
    });
    state
        .store
        .append_client_audit(
            &ClientAuditEntry::new(id, ClientAuditAction::StatusChanged, user)
                .with_changes(changes),
        )
        .await?;

    info!(client_id = %id, is_active = client.is_active, "Client status changed");
    Ok(client)
}
