//! Response DTOs for quotation API endpoints.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::amount::{Amount, LineTotal};
use super::audit::{AuditEntry, ClientAuditEntry};
use super::calculators::{LocationTotals, QuotationTotals};
use super::catalog::{ServiceKind, StorageUnitType, DEFAULT_CATALOG};
use super::clients::Client;
use super::models::{ItemDescription, LineItem, LocationGroup, Quotation, QuotationStatus};
use super::validation::ValidationErrors;

/// Catalog entry for the service picker
#[derive(Debug, Serialize)]
pub struct CatalogEntry {
    pub id: ServiceKind,
    pub label: &'static str,
    pub has_unit_type: bool,
}

pub fn catalog() -> Vec<CatalogEntry> {
    DEFAULT_CATALOG
        .iter()
        .map(|kind| CatalogEntry {
            id: *kind,
            label: kind.label(),
            has_unit_type: kind.has_unit_type(),
        })
        .collect()
}

/// Response for a single line preview
#[derive(Debug, Serialize)]
pub struct LineTotalResponse {
    pub unit_cost: Amount,
    pub quantity: Amount,
    pub line_total: LineTotal,
}

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub id: Option<Uuid>,
    pub item_description: Option<ServiceKind>,
    pub custom_description: Option<String>,
    pub label: String,
    pub storage_unit_type: Option<StorageUnitType>,
    pub unit_cost: Amount,
    pub quantity: Amount,
    pub line_total: LineTotal,
}

impl From<&LineItem> for ItemResponse {
    fn from(item: &LineItem) -> Self {
        let (item_description, custom_description) = match item.description() {
            ItemDescription::Catalog(kind) => (Some(*kind), None),
            ItemDescription::Custom(text) => (None, Some(text.clone())),
        };
        Self {
            id: item.state().id(),
            item_description,
            custom_description,
            label: item.description().label().to_string(),
            storage_unit_type: item.unit_type(),
            unit_cost: item.unit_cost(),
            quantity: item.quantity(),
            line_total: item.line_total(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LocationResponse {
    pub id: Option<Uuid>,
    pub location_name: String,
    pub items: Vec<ItemResponse>,
    #[serde(flatten)]
    pub totals: LocationTotals,
}

impl From<&LocationGroup> for LocationResponse {
    fn from(location: &LocationGroup) -> Self {
        Self {
            id: location.state().id(),
            location_name: location.name().to_string(),
            items: location.items().map(ItemResponse::from).collect(),
            totals: location.totals(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QuotationResponse {
    pub id: Option<Uuid>,
    pub quotation_number: Option<String>,
    pub date: NaiveDate,
    pub valid_until: NaiveDate,
    pub client_id: Option<Uuid>,
    pub point_of_contact: String,
    pub validity_period: i64,
    pub status: QuotationStatus,
    pub created_by: Option<String>,
    pub locations: Vec<LocationResponse>,
    #[serde(flatten)]
    pub totals: QuotationTotals,
}

impl From<&Quotation> for QuotationResponse {
    fn from(quotation: &Quotation) -> Self {
        Self {
            id: quotation.id,
            quotation_number: quotation.quotation_number.clone(),
            date: quotation.date,
            valid_until: quotation.validity_date(),
            client_id: quotation.header.client_id,
            point_of_contact: quotation.header.point_of_contact.clone(),
            validity_period: quotation.header.validity_period_days,
            status: quotation.header.status,
            created_by: quotation.created_by.clone(),
            locations: quotation.locations().map(LocationResponse::from).collect(),
            totals: quotation.totals(),
        }
    }
}

/// Live preview: computed totals plus any problems, nothing saved
#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub quotation: QuotationResponse,
    pub errors: ValidationErrors,
}

/// Quotation detail with client and recent audit entries
#[derive(Debug, Serialize)]
pub struct QuotationDetailResponse {
    pub quotation: QuotationResponse,
    pub client: Option<ClientResponse>,
    pub audit_log: Vec<AuditEntry>,
}

#[derive(Debug, Serialize)]
pub struct QuotationSummaryResponse {
    pub id: Uuid,
    pub quotation_number: String,
    pub date: NaiveDate,
    pub client_name: String,
    pub company_name: String,
    pub status: QuotationStatus,
    #[serde(with = "rust_decimal::serde::str")]
    pub grand_total: Decimal,
}

#[derive(Debug, Serialize)]
pub struct QuotationListResponse {
    pub quotations: Vec<QuotationSummaryResponse>,
    pub page: i64,
    pub total_pages: i64,
    pub total: i64,
}

#[derive(Debug, Serialize)]
pub struct ClientResponse {
    #[serde(flatten)]
    pub client: Client,
    pub display_name: String,
}

impl From<Client> for ClientResponse {
    fn from(client: Client) -> Self {
        Self {
            display_name: client.display_name(),
            client,
        }
    }
}

/// Client with its recent audit entries
#[derive(Debug, Serialize)]
pub struct ClientDetailResponse {
    pub client: ClientResponse,
    pub audit_log: Vec<ClientAuditEntry>,
}

/// Result of an email send
#[derive(Debug, Serialize)]
pub struct SendEmailResponse {
    pub recipient: String,
    pub cc: Vec<String>,
    pub subject: String,
    pub status: QuotationStatus,
}

/// Generic error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
