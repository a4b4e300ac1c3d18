//! Persistence boundary for quotations, clients and the audit log.

pub mod memory;
pub mod queries;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::quotation::{
    AuditEntry, Client, ClientAuditEntry, LineItem, LocationGroup, NewClient, Quotation,
    QuotationStatus,
};

pub use memory::MemoryStore;
pub use queries::PgStore;

/// Filter for quotation listings
#[derive(Debug, Clone, Default)]
pub struct QuotationFilter {
    /// Matched against quotation number, client name and company name.
    pub search: Option<String>,
    pub status: Option<QuotationStatus>,
    pub limit: i64,
    pub offset: i64,
}

/// One page of quotations plus the unpaged count
#[derive(Debug, Clone, Default)]
pub struct QuotationPage {
    pub quotations: Vec<Quotation>,
    pub total: i64,
}

#[async_trait]
pub trait QuotationStore: Send + Sync {
    async fn list_clients(&self, active_only: bool) -> Result<Vec<Client>>;

    async fn get_client(&self, id: Uuid) -> Result<Option<Client>>;

    async fn insert_client(&self, client: NewClient) -> Result<Client>;

    /// Replace the editable fields; `None` when the client doesn't exist.
    async fn update_client(&self, id: Uuid, client: NewClient) -> Result<Option<Client>>;

    async fn set_client_active(&self, id: Uuid, is_active: bool) -> Result<Option<Client>>;

    async fn append_client_audit(&self, entry: &ClientAuditEntry) -> Result<()>;

    /// Most recent entries first.
    async fn client_audit_log(&self, client_id: Uuid, limit: i64) -> Result<Vec<ClientAuditEntry>>;

    /// Number of quotation numbers starting with `prefix`.
    async fn count_numbers_with_prefix(&self, prefix: &str) -> Result<i64>;

    /// Store the working copy and return it as saved: every entity has an
    /// id and soft-deleted rows are gone.
    async fn save_quotation(&self, quotation: &Quotation) -> Result<Quotation>;

    async fn get_quotation(&self, id: Uuid) -> Result<Option<Quotation>>;

    async fn list_quotations(&self, filter: &QuotationFilter) -> Result<QuotationPage>;

    async fn append_audit(&self, entry: &AuditEntry) -> Result<()>;

    /// Most recent entries first.
    async fn audit_log(&self, quotation_id: Uuid, limit: i64) -> Result<Vec<AuditEntry>>;
}

/// What a save has to write and delete.
#[derive(Debug, Clone)]
pub struct SavePlan {
    pub saved: Quotation,
    pub deleted_locations: Vec<Uuid>,
    pub deleted_items: Vec<Uuid>,
}

/// Assign ids to new entities and drop soft-deleted ones.
pub fn plan_save(quotation: &Quotation) -> SavePlan {
    let mut deleted_locations = Vec::new();
    let mut deleted_items = Vec::new();
    let mut locations = Vec::new();

    for location in quotation.all_locations() {
        let location_id = location.state().id().unwrap_or_else(Uuid::new_v4);
        if location.is_deleted() {
            deleted_locations.push(location_id);
            deleted_items.extend(location.all_items().iter().filter_map(|i| i.state().id()));
            continue;
        }

        let mut items = Vec::new();
        for item in location.all_items() {
            let item_id = item.state().id().unwrap_or_else(Uuid::new_v4);
            if item.is_deleted() {
                deleted_items.push(item_id);
                continue;
            }
            items.push(LineItem::restore(
                item_id,
                item.description().clone(),
                item.unit_type(),
                item.unit_cost(),
                item.quantity(),
            ));
        }
        locations.push(LocationGroup::restore(location_id, location.name(), items));
    }

    let mut saved =
        Quotation::new(quotation.date, quotation.header.clone()).with_locations(locations);
    saved.id = Some(quotation.id.unwrap_or_else(Uuid::new_v4));
    saved.quotation_number = quotation.quotation_number.clone();
    saved.created_by = quotation.created_by.clone();

    SavePlan {
        saved,
        deleted_locations,
        deleted_items,
    }
}
