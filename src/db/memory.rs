//! In-process store used when no database is configured, and by tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{plan_save, QuotationFilter, QuotationPage, QuotationStore};
use crate::error::Result;
use crate::quotation::{AuditEntry, Client, ClientAuditEntry, NewClient, Quotation};

#[derive(Debug, Clone)]
struct StoredQuotation {
    created_at: DateTime<Utc>,
    quotation: Quotation,
}

#[derive(Debug, Default)]
struct Inner {
    clients: HashMap<Uuid, Client>,
    quotations: HashMap<Uuid, StoredQuotation>,
    audit: Vec<AuditEntry>,
    client_audit: Vec<ClientAuditEntry>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

#[async_trait]
impl QuotationStore for MemoryStore {
    async fn list_clients(&self, active_only: bool) -> Result<Vec<Client>> {
        let inner = self.inner.read().await;
        let mut clients: Vec<Client> = inner
            .clients
            .values()
            .filter(|c| !active_only || c.is_active)
            .cloned()
            .collect();
        clients.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(clients)
    }

    async fn get_client(&self, id: Uuid) -> Result<Option<Client>> {
        Ok(self.inner.read().await.clients.get(&id).cloned())
    }

    async fn insert_client(&self, client: NewClient) -> Result<Client> {
        let client = Client {
            id: Uuid::new_v4(),
            client_name: client.client_name,
            company_name: client.company_name,
            email: client.email,
            contact_number: client.contact_number,
            address: client.address,
            is_active: true,
            created_at: Utc::now(),
        };
        self.inner
            .write()
            .await
            .clients
            .insert(client.id, client.clone());
        Ok(client)
    }

    async fn update_client(&self, id: Uuid, client: NewClient) -> Result<Option<Client>> {
        let mut inner = self.inner.write().await;
        Ok(inner.clients.get_mut(&id).map(|existing| {
            existing.client_name = client.client_name;
            existing.company_name = client.company_name;
            existing.email = client.email;
            existing.contact_number = client.contact_number;
            existing.address = client.address;
            existing.clone()
        }))
    }

    async fn set_client_active(&self, id: Uuid, is_active: bool) -> Result<Option<Client>> {
        let mut inner = self.inner.write().await;
        Ok(inner.clients.get_mut(&id).map(|existing| {
            existing.is_active = is_active;
            existing.clone()
        }))
    }

    async fn append_client_audit(&self, entry: &ClientAuditEntry) -> Result<()> {
        self.inner.write().await.client_audit.push(entry.clone());
        Ok(())
    }

    async fn client_audit_log(&self, client_id: Uuid, limit: i64) -> Result<Vec<ClientAuditEntry>> {
        let inner = self.inner.read().await;
        Ok(inner
            .client_audit
            .iter()
            .rev()
            .filter(|e| e.client_id == client_id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn count_numbers_with_prefix(&self, prefix: &str) -> Result<i64> {
        let inner = self.inner.read().await;
        let count = inner
            .quotations
            .values()
            .filter_map(|s| s.quotation.quotation_number.as_deref())
            .filter(|number| number.starts_with(prefix))
            .count();
        Ok(count as i64)
    }

    async fn save_quotation(&self, quotation: &Quotation) -> Result<Quotation> {
        let plan = plan_save(quotation);
        let saved = plan.saved;
        let id = saved.id.unwrap_or_else(Uuid::new_v4);

        let mut inner = self.inner.write().await;
        let created_at = inner
            .quotations
            .get(&id)
            .map(|s| s.created_at)
            .unwrap_or_else(Utc::now);
        inner.quotations.insert(
            id,
            StoredQuotation {
                created_at,
                quotation: saved.clone(),
            },
        );
        Ok(saved)
    }

    async fn get_quotation(&self, id: Uuid) -> Result<Option<Quotation>> {
        Ok(self
            .inner
            .read()
            .await
            .quotations
            .get(&id)
            .map(|s| s.quotation.clone()))
    }

    async fn list_quotations(&self, filter: &QuotationFilter) -> Result<QuotationPage> {
        let inner = self.inner.read().await;
        let needle = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut matches: Vec<&StoredQuotation> = inner
            .quotations
            .values()
            .filter(|s| filter.status.map_or(true, |st| s.quotation.header.status == st))
            .filter(|s| match &needle {
                None => true,
                Some(needle) => {
                    let number = s.quotation.quotation_number.as_deref().unwrap_or_default();
                    let client = s
                        .quotation
                        .header
                        .client_id
                        .and_then(|id| inner.clients.get(&id));
                    contains_ci(number, needle)
                        || client.is_some_and(|c| {
                            contains_ci(&c.client_name, needle)
                                || contains_ci(&c.company_name, needle)
                        })
                }
            })
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matches.len() as i64;
        let quotations = matches
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .map(|s| s.quotation.clone())
            .collect();

        Ok(QuotationPage { quotations, total })
    }

    async fn append_audit(&self, entry: &AuditEntry) -> Result<()> {
        self.inner.write().await.audit.push(entry.clone());
        Ok(())
    }

    async fn audit_log(&self, quotation_id: Uuid, limit: i64) -> Result<Vec<AuditEntry>> {
        let inner = self.inner.read().await;
        Ok(inner
            .audit
            .iter()
            .rev()
            .filter(|e| e.quotation_id == quotation_id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}
