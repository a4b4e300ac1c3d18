//! PostgreSQL store.
//!
//! Runtime-checked sqlx queries against the schema in `migrations/`, which
//! the binary applies at startup. Unit cost and quantity are stored as text
//! so "at actual" round-trips.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use super::{plan_save, QuotationFilter, QuotationPage, QuotationStore};
use crate::error::{AppError, Result};
use crate::quotation::{
    Amount, AuditAction, AuditEntry, Client, ClientAuditAction, ClientAuditEntry,
    ItemDescription, LineItem, LocationGroup, NewClient, Quotation, QuotationHeader,
    QuotationStatus, ServiceKind, StorageUnitType,
};

/// Client row
#[derive(Debug, Clone, FromRow)]
struct ClientRow {
    id: Uuid,
    client_name: String,
    company_name: String,
    email: String,
    contact_number: String,
    address: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Client {
            id: row.id,
            client_name: row.client_name,
            company_name: row.company_name,
            email: row.email,
            contact_number: row.contact_number,
            address: row.address,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

/// Quotation header row
#[derive(Debug, Clone, FromRow)]
struct QuotationRow {
    id: Uuid,
    quotation_number: String,
    client_id: Uuid,
    date: NaiveDate,
    validity_period: i64,
    point_of_contact: String,
    status: String,
    created_by: Option<String>,
}

/// Location row
#[derive(Debug, Clone, FromRow)]
struct LocationRow {
    id: Uuid,
    location_name: String,
}

/// Item row
#[derive(Debug, Clone, FromRow)]
struct ItemRow {
    id: Uuid,
    location_id: Uuid,
    item_description: String,
    custom_description: Option<String>,
    storage_unit_type: Option<String>,
    unit_cost: String,
    quantity: String,
}

/// Audit row
#[derive(Debug, Clone, FromRow)]
struct AuditRow {
    quotation_id: Uuid,
    action: String,
    user_name: Option<String>,
    created_at: DateTime<Utc>,
    changes: serde_json::Value,
    metadata: serde_json::Value,
}

/// Client audit row
#[derive(Debug, Clone, FromRow)]
struct ClientAuditRow {
    client_id: Uuid,
    action: String,
    user_name: Option<String>,
    created_at: DateTime<Utc>,
    changes: serde_json::Value,
}

impl ItemRow {
    fn into_item(self) -> Result<LineItem> {
        let description = match self.custom_description.filter(|c| !c.is_empty()) {
            Some(custom) => ItemDescription::Custom(custom),
            None => ServiceKind::parse(&self.item_description)
                .map(ItemDescription::Catalog)
                .ok_or_else(|| {
                    AppError::Internal(format!("unknown service kind '{}'", self.item_description))
                })?,
        };
        Ok(LineItem::restore(
            self.id,
            description,
            self.storage_unit_type.as_deref().and_then(StorageUnitType::parse),
            Amount::from_stored(&self.unit_cost),
            Amount::from_stored(&self.quantity),
        ))
    }
}

fn description_columns(description: &ItemDescription) -> (&str, Option<&str>) {
    match description {
        ItemDescription::Catalog(kind) => (kind.as_str(), None),
        ItemDescription::Custom(text) => ("custom", Some(text.as_str())),
    }
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load(&self, row: QuotationRow) -> Result<Quotation> {
        let locations = sqlx::query_as::<_, LocationRow>(
            r#"
            SELECT id, location_name
            FROM quotation_locations
            WHERE quotation_id = $1
            ORDER BY display_order, id
            "#,
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?;

        let location_ids: Vec<Uuid> = locations.iter().map(|l| l.id).collect();
        let items = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT id, location_id, item_description, custom_description,
                   storage_unit_type, unit_cost, quantity
            FROM quotation_items
            WHERE location_id = ANY($1)
            ORDER BY display_order, id
            "#,
        )
        .bind(&location_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut groups = Vec::with_capacity(locations.len());
        for location in locations {
            let location_items = items
                .iter()
                .filter(|item| item.location_id == location.id)
                .cloned()
                .map(ItemRow::into_item)
                .collect::<Result<Vec<_>>>()?;
            groups.push(LocationGroup::restore(
                location.id,
                location.location_name,
                location_items,
            ));
        }

        let status = QuotationStatus::parse(&row.status)
            .ok_or_else(|| AppError::Internal(format!("unknown status '{}'", row.status)))?;
        let mut quotation = Quotation::new(
            row.date,
            QuotationHeader {
                client_id: Some(row.client_id),
                point_of_contact: row.point_of_contact,
                validity_period_days: row.validity_period,
                status,
            },
        )
        .with_locations(groups);
        quotation.id = Some(row.id);
        quotation.quotation_number = Some(row.quotation_number);
        quotation.created_by = row.created_by;
        Ok(quotation)
    }

    async fn write_children(
        tx: &mut Transaction<'_, Postgres>,
        quotation: &Quotation,
    ) -> Result<()> {
        let quotation_id = quotation.id;
        for (order, location) in quotation.all_locations().iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO quotation_locations (id, quotation_id, location_name, display_order)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (id) DO UPDATE
                SET location_name = EXCLUDED.location_name,
                    display_order = EXCLUDED.display_order,
                    updated_at = now()
                "#,
            )
            .bind(location.state().id())
            .bind(quotation_id)
            .bind(location.name())
            .bind(order as i32)
            .execute(&mut **tx)
            .await?;

            for (item_order, item) in location.all_items().iter().enumerate() {
                let (kind, custom) = description_columns(item.description());
                sqlx::query(
                    r#"
                    INSERT INTO quotation_items
                        (id, location_id, item_description, custom_description,
                         storage_unit_type, unit_cost, quantity, display_order)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                    ON CONFLICT (id) DO UPDATE
                    SET item_description = EXCLUDED.item_description,
                        custom_description = EXCLUDED.custom_description,
                        storage_unit_type = EXCLUDED.storage_unit_type,
                        unit_cost = EXCLUDED.unit_cost,
                        quantity = EXCLUDED.quantity,
                        display_order = EXCLUDED.display_order,
                        updated_at = now()
                    "#,
                )
                .bind(item.state().id())
                .bind(location.state().id())
                .bind(kind)
                .bind(custom)
                .bind(item.unit_type().map(|u| u.as_str()))
                .bind(item.unit_cost().to_stored())
                .bind(item.quantity().to_stored())
                .bind(item_order as i32)
                .execute(&mut **tx)
                .await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl QuotationStore for PgStore {
    async fn list_clients(&self, active_only: bool) -> Result<Vec<Client>> {
        let rows = sqlx::query_as::<_, ClientRow>(
            r#"
            SELECT id, client_name, company_name, email, contact_number,
                   address, is_active, created_at
            FROM clients
            WHERE ($1 = FALSE OR is_active)
            ORDER BY created_at DESC
            "#,
        )
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Client::from).collect())
    }

    async fn get_client(&self, id: Uuid) -> Result<Option<Client>> {
        let row = sqlx::query_as::<_, ClientRow>(
            r#"
            SELECT id, client_name, company_name, email, contact_number,
                   address, is_active, created_at
            FROM clients
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Client::from))
    }

    async fn insert_client(&self, client: NewClient) -> Result<Client> {
        let row = sqlx::query_as::<_, ClientRow>(
            r#"
            INSERT INTO clients (id, client_name, company_name, email, contact_number, address)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, client_name, company_name, email, contact_number,
                      address, is_active, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&client.client_name)
        .bind(&client.company_name)
        .bind(&client.email)
        .bind(&client.contact_number)
        .bind(&client.address)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update_client(&self, id: Uuid, client: NewClient) -> Result<Option<Client>> {
        let row = sqlx::query_as::<_, ClientRow>(
            r#"
            UPDATE clients
            SET client_name = $2, company_name = $3, email = $4,
                contact_number = $5, address = $6, updated_at = now()
            WHERE id = $1
            RETURNING id, client_name, company_name, email, contact_number,
                      address, is_active, created_at
            "#,
        )
        .bind(id)
        .bind(&client.client_name)
        .bind(&client.company_name)
        .bind(&client.email)
        .bind(&client.contact_number)
        .bind(&client.address)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Client::from))
    }

    async fn set_client_active(&self, id: Uuid, is_active: bool) -> Result<Option<Client>> {
        let row = sqlx::query_as::<_, ClientRow>(
            r#"
            UPDATE clients
            SET is_active = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, client_name, company_name, email, contact_number,
                      address, is_active, created_at
            "#,
        )
        .bind(id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Client::from))
    }

    async fn append_client_audit(&self, entry: &ClientAuditEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO client_audit (client_id, action, user_name, created_at, changes)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(entry.client_id)
        .bind(entry.action.as_str())
        .bind(entry.user.as_deref())
        .bind(entry.timestamp)
        .bind(&entry.changes)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn client_audit_log(&self, client_id: Uuid, limit: i64) -> Result<Vec<ClientAuditEntry>> {
        let rows = sqlx::query_as::<_, ClientAuditRow>(
            r#"
            SELECT client_id, action, user_name, created_at, changes
            FROM client_audit
            WHERE client_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(client_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let action = ClientAuditAction::parse(&row.action).ok_or_else(|| {
                    AppError::Internal(format!("unknown client audit action '{}'", row.action))
                })?;
                Ok(ClientAuditEntry {
                    client_id: row.client_id,
                    action,
                    user: row.user_name,
                    timestamp: row.created_at,
                    changes: row.changes,
                })
            })
            .collect()
    }

    async fn count_numbers_with_prefix(&self, prefix: &str) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM quotations WHERE quotation_number LIKE $1 || '%'",
        )
        .bind(prefix)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn save_quotation(&self, quotation: &Quotation) -> Result<Quotation> {
        let plan = plan_save(quotation);
        let saved = plan.saved;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO quotations
                (id, quotation_number, client_id, date, validity_period,
                 point_of_contact, status, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE
            SET client_id = EXCLUDED.client_id,
                validity_period = EXCLUDED.validity_period,
                point_of_contact = EXCLUDED.point_of_contact,
                status = EXCLUDED.status,
                updated_at = now()
            "#,
        )
        .bind(saved.id)
        .bind(saved.quotation_number.as_deref())
        .bind(saved.header.client_id)
        .bind(saved.date)
        .bind(saved.header.validity_period_days)
        .bind(&saved.header.point_of_contact)
        .bind(saved.header.status.as_str())
        .bind(saved.created_by.as_deref())
        .execute(&mut *tx)
        .await?;

        if !plan.deleted_items.is_empty() {
            sqlx::query("DELETE FROM quotation_items WHERE id = ANY($1)")
                .bind(&plan.deleted_items)
                .execute(&mut *tx)
                .await?;
        }
        if !plan.deleted_locations.is_empty() {
            sqlx::query("DELETE FROM quotation_locations WHERE id = ANY($1)")
                .bind(&plan.deleted_locations)
                .execute(&mut *tx)
                .await?;
        }

        Self::write_children(&mut tx, &saved).await?;
        tx.commit().await?;

        debug!(
            quotation_id = ?saved.id,
            deleted_locations = plan.deleted_locations.len(),
            deleted_items = plan.deleted_items.len(),
            "Quotation saved"
        );
        Ok(saved)
    }

    async fn get_quotation(&self, id: Uuid) -> Result<Option<Quotation>> {
        let row = sqlx::query_as::<_, QuotationRow>(
            r#"
            SELECT id, quotation_number, client_id, date, validity_period,
                   point_of_contact, status, created_by
            FROM quotations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.load(row).await?)),
            None => Ok(None),
        }
    }

    async fn list_quotations(&self, filter: &QuotationFilter) -> Result<QuotationPage> {
        let pattern = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));
        let status = filter.status.map(|s| s.as_str());

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM quotations q
            JOIN clients c ON c.id = q.client_id
            WHERE ($1::text IS NULL
                   OR q.quotation_number ILIKE $1
                   OR c.client_name ILIKE $1
                   OR c.company_name ILIKE $1)
              AND ($2::text IS NULL OR q.status = $2)
            "#,
        )
        .bind(pattern.as_deref())
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, QuotationRow>(
            r#"
            SELECT q.id, q.quotation_number, q.client_id, q.date, q.validity_period,
                   q.point_of_contact, q.status, q.created_by
            FROM quotations q
            JOIN clients c ON c.id = q.client_id
            WHERE ($1::text IS NULL
                   OR q.quotation_number ILIKE $1
                   OR c.client_name ILIKE $1
                   OR c.company_name ILIKE $1)
              AND ($2::text IS NULL OR q.status = $2)
            ORDER BY q.created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(pattern.as_deref())
        .bind(status)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await?;

        let mut quotations = Vec::with_capacity(rows.len());
        for row in rows {
            quotations.push(self.load(row).await?);
        }

        Ok(QuotationPage { quotations, total })
    }

    async fn append_audit(&self, entry: &AuditEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO quotation_audit
                (quotation_id, action, user_name, created_at, changes, metadata)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(entry.quotation_id)
        .bind(entry.action.as_str())
        .bind(entry.user.as_deref())
        .bind(entry.timestamp)
        .bind(&entry.changes)
        .bind(&entry.metadata)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn audit_log(&self, quotation_id: Uuid, limit: i64) -> Result<Vec<AuditEntry>> {
        let rows = sqlx::query_as::<_, AuditRow>(
            r#"
            SELECT quotation_id, action, user_name, created_at, changes, metadata
            FROM quotation_audit
            WHERE quotation_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(quotation_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let action = AuditAction::parse(&row.action).ok_or_else(|| {
                    AppError::Internal(format!("unknown audit action '{}'", row.action))
                })?;
                Ok(AuditEntry {
                    quotation_id: row.quotation_id,
                    action,
                    user: row.user_name,
                    timestamp: row.created_at,
                    changes: row.changes,
                    metadata: row.metadata,
                })
            })
            .collect()
    }
}
