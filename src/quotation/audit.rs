//! Audit trail for quotation and client actions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::clients::{Client, NewClient};
use super::models::QuotationHeader;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Created,
    Modified,
    DocumentGenerated,
    EmailSent,
    StatusChanged,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Created => "created",
            AuditAction::Modified => "modified",
            AuditAction::DocumentGenerated => "document_generated",
            AuditAction::EmailSent => "email_sent",
            AuditAction::StatusChanged => "status_changed",
        }
    }

    pub fn parse(value: &str) -> Option<AuditAction> {
        match value {
            "created" => Some(AuditAction::Created),
            "modified" => Some(AuditAction::Modified),
            "document_generated" => Some(AuditAction::DocumentGenerated),
            "email_sent" => Some(AuditAction::EmailSent),
            "status_changed" => Some(AuditAction::StatusChanged),
            _ => None,
        }
    }
}

/// One logged action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEntry {
    pub quotation_id: Uuid,
    pub action: AuditAction,
    pub user: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub changes: Value,
    pub metadata: Value,
}

impl AuditEntry {
    pub fn new(quotation_id: Uuid, action: AuditAction, user: Option<String>) -> Self {
        Self {
            quotation_id,
            action,
            user,
            timestamp: Utc::now(),
            changes: json!({}),
            metadata: json!({}),
        }
    }

    pub fn with_changes(mut self, changes: Value) -> Self {
        self.changes = changes;
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuditAction {
    Created,
    Modified,
    StatusChanged,
}

impl ClientAuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientAuditAction::Created => "created",
            ClientAuditAction::Modified => "modified",
            ClientAuditAction::StatusChanged => "status_changed",
        }
    }

    pub fn parse(value: &str) -> Option<ClientAuditAction> {
        match value {
            "created" => Some(ClientAuditAction::Created),
            "modified" => Some(ClientAuditAction::Modified),
            "status_changed" => Some(ClientAuditAction::StatusChanged),
            _ => None,
        }
    }
}

/// One logged change to the client directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientAuditEntry {
    pub client_id: Uuid,
    pub action: ClientAuditAction,
    pub user: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub changes: Value,
}

impl ClientAuditEntry {
    pub fn new(client_id: Uuid, action: ClientAuditAction, user: Option<String>) -> Self {
        Self {
            client_id,
            action,
            user,
            timestamp: Utc::now(),
            changes: json!({}),
        }
    }

    pub fn with_changes(mut self, changes: Value) -> Self {
        self.changes = changes;
        self
    }
}

fn record_change(changes: &mut Map<String, Value>, field: &str, before: String, after: String) {
    if before != after {
        changes.insert(field.to_string(), json!({ "old": before, "new": after }));
    }
}

/// Field-by-field diff of the tracked header fields.
pub fn track_changes(old: &QuotationHeader, new: &QuotationHeader) -> Value {
    let mut changes = Map::new();
    let mut record = |field: &str, before: String, after: String| {
        record_change(&mut changes, field, before, after)
    };

    record(
        "client",
        old.client_id.map(|id| id.to_string()).unwrap_or_default(),
        new.client_id.map(|id| id.to_string()).unwrap_or_default(),
    );
    record(
        "validity_period",
        old.validity_period_days.to_string(),
        new.validity_period_days.to_string(),
    );
    record(
        "point_of_contact",
        old.point_of_contact.clone(),
        new.point_of_contact.clone(),
    );
    record("status", old.status.to_string(), new.status.to_string());

    Value::Object(changes)
}

/// Diff of the editable client fields against cleaned input.
pub fn track_client_changes(old: &Client, new: &NewClient) -> Value {
    let mut changes = Map::new();
    let fields = [
        ("client_name", &old.client_name, &new.client_name),
        ("company_name", &old.company_name, &new.company_name),
        ("email", &old.email, &new.email),
        ("contact_number", &old.contact_number, &new.contact_number),
        ("address", &old.address, &new.address),
    ];
    for (field, before, after) in fields {
        record_change(&mut changes, field, before.clone(), after.clone());
    }
    Value::Object(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quotation::models::QuotationStatus;

    fn header() -> QuotationHeader {
        QuotationHeader {
            client_id: None,
            point_of_contact: "Asha".to_string(),
            validity_period_days: 30,
            status: QuotationStatus::Draft,
        }
    }

    #[test]
    fn test_track_changes_only_diffs() {
        let old = header();
        let mut new = header();
        new.validity_period_days = 45;
        new.status = QuotationStatus::Sent;

        let changes = track_changes(&old, &new);

        assert_eq!(changes["validity_period"]["old"], "30");
        assert_eq!(changes["validity_period"]["new"], "45");
        assert_eq!(changes["status"]["new"], "sent");
        assert!(changes.get("point_of_contact").is_none());
        assert!(changes.get("client").is_none());
    }

    #[test]
    fn test_track_changes_identical() {
        assert_eq!(track_changes(&header(), &header()), json!({}));
    }

    #[test]
    fn test_track_client_changes() {
        let old = Client {
            id: Uuid::new_v4(),
            client_name: "Test Client".to_string(),
            company_name: "Test Company".to_string(),
            email: "test@example.com".to_string(),
            contact_number: "9876543210".to_string(),
            address: "Addr".to_string(),
            is_active: true,
            created_at: Utc::now(),
        };
        let new = NewClient {
            client_name: "New Name".to_string(),
            company_name: old.company_name.clone(),
            email: old.email.clone(),
            contact_number: old.contact_number.clone(),
            address: old.address.clone(),
        };

        let changes = track_client_changes(&old, &new);

        assert_eq!(changes["client_name"]["old"], "Test Client");
        assert_eq!(changes["client_name"]["new"], "New Name");
        assert_eq!(changes.as_object().unwrap().len(), 1);
    }

    #[test]
    fn test_client_action_ids() {
        for action in [
            ClientAuditAction::Created,
            ClientAuditAction::Modified,
            ClientAuditAction::StatusChanged,
        ] {
            assert_eq!(ClientAuditAction::parse(action.as_str()), Some(action));
        }
        assert_eq!(ClientAuditAction::parse("email_sent"), None);
    }

    #[test]
    fn test_action_ids() {
        for action in [
            AuditAction::Created,
            AuditAction::Modified,
            AuditAction::DocumentGenerated,
            AuditAction::EmailSent,
            AuditAction::StatusChanged,
        ] {
            assert_eq!(AuditAction::parse(action.as_str()), Some(action));
        }
    }
}
