//! Request DTOs for quotation API endpoints.
//!
//! Quotation edits follow formset semantics: every location and item may
//! carry the `id` it was saved under and a `delete` flag. Saved entities left
//! out of a request are kept unchanged.

use serde::Deserialize;
use uuid::Uuid;

use super::catalog::{ServiceKind, StorageUnitType, DEFAULT_CATALOG};
use super::models::{
    ItemDescription, LineItem, LocationGroup, Quotation, QuotationError, QuotationStatus,
    RecordState,
};
use super::validation::{FieldError, ValidationErrors};

fn default_true() -> bool {
    true
}

/// Request to price a single line
#[derive(Debug, Deserialize)]
pub struct LineTotalRequest {
    #[serde(default)]
    pub unit_cost: String,
    #[serde(default)]
    pub quantity: String,
}

/// Full quotation working copy, used for create, update and preview
#[derive(Debug, Deserialize)]
pub struct QuotationRequest {
    #[serde(default)]
    pub client_id: Option<Uuid>,
    #[serde(default)]
    pub point_of_contact: String,
    /// Left unchanged when omitted.
    #[serde(default)]
    pub validity_period: Option<i64>,
    #[serde(default)]
    pub locations: Vec<LocationRequest>,
}

/// A location in the request
#[derive(Debug, Deserialize)]
pub struct LocationRequest {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub location_name: String,
    #[serde(default)]
    pub delete: bool,
    /// `None` on a new location means "populate from the default catalog".
    #[serde(default)]
    pub items: Option<Vec<ItemRequest>>,
}

/// A line item in the request
#[derive(Debug, Deserialize)]
pub struct ItemRequest {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub item_description: String,
    #[serde(default)]
    pub custom_description: Option<String>,
    #[serde(default)]
    pub storage_unit_type: Option<String>,
    #[serde(default)]
    pub unit_cost: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub delete: bool,
}

/// Request to move a quotation to another status
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: QuotationStatus,
}

/// Request to email a quotation
#[derive(Debug, Default, Deserialize)]
pub struct SendEmailRequest {
    #[serde(default)]
    pub recipient_email: Option<String>,
    #[serde(default)]
    pub cc_emails: String,
    #[serde(default = "default_true")]
    pub include_docx: bool,
    #[serde(default = "default_true")]
    pub include_pdf: bool,
}

/// Query parameters for quotation listing
#[derive(Debug, Default, Deserialize)]
pub struct ListQuotationsQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub page: Option<i64>,
}

/// Query parameters for the client directory
#[derive(Debug, Default, Deserialize)]
pub struct ListClientsQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

impl ItemRequest {
    fn description(&self) -> Result<ItemDescription, FieldError> {
        if let Some(custom) = self.custom_description.as_deref().map(str::trim) {
            if !custom.is_empty() {
                return Ok(ItemDescription::Custom(custom.to_string()));
            }
        }
        ServiceKind::parse(self.item_description.trim())
            .map(ItemDescription::Catalog)
            .ok_or_else(|| FieldError::new("item_description", "Select a valid choice"))
    }

    /// Copy the edited fields onto an item, reporting every bad field.
    fn apply(
        &self,
        description: ItemDescription,
        item: &mut LineItem,
        errors: &mut ValidationErrors,
        prefix: &str,
    ) {
        item.set_description(description);
        if let Some(raw) = self.storage_unit_type.as_deref().filter(|s| !s.is_empty()) {
            if item.unit_type().is_some() {
                match StorageUnitType::parse(raw) {
                    Some(unit) => {
                        if let Err(e) = item.set_unit_type(unit) {
                            errors.add(e.nested(prefix));
                        }
                    }
                    None => errors.push(
                        format!("{}.storage_unit_type", prefix),
                        "Select a valid choice",
                    ),
                }
            }
        }
        if let Err(e) = item.set_cost(&self.unit_cost) {
            errors.add(e.nested(prefix));
        }
        if let Err(e) = item.set_quantity(&self.quantity) {
            errors.add(e.nested(prefix));
        }
    }
}

fn apply_items(
    requests: &Option<Vec<ItemRequest>>,
    location: &mut LocationGroup,
    prefix: &str,
    errors: &mut ValidationErrors,
) {
    let Some(requests) = requests else {
        if location.state() == RecordState::New && location.all_items().is_empty() {
            for kind in DEFAULT_CATALOG {
                location.add_item(LineItem::new(kind));
            }
        }
        return;
    };

    for (position, request) in requests.iter().enumerate() {
        let item_prefix = format!("{}.items[{}]", prefix, position);

        let existing = match request.id {
            Some(id) => {
                match location
                    .all_items()
                    .iter()
                    .position(|item| item.state() == RecordState::Persisted(id))
                {
                    Some(index) => Some(index),
                    None => {
                        errors.push(format!("{}.id", item_prefix), "Unknown item");
                        continue;
                    }
                }
            }
            None => None,
        };

        if request.delete {
            if let Some(index) = existing {
                if let Err(e) = location.remove_item(index) {
                    errors.push(item_prefix, e.to_string());
                }
            }
            continue;
        }

        let description = match request.description() {
            Ok(description) => description,
            Err(e) => {
                errors.add(e.nested(&item_prefix));
                continue;
            }
        };

        let index = match existing {
            Some(index) => index,
            None => {
                location.add_item(match &description {
                    ItemDescription::Catalog(kind) => LineItem::new(*kind),
                    ItemDescription::Custom(text) => LineItem::custom(text.clone()),
                });
                location.all_items().len() - 1
            }
        };

        let result = location.update_item(index, |item| {
            request.apply(description, item, errors, &item_prefix);
            Ok(())
        });
        if let Err(e) = result {
            errors.push(item_prefix, e.to_string());
        }
    }
}

impl QuotationRequest {
    /// Apply this working copy onto a quotation (a fresh one for create).
    ///
    /// Totals are recomputed as each location is touched. All problems are
    /// collected; the aggregate keeps whatever could be applied.
    pub fn apply_to(&self, quotation: &mut Quotation) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        quotation.header.client_id = self.client_id;
        quotation.header.point_of_contact = self.point_of_contact.trim().to_string();
        if let Some(days) = self.validity_period {
            quotation.header.validity_period_days = days;
        }

        let mut removals = Vec::new();
        for (position, request) in self.locations.iter().enumerate() {
            let prefix = format!("locations[{}]", position);

            let index = match request.id {
                Some(id) => {
                    match quotation
                        .all_locations()
                        .iter()
                        .position(|location| location.state() == RecordState::Persisted(id))
                    {
                        Some(index) => index,
                        None => {
                            errors.push(format!("{}.id", prefix), "Unknown location");
                            continue;
                        }
                    }
                }
                None if request.delete => continue,
                None => quotation.push_location(LocationGroup::new(request.location_name.trim())),
            };

            if request.delete {
                removals.push((prefix, index));
                continue;
            }

            let result = quotation.update_location(index, |location| {
                location.set_name(request.location_name.trim());
                apply_items(&request.items, location, &prefix, &mut errors);
                Ok(())
            });
            if let Err(e) = result {
                errors.push(prefix, e.to_string());
            }
        }

        for (prefix, index) in removals {
            match quotation.remove_location(index) {
                Ok(()) => {}
                Err(QuotationError::LastLocation) => {
                    errors.push("locations", QuotationError::LastLocation.to_string())
                }
                Err(e) => errors.push(prefix, e.to_string()),
            }
        }

        errors.into_result()
    }
}
