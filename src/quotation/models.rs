//! Quotation aggregate: quotation -> locations -> line items.
//!
//! Every mutating method recomputes the affected totals before returning, so
//! the values read back are never stale.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::amount::{Amount, LineTotal};
use super::calculators::{
    line_total, location_totals, quotation_totals, LocationTotals, QuotationTotals,
};
use super::catalog::{ServiceKind, StorageUnitType, DEFAULT_CATALOG};
use super::validation::{FieldError, ValidationErrors};

/// Persistence state of an item or location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordState {
    /// Never saved; removal drops it outright.
    #[default]
    New,
    /// Saved under this id.
    Persisted(Uuid),
    /// Saved, then removed in this working copy. Kept for the audit trail
    /// until the next save.
    Deleted(Uuid),
}

impl RecordState {
    pub fn id(&self) -> Option<Uuid> {
        match self {
            RecordState::New => None,
            RecordState::Persisted(id) | RecordState::Deleted(id) => Some(*id),
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, RecordState::Deleted(_))
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self, RecordState::Persisted(_))
    }
}

/// Domain failures for aggregate edits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuotationError {
    #[error("At least one location is required")]
    LastLocation,

    #[error("No location at position {0}")]
    LocationNotFound(usize),

    #[error("No item at position {0}")]
    ItemNotFound(usize),

    #[error("Location at position {0} is already removed")]
    LocationRemoved(usize),

    #[error("Item at position {0} is already removed")]
    ItemRemoved(usize),

    #[error("{0}")]
    Field(FieldError),
}

impl From<FieldError> for QuotationError {
    fn from(err: FieldError) -> Self {
        QuotationError::Field(err)
    }
}

// ==================== Line item ====================

/// What a line is for: a catalog service, or a custom label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ItemDescription {
    Catalog(ServiceKind),
    Custom(String),
}

impl ItemDescription {
    pub fn label(&self) -> &str {
        match self {
            ItemDescription::Catalog(kind) => kind.label(),
            ItemDescription::Custom(text) => text,
        }
    }

    fn has_unit_type(&self) -> bool {
        matches!(self, ItemDescription::Catalog(kind) if kind.has_unit_type())
    }
}

/// A single priced row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    state: RecordState,
    description: ItemDescription,
    unit_type: Option<StorageUnitType>,
    unit_cost: Amount,
    quantity: Amount,
}

impl LineItem {
    /// Blank catalog line: cost and quantity both "at actual".
    pub fn new(kind: ServiceKind) -> Self {
        let mut item = Self {
            state: RecordState::New,
            description: ItemDescription::Catalog(kind),
            unit_type: None,
            unit_cost: Amount::AtActual,
            quantity: Amount::AtActual,
        };
        item.set_description(ItemDescription::Catalog(kind));
        item
    }

    pub fn custom(label: impl Into<String>) -> Self {
        Self {
            state: RecordState::New,
            description: ItemDescription::Custom(label.into()),
            unit_type: None,
            unit_cost: Amount::AtActual,
            quantity: Amount::AtActual,
        }
    }

    /// Rebuild an item read back from storage.
    pub fn restore(
        id: Uuid,
        description: ItemDescription,
        unit_type: Option<StorageUnitType>,
        unit_cost: Amount,
        quantity: Amount,
    ) -> Self {
        let unit_type = if description.has_unit_type() {
            Some(unit_type.unwrap_or_default())
        } else {
            None
        };
        Self {
            state: RecordState::Persisted(id),
            description,
            unit_type,
            unit_cost,
            quantity,
        }
    }

    pub fn state(&self) -> RecordState {
        self.state
    }

    pub fn description(&self) -> &ItemDescription {
        &self.description
    }

    pub fn unit_type(&self) -> Option<StorageUnitType> {
        self.unit_type
    }

    pub fn unit_cost(&self) -> Amount {
        self.unit_cost
    }

    pub fn quantity(&self) -> Amount {
        self.quantity
    }

    /// Set the unit cost from user text. On error the previous cost is kept.
    pub fn set_cost(&mut self, input: &str) -> Result<(), FieldError> {
        self.unit_cost =
            Amount::parse_cost(input).map_err(|e| FieldError::new("unit_cost", e.to_string()))?;
        Ok(())
    }

    /// Set the quantity from user text. On error the previous quantity is kept.
    pub fn set_quantity(&mut self, input: &str) -> Result<(), FieldError> {
        self.quantity =
            Amount::parse_quantity(input).map_err(|e| FieldError::new("quantity", e.to_string()))?;
        Ok(())
    }

    /// Change the description. Storage charges activate the unit type;
    /// anything else clears it.
    pub fn set_description(&mut self, description: ItemDescription) {
        self.unit_type = if description.has_unit_type() {
            Some(self.unit_type.unwrap_or_default())
        } else {
            None
        };
        self.description = description;
    }

    pub fn set_unit_type(&mut self, unit_type: StorageUnitType) -> Result<(), FieldError> {
        if !self.description.has_unit_type() {
            return Err(FieldError::new(
                "storage_unit_type",
                "Unit type only applies to storage charges",
            ));
        }
        self.unit_type = Some(unit_type);
        Ok(())
    }

    pub fn line_total(&self) -> LineTotal {
        line_total(&self.unit_cost, &self.quantity)
    }

    pub fn is_deleted(&self) -> bool {
        self.state.is_deleted()
    }
}

// ==================== Location group ====================

/// One service site with its own items and rollup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationGroup {
    state: RecordState,
    name: String,
    items: Vec<LineItem>,
    totals: LocationTotals,
}

impl LocationGroup {
    /// Empty location.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            state: RecordState::New,
            name: name.into(),
            items: Vec::new(),
            totals: LocationTotals::default(),
        }
    }

    /// Location pre-filled with one blank line per catalog kind.
    pub fn with_default_catalog(name: impl Into<String>) -> Self {
        let mut location = Self::new(name);
        location.items = DEFAULT_CATALOG.iter().map(|kind| LineItem::new(*kind)).collect();
        location.recompute_totals();
        location
    }

    pub fn restore(id: Uuid, name: impl Into<String>, items: Vec<LineItem>) -> Self {
        let mut location = Self {
            state: RecordState::Persisted(id),
            name: name.into(),
            items,
            totals: LocationTotals::default(),
        };
        location.recompute_totals();
        location
    }

    pub fn state(&self) -> RecordState {
        self.state
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Every item in sequence order, including soft-deleted ones.
    pub fn all_items(&self) -> &[LineItem] {
        &self.items
    }

    /// Items that count towards totals and display.
    pub fn items(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter().filter(|item| !item.is_deleted())
    }

    pub fn totals(&self) -> LocationTotals {
        self.totals
    }

    pub fn subtotal(&self) -> Decimal {
        self.totals.subtotal
    }

    pub fn tax_amount(&self) -> Decimal {
        self.totals.tax_amount
    }

    pub fn grand_total(&self) -> Decimal {
        self.totals.grand_total
    }

    pub fn is_deleted(&self) -> bool {
        self.state.is_deleted()
    }

    pub fn add_item(&mut self, item: LineItem) {
        self.items.push(item);
        self.recompute_totals();
    }

    /// Soft-delete a saved item, or drop an unsaved one.
    pub fn remove_item(&mut self, index: usize) -> Result<(), QuotationError> {
        let state = self
            .items
            .get(index)
            .map(LineItem::state)
            .ok_or(QuotationError::ItemNotFound(index))?;
        match state {
            RecordState::Deleted(_) => return Err(QuotationError::ItemRemoved(index)),
            RecordState::Persisted(id) => self.items[index].state = RecordState::Deleted(id),
            RecordState::New => {
                self.items.remove(index);
            }
        }
        self.recompute_totals();
        Ok(())
    }

    /// Apply an edit to one item and recompute, even if the edit fails
    /// partway.
    pub fn update_item<F>(&mut self, index: usize, edit: F) -> Result<(), QuotationError>
    where
        F: FnOnce(&mut LineItem) -> Result<(), FieldError>,
    {
        let item = self.items.get_mut(index).ok_or(QuotationError::ItemNotFound(index))?;
        if item.is_deleted() {
            return Err(QuotationError::ItemRemoved(index));
        }
        let result = edit(item);
        self.recompute_totals();
        result.map_err(QuotationError::from)
    }

    pub fn line_totals(&self) -> Vec<LineTotal> {
        self.items().map(LineItem::line_total).collect()
    }

    /// Idempotent.
    pub fn recompute_totals(&mut self) {
        self.totals = location_totals(&self.line_totals());
    }
}

// ==================== Quotation ====================

/// Lifecycle of a quotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotationStatus {
    #[default]
    Draft,
    Sent,
    Accepted,
    Rejected,
}

impl QuotationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuotationStatus::Draft => "draft",
            QuotationStatus::Sent => "sent",
            QuotationStatus::Accepted => "accepted",
            QuotationStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<QuotationStatus> {
        match value {
            "draft" => Some(QuotationStatus::Draft),
            "sent" => Some(QuotationStatus::Sent),
            "accepted" => Some(QuotationStatus::Accepted),
            "rejected" => Some(QuotationStatus::Rejected),
            _ => None,
        }
    }

    pub fn is_editable(&self) -> bool {
        matches!(self, QuotationStatus::Draft)
    }
}

impl std::fmt::Display for QuotationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const MIN_VALIDITY_DAYS: i64 = 1;
pub const MAX_VALIDITY_DAYS: i64 = 365;

/// Header fields edited directly on a quotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotationHeader {
    pub client_id: Option<Uuid>,
    pub point_of_contact: String,
    pub validity_period_days: i64,
    pub status: QuotationStatus,
}

/// Aggregate root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quotation {
    pub id: Option<Uuid>,
    pub quotation_number: Option<String>,
    pub date: NaiveDate,
    pub created_by: Option<String>,
    pub header: QuotationHeader,
    locations: Vec<LocationGroup>,
    totals: QuotationTotals,
}

impl Quotation {
    /// Unsaved quotation without locations.
    pub fn new(date: NaiveDate, header: QuotationHeader) -> Self {
        Self {
            id: None,
            quotation_number: None,
            date,
            created_by: None,
            header,
            locations: Vec::new(),
            totals: QuotationTotals::default(),
        }
    }

    pub fn with_locations(mut self, locations: Vec<LocationGroup>) -> Self {
        self.locations = locations;
        self.recompute_overall_total();
        self
    }

    /// Every location in sequence order, including soft-deleted ones.
    pub fn all_locations(&self) -> &[LocationGroup] {
        &self.locations
    }

    /// Locations that count towards totals and display.
    pub fn locations(&self) -> impl Iterator<Item = &LocationGroup> {
        self.locations.iter().filter(|location| !location.is_deleted())
    }

    pub fn active_location_count(&self) -> usize {
        self.locations().count()
    }

    pub fn totals(&self) -> QuotationTotals {
        self.totals
    }

    pub fn overall_grand_total(&self) -> Decimal {
        self.totals.grand_total
    }

    /// Last valid day. An out-of-range period (already reported by
    /// `validate`) is clamped into `0..=MAX_VALIDITY_DAYS` first.
    pub fn validity_date(&self) -> NaiveDate {
        let days = self.header.validity_period_days.clamp(0, MAX_VALIDITY_DAYS);
        self.date
            .checked_add_days(Days::new(days.unsigned_abs()))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Append a location populated with the default catalog.
    pub fn add_location(&mut self, name: impl Into<String>) -> usize {
        self.push_location(LocationGroup::with_default_catalog(name))
    }

    /// Append a prepared location; returns its position.
    pub fn push_location(&mut self, location: LocationGroup) -> usize {
        self.locations.push(location);
        self.recompute_overall_total();
        self.locations.len() - 1
    }

    /// Soft-delete a saved location or drop an unsaved one. The last
    /// remaining location can't be removed.
    pub fn remove_location(&mut self, index: usize) -> Result<(), QuotationError> {
        let state = self
            .locations
            .get(index)
            .map(LocationGroup::state)
            .ok_or(QuotationError::LocationNotFound(index))?;
        if state.is_deleted() {
            return Err(QuotationError::LocationRemoved(index));
        }
        if self.active_location_count() <= 1 {
            return Err(QuotationError::LastLocation);
        }
        match state {
            RecordState::Persisted(id) => self.locations[index].state = RecordState::Deleted(id),
            _ => {
                self.locations.remove(index);
            }
        }
        self.recompute_overall_total();
        Ok(())
    }

    /// Apply an edit to one location and push the recompute up.
    pub fn update_location<F>(&mut self, index: usize, edit: F) -> Result<(), QuotationError>
    where
        F: FnOnce(&mut LocationGroup) -> Result<(), QuotationError>,
    {
        let location = self
            .locations
            .get_mut(index)
            .ok_or(QuotationError::LocationNotFound(index))?;
        if location.is_deleted() {
            return Err(QuotationError::LocationRemoved(index));
        }
        let result = edit(location);
        location.recompute_totals();
        self.recompute_overall_total();
        result
    }

    /// Collect every field problem at once.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if self.header.client_id.is_none() {
            errors.push("client", "Please select a client");
        }
        if self.header.validity_period_days < MIN_VALIDITY_DAYS {
            errors.push("validity_period", "Validity period must be at least 1 day");
        } else if self.header.validity_period_days > MAX_VALIDITY_DAYS {
            errors.push("validity_period", "Validity period cannot exceed 365 days");
        }
        if self.header.point_of_contact.trim().is_empty() {
            errors.push("point_of_contact", "Point of contact is required");
        }

        for (index, location) in self.locations.iter().enumerate() {
            if !location.is_deleted() && location.name().trim().is_empty() {
                errors.push(
                    format!("locations[{}].location_name", index),
                    "Location name is required",
                );
            }
        }
        if self.active_location_count() == 0 {
            errors.push("locations", QuotationError::LastLocation.to_string());
        }

        errors.into_result()
    }

    /// Idempotent.
    pub fn recompute_overall_total(&mut self) {
        let location_totals: Vec<LocationTotals> =
            self.locations().map(LocationGroup::totals).collect();
        self.totals = quotation_totals(&location_totals);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn header() -> QuotationHeader {
        QuotationHeader {
            client_id: Some(Uuid::new_v4()),
            point_of_contact: "Asha".to_string(),
            validity_period_days: 30,
            status: QuotationStatus::Draft,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    fn priced(kind: ServiceKind, cost: &str, qty: &str) -> LineItem {
        let mut item = LineItem::new(kind);
        item.set_cost(cost).unwrap();
        item.set_quantity(qty).unwrap();
        item
    }

    fn scenario_location() -> LocationGroup {
        let mut location = LocationGroup::new("Bhiwandi");
        location.add_item(priced(ServiceKind::StorageCharges, "100", "2"));
        location.add_item(priced(ServiceKind::InboundHandling, "at actual", "3"));
        location.add_item(priced(ServiceKind::PickPack, "50", "1"));
        location
    }

    // ==================== line item tests ====================

    #[test]
    fn test_new_item_is_blank() {
        let item = LineItem::new(ServiceKind::PickPack);
        assert_eq!(item.unit_cost(), Amount::AtActual);
        assert_eq!(item.quantity(), Amount::AtActual);
        assert_eq!(item.line_total(), LineTotal::NotApplicable);
        assert_eq!(item.state(), RecordState::New);
    }

    #[test]
    fn test_negative_cost_keeps_previous_value() {
        let mut item = priced(ServiceKind::PickPack, "10", "1");
        let err = item.set_cost("-5").unwrap_err();
        assert_eq!(err.field, "unit_cost");
        assert_eq!(err.message, "Unit cost must be positive");
        assert_eq!(item.unit_cost(), Amount::Concrete(dec!(10)));
    }

    #[test]
    fn test_zero_quantity_is_at_actual() {
        // Zero units read as "to be determined", not a real zero line.
        let item = priced(ServiceKind::PickPack, "10", "0");
        assert_eq!(item.quantity(), Amount::AtActual);
        assert_eq!(item.line_total(), LineTotal::NotApplicable);
    }

    #[test]
    fn test_storage_description_toggles_unit_type() {
        let mut item = LineItem::new(ServiceKind::StorageCharges);
        assert_eq!(item.unit_type(), Some(StorageUnitType::PerPallet));

        item.set_unit_type(StorageUnitType::PerSqft).unwrap();
        assert_eq!(item.unit_type(), Some(StorageUnitType::PerSqft));

        item.set_description(ItemDescription::Catalog(ServiceKind::PickPack));
        assert_eq!(item.unit_type(), None);
        assert!(item.set_unit_type(StorageUnitType::PerSqft).is_err());

        item.set_description(ItemDescription::Custom("Forklift hire".to_string()));
        assert_eq!(item.unit_type(), None);
        assert_eq!(item.description().label(), "Forklift hire");
    }

    // ==================== location tests ====================

    #[test]
    fn test_location_scenario_totals() {
        let location = scenario_location();
        let lines: Vec<String> = location.line_totals().iter().map(|t| t.to_string()).collect();

        assert_eq!(lines, vec!["200.00", "N/A", "50.00"]);
        assert_eq!(location.subtotal(), dec!(250.00));
        assert_eq!(location.tax_amount(), dec!(45.00));
        assert_eq!(location.grand_total(), dec!(295.00));
    }

    #[test]
    fn test_default_catalog_location_is_zero() {
        let location = LocationGroup::with_default_catalog("NCR");

        assert_eq!(location.items().count(), DEFAULT_CATALOG.len());
        let kinds: Vec<ItemDescription> =
            location.items().map(|i| i.description().clone()).collect();
        let expected: Vec<ItemDescription> =
            DEFAULT_CATALOG.iter().map(|k| ItemDescription::Catalog(*k)).collect();
        assert_eq!(kinds, expected);
        assert!(location.line_totals().iter().all(|t| *t == LineTotal::NotApplicable));
        assert_eq!(location.subtotal().to_string(), "0.00");
        assert_eq!(location.tax_amount().to_string(), "0.00");
        assert_eq!(location.grand_total().to_string(), "0.00");
    }

    #[test]
    fn test_update_item_pushes_recompute() {
        let mut location = LocationGroup::with_default_catalog("NCR");
        location
            .update_item(0, |item| {
                item.set_cost("10")?;
                item.set_quantity("10")
            })
            .unwrap();

        assert_eq!(location.subtotal(), dec!(100));
        assert_eq!(location.grand_total(), dec!(118));
    }

    #[test]
    fn test_update_item_error_still_recomputes() {
        let mut location = LocationGroup::with_default_catalog("NCR");
        let result = location.update_item(0, |item| {
            item.set_quantity("4")?;
            item.set_cost("-1")
        });

        assert!(matches!(result, Err(QuotationError::Field(_))));
        // quantity stuck, cost still at actual
        assert_eq!(location.all_items()[0].quantity(), Amount::Concrete(dec!(4)));
        assert_eq!(location.subtotal(), dec!(0));
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut location = scenario_location();
        let first = location.totals();
        location.recompute_totals();
        location.recompute_totals();
        assert_eq!(location.totals(), first);
    }

    #[test]
    fn test_remove_new_item_drops_it() {
        let mut location = scenario_location();
        location.remove_item(0).unwrap();

        assert_eq!(location.all_items().len(), 2);
        assert_eq!(location.subtotal(), dec!(50));
    }

    #[test]
    fn test_remove_persisted_item_soft_deletes() {
        let id = Uuid::new_v4();
        let item = LineItem::restore(
            id,
            ItemDescription::Catalog(ServiceKind::PickPack),
            None,
            Amount::Concrete(dec!(100)),
            Amount::Concrete(dec!(2)),
        );
        let mut location = LocationGroup::restore(Uuid::new_v4(), "NCR", vec![item]);
        assert_eq!(location.subtotal(), dec!(200));

        location.remove_item(0).unwrap();

        assert_eq!(location.all_items().len(), 1);
        assert_eq!(location.all_items()[0].state(), RecordState::Deleted(id));
        assert_eq!(location.items().count(), 0);
        assert_eq!(location.subtotal(), dec!(0));
        assert_eq!(location.remove_item(0), Err(QuotationError::ItemRemoved(0)));
    }

    #[test]
    fn test_remove_item_out_of_range() {
        let mut location = LocationGroup::new("NCR");
        assert_eq!(location.remove_item(3), Err(QuotationError::ItemNotFound(3)));
    }

    // ==================== quotation tests ====================

    #[test]
    fn test_add_location_auto_populates() {
        let mut quotation = Quotation::new(date(), header());
        let index = quotation.add_location("NCR");

        assert_eq!(index, 0);
        assert_eq!(quotation.all_locations()[0].items().count(), 8);
        assert_eq!(quotation.overall_grand_total(), dec!(0));
    }

    #[test]
    fn test_overall_total_two_locations() {
        let mut second = LocationGroup::new("Mumbai");
        second.add_item(priced(ServiceKind::PickPack, "50", "2"));

        let quotation =
            Quotation::new(date(), header()).with_locations(vec![scenario_location(), second]);

        let grand: Vec<Decimal> = quotation.locations().map(|l| l.grand_total()).collect();
        assert_eq!(grand, vec![dec!(295.00), dec!(118.00)]);
        assert_eq!(quotation.overall_grand_total(), dec!(413.00));
        assert_eq!(quotation.overall_grand_total().to_string(), "413.00");
    }

    #[test]
    fn test_update_location_pushes_to_quotation() {
        let mut quotation = Quotation::new(date(), header());
        quotation.add_location("NCR");

        quotation
            .update_location(0, |location| {
                location.update_item(1, |item| {
                    item.set_cost("20")?;
                    item.set_quantity("5")
                })
            })
            .unwrap();

        assert_eq!(quotation.totals().subtotal, dec!(100));
        assert_eq!(quotation.overall_grand_total(), dec!(118));
    }

    #[test]
    fn test_remove_only_location_rejected() {
        let mut quotation = Quotation::new(date(), header());
        quotation.add_location("NCR");

        assert_eq!(quotation.remove_location(0), Err(QuotationError::LastLocation));
        assert_eq!(quotation.active_location_count(), 1);
    }

    #[test]
    fn test_remove_only_persisted_location_rejected_when_other_is_deleted() {
        let kept = LocationGroup::restore(Uuid::new_v4(), "NCR", vec![]);
        let gone = LocationGroup::restore(Uuid::new_v4(), "Pune", vec![]);
        let mut quotation = Quotation::new(date(), header()).with_locations(vec![kept, gone]);

        quotation.remove_location(1).unwrap();
        assert!(quotation.all_locations()[1].is_deleted());
        assert_eq!(quotation.remove_location(0), Err(QuotationError::LastLocation));
        assert_eq!(quotation.remove_location(1), Err(QuotationError::LocationRemoved(1)));
        assert_eq!(quotation.active_location_count(), 1);
    }

    #[test]
    fn test_removed_location_leaves_totals() {
        let mut second = LocationGroup::new("Mumbai");
        second.add_item(priced(ServiceKind::PickPack, "50", "2"));
        let mut quotation =
            Quotation::new(date(), header()).with_locations(vec![scenario_location(), second]);

        quotation.remove_location(1).unwrap();

        assert_eq!(quotation.all_locations().len(), 1);
        assert_eq!(quotation.overall_grand_total(), dec!(295));
    }

    #[test]
    fn test_validate_collects_everything() {
        let mut quotation = Quotation::new(
            date(),
            QuotationHeader {
                client_id: None,
                point_of_contact: "  ".to_string(),
                validity_period_days: 0,
                status: QuotationStatus::Draft,
            },
        );
        let errors = quotation.validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["client", "validity_period", "point_of_contact", "locations"]);

        quotation.add_location("");
        let errors = quotation.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.field == "locations[0].location_name"));
        assert!(!errors.iter().any(|e| e.field == "locations"));
    }

    #[test]
    fn test_validate_validity_upper_bound() {
        let mut h = header();
        h.validity_period_days = 366;
        let mut quotation = Quotation::new(date(), h);
        quotation.add_location("NCR");

        let errors = quotation.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.iter().next().unwrap().message, "Validity period cannot exceed 365 days");
    }

    #[test]
    fn test_validate_ok() {
        let mut quotation = Quotation::new(date(), header());
        quotation.add_location("NCR");
        assert!(quotation.validate().is_ok());
    }

    #[test]
    fn test_validity_date() {
        let quotation = Quotation::new(date(), header());
        assert_eq!(quotation.validity_date(), NaiveDate::from_ymd_opt(2026, 3, 31).unwrap());
    }

    #[test]
    fn test_validity_date_out_of_range_period() {
        let mut h = header();
        h.validity_period_days = 100_000_000;
        let quotation = Quotation::new(date(), h);
        assert_eq!(
            quotation.validity_date(),
            date().checked_add_days(Days::new(365)).unwrap()
        );

        let mut h = header();
        h.validity_period_days = i64::MIN;
        assert_eq!(Quotation::new(date(), h).validity_date(), date());
    }
}
