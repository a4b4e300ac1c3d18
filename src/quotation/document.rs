//! Finalized, display-ready view of a quotation handed to the document
//! renderer. All totals are computed and all money is formatted here so the
//! renderer holds no business rules.

use serde::Serialize;

use super::amount::{Amount, LineTotal, NOT_APPLICABLE};
use super::calculators::{display_money, TAX_LABEL};
use super::clients::Client;
use super::models::{LineItem, LocationGroup, Quotation};

const AT_ACTUAL_DISPLAY: &str = "At Actual";

#[derive(Debug, Clone, Serialize)]
pub struct QuotationDocument {
    pub quotation_number: String,
    pub date: String,
    pub valid_until: String,
    pub validity_period_days: i64,
    pub point_of_contact: String,
    pub status: String,
    pub client: DocumentClient,
    pub locations: Vec<DocumentLocation>,
    pub subtotal: String,
    pub tax_amount: String,
    pub grand_total: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentClient {
    pub client_name: String,
    pub company_name: String,
    pub email: String,
    pub contact_number: String,
    pub address: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentLocation {
    pub name: String,
    pub rows: Vec<DocumentRow>,
    pub subtotal: String,
    pub tax_label: &'static str,
    pub tax_amount: String,
    pub grand_total: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentRow {
    pub description: String,
    pub unit_cost: String,
    pub quantity: String,
    pub total: String,
}

/// Long date form used in documents and emails (`05 March 2026`).
pub fn long_date(date: chrono::NaiveDate) -> String {
    date.format("%d %B %Y").to_string()
}

fn display_cost(amount: Amount) -> String {
    match amount {
        Amount::Concrete(value) => display_money(value),
        Amount::AtActual => AT_ACTUAL_DISPLAY.to_string(),
    }
}

fn display_quantity(amount: Amount) -> String {
    match amount {
        Amount::Concrete(value) => value.normalize().to_string(),
        Amount::AtActual => AT_ACTUAL_DISPLAY.to_string(),
    }
}

fn display_total(total: LineTotal) -> String {
    match total {
        LineTotal::Amount(value) => display_money(value),
        LineTotal::NotApplicable => NOT_APPLICABLE.to_string(),
    }
}

fn row(item: &LineItem) -> DocumentRow {
    let description = match item.unit_type() {
        Some(unit) => format!("Storage Charges ({})", unit.label()),
        None => item.description().label().to_string(),
    };
    DocumentRow {
        description,
        unit_cost: display_cost(item.unit_cost()),
        quantity: display_quantity(item.quantity()),
        total: display_total(item.line_total()),
    }
}

fn location(location: &LocationGroup) -> DocumentLocation {
    DocumentLocation {
        name: location.name().to_string(),
        rows: location.items().map(row).collect(),
        subtotal: display_money(location.subtotal()),
        tax_label: TAX_LABEL,
        tax_amount: display_money(location.tax_amount()),
        grand_total: display_money(location.grand_total()),
    }
}

impl QuotationDocument {
    pub fn build(quotation: &Quotation, client: &Client) -> Self {
        let totals = quotation.totals();
        Self {
            quotation_number: quotation.quotation_number.clone().unwrap_or_default(),
            date: long_date(quotation.date),
            valid_until: long_date(quotation.validity_date()),
            validity_period_days: quotation.header.validity_period_days,
            point_of_contact: quotation.header.point_of_contact.clone(),
            status: quotation.header.status.to_string(),
            client: DocumentClient {
                client_name: client.client_name.clone(),
                company_name: client.company_name.clone(),
                email: client.email.clone(),
                contact_number: client.contact_number.clone(),
                address: client.address.clone(),
            },
            locations: quotation.locations().map(location).collect(),
            subtotal: display_money(totals.subtotal),
            tax_amount: display_money(totals.tax_amount),
            grand_total: display_money(totals.grand_total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quotation::catalog::{ServiceKind, StorageUnitType};
    use crate::quotation::models::{QuotationHeader, QuotationStatus};
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn client() -> Client {
        Client {
            id: Uuid::new_v4(),
            client_name: "Ravi".to_string(),
            company_name: "Acme".to_string(),
            email: "ravi@acme.in".to_string(),
            contact_number: "9876543210".to_string(),
            address: "Pune".to_string(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_document_formats_rows_and_totals() {
        let mut storage = LineItem::new(ServiceKind::StorageCharges);
        storage.set_unit_type(StorageUnitType::PerSqft).unwrap();
        storage.set_cost("1000").unwrap();
        storage.set_quantity("2").unwrap();
        let mut handling = LineItem::new(ServiceKind::InboundHandling);
        handling.set_quantity("3").unwrap();

        let mut group = LocationGroup::new("Bhiwandi");
        group.add_item(storage);
        group.add_item(handling);

        let mut quotation = Quotation::new(
            NaiveDate::from_ymd_opt(2026, 3, 5).unwrap(),
            QuotationHeader {
                client_id: Some(Uuid::new_v4()),
                point_of_contact: "Asha".to_string(),
                validity_period_days: 30,
                status: QuotationStatus::Draft,
            },
        )
        .with_locations(vec![group]);
        quotation.quotation_number = Some("GW-Q-20260305-0001".to_string());

        let doc = QuotationDocument::build(&quotation, &client());

        assert_eq!(doc.date, "05 March 2026");
        assert_eq!(doc.valid_until, "04 April 2026");
        let rows = &doc.locations[0].rows;
        assert_eq!(rows[0].description, "Storage Charges (per sq. ft. per month)");
        assert_eq!(rows[0].unit_cost, "₹ 1,000.00");
        assert_eq!(rows[0].total, "₹ 2,000.00");
        assert_eq!(rows[1].unit_cost, "At Actual");
        assert_eq!(rows[1].quantity, "3");
        assert_eq!(rows[1].total, "N/A");
        assert_eq!(doc.locations[0].tax_label, "GST @ 18%");
        assert_eq!(doc.locations[0].tax_amount, "₹ 360.00");
        assert_eq!(doc.grand_total, "₹ 2,360.00");
    }
}
