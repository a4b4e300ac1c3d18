//! Client directory records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{normalize_email, normalize_phone, required, ValidationErrors};

/// A client a quotation is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Client {
    pub id: Uuid,
    pub client_name: String,
    pub company_name: String,
    pub email: String,
    pub contact_number: String,
    pub address: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Client {
    /// "Client - Company", as shown in pickers.
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.client_name, self.company_name)
    }
}

/// Raw client form input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientInput {
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub contact_number: String,
    #[serde(default)]
    pub address: String,
}

/// Cleaned client input, ready to store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClient {
    pub client_name: String,
    pub company_name: String,
    pub email: String,
    pub contact_number: String,
    pub address: String,
}

impl ClientInput {
    /// Clean every field, collecting all problems.
    pub fn validate(&self) -> Result<NewClient, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let client_name = required("client_name", &self.client_name, "Client name")
            .map_err(|e| errors.add(e))
            .ok();
        let company_name = required("company_name", &self.company_name, "Company name")
            .map_err(|e| errors.add(e))
            .ok();
        let email = normalize_email("email", &self.email)
            .map_err(|e| errors.add(e))
            .ok();
        let contact_number = normalize_phone("contact_number", &self.contact_number)
            .map_err(|e| errors.add(e))
            .ok();
        let address = required("address", &self.address, "Address")
            .map_err(|e| errors.add(e))
            .ok();

        match (client_name, company_name, email, contact_number, address) {
            (
                Some(client_name),
                Some(company_name),
                Some(email),
                Some(contact_number),
                Some(address),
            ) if errors.is_empty() =>
            {
                Ok(NewClient {
                    client_name,
                    company_name,
                    email,
                    contact_number,
                    address,
                })
            }
            _ => Err(errors),
        }
    }
}
