//! Quotation email composition and the mailer boundary.

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use super::calculators::display_money;
use super::clients::Client;
use super::document::long_date;
use super::models::Quotation;
use super::validation::FieldError;

/// A fully composed message, ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotationEmail {
    pub from: String,
    pub reply_to: String,
    pub to: String,
    pub cc: Vec<String>,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<String>,
}

/// Who the message is sent as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub name: String,
    pub email: String,
}

impl Sender {
    /// Creator's address when known, else the configured default.
    pub fn resolve(
        creator: Option<&str>,
        default_from: Option<&str>,
        company_name: &str,
    ) -> Result<Sender, FieldError> {
        let team = format!("{} Team", company_name);
        match (creator.filter(|c| !c.trim().is_empty()), default_from) {
            (Some(creator), _) => Ok(Sender {
                name: team,
                email: creator.trim().to_string(),
            }),
            (None, Some(default)) if !default.trim().is_empty() => Ok(Sender {
                name: team,
                email: default.trim().to_string(),
            }),
            _ => Err(FieldError::new(
                "sender",
                "Cannot send email: no sender address configured",
            )),
        }
    }
}

/// Build the outgoing message for a quotation.
pub fn compose(
    quotation: &Quotation,
    client: &Client,
    sender: &Sender,
    company_name: &str,
    to: String,
    cc: Vec<String>,
    attachments: Vec<String>,
) -> QuotationEmail {
    let number = quotation.quotation_number.as_deref().unwrap_or_default();

    let body = format!(
        "Dear {client},\n\n\
         Thank you for your interest in {company}'s services.\n\n\
         Please find attached the quotation ({number}) as requested.\n\n\
         Quotation Details:\n\
         - Quotation Number: {number}\n\
         - Date: {date}\n\
         - Valid Until: {valid_until}\n\
         - Grand Total: {total}\n\n\
         For any questions or clarifications, please feel free to contact {contact}.\n\n\
         Best regards,\n\
         {sender}",
        client = client.client_name,
        company = company_name,
        number = number,
        date = long_date(quotation.date),
        valid_until = long_date(quotation.validity_date()),
        total = display_money(quotation.overall_grand_total()),
        contact = quotation.header.point_of_contact,
        sender = sender.name,
    );

    QuotationEmail {
        from: format!("{} <{}>", sender.name, sender.email),
        reply_to: sender.email.clone(),
        to,
        cc,
        subject: format!("Quotation {} from {}", number, company_name),
        body,
        attachments,
    }
}

/// Failure reported by a mail transport.
#[derive(Debug, thiserror::Error)]
#[error("mail delivery failed: {0}")]
pub struct MailError(pub String);

/// Outgoing mail transport.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &QuotationEmail) -> Result<(), MailError>;
}

/// Transport that only logs the message.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &QuotationEmail) -> Result<(), MailError> {
        info!(
            to = %email.to,
            cc = ?email.cc,
            subject = %email.subject,
            "Quotation email dispatched"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quotation::catalog::ServiceKind;
    use crate::quotation::models::{LineItem, LocationGroup, QuotationHeader, QuotationStatus};
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    #[test]
    fn test_sender_resolution() {
        let sender = Sender::resolve(Some("asha@gw.in"), None, "Godamwale").unwrap();
        assert_eq!(sender.email, "asha@gw.in");
        assert_eq!(sender.name, "Godamwale Team");

        let sender = Sender::resolve(None, Some("noreply@gw.in"), "Godamwale").unwrap();
        assert_eq!(sender.email, "noreply@gw.in");

        let err = Sender::resolve(Some(" "), None, "Godamwale").unwrap_err();
        assert_eq!(err.field, "sender");
    }

    #[test]
    fn test_compose_message() {
        let mut item = LineItem::new(ServiceKind::PickPack);
        item.set_cost("100").unwrap();
        item.set_quantity("10").unwrap();
        let mut group = LocationGroup::new("NCR");
        group.add_item(item);

        let mut quotation = Quotation::new(
            NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
            QuotationHeader {
                client_id: Some(Uuid::new_v4()),
                point_of_contact: "Asha".to_string(),
                validity_period_days: 15,
                status: QuotationStatus::Draft,
            },
        )
        .with_locations(vec![group]);
        quotation.quotation_number = Some("GW-Q-20260110-0003".to_string());

        let client = Client {
            id: Uuid::new_v4(),
            client_name: "Ravi".to_string(),
            company_name: "Acme".to_string(),
            email: "ravi@acme.in".to_string(),
            contact_number: "9876543210".to_string(),
            address: "Pune".to_string(),
            is_active: true,
            created_at: Utc::now(),
        };
        let sender = Sender {
            name: "Godamwale Team".to_string(),
            email: "asha@gw.in".to_string(),
        };

        let email = compose(
            &quotation,
            &client,
            &sender,
            "Godamwale",
            client.email.clone(),
            vec!["ops@gw.in".to_string()],
            vec![],
        );

        assert_eq!(email.subject, "Quotation GW-Q-20260110-0003 from Godamwale");
        assert_eq!(email.from, "Godamwale Team <asha@gw.in>");
        assert_eq!(email.reply_to, "asha@gw.in");
        assert!(email.body.starts_with("Dear Ravi,"));
        assert!(email.body.contains("- Valid Until: 25 January 2026"));
        assert!(email.body.contains("- Grand Total: ₹ 1,180.00"));
        assert!(email.body.contains("contact Asha."));
    }

    #[tokio::test]
    async fn test_log_mailer_accepts() {
        let email = QuotationEmail {
            from: "a <a@b.co>".to_string(),
            reply_to: "a@b.co".to_string(),
            to: "c@d.co".to_string(),
            cc: vec![],
            subject: "s".to_string(),
            body: "b".to_string(),
            attachments: vec![],
        };
        assert!(LogMailer.send(&email).await.is_ok());
    }
}
