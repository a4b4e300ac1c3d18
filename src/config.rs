//! Runtime configuration read from the environment (and `.env`).

use std::env;

use anyhow::{Context, Result};

use crate::quotation::models::{MAX_VALIDITY_DAYS, MIN_VALIDITY_DAYS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: String,
    /// Memory store when unset.
    pub database_url: Option<String>,
    pub quotation_prefix: String,
    pub company_name: String,
    pub default_from_email: Option<String>,
    pub default_validity_days: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            database_url: None,
            quotation_prefix: "GW-Q".to_string(),
            company_name: "Godamwale".to_string(),
            default_from_email: None,
            default_validity_days: 30,
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(non_empty)
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let default_validity_days = match lookup("DEFAULT_VALIDITY_DAYS") {
            Some(raw) => raw
                .parse::<i64>()
                .with_context(|| format!("DEFAULT_VALIDITY_DAYS is not a number: {}", raw))?,
            None => defaults.default_validity_days,
        };
        anyhow::ensure!(
            (MIN_VALIDITY_DAYS..=MAX_VALIDITY_DAYS).contains(&default_validity_days),
            "DEFAULT_VALIDITY_DAYS must be between {} and {}",
            MIN_VALIDITY_DAYS,
            MAX_VALIDITY_DAYS
        );

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            database_url: lookup("DATABASE_URL"),
            quotation_prefix: lookup("QUOTATION_PREFIX").unwrap_or(defaults.quotation_prefix),
            company_name: lookup("COMPANY_NAME").unwrap_or(defaults.company_name),
            default_from_email: lookup("DEFAULT_FROM_EMAIL"),
            default_validity_days,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("QUOTATION_PREFIX", "ACME-Q"),
            ("DEFAULT_VALIDITY_DAYS", "45"),
            ("DEFAULT_FROM_EMAIL", "sales@acme.in"),
        ]))
        .unwrap();
        assert_eq!(config.quotation_prefix, "ACME-Q");
        assert_eq!(config.default_validity_days, 45);
        assert_eq!(config.default_from_email.as_deref(), Some("sales@acme.in"));
    }

    #[test]
    fn test_rejects_out_of_range_validity() {
        assert!(Config::from_lookup(lookup(&[("DEFAULT_VALIDITY_DAYS", "400")])).is_err());
        assert!(Config::from_lookup(lookup(&[("DEFAULT_VALIDITY_DAYS", "soon")])).is_err());
    }
}
