use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::database::enums::{LeadSource, LeadStatus};

/// Prospect entity
///
/// `tax_id` is the natural dedupe key: the import paths upsert on it, and
/// the unique index rejects manual duplicates. Leads without a tax id
/// (e.g. an OCR draft of a handwritten note) are allowed and never
/// deduplicated.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = crate::database::schema::leads)]
#[diesel(primary_key(id))]
pub struct Lead {
    /// Auto-incrementing ID
    pub id: i64,

    pub company_name: String,

    /// 10-digit company registration number, unique when present
    pub tax_id: Option<String>,

    pub email: Option<String>,
    pub phone: Option<String>,

    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,

    /// Geocoded coordinates, populated by enrichment
    pub lat: Option<f64>,
    pub lon: Option<f64>,

    pub status: LeadStatus,
    pub source: LeadSource,

    /// Estimated yearly consumption, used to rank prospects
    #[schema(value_type = Option<String>, example = "1250.5")]
    pub annual_volume_mwh: Option<Decimal>,

    /// When the prospect's current supply contract expires
    pub contract_end_date: Option<NaiveDate>,

    pub notes: Option<String>,

    /// Assigned sales rep
    pub owner_id: Option<i64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New lead for insertion
#[derive(Debug, Clone, Insertable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = crate::database::schema::leads)]
pub struct NewLead {
    pub company_name: String,
    pub tax_id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub status: LeadStatus,
    pub source: LeadSource,
    #[schema(value_type = Option<String>, example = "1250.5")]
    pub annual_volume_mwh: Option<Decimal>,
    pub contract_end_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub owner_id: Option<i64>,
}

impl NewLead {
    /// Create a bare lead; optional fields start empty
    pub fn new(company_name: String, source: LeadSource) -> Self {
        Self {
            company_name,
            tax_id: None,
            email: None,
            phone: None,
            street: None,
            city: None,
            postal_code: None,
            lat: None,
            lon: None,
            status: LeadStatus::New,
            source,
            annual_volume_mwh: None,
            contract_end_date: None,
            notes: None,
            owner_id: None,
        }
    }

    /// Single-line address for geocoding queries
    pub fn address_line(&self) -> Option<String> {
        address_line(
            self.street.as_deref(),
            self.postal_code.as_deref(),
            self.city.as_deref(),
        )
    }
}

/// Partial update for an existing lead
#[derive(Debug, Clone, Default, AsChangeset, Deserialize, ToSchema)]
#[diesel(table_name = crate::database::schema::leads)]
pub struct LeadChangeset {
    pub company_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    #[schema(value_type = Option<String>)]
    pub annual_volume_mwh: Option<Decimal>,
    pub contract_end_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub owner_id: Option<i64>,
}

impl Lead {
    /// Single-line address for geocoding queries
    pub fn address_line(&self) -> Option<String> {
        address_line(
            self.street.as_deref(),
            self.postal_code.as_deref(),
            self.city.as_deref(),
        )
    }
}

fn address_line(
    street: Option<&str>,
    postal_code: Option<&str>,
    city: Option<&str>,
) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    if let Some(s) = street {
        parts.push(s);
    }
    if let Some(p) = postal_code {
        parts.push(p);
    }
    if let Some(c) = city {
        parts.push(c);
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_lead_defaults() {
        let lead = NewLead::new("Huta Szkła Sp. z o.o.".to_string(), LeadSource::Manual);
        assert_eq!(lead.status, LeadStatus::New);
        assert!(lead.tax_id.is_none());
        assert!(lead.address_line().is_none());
    }

    #[test]
    fn test_address_line_joins_present_parts() {
        let mut lead = NewLead::new("Test".to_string(), LeadSource::Csv);
        lead.street = Some("ul. Prosta 5".to_string());
        lead.city = Some("Katowice".to_string());
        assert_eq!(lead.address_line().unwrap(), "ul. Prosta 5, Katowice");

        lead.postal_code = Some("40-001".to_string());
        assert_eq!(
            lead.address_line().unwrap(),
            "ul. Prosta 5, 40-001, Katowice"
        );
    }
}
