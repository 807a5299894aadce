//! Job offer display models

use serde::Serialize;
use tabled::Tabled;

use super::common::truncate_string;
use crate::client::models::{CountBucket, JobOffer};
use crate::output::formatters::{format_date, or_dash};

#[derive(Debug, Clone, Tabled, Serialize)]
pub struct OfferDisplay {
    #[tabled(rename = "ID")]
    pub id: String,

    #[tabled(rename = "POSITION")]
    pub position: String,

    #[tabled(rename = "COMPANY")]
    pub company: String,

    #[tabled(rename = "LOCATION")]
    pub location: String,

    #[tabled(rename = "DATE")]
    pub date: String,

    #[tabled(rename = "URL")]
    pub url: String,
}

impl OfferDisplay {
    /// Row for lists; long fields are shortened
    pub fn row(offer: &JobOffer) -> Self {
        let mut display = Self::detailed(offer);
        display.position = truncate_string(&display.position, 40);
        display.url = truncate_string(&display.url, 48);
        display
    }

    /// Full record for `offer show`
    pub fn detailed(offer: &JobOffer) -> Self {
        let date = offer.date.as_deref().unwrap_or(offer.created_at.as_str());
        Self {
            id: offer.id.clone(),
            position: offer.position.clone(),
            company: offer.company.clone(),
            location: or_dash(offer.location.as_deref()),
            date: format_date(date),
            url: or_dash(offer.url.as_deref().or(offer.source_url.as_deref())),
        }
    }
}

/// One row of an aggregation (top companies, cities, websites)
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct BucketDisplay {
    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "OFFERS")]
    pub count: u64,
}

impl From<&CountBucket> for BucketDisplay {
    fn from(bucket: &CountBucket) -> Self {
        Self {
            name: bucket.name.clone(),
            count: bucket.count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer() -> JobOffer {
        JobOffer {
            id: "o1".into(),
            position: "Ingénieur logiciel Rust embarqué temps réel senior H/F".into(),
            company: "Acme".into(),
            location: None,
            date: None,
            url: None,
            source_url: Some("https://jobs.example.com/o1".into()),
            created_at: "2025-02-01T08:00:00Z".into(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_offer_row_truncates() {
        let row = OfferDisplay::row(&offer());
        assert!(row.position.ends_with("..."));
        assert_eq!(row.position.chars().count(), 40);
        assert_eq!(row.date, "2025-02-01");
        assert_eq!(row.location, "--");
    }

    #[test]
    fn test_offer_detail_falls_back_to_source_url() {
        let detail = OfferDisplay::detailed(&offer());
        assert_eq!(detail.url, "https://jobs.example.com/o1");
        assert!(!detail.position.ends_with("..."));
    }
}
