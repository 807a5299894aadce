//! Collected job offer models

use serde::{Deserialize, Serialize};

/// A job offer gathered by the backend crawler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobOffer {
    #[serde(alias = "_id")]
    pub id: String,

    #[serde(rename = "poste")]
    pub position: String,

    #[serde(rename = "entreprise")]
    pub company: String,

    #[serde(rename = "localisation", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,

    #[serde(default)]
    pub created_at: String,

    #[serde(default)]
    pub updated_at: String,
}

/// Search filters for job offers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobOfferFilter {
    pub keywords: Option<String>,
    pub location: Option<String>,
    pub company: Option<String>,
    pub limit: Option<u32>,
    pub skip: Option<u32>,
}

impl JobOfferFilter {
    /// Query parameters for the listing endpoint.
    ///
    /// Empty strings and zero paging values are left out.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut params = self.search_query();
        if let Some(limit) = self.limit.filter(|n| *n > 0) {
            params.push(("limit", limit.to_string()));
        }
        if let Some(skip) = self.skip.filter(|n| *n > 0) {
            params.push(("skip", skip.to_string()));
        }
        params
    }

    /// Query parameters without paging, for the count endpoint
    pub fn search_query(&self) -> Vec<(&'static str, String)> {
        [
            ("keywords", &self.keywords),
            ("location", &self.location),
            ("company", &self.company),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (key, v.to_string()))
        })
        .collect()
    }
}

/// A `{_id, count}` aggregation bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountBucket {
    #[serde(rename = "_id")]
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobOfferStats {
    pub total_offers: u64,
    #[serde(default)]
    pub top_websites: Vec<CountBucket>,
    #[serde(default)]
    pub top_companies: Vec<CountBucket>,
    #[serde(default)]
    pub top_cities: Vec<CountBucket>,
}

/// Result of a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectSummary {
    pub saved: u64,
    pub updated: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferCount {
    pub total: u64,
}
