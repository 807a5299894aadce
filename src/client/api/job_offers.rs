//! Job offer API trait

use async_trait::async_trait;

use crate::client::models::{CollectSummary, JobOffer, JobOfferFilter, JobOfferStats};
use crate::error::Result;

#[async_trait]
pub trait JobOfferApi: Send + Sync {
    async fn list_offers(&self, filter: &JobOfferFilter) -> Result<Vec<JobOffer>>;

    async fn get_offer(&self, id: &str) -> Result<JobOffer>;

    async fn delete_offer(&self, id: &str) -> Result<()>;

    async fn offer_stats(&self) -> Result<JobOfferStats>;

    /// Ask the backend to crawl for offers matching `query`
    async fn collect_offers(&self, query: &str) -> Result<CollectSummary>;

    /// Number of offers matching the filter; paging fields are ignored
    async fn count_offers(&self, filter: &JobOfferFilter) -> Result<u64>;
}
