//! Common CLI types shared across commands

use clap::Args;

use crate::client::models::JobOfferFilter;

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Table format - human-readable rows (default)
    #[default]
    Table,
    /// JSON format - structured for scripts
    Json,
}

/// Job offer search filters
#[derive(Args, Debug, Default, Clone)]
pub struct OfferFilterArgs {
    /// Keywords matched against title and description
    #[arg(long, short = 'k')]
    pub keywords: Option<String>,

    /// Location (city or region)
    #[arg(long, short = 'l')]
    pub location: Option<String>,

    /// Company name
    #[arg(long, short = 'c')]
    pub company: Option<String>,
}

impl OfferFilterArgs {
    /// Convert to an API filter with optional paging
    pub fn to_filter(&self, limit: Option<u32>, skip: Option<u32>) -> JobOfferFilter {
        JobOfferFilter {
            keywords: self.keywords.clone(),
            location: self.location.clone(),
            company: self.company.clone(),
            limit,
            skip,
        }
    }
}

/// Editable application fields, shared by `app add` and `app update`
#[derive(Args, Debug, Default, Clone)]
pub struct ApplicationFields {
    /// Job location
    #[arg(long)]
    pub location: Option<String>,

    /// Link to the job posting
    #[arg(long)]
    pub url: Option<String>,

    /// Date the application was sent (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,

    /// Free-form description
    #[arg(long)]
    pub description: Option<String>,
}
