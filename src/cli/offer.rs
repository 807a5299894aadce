//! Job offer commands

use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::{CommandContext, OfferCommands, OutputFormat, confirm_delete};
use crate::client::JobOfferApi;
use crate::client::models::{CountBucket, JobOfferStats, OfferCount};
use crate::error::Result;
use crate::models::{BucketDisplay, OfferDisplay};
use crate::output::json::format_json;
use crate::output::table::format_table;
use crate::output::{Formattable, print_item};

pub async fn run(ctx: &CommandContext, command: OfferCommands) -> Result<()> {
    match command {
        OfferCommands::List {
            filters,
            limit,
            skip,
        } => {
            let filter = filters.to_filter(Some(limit), skip);
            log::debug!("Searching offers with {:?}", filter.to_query());

            let offers = ctx.client.list_offers(&filter).await?;
            let rows: Vec<OfferDisplay> = offers.iter().map(OfferDisplay::row).collect();
            rows.print(ctx.format)
        }
        OfferCommands::Show { id } => {
            let offer = ctx.client.get_offer(&id).await?;
            print_item(&OfferDisplay::detailed(&offer), ctx.format)
        }
        OfferCommands::Stats => {
            let stats = ctx.client.offer_stats().await?;
            print_stats(&stats, ctx.format)
        }
        OfferCommands::Count { filters } => {
            let total = ctx.client.count_offers(&filters.to_filter(None, None)).await?;
            match ctx.format {
                OutputFormat::Json => println!("{}", format_json(&OfferCount { total })?),
                OutputFormat::Table => println!("{} matching offers", total.to_string().bold()),
            }
            Ok(())
        }
        OfferCommands::Collect { query } => collect(ctx, &query).await,
        OfferCommands::Delete { id, yes } => {
            if !yes {
                let offer = ctx.client.get_offer(&id).await?;
                let what = format!("offer \"{}\" at {}", offer.position, offer.company);
                if !confirm_delete(&what, false)? {
                    return Ok(());
                }
            }
            ctx.client.delete_offer(&id).await?;
            eprintln!("{} Deleted offer {}", "✓".green(), id);
            Ok(())
        }
    }
}

/// Crawling can take a while; show a spinner on interactive output
async fn collect(ctx: &CommandContext, query: &str) -> Result<()> {
    let spinner = match ctx.format {
        OutputFormat::Table => ProgressBar::new_spinner(),
        OutputFormat::Json => ProgressBar::hidden(),
    };
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("Collecting offers for \"{}\"...", query));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = ctx.client.collect_offers(query).await;
    spinner.finish_and_clear();
    let summary = result?;

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&summary)?),
        OutputFormat::Table => println!(
            "{} Collected offers for \"{}\": {} new, {} updated",
            "✓".green(),
            query,
            summary.saved.to_string().bold(),
            summary.updated.to_string().bold()
        ),
    }
    Ok(())
}

fn print_stats(stats: &JobOfferStats, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", format_json(stats)?);
        return Ok(());
    }

    println!("{} {}", "Total offers:".bold(), stats.total_offers);
    for (title, buckets) in [
        ("Top websites", &stats.top_websites),
        ("Top companies", &stats.top_companies),
        ("Top cities", &stats.top_cities),
    ] {
        println!("\n{}", title.bold());
        println!("{}", format_buckets(buckets));
    }
    Ok(())
}

fn format_buckets(buckets: &[CountBucket]) -> String {
    let rows: Vec<BucketDisplay> = buckets.iter().map(BucketDisplay::from).collect();
    format_table(&rows)
}
