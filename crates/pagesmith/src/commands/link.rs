/*
 * link.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Create an expiring or view-limited share link for a stored project.
 */

use anyhow::Result;
use chrono::Utc;
use pagesmith_project::create_share_link;

use crate::config::Config;

/// Arguments for the link command
#[derive(Debug, Default)]
pub struct LinkArgs {
    pub project_id: String,
    pub slug: String,
    pub expires_days: Option<u32>,
    pub max_views: Option<u64>,
}

pub fn execute(config: &Config, args: LinkArgs) -> Result<()> {
    let service = config.project_service()?;
    let link = pollster::block_on(create_share_link(
        &service,
        &args.project_id,
        &args.slug,
        args.expires_days,
        args.max_views,
        Utc::now(),
    ))?;
    if let Some(expires_at) = link.expires_at {
        tracing::info!(slug = %link.custom_slug, %expires_at, "link expires");
    }
    println!("{}", link.url(&config.base_url));
    Ok(())
}
