/*
 * projects.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * List stored projects.
 */

use anyhow::Result;
use chrono::{DateTime, Utc};
use pagesmith_project::{Project, ProjectService, ShareableLink, share_url};

use crate::config::Config;

pub fn execute(config: &Config) -> Result<()> {
    let service = config.project_service()?;
    let projects = pollster::block_on(service.get_user_projects())?;
    if projects.is_empty() {
        tracing::info!(store = %config.store.display(), "no projects yet");
    }
    let now = Utc::now();
    for project in &projects {
        println!("{}", describe(project, &config.base_url));
        for link in pollster::block_on(service.get_project_share_links(&project.id))? {
            println!("    {}", describe_link(&link, &config.base_url, now));
        }
    }
    Ok(())
}

fn describe(project: &Project, base_url: &str) -> String {
    format!(
        "{}  {} [{}]  {}  views={} clicks={}",
        project.id,
        project.name,
        project.template,
        share_url(base_url, project),
        project.analytics.views,
        project.analytics.clicks,
    )
}

fn describe_link(link: &ShareableLink, base_url: &str, now: DateTime<Utc>) -> String {
    let limit = match link.max_views {
        Some(max) if max > 0 => format!("/{max}"),
        _ => String::new(),
    };
    let status = if link.is_expired(now) {
        " (expired)".to_string()
    } else if link.is_exhausted() {
        " (view limit reached)".to_string()
    } else {
        link.expires_at
            .map(|at| format!(" expires {}", at.format("%Y-%m-%d")))
            .unwrap_or_default()
    };
    format!("{}  views={}{}{}", link.url(base_url), link.views, limit, status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pagesmith_project::NewProject;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_describe_uses_custom_url() {
        let mut input = NewProject::new("Launch", "superclips");
        input.custom_url = Some("launch".to_string());
        let project = Project::new("local", input, Utc::now());

        let line = describe(&project, "https://pages.example.com/");
        assert!(line.contains("https://pages.example.com/share/launch"));
        assert!(line.contains("views=0"));
    }

    #[test]
    fn test_describe_link_status() {
        let created = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let mut link = ShareableLink::new("p", "promo", Some(7), Some(2), created).unwrap();
        let base = "https://pages.example.com";

        assert_eq!(
            describe_link(&link, base, created),
            "https://pages.example.com/share/promo  views=0/2 expires 2025-03-08"
        );
        link.record_view();
        link.record_view();
        assert!(describe_link(&link, base, created).ends_with("views=2/2 (view limit reached)"));
        assert!(describe_link(&link, base, created + Duration::days(8)).ends_with("(expired)"));
    }
}
