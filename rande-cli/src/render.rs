//! Terminal rendering for rande types.
//!
//! Extension trait adding colored one-or-few-line rendering to core types
//! using owo_colors.

use owo_colors::OwoColorize;
use rande_core::mirror::SyncStatus;
use rande_core::record::{Event, Note, Paper};

pub trait Render {
    fn render(&self) -> String;
}

impl Render for Event {
    fn render(&self) -> String {
        let mut line = format!(
            "{} {} {}",
            self.id.dimmed(),
            self.date,
            self.title.bold()
        );
        if !self.description.is_empty() {
            line.push_str(&format!("  {}", self.description.dimmed()));
        }
        line
    }
}

impl Render for Note {
    fn render(&self) -> String {
        let mut lines = vec![format!(
            "{} {} {}",
            self.id.dimmed(),
            format!("week {}", self.week).bold(),
            self.user_name
        )];

        for (label, text) in [
            ("research", &self.research_content),
            ("results", &self.results),
            ("next", &self.next_plan),
        ] {
            if !text.is_empty() {
                lines.push(format!("   {} {}", format!("{label}:").dimmed(), text));
            }
        }

        let mut stamp = format!("created {}", self.created_at.format("%Y-%m-%d"));
        if self.updated_at != self.created_at {
            stamp.push_str(&format!(", updated {}", self.updated_at.format("%Y-%m-%d")));
        }
        lines.push(format!("   {}", stamp.dimmed()));

        lines.join("\n")
    }
}

impl Render for Paper {
    fn render(&self) -> String {
        let mut line = format!("{} {}", self.id.dimmed(), self.title.bold());

        if let Some(authors) = &self.authors {
            line.push_str(&format!("  {}", authors.dimmed()));
        }
        match (&self.year, &self.journal) {
            (Some(year), Some(journal)) => line.push_str(&format!("  ({year}, {journal})")),
            (Some(year), None) => line.push_str(&format!("  ({year})")),
            (None, Some(journal)) => line.push_str(&format!("  ({journal})")),
            (None, None) => {}
        }
        if self.file.is_some() {
            line.push_str(&format!("  {}", "[file]".green()));
        }
        if let Some(url) = &self.url {
            line.push_str(&format!("  {}", url.blue()));
        }
        line
    }
}

impl Render for SyncStatus {
    fn render(&self) -> String {
        match self {
            SyncStatus::Enabled => self.to_string().green().to_string(),
            SyncStatus::Starting => self.to_string().yellow().to_string(),
            SyncStatus::Disabled => self.to_string().red().to_string(),
        }
    }
}
