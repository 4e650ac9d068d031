use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use rande_core::RecordId;
use rande_core::rande::Rande;

use super::{confirm, report_mirror};
use crate::render::Render;

#[derive(Subcommand)]
pub enum EventsCommand {
    /// Add a calendar event
    Add {
        title: String,

        /// Event day (YYYY-MM-DD); defaults to today
        #[arg(short, long)]
        date: Option<NaiveDate>,

        #[arg(short = 'm', long, default_value = "")]
        description: String,
    },

    /// List events in date order
    List {
        /// Only events in this month (YYYY-MM)
        #[arg(long)]
        month: Option<String>,
    },

    /// Delete an event by id
    Delete {
        id: RecordId,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

pub async fn run(cmd: EventsCommand) -> Result<()> {
    let rande = Rande::load()?;

    match cmd {
        EventsCommand::Add {
            title,
            date,
            description,
        } => {
            let date = date.unwrap_or_else(|| Utc::now().date_naive());
            let (event, outcome) = rande.add_event(title, date, description).await?;
            report_mirror(&outcome);
            println!("Created {}", event.render());
        }

        EventsCommand::List { month } => {
            let mut events = rande.events();
            if let Some(month) = &month {
                events.retain(|e| e.date.format("%Y-%m").to_string() == *month);
            }
            events.sort_by_key(|e| e.date);

            if events.is_empty() {
                match month {
                    Some(month) => println!("No events in {month}."),
                    None => println!("No events."),
                }
                return Ok(());
            }
            for event in events {
                println!("{}", event.render());
            }
        }

        EventsCommand::Delete { id, yes } => {
            if !yes && !confirm("Delete this event?")? {
                return Ok(());
            }
            let outcome = rande.delete_event(id).await?;
            report_mirror(&outcome);
            println!("Deleted event {id}");
        }
    }

    Ok(())
}
