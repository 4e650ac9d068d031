use anyhow::Result;
use clap::Subcommand;
use rande_core::RecordId;
use rande_core::rande::Rande;

use super::{confirm, report_mirror};
use crate::render::Render;

#[derive(Subcommand)]
pub enum NotesCommand {
    /// Write a note for the selected researcher
    Add {
        /// Week label, e.g. "23"
        #[arg(short, long)]
        week: String,

        #[arg(long, default_value = "")]
        content: String,

        #[arg(long, default_value = "")]
        results: String,

        #[arg(long, default_value = "")]
        next_plan: String,
    },

    /// Replace a note's fields; omitted flags keep the current value
    Edit {
        id: RecordId,

        #[arg(short, long)]
        week: Option<String>,

        #[arg(long)]
        content: Option<String>,

        #[arg(long)]
        results: Option<String>,

        #[arg(long)]
        next_plan: Option<String>,
    },

    /// Delete a note by id
    Delete {
        id: RecordId,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// List the selected researcher's notes, newest first
    List,
}

pub async fn run(cmd: NotesCommand) -> Result<()> {
    let rande = Rande::load()?;
    let session = rande.session();

    match cmd {
        NotesCommand::Add {
            week,
            content,
            results,
            next_plan,
        } => {
            let researcher = session.require()?;
            let (note, outcome) = rande
                .add_note(&researcher, week, content, results, next_plan)
                .await?;
            report_mirror(&outcome);
            println!("Created note {} (week {})", note.id, note.week);
        }

        NotesCommand::Edit {
            id,
            week,
            content,
            results,
            next_plan,
        } => {
            let current = rande
                .notes()
                .into_iter()
                .find(|n| n.id == id)
                .ok_or_else(|| anyhow::anyhow!("Note '{id}' not found"))?;

            let (note, outcome) = rande
                .update_note(
                    id,
                    week.unwrap_or(current.week),
                    content.unwrap_or(current.research_content),
                    results.unwrap_or(current.results),
                    next_plan.unwrap_or(current.next_plan),
                )
                .await?;
            report_mirror(&outcome);
            println!("Updated note {} (week {})", note.id, note.week);
        }

        NotesCommand::Delete { id, yes } => {
            if !yes && !confirm("Really delete this research note?")? {
                return Ok(());
            }
            let outcome = rande.delete_note(id).await?;
            report_mirror(&outcome);
            println!("Deleted note {id}");
        }

        NotesCommand::List => {
            let researcher = session.require()?;
            let mut notes = rande.notes_for(researcher.id);

            if notes.is_empty() {
                println!("No research notes for {} yet.", researcher.name);
                return Ok(());
            }

            notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            println!("{} ({} notes)\n", researcher.name, notes.len());
            for note in notes {
                println!("{}", note.render());
            }
        }
    }

    Ok(())
}
