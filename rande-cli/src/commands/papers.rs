use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use rande_core::rande::{NewPaper, Rande};
use rande_core::{Attachment, RecordId};

use super::{confirm, report_mirror};
use crate::render::Render;

#[derive(Subcommand)]
pub enum PapersCommand {
    /// Register a paper, optionally attaching a file
    Add {
        title: String,

        #[arg(long)]
        authors: Option<String>,

        #[arg(long)]
        year: Option<i32>,

        #[arg(long)]
        journal: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// File to attach (at most 10 MiB)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// External link to the paper
        #[arg(short, long)]
        url: Option<String>,
    },

    /// List papers, newest first
    List,

    /// Delete a paper by id
    Delete {
        id: RecordId,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Write a paper's attached file back to disk
    Download {
        id: RecordId,

        /// Output path; defaults to the original file name
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

pub async fn run(cmd: PapersCommand) -> Result<()> {
    let rande = Rande::load()?;

    match cmd {
        PapersCommand::Add {
            title,
            authors,
            year,
            journal,
            description,
            file,
            url,
        } => {
            if file.is_none()
                && url.is_none()
                && !confirm("No file or URL attached. Add the paper anyway?")?
            {
                return Ok(());
            }

            let attachment = match &file {
                Some(path) => {
                    let bytes = std::fs::read(path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| "paper.pdf".to_string());
                    Some(Attachment::from_bytes(name, &bytes)?)
                }
                None => None,
            };

            let (paper, outcome) = rande
                .add_paper(NewPaper {
                    title,
                    authors,
                    year,
                    journal,
                    description,
                    file: attachment,
                    url,
                })
                .await?;
            report_mirror(&outcome);
            println!("Registered {}", paper.render());
        }

        PapersCommand::List => {
            let mut papers = rande.papers();
            if papers.is_empty() {
                println!("No papers registered.");
                return Ok(());
            }

            papers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            for paper in papers {
                println!("{}", paper.render());
            }
        }

        PapersCommand::Delete { id, yes } => {
            if !yes && !confirm("Really delete this paper?")? {
                return Ok(());
            }
            let outcome = rande.delete_paper(id).await?;
            report_mirror(&outcome);
            println!("Deleted paper {id}");
        }

        PapersCommand::Download { id, out } => {
            let paper = rande
                .paper(id)
                .ok_or_else(|| anyhow::anyhow!("Paper '{id}' not found"))?;
            let attachment = paper
                .file
                .ok_or_else(|| anyhow::anyhow!("Paper '{}' has no attached file", paper.title))?;

            let path = out.unwrap_or_else(|| PathBuf::from(&attachment.name));
            let bytes = attachment.decode()?;
            std::fs::write(&path, bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}
