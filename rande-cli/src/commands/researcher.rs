use anyhow::Result;
use clap::Subcommand;
use rande_core::rande::Rande;

#[derive(Subcommand)]
pub enum ResearcherCommand {
    /// Select the researcher who owns new notes
    Select { id: i64 },

    /// Show the current selection
    Show,

    /// Clear the selection
    Clear,
}

pub fn run(cmd: ResearcherCommand) -> Result<()> {
    let rande = Rande::load()?;
    let session = rande.session();

    match cmd {
        ResearcherCommand::Select { id } => {
            let Some(researcher) = rande.researcher(id) else {
                let available: Vec<String> = rande
                    .researchers()
                    .iter()
                    .map(|r| format!("{} ({})", r.id, r.name))
                    .collect();
                if available.is_empty() {
                    anyhow::bail!(
                        "No researchers configured.\n\n\
                        Add them to your config file, e.g.:\n  \
                        [[researchers]]\n  \
                        id = 1\n  \
                        name = \"Jane Doe\""
                    );
                }
                anyhow::bail!(
                    "Researcher '{}' not found. Available: {}",
                    id,
                    available.join(", ")
                );
            };

            session.select(researcher)?;
            println!("Selected {}", researcher.name);
        }

        ResearcherCommand::Show => match session.current() {
            Some(researcher) => println!("{} ({})", researcher.name, researcher.id),
            None => println!("No researcher selected."),
        },

        ResearcherCommand::Clear => {
            session.clear()?;
            println!("Selection cleared.");
        }
    }

    Ok(())
}
