use anyhow::Result;
use clap::Subcommand;
use owo_colors::OwoColorize;
use rande_core::Collection;
use rande_core::config::GlobalConfig;
use rande_core::mirror::SyncEvent;
use rande_core::rande::Rande;
use tokio::sync::broadcast::error::RecvError;

use crate::render::Render;

#[derive(Subcommand)]
pub enum SyncCommand {
    /// Reconcile with the remote store, then mirror changes until ctrl-c
    Run,

    /// Turn on best-effort mirroring of every save
    On,

    /// Turn off mirroring of saves
    Off,

    /// Show mirror configuration and last reconciliation times
    Status,
}

pub async fn run(cmd: SyncCommand) -> Result<()> {
    match cmd {
        SyncCommand::Run => watch().await,
        SyncCommand::On => set_enabled(true),
        SyncCommand::Off => set_enabled(false),
        SyncCommand::Status => status(),
    }
}

async fn watch() -> Result<()> {
    let rande = Rande::load()?;
    let mut mirror = rande.mirror();
    let mut events = mirror.subscribe();

    mirror.enable().await?;
    println!("Mirroring {}. Press ctrl-c to stop.", mirror.status().render());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Ok(SyncEvent::Updated(collection)) => {
                    println!("{} {} updated from remote", "⟳".cyan(), collection);
                }
                Ok(SyncEvent::Status(status)) => {
                    println!("sync: {}", status.render());
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            },
        }
    }

    mirror.disable();
    println!("Mirroring stopped.");
    Ok(())
}

fn set_enabled(enabled: bool) -> Result<()> {
    let mut config = GlobalConfig::load()?;
    let provider = {
        let Some(remote) = config.remote.as_mut() else {
            anyhow::bail!(
                "No remote store configured.\n\n\
                Add a [remote] table to your config file, e.g.:\n  \
                [remote]\n  \
                provider = \"firestore\"\n  \
                [remote.params]\n  \
                project_id = \"my-project\""
            );
        };

        remote.enabled = enabled;
        remote.provider.clone()
    };
    config.save()?;

    if enabled {
        println!("Saves now mirror to '{}'.", provider);
    } else {
        println!("Saves no longer mirror to the remote store.");
    }
    Ok(())
}

fn status() -> Result<()> {
    let rande = Rande::load()?;

    match &rande.config().remote {
        Some(remote) => {
            let state = if remote.enabled {
                "mirroring saves".green().to_string()
            } else {
                "configured, not mirroring saves".yellow().to_string()
            };
            println!("Remote: {} ({})", remote.provider, state);
        }
        None => {
            println!("Remote: {}", "not configured".red());
            return Ok(());
        }
    }

    for collection in Collection::ALL {
        match rande.store().last_synced_at(collection) {
            Some(at) => println!("  {collection}: last reconciled {}", at.format("%Y-%m-%d %H:%M:%S")),
            None => println!("  {collection}: never reconciled"),
        }
    }
    Ok(())
}
