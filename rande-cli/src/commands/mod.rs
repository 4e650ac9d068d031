pub mod events;
pub mod notes;
pub mod papers;
pub mod researcher;
pub mod sync;

use anyhow::Result;
use rande_core::rande::MirrorOutcome;

/// Report what happened to the mirror after a local write. A failed push
/// is logged, never fatal: the local write already stands.
pub(crate) fn report_mirror(outcome: &MirrorOutcome) {
    if let MirrorOutcome::Failed(e) = outcome {
        tracing::warn!(error = %e, "remote mirror write failed; local data saved");
    }
}

pub(crate) fn confirm(prompt: &str) -> Result<bool> {
    Ok(dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}
