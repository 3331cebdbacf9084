//! Document submission workflow command.
//!
//! Drives one staging session end to end: preview the input, show the
//! draft, optionally replace its text from a file, commit, and
//! optionally fire the notification side-channel for the new record.

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use crate::backend::http::HttpBackend;
use crate::backend::Backend;
use crate::config::Config;
use crate::models::{PreviewDraft, PreviewInput};
use crate::staging::{StagingSession, StagingState};

/// Flags collected from `reg submit`.
pub struct SubmitOptions {
    pub url: Option<String>,
    pub text: Option<String>,
    pub text_file: Option<PathBuf>,
    pub edit_from: Option<PathBuf>,
    pub preview_only: bool,
    pub notify: bool,
}

pub async fn run_submit(config: &Config, opts: SubmitOptions) -> Result<()> {
    let text = match (&opts.text, &opts.text_file) {
        (Some(_), Some(_)) => bail!("use either --text or --text-file, not both"),
        (None, Some(path)) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read text file: {}", path.display()))?,
        ),
        (text, None) => text.clone(),
    };

    let input = PreviewInput::from_parts(opts.url.as_deref(), text.as_deref())?;

    let backend = Arc::new(HttpBackend::new(&config.backend)?);
    let session = StagingSession::new(backend.clone());

    session.request_preview(input).await?;
    if let StagingState::Error { message } = session.state() {
        bail!("{} — run again to retry", message);
    }
    let draft = match session.draft() {
        Some(draft) => draft,
        None => bail!("preview did not produce a draft"),
    };
    print_draft(&draft);

    if let Some(path) = &opts.edit_from {
        let edited = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read edit file: {}", path.display()))?;
        session.edit_draft_text(&edited)?;
        println!("Draft text replaced from {}", path.display());
    }

    if opts.preview_only {
        println!();
        println!("Preview only — nothing committed.");
        return Ok(());
    }

    session.commit().await?;
    match session.state() {
        StagingState::Committed { id } => {
            println!();
            println!("Committed document {}", id);
            if opts.notify {
                match backend.notify(&id).await {
                    Ok(()) => println!("Notification sent."),
                    // Fire-and-forget: a failed notification does not
                    // undo the commit.
                    Err(err) => eprintln!("Notification failed: {}", err),
                }
            }
            Ok(())
        }
        StagingState::Error { message } => bail!("{} — run again to retry", message),
        other => bail!("unexpected session state after commit: {}", other.name()),
    }
}

fn print_draft(draft: &PreviewDraft) {
    println!("--- Draft ---");
    println!("title:       {}", draft.title);
    if let Some(source) = &draft.source {
        println!("source:      {}", source);
    }
    if let Some(url) = &draft.url {
        println!("url:         {}", url);
    }
    println!(
        "severity:    {} | probability: {}",
        draft.severity, draft.probability
    );
    println!("tags:        {}", draft.tags.join(", "));
    println!("entities:    {}", draft.entities.join(", "));
    println!();
    println!("--- Summary ---");
    println!("{}", draft.text);
}
