//! Import command implementation.

use super::report_indexed;
use crate::cli::Output;
use crate::config::Settings;
use crate::error::VidseekError;
use crate::orchestrator::{ImportRequest, Orchestrator};
use anyhow::{Context, Result};

/// Arguments of the import command.
#[derive(Debug)]
pub struct ImportArgs {
    pub url: String,
    pub title: String,
    pub transcript: Option<String>,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub upload_date: Option<String>,
    pub duration: Option<u32>,
    pub tags: Vec<String>,
    pub index: bool,
}

fn read_text(path: Option<&str>, what: &str) -> Result<Option<String>> {
    path.map(|p| {
        let path = Settings::expand_path(p);
        std::fs::read_to_string(&path).with_context(|| format!("Failed to read {} from {:?}", what, path))
    })
    .transpose()
}

/// Run the import command.
pub async fn run_import(args: ImportArgs, settings: Settings) -> Result<()> {
    let transcription = read_text(args.transcript.as_deref(), "transcript")?;
    let description = read_text(args.description.as_deref(), "description")?;

    let orchestrator = Orchestrator::new(settings)?;

    let video_id = match orchestrator.import_video(ImportRequest {
        url: args.url,
        title: args.title,
        upload_date: args.upload_date,
        description,
        duration_seconds: args.duration,
        transcription,
        summary: args.summary,
        tags: args.tags,
    }) {
        Ok(video_id) => video_id,
        Err(VidseekError::DuplicateVideo { url, video_id }) => {
            Output::warning(&format!("{} is already imported as video {}", url, video_id));
            Output::info(&format!("Run 'vidseek show {}' to inspect it.", video_id));
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let chapters = orchestrator.chapters(video_id).await?;
    Output::success(&format!("Imported video {} with {} chapters", video_id, chapters.len()));

    if args.index {
        let spinner = Output::spinner("Embedding and indexing...");
        let result = orchestrator.index_video(video_id).await;
        spinner.finish_and_clear();
        report_indexed(&result?);
    } else {
        Output::info(&format!("Run 'vidseek index {}' to make it searchable.", video_id));
    }

    Ok(())
}
