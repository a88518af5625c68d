//! Index command implementation.

use super::report_indexed;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the index command for one video, or for every pending video.
pub async fn run_index(video_id: Option<u32>, all: bool, settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;

    if !all {
        let video_id = video_id.ok_or_else(|| anyhow::anyhow!("Give a video id or --all"))?;
        let spinner = Output::spinner(&format!("Indexing video {}...", video_id));
        let result = orchestrator.index_video(video_id).await;
        spinner.finish_and_clear();
        report_indexed(&result?);
        return Ok(());
    }

    let pending = orchestrator.store().pending_videos()?;
    if pending.is_empty() {
        Output::info("Nothing to index.");
        return Ok(());
    }

    let pb = Output::progress_bar(pending.len() as u64, "Indexing");
    let mut indexed = 0;
    for video_id in pending {
        pb.set_message(format!("video {}", video_id));
        match orchestrator.index_video(video_id).await {
            Ok(result) => {
                pb.suspend(|| report_indexed(&result));
                if result.skipped.is_none() {
                    indexed += 1;
                }
            }
            Err(e) => {
                pb.abandon();
                Output::error(&format!("Indexing video {} failed: {}", video_id, e));
                if e.is_transient() {
                    Output::info("The embedding service may be down; run 'vidseek index --all' again later.");
                }
                return Err(e.into());
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    Output::success(&format!("Indexed {} videos", indexed));
    Ok(())
}
