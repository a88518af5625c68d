//! CLI command implementations.

mod config;
mod import;
mod index;
mod list;
mod search;
mod show;

pub use config::run_config;
pub use import::{run_import, ImportArgs};
pub use index::run_index;
pub use list::run_list;
pub use search::run_search;
pub use show::run_show;

use crate::cli::Output;
use crate::orchestrator::{ProcessResult, SkipReason};

/// Print the outcome of indexing one video.
fn report_indexed(result: &ProcessResult) {
    match result.skipped {
        Some(SkipReason::AlreadyIndexed) => Output::info(&format!(
            "[{}] {} is already indexed, skipping",
            result.video_id, result.title
        )),
        Some(SkipReason::NoTranscript) => Output::warning(&format!(
            "[{}] {} has no transcript yet, skipping",
            result.video_id, result.title
        )),
        None => Output::success(&format!(
            "[{}] {}: indexed {} chunks and {} chapters",
            result.video_id, result.title, result.chunks_indexed, result.chapters_indexed
        )),
    }
}
