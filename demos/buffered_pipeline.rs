//! Buffered pipeline demo: rows are split into files of bounded size, each file is
//! uploaded by a background task, and workers pause while an uploader catches up.
//!
//! Run with: cargo run --example buffered_pipeline
//! Set PIPELINE_CONCURRENCY to change the number of workers.

use parking_lot::Mutex;
use pipeline_rust::logging::init_logging;
use pipeline_rust::parallel::Config;
use pipeline_rust::pipeline::{
    BufferedPipeline, ControlFlow, CreatedStoring, FnStoring, PipelineError, RecreateSignal,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

const ROWS_PER_FILE: usize = 8;
const ROWS_PER_UPLOAD_WINDOW: usize = 3;

#[derive(Debug, Clone)]
struct User {
    id: u32,
    name: String,
}

/// Where finished files end up
struct Destination {
    bucket: String,
    files: AtomicUsize,
    uploaded: Mutex<Vec<(String, u32)>>,
}

enum Upload {
    Row(User),
    /// Resume the paused worker once every row queued before this message is written.
    ResumeAfter(ControlFlow),
}

fn open_file(
    destination: &Arc<Destination>,
    recreate: RecreateSignal,
) -> Result<CreatedStoring<User, PipelineError>, PipelineError> {
    let file = format!(
        "{}/users-{:03}.jsonl",
        destination.bucket,
        destination.files.fetch_add(1, Ordering::SeqCst)
    );
    let (tx, mut rx) = mpsc::unbounded_channel::<Upload>();
    let mut written = 0;

    let process_file = file.clone();
    let end_file = file.clone();
    let storing = FnStoring::new(
        move |user: &User, control: &ControlFlow| -> Result<(), PipelineError> {
            let uploader_gone =
                || PipelineError::processor(std::io::Error::other("uploader stopped"));
            tx.send(Upload::Row(user.clone())).map_err(|_| uploader_gone())?;
            written += 1;

            if written % ROWS_PER_UPLOAD_WINDOW == 0 {
                control.pause();
                tx.send(Upload::ResumeAfter(control.clone()))
                    .map_err(|_| uploader_gone())?;
            }
            if written >= ROWS_PER_FILE {
                info!(file = %process_file, written, "file full, rotating");
                recreate.signal();
            }
            Ok(())
        },
        move || {
            info!(file = %end_file, "file closed");
            Ok::<(), PipelineError>(())
        },
    );

    let destination = Arc::clone(destination);
    let upload = async move {
        let mut rows = 0;
        while let Some(message) = rx.recv().await {
            match message {
                Upload::Row(user) => {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    destination.uploaded.lock().push((file.clone(), user.id));
                    rows += 1;
                }
                Upload::ResumeAfter(control) => control.resume(),
            }
        }
        info!(file = %file, rows, "file uploaded");
        Ok::<(), PipelineError>(())
    };

    Ok(CreatedStoring::new(storing).with_pending(upload))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = Arc::new(Config::from_env()?);
    let destination = Arc::new(Destination {
        bucket: "s3://exports".to_string(),
        files: AtomicUsize::new(0),
        uploaded: Mutex::new(Vec::new()),
    });

    let users: Vec<User> = (1..=40)
        .map(|id| User {
            id,
            name: format!("user-{id}"),
        })
        .collect();

    println!("Starting buffered export...");
    println!("- Workers: {}", config.concurrency());
    println!("- Rows per file: {ROWS_PER_FILE}");
    println!("- Rows: {}\n", users.len());

    let pipeline = BufferedPipeline::new(Arc::clone(&destination), config);
    pipeline.run(&open_file, &users).await?;

    let uploaded = destination.uploaded.lock();
    println!(
        "\nExported {} rows into {} files",
        uploaded.len(),
        destination.files.load(Ordering::SeqCst)
    );
    if let Some(user) = users.first() {
        println!("First row: {} ({})", user.id, user.name);
    }
    Ok(())
}
