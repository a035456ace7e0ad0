//! Ingest command handler.
//!
//! Processes a tree of PDF documents into chunks and emits them as JSON
//! lines on stdout, with a summary on stderr via tracing.

use clap::Args;
use copilot_core::{config::AppConfig, AppError, AppResult};
use copilot_corpus::processor::DocumentProcessor;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Process a PDF tree into chunks, emitted as JSON lines
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Directory to process (defaults to the configured data dir)
    pub path: Option<PathBuf>,

    /// Print per-document statistics instead of chunk JSON
    #[arg(long)]
    pub stats: bool,
}

impl IngestCommand {
    /// Execute the ingest command.
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let root = self.path.clone().unwrap_or_else(|| config.data_dir.clone());
        if !root.exists() {
            return Err(AppError::Config(format!(
                "Data directory does not exist: {}",
                root.display()
            )));
        }

        tracing::info!("Ingesting PDF tree at {}", root.display());
        let processor = DocumentProcessor::from_config(config);
        let chunks = processor.process_directory(&root);

        if self.stats {
            let mut per_document: BTreeMap<&str, usize> = BTreeMap::new();
            for chunk in &chunks {
                *per_document.entry(chunk.document_name.as_str()).or_default() += 1;
            }
            for (document, count) in &per_document {
                println!("{}\t{}", document, count);
            }
            println!("total\t{}", chunks.len());
        } else {
            use std::io::Write;
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            for chunk in &chunks {
                serde_json::to_writer(&mut out, chunk)?;
                writeln!(out)?;
            }
        }

        tracing::info!(chunks = chunks.len(), "Ingestion complete");
        Ok(())
    }
}
