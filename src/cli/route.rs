//! CLI route: single route table and run context. Dispatches to the engine
//! and presentation.

use crate::cli::parse::{Commands, FilterArgs, OutputFormat};
use crate::cli::presentation::{format_copy_summary, format_listing, format_paths};
use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::filter::CopyFilter;
use crate::options::{ExportOptions, LoadOptions};
use crate::tree::Tree;
use crate::tree::walker::Walker;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Runtime context for CLI execution: one engine session plus the
/// cancellation token shared with long-running commands.
pub struct RunContext {
    engine: Arc<Engine>,
    cancel: CancellationToken,
}

impl RunContext {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let engine = Engine::new(config).context("invalid engine configuration")?;
        Ok(Self {
            engine: Arc::new(engine),
            cancel: CancellationToken::new(),
        })
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Token cancelled on Ctrl-C.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn execute(&self, command: &Commands) -> Result<String> {
        match command {
            Commands::Digest { path, filter } => {
                let tree = self.load(path, filter)?;
                Ok(self.engine.digest(tree))
            }
            Commands::Ls { path, at, format } => {
                let tree = self.load(path, &FilterArgs::default())?;
                let names = self.engine.entries(tree, at)?;
                let mut rows = Vec::with_capacity(names.len());
                for name in names {
                    let info = self.engine.stat(tree, &format!("{}/{}", at, name))?;
                    rows.push((name, info));
                }
                Ok(format_listing(&rows, *format))
            }
            Commands::Glob { path, pattern } => {
                let tree = self.load(path, &FilterArgs::default())?;
                let matches = self.engine.glob(tree, pattern)?;
                Ok(format_paths(&matches, OutputFormat::Text))
            }
            Commands::Diff { base, other, format } => {
                let base = self.load(base, &FilterArgs::default())?;
                let other = self.load(other, &FilterArgs::default())?;
                let delta = self.engine.diff(base, other)?;
                let paths: Vec<String> = Walker::new(self.engine.store())
                    .walk(delta.root())?
                    .into_iter()
                    .map(|e| e.path.to_relative_string())
                    .collect();
                Ok(format_paths(&paths, *format))
            }
            Commands::Copy {
                source,
                dest,
                filter,
                wipe,
                timestamp,
            } => {
                let mut tree = self.load(source, filter)?;
                if let Some(timestamp) = timestamp {
                    tree = self.engine.with_timestamps(tree, *timestamp)?;
                }
                let options = ExportOptions { wipe: *wipe };
                let written = self.export(tree, dest.clone(), options).await?;
                Ok(format_copy_summary(&written, &self.engine.digest(tree), *wipe))
            }
            Commands::Config => Ok(self.engine.config().to_toml()?),
        }
    }

    fn load(&self, path: &Path, filter: &FilterArgs) -> Result<Tree> {
        let options = LoadOptions {
            filter: CopyFilter::new()
                .include(filter.include.iter().cloned())
                .exclude(filter.exclude.iter().cloned()),
        };
        self.engine
            .load(path, &options)
            .with_context(|| format!("failed to load {}", path.display()))
    }

    /// Run the export on a blocking thread; Ctrl-C cancels it between entries.
    async fn export(&self, tree: Tree, dest: PathBuf, options: ExportOptions) -> Result<PathBuf> {
        let engine = Arc::clone(&self.engine);
        let cancel = self.cancel.clone();
        let task_dest = dest.clone();
        let mut task = tokio::task::spawn_blocking(move || {
            engine.export(tree, &task_dest, &options, &cancel)
        });

        let result = tokio::select! {
            joined = &mut task => joined,
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted; cancelling export");
                self.cancel.cancel();
                task.await
            }
        };

        let written = result
            .context("export task panicked")?
            .with_context(|| format!("failed to export to {}", dest.display()))?;
        info!(dest = %written.display(), "Export finished");
        Ok(written)
    }
}
