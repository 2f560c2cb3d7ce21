//! Operation dispatch for one run or session.
//!
//! A [`Dashboard`] owns the report store and photo storage and turns each
//! parsed [`Command`] into rendered text for stdout.

use crate::cli::{Command, SubmitArgs};
use crate::config::Config;
use crate::error::{WatchError, WatchResult};
use crate::files::DiskFileStore;
use crate::ingest::{import_bulk, submit};
use crate::models::{PhotoUpload, Submission};
use crate::render::{
    imported_markdown, render_gallery, render_summary, render_table, render_trends,
    submitted_markdown, OutputFormat, EMPTY_ANALYSIS,
};
use crate::store::{JsonLinesJournal, ReportStore};
use crate::summarize::{ChatCompletionsClient, SummarizerBridge};
use crate::views::{gallery, table, trends, write_csv, zip_options, GalleryQuery, ZipFilter};
use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Report store, photo storage and settings for one run.
pub struct Dashboard {
    store: ReportStore,
    files: DiskFileStore,
    config: Config,
    show_progress: bool,
}

impl Dashboard {
    /// Open the store described by `config`, replaying its journal if any.
    pub fn open(config: Config, show_progress: bool) -> WatchResult<Self> {
        let store = match config.storage.journal {
            Some(ref path) => {
                info!("Using report journal: {}", path.display());
                ReportStore::open(Box::new(JsonLinesJournal::new(path)))?
            }
            None => {
                debug!("No journal configured, reports are kept in memory");
                ReportStore::in_memory()
            }
        };
        let files = DiskFileStore::new(&config.storage.photo_dir);

        Ok(Self {
            store,
            files,
            config,
            show_progress,
        })
    }

    pub fn store(&self) -> &ReportStore {
        &self.store
    }

    fn format(&self) -> OutputFormat {
        self.config.general.format
    }

    /// Run one operation and return the text to print.
    pub async fn run(&mut self, command: Command) -> WatchResult<String> {
        match command {
            Command::Submit(args) => self.submit(args),
            Command::Import { path } => self.import(&path),
            Command::Gallery { zip, sort, view } => {
                let query = GalleryQuery {
                    zip: ZipFilter::from(zip),
                    order: sort,
                    layout: view,
                };
                let view = gallery(self.store.reports(), &query, self.config.views.grid_columns);
                render_gallery(&view, &zip_options(self.store.reports()), &self.files, self.format())
            }
            Command::Table { output, importable } => match output {
                Some(path) => self.export(&path, importable),
                None => render_table(&table(self.store.reports()), self.format()),
            },
            Command::Trends { zip } => {
                let view = trends(self.store.reports(), self.config.views.top_zip_count);
                render_trends(&view, zip.as_deref(), self.format())
            }
            Command::Summarize { zip } => self.summarize(&zip).await,
            Command::Session | Command::InitConfig => Err(WatchError::configuration(
                "This command is only available from the command line",
            )),
        }
    }

    fn submit(&mut self, args: SubmitArgs) -> WatchResult<String> {
        let photo = match args.photo {
            Some(ref path) => Some(PhotoUpload {
                file_name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "photo".to_string()),
                bytes: std::fs::read(path)?,
            }),
            None => None,
        };

        let submission = Submission {
            address: args.address,
            zipcode: args.zipcode,
            description: args.description,
            concerns: args.concerns,
            source_type: args.source_type,
            used: args.used,
            symptoms: args.symptoms,
            alert: args.alert,
            photo,
        };

        let report = submit(
            &mut self.store,
            &self.files,
            submission,
            Local::now().naive_local(),
        )?;

        match self.format() {
            OutputFormat::Markdown => Ok(submitted_markdown(&report)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&report)?),
        }
    }

    fn import(&mut self, path: &Path) -> WatchResult<String> {
        info!("Importing reports from {}", path.display());
        let reader = BufReader::new(File::open(path)?);
        let summary = import_bulk(&mut self.store, reader)?;

        match self.format() {
            OutputFormat::Markdown => Ok(imported_markdown(&summary)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "admitted": summary.admitted,
                "null_timestamps": summary.null_timestamps,
            }))?),
        }
    }

    fn export(&self, path: &Path, importable: bool) -> WatchResult<String> {
        let rows = table(self.store.reports());

        if path == Path::new("-") {
            let mut buffer = Vec::new();
            write_csv(&rows, &mut buffer, importable)?;
            return Ok(String::from_utf8_lossy(&buffer).into_owned());
        }

        write_csv(&rows, File::create(path)?, importable)?;
        info!("Exported {} reports to {}", rows.len(), path.display());
        Ok(format!(
            "✅ Exported {} reports to {}\n",
            rows.len(),
            path.display()
        ))
    }

    async fn summarize(&self, zipcode: &str) -> WatchResult<String> {
        if self.store.is_empty() {
            return render_summary(zipcode, EMPTY_ANALYSIS, self.format());
        }

        let client = ChatCompletionsClient::new(self.config.summarizer.client_config())?;
        let bridge = SummarizerBridge::new(client, self.config.summarizer.summary_settings());

        let spinner = self.spinner(format!("Analyzing reports for {}...", zipcode));
        let result = bridge.summarize(self.store.reports(), zipcode).await;
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        render_summary(zipcode, &result?, self.format())
    }

    fn spinner(&self, message: String) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]") {
            pb.set_style(style);
        }
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    }
}
