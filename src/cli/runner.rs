//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::FeedConfig;
use crate::connectivity::TcpProbe;
use crate::engine::GallerySnapshot;
use crate::error::{Error, Result};
use crate::http::{HttpPageSource, PageSource};
use crate::pagination::PageRequest;
use crate::runtime::{Feed, FeedHandle};
use crate::types::{PageIndex, Sentinel};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Sentinel the CLI stands in for
const SCROLL_SENTINEL: Sentinel = Sentinel(1);

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Page { page } => self.page(*page).await,
            Commands::Scroll {
                pages,
                probe_interval,
            } => self.scroll(*pages, *probe_interval).await,
            Commands::Config => self.show_config(),
        }
    }

    /// Load the config file (or defaults) and apply command-line overrides
    fn load_config(&self) -> Result<FeedConfig> {
        let mut config = match &self.cli.config {
            Some(path) => FeedConfig::from_file(path)?,
            None => FeedConfig::default(),
        };

        if let Some(base_url) = &self.cli.base_url {
            config.base_url.clone_from(base_url);
        }
        if let Some(path) = &self.cli.path {
            config.path.clone_from(path);
        }
        if let Some(page_size) = self.cli.page_size {
            config.page_size = page_size;
        }

        config.validate()?;
        Ok(config)
    }

    /// Fetch one page directly, without the feed
    async fn page(&self, page: u32) -> Result<()> {
        if page == 0 {
            return Err(Error::invalid_value("page", "pages are numbered from 1"));
        }

        let config = self.load_config()?;
        let source = HttpPageSource::new(&config)?;
        let request = PageRequest::new(page, config.page_size);

        let items = source.fetch_page(request).await?;

        for item in &items {
            self.output_item(page, item);
        }
        self.output_message(&json!({
            "type": "PAGE",
            "page": {
                "index": page,
                "count": items.len(),
                "exhausted": items.is_empty()
            }
        }));

        Ok(())
    }

    /// Drive a feed the way a scrolling user would
    async fn scroll(&self, max_pages: u32, probe_interval: Option<u64>) -> Result<()> {
        let config = self.load_config()?;
        let source = HttpPageSource::new(&config)?;

        self.output_log(
            "INFO",
            &format!("Loading gallery from {}", source.endpoint()),
        );

        let feed = Feed::spawn(source, &config);
        let handle = feed.handle();

        let probe = match probe_interval {
            Some(secs) => {
                let probe = TcpProbe::for_url(&config.base_url, Duration::from_secs(secs.max(1)))?;
                debug!("Probing {} every {}s", probe.addr(), secs);
                Some(probe.spawn(handle.clone()))
            }
            None => None,
        };

        handle.attach_sentinel(SCROLL_SENTINEL)?;
        handle.mount()?;

        let outcome = self.follow(&handle, max_pages, probe.is_some()).await;

        if let Some(probe) = probe {
            probe.abort();
        }
        let state = feed.close().await?;

        match outcome {
            Ok(snapshot) => {
                self.output_message(&json!({
                    "type": "STATUS",
                    "status": {
                        "items": state.len(),
                        "page_index": state.page_index(),
                        "has_more": state.has_more(),
                        "retry_attempt": snapshot.retry_attempt
                    }
                }));
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Print items as they arrive and advance until the feed has nothing left
    async fn follow(
        &self,
        handle: &FeedHandle,
        max_pages: u32,
        probing: bool,
    ) -> Result<GallerySnapshot> {
        let mut rx = handle.subscribe();
        let mut emitted = 0;
        let mut advanced_from: Option<PageIndex> = None;
        let mut loaded: Option<PageIndex> = None;
        let mut awaiting_network = false;

        loop {
            let snapshot = rx.borrow_and_update().clone();

            for item in snapshot.items.iter().skip(emitted) {
                self.output_item(snapshot.page_index, item);
            }
            emitted = snapshot.len();

            if snapshot.mounted && snapshot.is_settled() {
                match &snapshot.error {
                    Some(message) if !snapshot.is_online && probing => {
                        if !awaiting_network {
                            self.output_log("WARN", message);
                            awaiting_network = true;
                        }
                    }
                    Some(message) => {
                        return Err(Error::Stopped {
                            message: message.clone(),
                        });
                    }
                    None => {
                        let resumed = std::mem::take(&mut awaiting_network);
                        if resumed && loaded != Some(snapshot.page_index) {
                            // The connection dropped before this page arrived
                            self.output_log("INFO", "Connection restored, retrying");
                            handle.retry()?;
                        } else {
                            if resumed {
                                advanced_from = None;
                            }
                            loaded = Some(snapshot.page_index);

                            let done = !snapshot.has_more
                                || (max_pages > 0 && snapshot.page_index >= max_pages);
                            if done {
                                return Ok(snapshot);
                            }
                            if advanced_from != Some(snapshot.page_index) {
                                // Scroll to the bottom and back
                                advanced_from = Some(snapshot.page_index);
                                handle.sentinel_visible(SCROLL_SENTINEL, true)?;
                                handle.sentinel_visible(SCROLL_SENTINEL, false)?;
                            }
                        }
                    }
                }
            }

            rx.changed().await.map_err(|_| Error::Closed)?;
        }
    }

    /// Print the effective configuration
    fn show_config(&self) -> Result<()> {
        let config = self.load_config()?;
        match self.cli.format {
            OutputFormat::Json => {
                self.output_message(&json!({
                    "type": "CONFIG",
                    "config": serde_json::to_value(&config)?
                }));
            }
            OutputFormat::Pretty => {
                print!("{}", serde_yaml::to_string(&config)?);
            }
        }
        Ok(())
    }

    fn output_item(&self, page: PageIndex, item: &Value) {
        self.output_message(&json!({
            "type": "ITEM",
            "page": page,
            "item": item
        }));
    }

    fn output_log(&self, level: &str, message: &str) {
        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": level,
                "message": message
            }
        }));
    }

    /// Output a message in the requested format
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}
