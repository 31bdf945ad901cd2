//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{load_config, ScraperConfig};
use crate::error::{Result, ResultExt};
use crate::fetch::PageFetcher;
use crate::merge::Queries;
use crate::pagination::Query;
use crate::query::SearchQuery;
use crate::record::Tweet;
use serde_json::{json, Value};
use tracing::{info, warn};

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
            Commands::Search { query, limit } => self.search(query, *limit).await,
            Commands::Merge { queries, limit } => self.merge(queries, *limit).await,
            Commands::Status { ids } => self.status(ids).await,
            Commands::Account { usernames } => self.account(usernames).await,
            Commands::Validate { queries } => self.validate(queries),
        }
    }

    /// Load the config file, if any, and apply command-line overrides
    pub fn build_config(&self) -> Result<ScraperConfig> {
        let mut config = match &self.cli.config {
            Some(path) => load_config(path)
                .with_context(|| format!("Cannot use --config {}", path.display()))?,
            None => ScraperConfig::default(),
        };

        if let Some(base_url) = &self.cli.base_url {
            config = config.with_base_url(base_url.clone());
        }
        if let Some(concurrency) = self.cli.concurrency {
            config = config.with_max_concurrency(concurrency);
        }
        if let Some(retries) = self.cli.retries {
            config = config.with_max_retries(retries);
        }

        config.validate()?;
        Ok(config)
    }

    async fn search(&self, query: &str, limit: Option<usize>) -> Result<()> {
        let config = self.build_config()?;
        let mut query = Query::from_config(query, &config)?;
        if let Some(limit) = limit {
            query = query.with_limit(limit);
        }

        let mut stream = query.tweets();
        while let Some(tweet) = stream.next().await? {
            self.output_tweet(&tweet);
        }

        if let Some(termination) = stream.termination() {
            info!(
                "Search '{}' ended: {} ({} tweets)",
                stream.query(),
                termination,
                stream.stats().records_emitted
            );
        }
        Ok(())
    }

    async fn merge(&self, queries: &[String], limit: Option<usize>) -> Result<()> {
        let config = self.build_config()?;
        let config = match limit {
            Some(limit) => config.with_default_limit(limit),
            None => config,
        };
        let queries = Queries::from_config(queries, &config)?;

        let mut merge = queries.tweets();
        let mut failures = 0usize;
        loop {
            match merge.next().await {
                Ok(Some(tweet)) => self.output_tweet(&tweet),
                Ok(None) => break,
                Err(e) => {
                    failures += 1;
                    warn!("Dropped a query after error: {e}");
                }
            }
        }

        for stream in merge.finished_sources() {
            if let Some(termination) = stream.termination() {
                info!(
                    "Query '{}' ended: {} ({} tweets)",
                    stream.query(),
                    termination,
                    stream.stats().records_emitted
                );
            }
        }
        if failures > 0 {
            warn!("{failures} of {} queries failed", queries.len());
        }
        Ok(())
    }

    async fn status(&self, ids: &[String]) -> Result<()> {
        let fetcher = PageFetcher::from_config(&self.build_config()?)?;
        for id in ids {
            let tweet = fetcher
                .fetch_status(id)
                .await
                .with_context(|| format!("Cannot fetch tweet {id}"))?;
            self.output_tweet(&tweet);
        }
        Ok(())
    }

    async fn account(&self, usernames: &[String]) -> Result<()> {
        let fetcher = PageFetcher::from_config(&self.build_config()?)?;
        for username in usernames {
            let account = fetcher
                .fetch_account(username)
                .await
                .with_context(|| format!("Cannot fetch account {username}"))?;
            info!("Fetched profile of {account}");
            self.output_message(&serde_json::to_value(&account)?);
        }
        Ok(())
    }

    fn validate(&self, queries: &[String]) -> Result<()> {
        for raw in queries {
            let query = SearchQuery::parse(raw)?;
            let filters: Vec<Value> = query
                .filters()
                .map(|f| {
                    json!({
                        "prefix": f.prefix,
                        "value": f.value,
                        "negated": f.negated,
                    })
                })
                .collect();

            self.output_message(&json!({
                "query": query.as_str(),
                "terms": query.terms(),
                "filters": filters,
            }));
        }
        Ok(())
    }

    fn output_tweet(&self, tweet: &Tweet) {
        println!("{}", render_tweet(self.cli.format, tweet));
    }

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

/// One output line for a tweet
pub(crate) fn render_tweet(format: OutputFormat, tweet: &Tweet) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string(tweet).unwrap_or_default(),
        OutputFormat::Pretty => format!("{tweet}: {}", tweet.text()),
    }
}
