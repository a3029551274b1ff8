//! CLI runner - executes commands

use crate::cli::commands::{parse_stream_list, Cli, Commands};
use crate::config::{config_spec, TapConfig};
use crate::engine::SyncEngine;
use crate::error::Result;
use crate::output::{write_json_line, MessageWriter};
use crate::streams::StreamRegistry;
use serde_json::json;
use std::io::{self, Write};
use tracing::{error, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command, writing messages to stdout
    pub async fn run(&self) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.run_with_output(&mut out).await
    }

    /// Run the CLI command, writing messages to `out`
    pub async fn run_with_output(&self, out: &mut dyn Write) -> Result<()> {
        match &self.cli.command {
            Commands::Spec => self.spec(out),
            Commands::Check => self.check(out).await,
            Commands::Discover => self.discover(out),
            Commands::Streams => self.streams(out),
            Commands::Read { streams } => self.read(streams.as_deref(), out).await,
        }
    }

    /// Load and validate config. Inline JSON takes precedence over a file;
    /// with neither, validation fails on the missing API key.
    fn load_config(&self) -> Result<TapConfig> {
        if let Some(json_str) = &self.cli.config_json {
            return TapConfig::from_json(json_str);
        }

        if let Some(path) = &self.cli.config {
            return TapConfig::from_file(path);
        }

        TapConfig::from_value(json!({}))
    }

    /// Show spec
    fn spec(&self, out: &mut dyn Write) -> Result<()> {
        write_json_line(
            out,
            &json!({
                "type": "SPEC",
                "spec": {
                    "connectionSpecification": config_spec()
                }
            }),
        )
    }

    /// Check connection
    async fn check(&self, out: &mut dyn Write) -> Result<()> {
        let config = self.load_config()?;
        info!(base_url = %config.base_url, "Checking connection");

        let engine = SyncEngine::from_config(config)?;
        match engine.check().await {
            Ok(()) => write_json_line(
                out,
                &json!({
                    "type": "CONNECTION_STATUS",
                    "connectionStatus": {
                        "status": "SUCCEEDED",
                        "message": "Connection successful"
                    }
                }),
            ),
            Err(e) => {
                write_json_line(
                    out,
                    &json!({
                        "type": "CONNECTION_STATUS",
                        "connectionStatus": {
                            "status": "FAILED",
                            "message": format!("Connection failed: {e}")
                        }
                    }),
                )?;
                Err(e)
            }
        }
    }

    /// Print the stream catalog
    fn discover(&self, out: &mut dyn Write) -> Result<()> {
        let registry = StreamRegistry::canvas()?;
        write_json_line(out, &registry.catalog())
    }

    /// List stream names
    fn streams(&self, out: &mut dyn Write) -> Result<()> {
        let registry = StreamRegistry::canvas()?;
        write_json_line(
            out,
            &json!({
                "type": "STREAMS",
                "streams": registry.names()
            }),
        )
    }

    /// Read streams
    async fn read(&self, streams: Option<&str>, out: &mut dyn Write) -> Result<()> {
        let config = self.load_config()?;
        let selection = parse_stream_list(streams);

        let mut engine = SyncEngine::from_config(config)?;
        let mut writer = MessageWriter::new(out);

        let result = engine.sync(&selection, &mut writer).await;
        writer.finish()?;

        match result {
            Ok(stats) => {
                info!(
                    records = stats.records_synced,
                    pages = stats.pages_fetched,
                    duration_ms = stats.duration_ms,
                    "Read finished"
                );
                Ok(())
            }
            Err(e) if e.is_schema_drift() => {
                error!(
                    error = %e,
                    "Read aborted: Canvas returned data the stream definitions do not describe"
                );
                Err(e)
            }
            Err(e) => {
                error!(error = %e, "Read aborted");
                Err(e)
            }
        }
    }
}
