//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::config::{settings_schema, TargetConfig};
use crate::error::{Error, Result};
use crate::output::Destination;
use crate::target::Target;
use serde_json::json;
use std::path::Path;
use tokio::io::{AsyncBufRead, BufReader};

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
            Commands::Run {
                input,
                local_dir,
                batch_size,
            } => {
                self.run_target(input.as_deref(), local_dir.as_deref(), *batch_size)
                    .await
            }
            Commands::Validate => self.validate(),
            Commands::About => self.about(),
        }
    }

    /// Load configuration from file or inline JSON, then apply env overrides
    pub fn load_config(&self) -> Result<TargetConfig> {
        let mut config = match (&self.cli.config, &self.cli.config_json) {
            (_, Some(json)) => TargetConfig::from_json_str(json)?,
            (Some(path), None) => TargetConfig::from_file(path)?,
            (None, None) => TargetConfig::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    async fn run_target(
        &self,
        input: Option<&Path>,
        local_dir: Option<&Path>,
        batch_size: usize,
    ) -> Result<()> {
        let config = self.load_config()?;
        let mut target = Target::new(config, std::io::stdout())?.with_max_batch_size(batch_size);

        if let Some(dir) = local_dir {
            tracing::info!("Writing objects under {}", dir.display());
            target = target.with_destination(Destination::local(dir)?);
        }

        let reader: Box<dyn AsyncBufRead + Unpin + Send> = match input {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::FileNotFound {
                        path: path.display().to_string(),
                    });
                }
                Box::new(BufReader::new(tokio::fs::File::open(path).await?))
            }
            None => Box::new(BufReader::new(tokio::io::stdin())),
        };

        let summaries = target.run(reader).await?;
        for summary in &summaries {
            tracing::info!("{} ({} records)", summary.uri, summary.records);
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let config = self.load_config()?;
        config.validate()?;
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "status": "valid",
                "bucket_name": config.bucket_name,
                "key_naming_convention": config.key_naming_convention(),
            }))?
        );
        Ok(())
    }

    fn about(&self) -> Result<()> {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "name": crate::NAME,
                "version": crate::VERSION,
                "settings": settings_schema(),
            }))?
        );
        Ok(())
    }
}
