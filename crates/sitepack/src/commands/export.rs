//! `sitepack export` command implementation.

use std::path::PathBuf;

use clap::Args;
use sitepack_config::{CliSettings, Config};
use sitepack_export::{ArchiveOptions, BuildConfig, ComponentRegistry, StaticSiteBuilder};
use sitepack_model::BuildData;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the export command.
#[derive(Args)]
pub(crate) struct ExportArgs {
    /// Build data JSON file.
    build: PathBuf,

    /// Archive to write (default: the deployment name, or `<project id>.zip`).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Folder every archive entry is nested under (overrides config).
    #[arg(long)]
    root_folder: Option<String>,

    /// URL prefix for asset files (overrides config).
    #[arg(long)]
    asset_base_url: Option<String>,

    /// Path to configuration file (default: auto-discover sitepack.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the generated file paths.
    #[arg(long)]
    list: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl ExportArgs {
    /// Execute the export command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, parsing, generation or writing fails.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            asset_base_url: self.asset_base_url,
            root_folder: self.root_folder,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        tracing::debug!(path = %self.build.display(), "Reading build data");
        let data = BuildData::from_slice(&std::fs::read(&self.build)?)?;
        let builder = builder_from_config(&config)?;
        let export = builder.build(&data).await?;

        if self.list {
            output.file_list(&export);
        }

        let target = self.output.unwrap_or_else(|| default_output(&data));
        std::fs::write(&target, &export.archive)?;
        output.exported(&export, &target);
        Ok(())
    }
}

/// Site builder configured from the `[export]` and `[components]` sections.
fn builder_from_config(config: &Config) -> Result<StaticSiteBuilder, CliError> {
    let mut archive =
        ArchiveOptions::default().with_compression_level(config.export.compression_level);
    archive.root_folder.clone_from(&config.export.root_folder);
    let build_config = BuildConfig::default()
        .with_asset_base_url(config.export.asset_base_url.clone())
        .with_archive(archive);

    let mut registry = ComponentRegistry::new();
    if let Some(path) = &config.components_resolved.registry {
        registry = registry.extend_from_file(path)?;
    }
    Ok(StaticSiteBuilder::new(build_config).with_registry(registry))
}

/// Archive name from the static deployment, falling back to the project id.
fn default_output(data: &BuildData) -> PathBuf {
    let name = data
        .build
        .deployment
        .as_ref()
        .filter(|deployment| deployment.destination.as_deref() == Some("static"))
        .and_then(|deployment| deployment.name.as_deref())
        .filter(|name| !name.is_empty() && *name != ".." && !name.contains(['/', '\\']));
    match name {
        Some(name) => PathBuf::from(name),
        None => PathBuf::from(format!("{}.zip", data.build.project_id)),
    }
}
