//! Configuration file support.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

use crate::cli::ExportArgs;
use crate::export::ExportOptions;

/// Application configuration loaded from config file.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Default vault directory
    pub dir: Option<PathBuf>,

    /// Default destination directory
    pub output: Option<PathBuf>,

    /// Export behavior defaults
    #[serde(default)]
    pub export: ExportSection,
}

/// The `[export]` table of the config file. Every field falls back to the
/// pipeline default when absent.
#[derive(Debug, Default, Deserialize)]
pub struct ExportSection {
    pub incremental: Option<bool>,
    pub flatten_paths: Option<bool>,
    pub fix_links: Option<bool>,
    pub inline_media: Option<bool>,
    pub relative_header_links: Option<bool>,
    pub title_property: Option<String>,
    pub default_file_icon: Option<String>,
    pub default_media_icon: Option<String>,
    pub site_url: Option<String>,
    pub theme: Option<String>,
}

impl Config {
    /// Load configuration from the default config file location.
    ///
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read config file: {}", config_path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", config_path.display()))
    }

    /// Returns the path to the config file.
    ///
    /// Default: `~/.config/warren/config.toml`
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("warren")
            .join("config.toml")
    }

    /// Resolve the vault directory, with CLI argument taking precedence.
    ///
    /// Precedence order:
    /// 1. CLI `--dir` argument
    /// 2. Config file `dir` setting
    /// 3. Current working directory
    pub fn vault_dir(&self, cli_dir: Option<&PathBuf>) -> PathBuf {
        cli_dir
            .cloned()
            .or_else(|| self.dir.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Resolve the destination directory, with CLI argument taking
    /// precedence over the config file.
    pub fn output_dir(&self, cli_output: Option<&PathBuf>) -> Result<PathBuf> {
        cli_output
            .cloned()
            .or_else(|| self.output.clone())
            .context("no destination directory: pass --output or set `output` in the config file")
    }

    /// Resolve the theme: CLI flag first, then config file.
    pub fn theme<'a>(&'a self, cli_theme: Option<&'a str>) -> Option<&'a str> {
        cli_theme.or(self.export.theme.as_deref())
    }

    /// Merge CLI flags over config file values over pipeline defaults.
    pub fn export_options(&self, args: &ExportArgs) -> ExportOptions {
        let defaults = ExportOptions::default();
        let section = &self.export;

        ExportOptions {
            incremental: !args.full && section.incremental.unwrap_or(defaults.incremental),
            flatten_paths: args.flatten || section.flatten_paths.unwrap_or(defaults.flatten_paths),
            fix_links: !args.no_fix_links && section.fix_links.unwrap_or(defaults.fix_links),
            inline_media: args.inline_media
                || section.inline_media.unwrap_or(defaults.inline_media),
            relative_header_links: args.relative_header_links
                || section
                    .relative_header_links
                    .unwrap_or(defaults.relative_header_links),
            title_property: args
                .title_property
                .clone()
                .or_else(|| section.title_property.clone())
                .unwrap_or(defaults.title_property),
            default_file_icon: section
                .default_file_icon
                .clone()
                .unwrap_or(defaults.default_file_icon),
            default_media_icon: section
                .default_media_icon
                .clone()
                .unwrap_or(defaults.default_media_icon),
            site_url: args
                .site_url
                .clone()
                .or_else(|| section.site_url.clone()),
        }
    }
}
