//! Persistent settings in `~/.paperctl.json`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, Context};
use chrono::{DateTime, Local, Utc};
use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use colored::*;
use crate::colors;

const CONFIG_FILE: &str = ".paperctl.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Reference data
    pub codes: Vec<PathBuf>,
    pub output: Option<PathBuf>,

    // Sorting preferences
    pub recursive: bool,
    pub copy: bool,
    pub force: bool,
    pub fuzzy: bool,
    pub prompt_missing: bool,
    pub quit_on_error: bool,

    // State tracking
    pub last_sorted: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            codes: Vec::new(),
            output: None,
            recursive: false,
            copy: false,
            force: false,
            fuzzy: true,
            prompt_missing: false,
            quit_on_error: false,
            last_sorted: None,
        }
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .context("Could not find home directory")?;
        Ok(home.join(CONFIG_FILE))
    }

    fn backup_path(config_path: &Path) -> PathBuf {
        config_path.with_extension("json.backup")
    }

    /// Load config from the home directory, or defaults if there is none
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            tracing::debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }

        let data = fs::read_to_string(config_path)
            .context("Failed to read config file")?;

        match serde_json::from_str(&data) {
            Ok(config) => Ok(config),
            Err(e) => {
                // Config is corrupted, try backup
                tracing::warn!("Config {} is corrupted ({}), trying backup", config_path.display(), e);
                match Self::load_backup(config_path) {
                    Ok(backup) => {
                        eprintln!("{} Config restored from backup", "✅".green());
                        Ok(backup)
                    }
                    Err(_) => Err(e).context("Failed to parse config file"),
                }
            }
        }
    }

    fn load_backup(config_path: &Path) -> Result<Self> {
        let backup_path = Self::backup_path(config_path);
        if !backup_path.exists() {
            anyhow::bail!("No backup file found");
        }
        let data = fs::read_to_string(&backup_path)
            .context("Failed to read backup file")?;
        serde_json::from_str(&data).context("Failed to parse backup file")
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save config with a backup of the previous file
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if config_path.exists() {
            fs::copy(config_path, Self::backup_path(config_path))
                .context("Failed to create backup")?;
        }

        // Write to temp file first
        let temp_path = config_path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(self)
            .context("Failed to serialize config")?;
        fs::write(&temp_path, &data)
            .context("Failed to write temp config")?;

        // Atomically rename temp file to final location
        fs::rename(&temp_path, config_path)
            .context("Failed to finalize config")?;

        Ok(())
    }

    /// Record a completed sort run
    pub fn mark_sorted(&mut self) {
        self.last_sorted = Some(Utc::now().to_rfc3339());
    }

    /// Interactive setup used by `paperctl init`
    pub fn run_wizard(current: &Config) -> Result<Self> {
        let theme = ColorfulTheme::default();

        println!("{}", "=".repeat(60).color(colors::HEADER));
        println!("{}", "   📚 PAPERCTL - SETUP   ".bold());
        println!("{}", "=".repeat(60).color(colors::HEADER));
        println!();

        // 1. Code registry
        println!("{}", "1. SYLLABUS CODES".bold());
        println!("CSV files listing board, level, subject, detailed subject, master code and codes");
        let mut codes = Vec::new();
        loop {
            let prompt = if codes.is_empty() { "Codes file" } else { "Another codes file (empty to finish)" };
            let path: String = Input::with_theme(&theme)
                .with_prompt(prompt)
                .allow_empty(!codes.is_empty())
                .interact_text()?;

            if path.trim().is_empty() {
                break;
            }

            let path = PathBuf::from(path.trim());
            if path.is_file() {
                codes.push(path);
            } else {
                println!("{} File does not exist, skipping", "⚠️".yellow());
            }
        }

        println!();

        // 2. Output folder
        println!("{}", "2. OUTPUT FOLDER".bold());
        let default_output = current
            .output
            .clone()
            .or_else(|| dirs::document_dir().map(|d| d.join("Past Papers")))
            .unwrap_or_else(|| PathBuf::from("Past Papers"));
        let output: String = Input::with_theme(&theme)
            .with_prompt("Sorted papers go to")
            .default(default_output.display().to_string())
            .interact_text()?;

        println!();

        // 3. Behaviour
        println!("{}", "3. SORTING".bold());
        let recursive = Confirm::with_theme(&theme)
            .with_prompt("Search folders recursively?")
            .default(current.recursive)
            .interact()?;
        let copy = Confirm::with_theme(&theme)
            .with_prompt("Copy files instead of moving them?")
            .default(current.copy)
            .interact()?;
        let fuzzy = Confirm::with_theme(&theme)
            .with_prompt("Guess details from names that follow no known pattern?")
            .default(current.fuzzy)
            .interact()?;
        let prompt_missing = Confirm::with_theme(&theme)
            .with_prompt("Ask for details that cannot be guessed?")
            .default(current.prompt_missing)
            .interact()?;

        Ok(Config {
            codes,
            output: Some(PathBuf::from(output)),
            recursive,
            copy,
            fuzzy,
            prompt_missing,
            ..current.clone()
        })
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("{}", "🔧 CURRENT CONFIGURATION".bold().color(colors::HEADER));
        println!();

        println!("{} Codes files ({}):", "•".cyan(), self.codes.len());
        for path in &self.codes {
            println!("  - {}", path.display().to_string().color(colors::PATH));
        }

        println!("{} Output: {}", "•".cyan(), match &self.output {
            Some(output) => output.display().to_string().color(colors::PATH),
            None => "not set".dimmed(),
        });

        let flag = |on: bool| if on { "Enabled" } else { "Disabled" };
        println!("{} Recursive: {}", "•".cyan(), flag(self.recursive));
        println!("{} Copy instead of move: {}", "•".cyan(), flag(self.copy));
        println!("{} Overwrite existing: {}", "•".cyan(), flag(self.force));
        println!("{} Guess unstructured names: {}", "•".cyan(), flag(self.fuzzy));
        println!("{} Ask for missing details: {}", "•".cyan(), flag(self.prompt_missing));
        println!("{} Stop at first error: {}", "•".cyan(), flag(self.quit_on_error));

        if let Some(last) = &self.last_sorted {
            let shown = last
                .parse::<DateTime<Utc>>()
                .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|_| last.clone());
            println!("{} Last sort: {}", "•".cyan(), shown);
        }
    }
}
