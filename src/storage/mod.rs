//! Persistence layer.
//!
//! Per-user settings, conversation history, and saved squads live as
//! JSON files under the data directory. Conversation messages gain a
//! timestamp on save when they don't already carry one.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, info};

use crate::rules::RulesIndex;
use crate::types::{Squad, StoredMessage, UserSettings};

/// Filename for the exported rulebook snapshot.
const RULES_FILE: &str = "fpl_rules.json";

#[derive(Debug, Clone)]
pub struct UserStore {
    data_dir: PathBuf,
}

impl UserStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        UserStore { data_dir: data_dir.into() }
    }

    fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("Failed to create data dir {}", self.data_dir.display()))
    }

    fn settings_path(&self, username: &str) -> PathBuf {
        self.data_dir.join(format!("user_{username}_settings.json"))
    }

    fn conversation_path(&self, username: &str) -> PathBuf {
        self.data_dir.join(format!("user_{username}_conversation.json"))
    }

    fn squad_path(&self, username: &str) -> PathBuf {
        self.data_dir.join(format!("user_{username}_squad.json"))
    }

    // -- Settings ---------------------------------------------------------

    pub fn save_settings(&self, settings: &UserSettings) -> Result<()> {
        self.ensure_dir()?;
        let path = self.settings_path(&settings.username);
        write_json(&path, settings)?;
        debug!(username = %settings.username, "settings saved");
        Ok(())
    }

    /// Returns None when the user has no stored settings.
    pub fn load_settings(&self, username: &str) -> Result<Option<UserSettings>> {
        read_json(&self.settings_path(username))
    }

    // -- Conversation history ---------------------------------------------

    /// Persist a conversation, stamping any message that arrives
    /// without a timestamp.
    pub fn save_conversation(&self, username: &str, history: &[StoredMessage]) -> Result<()> {
        self.ensure_dir()?;
        let stamped: Vec<StoredMessage> = history
            .iter()
            .map(|msg| {
                let mut msg = msg.clone();
                if msg.timestamp.is_none() {
                    msg.timestamp = Some(Utc::now());
                }
                msg
            })
            .collect();

        let path = self.conversation_path(username);
        write_json(&path, &stamped)?;
        debug!(username, messages = stamped.len(), "conversation saved");
        Ok(())
    }

    /// Returns an empty history when the user has none on disk.
    pub fn load_conversation(&self, username: &str) -> Result<Vec<StoredMessage>> {
        Ok(read_json(&self.conversation_path(username))?.unwrap_or_default())
    }

    // -- Squads -----------------------------------------------------------

    pub fn save_squad(&self, username: &str, squad: &Squad) -> Result<()> {
        self.ensure_dir()?;
        let path = self.squad_path(username);
        write_json(&path, squad)?;
        debug!(username, players = squad.player_ids.len(), "squad saved");
        Ok(())
    }

    pub fn load_squad(&self, username: &str) -> Result<Option<Squad>> {
        read_json(&self.squad_path(username))
    }

    // -- Rulebook export --------------------------------------------------

    /// Write the embedded rulebook to the data directory so other
    /// tooling can read it without running the server.
    pub fn export_rules(&self, rules: &RulesIndex) -> Result<PathBuf> {
        self.ensure_dir()?;
        let path = self.data_dir.join(RULES_FILE);
        write_json(&path, &rules.as_json())?;
        info!(path = %path.display(), "rulebook exported");
        Ok(path)
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialise {}", path.display()))?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

/// Read and parse a JSON file, None when it does not exist.
fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(value))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
