//! JSON file persistence for the check-in state
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use log::{info, warn};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use super::state::CheckInState;

/// Reads and atomically replaces the single state file
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
    prompt_interval: Duration,
}

impl StateStore {
    /// `prompt_interval` decides how far back a fresh state is anchored
    pub fn new(path: impl Into<PathBuf>, prompt_interval: Duration) -> Self {
        Self {
            path: path.into(),
            prompt_interval,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved state. A missing or unreadable file starts a fresh
    /// cycle whose first prompt is due immediately.
    pub async fn load(&self, now: DateTime<Utc>) -> CheckInState {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) => {
                warn!(
                    "Could not read state file {}, starting fresh: {e}",
                    self.path.display()
                );
                return CheckInState::fresh(now, self.prompt_interval);
            }
        };

        let mut state: CheckInState = match serde_json::from_str(&contents) {
            Ok(state) => state,
            Err(e) => {
                warn!(
                    "Could not parse state file {}, starting fresh: {e}",
                    self.path.display()
                );
                return CheckInState::fresh(now, self.prompt_interval);
            }
        };

        if state.repair() {
            warn!("State file had an outstanding prompt with no send time; clearing it");
        }

        info!("📂 Loaded check-in state from {}", self.path.display());
        state
    }

    /// Write the state to a sibling temp file, flush it to disk, then rename
    /// it over the target
    pub async fn save(&self, state: &CheckInState) -> Result<()> {
        let json = serde_json::to_string_pretty(state).context("failed to serialize state")?;
        let tmp = self.temp_path();

        let mut file = tokio::fs::File::create(&tmp)
            .await
            .with_context(|| format!("failed to create {}", tmp.display()))?;
        file.write_all(json.as_bytes())
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        file.sync_all()
            .await
            .with_context(|| format!("failed to flush {}", tmp.display()))?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("failed to replace {}", self.path.display()))?;

        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "state".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap()
    }

    fn store_in(dir: &tempfile::TempDir) -> StateStore {
        StateStore::new(dir.path().join("bot_state.json"), Duration::hours(72))
    }

    #[tokio::test]
    async fn test_save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let state = CheckInState {
            last_anchor_time: now() - Duration::hours(5),
            awaiting_reply: true,
            prompt_sent_time: Some(now() - Duration::hours(2)),
            escalated: false,
        };
        store.save(&state).await.unwrap();

        assert_eq!(store.load(now()).await, state);
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let first = CheckInState::fresh(now(), Duration::hours(72));
        store.save(&first).await.unwrap();

        let second = CheckInState {
            escalated: true,
            prompt_sent_time: Some(now()),
            ..first.clone()
        };
        store.save(&second).await.unwrap();

        assert_eq!(store.load(now()).await, second);
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn test_save_replaces_empty_file_and_leftover_temp() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "").unwrap();
        std::fs::write(store.temp_path(), "partial").unwrap();

        let state = CheckInState {
            last_anchor_time: now(),
            awaiting_reply: false,
            prompt_sent_time: Some(now() - Duration::hours(48)),
            escalated: true,
        };
        store.save(&state).await.unwrap();

        let on_disk = std::fs::read_to_string(store.path()).unwrap();
        let parsed: CheckInState = serde_json::from_str(&on_disk).unwrap();
        assert_eq!(parsed, state);
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn test_missing_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let state = store.load(now()).await;
        assert!(!state.awaiting_reply);
        assert!(!state.escalated);
        assert!(state.last_anchor_time <= now() - Duration::hours(72));
    }

    #[tokio::test]
    async fn test_corrupt_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "{ not json").unwrap();

        let state = store.load(now()).await;
        assert!(!state.awaiting_reply);
        assert!(!state.escalated);
        assert!(state.last_anchor_time <= now() - Duration::hours(72));
    }

    #[tokio::test]
    async fn test_load_repairs_prompt_without_send_time() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(
            store.path(),
            r#"{"last_anchor_time":"2024-06-01T00:00:00Z","awaiting_reply":true,"escalated":false}"#,
        )
        .unwrap();

        let state = store.load(now()).await;
        assert!(!state.awaiting_reply);
        assert_eq!(
            state.last_anchor_time,
            Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_save_fails_when_directory_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(
            dir.path().join("missing").join("bot_state.json"),
            Duration::hours(72),
        );

        let state = CheckInState::fresh(now(), Duration::hours(72));
        assert!(store.save(&state).await.is_err());
    }
}
