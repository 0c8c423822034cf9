//! Digest-verified on-disk state: campaign, plan, and review artifacts.
//!
//! Each artifact is a pretty-JSON file with a SHA-256 hex sidecar
//! (`<name>.json` + `<name>.digest`). Reads verify the sidecar before
//! deserialising, so `review` and `status` invocations detect a corrupted
//! or hand-edited artifact instead of trusting it.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::domain::{CampaignError, CampaignState, Result};
use crate::planner::ProcessingPlan;
use crate::review::ManualReviewQueue;

/// Directory under the workspace root holding campaign state.
pub const STATE_DIR: &str = ".sweepgate";

fn digest_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Artifact store rooted at one state directory.
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store at the conventional `<workspace>/.sweepgate` location.
    pub fn at_workspace(workspace: &Path) -> Self {
        Self::new(workspace.join(STATE_DIR))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether a campaign artifact has been persisted.
    pub fn has_campaign(&self) -> bool {
        self.dir.join("campaign.json").exists()
    }

    pub fn save_campaign(&self, state: &CampaignState) -> Result<PathBuf> {
        self.write_artifact("campaign", state)
    }

    pub fn load_campaign(&self) -> Result<CampaignState> {
        self.read_artifact("campaign")
    }

    pub fn save_reviews(&self, queue: &ManualReviewQueue) -> Result<PathBuf> {
        self.write_artifact("reviews", queue)
    }

    /// Load the review queue, or an empty one when none was persisted yet.
    pub fn load_reviews(&self) -> Result<ManualReviewQueue> {
        if !self.dir.join("reviews.json").exists() {
            return Ok(ManualReviewQueue::new());
        }
        self.read_artifact("reviews")
    }

    pub fn save_plan(&self, plan: &ProcessingPlan) -> Result<PathBuf> {
        self.write_artifact("plan", plan)
    }

    pub fn load_plan(&self) -> Result<ProcessingPlan> {
        self.read_artifact("plan")
    }

    fn write_artifact<T: Serialize>(&self, name: &str, value: &T) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let artifact_path = self.dir.join(format!("{name}.json"));
        let digest_path = self.dir.join(format!("{name}.digest"));
        let json = serde_json::to_vec_pretty(value)?;
        let digest = digest_hex(&json);

        std::fs::write(&artifact_path, &json)?;
        std::fs::write(&digest_path, digest.as_bytes())?;
        tracing::debug!(artifact = %artifact_path.display(), "artifact written");
        Ok(artifact_path)
    }

    fn read_artifact<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let artifact_path = self.dir.join(format!("{name}.json"));
        let digest_path = self.dir.join(format!("{name}.digest"));
        let json = std::fs::read(&artifact_path)?;
        let expected = std::fs::read_to_string(&digest_path)?.trim().to_string();
        let actual = digest_hex(&json);
        if expected != actual {
            return Err(CampaignError::DigestMismatch { expected, actual });
        }
        Ok(serde_json::from_slice(&json)?)
    }
}
