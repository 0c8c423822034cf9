//! Core domain model: candidates, risk, batches, checkpoints, reviews,
//! and campaign state. Pure data plus transition methods, no I/O here.

pub mod batch;
pub mod campaign;
pub mod candidate;
pub mod checkpoint;
pub mod error;
pub mod review;
pub mod risk;

pub use batch::{Batch, BatchResult, BatchStatus, FileOutcome};
pub use campaign::{CampaignState, CampaignStats, CampaignStatus};
pub use candidate::{FileCandidate, FileCategory};
pub use checkpoint::SafetyCheckpoint;
pub use error::{CampaignError, Result};
pub use review::{review_instructions, ManualReviewRequest, ReviewStatus};
pub use risk::{RiskAssessment, RiskTier};
