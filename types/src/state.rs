//! Domain enums shared across the reputation core.

use serde::{Deserialize, Serialize};

/// What kind of content or service a paid call delivered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    Chat,
    Audio,
    Video,
    Image,
    Data,
    Compute,
    Other,
}

/// Direction of a peer vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteType {
    /// Positive experience.
    Upvote,
    /// Negative experience.
    Downvote,
}

impl VoteType {
    pub fn is_positive(&self) -> bool {
        matches!(self, Self::Upvote)
    }
}

/// The four quality sub-scores attached to a peer vote, each 0–100.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityScores {
    /// How good was the output?
    pub response_quality: u8,
    /// How fast was the response?
    pub response_speed: u8,
    /// Was the output accurate?
    pub accuracy: u8,
    /// Professional behavior?
    pub professionalism: u8,
}

impl QualityScores {
    /// Whether every sub-score is within the 0–100 range.
    pub fn is_valid(&self) -> bool {
        self.response_quality <= 100
            && self.response_speed <= 100
            && self.accuracy <= 100
            && self.professionalism <= 100
    }

    /// Plain average of the four sub-scores.
    pub fn average(&self) -> u8 {
        ((self.response_quality as u16
            + self.response_speed as u16
            + self.accuracy as u16
            + self.professionalism as u16)
            / 4) as u8
    }
}

/// Direction of a subject's score movement since the previous calculation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trend {
    Rising,
    Falling,
    Stable,
}

/// Discrete trust level assigned to an endpoint.
///
/// Each tier is gated by minimum call volume and success rate; the top two
/// additionally require a minimum reputation for the owning agent.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum VerificationTier {
    Unverified,
    Tested,
    Verified,
    Trusted,
    Certified,
}

impl VerificationTier {
    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unverified => "unverified",
            Self::Tested => "tested",
            Self::Verified => "verified",
            Self::Trusted => "trusted",
            Self::Certified => "certified",
        }
    }
}
