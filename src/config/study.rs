//! Study procedure configuration

use serde::Deserialize;

use crate::application::StudySettings;

use super::error::ValidationError;

/// Knobs for the experiment procedure.
///
/// Defaults reproduce the original study: a 3-minute task, two generated
/// follow-up questions, the last 3 samples analyzed, and a 6-entry task
/// context window.
#[derive(Debug, Clone, Deserialize)]
pub struct StudyConfig {
    /// Task conversation time limit in seconds
    #[serde(default = "default_task_duration")]
    pub task_duration_secs: u64,

    /// Model-generated follow-up questions during style collection
    #[serde(default = "default_follow_up_cap")]
    pub follow_up_cap: u8,

    /// Most recent samples fed to the style extractor
    #[serde(default = "default_sample_window")]
    pub style_sample_window: usize,

    /// Transcript entries sent as task context
    #[serde(default = "default_context_window")]
    pub task_context_window: usize,

    /// Pause after the termination notice in seconds
    #[serde(default = "default_termination_pause")]
    pub termination_pause_secs: u64,
}

impl StudyConfig {
    /// Validate study configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.task_duration_secs == 0 {
            return Err(ValidationError::InvalidTaskDuration);
        }
        if self.style_sample_window == 0 || self.task_context_window == 0 {
            return Err(ValidationError::InvalidWindow);
        }
        Ok(())
    }
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            task_duration_secs: default_task_duration(),
            follow_up_cap: default_follow_up_cap(),
            style_sample_window: default_sample_window(),
            task_context_window: default_context_window(),
            termination_pause_secs: default_termination_pause(),
        }
    }
}

impl From<&StudyConfig> for StudySettings {
    fn from(config: &StudyConfig) -> Self {
        Self {
            task_duration_secs: config.task_duration_secs,
            follow_up_cap: config.follow_up_cap,
            style_sample_window: config.style_sample_window,
            task_context_window: config.task_context_window,
            termination_pause_secs: config.termination_pause_secs,
        }
    }
}

fn default_task_duration() -> u64 {
    180
}

fn default_follow_up_cap() -> u8 {
    2
}

fn default_sample_window() -> usize {
    3
}

fn default_context_window() -> usize {
    6
}

fn default_termination_pause() -> u64 {
    5
}
