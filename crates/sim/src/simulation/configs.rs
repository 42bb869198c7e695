//! Configuration files.
//!
//! A [`Configuration`] bundles everything a batch of repetitions needs and
//! can be read from YAML or JSON. Every field has a default, so a file only
//! has to name what it changes:
//!
//! ```yaml
//! execution:
//!   repetitions: 20
//!   seed: 7
//! parameters:
//!   release: 250
//!   end_time: 150
//! releases:
//!   wild_type: [400]
//!   drive: [71]
//!   antidote: [0]
//! ```

use crate::errors::ConfigError;
use crate::simulation::releases::LateTrigger;
use crate::simulation::ParameterSet;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The master configuration struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub execution: ExecutionConfig,
    pub parameters: ParameterSet,
    pub releases: ReleaseConfig,
}

/// How a batch of repetitions is run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Number of independent repetitions.
    pub repetitions: usize,
    /// Master RNG seed; a random one is drawn when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Report times in days. Every whole day when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_times: Option<Vec<f64>>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            repetitions: 100,
            seed: None,
            report_times: None,
        }
    }
}

/// Released individuals: the initial introductions and an optional late release.
///
/// `wild_type`, `drive` and `antidote` hold one count per introduction and
/// must have the same length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
    /// Wild-type adults per introduction, half female and half male.
    pub wild_type: Vec<usize>,
    /// Heterozygous drive males per introduction.
    pub drive: Vec<usize>,
    /// Antidote males per introduction.
    pub antidote: Vec<usize>,
    /// Released antidote males are homozygous (`WWAA`) instead of `WWAW`.
    pub hom_antidote: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub late: Option<LateReleaseConfig>,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            wild_type: vec![400, 400],
            drive: vec![71, 72],
            antidote: vec![0, 0],
            hom_antidote: false,
            late: None,
        }
    }
}

/// Adult males released repeatedly once a trigger fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LateReleaseConfig {
    pub trigger: LateTrigger,
    /// Number of releases, `-1` for every release day.
    pub max_repeats: i64,
    /// Antidote males per release.
    pub antidote: usize,
    /// Wild-type males per release.
    pub wild_type: usize,
}

impl Default for LateReleaseConfig {
    fn default() -> Self {
        Self {
            trigger: LateTrigger::default(),
            max_repeats: -1,
            antidote: 0,
            wild_type: 0,
        }
    }
}

impl Configuration {
    /// Load from a `.yaml`/`.yml` or `.json` file and validate.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&text)?,
            _ => serde_yaml::from_str(&text)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Write as YAML or JSON, chosen by the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let text = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)?,
            _ => self.to_yaml()?,
        };
        std::fs::write(path, text)?;
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.parameters.validate()?;
        self.releases.validate()?;
        if let Some(times) = &self.execution.report_times {
            if let Some(t) = times.iter().find(|t| !t.is_finite()) {
                return Err(ConfigError::InvalidParameter(format!(
                    "report time {t} is not a number"
                )));
            }
        }
        Ok(())
    }
}
