use std::{fmt::Debug, ops::RangeInclusive, path::PathBuf};

use anyhow::{bail, Context};
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str =
    "https://docs.microsoft.com/en-us/windows/security/threat-protection/auditing";

/// Everything a scan can be told from outside.
///
/// Every field falls back to its default when missing from the config file.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    pub start_id: u32,
    pub end_id: u32,
    pub output_path: PathBuf,
    pub base_url: String,
    pub recommendation_threshold: usize,
    /// Skips certificate validation when downloading pages (never when probing).
    pub accept_invalid_certs: bool,
    /// Number of checked IDs between progress lines; 0 turns them off.
    pub progress_interval: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            start_id: 1000,
            end_id: 6424,
            output_path: "windows-security-events.xlsx".into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            recommendation_threshold: crate::parser::RECOMMENDATION_THRESHOLD,
            accept_invalid_certs: false,
            progress_interval: 100,
        }
    }
}

impl ScanConfig {
    pub fn load<P: Into<PathBuf> + Debug>(path: P) -> anyhow::Result<Self> {
        let path = path.into();
        (|| toml::from_str(&fs_err::read_to_string(&path)?).map_err(anyhow::Error::new))()
            .with_context(|| format!("While trying to load the scan config from {path:?}"))
    }

    pub fn id_range(&self) -> anyhow::Result<RangeInclusive<u32>> {
        if self.start_id > self.end_id {
            bail!(
                "The first ID {} is greater than the last ID {}",
                self.start_id,
                self.end_id
            );
        }
        Ok(self.start_id..=self.end_id)
    }
}
