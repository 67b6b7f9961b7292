use std::fmt::Display;

use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;
use url::Url;

/// Numeric identifier of a Windows audit event.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Debug,
    derive_more::From,
    derive_more::Into,
    derive_more::Display,
    Serialize,
    Deserialize,
)]
pub struct EventId(u32);

/// Which audit outcomes a page applies to, as printed in its heading,
/// e.g. `S`, `F`, `S, F`, or `-`.
#[derive(
    Clone,
    PartialEq,
    Eq,
    Hash,
    Debug,
    derive_more::From,
    derive_more::Display,
    Serialize,
    Deserialize,
)]
pub struct ResultFlag(String);
impl ResultFlag {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One scraped event page.
///
/// Field order is the column order of the exported table.
#[derive(
    Clone,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Getters,
    CopyGetters,
    TypedBuilder,
    Serialize,
    Deserialize,
)]
pub struct EventRecord {
    #[serde(rename = "Event Name")]
    #[getset(get = "pub")]
    title: String,
    #[serde(rename = "Event ID")]
    #[getset(get_copy = "pub")]
    event_id: EventId,
    #[serde(rename = "Result")]
    #[getset(get = "pub")]
    result_flag: ResultFlag,
    #[serde(rename = "Has Recommendation")]
    #[getset(get_copy = "pub")]
    has_recommendation: bool,
    #[serde(rename = "Security Monitoring Recommendation")]
    #[getset(get = "pub")]
    recommendation_text: String,
    #[serde(rename = "URL")]
    #[getset(get = "pub")]
    link: Url,
}

impl EventRecord {
    /// Header row of the exported table; matches the serialized field names.
    pub const COLUMNS: [&'static str; 6] = [
        "Event Name",
        "Event ID",
        "Result",
        "Has Recommendation",
        "Security Monitoring Recommendation",
        "URL",
    ];
}

impl Display for EventRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Event \"{}\" with ID {} for result {} is on {}",
            self.title, self.event_id, self.result_flag, self.link
        )
    }
}
