use std::{fmt::Display, ops::RangeInclusive};

use getset::CopyGetters;
use log::{info, trace, warn};

use crate::{
    collector::Collector,
    fetcher::PageSource,
    parser::{self, RecommendationHeuristic},
};

/// How every checked ID of a scan turned out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct ScanSummary {
    checked: u64,
    saved: u64,
    not_found: u64,
    malformed: u64,
    failed: u64,
}

impl Display for ScanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "checked {} IDs: {} saved, {} not found, {} malformed, {} failed",
            self.checked, self.saved, self.not_found, self.malformed, self.failed
        )
    }
}

/// Checks every ID in `ids` one after another and adds each page that
/// parses to `collector`.
///
/// Failures only skip the ID they belong to.
pub async fn scan<S: PageSource>(
    source: &S,
    ids: RangeInclusive<u32>,
    heuristic: &RecommendationHeuristic,
    collector: &mut Collector,
    progress_interval: u32,
) -> ScanSummary {
    let total = id_count(&ids);
    let mut summary = ScanSummary::default();
    for id in ids {
        summary.checked += 1;
        match source.fetch(id.into()).await {
            Ok(None) => {
                trace!("No page for ID {id}");
                summary.not_found += 1;
            }
            Ok(Some(page)) => match parser::parse(page.html(), page.link(), heuristic) {
                Ok(record) => {
                    trace!("Found {record}");
                    collector.add(record);
                    summary.saved += 1;
                }
                Err(e) => {
                    warn!("Skipping malformed page {}: {e}", page.link());
                    summary.malformed += 1;
                }
            },
            Err(e) => {
                warn!("Skipping ID {id}: {e:#}");
                summary.failed += 1;
            }
        }
        if progress_interval > 0
            && (summary.checked % u64::from(progress_interval) == 0 || summary.checked == total)
        {
            info!(
                "Checked {}/{total} IDs ({:.1}%), {} pages saved",
                summary.checked,
                summary.checked as f64 * 100. / total as f64,
                collector.count(),
            );
        }
    }
    summary
}

/// Number of IDs in `ids`; the full `u32` range does not fit in a `u32`.
fn id_count(ids: &RangeInclusive<u32>) -> u64 {
    if ids.is_empty() {
        0
    } else {
        u64::from(ids.end() - ids.start()) + 1
    }
}
