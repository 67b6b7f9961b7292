use std::num::ParseIntError;

use getset::{CopyGetters, Getters};
use itertools::Itertools;
use log::debug;
use scraper::Html;
use url::Url;

use crate::record::{EventId, EventRecord, ResultFlag};

/// Recommendation blocks at least this many characters long are assumed to
/// carry real guidance, even if they mention "no recommendation" somewhere.
/// Tuned against the live page corpus.
pub const RECOMMENDATION_THRESHOLD: usize = 700;

const RECOMMENDATION_BLOCK: &str =
    r"(?s)Security Monitoring Recommendations\s*</h2>(.*)<!-- </content> -->";
// "no recommendation", "no additional recommendations", "No further recommendation", ...
const NO_RECOMMENDATION_HINT: &str = r"(?i)\bno\s+(?:\w+\s+)?recommendation";

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("No level-1 heading was found in the page.")]
    MissingHeading,
    #[error("No result flag was found in the heading {0:?}.")]
    MissingResultFlag(String),
    #[error("No event ID was found in the heading {0:?}.")]
    MissingEventId(String),
    #[error("The event ID {digits:?} could not be parsed: {source}")]
    InvalidEventId {
        digits: String,
        #[source]
        source: ParseIntError,
    },
    #[error("The heading {0:?} has no \": \" before the event name.")]
    MissingTitleSeparator(String),
}

/// The pieces encoded in a heading like `4656(S, F): A handle to an object was requested.`
#[derive(Debug, Getters, CopyGetters)]
pub struct Heading {
    #[getset(get = "pub")]
    title: String,
    #[getset(get = "pub")]
    result_flag: ResultFlag,
    #[getset(get_copy = "pub")]
    event_id: EventId,
}

#[derive(Debug, Getters, CopyGetters)]
pub struct Recommendation {
    #[getset(get = "pub")]
    text: String,
    #[getset(get_copy = "pub")]
    has_recommendation: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct RecommendationHeuristic {
    threshold: usize,
}
impl Default for RecommendationHeuristic {
    fn default() -> Self {
        Self::new(RECOMMENDATION_THRESHOLD)
    }
}

impl RecommendationHeuristic {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Decides whether a recommendation block contains actual guidance.
    ///
    /// Short blocks that say "no (additional) recommendation" are boilerplate.
    /// Long blocks are never checked for the phrase.
    pub fn has_recommendation(&self, block: &str) -> bool {
        block.chars().count() >= self.threshold || !regex!(NO_RECOMMENDATION_HINT).is_match(block)
    }

    /// Extracts the recommendation block of a raw page.
    /// A page without the section yields empty text and `false`.
    pub fn extract(&self, html: &str) -> Recommendation {
        match find_recommendation_block(html) {
            Some(block) => Recommendation {
                text: block.to_owned(),
                has_recommendation: self.has_recommendation(block),
            },
            None => {
                debug!("The page has no recommendation section");
                Recommendation {
                    text: String::new(),
                    has_recommendation: false,
                }
            }
        }
    }
}

pub fn parse(
    html: &str,
    link: &Url,
    heuristic: &RecommendationHeuristic,
) -> Result<EventRecord, ParseError> {
    let document = Html::parse_document(html);
    let heading = parse_heading(&find_heading(&document)?)?;
    let recommendation = heuristic.extract(html);
    Ok(EventRecord::builder()
        .title(heading.title)
        .event_id(heading.event_id)
        .result_flag(heading.result_flag)
        .has_recommendation(recommendation.has_recommendation)
        .recommendation_text(recommendation.text)
        .link(link.clone())
        .build())
}

/// Returns the text of the first `h1`, with whitespace runs collapsed.
pub fn find_heading(document: &Html) -> Result<String, ParseError> {
    let h1 = document
        .select(selector!("h1"))
        .next()
        .ok_or(ParseError::MissingHeading)?;
    Ok(h1.text().collect::<String>().split_whitespace().join(" "))
}

pub fn parse_heading(heading: &str) -> Result<Heading, ParseError> {
    let result_flag = regex!(r"\(([^()]+)\):")
        .captures(heading)
        .and_then(|c| c.get(1))
        .ok_or_else(|| ParseError::MissingResultFlag(heading.to_owned()))?
        .as_str()
        .to_owned()
        .into();

    let digits = regex!(r"\d+")
        .find(heading)
        .ok_or_else(|| ParseError::MissingEventId(heading.to_owned()))?
        .as_str();
    let event_id = digits
        .parse::<u32>()
        .map_err(|source| ParseError::InvalidEventId {
            digits: digits.to_owned(),
            source,
        })?
        .into();

    let (_, title) = heading
        .split_once(": ")
        .ok_or_else(|| ParseError::MissingTitleSeparator(heading.to_owned()))?;

    Ok(Heading {
        title: title.to_owned(),
        result_flag,
        event_id,
    })
}

/// The raw text between the recommendations heading and the end-of-content marker.
pub fn find_recommendation_block(html: &str) -> Option<&str> {
    regex!(RECOMMENDATION_BLOCK)
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}
