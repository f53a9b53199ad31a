//! Reconstructs a match from an ordered demo event stream: the round
//! sequence with team/side attribution, per round economy types, clutch
//! situations and per player statistics.
//!
//! One [`MatchAnalyzer`] instance handles exactly one match. The usual entry
//! point is [`analyze_match`], which drives an event iterator through an
//! analyzer and returns the finished [`Match`].

pub mod analyzer;
pub mod clutch;
pub mod economy;
pub mod game;
mod roster;
pub mod rounds;
pub mod stats;

pub use analyzer::MatchAnalyzer;
pub use clutch::Clutch;
pub use economy::{EconomyType, PlayerEconomy, TeamEconomy};
pub use game::{Anomaly, Match, Round, Team, TeamLetter};
pub use rounds::{BombDefusal, BombExplosion, BombPlant, Damage, Kill, PlayerBuy};
pub use stats::Player;

/// Format oddities of a hosting platform. Derived from the source tag
/// unless the caller overrides them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SourceQuirks {
    /// The capture has no usable match start marker and gameplay is live
    /// from the first event on.
    pub assume_match_started: bool,
    /// The capture may contain a pre live knife round that has to be
    /// detected and thrown away. Detection is kill based, a knife round
    /// in which nobody died is kept.
    pub discard_knife_rounds: bool,
}

impl SourceQuirks {
    pub fn for_source(source: events::DemoSource) -> Self {
        match source {
            events::DemoSource::Ebot => SourceQuirks {
                assume_match_started: true,
                discard_knife_rounds: true,
            },
            _ => SourceQuirks {
                assume_match_started: false,
                discard_knife_rounds: false,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AnalyzeOptions {
    pub source: events::DemoSource,
    pub quirks: Option<SourceQuirks>,
}

impl AnalyzeOptions {
    pub fn for_source(source: events::DemoSource) -> Self {
        Self {
            source,
            quirks: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("the event stream is empty")]
    EmptyStream,
    #[error("no match start found, the capture may be truncated or from a different source")]
    NoMatchStart,
    #[error("demo source {0} is not supported")]
    UnsupportedSource(events::DemoSource),
}

/// Runs a full analysis over one complete event stream.
#[tracing::instrument(skip(events, options), fields(source = %options.source))]
pub fn analyze_match<I>(events: I, options: AnalyzeOptions) -> Result<Match, AnalyzeError>
where
    I: IntoIterator<Item = events::Event>,
{
    if !options.source.is_supported() {
        return Err(AnalyzeError::UnsupportedSource(options.source));
    }

    let mut analyzer = MatchAnalyzer::new(options);
    let mut seen_any = false;
    for event in events {
        seen_any = true;
        analyzer.ingest(event);
    }
    if !seen_any {
        return Err(AnalyzeError::EmptyStream);
    }

    analyzer.finish()
}
