//! Series and season labels for video files.
//!
//! Video files are expected to be named like `Show Name S01E02`: every token
//! but the last is the series name, and the last token carries the season.
//! How the season is cut out of that token is pluggable through
//! [`SeasonStrategy`].

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use thiserror::Error;

static REGEX_EPISODE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(s\d+)e\d+").expect("Invalid regex"));

/// Why a stem could not be turned into a series folder name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeriesError {
    #[error("file name has no tokens to derive a season from")]
    EmptyStem,
    #[error("file name '{0}' has no series name before the season token")]
    NoSeriesName(String),
}

/// Series name and season label derived from a normalized stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesLabel {
    pub series: String,
    pub season: String,
}

impl SeriesLabel {
    /// `"<series> <season>"`, the name the episode's folder should carry.
    pub fn folder_name(&self) -> String {
        format!("{} {}", self.series, self.season)
    }
}

/// Extracts the season label from the last token of a stem.
pub trait SeasonStrategy {
    fn season(&self, token: &str) -> String;
}

/// The first three characters of the token, e.g. `S01E02` -> `S01`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixSeason;

impl SeasonStrategy for PrefixSeason {
    fn season(&self, token: &str) -> String {
        token.chars().take(3).collect()
    }
}

/// The `S<n>` part of an `S<n>E<m>` token, so `S101E01` yields `S101`.
/// Tokens that do not look like an episode fall back to [`PrefixSeason`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EpisodePattern;

impl SeasonStrategy for EpisodePattern {
    fn season(&self, token: &str) -> String {
        match REGEX_EPISODE_TOKEN.captures(token) {
            Some(caps) => caps[1].to_string(),
            None => PrefixSeason.season(token),
        }
    }
}

/// Strategy names accepted in configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonStrategyKind {
    #[default]
    Prefix,
    Pattern,
}

impl SeasonStrategyKind {
    pub fn build(self) -> Box<dyn SeasonStrategy> {
        match self {
            SeasonStrategyKind::Prefix => Box::new(PrefixSeason),
            SeasonStrategyKind::Pattern => Box::new(EpisodePattern),
        }
    }
}

/// Splits a normalized stem into series name and season label.
pub fn series_label(stem: &str, strategy: &dyn SeasonStrategy) -> Result<SeriesLabel, SeriesError> {
    let tokens: Vec<&str> = stem.split(' ').filter(|t| !t.is_empty()).collect();

    let Some((last, series)) = tokens.split_last() else {
        return Err(SeriesError::EmptyStem);
    };

    if series.is_empty() {
        return Err(SeriesError::NoSeriesName(stem.to_string()));
    }

    Ok(SeriesLabel {
        series: series.join(" "),
        season: strategy.season(last),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_season() {
        let label = series_label("Show Name S01E02", &PrefixSeason).unwrap();
        assert_eq!(label.series, "Show Name");
        assert_eq!(label.season, "S01");
        assert_eq!(label.folder_name(), "Show Name S01");
    }

    #[test]
    fn test_prefix_season_short_token() {
        let label = series_label("Clip E1", &PrefixSeason).unwrap();
        assert_eq!(label.season, "E1");
        assert_eq!(label.folder_name(), "Clip E1");
    }

    #[test]
    fn test_prefix_season_multibyte() {
        let label = series_label("Série Été2024", &PrefixSeason).unwrap();
        assert_eq!(label.season, "Été");
    }

    #[test]
    fn test_episode_pattern() {
        assert_eq!(EpisodePattern.season("S101E01"), "S101");
        assert_eq!(EpisodePattern.season("s02e10"), "s02");
        assert_eq!(EpisodePattern.season("1080p"), "108");
    }

    #[test]
    fn test_empty_stem() {
        assert_eq!(series_label("", &PrefixSeason), Err(SeriesError::EmptyStem));
        assert_eq!(series_label("   ", &PrefixSeason), Err(SeriesError::EmptyStem));
    }

    #[test]
    fn test_single_token_has_no_series() {
        assert_eq!(
            series_label("S01E01", &PrefixSeason),
            Err(SeriesError::NoSeriesName("S01E01".to_string()))
        );
    }

    #[test]
    fn test_strategy_kind_from_config() {
        #[derive(Deserialize)]
        struct Wrapper {
            kind: SeasonStrategyKind,
        }
        let parsed: Wrapper = toml::from_str("kind = \"pattern\"").unwrap();
        assert_eq!(parsed.kind, SeasonStrategyKind::Pattern);
        assert_eq!(parsed.kind.build().season("S12E01"), "S12");
    }
}
