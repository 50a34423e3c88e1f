use serde::Serialize;

use super::diagnostics::DiagnosedTrainset;
use super::domain::{BrandingPriority, CleaningStatus, Decision};
use super::scoring::{score, ScoredTrainset, ScoringWeights};

/// A filter value that either parsed or was not recognised.
///
/// Unrecognised values never match, so a typo yields an empty page rather
/// than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue<T> {
    Is(T),
    Unrecognized(String),
}

impl<T: PartialEq> FilterValue<T> {
    fn parse(raw: &str, parse: impl Fn(&str) -> Option<T>) -> Self {
        match parse(raw) {
            Some(value) => Self::Is(value),
            None => Self::Unrecognized(raw.to_string()),
        }
    }

    fn matches(&self, candidate: &T) -> bool {
        match self {
            Self::Is(expected) => expected == candidate,
            Self::Unrecognized(_) => false,
        }
    }
}

/// Post-score filters; every present filter must match (AND).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankFilters {
    pub decision: Option<FilterValue<Decision>>,
    pub branding_priority: Option<FilterValue<BrandingPriority>>,
    pub cleaning_status: Option<FilterValue<CleaningStatus>>,
    pub job_card_open: Option<FilterValue<bool>>,
    pub min_score: Option<FilterValue<i64>>,
}

impl RankFilters {
    /// Build filters from raw query strings; blank values mean "no filter".
    pub fn from_raw(
        decision: Option<&str>,
        branding_priority: Option<&str>,
        cleaning_status: Option<&str>,
        job_card_open: Option<&str>,
        min_score: Option<&str>,
    ) -> Self {
        fn present(raw: Option<&str>) -> Option<&str> {
            raw.filter(|value| !value.trim().is_empty())
        }

        Self {
            decision: present(decision).map(|raw| FilterValue::parse(raw, Decision::parse)),
            branding_priority: present(branding_priority)
                .map(|raw| FilterValue::parse(raw, BrandingPriority::parse)),
            cleaning_status: present(cleaning_status)
                .map(|raw| FilterValue::parse(raw, CleaningStatus::parse)),
            job_card_open: present(job_card_open).map(|raw| FilterValue::parse(raw, parse_flag)),
            min_score: present(min_score)
                .map(|raw| FilterValue::parse(raw, |value| value.trim().parse::<i64>().ok())),
        }
    }

    pub fn matches(&self, scored: &ScoredTrainset) -> bool {
        let snapshot = &scored.snapshot;

        self.decision
            .as_ref()
            .map_or(true, |filter| filter.matches(&snapshot.recommendation))
            && self
                .branding_priority
                .as_ref()
                .map_or(true, |filter| filter.matches(&snapshot.branding_priority))
            && self
                .cleaning_status
                .as_ref()
                .map_or(true, |filter| filter.matches(&snapshot.cleaning_status))
            && self
                .job_card_open
                .as_ref()
                .map_or(true, |filter| filter.matches(&snapshot.job_card_open))
            && self.min_score.as_ref().map_or(true, |filter| match filter {
                FilterValue::Is(minimum) => scored.score >= *minimum,
                FilterValue::Unrecognized(_) => false,
            })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub skip: usize,
    pub limit: usize,
}

impl PageRequest {
    pub fn new(skip: usize, limit: usize) -> Self {
        Self { skip, limit }
    }

    pub fn all() -> Self {
        Self {
            skip: 0,
            limit: usize::MAX,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedPage {
    pub page: Vec<ScoredTrainset>,
    pub total: usize,
}

/// Score every trainset and order by score, highest first.
///
/// The sort is stable, so equal scores keep their input order.
pub fn score_and_sort(
    diagnosed: Vec<DiagnosedTrainset>,
    weights: &ScoringWeights,
) -> Vec<ScoredTrainset> {
    let mut scored: Vec<ScoredTrainset> = diagnosed
        .into_iter()
        .map(|trainset| score(trainset, weights))
        .collect();
    scored.sort_by(|left, right| right.score.cmp(&left.score));
    scored
}

/// Score, sort, filter, then slice `[skip, skip + limit)`.
///
/// `total` counts every trainset that passed the filters, independent of paging.
pub fn rank(
    diagnosed: Vec<DiagnosedTrainset>,
    weights: &ScoringWeights,
    filters: &RankFilters,
    page: PageRequest,
) -> RankedPage {
    let filtered: Vec<ScoredTrainset> = score_and_sort(diagnosed, weights)
        .into_iter()
        .filter(|scored| filters.matches(scored))
        .collect();
    let total = filtered.len();

    let page = filtered
        .into_iter()
        .skip(page.skip)
        .take(page.limit)
        .collect();

    RankedPage { page, total }
}
