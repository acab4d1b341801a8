use std::sync::LazyLock;

use regex::Regex;

// "92% of the 1,234 user reviews for this game are positive."
static REVIEW_TOOLTIP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)%.*?(\d+(?:,\d+)*)").expect("review tooltip regex is valid")
});

/// Review data extracted for a single game title.
///
/// Each nested `Option` is one stage of the extraction chain: there is no
/// `Listing` unless the search returned a result, and no `ReviewSummary`
/// unless that listing page carried a positive review summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameReview {
    pub query: String,
    pub listing: Option<Listing>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub canonical_url: Option<String>,
    pub reviews: Option<ReviewSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewSummary {
    pub rating_percent: u8,
    pub review_count: u64,
}

impl GameReview {
    pub fn not_found(query: impl Into<String>) -> Self {
        GameReview {
            query: query.into(),
            listing: None,
        }
    }

    pub fn canonical_url(&self) -> Option<&str> {
        self.listing
            .as_ref()
            .and_then(|listing| listing.canonical_url.as_deref())
    }

    pub fn reviews(&self) -> Option<ReviewSummary> {
        self.listing.as_ref().and_then(|listing| listing.reviews)
    }

    pub fn rating_percent(&self) -> Option<u8> {
        self.reviews().map(|r| r.rating_percent)
    }

    pub fn review_count(&self) -> Option<u64> {
        self.reviews().map(|r| r.review_count)
    }
}

impl ReviewSummary {
    /// Pulls the rating and review count out of a summary tooltip.
    ///
    /// Only `,` is understood as a thousands separator. Both numbers are set
    /// together or the tooltip is rejected as a whole.
    pub fn from_tooltip(content: &str) -> Option<Self> {
        let captures = REVIEW_TOOLTIP_REGEX.captures(content)?;

        let rating_percent: u8 = captures.get(1)?.as_str().parse().ok()?;
        if rating_percent > 100 {
            return None;
        }

        let review_count: u64 = captures.get(2)?.as_str().replace(',', "").parse().ok()?;

        Some(ReviewSummary {
            rating_percent,
            review_count,
        })
    }
}

/// Result of crawling one query: the review plus a transport failure, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOutcome {
    pub review: GameReview,
    pub failure: Option<String>,
}

impl CrawlOutcome {
    pub fn success(review: GameReview) -> Self {
        CrawlOutcome {
            review,
            failure: None,
        }
    }

    pub fn failed(query: impl Into<String>, failure: impl Into<String>) -> Self {
        CrawlOutcome {
            review: GameReview::not_found(query),
            failure: Some(failure.into()),
        }
    }

    pub fn query(&self) -> &str {
        &self.review.query
    }
}
