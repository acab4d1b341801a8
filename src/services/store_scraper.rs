use std::sync::LazyLock;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

use crate::domain::{
    game_review::{GameReview, Listing, ReviewSummary},
    store_url::canonical_store_url,
};

const SEARCH_TERM_PARAM: &str = "term";
const REVIEW_TOOLTIP_ATTR: &str = "data-tooltip-html";

static SEARCH_RESULTS_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div#search_resultsRows").expect("valid selector"));
static A_TAG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("valid selector"));
static POSITIVE_REVIEW_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("span.search_review_summary.positive").expect("valid selector")
});

/// Transport used to download a search page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> anyhow::Result<String>;
}

pub struct StoreClient {
    client: Client,
}

impl StoreClient {
    pub fn new(user_agent: Option<&str>) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(user_agent) = user_agent {
            builder = builder.user_agent(user_agent.to_string());
        }
        let client = builder.build().context("Failed to build http client")?;

        Ok(StoreClient { client })
    }
}

#[async_trait]
impl PageFetcher for StoreClient {
    async fn fetch(&self, url: &Url) -> anyhow::Result<String> {
        let res = self.client.get(url.clone()).send().await?;

        let status = res.status();
        if !status.is_success() {
            log::warn!("Search page {} answered with status {}", url, status);
        }

        Ok(res.text().await?)
    }
}

pub struct StoreScraper<F> {
    fetcher: F,
    search_url: Url,
}

impl<F: PageFetcher> StoreScraper<F> {
    pub fn new(fetcher: F, search_url: &str) -> anyhow::Result<Self> {
        let search_url = Url::parse(search_url)
            .with_context(|| format!("Invalid search url: {}", search_url))?;

        Ok(StoreScraper {
            fetcher,
            search_url,
        })
    }

    pub fn build_search_url(&self, query: &str) -> Url {
        let mut url = self.search_url.clone();
        url.query_pairs_mut().append_pair(SEARCH_TERM_PARAM, query);
        url
    }

    /// Runs one search for `query` and extracts whatever review data the page has.
    ///
    /// Only the fetch can fail. Missing page elements give a partially filled review.
    pub async fn extract_game_review(&self, query: &str) -> anyhow::Result<GameReview> {
        let url = self.build_search_url(query);

        let html_content = self
            .fetcher
            .fetch(&url)
            .await
            .with_context(|| format!("Failed to fetch search page for query: {}", query))?;

        Ok(parse_store_search_page(&url, query, &html_content))
    }
}

pub fn parse_store_search_page(search_url: &Url, query: &str, html_content: &str) -> GameReview {
    let html_document = Html::parse_document(html_content);

    let Some(search_results) = html_document.select(&SEARCH_RESULTS_SELECTOR).next() else {
        log::debug!("Found no search results on query: {}", query);
        return GameReview::not_found(query);
    };

    let Some(href) = search_results
        .select(&A_TAG_SELECTOR)
        .next()
        .and_then(|a_tag| a_tag.value().attr("href"))
    else {
        log::debug!("First search result has no link on query: {}", query);
        return GameReview::not_found(query);
    };

    let canonical_url = canonical_store_url(search_url, href);
    if canonical_url.is_none() {
        log::debug!("Could not normalize result url {} on query: {}", href, query);
    }

    let reviews = html_document
        .select(&POSITIVE_REVIEW_SELECTOR)
        .next()
        .and_then(|summary| summary.value().attr(REVIEW_TOOLTIP_ATTR))
        .and_then(ReviewSummary::from_tooltip);

    if reviews.is_none() {
        log::debug!("Found no positive review summary on query: {}", query);
    }

    GameReview {
        query: query.to_string(),
        listing: Some(Listing {
            canonical_url,
            reviews,
        }),
    }
}
