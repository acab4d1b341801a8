use std::{path::PathBuf, sync::Arc};

use chrono::Local;

use crate::{
    configuration::{InputSettings, Settings},
    dal::{game_list::load_game_list, result_table::write_result_table},
    services::{
        crawl_game_reviews, BatchOptions, LogProgress, PageFetcher, Progress, StoreClient,
        StoreScraper,
    },
};

pub async fn run(settings: Settings) -> anyhow::Result<PathBuf> {
    let store_client = StoreClient::new(settings.crawler.user_agent.as_deref())?;
    let mut progress = LogProgress::new("Crawl progress");

    run_with_fetcher(settings, store_client, &mut progress).await
}

/// Loads the queries, crawls them and writes the result table.
pub async fn run_with_fetcher<F>(
    settings: Settings,
    fetcher: F,
    progress: &mut dyn Progress,
) -> anyhow::Result<PathBuf>
where
    F: PageFetcher + 'static,
{
    let queries = resolve_queries(&settings.input)?;
    let scraper = Arc::new(StoreScraper::new(fetcher, &settings.crawler.search_url)?);

    let options = BatchOptions {
        concurrency: settings.crawler.concurrency,
        failure_policy: settings.crawler.failure_policy,
    };
    let outcomes = crawl_game_reviews(scraper, queries, options, progress).await?;

    write_result_table(
        &outcomes,
        &settings.output.directory,
        settings.output.format,
        &Local::now(),
    )
}

/// The game list file wins over the literal query list when both are set.
pub fn resolve_queries(input: &InputSettings) -> anyhow::Result<Vec<String>> {
    match input.game_list_path {
        Some(ref game_list_path) => load_game_list(game_list_path),
        None => Ok(input.queries.clone()),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use async_trait::async_trait;
    use url::Url;

    use super::*;
    use crate::{
        configuration::{configuration_from_yaml, FailurePolicy},
        services::NullProgress,
    };

    struct FakeStore;

    #[async_trait]
    impl PageFetcher for FakeStore {
        async fn fetch(&self, url: &Url) -> anyhow::Result<String> {
            let term = url
                .query_pairs()
                .find(|(k, _)| k == "term")
                .map(|(_, v)| v.into_owned())
                .unwrap_or_default();

            match term.as_str() {
                "Grim Dawn" => Ok(r#"<div id="search_resultsRows">
                        <a href="/app/219990/Grim_Dawn/?snr=1_7_7_151_150_1">
                            <span class="search_review_summary positive"
                                data-tooltip-html="Very Positive&lt;br&gt;92% of the 1,234 user reviews for this game are positive."></span>
                        </a>
                    </div>"#
                    .to_string()),
                "Offline" => anyhow::bail!("dns error"),
                _ => Ok("<p>No results</p>".to_string()),
            }
        }
    }

    fn settings(output_directory: &std::path::Path, extra_input: &str) -> Settings {
        let yaml = format!(
            r#"
crawler:
  search_url: "https://store.steampowered.com/search/"
  concurrency: 2
input:
{}
output:
  directory: "{}"
"#,
            extra_input,
            output_directory.display()
        );
        configuration_from_yaml(&yaml).unwrap()
    }

    #[test]
    fn literal_queries_are_used_without_game_list() {
        let input = InputSettings {
            game_list_path: None,
            queries: vec!["Grim Dawn".to_string(), "Venba".to_string()],
        };

        assert_eq!(resolve_queries(&input).unwrap(), vec!["Grim Dawn", "Venba"]);
    }

    #[test]
    fn game_list_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        let game_list_path = dir.path().join("game_list.txt");
        fs::write(&game_list_path, "Hades\n\nCeleste\n").unwrap();

        let input = InputSettings {
            game_list_path: Some(game_list_path),
            queries: vec!["Grim Dawn".to_string()],
        };

        assert_eq!(resolve_queries(&input).unwrap(), vec!["Hades", "Celeste"]);
    }

    #[tokio::test]
    async fn crawl_writes_one_row_per_query() {
        let dir = tempfile::tempdir().unwrap();
        let output_directory = dir.path().join("output");
        let settings = settings(
            &output_directory,
            "  queries: [\"Grim Dawn\", \"Offline\", \"Venba\"]",
        );

        let path = run_with_fetcher(settings, FakeStore, &mut NullProgress)
            .await
            .unwrap();

        assert!(path.starts_with(&output_directory));
        let file_name = path.file_name().unwrap().to_str().unwrap();
        assert!(file_name.starts_with("result_"));
        assert!(file_name.ends_with(".csv"));
        assert_eq!(file_name.len(), "result_".len() + 14 + ".csv".len());

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[1],
            "Grim Dawn,https://store.steampowered.com/app/219990,92,1234,"
        );
        assert!(lines[2].starts_with("Offline,,,,"));
        assert!(lines[2].contains("dns error"));
        assert_eq!(lines[3], "Venba,,,,");
    }

    #[tokio::test]
    async fn fail_fast_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output_directory = dir.path().join("output");
        let mut settings = settings(&output_directory, "  queries: [\"Grim Dawn\", \"Offline\"]");
        settings.crawler.failure_policy = FailurePolicy::FailFast;

        let result = run_with_fetcher(settings, FakeStore, &mut NullProgress).await;

        assert!(result.is_err());
        assert!(!output_directory.exists());
    }
}
