use url::Url;

const CANONICAL_PATH_SEGMENTS: usize = 2;

/// Reduces a store search hit to a stable per-title url.
///
/// The href is resolved against the search page it came from, then only the
/// scheme, host, port and first two path segments are kept:
/// `https://store.steampowered.com/app/361420/Astroneer/?snr=1_7` becomes
/// `https://store.steampowered.com/app/361420`.
pub fn canonical_store_url(search_url: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let parsed_url = search_url.join(href).ok()?;
    let host = match parsed_url.host_str() {
        Some("") | None => return None,
        Some(host) => host,
    };

    let mut canonical = format!("{}://{}", parsed_url.scheme(), host);
    if let Some(port) = parsed_url.port() {
        canonical.push_str(&format!(":{}", port));
    }

    if let Some(segments) = parsed_url.path_segments() {
        for segment in segments
            .filter(|segment| !segment.is_empty())
            .take(CANONICAL_PATH_SEGMENTS)
        {
            canonical.push('/');
            canonical.push_str(segment);
        }
    }

    Some(canonical)
}

#[cfg(test)]
mod tests {
    use super::canonical_store_url;
    use url::Url;

    fn search_url() -> Url {
        Url::parse("https://store.steampowered.com/search/?term=Grim+Dawn").unwrap()
    }

    #[test]
    fn deep_links_collapse_to_two_segments() {
        let hrefs = [
            "https://store.steampowered.com/app/219990/Grim_Dawn/?snr=1_7_7_151_150_1",
            "https://store.steampowered.com/app/219990/Grim_Dawn/",
            "https://store.steampowered.com/app/219990",
            "https://store.steampowered.com/app/219990/?snr=1#reviews",
        ];

        for href in hrefs {
            assert_eq!(
                canonical_store_url(&search_url(), href).as_deref(),
                Some("https://store.steampowered.com/app/219990"),
                "href: {}",
                href
            );
        }
    }

    #[test]
    fn relative_links_resolve_against_search_page() {
        assert_eq!(
            canonical_store_url(&search_url(), "/bundle/1234/Some_Bundle/?snr=1").as_deref(),
            Some("https://store.steampowered.com/bundle/1234")
        );
    }

    #[test]
    fn port_is_kept() {
        let search_url = Url::parse("http://127.0.0.1:8080/search/").unwrap();

        assert_eq!(
            canonical_store_url(&search_url, "/app/10/Counter_Strike/").as_deref(),
            Some("http://127.0.0.1:8080/app/10")
        );
    }

    #[test]
    fn short_paths_keep_what_is_there() {
        assert_eq!(
            canonical_store_url(&search_url(), "https://store.steampowered.com/").as_deref(),
            Some("https://store.steampowered.com")
        );
    }

    #[test]
    fn unusable_hrefs() {
        assert_eq!(canonical_store_url(&search_url(), ""), None);
        assert_eq!(canonical_store_url(&search_url(), "   "), None);
        assert_eq!(canonical_store_url(&search_url(), "mailto:someone@example.com"), None);
        assert_eq!(canonical_store_url(&search_url(), "http://[::1"), None);
    }
}
