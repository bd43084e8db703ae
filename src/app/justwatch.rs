// src/app/justwatch.rs
//! JustWatch title search with ordered locale fallback.
//!
//! `resolve` walks the configured locales one at a time and returns the first
//! non-empty movie list. A locale that errors is logged and skipped; only when
//! every locale is exhausted does the caller get an empty list.

use std::time::Duration;

use once_cell::sync::Lazy;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, ORIGIN, REFERER};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const GRAPHQL_ENDPOINT: &str = "https://apis.justwatch.com/graphql";
const SITE_BASE: &str = "https://www.justwatch.com";
const IMAGE_BASE: &str = "https://images.justwatch.com";
const POSTER_PROFILE: &str = "s332";
const POSTER_FORMAT: &str = "jpg";
const APP_VERSION: &str = "3.8.2-web-web";
const SOURCE_TAG: &str = "tripboard";
pub const DEFAULT_RESULT_LIMIT: usize = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 8;

const SEARCH_QUERY: &str = r#"
query GetSearchTitles(
  $searchTitlesFilter: TitleFilter!
  $country: Country!
  $language: Language!
  $first: Int!
  $source: String
) {
  popularTitles(
    country: $country
    filter: $searchTitlesFilter
    first: $first
    sortBy: POPULAR
    sortRandomSeed: 0
    source: $source
  ) {
    edges {
      node {
        __typename
        id
        objectId
        objectType
        content(country: $country, language: $language) {
          title
          originalTitle
          originalReleaseYear
          fullPath
          posterUrl
        }
        watchNowOffer(country: $country, platform: WEB) {
          standardWebURL
        }
        offers(country: $country, platform: WEB) {
          standardWebURL
        }
      }
    }
  }
}
"#;

/// One locale to try against the search endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub region_code: String,
    pub language_code: String,
    #[serde(default)]
    pub display_name: String,
}

impl SearchConfig {
    pub fn new(region: &str, language: &str, display_name: &str) -> Self {
        Self {
            region_code: region.to_string(),
            language_code: language.to_string(),
            display_name: display_name.to_string(),
        }
    }

    fn label(&self) -> String {
        if self.display_name.is_empty() {
            format!("{}/{}", self.region_code, self.language_code)
        } else {
            format!("{} ({}/{})", self.display_name, self.region_code, self.language_code)
        }
    }
}

/// Primary locale, English fallback, then the other dialect of the primary language.
pub static DEFAULT_SEARCH_CONFIGS: Lazy<Vec<SearchConfig>> = Lazy::new(|| {
    vec![
        SearchConfig::new("BR", "pt", "Brasil"),
        SearchConfig::new("US", "en", "United States"),
        SearchConfig::new("PT", "pt", "Portugal"),
    ]
});

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedSearchResult {
    pub id: i64,
    pub title: String,
    pub original_title: String,
    /// Always "movie"; other object types are filtered out.
    pub object_type: String,
    pub release_year: Option<i32>,
    pub canonical_path: String,
    pub poster_url: Option<String>,
    pub deep_link: String,
}

impl NormalizedSearchResult {
    pub fn title_line(&self) -> String {
        match self.release_year {
            Some(y) => format!("{} ({})", self.title, y),
            None => self.title.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream returned HTTP {0}")]
    Status(u16),
    #[error("api error: {0}")]
    Api(String),
    #[error("decode: {0}")]
    Decode(#[from] serde_json::Error),
}

/// One network round trip for one locale.
pub trait SearchBackend {
    fn fetch(
        &self,
        query: &str,
        config: &SearchConfig,
    ) -> Result<Vec<NormalizedSearchResult>, SearchError>;
}

// ---- raw response shapes ----
#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<SearchData>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchData {
    popular_titles: Option<TitleConnection>,
    search_titles: Option<TitleConnection>,
}

#[derive(Debug, Deserialize)]
struct TitleConnection {
    edges: Option<Vec<TitleEdge>>,
}

#[derive(Debug, Deserialize)]
struct TitleEdge {
    node: Option<RawNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNode {
    #[serde(rename = "__typename")]
    typename: Option<String>,
    id: Option<String>,
    object_id: Option<i64>,
    object_type: Option<String>,
    content: Option<RawContent>,
    watch_now_offer: Option<RawOffer>,
    offers: Option<Vec<RawOffer>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContent {
    title: Option<String>,
    original_title: Option<String>,
    original_release_year: Option<i32>,
    full_path: Option<String>,
    poster_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawOffer {
    #[serde(rename = "standardWebURL")]
    standard_web_url: Option<String>,
}

impl RawNode {
    fn is_movie(&self) -> bool {
        self.object_type
            .as_deref()
            .or(self.typename.as_deref())
            .is_some_and(|t| t.eq_ignore_ascii_case("movie"))
    }

    /// Numeric id: `objectId` when present, else the digits of `id` ("tm1234").
    fn numeric_id(&self) -> Option<i64> {
        self.object_id.or_else(|| {
            let digits: String = self
                .id
                .as_deref()?
                .chars()
                .filter(char::is_ascii_digit)
                .collect();
            digits.parse().ok()
        })
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

pub fn poster_from_template(template: &str) -> String {
    let path = template
        .replace("{profile}", POSTER_PROFILE)
        .replace("{format}", POSTER_FORMAT);
    if path.starts_with("http://") || path.starts_with("https://") {
        path
    } else if path.starts_with('/') {
        format!("{IMAGE_BASE}{path}")
    } else {
        format!("{IMAGE_BASE}/{path}")
    }
}

pub fn canonical_url(full_path: &str) -> String {
    if full_path.starts_with('/') {
        format!("{SITE_BASE}{full_path}")
    } else {
        format!("{SITE_BASE}/{full_path}")
    }
}

pub fn site_search_url(title: &str, config: &SearchConfig) -> String {
    format!(
        "{SITE_BASE}/{}/search?q={}",
        config.region_code.to_ascii_lowercase(),
        urlencoding::encode(title)
    )
}

fn normalize_node(node: RawNode, config: &SearchConfig) -> Option<NormalizedSearchResult> {
    if !node.is_movie() {
        return None;
    }
    let id = node.numeric_id()?;
    let content = node.content.as_ref();
    let original_title = non_empty(content.and_then(|c| c.original_title.as_deref()));
    let title = non_empty(content.and_then(|c| c.title.as_deref())).or(original_title)?;
    let full_path = non_empty(content.and_then(|c| c.full_path.as_deref()));

    let deep_link = non_empty(
        node.watch_now_offer
            .as_ref()
            .and_then(|o| o.standard_web_url.as_deref()),
    )
    .or_else(|| {
        node.offers
            .iter()
            .flatten()
            .find_map(|o| non_empty(o.standard_web_url.as_deref()))
    })
    .map(str::to_string)
    .or_else(|| full_path.map(canonical_url))
    .unwrap_or_else(|| site_search_url(title, config));

    Some(NormalizedSearchResult {
        id,
        title: title.to_string(),
        original_title: original_title.unwrap_or(title).to_string(),
        object_type: "movie".into(),
        release_year: content.and_then(|c| c.original_release_year),
        canonical_path: full_path.unwrap_or_default().to_string(),
        poster_url: non_empty(content.and_then(|c| c.poster_url.as_deref()))
            .map(poster_from_template),
        deep_link,
    })
}

/// Decode a GraphQL payload into movie results. A non-empty `errors` array or a
/// missing `data` block is an API error even when HTTP said 200.
pub fn normalize_response(
    body: &[u8],
    config: &SearchConfig,
) -> Result<Vec<NormalizedSearchResult>, SearchError> {
    let parsed: GraphQlResponse = serde_json::from_slice(body)?;

    if let Some(errors) = parsed.errors.filter(|e| !e.is_empty()) {
        let joined = errors
            .iter()
            .map(|e| e.message.as_deref().unwrap_or("unknown error"))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(SearchError::Api(joined));
    }

    let data = parsed
        .data
        .ok_or_else(|| SearchError::Api("response carried no data".into()))?;
    let connection = data
        .popular_titles
        .or(data.search_titles)
        .ok_or_else(|| SearchError::Api("response carried no title list".into()))?;

    Ok(connection
        .edges
        .unwrap_or_default()
        .into_iter()
        .filter_map(|edge| edge.node)
        .filter_map(|node| normalize_node(node, config))
        .collect())
}

pub fn request_body(query: &str, config: &SearchConfig, first: usize) -> serde_json::Value {
    json!({
        "operationName": "GetSearchTitles",
        "query": SEARCH_QUERY,
        "variables": {
            "searchTitlesFilter": {
                "searchQuery": query,
                "personId": null,
                "includeTitlesWithoutUrl": true,
            },
            "country": config.region_code,
            "language": config.language_code,
            "first": first,
            "source": SOURCE_TAG,
        }
    })
}

/// Blocking client for the JustWatch GraphQL endpoint.
pub struct JustWatchClient {
    client: Client,
    endpoint: String,
    result_limit: usize,
}

impl JustWatchClient {
    pub fn new(timeout: Duration, result_limit: usize) -> Result<Self, SearchError> {
        Self::with_endpoint(GRAPHQL_ENDPOINT, timeout, result_limit)
    }

    pub fn with_endpoint(
        endpoint: &str,
        timeout: Duration,
        result_limit: usize,
    ) -> Result<Self, SearchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(ORIGIN, HeaderValue::from_static(SITE_BASE));
        headers.insert(REFERER, HeaderValue::from_static("https://www.justwatch.com/"));
        headers.insert("app-version", HeaderValue::from_static(APP_VERSION));

        let client = Client::builder()
            .user_agent(concat!("tripboard/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            result_limit: result_limit.max(1),
        })
    }
}

impl SearchBackend for JustWatchClient {
    fn fetch(
        &self,
        query: &str,
        config: &SearchConfig,
    ) -> Result<Vec<NormalizedSearchResult>, SearchError> {
        let body = serde_json::to_vec(&request_body(query, config, self.result_limit))?;
        let resp = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }
        let bytes = resp.bytes()?;
        normalize_response(&bytes, config)
    }
}

/// Where a resolution currently stands.
#[derive(Debug, PartialEq, Eq)]
pub enum ResolveState {
    /// About to try `configs[i]`.
    Trying(usize),
    Found(Vec<NormalizedSearchResult>),
    Exhausted,
}

impl ResolveState {
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Trying(_))
    }

    /// Attempt one configuration and move to the next state.
    pub fn step<B: SearchBackend + ?Sized>(
        self,
        backend: &B,
        configs: &[SearchConfig],
        query: &str,
    ) -> Self {
        let idx = match self {
            Self::Trying(idx) => idx,
            done => return done,
        };
        let Some(config) = configs.get(idx) else {
            return Self::Exhausted;
        };

        match backend.fetch(query, config) {
            Ok(results) if !results.is_empty() => {
                info!(
                    "search {query:?}: {} result(s) from {}",
                    results.len(),
                    config.label()
                );
                Self::Found(results)
            }
            Ok(_) => {
                debug!("search {query:?}: no results from {}", config.label());
                Self::Trying(idx + 1)
            }
            Err(err) => {
                warn!("search {query:?} failed for {}: {err}", config.label());
                Self::Trying(idx + 1)
            }
        }
    }

    pub fn into_results(self) -> Vec<NormalizedSearchResult> {
        match self {
            Self::Found(results) => results,
            _ => Vec::new(),
        }
    }
}

/// First non-empty result list across `configs`, tried in order. Blank queries
/// return immediately without touching the backend.
pub fn resolve<B: SearchBackend + ?Sized>(
    backend: &B,
    configs: &[SearchConfig],
    query: &str,
) -> Vec<NormalizedSearchResult> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let mut state = ResolveState::Trying(0);
    loop {
        state = state.step(backend, configs, query);
        if state.is_terminal() {
            return state.into_results();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    enum Reply {
        Results(Vec<NormalizedSearchResult>),
        Fail,
    }

    struct ScriptedBackend {
        replies: Vec<Reply>,
        calls: RefCell<Vec<String>>,
    }

    impl ScriptedBackend {
        fn new(replies: Vec<Reply>) -> Self {
            Self {
                replies,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl SearchBackend for ScriptedBackend {
        fn fetch(
            &self,
            _query: &str,
            config: &SearchConfig,
        ) -> Result<Vec<NormalizedSearchResult>, SearchError> {
            let idx = self.call_count();
            self.calls.borrow_mut().push(config.region_code.clone());
            match self.replies.get(idx) {
                Some(Reply::Results(r)) => Ok(r.clone()),
                Some(Reply::Fail) | None => Err(SearchError::Status(503)),
            }
        }
    }

    fn result(id: i64, title: &str) -> NormalizedSearchResult {
        NormalizedSearchResult {
            id,
            title: title.into(),
            original_title: title.into(),
            object_type: "movie".into(),
            release_year: None,
            canonical_path: String::new(),
            poster_url: None,
            deep_link: format!("https://example.test/{id}"),
        }
    }

    fn configs() -> Vec<SearchConfig> {
        DEFAULT_SEARCH_CONFIGS.clone()
    }

    #[test]
    fn falls_back_to_second_locale_and_stops() {
        let backend = ScriptedBackend::new(vec![
            Reply::Results(vec![]),
            Reply::Results(vec![result(1, "Moana")]),
            Reply::Results(vec![result(2, "Never")]),
        ]);
        let out = resolve(&backend, &configs(), "moana");
        assert_eq!(out, vec![result(1, "Moana")]);
        assert_eq!(*backend.calls.borrow(), vec!["BR", "US"]);
    }

    #[test]
    fn failures_are_skipped_like_empty_results() {
        let backend = ScriptedBackend::new(vec![
            Reply::Fail,
            Reply::Fail,
            Reply::Results(vec![result(7, "Coco")]),
        ]);
        let out = resolve(&backend, &configs(), "coco");
        assert_eq!(out.len(), 1);
        assert_eq!(backend.call_count(), 3);
    }

    #[test]
    fn total_failure_returns_empty() {
        let backend = ScriptedBackend::new(vec![Reply::Fail, Reply::Results(vec![]), Reply::Fail]);
        assert!(resolve(&backend, &configs(), "nothing").is_empty());
        assert_eq!(backend.call_count(), 3);
    }

    #[test]
    fn blank_query_makes_no_calls() {
        let backend = ScriptedBackend::new(vec![Reply::Results(vec![result(1, "x")])]);
        assert!(resolve(&backend, &configs(), "").is_empty());
        assert!(resolve(&backend, &configs(), "   ").is_empty());
        assert_eq!(backend.call_count(), 0);
    }

    #[test]
    fn no_configs_means_exhausted() {
        let backend = ScriptedBackend::new(vec![]);
        assert!(resolve(&backend, &[], "moana").is_empty());
        assert_eq!(
            ResolveState::Trying(0).step(&backend, &[], "moana"),
            ResolveState::Exhausted
        );
    }

    #[test]
    fn terminal_states_do_not_fetch() {
        let backend = ScriptedBackend::new(vec![]);
        let found = ResolveState::Found(vec![result(1, "x")]);
        let next = found.step(&backend, &configs(), "x");
        assert!(next.is_terminal());
        assert_eq!(backend.call_count(), 0);
    }

    const MIXED_PAYLOAD: &str = r#"{
      "data": {
        "popularTitles": {
          "edges": [
            {
              "node": {
                "__typename": "Movie",
                "id": "tm286197",
                "objectId": 286197,
                "objectType": "MOVIE",
                "content": {
                  "title": "Moana: Um Mar de Aventuras",
                  "originalTitle": "Moana",
                  "originalReleaseYear": 2016,
                  "fullPath": "/br/filme/moana",
                  "posterUrl": "/poster/8629405/{profile}/moana.{format}"
                },
                "watchNowOffer": { "standardWebURL": "https://www.disneyplus.com/movies/moana" },
                "offers": [ { "standardWebURL": "https://tv.apple.com/moana" } ]
              }
            },
            {
              "node": {
                "__typename": "Person",
                "id": "p1",
                "objectType": "PERSON",
                "content": { "title": "Dwayne Johnson" }
              }
            }
          ]
        }
      }
    }"#;

    #[test]
    fn only_movies_survive_normalization() {
        let cfg = SearchConfig::new("BR", "pt", "Brasil");
        let out = normalize_response(MIXED_PAYLOAD.as_bytes(), &cfg).unwrap();
        assert_eq!(out.len(), 1);
        let m = &out[0];
        assert_eq!(m.id, 286197);
        assert_eq!(m.title, "Moana: Um Mar de Aventuras");
        assert_eq!(m.original_title, "Moana");
        assert_eq!(m.object_type, "movie");
        assert_eq!(m.release_year, Some(2016));
        assert_eq!(m.canonical_path, "/br/filme/moana");
        assert_eq!(m.deep_link, "https://www.disneyplus.com/movies/moana");
        assert_eq!(
            m.poster_url.as_deref(),
            Some("https://images.justwatch.com/poster/8629405/s332/moana.jpg")
        );
    }

    #[test]
    fn deep_link_falls_back_in_order() {
        let cfg = SearchConfig::new("US", "en", "United States");

        let first_offer = r#"{"data":{"searchTitles":{"edges":[{"node":{
            "__typename":"Movie","id":"tm5","watchNowOffer":null,
            "offers":[{"standardWebURL":""},{"standardWebURL":"https://netflix.com/5"}],
            "content":{"title":"Five","fullPath":"/us/movie/five"}}}]}}}"#;
        let out = normalize_response(first_offer.as_bytes(), &cfg).unwrap();
        assert_eq!(out[0].id, 5);
        assert_eq!(out[0].deep_link, "https://netflix.com/5");
        assert_eq!(out[0].poster_url, None);

        let canonical = r#"{"data":{"searchTitles":{"edges":[{"node":{
            "objectType":"MOVIE","objectId":6,"offers":[],
            "content":{"title":"Six","fullPath":"/us/movie/six"}}}]}}}"#;
        let out = normalize_response(canonical.as_bytes(), &cfg).unwrap();
        assert_eq!(out[0].deep_link, "https://www.justwatch.com/us/movie/six");

        let search = r#"{"data":{"searchTitles":{"edges":[{"node":{
            "objectType":"MOVIE","objectId":7,
            "content":{"title":"Lilo & Stitch"}}}]}}}"#;
        let out = normalize_response(search.as_bytes(), &cfg).unwrap();
        assert_eq!(
            out[0].deep_link,
            "https://www.justwatch.com/us/search?q=Lilo%20%26%20Stitch"
        );
        assert_eq!(out[0].canonical_path, "");
    }

    #[test]
    fn error_array_is_an_api_error() {
        let cfg = SearchConfig::new("US", "en", "");
        let body = br#"{"data":null,"errors":[{"message":"rate limited"}]}"#;
        match normalize_response(body, &cfg) {
            Err(SearchError::Api(msg)) => assert_eq!(msg, "rate limited"),
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_payload_is_a_decode_error() {
        let cfg = SearchConfig::new("US", "en", "");
        assert!(matches!(
            normalize_response(b"<html>", &cfg),
            Err(SearchError::Decode(_))
        ));
        assert!(matches!(
            normalize_response(b"{}", &cfg),
            Err(SearchError::Api(_))
        ));
    }

    #[test]
    fn empty_edge_list_is_not_an_error() {
        let cfg = SearchConfig::new("PT", "pt", "Portugal");
        let body = br#"{"data":{"popularTitles":{"edges":[]}}}"#;
        assert!(normalize_response(body, &cfg).unwrap().is_empty());
    }

    #[test]
    fn request_body_carries_locale_and_cap() {
        let cfg = SearchConfig::new("PT", "pt", "Portugal");
        let body = request_body("frozen", &cfg, 5);
        assert_eq!(body["operationName"], "GetSearchTitles");
        assert_eq!(body["variables"]["country"], "PT");
        assert_eq!(body["variables"]["language"], "pt");
        assert_eq!(body["variables"]["first"], 5);
        assert_eq!(body["variables"]["searchTitlesFilter"]["searchQuery"], "frozen");
    }
}
