//! Wikipedia lookups for knowledge mode
//!
//! A query is resolved to an article title with the MediaWiki full-text
//! search, then the leading sentences of the article are fetched with the
//! TextExtracts API. Disambiguation pages and missing articles are reported
//! as distinct outcomes so the prompt can say so instead of inventing facts.

use crate::config::KnowledgeConfig;
use crate::error::{ChatError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Maximum number of candidate titles reported for an ambiguous term
const MAX_OPTIONS: usize = 5;

/// Outcome of a knowledge lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum KnowledgeLookup {
    /// An article matched the query
    Found {
        /// Article title
        title: String,
        /// Leading sentences of the article
        extract: String,
        /// Article URL, when the API reported one
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    /// The query names a disambiguation page
    Ambiguous {
        /// Query as submitted
        query: String,
        /// Candidate article titles
        options: Vec<String>,
    },
    /// No article matched
    NotFound {
        /// Query as submitted
        query: String,
    },
}

impl KnowledgeLookup {
    /// Text folded into the prompt for this outcome
    pub fn source_text(&self) -> String {
        match self {
            Self::Found { title, extract, url } => match url {
                Some(url) => format!("{}: {}\n({})", title, extract, url),
                None => format!("{}: {}", title, extract),
            },
            Self::Ambiguous { query, options } => format!(
                "The term '{}' is ambiguous. Possible options include: {}",
                query,
                options.join(", ")
            ),
            Self::NotFound { query } => format!(
                "No Wikipedia page found for '{}'. Do not invent an article; say that no source was found.",
                query
            ),
        }
    }

    /// Source block in the form appended to the context message
    pub fn context_block(&self) -> String {
        format!(
            "\n[External Source: Wikipedia]\n{}\n[End Source]\n",
            self.source_text().trim()
        )
    }

    /// Whether an article extract was found
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

/// External encyclopedia consulted in knowledge mode
#[async_trait]
pub trait KnowledgeSource: Send + Sync {
    /// Short source identifier used in logs
    fn name(&self) -> &'static str;

    /// Look up a free-text query
    ///
    /// # Errors
    ///
    /// Returns error on transport failures or undecodable responses; a
    /// missing article is a successful [`KnowledgeLookup::NotFound`]
    async fn lookup(&self, query: &str) -> Result<KnowledgeLookup>;
}

/// Wikipedia REST + search client
pub struct WikipediaClient {
    client: Client,
    api_base: Url,
    sentences: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct PageQueryResponse {
    #[serde(default)]
    query: Option<PageQuery>,
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    #[serde(default)]
    pages: Vec<Page>,
}

/// One page of a `formatversion=2` query
#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    extract: String,
    #[serde(default)]
    fullurl: Option<String>,
    #[serde(default)]
    pageprops: Option<PageProps>,
}

#[derive(Debug, Deserialize)]
struct PageProps {
    #[serde(default)]
    disambiguation: Option<String>,
}

impl Page {
    fn is_disambiguation(&self) -> bool {
        self.pageprops
            .as_ref()
            .map_or(false, |p| p.disambiguation.is_some())
    }
}

impl WikipediaClient {
    /// Create a client for the configured Wikipedia edition
    ///
    /// # Errors
    ///
    /// Returns error if `api_base` is not a valid URL or the HTTP client
    /// cannot be built
    ///
    /// # Examples
    ///
    /// ```
    /// use modechat::config::KnowledgeConfig;
    /// use modechat::knowledge::WikipediaClient;
    ///
    /// assert!(WikipediaClient::new(&KnowledgeConfig::default()).is_ok());
    /// ```
    pub fn new(config: &KnowledgeConfig) -> Result<Self> {
        let api_base = Url::parse(&config.api_base).map_err(|e| {
            ChatError::Config(format!("Invalid knowledge.api_base '{}': {}", config.api_base, e))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("modechat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ChatError::Knowledge(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base,
            sentences: config.sentences.clamp(1, 10),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| ChatError::Config("knowledge.api_base cannot be a base URL".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Titles of the best matching articles, best first
    async fn search_titles(&self, query: &str) -> Result<Vec<String>> {
        let mut url = self.endpoint(&["w", "api.php"])?;
        url.query_pairs_mut()
            .append_pair("action", "query")
            .append_pair("list", "search")
            .append_pair("srsearch", query)
            .append_pair("srlimit", &(MAX_OPTIONS + 1).to_string())
            .append_pair("format", "json");

        let response = self.client.get(url).send().await.map_err(|e| {
            ChatError::Knowledge(format!("Wikipedia search request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Knowledge(format!("Wikipedia search returned {}", status)).into());
        }

        let body: SearchResponse = response.json().await.map_err(|e| {
            ChatError::Knowledge(format!("Failed to parse Wikipedia search response: {}", e))
        })?;

        Ok(body
            .query
            .map(|q| q.search.into_iter().map(|hit| hit.title).collect())
            .unwrap_or_default())
    }

    /// Leading sentences of one article, `None` when it does not exist
    async fn fetch_article(&self, title: &str) -> Result<Option<Page>> {
        let mut url = self.endpoint(&["w", "api.php"])?;
        url.query_pairs_mut()
            .append_pair("action", "query")
            .append_pair("prop", "extracts|pageprops|info")
            .append_pair("titles", title)
            .append_pair("redirects", "1")
            .append_pair("exintro", "1")
            .append_pair("explaintext", "1")
            .append_pair("exsentences", &self.sentences.to_string())
            .append_pair("ppprop", "disambiguation")
            .append_pair("inprop", "url")
            .append_pair("format", "json")
            .append_pair("formatversion", "2");

        let response = self.client.get(url).send().await.map_err(|e| {
            ChatError::Knowledge(format!("Wikipedia article request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(
                ChatError::Knowledge(format!("Wikipedia article returned {}", status)).into(),
            );
        }

        let body: PageQueryResponse = response.json().await.map_err(|e| {
            ChatError::Knowledge(format!("Failed to parse Wikipedia article response: {}", e))
        })?;

        Ok(body
            .query
            .and_then(|q| q.pages.into_iter().next())
            .filter(|page| !page.missing))
    }
}

#[async_trait]
impl KnowledgeSource for WikipediaClient {
    fn name(&self) -> &'static str {
        "wikipedia"
    }

    async fn lookup(&self, query: &str) -> Result<KnowledgeLookup> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(KnowledgeLookup::NotFound {
                query: String::new(),
            });
        }

        let titles = self.search_titles(query).await?;
        tracing::debug!("Wikipedia search for '{}' returned {} titles", query, titles.len());

        let Some(best) = titles.first() else {
            return Ok(KnowledgeLookup::NotFound {
                query: query.to_string(),
            });
        };

        let Some(page) = self.fetch_article(best).await? else {
            return Ok(KnowledgeLookup::NotFound {
                query: query.to_string(),
            });
        };

        if page.is_disambiguation() {
            let options: Vec<String> = titles
                .iter()
                .filter(|t| t.as_str() != page.title && t.as_str() != best.as_str())
                .take(MAX_OPTIONS)
                .cloned()
                .collect();
            if options.is_empty() {
                tracing::debug!("Disambiguation page '{}' has no alternatives", page.title);
                return Ok(KnowledgeLookup::NotFound {
                    query: query.to_string(),
                });
            }
            return Ok(KnowledgeLookup::Ambiguous {
                query: query.to_string(),
                options,
            });
        }

        let extract = page.extract.trim().to_string();
        if extract.is_empty() {
            return Ok(KnowledgeLookup::NotFound {
                query: query.to_string(),
            });
        }

        Ok(KnowledgeLookup::Found {
            title: page.title,
            extract,
            url: page.fullurl,
        })
    }
}
