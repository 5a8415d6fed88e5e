pub mod error;
pub mod session;
pub mod timeline;
pub mod types;

pub use error::{Result, XError};
pub use session::{SessionStore, AUTH_COOKIE, CSRF_COOKIE, PLATFORM_DOMAIN};
pub use types::{Photo, PostRecord, TimelinePage, Video};

use std::collections::HashSet;
use std::sync::Arc;

use async_stream::try_stream;
use futures::Stream;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, REFERER, USER_AGENT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use types::{GraphQlError, GraphQlResponse, UserByScreenNameData, UserTweetsData};

/// Public web-app bearer token. Identifies the client application, not a user,
/// and is the same for every session.
pub const BEARER_TOKEN: &str = "AAAAAAAAAAAAAAAAAAAAANRILgAAAAAAnNwIzUejRCOuH5E6I8xnZz4puTs%3D1Zv7ttfk8LF81IUq16cHjhLTvJu4FA33AGWWjCpTnA";

const GRAPHQL_BASE: &str = "https://x.com/i/api/graphql";

/// Query id + operation name for the user lookup.
const USER_BY_SCREEN_NAME: &str = "G3KGOASz96M-Qu0nwmGXNg/UserByScreenName";

/// Query id + operation name for a user's tweet timeline.
const USER_TWEETS: &str = "E3opETHurmVJflFsUBVuUQ/UserTweets";

/// Largest page the timeline endpoint serves reliably.
pub const MAX_PAGE_SIZE: usize = 40;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36";

/// Error bodies are cut to this many characters before surfacing.
const MAX_ERROR_BODY: usize = 300;

/// Authenticated X web client bound to a single session.
///
/// The caller supplies both the transport and the session store. Nothing is
/// shared between instances: two clients built from two stores never see
/// each other's cookies.
pub struct XClient {
    http: reqwest::Client,
    session: Arc<SessionStore>,
    base_url: String,
}

impl XClient {
    /// `http` should have `session` installed as its cookie provider, otherwise
    /// requests go out unauthenticated.
    pub fn new(http: reqwest::Client, session: Arc<SessionStore>) -> Self {
        Self::with_base_url(http, session, GRAPHQL_BASE)
    }

    /// Same as `new`, against a different GraphQL root (no trailing slash).
    pub fn with_base_url(
        http: reqwest::Client,
        session: Arc<SessionStore>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            session,
            base_url: base_url.into(),
        }
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {BEARER_TOKEN}"))
                .map_err(|e| XError::Auth(e.to_string()))?,
        );
        if let Some(csrf) = self.session.csrf_token() {
            headers.insert(
                "x-csrf-token",
                HeaderValue::from_str(&csrf).map_err(|e| XError::Auth(e.to_string()))?,
            );
        }
        if self.session.get(AUTH_COOKIE).is_some() {
            headers.insert("x-twitter-auth-type", HeaderValue::from_static("OAuth2Session"));
        }
        headers.insert("x-twitter-active-user", HeaderValue::from_static("yes"));
        headers.insert("x-twitter-client-language", HeaderValue::from_static("en"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(REFERER, HeaderValue::from_static("https://x.com/"));
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        Ok(headers)
    }

    async fn graphql<T: DeserializeOwned>(
        &self,
        operation: &str,
        variables: Value,
        features: Value,
    ) -> Result<T> {
        let url = format!("{}/{operation}", self.base_url);
        let resp = self
            .http
            .get(&url)
            .headers(self.headers()?)
            .query(&[
                ("variables", variables.to_string()),
                ("features", features.to_string()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(XError::RateLimited);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = resp.text().await.unwrap_or_default();
            return Err(XError::Auth(format!(
                "status {}: {}",
                status.as_u16(),
                truncate(&body)
            )));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(XError::Api {
                status: status.as_u16(),
                message: truncate(&body),
            });
        }

        let body: GraphQlResponse<T> = resp.json().await?;
        match body.data {
            Some(data) => Ok(data),
            None => Err(graphql_failure(body.errors)),
        }
    }

    /// Resolve a screen name to its numeric user id.
    pub async fn user_id(&self, screen_name: &str) -> Result<String> {
        let variables = json!({
            "screen_name": screen_name,
            "withSafetyModeUserFields": true,
        });
        let data: UserByScreenNameData = self
            .graphql(USER_BY_SCREEN_NAME, variables, user_features())
            .await?;

        let user = data
            .user
            .and_then(|u| u.result)
            .ok_or_else(|| XError::NotFound(screen_name.to_string()))?;
        if user.typename.as_deref() == Some("UserUnavailable") {
            return Err(XError::NotFound(format!("{screen_name} (unavailable)")));
        }
        user.rest_id
            .ok_or_else(|| XError::NotFound(screen_name.to_string()))
    }

    /// Fetch one page of a user's tweets, continuing from `cursor` when given.
    pub async fn user_tweets_page(
        &self,
        user_id: &str,
        count: usize,
        cursor: Option<&str>,
    ) -> Result<TimelinePage> {
        let mut variables = json!({
            "userId": user_id,
            "count": count,
            "includePromotedContent": false,
            "withQuickPromoteEligibilityTweetFields": false,
            "withVoice": true,
            "withV2Timeline": true,
        });
        if let Some(cursor) = cursor {
            variables["cursor"] = json!(cursor);
        }

        let data: UserTweetsData = self
            .graphql(USER_TWEETS, variables, timeline_features())
            .await?;
        Ok(timeline::parse_user_tweets(data))
    }

    /// Lazily page through a user's tweets, newest first, yielding at most `limit`.
    ///
    /// Nothing is fetched until the stream is polled. Pages are requested one at
    /// a time as the consumer pulls; dropping the stream stops paging. Ends on an
    /// empty page or when the cursor stops advancing. A post already yielded is
    /// never yielded again, even when a later page repeats it.
    pub fn user_posts<'a>(
        &'a self,
        screen_name: &'a str,
        limit: usize,
    ) -> impl Stream<Item = Result<PostRecord>> + Send + 'a {
        try_stream! {
            if limit > 0 {
                let user_id = self.user_id(screen_name).await?;
                tracing::debug!(screen_name, user_id = %user_id, limit, "Resolved user, paging timeline");

                let mut cursor: Option<String> = None;
                let mut seen: HashSet<String> = HashSet::new();
                let mut produced = 0usize;
                while produced < limit {
                    let count = (limit - produced).min(MAX_PAGE_SIZE);
                    let page = self
                        .user_tweets_page(&user_id, count, cursor.as_deref())
                        .await?;
                    tracing::debug!(screen_name, fetched = page.posts.len(), produced, "Fetched timeline page");

                    if page.posts.is_empty() {
                        break;
                    }
                    for post in page.posts {
                        if produced >= limit {
                            break;
                        }
                        // Pinned posts reappear at their timeline position.
                        if !seen.insert(post.id.clone()) {
                            continue;
                        }
                        produced += 1;
                        yield post;
                    }

                    match page.next_cursor {
                        Some(next) if cursor.as_deref() != Some(next.as_str()) => cursor = Some(next),
                        _ => break,
                    }
                }
            }
        }
    }
}

fn graphql_failure(errors: Vec<GraphQlError>) -> XError {
    if errors.is_empty() {
        return XError::Parse("GraphQL response contained no data".into());
    }
    let message = errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ");
    // 32: could not authenticate, 64: suspended, 326: locked
    let auth = errors
        .iter()
        .any(|e| matches!(e.code, Some(32) | Some(64) | Some(326)));
    if auth {
        XError::Auth(message)
    } else {
        XError::Api {
            status: 200,
            message,
        }
    }
}

fn truncate(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY {
        body.to_string()
    } else {
        let cut: String = body.chars().take(MAX_ERROR_BODY).collect();
        format!("{cut}…")
    }
}

fn user_features() -> Value {
    json!({
        "hidden_profile_subscriptions_enabled": true,
        "rweb_tipjar_consumption_enabled": true,
        "responsive_web_graphql_exclude_directive_enabled": true,
        "verified_phone_label_enabled": false,
        "subscriptions_verification_info_is_identity_verified_enabled": true,
        "subscriptions_verification_info_verified_since_enabled": true,
        "highlights_tweets_tab_ui_enabled": true,
        "responsive_web_twitter_article_notes_tab_enabled": true,
        "subscriptions_feature_can_gift_premium": true,
        "creator_subscriptions_tweet_preview_api_enabled": true,
        "responsive_web_graphql_skip_user_profile_image_extensions_enabled": false,
        "responsive_web_graphql_timeline_navigation_enabled": true
    })
}

fn timeline_features() -> Value {
    json!({
        "profile_label_improvements_pcf_label_in_post_enabled": true,
        "rweb_tipjar_consumption_enabled": true,
        "responsive_web_graphql_exclude_directive_enabled": true,
        "verified_phone_label_enabled": false,
        "creator_subscriptions_tweet_preview_api_enabled": true,
        "responsive_web_graphql_timeline_navigation_enabled": true,
        "responsive_web_graphql_skip_user_profile_image_extensions_enabled": false,
        "premium_content_api_read_enabled": false,
        "communities_web_enable_tweet_community_results_fetch": true,
        "c9s_tweet_anatomy_moderator_badge_enabled": true,
        "articles_preview_enabled": true,
        "responsive_web_edit_tweet_api_enabled": true,
        "graphql_is_translatable_rweb_tweet_is_translatable_enabled": true,
        "view_counts_everywhere_api_enabled": true,
        "longform_notetweets_consumption_enabled": true,
        "responsive_web_twitter_article_tweet_consumption_enabled": true,
        "tweet_awards_web_tipping_enabled": false,
        "creator_subscriptions_quote_tweet_preview_enabled": false,
        "freedom_of_speech_not_reach_fetch_enabled": true,
        "standardized_nudges_misinfo": true,
        "tweet_with_visibility_results_prefer_gql_limited_actions_policy_enabled": true,
        "rweb_video_timestamps_enabled": true,
        "longform_notetweets_rich_text_read_enabled": true,
        "longform_notetweets_inline_media_enabled": true,
        "responsive_web_enhance_cards_enabled": false
    })
}
