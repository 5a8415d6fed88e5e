use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A post as the client produces it.
///
/// Carries everything the timeline exposes that is cheap to extract;
/// consumers pick the fields they publish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    pub id: String,
    pub text: Option<String>,
    pub username: Option<String>,
    pub name: Option<String>,
    pub user_id: Option<String>,
    pub conversation_id: Option<String>,
    /// Seconds since the Unix epoch.
    pub timestamp: Option<i64>,
    pub time_parsed: Option<DateTime<Utc>>,
    pub hashtags: Vec<String>,
    pub mentions: Vec<String>,
    pub urls: Vec<String>,
    pub photos: Vec<Photo>,
    pub videos: Vec<Video>,
    pub replies: u64,
    pub retweets: u64,
    pub likes: u64,
    pub bookmarks: u64,
    pub views: Option<u64>,
    pub permanent_url: Option<String>,
    pub is_retweet: bool,
    pub is_pinned: bool,
    pub is_reply: bool,
    pub is_quoted: bool,
    pub sensitive_content: bool,
}

impl PostRecord {
    /// A record with only the id set. Used by parsers and test fixtures.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: None,
            username: None,
            name: None,
            user_id: None,
            conversation_id: None,
            timestamp: None,
            time_parsed: None,
            hashtags: Vec::new(),
            mentions: Vec::new(),
            urls: Vec::new(),
            photos: Vec::new(),
            videos: Vec::new(),
            replies: 0,
            retweets: 0,
            likes: 0,
            bookmarks: 0,
            views: None,
            permanent_url: None,
            is_retweet: false,
            is_pinned: false,
            is_reply: false,
            is_quoted: false,
            sensitive_content: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: String,
    pub url: String,
    pub alt_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub preview: String,
    /// Highest-bitrate mp4 variant, when one exists.
    pub url: Option<String>,
}

/// One page of a user timeline.
#[derive(Debug, Clone, Default)]
pub struct TimelinePage {
    pub posts: Vec<PostRecord>,
    pub next_cursor: Option<String>,
}

// --- Raw GraphQL payloads ---

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlError {
    pub message: String,
    pub code: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserByScreenNameData {
    pub user: Option<UserResultWrapper>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserResultWrapper {
    pub result: Option<UserResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserResult {
    #[serde(rename = "__typename")]
    pub typename: Option<String>,
    pub rest_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserTweetsData {
    pub user: UserTimelineWrapper,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserTimelineWrapper {
    pub result: Option<UserTimelineResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserTimelineResult {
    #[serde(alias = "timeline_v2")]
    pub timeline: Option<TimelineOuter>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TimelineOuter {
    pub timeline: Option<Timeline>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Timeline {
    #[serde(default)]
    pub instructions: Vec<Instruction>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub(crate) enum Instruction {
    TimelineAddEntries {
        #[serde(default)]
        entries: Vec<Entry>,
    },
    TimelinePinEntry {
        entry: Entry,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Entry {
    pub entry_id: String,
    pub content: EntryContent,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EntryContent {
    pub entry_type: Option<String>,
    pub cursor_type: Option<String>,
    pub value: Option<String>,
    pub item_content: Option<ItemContent>,
    #[serde(default)]
    pub items: Vec<ModuleItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ModuleItem {
    pub item: ModuleItemInner,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ModuleItemInner {
    pub item_content: Option<ItemContent>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ItemContent {
    pub tweet_results: Option<TweetResults>,
    #[serde(rename = "promotedMetadata")]
    pub promoted_metadata: Option<serde::de::IgnoredAny>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TweetResults {
    pub result: Option<TweetResult>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
pub(crate) enum TweetResult {
    Tweet(RawTweet),
    TweetWithVisibilityResults { tweet: RawTweet },
    #[serde(other)]
    Unavailable,
}

impl TweetResult {
    pub fn into_tweet(self) -> Option<RawTweet> {
        match self {
            TweetResult::Tweet(tweet) => Some(tweet),
            TweetResult::TweetWithVisibilityResults { tweet } => Some(tweet),
            TweetResult::Unavailable => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawTweet {
    pub rest_id: Option<String>,
    pub core: Option<TweetCore>,
    pub legacy: Option<TweetLegacy>,
    pub views: Option<TweetViews>,
    pub note_tweet: Option<NoteTweet>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TweetCore {
    pub user_results: Option<CoreUserResults>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CoreUserResults {
    pub result: Option<CoreUser>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CoreUser {
    pub rest_id: Option<String>,
    pub legacy: Option<CoreUserLegacy>,
    pub core: Option<CoreUserLegacy>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CoreUserLegacy {
    pub screen_name: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TweetViews {
    pub count: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NoteTweet {
    pub note_tweet_results: Option<NoteTweetResults>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NoteTweetResults {
    pub result: Option<NoteTweetResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NoteTweetResult {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TweetLegacy {
    pub id_str: Option<String>,
    pub full_text: Option<String>,
    pub created_at: Option<String>,
    pub user_id_str: Option<String>,
    pub conversation_id_str: Option<String>,
    pub in_reply_to_status_id_str: Option<String>,
    #[serde(default)]
    pub favorite_count: u64,
    #[serde(default)]
    pub retweet_count: u64,
    #[serde(default)]
    pub reply_count: u64,
    #[serde(default)]
    pub bookmark_count: u64,
    #[serde(default)]
    pub is_quote_status: bool,
    #[serde(default)]
    pub possibly_sensitive: bool,
    pub retweeted_status_result: Option<serde::de::IgnoredAny>,
    pub entities: Option<Entities>,
    pub extended_entities: Option<ExtendedEntities>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Entities {
    #[serde(default)]
    pub hashtags: Vec<Hashtag>,
    #[serde(default)]
    pub user_mentions: Vec<UserMention>,
    #[serde(default)]
    pub urls: Vec<UrlEntity>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Hashtag {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserMention {
    pub screen_name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UrlEntity {
    pub expanded_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExtendedEntities {
    #[serde(default)]
    pub media: Vec<Media>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Media {
    pub id_str: String,
    #[serde(rename = "type")]
    pub media_type: String,
    pub media_url_https: String,
    pub ext_alt_text: Option<String>,
    pub video_info: Option<VideoInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VideoInfo {
    #[serde(default)]
    pub variants: Vec<VideoVariant>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VideoVariant {
    pub bitrate: Option<u64>,
    pub content_type: Option<String>,
    pub url: String,
}
