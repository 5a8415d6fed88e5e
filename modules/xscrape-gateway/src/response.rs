use serde::Serialize;
use x_client::{Photo, PostRecord, Video};

/// Public shape of a post. Exactly these fields, whatever the engine exposes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: String,
    pub text: Option<String>,
    pub timestamp: Option<i64>,
    pub photos: Vec<Photo>,
    pub videos: Vec<Video>,
    pub replies: u64,
    pub retweets: u64,
    pub likes: u64,
    pub views: Option<u64>,
    pub permanent_url: Option<String>,
    pub is_retweet: bool,
    pub is_pinned: bool,
}

impl From<PostRecord> for PostView {
    fn from(post: PostRecord) -> Self {
        Self {
            id: post.id,
            text: post.text,
            timestamp: post.timestamp,
            photos: post.photos,
            videos: post.videos,
            replies: post.replies,
            retweets: post.retweets,
            likes: post.likes,
            views: post.views,
            permanent_url: post.permanent_url,
            is_retweet: post.is_retweet,
            is_pinned: post.is_pinned,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ScrapeResponse {
    pub success: bool,
    pub count: usize,
    pub tweets: Vec<PostView>,
}

impl ScrapeResponse {
    pub fn from_posts(posts: Vec<PostRecord>) -> Self {
        let tweets: Vec<PostView> = posts.into_iter().map(PostView::from).collect();
        Self {
            success: true,
            count: tweets.len(),
            tweets,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> PostRecord {
        let mut post = PostRecord::with_id(id);
        post.text = Some("hello".into());
        post.username = Some("alice".into());
        post.hashtags = vec!["rust".into()];
        post.bookmarks = 7;
        post.likes = 3;
        post.views = Some(99);
        post.is_pinned = true;
        post.photos = vec![Photo {
            id: "p1".into(),
            url: "https://pbs.twimg.com/media/p1.jpg".into(),
            alt_text: None,
        }];
        post
    }

    #[test]
    fn projects_exactly_the_public_fields() {
        let view = serde_json::to_value(PostView::from(record("1"))).unwrap();
        let mut keys: Vec<&str> = view.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "id",
                "isPinned",
                "isRetweet",
                "likes",
                "permanentUrl",
                "photos",
                "replies",
                "retweets",
                "text",
                "timestamp",
                "videos",
                "views",
            ]
        );
        assert_eq!(view["likes"], 3);
        assert_eq!(view["views"], 99);
        assert_eq!(view["isPinned"], true);
        assert_eq!(view["photos"][0]["url"], "https://pbs.twimg.com/media/p1.jpg");
    }

    #[test]
    fn count_matches_posts_and_order_is_kept() {
        let response = ScrapeResponse::from_posts(vec![record("3"), record("1"), record("2")]);
        assert!(response.success);
        assert_eq!(response.count, response.tweets.len());
        let ids: Vec<&str> = response.tweets.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
    }

    #[test]
    fn empty_result_is_still_a_success() {
        let body = serde_json::to_value(ScrapeResponse::from_posts(vec![])).unwrap();
        assert_eq!(body, serde_json::json!({ "success": true, "count": 0, "tweets": [] }));
    }
}
