use chrono::{DateTime, Utc};

use crate::types::{
    Entry, Instruction, ItemContent, Media, Photo, PostRecord, RawTweet, TimelinePage,
    TweetResult, UserTweetsData, Video,
};

/// Flatten a `UserTweets` payload into posts (timeline order) and the bottom cursor.
pub(crate) fn parse_user_tweets(data: UserTweetsData) -> TimelinePage {
    let instructions = data
        .user
        .result
        .and_then(|r| r.timeline)
        .and_then(|t| t.timeline)
        .map(|t| t.instructions)
        .unwrap_or_default();

    let mut page = TimelinePage::default();
    for instruction in instructions {
        match instruction {
            Instruction::TimelinePinEntry { entry } => collect_entry(entry, true, &mut page),
            Instruction::TimelineAddEntries { entries } => {
                for entry in entries {
                    collect_entry(entry, false, &mut page);
                }
            }
            Instruction::Other => {}
        }
    }
    page
}

fn collect_entry(entry: Entry, pinned: bool, page: &mut TimelinePage) {
    if entry.entry_id.starts_with("promoted-") {
        return;
    }

    let content = entry.content;
    if content.entry_type.as_deref() == Some("TimelineTimelineCursor") {
        if content.cursor_type.as_deref() == Some("Bottom") {
            page.next_cursor = content.value;
        }
        return;
    }

    if let Some(item) = content.item_content {
        push_item(item, pinned, page);
    }
    // Conversation modules carry several tweets per entry.
    for module_item in content.items {
        if let Some(item) = module_item.item.item_content {
            push_item(item, pinned, page);
        }
    }
}

fn push_item(item: ItemContent, pinned: bool, page: &mut TimelinePage) {
    if item.promoted_metadata.is_some() {
        return;
    }
    let Some(raw) = item
        .tweet_results
        .and_then(|r| r.result)
        .and_then(TweetResult::into_tweet)
    else {
        return;
    };
    let Some(mut post) = post_from_raw(raw) else {
        return;
    };
    if page.posts.iter().any(|p| p.id == post.id) {
        return;
    }
    post.is_pinned = pinned;
    page.posts.push(post);
}

fn post_from_raw(raw: RawTweet) -> Option<PostRecord> {
    let legacy = raw.legacy?;
    let id = raw.rest_id.or_else(|| legacy.id_str.clone())?;

    let user = raw
        .core
        .and_then(|c| c.user_results)
        .and_then(|u| u.result);
    let (username, name, author_id) = match user {
        Some(user) => {
            let screen_name = user
                .core
                .as_ref()
                .and_then(|c| c.screen_name.clone())
                .or_else(|| user.legacy.as_ref().and_then(|l| l.screen_name.clone()));
            let display_name = user
                .core
                .as_ref()
                .and_then(|c| c.name.clone())
                .or_else(|| user.legacy.as_ref().and_then(|l| l.name.clone()));
            (screen_name, display_name, user.rest_id)
        }
        None => (None, None, None),
    };

    let note_text = raw
        .note_tweet
        .and_then(|n| n.note_tweet_results)
        .and_then(|r| r.result)
        .and_then(|r| r.text);
    let time_parsed = legacy.created_at.as_deref().and_then(parse_created_at);

    let mut post = PostRecord::with_id(id);
    post.text = note_text.or(legacy.full_text);
    post.permanent_url = username
        .as_ref()
        .map(|u| format!("https://x.com/{u}/status/{}", post.id));
    post.username = username;
    post.name = name;
    post.user_id = legacy.user_id_str.or(author_id);
    post.conversation_id = legacy.conversation_id_str;
    post.timestamp = time_parsed.map(|t| t.timestamp());
    post.time_parsed = time_parsed;
    post.replies = legacy.reply_count;
    post.retweets = legacy.retweet_count;
    post.likes = legacy.favorite_count;
    post.bookmarks = legacy.bookmark_count;
    post.views = raw
        .views
        .and_then(|v| v.count)
        .and_then(|c| c.parse().ok());
    post.is_retweet = legacy.retweeted_status_result.is_some();
    post.is_reply = legacy.in_reply_to_status_id_str.is_some();
    post.is_quoted = legacy.is_quote_status;
    post.sensitive_content = legacy.possibly_sensitive;

    if let Some(entities) = legacy.entities {
        post.hashtags = entities.hashtags.into_iter().map(|h| h.text).collect();
        post.mentions = entities
            .user_mentions
            .into_iter()
            .map(|m| m.screen_name)
            .collect();
        post.urls = entities
            .urls
            .into_iter()
            .filter_map(|u| u.expanded_url)
            .collect();
    }
    if let Some(extended) = legacy.extended_entities {
        for media in extended.media {
            match media.media_type.as_str() {
                "photo" => post.photos.push(Photo {
                    id: media.id_str,
                    url: media.media_url_https,
                    alt_text: media.ext_alt_text,
                }),
                "video" | "animated_gif" => post.videos.push(video_from_media(media)),
                _ => {}
            }
        }
    }

    Some(post)
}

fn video_from_media(media: Media) -> Video {
    let url = media.video_info.and_then(|info| {
        info.variants
            .into_iter()
            .filter(|v| v.content_type.as_deref() == Some("video/mp4"))
            .max_by_key(|v| v.bitrate.unwrap_or(0))
            .map(|v| v.url)
    });
    Video {
        id: media.id_str,
        preview: media.media_url_https,
        url,
    }
}

/// Parse the legacy `created_at` format, e.g. `Wed Oct 10 20:19:24 +0000 2018`.
pub fn parse_created_at(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(raw, "%a %b %d %H:%M:%S %z %Y")
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
