//! External representations of posts.
//!
//! Every projection copies out of the stored [`Post`]; the stored record is never touched.

use crate::model::{
    Id,
    comment::Comment,
    date::PublicationDate,
    post::{Post, PostMarker},
};
use serde::Serialize;
use serde_json::{Map, Value};

/// Keys added by the projections. Source fields with these names are dropped
/// so the computed values win.
const COMPUTED_KEYS: [&str; 2] = ["comments_count", "comments"];

/// A post without its internal fields.
#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct PublicPost {
    pub id: Id<PostMarker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub date: PublicationDate,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<&Post> for PublicPost {
    fn from(post: &Post) -> Self {
        let extra = post
            .extra
            .iter()
            .filter(|(key, _)| !COMPUTED_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Self {
            id: post.id,
            title: post.title.clone(),
            body: post.body.clone(),
            date: post.date.clone(),
            extra,
        }
    }
}

/// List view entry: the post plus its number of comments.
#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct PostSummary {
    #[serde(flatten)]
    pub post: PublicPost,
    pub comments_count: usize,
}

impl PostSummary {
    #[must_use]
    pub fn new(post: &Post, comments_count: usize) -> Self {
        Self {
            post: post.into(),
            comments_count,
        }
    }
}

/// Single post view: the post with its ordered comments.
#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: PublicPost,
    pub comments_count: usize,
    pub comments: Vec<Comment>,
}

impl PostDetail {
    #[must_use]
    pub fn new(post: &Post, comments: Vec<Comment>) -> Self {
        Self {
            post: post.into(),
            comments_count: comments.len(),
            comments,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct PostList {
    pub posts: Vec<PostSummary>,
    pub posts_count: usize,
}

impl FromIterator<PostSummary> for PostList {
    fn from_iter<T: IntoIterator<Item = PostSummary>>(iter: T) -> Self {
        let posts: Vec<_> = iter.into_iter().collect();

        Self {
            posts_count: posts.len(),
            posts,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{
        Id,
        comment::Comment,
        date::PublicationDate,
        post::Post,
        response::{PostDetail, PostList, PostSummary},
    };
    use serde_json::{Map, json};

    fn post() -> Post {
        let mut extra = Map::new();
        extra.insert("author".to_owned(), json!("ana"));
        extra.insert("comments_count".to_owned(), json!(99));

        Post {
            id: Id::new(1),
            title: Some("Title".to_owned()),
            body: Some("Body".to_owned()),
            date: PublicationDate::parse("2020-06-01T10:00:00".to_owned()).unwrap(),
            deleted: false,
            extra,
        }
    }

    fn comment(id: u64) -> Comment {
        Comment {
            id: Id::new(id),
            post_id: Id::new(1),
            body: Some(format!("comment {id}")),
            extra: Map::new(),
        }
    }

    #[test]
    fn summary_hides_deleted_flag() {
        let value = serde_json::to_value(PostSummary::new(&post(), 3)).unwrap();

        assert_eq!(
            value,
            json!({
                "id": 1,
                "title": "Title",
                "body": "Body",
                "date": "2020-06-01T10:00:00",
                "author": "ana",
                "comments_count": 3,
            })
        );
    }

    #[test]
    fn detail_counts_its_comments() {
        let detail = PostDetail::new(&post(), vec![comment(2), comment(1)]);
        assert_eq!(detail.comments_count, 2);

        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["comments_count"], json!(2));
        assert_eq!(value["comments"][0]["id"], json!(2));
        assert_eq!(value["comments"][1]["id"], json!(1));
        assert!(value.get("deleted").is_none());
    }

    #[test]
    fn projection_leaves_post_untouched() {
        let original = post();
        let mut detail = PostDetail::new(&original, vec![comment(1)]);
        detail.post.extra.clear();
        detail.post.title = None;

        assert_eq!(original, post());
    }

    #[test]
    fn list_counts_posts() {
        let list: PostList = [PostSummary::new(&post(), 0), PostSummary::new(&post(), 1)]
            .into_iter()
            .collect();
        assert_eq!(list.posts_count, 2);

        let empty: PostList = std::iter::empty().collect();
        assert_eq!(
            serde_json::to_value(empty).unwrap(),
            json!({ "posts": [], "posts_count": 0 })
        );
    }
}
