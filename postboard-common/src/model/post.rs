use crate::model::{Id, date::PublicationDate};
use serde::Deserialize;
use serde_json::{Map, Value};
use time::UtcDateTime;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

/// A post as loaded from the posts document.
///
/// `deleted` is internal and never leaves the process. Only `id`, `date` and
/// `deleted` are required; fields not modelled here are kept in `extra` and
/// echoed back in responses.
#[derive(Clone, Eq, PartialEq, Debug, Deserialize)]
pub struct Post {
    pub id: Id<PostMarker>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    pub date: PublicationDate,
    pub deleted: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Post {
    /// Whether the post may be shown at `now`: not deleted and published strictly before `now`.
    #[must_use]
    pub fn is_available(&self, now: UtcDateTime) -> bool {
        !self.deleted && self.date.instant() < now
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{Id, date::PublicationDate, post::Post};
    use serde_json::{Map, json};
    use time::{Duration, macros::utc_datetime};

    fn post(date: &str, deleted: bool) -> Post {
        Post {
            id: Id::new(1),
            title: Some("Title".to_owned()),
            body: Some("Body".to_owned()),
            date: PublicationDate::parse(date.to_owned()).unwrap(),
            deleted,
            extra: Map::new(),
        }
    }

    #[test]
    fn available_when_published_in_the_past() {
        let now = utc_datetime!(2024-05-01 12:00);
        assert!(post("2024-05-01T11:59:59", false).is_available(now));
        assert!(post("1999-01-01T00:00:00", false).is_available(now));
    }

    #[test]
    fn publication_boundary_is_exclusive() {
        let now = utc_datetime!(2024-05-01 12:00);
        assert!(!post("2024-05-01T12:00:00", false).is_available(now));
        assert!(post("2024-05-01T12:00:00", false).is_available(now + Duration::nanoseconds(1)));
    }

    #[test]
    fn future_posts_are_unavailable() {
        let now = utc_datetime!(2024-05-01 12:00);
        assert!(!post("2024-05-01T12:00:01", false).is_available(now));
        assert!(!post("2999-01-01T00:00:00", false).is_available(now));
    }

    #[test]
    fn deleted_posts_are_unavailable() {
        let now = utc_datetime!(2024-05-01 12:00);
        assert!(!post("2000-01-01T00:00:00", true).is_available(now));
        assert!(!post("2999-01-01T00:00:00", true).is_available(now));
    }

    #[test]
    fn keeps_unknown_fields() {
        let post: Post = serde_json::from_value(json!({
            "id": 3,
            "title": "Hello",
            "body": "World",
            "date": "2020-01-01T00:00:00",
            "deleted": false,
            "author": "ana",
            "tags": ["a", "b"],
        }))
        .unwrap();

        assert_eq!(post.id, Id::new(3));
        assert_eq!(post.extra.get("author"), Some(&json!("ana")));
        assert_eq!(post.extra.get("tags"), Some(&json!(["a", "b"])));
        assert!(!post.extra.contains_key("deleted"));
    }

    #[test]
    fn title_and_body_are_optional() {
        let post: Post = serde_json::from_value(json!({
            "id": 1,
            "date": "2020-01-01T00:00:00",
            "deleted": false,
            "text": "hi",
        }))
        .unwrap();

        assert_eq!(post.title, None);
        assert_eq!(post.body, None);
        assert_eq!(post.extra.get("text"), Some(&json!("hi")));
    }

    #[test]
    fn requires_deleted_flag() {
        let result = serde_json::from_value::<Post>(json!({
            "id": 3,
            "title": "Hello",
            "body": "World",
            "date": "2020-01-01T00:00:00",
        }));
        assert!(result.is_err());
    }
}
