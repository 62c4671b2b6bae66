use postboard_common::model::{comment::Comment, post::Post};
use serde::Deserialize;

/// Shape of the posts source: `{ "posts": [...] }`.
#[derive(Clone, Eq, PartialEq, Debug, Default, Deserialize)]
pub struct PostsDocument {
    pub posts: Vec<Post>,
}

/// Shape of the comments source: `{ "comments": [...] }`.
#[derive(Clone, Eq, PartialEq, Debug, Default, Deserialize)]
pub struct CommentsDocument {
    pub comments: Vec<Comment>,
}
