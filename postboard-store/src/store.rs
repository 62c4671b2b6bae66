use crate::document::{CommentsDocument, PostsDocument};
use postboard_common::model::{
    Id,
    comment::Comment,
    post::{Post, PostMarker},
};
use serde::de::DeserializeOwned;
use std::{
    cmp::Reverse,
    collections::{HashMap, hash_map::Entry},
    path::{Path, PathBuf},
};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Source {} does not exist or is not a regular file", .0.display())]
    SourceNotFound(PathBuf),
    #[error("Source {} could not be read: {}", .0.display(), .1)]
    SourceRead(PathBuf, #[source] std::io::Error),
    #[error("Source {} is malformed: {}", .0.display(), .1)]
    SourceParse(PathBuf, #[source] serde_json::Error),
    #[error("Post id {0} appears more than once")]
    DuplicatePostId(Id<PostMarker>),
}

/// Immutable in-memory snapshot of all posts and comments.
///
/// Built once at startup and only read afterwards, so it can be shared
/// between requests without locking.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct DataStore {
    posts: Vec<Post>,
    post_index: HashMap<Id<PostMarker>, usize>,
    comments: Vec<Comment>,
}

impl DataStore {
    pub async fn load(
        posts_path: impl AsRef<Path>,
        comments_path: impl AsRef<Path>,
    ) -> Result<Self> {
        let posts: PostsDocument = read_document(posts_path.as_ref()).await?;
        let comments: CommentsDocument = read_document(comments_path.as_ref()).await?;

        let store = Self::from_documents(posts, comments)?;
        debug!(posts = ?store.posts, comments = ?store.comments, "Loaded documents");
        info!(
            posts = store.posts.len(),
            comments = store.comments.len(),
            "Loaded data store"
        );

        Ok(store)
    }

    pub fn from_documents(posts: PostsDocument, comments: CommentsDocument) -> Result<Self> {
        let mut post_index = HashMap::with_capacity(posts.posts.len());
        for (position, post) in posts.posts.iter().enumerate() {
            match post_index.entry(post.id) {
                Entry::Occupied(_) => return Err(StoreError::DuplicatePostId(post.id)),
                Entry::Vacant(entry) => {
                    entry.insert(position);
                }
            }
        }

        Ok(Self {
            posts: posts.posts,
            post_index,
            comments: comments.comments,
        })
    }

    #[must_use]
    pub fn post(&self, id: Id<PostMarker>) -> Option<&Post> {
        self.post_index.get(&id).map(|&position| &self.posts[position])
    }

    /// All posts in source document order, regardless of availability.
    #[must_use]
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Comments on `post_id`, highest comment id first.
    #[must_use]
    pub fn comments_for(&self, post_id: Id<PostMarker>) -> Vec<&Comment> {
        let mut comments: Vec<_> = self.matching_comments(post_id).collect();
        comments.sort_by_key(|comment| Reverse(comment.id));
        comments
    }

    #[must_use]
    pub fn comment_count(&self, post_id: Id<PostMarker>) -> usize {
        self.matching_comments(post_id).count()
    }

    fn matching_comments(&self, post_id: Id<PostMarker>) -> impl Iterator<Item = &Comment> {
        self.comments
            .iter()
            .filter(move |comment| comment.post_id == post_id)
    }
}

async fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    debug!(path = %path.display(), "Reading source document");

    let is_file = fs::metadata(path)
        .await
        .is_ok_and(|metadata| metadata.is_file());
    if !is_file {
        return Err(StoreError::SourceNotFound(path.to_owned()));
    }

    let contents = fs::read(path)
        .await
        .map_err(|err| StoreError::SourceRead(path.to_owned(), err))?;

    serde_json::from_slice(&contents).map_err(|err| StoreError::SourceParse(path.to_owned(), err))
}
