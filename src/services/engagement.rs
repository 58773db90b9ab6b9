//! Community feed: posts, comments, and per-user likes

use std::sync::Arc;

use crate::model::{Comment, LikeOutcome, NewComment, NewPost, Post};
use crate::store::EntityStore;
use crate::types::{ApiError, Result};

#[derive(Clone)]
pub struct EngagementService {
    store: Arc<dyn EntityStore>,
}

impl EngagementService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Publish a post. Content must be non-empty after trimming.
    pub async fn create_post(&self, new: NewPost) -> Result<Post> {
        if new.content.trim().is_empty() {
            return Err(ApiError::BadRequest(
                "Post content cannot be empty".to_string(),
            ));
        }
        self.store.create_post(new).await
    }

    /// The whole feed, newest first.
    pub async fn feed(&self) -> Result<Vec<Post>> {
        self.store.all_posts().await
    }

    /// One author's posts, newest first.
    pub async fn posts_by(&self, user_id: i32) -> Result<Vec<Post>> {
        self.store.posts_by_user_id(user_id).await
    }

    pub async fn post(&self, post_id: i32) -> Result<Post> {
        self.store
            .post_by_id(post_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))
    }

    /// Toggle the caller's like on a post. Liking twice unlikes.
    pub async fn toggle_like(&self, post_id: i32, user_id: i32) -> Result<LikeOutcome> {
        self.store.toggle_post_like(post_id, user_id).await
    }

    /// Attach a comment and bump the post's comment counter.
    pub async fn add_comment(&self, post_id: i32, user_id: i32, content: String) -> Result<Comment> {
        if content.trim().is_empty() {
            return Err(ApiError::BadRequest(
                "Comment content cannot be empty".to_string(),
            ));
        }
        self.store
            .create_comment(NewComment {
                post_id,
                user_id,
                content,
            })
            .await
    }

    /// A post's comments, oldest first.
    pub async fn comments(&self, post_id: i32) -> Result<Vec<Comment>> {
        if self.store.post_by_id(post_id).await?.is_none() {
            return Err(ApiError::NotFound("Post not found".to_string()));
        }
        self.store.comments_by_post_id(post_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewUser, PostType, Role};
    use crate::store::MemoryStore;

    async fn service_with_author() -> (EngagementService, i32) {
        let store = Arc::new(MemoryStore::new());
        let author = store
            .create_user(NewUser {
                username: "pat".to_string(),
                password: "hash".to_string(),
                name: "Pat Smith".to_string(),
                email: "pat@example.com".to_string(),
                bio: None,
                profile_image: None,
                cover_image: None,
                role: Role::Patient,
            })
            .await
            .unwrap();
        (EngagementService::new(store), author.id)
    }

    fn post_body(user_id: i32, content: &str) -> NewPost {
        NewPost {
            user_id,
            content: content.to_string(),
            image: None,
            is_anonymous: false,
            post_type: Some(PostType::Question),
            related_conditions: None,
        }
    }

    #[tokio::test]
    async fn post_starts_with_zero_counters() {
        let (svc, author) = service_with_author().await;

        let post = svc
            .create_post(post_body(author, "Anyone tried the new clinic?"))
            .await
            .unwrap();
        assert_eq!(post.likes, 0);
        assert_eq!(post.comment_count, 0);
    }

    #[tokio::test]
    async fn blank_content_is_rejected() {
        let (svc, author) = service_with_author().await;

        let err = svc.create_post(post_body(author, "   ")).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let post = svc.create_post(post_body(author, "hello")).await.unwrap();
        let err = svc
            .add_comment(post.id, author, "  \n ".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn like_toggles_on_and_off() {
        let (svc, author) = service_with_author().await;
        let post = svc.create_post(post_body(author, "hello")).await.unwrap();

        let liked = svc.toggle_like(post.id, author).await.unwrap();
        assert_eq!(liked, LikeOutcome { liked: true, likes: 1 });

        let unliked = svc.toggle_like(post.id, author).await.unwrap();
        assert_eq!(
            unliked,
            LikeOutcome {
                liked: false,
                likes: 0
            }
        );
    }

    #[tokio::test]
    async fn comment_bumps_counter() {
        let (svc, author) = service_with_author().await;
        let post = svc.create_post(post_body(author, "hello")).await.unwrap();

        svc.add_comment(post.id, author, "first".to_string())
            .await
            .unwrap();
        svc.add_comment(post.id, author, "second".to_string())
            .await
            .unwrap();

        assert_eq!(svc.post(post.id).await.unwrap().comment_count, 2);

        let comments = svc.comments(post.id).await.unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].content, "first");
        assert_eq!(comments[1].content, "second");
    }

    #[tokio::test]
    async fn engagement_on_missing_post_is_not_found() {
        let (svc, author) = service_with_author().await;

        assert!(matches!(
            svc.toggle_like(42, author).await.unwrap_err(),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            svc.add_comment(42, author, "hi".to_string()).await.unwrap_err(),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            svc.comments(42).await.unwrap_err(),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            svc.post(42).await.unwrap_err(),
            ApiError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn feed_is_newest_first() {
        let (svc, author) = service_with_author().await;

        svc.create_post(post_body(author, "first")).await.unwrap();
        svc.create_post(post_body(author, "second")).await.unwrap();
        svc.create_post(post_body(author, "third")).await.unwrap();

        let feed = svc.feed().await.unwrap();
        let contents: Vec<&str> = feed.iter().map(|p| p.content.as_str()).collect();
        assert_eq!(contents, vec!["third", "second", "first"]);

        let by_author = svc.posts_by(author).await.unwrap();
        assert_eq!(by_author.len(), 3);
    }
}
