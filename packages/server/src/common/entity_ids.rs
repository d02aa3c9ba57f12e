//! Typed ID definitions for every pageable entity.
//!
//! # Example
//!
//! ```rust
//! use blog_core::common::{CommentId, PostId};
//!
//! let post_id = PostId::new();
//! let comment_id = CommentId::new();
//!
//! // This would be a compile error:
//! // let wrong: CommentId = post_id;
//! # let _ = (post_id, comment_id);
//! ```

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for User entities (authors, followers, notification recipients).
pub struct User;

/// Marker type for Post entities.
pub struct Post;

/// Marker type for Comment entities.
pub struct Comment;

/// Marker type for Tag entities.
pub struct Tag;

/// Marker type for Follow edges (follower -> followee).
pub struct Follow;

/// Marker type for Notification entities.
pub struct Notification;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

pub type UserId = Id<User>;

pub type PostId = Id<Post>;

pub type CommentId = Id<Comment>;

pub type TagId = Id<Tag>;

pub type FollowId = Id<Follow>;

pub type NotificationId = Id<Notification>;
