//! Domain entities - the core business objects.

mod comment;
mod pagination;
mod patch;
mod post;
mod tag;
mod user;

pub use comment::{Comment, CommentView, NewComment, NewCommentRecord};
pub use pagination::{DEFAULT_PAGE, DEFAULT_PER_PAGE, Paginated, Pagination};
pub use patch::Patch;
pub use post::{NewPost, NewPostRecord, Post, PostFilter, PostStatus, PostUpdate, PostView};
pub use tag::Tag;
pub use user::{NewUser, NewUserRecord, User, UserPublic, UserUpdate};
