//! Domain entities - the core business objects.

mod post;

mod user;

pub use post::{Post, PostId, PostUpdate, Reaction, Reactions, UnknownReaction, UserId};
pub use user::User;
