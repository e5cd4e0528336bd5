//! State owners: the normalized post collection and the flat user directory.

mod posts;

mod users;

pub use posts::{LoadStatus, MergePolicy, PostStore, PostsState};
pub use users::UserDirectory;
