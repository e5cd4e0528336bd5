//! Ports - trait definitions for the remote post service.
//! These are the "interfaces" that adapters must implement.

mod remote;

pub use remote::{DeletedPost, NewPost, PostPatch, PostService, RemotePost, UserService};
