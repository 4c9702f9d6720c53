//! Core services: feed composition, like/follow toggling, post creation,
//! and profile reads. Each service holds repository ports and carries no
//! state of its own, so any store implementation can back them.

mod feed;
mod post;
mod profile;
mod toggle;

pub use feed::FeedComposer;
pub use post::PostService;
pub use profile::ProfileService;
pub use toggle::ToggleEngine;
