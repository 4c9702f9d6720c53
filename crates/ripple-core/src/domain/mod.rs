//! Domain entities - the core business objects.

mod engagement;

mod post;

mod user;

pub use engagement::{Follow, FollowToggle, Like, LikeToggle};
pub use post::{Post, PostView};
pub use user::{Profile, User, UserSummary};
