//! SeaORM entities mirroring the relational schema.

pub mod follow;
pub mod like;
pub mod post;
pub mod user;
