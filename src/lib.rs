/// gameshelf - activity feeds for a social video game catalogue
///
/// Builds merged timelines of game reviews and liked games for the users a
/// person follows, over a document-style data store.

pub mod api;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod feed;
pub mod seed;
pub mod server;
pub mod session;
pub mod store;
pub mod validation;

pub use context::AppContext;
pub use error::{ShelfError, ShelfResult};
