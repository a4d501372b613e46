pub mod assets;
pub mod auth;
pub mod catalog;
pub mod export;
pub mod quotes;
pub mod state;
