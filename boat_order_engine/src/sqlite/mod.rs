//! SQLite backend for the boat order engine.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
