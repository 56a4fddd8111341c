//! Persistent state

pub mod db;

pub use db::SqliteRegistry;
