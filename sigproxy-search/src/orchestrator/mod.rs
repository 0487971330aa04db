//! Search orchestration: UI request → backend batch → hooks → transport → UI results.

pub mod client;
pub mod hooks;
pub mod query;
pub mod response;

pub use client::SearchClient;
pub use hooks::{AfterSearchHook, BeforeSearchHook, SearchHooks};
