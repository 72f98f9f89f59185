//! Integration tests for plexstuff
//!
//! Runs the search service end to end: real reqwest transport, a JSON
//! service store on disk and a fake Jackett server bound to localhost.

#[path = "integration/fake_jackett.rs"]
mod fake_jackett;

#[path = "integration/jackett_search.rs"]
mod jackett_search;

#[path = "integration/credential_store.rs"]
mod credential_store;
