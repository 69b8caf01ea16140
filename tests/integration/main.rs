//! Integration tests for lookout
//!
//! These tests drive `QueryResolver` end to end through its public API, with
//! the recording broker and model-query doubles from `lookout::test_helpers`
//! standing in for a real message broker and data store.

mod helpers;
mod scenarios;
