//! Property-based tests for the store's link invariant.
