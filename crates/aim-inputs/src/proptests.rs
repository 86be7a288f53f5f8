//! Property-based tests for derived parameters.
