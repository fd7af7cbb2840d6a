//! Unit tests for chatgraph-cli, organized by module.
//!
//! Each submodule documents the behaviour under test.

mod calculator;
mod config;
