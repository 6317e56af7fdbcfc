// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! - dependency ordering of arbitrary acyclic graphs
//! - default-deny and monotonicity of the allow-graph
//! - artifact flow validation of generated pipelines

mod graph_ordering;
mod pipeline_validation;
mod security_rules;
