// ABOUTME: Draft storage implementations for the customization repository port
// ABOUTME: In-memory store with optimistic concurrency on the draft's updated_at
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Sharded in-memory draft store
pub mod memory;

pub use memory::InMemoryDraftStore;
