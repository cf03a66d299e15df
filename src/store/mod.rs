//! Storage backends beyond the per-module Postgres repositories.

mod memory;

pub use memory::MemoryStore;
