//! Collection types used across Terrane.
//!
//! Re-exports of the AHash-backed hash collections plus the insertion-ordered
//! index collections used where iteration order is observable.

// Re-export optimized hash collections
pub use ahash::{AHashMap as HashMap, AHashSet as HashSet, RandomState};

/// Insertion-ordered map hashed with AHash.
pub type IndexMap<K, V> = indexmap::IndexMap<K, V, RandomState>;

/// Insertion-ordered set hashed with AHash.
pub type IndexSet<T> = indexmap::IndexSet<T, RandomState>;
