//! Storage backends for the domain repository traits.

pub mod persistence;
