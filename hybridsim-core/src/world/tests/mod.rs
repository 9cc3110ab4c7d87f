//! Tests exercising a world end to end.
//!
//! Each file covers one concern: declaring the graph, advancing the clock, integrating dynamic
//! models and snapshotting a running world.

#[cfg(test)]
mod scheduling;
