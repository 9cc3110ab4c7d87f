//! Representative models for hybridsim.
//!
//! A controller, a plant and a disturbance that together form a closed feedback loop, plus a
//! couple of simple signal sources for driving them in isolation.

pub mod components;
