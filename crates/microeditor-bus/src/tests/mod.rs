//! Shared test doubles and behaviour scenarios for the bus.

mod behaviour;
pub(crate) mod support;
