//! Controller layer: UI events and command orchestration around the generation state machine.

pub mod events;
pub mod orchestration;
