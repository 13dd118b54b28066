//! # Flashr Core
//!
//! The firmware upgrade decision engine.
//!
//! * **[`parser`]**: Pure parsers turning raw device output into models. No side effects.
//! * **[`selector`]**: Picks the newest local image that beats the running version.
//! * **[`orchestrator`]**: The state machine that transfers and activates an image.
//! * **[`inspector`]** and **[`upgrade`]**: One device cycle, from inspection to outcome.
//! * **[`adapters`]**: Concrete implementations of the ports in `flashr_common`.

pub mod adapters;
pub mod inspector;
pub mod orchestrator;
pub mod parser;
pub mod selector;
pub mod upgrade;
