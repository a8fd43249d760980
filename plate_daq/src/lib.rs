//! Device collaborators for the balance streamer.
//!
//! The only source shipped here is [`SimulatedDaq`], a dual-plate session
//! that speaks the same event protocol a live motion-capture server would:
//! one metadata event advertising channel ids, then interleaved 16-bit
//! sample batches. It exists so the rest of the stack can be exercised
//! end to end without plates on the bench.

pub mod error;
pub mod sim;

pub use error::{DaqError, Result};
pub use sim::SimulatedDaq;
