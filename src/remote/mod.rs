//! Backend that receives sign-ups

mod client;
mod traits;

pub use client::SimulatedRemote;
pub use traits::{SubmitError, SubmitRemote};

#[cfg(test)]
pub use traits::MockSubmitRemote;
