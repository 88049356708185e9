//! Form rendering module
//!
//! - `field_renderer`: single field with its error line
//! - `signup_form`: the sign-up form itself

mod field_renderer;
mod signup_form;

pub use signup_form::{draw_signup, FORM_HEIGHT};
