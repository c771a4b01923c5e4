// Timed interview: static question bank, resumable session state machine,
// per-question timer, and the runtime that ties them to storage and scoring.

pub mod controller;
pub mod handlers;
pub mod questions;
pub mod runtime;
pub mod timer;
