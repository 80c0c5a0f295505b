//! Renderer - terminal output.
//!
//! [`FrameDiffWriter`] turns frames into the minimal set of row writes;
//! [`TerminalGuard`] owns the terminal modes for the lifetime of a run.

mod diff;
mod terminal;

pub use diff::{DiffStats, FrameDiffWriter, OutputBuffer, build_output_lines};
pub use terminal::{TerminalGuard, terminal_size};
