pub mod listing;
pub mod model;

// Re-export commonly used types/functions for the binaries
pub use listing::{listing, render_text, Entry};
pub use model::{load_raw_bin, Image};
