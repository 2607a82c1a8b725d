//! Progress indicators for long-running operations

use indicatif::{ProgressBar, ProgressStyle};

/// Create a spinner for indeterminate operations
///
/// Falls back to the default style if the template does not parse.
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed}] {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
