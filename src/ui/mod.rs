pub mod highlight;
pub mod output;

pub use output::{print_tool_output, render_json};
