use crate::error::McpHealthError;
use crate::mcp::types::ToolOutput;
use crate::ui::highlight::JsonHighlighter;
use colored::*;
use serde_json::Value;

const REPORT_WIDTH: usize = 60;
const BANNER_WIDTH: usize = 70;

pub fn banner(title: &str) {
    println!("{}", "=".repeat(BANNER_WIDTH).dimmed());
    println!("{}", title.bold());
    println!("{}", "=".repeat(BANNER_WIDTH).dimmed());
}

/// Step heading followed by a rule.
pub fn step(title: &str) {
    println!("{}", title.cyan().bold());
    println!("{}", "-".repeat(BANNER_WIDTH).dimmed());
}

pub fn info(message: &str) {
    println!("{}", message);
}

pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message.green());
}

pub fn warning(message: &str) {
    println!("{} {}", "!".yellow(), message.yellow());
}

pub fn failure(error: &McpHealthError) {
    match error {
        McpHealthError::NoResponse(_) => {
            eprintln!("{} {}", "Warning:".yellow(), error);
        }
        _ => eprintln!("{} {}", "Error:".red(), error),
    }
}

/// Pretty JSON, highlighted when colour output is enabled.
pub fn render_json(value: &Value) -> String {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    if colored::control::SHOULD_COLORIZE.should_colorize() {
        JsonHighlighter::new().highlight(&format!("{}\n", pretty))
    } else {
        format!("{}\n", pretty)
    }
}

pub fn print_json(value: &Value) {
    print!("{}", render_json(value));
}

/// Print the most-decoded form of a reply.
pub fn print_tool_output(output: &ToolOutput, report_title: &str) {
    match output {
        ToolOutput::Decoded(payload) => {
            println!("{}", "=".repeat(REPORT_WIDTH));
            println!("{}", report_title.bold());
            println!("{}", "=".repeat(REPORT_WIDTH));
            print_json(payload);
            println!("{}", "=".repeat(REPORT_WIDTH));
            println!(
                "{}",
                format!("Generated {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S")).dimmed()
            );
        }
        ToolOutput::RawOuter(message) => {
            if let Some(error) = output.rpc_error() {
                let detail = error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("no message");
                warning(&format!("Server returned a JSON-RPC error: {}", detail));
            }
            print_json(message);
        }
        ToolOutput::RawText(text) => {
            println!("Response: {}", text);
        }
    }
}
