// Fallback content served when a bundle cannot be minified

const DIAGNOSTICS_HEADER: &str = "An error occurred during minification, see errors below - returning concatenated content unminified.";

const FAULT_HEADER: &str = "An error occurred while building this bundle. Detailed diagnostics are available in the diagnostic log.";

/// Unminified content prefixed by a comment listing minifier diagnostics
pub fn diagnostics_fallback(diagnostics: &[String], concatenated: &str) -> String {
    let mut out = String::with_capacity(concatenated.len() + 256);
    out.push_str("/* ");
    out.push_str(DIAGNOSTICS_HEADER);
    out.push('\n');
    for message in diagnostics {
        out.push_str(&comment_safe(message));
        out.push('\n');
    }
    out.push_str("*/\n");
    out.push_str(concatenated);
    out
}

/// Unminified content prefixed by a comment that reveals nothing about the fault
pub fn fault_fallback(concatenated: &str) -> String {
    format!("/* {} */\n{}", FAULT_HEADER, concatenated)
}

/// Keep a message from closing the surrounding block comment early
fn comment_safe(message: &str) -> String {
    message.replace("*/", "* /")
}
