//! Platform adaptation for command-step payloads.
//!
//! Plans come back Unix-flavored regardless of the host. Unix runs payloads
//! unchanged; Windows rewrites the handful of patterns the planner tends to
//! emit.

/// What to do with a command payload on the current platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandAction {
    /// Run the (possibly rewritten) command line.
    Run(String),
    /// Do not run anything; report success with the given note.
    Skip(&'static str),
}

/// Adapt a command line for the current platform.
pub fn adapt_command(command: &str) -> CommandAction {
    if cfg!(windows) {
        adapt_windows_command(command)
    } else {
        CommandAction::Run(command.to_string())
    }
}

/// Windows rewrite rules, split out so they are testable on any platform.
///
/// - `chmod` has no Windows equivalent and is skipped as a successful no-op.
/// - A `./` prefix is dropped.
/// - A leading `python3` becomes `python`, which is what Windows installs
///   expose.
/// - Parts of `&&` chains are trimmed of stray whitespace.
pub fn adapt_windows_command(command: &str) -> CommandAction {
    if command.starts_with("chmod") {
        return CommandAction::Skip("chmod has no effect on Windows");
    }
    let mut adapted = command.strip_prefix("./").unwrap_or(command).to_string();
    if adapted == "python3" || adapted.starts_with("python3 ") {
        adapted = format!("python{}", &adapted["python3".len()..]);
    }
    if adapted.contains("&&") {
        let parts: Vec<&str> = adapted.split("&&").map(str::trim).collect();
        adapted = parts.join(" && ");
    }
    CommandAction::Run(adapted)
}
