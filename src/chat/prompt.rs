//! System prompt sent with every completion request.

macro_rules! work_history {
    () => {
        include_str!("../../assets/work_history.md")
    };
}

macro_rules! assistant_instruction {
    () => {
        "You are Ethan's AI assistant on his portfolio website. \
Be helpful, professional, and represent Ethan well. Keep responses concise and engaging. \
Reference the work history above if relevant."
    };
}

/// Work history the assistant answers from.
pub const WORK_HISTORY: &str = work_history!();

/// Behaviour instruction appended after the work history.
pub const ASSISTANT_INSTRUCTION: &str = assistant_instruction!();

/// Full system message: work history, a blank line, then the instruction.
pub const SYSTEM_PROMPT: &str = concat!(work_history!(), "\n\n", assistant_instruction!());
