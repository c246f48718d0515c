use std::env;

/// Execution contexts that influence how logging is routed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionContext {
    /// An operator watching the terminal.
    Interactive,
    /// Output is consumed by another program (`--json`); stdout carries
    /// only the result document.
    Machine,
}

/// Derive the active execution context from the output mode plus overrides.
pub fn detect_context(json_output: bool) -> ExecutionContext {
    if json_output || machine_override_enabled() {
        ExecutionContext::Machine
    } else {
        ExecutionContext::Interactive
    }
}

fn machine_override_enabled() -> bool {
    env::var("GITSHIP_MACHINE_OUTPUT")
        .map(|value| value.trim() == "1")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_detect_context() {
        env::remove_var("GITSHIP_MACHINE_OUTPUT");
        assert_eq!(detect_context(false), ExecutionContext::Interactive);
        assert_eq!(detect_context(true), ExecutionContext::Machine);

        env::set_var("GITSHIP_MACHINE_OUTPUT", "1");
        assert_eq!(detect_context(false), ExecutionContext::Machine);
        env::remove_var("GITSHIP_MACHINE_OUTPUT");
    }
}
