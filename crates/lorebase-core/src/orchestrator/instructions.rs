//! Base system instructions for the conversation modes.

use lorebase_config::AgentConfig;

/// System instruction for the agentic mode.
const AGENT_INSTRUCTION: &str = "\
You are the agent for a personal note vault. You can create, read, update, \
delete, and organize the user's notes, folders, and templates through the \
provided tools. Use tools to act on the vault, verify what exists before \
changing it, and finish with a short plain-text summary of what you did, \
naming any note ids you created or changed. If a tool reports an error, \
explain the failure instead of pretending it worked.";

/// System instruction for the drafting mode.
pub(crate) const DRAFT_INSTRUCTION: &str = "\
You are a writing copilot for a personal note vault. Continue, rewrite, or \
tighten the user's text in their own voice. Reply with the improved text \
only, without preamble or commentary.";

/// Assemble the agent instruction, honoring the configured addition.
pub(crate) fn agent_instruction(config: &AgentConfig) -> String {
    match &config.additional_instruction_prompt {
        Some(extra) if !extra.trim().is_empty() => {
            format!("{AGENT_INSTRUCTION}\n\n{extra}")
        }
        _ => AGENT_INSTRUCTION.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::agent_instruction;
    use lorebase_config::AgentConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn additional_prompt_is_appended() {
        let mut config = AgentConfig::default();
        assert_eq!(agent_instruction(&config).contains("personal note vault"), true);

        config.additional_instruction_prompt = Some("Prefer short titles.".to_string());
        let instruction = agent_instruction(&config);
        assert_eq!(instruction.ends_with("Prefer short titles."), true);
    }
}
