//! Agent loop - alternates between user input, inference and tool execution

use tracing::{debug, info};

use praktor_provider::{ChatParams, Provider, ToolCall, ToolSpec};
use praktor_session::{Conversation, SessionError};

use crate::io::{ChatOutput, LineSource};
use crate::tools::ToolRegistry;

/// Where the loop currently stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopState {
    AwaitingUserInput,
    Inferring,
    /// Calls from the latest assistant turn, run in this order
    ExecutingTools(Vec<ToolCall>),
    Terminal,
}

impl LoopState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoopState::Terminal)
    }
}

/// Single-owner conversation driver
pub struct AgentLoop<P: Provider> {
    provider: P,
    tools: ToolRegistry,
    specs: Vec<ToolSpec>,
    model: String,
    max_tokens: u32,
    conversation: Conversation,
}

impl<P: Provider> AgentLoop<P> {
    pub fn new(provider: P, tools: ToolRegistry) -> Self {
        let model = provider.default_model();
        let specs = tools.definitions();
        Self {
            provider,
            tools,
            specs,
            model,
            max_tokens: ChatParams::default().max_tokens,
            conversation: Conversation::new(),
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Drive the loop until input runs out or inference fails
    pub async fn run(
        &mut self,
        input: &mut dyn LineSource,
        output: &mut dyn ChatOutput,
    ) -> crate::Result<()> {
        info!(
            "Starting chat with model '{}' and {} tool(s)",
            self.model,
            self.specs.len()
        );

        let mut state = LoopState::AwaitingUserInput;
        while !state.is_terminal() {
            state = self.step(state, input, output).await?;
        }

        info!("Chat ended after {} message(s)", self.conversation.len());
        Ok(())
    }

    /// Perform one transition
    pub async fn step(
        &mut self,
        state: LoopState,
        input: &mut dyn LineSource,
        output: &mut dyn ChatOutput,
    ) -> crate::Result<LoopState> {
        match state {
            LoopState::AwaitingUserInput => {
                output.prompt();
                match input.next_line().await? {
                    None => {
                        debug!("End of input");
                        Ok(LoopState::Terminal)
                    }
                    Some(line) if line.trim().is_empty() => {
                        debug!("Skipping blank input line");
                        Ok(LoopState::AwaitingUserInput)
                    }
                    Some(line) => {
                        self.conversation.push_user(line)?;
                        Ok(LoopState::Inferring)
                    }
                }
            }
            LoopState::Inferring => self.infer(output).await,
            LoopState::ExecutingTools(calls) => {
                for call in &calls {
                    // Unknown names are answered with an error without being announced
                    if self.tools.has(&call.name) {
                        output.tool_call(call);
                    }
                    let result = self.tools.dispatch(call).await;
                    self.conversation.push_tool_result(call.id.as_str(), result)?;
                }
                Ok(LoopState::Inferring)
            }
            LoopState::Terminal => Ok(LoopState::Terminal),
        }
    }

    async fn infer(&mut self, output: &mut dyn ChatOutput) -> crate::Result<LoopState> {
        let pending = self.conversation.pending_tool_calls().len();
        if pending > 0 {
            return Err(SessionError::PendingToolCalls(pending).into());
        }

        let params = ChatParams {
            model: self.model.clone(),
            messages: self.conversation.messages().to_vec(),
            tools: self.specs.clone(),
            max_tokens: self.max_tokens,
        };

        debug!("Inference over {} message(s)", params.messages.len());
        let response = self.provider.chat(params).await?;

        if !response.text.is_empty() {
            output.assistant(&response.text);
        }

        if response.has_tool_calls() {
            debug!("Model requested {} tool call(s)", response.tool_calls.len());
            let calls = response.tool_calls.clone();
            self.conversation.push_assistant(response.text, response.tool_calls)?;
            return Ok(LoopState::ExecutingTools(calls));
        }

        if !response.text.is_empty() {
            self.conversation.push_assistant(response.text, Vec::new())?;
        }
        Ok(LoopState::AwaitingUserInput)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ScriptedLines;
    use async_trait::async_trait;
    use praktor_provider::{ChatResponse, ProviderError};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct Replay {
        responses: Mutex<VecDeque<praktor_provider::Result<ChatResponse>>>,
    }

    #[async_trait]
    impl Provider for Replay {
        async fn chat(&self, _params: ChatParams) -> praktor_provider::Result<ChatResponse> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(ProviderError::EmptyResponse))
        }
        fn default_model(&self) -> String {
            "replay".to_string()
        }
    }

    #[derive(Default)]
    struct Quiet;

    impl ChatOutput for Quiet {
        fn assistant(&mut self, _text: &str) {}
        fn tool_call(&mut self, _call: &ToolCall) {}
    }

    fn agent(responses: Vec<praktor_provider::Result<ChatResponse>>) -> AgentLoop<Replay> {
        let provider = Replay {
            responses: Mutex::new(responses.into()),
        };
        AgentLoop::new(provider, ToolRegistry::new())
    }

    #[tokio::test]
    async fn test_terminal_is_absorbing() {
        let mut agent = agent(vec![]);
        let mut input = ScriptedLines::new(["ignored"]);
        let state = agent
            .step(LoopState::Terminal, &mut input, &mut Quiet)
            .await
            .unwrap();
        assert_eq!(state, LoopState::Terminal);
        assert!(agent.conversation().is_empty());
    }

    #[tokio::test]
    async fn test_end_of_input_terminates() {
        let mut agent = agent(vec![]);
        let mut input = ScriptedLines::default();
        let state = agent
            .step(LoopState::AwaitingUserInput, &mut input, &mut Quiet)
            .await
            .unwrap();
        assert_eq!(state, LoopState::Terminal);
    }

    #[tokio::test]
    async fn test_empty_reply_appends_nothing() {
        let mut agent = agent(vec![Ok(ChatResponse::default())]);
        let mut input = ScriptedLines::new(["hi"]);
        agent.run(&mut input, &mut Quiet).await.unwrap();
        assert_eq!(agent.conversation().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_line_keeps_awaiting_input() {
        let mut agent = agent(vec![]);
        let mut input = ScriptedLines::new(["   "]);
        let state = agent
            .step(LoopState::AwaitingUserInput, &mut input, &mut Quiet)
            .await
            .unwrap();
        assert_eq!(state, LoopState::AwaitingUserInput);
        assert!(agent.conversation().is_empty());
    }

    #[tokio::test]
    async fn test_default_model_from_provider() {
        let agent = agent(vec![]);
        assert_eq!(agent.model(), "replay");
        assert_eq!(agent.with_model("other").model(), "other");
    }
}
