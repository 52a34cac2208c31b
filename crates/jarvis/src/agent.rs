mod output_parser;
mod prompt;
mod scanner;

pub use output_parser::{parse, AgentDecision, FINAL_ANSWER_MARKER};
pub use scanner::{FinalAnswerScanner, Segment};

use futures::stream::{BoxStream, Stream, StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::errors::{AgentError, AgentResult};
use crate::models::event::AgentEvent;
use crate::models::message::Message;
use crate::models::step::{AgentAction, AgentOutput, AgentStep};
use crate::providers::base::Provider;
use crate::tools::{Tool, ToolInfo};

pub const DEFAULT_MAX_ITERATIONS: usize = 15;

/// Stops the model before it invents the tool output itself
pub const STOP_SEQUENCE: &str = "Observation:";

pub const MAX_ITERATIONS_OUTPUT: &str = "Agent stopped due to max iterations.";

const INVALID_RESPONSE_OBSERVATION: &str = "Invalid or incomplete response";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunMode {
    /// Whole completions per step; only the outcome matters
    Trace,
    /// Streamed completions, reporting answer tokens as they arrive
    Stream,
}

impl From<Segment> for AgentEvent {
    fn from(segment: Segment) -> Self {
        match segment {
            Segment::Thought(text) => AgentEvent::Thought(text),
            Segment::Answer(text) => AgentEvent::FinalAnswerToken(text),
        }
    }
}

/// Agent drives a language model through a zero-shot ReAct loop over a set of tools
pub struct Agent {
    provider: Arc<dyn Provider>,
    tools: Vec<Box<dyn Tool>>,
    max_iterations: usize,
    handle_parsing_errors: bool,
}

impl Agent {
    /// Create a new Agent with the specified provider and no tools
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            tools: Vec::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            handle_parsing_errors: false,
        }
    }

    /// Add a tool to the agent
    pub fn add_tool(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn with_tools(mut self, tools: Vec<Box<dyn Tool>>) -> Self {
        self.tools.extend(tools);
        self
    }

    /// Bound the number of model calls. The bound is at least one.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    /// Feed unparseable model output back to the model instead of failing the run
    pub fn with_parsing_error_recovery(mut self, enabled: bool) -> Self {
        self.handle_parsing_errors = enabled;
        self
    }

    /// Run the loop to completion and return the answer with every step taken
    pub async fn invoke(self, history: Vec<Message>, input: String) -> AgentResult<AgentOutput> {
        let events = self.run(history, input, RunMode::Trace);
        futures::pin_mut!(events);
        while let Some(event) = events.try_next().await? {
            if let AgentEvent::Finished(output) = event {
                return Ok(output);
            }
        }
        Err(AgentError::Internal(
            "agent stopped without an output".to_string(),
        ))
    }

    /// Run the loop with streamed completions, reporting events as they happen.
    ///
    /// Dropping the stream stops the run at its next await point.
    pub fn stream(self, history: Vec<Message>, input: String) -> BoxStream<'static, AgentResult<AgentEvent>> {
        Box::pin(self.run(history, input, RunMode::Stream))
    }

    fn run(
        self,
        history: Vec<Message>,
        input: String,
        mode: RunMode,
    ) -> impl Stream<Item = AgentResult<AgentEvent>> + Send + 'static {
        async_stream::try_stream! {
            let tools: Vec<ToolInfo> = self.tools.iter().map(|tool| ToolInfo::of(tool.as_ref())).collect();
            let system = prompt::system_prompt(&tools)?;
            let stop = vec![STOP_SEQUENCE.to_string()];
            let mut steps: Vec<AgentStep> = Vec::new();
            let mut output = None;

            for iteration in 0..self.max_iterations {
                debug!(iteration, steps = steps.len(), "agent planning next step");
                let messages = prompt::build_messages(&system, &history, &input, &steps);

                let text = match mode {
                    RunMode::Trace => self.provider.complete(&messages, &stop).await?,
                    RunMode::Stream => {
                        let mut deltas = self.provider.stream(&messages, &stop).await?;
                        let mut scanner = FinalAnswerScanner::default();
                        let mut text = String::new();
                        while let Some(delta) = deltas.next().await {
                            let delta = delta?;
                            text.push_str(&delta);
                            for segment in scanner.push(&delta) {
                                yield AgentEvent::from(segment);
                            }
                        }
                        for segment in scanner.finish() {
                            yield AgentEvent::from(segment);
                        }
                        text
                    }
                };

                let decision = match parse(&text) {
                    Err(err) if self.handle_parsing_errors => {
                        warn!(error = %err, "could not parse model output, asking again");
                        let step = AgentStep {
                            action: AgentAction {
                                tool: "_Exception".to_string(),
                                tool_input: INVALID_RESPONSE_OBSERVATION.to_string(),
                                log: text,
                            },
                            observation: INVALID_RESPONSE_OBSERVATION.to_string(),
                        };
                        yield AgentEvent::Step(step.clone());
                        steps.push(step);
                        continue;
                    }
                    parsed => parsed?,
                };

                match decision {
                    AgentDecision::Finish { output: answer } => {
                        // Streamed runs already reported the answer token by token
                        if mode == RunMode::Trace && !answer.is_empty() {
                            yield AgentEvent::FinalAnswerToken(answer.clone());
                        }
                        output = Some(answer);
                        break;
                    }
                    AgentDecision::Action(action) => {
                        yield AgentEvent::Action(action.clone());
                        let observation = self.dispatch_tool_call(&action).await;
                        let step = AgentStep { action, observation };
                        yield AgentEvent::Step(step.clone());
                        steps.push(step);
                    }
                }
            }

            let output = match output {
                Some(output) => output,
                None => {
                    warn!(max_iterations = self.max_iterations, "agent stopped before a final answer");
                    yield AgentEvent::FinalAnswerToken(MAX_ITERATIONS_OUTPUT.to_string());
                    MAX_ITERATIONS_OUTPUT.to_string()
                }
            };

            info!(steps = steps.len(), "agent finished");
            yield AgentEvent::Finished(AgentOutput {
                output,
                intermediate_steps: steps,
            });
        }
    }

    /// Run the selected tool. Whatever happens becomes the observation.
    async fn dispatch_tool_call(&self, action: &AgentAction) -> String {
        let Some(tool) = self.tools.iter().find(|tool| tool.name() == action.tool) else {
            warn!(tool = %action.tool, "model selected an unknown tool");
            return format!("{} is not a valid tool, try another one.", action.tool);
        };

        debug!(tool = %action.tool, input = %action.tool_input, "invoking tool");
        match tool.invoke(&action.tool_input).await {
            Ok(output) => output,
            Err(err) => {
                warn!(tool = %action.tool, error = %err, "tool invocation failed");
                format!("Error: {}", err)
            }
        }
    }
}
