use super::output_parser::FINAL_ANSWER_MARKER;

/// A classified piece of a streamed model response
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Thought(String),
    Answer(String),
}

#[derive(Debug)]
enum State {
    /// Before the marker; holds text that may be the start of the marker
    Reasoning { held: String },
    /// After the marker; holds trailing whitespace until more text shows up
    Answering { started: bool, held: String },
}

/// Splits a streamed response at the final answer marker as the deltas arrive.
///
/// The answer segments concatenate to exactly what `output_parser::parse` extracts from the
/// complete response: the text after the first marker without surrounding whitespace.
#[derive(Debug)]
pub struct FinalAnswerScanner {
    state: State,
}

impl Default for FinalAnswerScanner {
    fn default() -> Self {
        Self {
            state: State::Reasoning {
                held: String::new(),
            },
        }
    }
}

impl FinalAnswerScanner {
    pub fn push(&mut self, delta: &str) -> Vec<Segment> {
        let mut segments = Vec::new();
        match &mut self.state {
            State::Reasoning { held } => {
                held.push_str(delta);
                if let Some(idx) = held.find(FINAL_ANSWER_MARKER) {
                    let thought = held[..idx].to_string();
                    let rest = held[idx + FINAL_ANSWER_MARKER.len()..].to_string();
                    if !thought.is_empty() {
                        segments.push(Segment::Thought(thought));
                    }
                    self.state = State::Answering {
                        started: false,
                        held: String::new(),
                    };
                    segments.extend(self.push(&rest));
                } else {
                    let split = held.len() - partial_marker_len(held);
                    let thought: String = held.drain(..split).collect();
                    if !thought.is_empty() {
                        segments.push(Segment::Thought(thought));
                    }
                }
            }
            State::Answering { started, held } => {
                let text = if *started {
                    delta
                } else {
                    delta.trim_start()
                };
                if text.is_empty() {
                    return segments;
                }
                *started = true;

                let visible = text.trim_end();
                if visible.is_empty() {
                    held.push_str(text);
                } else {
                    let mut answer = std::mem::take(held);
                    answer.push_str(visible);
                    held.push_str(&text[visible.len()..]);
                    segments.push(Segment::Answer(answer));
                }
            }
        }
        segments
    }

    /// Flush at the end of the response. Held marker prefixes were just reasoning; held
    /// trailing whitespace is dropped.
    pub fn finish(&mut self) -> Vec<Segment> {
        match std::mem::take(self).state {
            State::Reasoning { held } if !held.is_empty() => vec![Segment::Thought(held)],
            _ => Vec::new(),
        }
    }
}

/// Length of the longest suffix of `text` that is a proper prefix of the marker
fn partial_marker_len(text: &str) -> usize {
    (1..FINAL_ANSWER_MARKER.len())
        .rev()
        .find(|&len| text.ends_with(&FINAL_ANSWER_MARKER[..len]))
        .unwrap_or(0)
}
