//! These models represent the objects passed around by the agent
//!
//! There are a few related formats we need to interact with:
//! - vercel useChat messages, sent from the interface to the server
//! - openai-compatible chat messages, sent from the agent to the LLM
//! - agent events and steps, reported back to the interface
//!
//! Incoming data is converted into these structs right away; the provider converts them
//! to the wire format at the last moment.
pub mod event;
pub mod message;
pub mod role;
pub mod step;
