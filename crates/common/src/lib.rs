//! Shared record types for the devlog services.
//!
//! Everything in here is a plain serde shape: the relational rows served by
//! the BaaS, the insert payloads the gateway writes, and the scraped
//! conversation transcript exchanged with the AI sidecar.

pub mod transcript;
pub mod types;

pub use transcript::{ChatTranscript, QaPair, interleave_messages};
pub use types::{
    Conversation, ConversationSource, Message, MessageType, NewConversation, NewMessage,
    NewTechNote, TechNote, User,
};
