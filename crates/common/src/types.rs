//! Row types mirroring the BaaS tables.
//!
//! Field names match the table columns exactly: these structs go over the
//! wire to and from the PostgREST row API without renaming.

use {
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
};

/// Where an imported conversation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationSource {
    ChromeExtension,
    DirectLink,
}

/// Role of a single message within a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Question,
    Answer,
}

/// A registered user. Identity claims beyond these columns are stripped
/// before insert (see the store crate).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An imported chat exchange. `link` is only present for `direct_link`
/// imports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    pub user_id: i64,
    pub source: ConversationSource,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub conversation_content: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub conversation_id: i64,
    pub message_type: MessageType,
    pub message_content: String,
    pub sequence_number: i32,
    pub created_at: DateTime<Utc>,
}

/// The note artifact derived from a conversation. `notion_link` is filled
/// in once the note has been published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechNote {
    pub id: i64,
    pub conversation_id: i64,
    pub title: String,
    pub note_content: String,
    pub is_completed: bool,
    #[serde(default)]
    pub notion_link: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewConversation {
    pub user_id: i64,
    pub source: ConversationSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_content: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewMessage {
    pub conversation_id: i64,
    pub message_type: MessageType,
    pub message_content: String,
    pub sequence_number: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewTechNote {
    pub conversation_id: i64,
    pub title: String,
    pub note_content: String,
    pub is_completed: bool,
}
