//! Scraped-conversation transcript shapes.
//!
//! The AI sidecar and the in-process scraper both produce this shape; the
//! gateway flattens it into message rows before insert.

use serde::{Deserialize, Serialize};

use crate::types::{MessageType, NewMessage};

/// One question/answer exchange from a shared conversation page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

/// A full scraped conversation, in the sidecar's wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTranscript {
    pub chat_url: String,
    pub chat_room_title: String,
    pub data: Vec<QaPair>,
}

/// Flatten Q/A pairs into alternating question/answer rows.
///
/// Pair `i` (zero-based) becomes sequence numbers `i*2 + 1` and `i*2 + 2`,
/// so the stored order reproduces the original exchange.
pub fn interleave_messages(conversation_id: i64, pairs: &[QaPair]) -> Vec<NewMessage> {
    pairs
        .iter()
        .enumerate()
        .flat_map(|(i, pair)| {
            let base = (i as i32) * 2;
            [
                NewMessage {
                    conversation_id,
                    message_type: MessageType::Question,
                    message_content: pair.question.clone(),
                    sequence_number: base + 1,
                },
                NewMessage {
                    conversation_id,
                    message_type: MessageType::Answer,
                    message_content: pair.answer.clone(),
                    sequence_number: base + 2,
                },
            ]
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn pair(q: &str, a: &str) -> QaPair {
        QaPair {
            question: q.to_string(),
            answer: a.to_string(),
        }
    }

    #[test]
    fn interleave_orders_and_numbers_messages() {
        let rows = interleave_messages(42, &[pair("q1", "a1"), pair("q2", "a2")]);
        assert_eq!(rows.len(), 4);

        assert_eq!(rows[0].sequence_number, 1);
        assert_eq!(rows[0].message_type, MessageType::Question);
        assert_eq!(rows[0].message_content, "q1");

        assert_eq!(rows[1].sequence_number, 2);
        assert_eq!(rows[1].message_type, MessageType::Answer);

        assert_eq!(rows[3].sequence_number, 4);
        assert_eq!(rows[3].message_content, "a2");
        assert!(rows.iter().all(|r| r.conversation_id == 42));
    }

    #[test]
    fn interleave_empty_input() {
        assert!(interleave_messages(1, &[]).is_empty());
    }

    #[test]
    fn interleave_keeps_empty_answers() {
        let rows = interleave_messages(1, &[pair("unanswered", "")]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].message_content, "");
    }

    #[test]
    fn transcript_decodes_sidecar_wire_format() {
        let transcript: ChatTranscript = serde_json::from_str(
            r#"{
                "chatUrl": "https://chatgpt.com/share/abc",
                "chatRoomTitle": "Borrow checker help",
                "data": [{"question": "why move?", "answer": "ownership"}]
            }"#,
        )
        .unwrap();
        assert_eq!(transcript.chat_room_title, "Borrow checker help");
        assert_eq!(transcript.data.len(), 1);
    }
}
