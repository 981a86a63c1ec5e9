//! Typed repositories over the raw query builder, one per table the
//! gateway touches.

use {
    serde_json::{Map, Value},
    tracing::debug,
};

use devlog_common::{Conversation, Message, NewConversation, NewMessage, NewTechNote, TechNote, User};

use crate::{
    client::{BaasClient, Order},
    error::StoreError,
};

/// JWT claims that ride along on the identity payload but are not columns.
const CLAIM_FIELDS: [&str; 4] = ["nbf", "jti", "exp", "iat"];

pub struct Users<'a>(pub &'a BaasClient);

impl Users<'_> {
    pub async fn by_id(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        let mut rows: Vec<User> = self
            .0
            .from("users")
            .select("*")
            .eq("id", user_id)
            .fetch()
            .await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.remove(0))
        })
    }

    /// Insert a user from a raw identity object, dropping the token claim
    /// fields the auth provider mixes into it.
    pub async fn create(&self, mut identity: Map<String, Value>) -> Result<User, StoreError> {
        for claim in CLAIM_FIELDS {
            if identity.remove(claim).is_some() {
                debug!(%claim, "stripped token claim from user payload");
            }
        }
        self.0.from("users").insert_single(&identity).await
    }
}

pub struct Conversations<'a>(pub &'a BaasClient);

impl Conversations<'_> {
    pub async fn create(&self, new: &NewConversation) -> Result<Conversation, StoreError> {
        self.0.from("conversations").insert_single(new).await
    }

    /// Compensating delete for partially-failed imports.
    pub async fn delete(&self, conversation_id: i64) -> Result<(), StoreError> {
        self.0
            .from("conversations")
            .eq("id", conversation_id)
            .delete()
            .await
    }
}

pub struct Messages<'a>(pub &'a BaasClient);

impl Messages<'_> {
    pub async fn by_conversation(&self, conversation_id: i64) -> Result<Vec<Message>, StoreError> {
        self.0
            .from("messages")
            .select("*")
            .eq("conversation_id", conversation_id)
            .order("sequence_number", Order::Asc)
            .fetch()
            .await
    }

    pub async fn insert(&self, rows: &[NewMessage]) -> Result<Vec<Message>, StoreError> {
        self.0.from("messages").insert(rows).await
    }
}

pub struct TechNotes<'a>(pub &'a BaasClient);

impl TechNotes<'_> {
    pub async fn create(&self, new: &NewTechNote) -> Result<TechNote, StoreError> {
        self.0.from("tech_notes").insert_single(new).await
    }

    /// Notes for a user, filtered through the owning conversation.
    pub async fn by_user(&self, user_id: i64) -> Result<Vec<TechNote>, StoreError> {
        self.0
            .from("tech_notes")
            .select("*, conversations!inner(user_id)")
            .eq("conversations.user_id", user_id)
            .fetch()
            .await
    }

    pub async fn delete(&self, note_id: i64) -> Result<(), StoreError> {
        self.0.from("tech_notes").eq("id", note_id).delete().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, secrecy::Secret, serde_json::json};

    fn client(url: &str) -> BaasClient {
        BaasClient::new(url, Secret::new("key".to_string()))
    }

    #[tokio::test]
    async fn create_user_strips_claims() {
        let mut server = mockito::Server::new_async().await;
        // Exact-body match: proves the claim fields were dropped.
        let mock = server
            .mock("POST", "/rest/v1/users")
            .match_body(mockito::Matcher::Json(json!([{
                "email": "dev@example.com",
                "name": "Dev"
            }])))
            .with_status(201)
            .with_body(
                r#"[{"id": 1, "email": "dev@example.com", "name": "Dev",
                     "created_at": "2026-02-01T00:00:00Z"}]"#,
            )
            .create_async()
            .await;

        let identity = json!({
            "email": "dev@example.com",
            "name": "Dev",
            "exp": 1760000000,
            "iat": 1750000000,
            "nbf": 1750000000,
            "jti": "token-id"
        });
        let Value::Object(map) = identity else {
            panic!("expected object");
        };

        let baas = client(&server.url());
        let user = Users(&baas).create(map).await.unwrap();
        mock.assert_async().await;
        assert_eq!(user.id, 1);
        assert_eq!(user.email, "dev@example.com");
    }

    #[tokio::test]
    async fn messages_ordered_by_sequence() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/messages")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("conversation_id".into(), "eq.7".into()),
                mockito::Matcher::UrlEncoded("order".into(), "sequence_number.asc".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"[{"id": 1, "conversation_id": 7, "message_type": "question",
                     "message_content": "q", "sequence_number": 1,
                     "created_at": "2026-02-01T00:00:00Z"}]"#,
            )
            .create_async()
            .await;

        let baas = client(&server.url());
        let rows = Messages(&baas).by_conversation(7).await.unwrap();
        mock.assert_async().await;
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn notes_by_user_uses_inner_join_filter() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/tech_notes")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded(
                    "select".into(),
                    "*, conversations!inner(user_id)".into(),
                ),
                mockito::Matcher::UrlEncoded("conversations.user_id".into(), "eq.12".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"[{"id": 3, "conversation_id": 8, "title": "t", "note_content": "",
                     "is_completed": false, "created_at": "2026-02-01T00:00:00Z",
                     "conversations": {"user_id": 12}}]"#,
            )
            .create_async()
            .await;

        let baas = client(&server.url());
        let notes = TechNotes(&baas).by_user(12).await.unwrap();
        mock.assert_async().await;
        assert_eq!(notes[0].id, 3);
    }

    #[tokio::test]
    async fn missing_user_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/v1/users")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let baas = client(&server.url());
        assert!(Users(&baas).by_id(999).await.unwrap().is_none());
    }
}
