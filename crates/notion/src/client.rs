//! Client for the official Notion API.

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
    serde_json::{Value, json},
    tracing::debug,
};

use crate::error::NotionError;

const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";

/// A rendered page: the page object plus all of its child blocks. This is
/// the record-map analogue the sidecar serves to the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    pub page: Value,
    pub blocks: Vec<Value>,
}

/// Inputs for page creation in the configured database.
#[derive(Debug, Clone)]
pub struct CreatePage {
    pub database_id: String,
    pub title: String,
    pub children: Vec<Value>,
    pub question_type: Vec<String>,
    pub os_tags: Vec<String>,
    pub framework_tags: Vec<String>,
    pub language_tags: Vec<String>,
    pub tech_stack_tags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedPage {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub public_url: Option<String>,
}

#[derive(Clone)]
pub struct NotionClient {
    http: reqwest::Client,
    base_url: String,
    token: Secret<String>,
}

impl NotionClient {
    pub fn new(token: Secret<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            token,
        }
    }

    /// Point the client at a different API host (tests, proxies).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub async fn retrieve_page(&self, page_id: &str) -> Result<Value, NotionError> {
        let url = format!("{}/pages/{page_id}", self.base_url);
        self.get(&url, &[]).await
    }

    /// All child blocks of `block_id`, following cursor pagination to
    /// exhaustion.
    pub async fn list_block_children(&self, block_id: &str) -> Result<Vec<Value>, NotionError> {
        let url = format!("{}/blocks/{block_id}/children", self.base_url);
        let mut blocks = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut params = vec![("page_size".to_string(), "100".to_string())];
            if let Some(cursor) = &cursor {
                params.push(("start_cursor".to_string(), cursor.clone()));
            }
            let page: Value = self.get(&url, &params).await?;

            if let Some(results) = page.get("results").and_then(Value::as_array) {
                blocks.extend(results.iter().cloned());
            }

            let has_more = page.get("has_more").and_then(Value::as_bool).unwrap_or(false);
            if !has_more {
                break;
            }
            cursor = page
                .get("next_cursor")
                .and_then(Value::as_str)
                .map(String::from);
            if cursor.is_none() {
                break;
            }
        }

        Ok(blocks)
    }

    /// Page object plus fully-paginated children.
    pub async fn render_page(&self, page_id: &str) -> Result<PageRecord, NotionError> {
        let page = self.retrieve_page(page_id).await?;
        let blocks = self.list_block_children(page_id).await?;
        debug!(%page_id, blocks = blocks.len(), "rendered notion page");
        Ok(PageRecord { page, blocks })
    }

    pub async fn create_page(&self, input: &CreatePage) -> Result<CreatedPage, NotionError> {
        let body = json!({
            "parent": { "database_id": input.database_id },
            "properties": {
                "title": { "title": [{ "text": { "content": input.title } }] },
                "Question_Type": { "multi_select": multi_select(&input.question_type) },
                "OS_Tags": { "multi_select": multi_select(&input.os_tags) },
                "Framework_Tags": { "multi_select": multi_select(&input.framework_tags) },
                "Language_Tags": { "multi_select": multi_select(&input.language_tags) },
                "Tech_Stack_Tags": { "multi_select": multi_select(&input.tech_stack_tags) },
            },
            "children": input.children,
        });

        let url = format!("{}/pages", self.base_url);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(self.token.expose_secret())
            .header("Notion-Version", NOTION_VERSION)
            .json(&body)
            .send()
            .await?;
        let value: Value = check(resp).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn get(&self, url: &str, params: &[(String, String)]) -> Result<Value, NotionError> {
        let resp = self
            .http
            .get(url)
            .query(params)
            .bearer_auth(self.token.expose_secret())
            .header("Notion-Version", NOTION_VERSION)
            .send()
            .await?;
        check(resp).await
    }
}

fn multi_select(tags: &[String]) -> Vec<Value> {
    tags.iter().map(|tag| json!({ "name": tag })).collect()
}

async fn check(resp: reqwest::Response) -> Result<Value, NotionError> {
    let status = resp.status();
    let body = resp.text().await?;
    let value: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    if status.is_success() {
        return Ok(value);
    }
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or(body);
    Err(NotionError::Api { status, message })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn client(url: &str) -> NotionClient {
        NotionClient::new(Secret::new("secret-token".to_string())).with_base_url(url)
    }

    #[tokio::test]
    async fn block_children_follow_pagination() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("GET", "/blocks/abc/children")
            .match_query(mockito::Matcher::UrlEncoded("page_size".into(), "100".into()))
            .match_header("notion-version", NOTION_VERSION)
            .with_status(200)
            .with_body(
                r#"{"results": [{"id": "b1"}], "has_more": true, "next_cursor": "cur-2"}"#,
            )
            .create_async()
            .await;
        let second = server
            .mock("GET", "/blocks/abc/children")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("page_size".into(), "100".into()),
                mockito::Matcher::UrlEncoded("start_cursor".into(), "cur-2".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"results": [{"id": "b2"}], "has_more": false, "next_cursor": null}"#)
            .create_async()
            .await;

        let blocks = client(&server.url()).list_block_children("abc").await.unwrap();
        first.assert_async().await;
        second.assert_async().await;
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1]["id"], "b2");
    }

    #[tokio::test]
    async fn create_page_sends_properties_and_children() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/pages")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "parent": { "database_id": "db-1" },
                "properties": {
                    "title": { "title": [{ "text": { "content": "My note" } }] },
                    "OS_Tags": { "multi_select": [{ "name": "linux" }] },
                },
            })))
            .with_status(200)
            .with_body(r#"{"id": "page-1", "url": "https://notion.so/page-1"}"#)
            .create_async()
            .await;

        let created = client(&server.url())
            .create_page(&CreatePage {
                database_id: "db-1".to_string(),
                title: "My note".to_string(),
                children: crate::blocks::markdown_to_blocks("# hi"),
                question_type: vec![],
                os_tags: vec!["linux".to_string()],
                framework_tags: vec![],
                language_tags: vec![],
                tech_stack_tags: vec![],
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(created.id, "page-1");
        assert_eq!(created.url.as_deref(), Some("https://notion.so/page-1"));
    }

    #[tokio::test]
    async fn api_error_carries_notion_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/pages/missing")
            .with_status(404)
            .with_body(r#"{"object": "error", "message": "Could not find page"}"#)
            .create_async()
            .await;

        let err = client(&server.url()).retrieve_page("missing").await.unwrap_err();
        match err {
            NotionError::Api { status, message } => {
                assert_eq!(status.as_u16(), 404);
                assert_eq!(message, "Could not find page");
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn render_page_combines_page_and_blocks() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/pages/p1")
            .with_status(200)
            .with_body(r#"{"id": "p1", "object": "page"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/blocks/p1/children")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"results": [{"id": "b1"}], "has_more": false}"#)
            .create_async()
            .await;

        let record = client(&server.url()).render_page("p1").await.unwrap();
        assert_eq!(record.page["id"], "p1");
        assert_eq!(record.blocks.len(), 1);
    }
}
