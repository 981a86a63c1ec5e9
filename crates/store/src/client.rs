//! Fluent query builder over the PostgREST row API.

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Serialize, de::DeserializeOwned},
    tracing::debug,
};

use crate::error::StoreError;

/// Sort direction for `order=` clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    fn suffix(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Authenticated handle on the BaaS row API.
///
/// Cheap to clone; the underlying `reqwest::Client` is shared.
#[derive(Clone)]
pub struct BaasClient {
    http: reqwest::Client,
    base_url: String,
    service_key: Secret<String>,
}

impl BaasClient {
    pub fn new(base_url: impl Into<String>, service_key: Secret<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key,
        }
    }

    /// Start a query against `table`.
    pub fn from(&self, table: &str) -> QueryBuilder<'_> {
        QueryBuilder {
            client: self,
            table: table.to_string(),
            select: None,
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    fn endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", self.service_key.expose_secret())
            .bearer_auth(self.service_key.expose_secret())
    }
}

/// One pending query. Filters accumulate; execution happens in the
/// terminal `fetch*`/`insert*`/`delete` calls.
pub struct QueryBuilder<'a> {
    client: &'a BaasClient,
    table: String,
    select: Option<String>,
    filters: Vec<(String, String)>,
    order: Option<String>,
    limit: Option<u32>,
}

impl QueryBuilder<'_> {
    /// Column list, passed through verbatim. Embedded-relation syntax
    /// like `*, conversations!inner(user_id)` is the BaaS's to interpret.
    pub fn select(mut self, columns: &str) -> Self {
        self.select = Some(columns.to_string());
        self
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        let value = value.to_string();
        self.filters.push((column.to_string(), format!("eq.{value}")));
        self
    }

    pub fn order(mut self, column: &str, order: Order) -> Self {
        self.order = Some(format!("{column}.{}", order.suffix()));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Execute and decode all matching rows.
    pub async fn fetch<T: DeserializeOwned>(self) -> Result<Vec<T>, StoreError> {
        let params = self.query_params();
        debug!(table = %self.table, ?params, "baas select");
        let req = self
            .client
            .http
            .get(self.client.endpoint(&self.table))
            .query(&params);
        let body = send(self.client.authed(req)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Execute expecting exactly one row.
    pub async fn fetch_one<T: DeserializeOwned>(self) -> Result<T, StoreError> {
        self.limit(1)
            .fetch::<T>()
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::MissingRow)
    }

    /// Insert `rows` and return the stored representations.
    pub async fn insert<I: Serialize, T: DeserializeOwned>(
        self,
        rows: &[I],
    ) -> Result<Vec<T>, StoreError> {
        debug!(table = %self.table, count = rows.len(), "baas insert");
        let req = self
            .client
            .http
            .post(self.client.endpoint(&self.table))
            .header("Prefer", "return=representation")
            .json(rows);
        let body = send(self.client.authed(req)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Insert a single row and return its stored representation.
    pub async fn insert_single<I: Serialize, T: DeserializeOwned>(
        self,
        row: &I,
    ) -> Result<T, StoreError> {
        self.insert(std::slice::from_ref(row))
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::MissingRow)
    }

    /// Delete all rows matching the accumulated filters.
    pub async fn delete(self) -> Result<(), StoreError> {
        let params = self.query_params();
        debug!(table = %self.table, ?params, "baas delete");
        let req = self
            .client
            .http
            .delete(self.client.endpoint(&self.table))
            .query(&params);
        send(self.client.authed(req)).await?;
        Ok(())
    }

    fn query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(select) = &self.select {
            params.push(("select".to_string(), select.clone()));
        }
        params.extend(self.filters.iter().cloned());
        if let Some(order) = &self.order {
            params.push(("order".to_string(), order.clone()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}

async fn send(req: reqwest::RequestBuilder) -> Result<String, StoreError> {
    let resp = req.send().await?;
    let status = resp.status();
    let body = resp.text().await?;
    if status.is_success() {
        return Ok(body);
    }
    // PostgREST errors are JSON objects with a "message" field.
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or(body);
    Err(StoreError::Api { status, message })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, serde::Deserialize};

    #[derive(Debug, Deserialize)]
    struct Row {
        id: i64,
        name: String,
    }

    fn client(url: &str) -> BaasClient {
        BaasClient::new(url, Secret::new("test-key".to_string()))
    }

    #[tokio::test]
    async fn fetch_builds_postgrest_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/items")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("select".into(), "*".into()),
                mockito::Matcher::UrlEncoded("user_id".into(), "eq.9".into()),
                mockito::Matcher::UrlEncoded("order".into(), "id.asc".into()),
            ]))
            .match_header("apikey", "test-key")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_body(r#"[{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]"#)
            .create_async()
            .await;

        let rows: Vec<Row> = client(&server.url())
            .from("items")
            .select("*")
            .eq("user_id", 9)
            .order("id", Order::Asc)
            .fetch()
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].name, "b");
    }

    #[tokio::test]
    async fn insert_single_returns_representation() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/v1/items")
            .match_header("prefer", "return=representation")
            .with_status(201)
            .with_body(r#"[{"id": 5, "name": "created"}]"#)
            .create_async()
            .await;

        let row: Row = client(&server.url())
            .from("items")
            .insert_single(&serde_json::json!({"name": "created"}))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(row.id, 5);
    }

    #[tokio::test]
    async fn api_error_extracts_postgrest_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/v1/items")
            .with_status(409)
            .with_body(r#"{"message": "duplicate key value"}"#)
            .create_async()
            .await;

        let err = client(&server.url())
            .from("items")
            .fetch::<Row>()
            .await
            .unwrap_err();

        match err {
            StoreError::Api { status, message } => {
                assert_eq!(status.as_u16(), 409);
                assert_eq!(message, "duplicate key value");
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn fetch_one_on_empty_result_is_missing_row() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/v1/items")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let err = client(&server.url())
            .from("items")
            .eq("id", 404)
            .fetch_one::<Row>()
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn delete_sends_filters() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/rest/v1/items")
            .match_query(mockito::Matcher::UrlEncoded("id".into(), "eq.3".into()))
            .with_status(204)
            .create_async()
            .await;

        client(&server.url())
            .from("items")
            .eq("id", 3)
            .delete()
            .await
            .unwrap();
        mock.assert_async().await;
    }
}
