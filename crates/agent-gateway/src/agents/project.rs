use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::base::AgentsApi;
use crate::config::{DEFAULT_API_VERSION, DEFAULT_POLL_INTERVAL};
use crate::connection::ConnectionString;
use crate::credentials::{AccessToken, TokenCredential, AGENTS_SCOPE};
use crate::errors::{GatewayError, GatewayResult};
use crate::models::agent::{AgentDescriptor, NewAgent};
use crate::models::message::{Message, NewMessage};
use crate::models::page::Page;
use crate::models::run::{NewRun, Run};
use crate::models::thread::ConversationThread;

const LIST_PAGE_SIZE: &str = "100";

/// REST client for the agents API of one AI project
pub struct ProjectClient {
    client: Client,
    endpoint: String,
    api_version: String,
    poll_interval: Duration,
    credential: Arc<dyn TokenCredential>,
    token: Mutex<Option<AccessToken>>,
}

impl ProjectClient {
    pub fn new(endpoint: &str, credential: Arc<dyn TokenCredential>) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()
            .map_err(|e| GatewayError::ConnectionFailure(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            credential,
            token: Mutex::new(None),
        })
    }

    pub fn from_connection_string(
        conn_str: &str,
        credential: Arc<dyn TokenCredential>,
    ) -> GatewayResult<Self> {
        let conn: ConnectionString = conn_str.parse()?;
        Self::new(conn.endpoint()?.as_str(), credential)
    }

    pub fn with_api_version<S: Into<String>>(mut self, api_version: S) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Resolve a token now rather than on the first call
    pub async fn authenticate(&self) -> GatewayResult<()> {
        self.ensure_auth_header().await.map(|_| ())
    }

    async fn ensure_auth_header(&self) -> GatewayResult<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|token| !token.is_expired()) {
            return Ok(format!("Bearer {}", token.token));
        }

        let token = self
            .credential
            .get_token(AGENTS_SCOPE)
            .await
            .map_err(|e| GatewayError::ConnectionFailure(e.to_string()))?;
        let header = format!("Bearer {}", token.token);
        *cached = Some(token);
        Ok(header)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path.trim_start_matches('/'))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> GatewayResult<T> {
        let auth_header = self.ensure_auth_header().await?;
        let response = request
            .query(&[("api-version", self.api_version.as_str())])
            .header("Authorization", auth_header)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            status if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() => {
                let err_text = response.text().await.unwrap_or_default();
                Err(GatewayError::RemoteCallFailure(format!(
                    "Server error: {}: {}",
                    status, err_text
                )))
            }
            status => {
                let err_text = response.text().await.unwrap_or_default();
                Err(GatewayError::RemoteCallFailure(format!(
                    "Request failed: {}: {}",
                    status, err_text
                )))
            }
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> GatewayResult<T> {
        self.send(self.client.get(self.url(path)).query(query)).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> GatewayResult<T> {
        self.send(self.client.post(self.url(path)).json(body)).await
    }
}

#[async_trait]
impl AgentsApi for ProjectClient {
    async fn create_agent(&self, agent: &NewAgent) -> GatewayResult<AgentDescriptor> {
        self.post("assistants", agent).await
    }

    async fn list_agents(&self, after: Option<&str>) -> GatewayResult<Page<AgentDescriptor>> {
        let mut query = vec![("limit", LIST_PAGE_SIZE), ("order", "desc")];
        if let Some(after) = after {
            query.push(("after", after));
        }
        self.get("assistants", &query).await
    }

    async fn create_thread(&self) -> GatewayResult<ConversationThread> {
        self.post("threads", &json!({})).await
    }

    async fn create_message(
        &self,
        thread_id: &str,
        message: &NewMessage,
    ) -> GatewayResult<Message> {
        self.post(&format!("threads/{}/messages", thread_id), message)
            .await
    }

    async fn create_run(&self, thread_id: &str, agent_id: &str) -> GatewayResult<Run> {
        let body = NewRun {
            assistant_id: agent_id.to_string(),
        };
        self.post(&format!("threads/{}/runs", thread_id), &body).await
    }

    async fn get_run(&self, thread_id: &str, run_id: &str) -> GatewayResult<Run> {
        self.get(&format!("threads/{}/runs/{}", thread_id, run_id), &[])
            .await
    }

    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> GatewayResult<Run> {
        self.post(
            &format!("threads/{}/runs/{}/cancel", thread_id, run_id),
            &json!({}),
        )
        .await
    }

    async fn list_messages(&self, thread_id: &str) -> GatewayResult<Page<Message>> {
        self.get(
            &format!("threads/{}/messages", thread_id),
            &[("order", "desc")],
        )
        .await
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::StaticCredential;
    use crate::models::run::RunStatus;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PROJECT_PATH: &str = "/agents/v1.0/subscriptions/sub/resourceGroups/rg/providers/Microsoft.MachineLearningServices/workspaces/proj";

    fn client_for(server: &MockServer) -> ProjectClient {
        let conn_str = format!("{};sub;rg;proj", server.uri());
        ProjectClient::from_connection_string(&conn_str, Arc::new(StaticCredential::new("test_token")))
            .unwrap()
            .with_poll_interval(Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_create_agent() -> GatewayResult<()> {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("{}/assistants", PROJECT_PATH)))
            .and(query_param("api-version", DEFAULT_API_VERSION))
            .and(header("Authorization", "Bearer test_token"))
            .and(body_json(json!({
                "name": "helper",
                "instructions": "Be brief.",
                "model": "gpt-4o"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "asst_1",
                "object": "assistant",
                "name": "helper",
                "instructions": "Be brief.",
                "model": "gpt-4o",
                "tools": [],
                "created_at": 1735689600
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let agent = NewAgent::new("helper", "Be brief.").with_model(Some("gpt-4o".to_string()));
        let created = client_for(&mock_server).create_agent(&agent).await?;

        assert_eq!(created.id, "asst_1");
        assert_eq!(created.name.as_deref(), Some("helper"));
        assert_eq!(created.created_at, Some(1735689600));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_all_agents_follows_pages() -> GatewayResult<()> {
        let mock_server = MockServer::start().await;
        let agents_path = format!("{}/assistants", PROJECT_PATH);

        Mock::given(method("GET"))
            .and(path(agents_path.clone()))
            .and(query_param("after", "asst_2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "data": [{"id": "asst_3"}],
                "first_id": "asst_3",
                "last_id": "asst_3",
                "has_more": false
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path(agents_path))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "data": [{"id": "asst_1"}, {"id": "asst_2"}],
                "first_id": "asst_1",
                "last_id": "asst_2",
                "has_more": true
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let agents = client_for(&mock_server).list_all_agents().await?;
        let ids: Vec<&str> = agents.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["asst_1", "asst_2", "asst_3"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_and_process_run_polls_until_done() -> GatewayResult<()> {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("{}/threads/thread_1/runs", PROJECT_PATH)))
            .and(body_json(json!({"assistant_id": "asst_1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "run_1",
                "status": "queued"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("{}/threads/thread_1/runs/run_1", PROJECT_PATH)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "run_1",
                "status": "in_progress"
            })))
            .up_to_n_times(2)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("{}/threads/thread_1/runs/run_1", PROJECT_PATH)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "run_1",
                "status": "completed"
            })))
            .mount(&mock_server)
            .await;

        let run = client_for(&mock_server)
            .create_and_process_run("thread_1", "asst_1")
            .await?;
        assert_eq!(run.status, RunStatus::Completed);
        Ok(())
    }

    #[tokio::test]
    async fn test_requires_action_run_is_cancelled() -> GatewayResult<()> {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("{}/threads/thread_1/runs", PROJECT_PATH)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "run_1",
                "status": "requires_action"
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path(format!("{}/threads/thread_1/runs/run_1/cancel", PROJECT_PATH)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "run_1",
                "status": "cancelling"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("{}/threads/thread_1/runs/run_1", PROJECT_PATH)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "run_1",
                "status": "cancelled"
            })))
            .mount(&mock_server)
            .await;

        let run = client_for(&mock_server)
            .create_and_process_run("thread_1", "asst_1")
            .await?;
        assert_eq!(run.status, RunStatus::Cancelled);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_messages_most_recent_first() -> GatewayResult<()> {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("{}/threads/thread_1/messages", PROJECT_PATH)))
            .and(query_param("order", "desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "data": [
                    {"id": "msg_2", "role": "assistant", "content": [{"type": "text", "text": {"value": "Hi!", "annotations": []}}]},
                    {"id": "msg_1", "role": "user", "content": [{"type": "text", "text": {"value": "Hello", "annotations": []}}]}
                ],
                "has_more": false
            })))
            .mount(&mock_server)
            .await;

        let messages = client_for(&mock_server).list_messages("thread_1").await?;
        assert_eq!(messages.data.len(), 2);
        assert_eq!(messages.data[0].id, "msg_2");
        Ok(())
    }

    #[tokio::test]
    async fn test_error_statuses_are_remote_failures() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("{}/threads", PROJECT_PATH)))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path(format!("{}/threads/thread_1/messages", PROJECT_PATH)))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such thread"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        let err = client.create_thread().await.unwrap_err();
        assert!(matches!(&err, GatewayError::RemoteCallFailure(msg) if msg.starts_with("Server error")));

        let err = client
            .create_message("thread_1", &NewMessage::user("hi"))
            .await
            .unwrap_err();
        assert!(matches!(&err, GatewayError::RemoteCallFailure(msg) if msg.contains("no such thread")));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_remote_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("{}/threads", PROJECT_PATH)))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server).create_thread().await.unwrap_err();
        assert!(matches!(err, GatewayError::RemoteCallFailure(_)));
    }
}
