use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

use crate::agents::base::AgentsApi;
use crate::errors::{GatewayError, GatewayResult};
use crate::models::agent::{AgentDescriptor, NewAgent};
use crate::models::content::ContentBlock;
use crate::models::message::{Message, NewMessage, Role};
use crate::models::page::Page;
use crate::models::run::{Run, RunStatus};
use crate::models::thread::ConversationThread;

/// A scripted agent service for testing the gateway.
///
/// Every operation returns its configured result and is recorded in `calls`, so
/// tests can check which steps of a pipeline actually ran.
pub struct MockAgentsApi {
    agent: GatewayResult<AgentDescriptor>,
    agent_pages: Vec<GatewayResult<Page<AgentDescriptor>>>,
    thread: GatewayResult<ConversationThread>,
    message: GatewayResult<Message>,
    runs: Mutex<Vec<GatewayResult<Run>>>,
    messages: GatewayResult<Page<Message>>,
    calls: Mutex<Vec<String>>,
    created_agents: Mutex<Vec<NewAgent>>,
    posted: Mutex<Vec<(String, NewMessage)>>,
}

pub fn thread(id: &str) -> ConversationThread {
    ConversationThread {
        id: id.to_string(),
        created_at: None,
    }
}

pub fn message(id: &str, role: Role, content: Vec<ContentBlock>) -> Message {
    Message {
        id: id.to_string(),
        thread_id: None,
        role: Some(role),
        content,
    }
}

pub fn run(status: RunStatus) -> Run {
    Run {
        id: "run_1".to_string(),
        thread_id: None,
        assistant_id: None,
        status,
        last_error: None,
    }
}

pub fn page<T>(data: Vec<T>) -> Page<T> {
    Page {
        data,
        first_id: None,
        last_id: None,
        has_more: false,
    }
}

pub fn agent(id: &str) -> AgentDescriptor {
    AgentDescriptor {
        id: id.to_string(),
        name: None,
        instructions: None,
        model: None,
        tools: Vec::new(),
        created_at: None,
    }
}

impl MockAgentsApi {
    /// A service where every step succeeds and the agent replies with `text`
    pub fn replying<S: Into<String>>(text: S) -> Self {
        Self {
            agent: Ok(agent("asst_new")),
            agent_pages: vec![Ok(page(vec![agent("asst_1")]))],
            thread: Ok(thread("thread_1")),
            message: Ok(message(
                "msg_1",
                Role::User,
                vec![ContentBlock::text("question")],
            )),
            runs: Mutex::new(vec![Ok(run(RunStatus::Completed))]),
            messages: Ok(page(vec![message(
                "msg_2",
                Role::Assistant,
                vec![ContentBlock::text(text)],
            )])),
            calls: Mutex::new(Vec::new()),
            created_agents: Mutex::new(Vec::new()),
            posted: Mutex::new(Vec::new()),
        }
    }

    pub fn with_agent(mut self, agent: GatewayResult<AgentDescriptor>) -> Self {
        self.agent = agent;
        self
    }

    pub fn with_agent_pages(mut self, pages: Vec<GatewayResult<Page<AgentDescriptor>>>) -> Self {
        self.agent_pages = pages;
        self
    }

    pub fn with_thread(mut self, thread: GatewayResult<ConversationThread>) -> Self {
        self.thread = thread;
        self
    }

    pub fn with_message(mut self, message: GatewayResult<Message>) -> Self {
        self.message = message;
        self
    }

    /// Results handed out by `create_run` and then each `get_run`, in order
    pub fn with_runs(self, runs: Vec<GatewayResult<Run>>) -> Self {
        *self.runs.lock().unwrap() = runs;
        self
    }

    pub fn with_messages(mut self, messages: GatewayResult<Page<Message>>) -> Self {
        self.messages = messages;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn created_agents(&self) -> Vec<NewAgent> {
        self.created_agents.lock().unwrap().clone()
    }

    pub fn posted(&self) -> Vec<(String, NewMessage)> {
        self.posted.lock().unwrap().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    fn next_run(&self) -> GatewayResult<Run> {
        let mut runs = self.runs.lock().unwrap();
        if runs.is_empty() {
            Err(GatewayError::RemoteCallFailure("no more runs scripted".into()))
        } else {
            runs.remove(0)
        }
    }
}

#[async_trait]
impl AgentsApi for MockAgentsApi {
    async fn create_agent(&self, agent: &NewAgent) -> GatewayResult<AgentDescriptor> {
        self.record("create_agent");
        self.created_agents.lock().unwrap().push(agent.clone());
        self.agent.clone()
    }

    async fn list_agents(&self, _after: Option<&str>) -> GatewayResult<Page<AgentDescriptor>> {
        let index = self
            .calls()
            .iter()
            .filter(|call| call.as_str() == "list_agents")
            .count();
        self.record("list_agents");
        self.agent_pages
            .get(index)
            .cloned()
            .unwrap_or_else(|| Ok(page(Vec::new())))
    }

    async fn create_thread(&self) -> GatewayResult<ConversationThread> {
        self.record("create_thread");
        self.thread.clone()
    }

    async fn create_message(
        &self,
        thread_id: &str,
        message: &NewMessage,
    ) -> GatewayResult<Message> {
        self.record("create_message");
        self.posted
            .lock()
            .unwrap()
            .push((thread_id.to_string(), message.clone()));
        self.message.clone()
    }

    async fn create_run(&self, _thread_id: &str, _agent_id: &str) -> GatewayResult<Run> {
        self.record("create_run");
        self.next_run()
    }

    async fn get_run(&self, _thread_id: &str, _run_id: &str) -> GatewayResult<Run> {
        self.record("get_run");
        self.next_run()
    }

    async fn cancel_run(&self, _thread_id: &str, _run_id: &str) -> GatewayResult<Run> {
        self.record("cancel_run");
        self.next_run()
    }

    async fn list_messages(&self, _thread_id: &str) -> GatewayResult<Page<Message>> {
        self.record("list_messages");
        self.messages.clone()
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(1)
    }
}
