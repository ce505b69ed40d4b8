use async_trait::async_trait;
use std::time::Duration;

use crate::config::DEFAULT_POLL_INTERVAL;
use crate::errors::GatewayResult;
use crate::models::agent::{AgentDescriptor, NewAgent};
use crate::models::message::{Message, NewMessage};
use crate::models::page::Page;
use crate::models::run::{Run, RunStatus};
use crate::models::thread::ConversationThread;

/// The operations the gateway needs from the remote agent service
#[async_trait]
pub trait AgentsApi: Send + Sync {
    async fn create_agent(&self, agent: &NewAgent) -> GatewayResult<AgentDescriptor>;

    /// Fetch one page of agents, starting after the given agent id
    async fn list_agents(&self, after: Option<&str>) -> GatewayResult<Page<AgentDescriptor>>;

    async fn create_thread(&self) -> GatewayResult<ConversationThread>;

    async fn create_message(&self, thread_id: &str, message: &NewMessage)
        -> GatewayResult<Message>;

    async fn create_run(&self, thread_id: &str, agent_id: &str) -> GatewayResult<Run>;

    async fn get_run(&self, thread_id: &str, run_id: &str) -> GatewayResult<Run>;

    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> GatewayResult<Run>;

    /// Messages on a thread, most recent first
    async fn list_messages(&self, thread_id: &str) -> GatewayResult<Page<Message>>;

    /// How long to wait between run status checks
    fn poll_interval(&self) -> Duration {
        DEFAULT_POLL_INTERVAL
    }

    /// Walk every page of agents
    async fn list_all_agents(&self) -> GatewayResult<Vec<AgentDescriptor>> {
        let mut agents = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let page = self.list_agents(after.as_deref()).await?;
            let next = page.next_cursor().map(str::to_string);
            agents.extend(page.data);

            match next {
                Some(cursor) if after.as_deref() != Some(cursor.as_str()) => after = Some(cursor),
                _ => return Ok(agents),
            }
        }
    }

    /// Start a run and wait until the service reports a terminal status.
    ///
    /// There is no deadline on the wait. Tool calls are not executed client side,
    /// so a run that stops in `requires_action` is cancelled once and then
    /// followed until it settles.
    async fn create_and_process_run(&self, thread_id: &str, agent_id: &str) -> GatewayResult<Run> {
        let mut run = self.create_run(thread_id, agent_id).await?;
        let mut cancel_requested = false;

        loop {
            if !run.status.is_pending() {
                return Ok(run);
            }

            if run.status == RunStatus::RequiresAction && !cancel_requested {
                tracing::warn!(
                    "Run {} requires action that cannot be handled here, cancelling",
                    run.id
                );
                run = self.cancel_run(thread_id, &run.id).await?;
                cancel_requested = true;
                continue;
            }

            tokio::time::sleep(self.poll_interval()).await;
            run = self.get_run(thread_id, &run.id).await?;
        }
    }
}
