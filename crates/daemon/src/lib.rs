// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! orc-daemon: the long-running orchestrator process — task scheduling,
//! agent supervision, workspace/git plumbing, guardrails, quota, and the
//! PR-lifecycle automaton, wired together behind one IPC listener.

pub mod agent_lifecycle;
pub mod config;
pub mod env;
pub mod error;
pub mod event_hub;
pub mod github;
pub mod guardrails;
pub mod listener;
pub mod pr_lifecycle;
pub mod quota;
pub mod rules;
pub mod scheduler;
pub mod task_manager;
pub mod workspace;

use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use agent_lifecycle::AgentLifecycle;
use error::DaemonResult;
use event_hub::EventHub;
use github::GhCliClient;
use guardrails::Guardrails;
use quota::QuotaManager;
use rules::RulesEngine;
use scheduler::Scheduler;
use task_manager::TaskManager;
use workspace::WorkspaceManager;

/// Assembles every component from a resolved [`config::Config`] and an
/// already-migrated [`orc_storage::Store`]. Each component is constructed
/// explicitly and handed its dependencies here — no component reaches into
/// another through a global singleton.
pub struct Daemon {
    pub store: orc_storage::Store,
    pub tasks: Arc<TaskManager>,
    pub workspaces: Arc<WorkspaceManager>,
    pub quota: Arc<QuotaManager>,
    pub guardrails: Arc<Guardrails>,
    pub agents: Arc<AgentLifecycle>,
    pub events: Arc<EventHub>,
    pub scheduler: Arc<Scheduler>,
    pub pr_lifecycles: Arc<pr_lifecycle::PrLifecycleManager<GhCliClient>>,
    pub rules: Arc<RulesEngine>,
    pub config: config::Config,
}

impl Daemon {
    /// `rules` is the pre-parsed rule list; loading it from a YAML file (or
    /// anywhere else) is the caller's concern.
    pub fn new(store: orc_storage::Store, config: config::Config, rules: Vec<orc_core::Rule>) -> Self {
        let tasks = Arc::new(TaskManager::new(store.clone()));
        let workspaces = Arc::new(WorkspaceManager::new(config.workspace_pattern.clone(), Duration::from_secs(config.git_timeout_seconds)));
        let quota = Arc::new(QuotaManager::new(config.quota.clone(), store.clone()));
        let guardrails = Arc::new(Guardrails::new(config.guardrails.clone()));
        let agents = Arc::new(AgentLifecycle::new(store.clone(), workspaces.clone(), quota.clone(), guardrails.clone(), config.clone()));
        let events = Arc::new(EventHub::new());
        let scheduler = Arc::new(Scheduler::new(tasks.clone(), workspaces.clone(), quota.clone(), agents.clone(), events.clone()));
        let github = GhCliClient::new("", Duration::from_secs(20));
        let pr_lifecycles = Arc::new(pr_lifecycle::PrLifecycleManager::new(store.clone(), github, config.max_pr_iterations));
        let rules = Arc::new(RulesEngine::new(rules));

        Self { store, tasks, workspaces, quota, guardrails, agents, events, scheduler, pr_lifecycles, rules, config }
    }

    /// Runs the crash-recovery sweep, discovers workspaces, and starts the
    /// scheduler ticks, the PR-lifecycle tick, and the rules-engine event
    /// feed. Returns once `shutdown` is cancelled.
    pub async fn run(self: Arc<Self>, shutdown: CancellationToken) -> DaemonResult<()> {
        let report = self.store.recovery_sweep()?;
        info!(?report, "recovery sweep complete");
        self.workspaces.discover()?;

        let pr_shutdown = shutdown.clone();
        let pr_daemon = self.clone();
        let pr_loop = tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(pr_daemon.config.pr_lifecycle_tick_seconds));
            loop {
                tokio::select! {
                    _ = pr_shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(err) = pr_daemon.pr_lifecycles.advance_all_non_terminal().await {
                            warn!(error = %err, "pr lifecycle tick failed");
                        }
                    }
                }
            }
        });

        let rules_shutdown = shutdown.clone();
        let rules_daemon = self.clone();
        let rules_loop = tokio::spawn(async move { rules_daemon.run_rules_feed(rules_shutdown).await });

        self.scheduler
            .clone()
            .run(Duration::from_secs(self.config.main_tick_seconds), Duration::from_secs(self.config.diff_stats_tick_seconds), shutdown)
            .await;

        let _ = tokio::join!(pr_loop, rules_loop);
        Ok(())
    }

    /// Subscribes to the event hub and turns every matched [`rules::RuleAction`]
    /// into a new task, the mechanism behind the PR lifecycle's CI-failure
    /// and review-comment flows described at the module level.
    async fn run_rules_feed(self: Arc<Self>, shutdown: CancellationToken) {
        let (sub_id, mut rx) = self.events.subscribe();
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                event = rx.recv() => {
                    let Some(event) = event else { break };
                    for action in self.rules.evaluate(&event) {
                        let now = chrono::Utc::now();
                        let task = orc_core::Task::new(action.title, now).priority(action.priority);
                        if let Err(err) = self.tasks.add_task(task, now) {
                            warn!(error = %err, action_type = %action.action_type, "rule-triggered task creation failed");
                        }
                    }
                }
            }
        }
        self.events.unsubscribe(sub_id);
    }
}
