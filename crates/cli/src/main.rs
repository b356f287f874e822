// SPDX-License-Identifier: MIT

//! `orc`: the command-line front end for `orcd`, talking to it exclusively
//! over the Unix-socket IPC protocol defined in `orc_wire`.

mod client;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use client::Client;
use orc_core::{AgentId, TaskId, TaskPriority};
use orc_wire::{Request, Response};

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_GIT_HASH"));

#[derive(Parser)]
#[command(name = "orc", version = VERSION, about = "control the local coding-agent orchestrator")]
struct Cli {
    #[arg(long, env = "ORC_SOCKET_PATH", default_value = "/tmp/orcd.sock")]
    socket: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Task operations
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },
    /// Agent operations
    Agent {
        #[command(subcommand)]
        action: AgentAction,
    },
    /// List discovered workspaces
    Workspaces,
    /// PR lifecycle operations
    Pr {
        #[command(subcommand)]
        action: PrAction,
    },
    /// Check the daemon is alive
    Ping,
    /// Stream events as they're broadcast
    Watch,
}

#[derive(Subcommand)]
enum TaskAction {
    Add {
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, value_enum, default_value = "normal")]
        priority: PriorityArg,
        #[arg(long, default_value = "")]
        branch: String,
        #[arg(long, num_args = 0.., value_delimiter = ',')]
        depends_on: Vec<TaskId>,
    },
    Get {
        task_id: TaskId,
    },
    List,
    Cancel {
        task_id: TaskId,
    },
    Retry {
        task_id: TaskId,
    },
}

#[derive(Subcommand)]
enum AgentAction {
    List,
    Get { agent_id: String },
}

#[derive(Subcommand)]
enum PrAction {
    List,
    Get { id: i64 },
    /// Opens the PR on the hosting platform for a lifecycle still in prechecks.
    Create { id: i64 },
    /// Runs one step of the stage automaton (normally driven by the daemon's PR tick).
    Advance { id: i64 },
    /// Marks a lifecycle ready for human review.
    MarkReady { id: i64 },
}

#[derive(Clone, clap::ValueEnum)]
enum PriorityArg {
    Critical,
    High,
    Normal,
    Low,
}

impl From<PriorityArg> for TaskPriority {
    fn from(value: PriorityArg) -> Self {
        match value {
            PriorityArg::Critical => TaskPriority::Critical,
            PriorityArg::High => TaskPriority::High,
            PriorityArg::Normal => TaskPriority::Normal,
            PriorityArg::Low => TaskPriority::Low,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new(cli.socket);

    let request = match cli.command {
        Command::Task { action } => match action {
            TaskAction::Add { title, description, priority, branch, depends_on } => {
                Request::AddTask { title, description, priority: priority.into(), branch, depends_on }
            }
            TaskAction::Get { task_id } => Request::GetTask { task_id },
            TaskAction::List => Request::ListTasks,
            TaskAction::Cancel { task_id } => Request::CancelTask { task_id },
            TaskAction::Retry { task_id } => Request::RetryTask { task_id },
        },
        Command::Agent { action } => match action {
            AgentAction::List => Request::ListAgents,
            AgentAction::Get { agent_id } => Request::GetAgent { agent_id: AgentId::from(agent_id.as_str()) },
        },
        Command::Workspaces => Request::ListWorkspaces,
        Command::Pr { action } => match action {
            PrAction::List => Request::ListPrLifecycles,
            PrAction::Get { id } => Request::GetPrLifecycle { id },
            PrAction::Create { id } => Request::CreatePr { id },
            PrAction::Advance { id } => Request::AdvancePr { id },
            PrAction::MarkReady { id } => Request::MarkPrReady { id },
        },
        Command::Ping => Request::Ping,
        Command::Watch => {
            client.subscribe(|event| println!("{}", serde_json::to_string(&event).unwrap_or_default())).await?;
            return Ok(());
        }
    };

    let response = client.call(request).await?;
    print_response(response)
}

fn print_response(response: Response) -> Result<()> {
    match response {
        Response::Error { message } => bail!(message),
        other => {
            println!("{}", serde_json::to_string_pretty(&other)?);
            Ok(())
        }
    }
}
