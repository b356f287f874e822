// SPDX-License-Identifier: MIT

//! Unix-domain-socket IPC front door: one `Request` per line produces one
//! `Response` line; a `Subscribe` request instead keeps the connection open
//! and streams `Event` lines as they're broadcast.

use chrono::Utc;
use orc_wire::{decode_line, encode_line, Request, Response};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::Daemon;

pub async fn serve(daemon: Arc<Daemon>, socket_path: &str, shutdown: CancellationToken) -> std::io::Result<()> {
    let _ = std::fs::remove_file(socket_path);
    let listener = UnixListener::bind(socket_path)?;
    info!(socket_path, "ipc listener bound");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => {
                let (stream, _addr) = accepted?;
                let daemon = daemon.clone();
                let shutdown = shutdown.clone();
                tokio::spawn(async move {
                    if let Err(err) = handle_connection(daemon, stream, shutdown).await {
                        warn!(error = %err, "ipc connection ended with error");
                    }
                });
            }
        }
    }
    let _ = std::fs::remove_file(socket_path);
    Ok(())
}

async fn handle_connection(daemon: Arc<Daemon>, stream: UnixStream, shutdown: CancellationToken) -> std::io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let request: Request = match decode_line(&line) {
            Ok(req) => req,
            Err(err) => {
                let response = Response::Error { message: err.to_string() };
                writer.write_all(encode_line(&response).unwrap_or_default().as_bytes()).await?;
                continue;
            }
        };

        if matches!(request, Request::Subscribe) {
            let (sub_id, mut rx) = daemon.events.subscribe();
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    event = rx.recv() => {
                        match event {
                            Some(event) => {
                                let line = encode_line(&event).unwrap_or_default();
                                if writer.write_all(line.as_bytes()).await.is_err() {
                                    break;
                                }
                            }
                            None => break,
                        }
                    }
                }
            }
            daemon.events.unsubscribe(sub_id);
            return Ok(());
        }

        let response = dispatch(&daemon, request).await;
        writer.write_all(encode_line(&response).unwrap_or_default().as_bytes()).await?;
    }
    Ok(())
}

async fn dispatch(daemon: &Daemon, request: Request) -> Response {
    let now = Utc::now();
    let result: Result<Response, String> = async {
        Ok(match request {
            Request::AddTask { title, description, priority, branch, depends_on } => {
                let mut task = orc_core::Task::new(title, now).description(description).branch(branch).priority(priority);
                task = task.depends_on(depends_on);
                Response::Task(daemon.tasks.add_task(task, now).map_err(|e| e.to_string())?)
            }
            Request::GetTask { task_id } => Response::Task(daemon.tasks.get_task(task_id).map_err(|e| e.to_string())?),
            Request::ListTasks => Response::Tasks(daemon.store.list_tasks().map_err(|e| e.to_string())?),
            Request::CancelTask { task_id } => Response::Task(daemon.tasks.cancel_task(task_id, now).map_err(|e| e.to_string())?),
            Request::RetryTask { task_id } => Response::Task(daemon.tasks.retry_task(task_id).map_err(|e| e.to_string())?),
            Request::ListAgents => Response::Agents(daemon.store.list_agents().map_err(|e| e.to_string())?),
            Request::GetAgent { agent_id } => Response::Agent(daemon.store.get_agent(agent_id.as_str()).map_err(|e| e.to_string())?),
            Request::ListWorkspaces => Response::Workspaces(daemon.workspaces.list()),
            Request::ListPrLifecycles => Response::PrLifecycles(daemon.store.list_pr_lifecycles().map_err(|e| e.to_string())?),
            Request::GetPrLifecycle { id } => Response::PrLifecycle(daemon.store.get_pr_lifecycle(id).map_err(|e| e.to_string())?),
            Request::CreatePr { id } => Response::PrLifecycle(daemon.pr_lifecycles.create_pr(id).await.map_err(|e| e.to_string())?),
            Request::AdvancePr { id } => Response::PrLifecycle(daemon.pr_lifecycles.advance(id).await.map_err(|e| e.to_string())?),
            Request::MarkPrReady { id } => Response::PrLifecycle(daemon.pr_lifecycles.mark_ready(id).await.map_err(|e| e.to_string())?),
            Request::Ping => Response::Pong,
            Request::Subscribe => unreachable!("handled before dispatch"),
        })
    }
    .await;

    match result {
        Ok(response) => response,
        Err(message) => Response::Error { message },
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
