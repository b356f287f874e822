// SPDX-License-Identifier: MIT

//! Thin IPC client: opens a Unix socket to the daemon, writes one newline-
//! delimited `Request`, and reads back one `Response` line.

use anyhow::{bail, Context, Result};
use orc_wire::{decode_line, encode_line, Event, Request, Response};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

pub struct Client {
    socket_path: String,
}

impl Client {
    pub fn new(socket_path: impl Into<String>) -> Self {
        Self { socket_path: socket_path.into() }
    }

    pub async fn call(&self, request: Request) -> Result<Response> {
        let mut stream = UnixStream::connect(&self.socket_path)
            .await
            .with_context(|| format!("connecting to orcd at {}", self.socket_path))?;
        let line = encode_line(&request)?;
        stream.write_all(line.as_bytes()).await?;

        let mut reader = BufReader::new(stream);
        let mut response_line = String::new();
        let bytes_read = reader.read_line(&mut response_line).await?;
        if bytes_read == 0 {
            bail!("orcd closed the connection without a response");
        }
        Ok(decode_line(&response_line)?)
    }

    /// Opens a long-lived `Subscribe` connection and invokes `on_event` for
    /// every event line the daemon pushes, until the connection closes.
    pub async fn subscribe(&self, mut on_event: impl FnMut(Event)) -> Result<()> {
        let stream = UnixStream::connect(&self.socket_path).await.with_context(|| format!("connecting to orcd at {}", self.socket_path))?;
        let (reader, mut writer) = stream.into_split();
        writer.write_all(encode_line(&Request::Subscribe)?.as_bytes()).await?;

        let mut lines = BufReader::new(reader).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            on_event(decode_line(&line)?);
        }
        Ok(())
    }
}
