/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the prom-metrics-reporter authors.
 */

use std::collections::HashMap;
use std::io;
use std::net::TcpListener as StdTcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

use anyhow::Context;
use foldhash::fast::FixedState;
use log::{debug, warn};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

use super::{ListenerAddr, encode_text};
use crate::registry::ExpositionRegistry;

const MAX_REQUEST_HEAD: usize = 8192;

struct SharedEntry {
    server: Arc<ExpositionServer>,
    users: usize,
}

static SHARED_SERVERS: Mutex<HashMap<ListenerAddr, SharedEntry, FixedState>> =
    Mutex::new(HashMap::with_hasher(FixedState::with_seed(0)));

/// Get the scrape server for a listener address, starting one if needed.
///
/// Servers are shared per requested address with a use count, so several
/// reporters configured with the same listener reuse one socket. Bind
/// errors surface here, synchronously.
pub fn acquire_server(
    listener: &ListenerAddr,
    registry: Arc<ExpositionRegistry>,
) -> anyhow::Result<Arc<ExpositionServer>> {
    let mut ht = SHARED_SERVERS.lock().unwrap();
    if let Some(entry) = ht.get_mut(listener) {
        entry.users += 1;
        return Ok(entry.server.clone());
    }
    let server = Arc::new(ExpositionServer::start(listener.clone(), registry)?);
    ht.insert(
        listener.clone(),
        SharedEntry {
            server: server.clone(),
            users: 1,
        },
    );
    Ok(server)
}

/// Drop one use of a shared scrape server, stopping it when the last
/// user releases it.
pub fn release_server(server: Arc<ExpositionServer>) {
    let mut ht = SHARED_SERVERS.lock().unwrap();
    if let Some(entry) = ht.get_mut(server.listener()) {
        if Arc::ptr_eq(&entry.server, &server) {
            entry.users -= 1;
            if entry.users > 0 {
                return;
            }
            ht.remove(server.listener());
        }
    }
    drop(ht);
    server.stop();
}

/// Minimal HTTP/1.1 server answering `GET /metrics` with the text form
/// of the registry's current snapshot.
///
/// Runs on a dedicated thread with a current-thread tokio runtime so the
/// host process does not need a runtime of its own.
pub struct ExpositionServer {
    listener: ListenerAddr,
    local_port: u16,
    shutdown: Mutex<Option<oneshot::Sender<()>>>,
    thread: Mutex<Option<thread::JoinHandle<()>>>,
}

impl ExpositionServer {
    pub fn start(
        listener: ListenerAddr,
        registry: Arc<ExpositionRegistry>,
    ) -> anyhow::Result<Self> {
        let std_listener = StdTcpListener::bind(listener.bind_addr())
            .with_context(|| format!("failed to bind {listener}"))?;
        std_listener
            .set_nonblocking(true)
            .context("failed to set listener non-blocking")?;
        let local_port = std_listener
            .local_addr()
            .context("failed to get local address")?
            .port();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let thread = thread::Builder::new()
            .name("prom-exposition".to_string())
            .spawn(move || {
                let rt = match tokio::runtime::Builder::new_current_thread()
                    .enable_io()
                    .build()
                {
                    Ok(rt) => rt,
                    Err(e) => {
                        warn!("failed to build exposition runtime: {e}");
                        return;
                    }
                };
                rt.block_on(serve(std_listener, registry, shutdown_rx));
            })
            .context("failed to spawn exposition thread")?;

        debug!("exposition server listening on {}:{local_port}", listener.host());
        Ok(ExpositionServer {
            listener,
            local_port,
            shutdown: Mutex::new(Some(shutdown_tx)),
            thread: Mutex::new(Some(thread)),
        })
    }

    pub fn listener(&self) -> &ListenerAddr {
        &self.listener
    }

    /// The actually bound port; differs from the configured one when the
    /// listener requested port 0.
    pub fn port(&self) -> u16 {
        self.local_port
    }

    /// Stop accepting scrapes and join the server thread. Idempotent.
    pub fn stop(&self) {
        if let Some(tx) = self.shutdown.lock().unwrap().take() {
            let _ = tx.send(());
        }
        if let Some(thread) = self.thread.lock().unwrap().take() {
            let _ = thread.join();
        }
    }
}

async fn serve(
    std_listener: StdTcpListener,
    registry: Arc<ExpositionRegistry>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let listener = match TcpListener::from_std(std_listener) {
        Ok(listener) => listener,
        Err(e) => {
            warn!("failed to register exposition listener: {e}");
            return;
        }
    };
    loop {
        tokio::select! {
            r = listener.accept() => match r {
                Ok((stream, peer)) => {
                    let registry = registry.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_scrape(stream, registry).await {
                            debug!("scrape connection from {peer} failed: {e}");
                        }
                    });
                }
                Err(e) => warn!("exposition accept failed: {e}"),
            },
            _ = &mut shutdown => break,
        }
    }
}

async fn handle_scrape(
    mut stream: TcpStream,
    registry: Arc<ExpositionRegistry>,
) -> io::Result<()> {
    let mut buf = vec![0u8; MAX_REQUEST_HEAD];
    let mut len = 0;
    loop {
        let n = stream.read(&mut buf[len..]).await?;
        if n == 0 {
            break;
        }
        len += n;
        if memchr::memmem::find(&buf[..len], b"\r\n\r\n").is_some() {
            break;
        }
        if len == buf.len() {
            return write_response(&mut stream, "400 Bad Request", "request head too large\n")
                .await;
        }
    }

    let head = String::from_utf8_lossy(&buf[..len]);
    let mut request_line = head.lines().next().unwrap_or("").split_ascii_whitespace();
    let method = request_line.next().unwrap_or("");
    let path = request_line.next().unwrap_or("");

    if method != "GET" {
        return write_response(&mut stream, "405 Method Not Allowed", "method not allowed\n")
            .await;
    }
    match path {
        "/metrics" | "/" => {
            let body = encode_text(&registry.collect());
            write_response(&mut stream, "200 OK", &body).await
        }
        _ => write_response(&mut stream, "404 Not Found", "not found\n").await,
    }
}

async fn write_response(stream: &mut TcpStream, status: &str, body: &str) -> io::Result<()> {
    let head = format!(
        "HTTP/1.1 {status}\r\n\
         Content-Type: text/plain; version=0.0.4; charset=utf-8\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n",
        body.len()
    );
    stream.write_all(head.as_bytes()).await?;
    stream.write_all(body.as_bytes()).await?;
    stream.shutdown().await
}
