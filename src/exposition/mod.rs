/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the prom-metrics-reporter authors.
 */

mod listener;
pub use listener::ListenerAddr;

mod text;
pub use text::encode_text;

mod server;
pub use server::{ExpositionServer, acquire_server, release_server};
