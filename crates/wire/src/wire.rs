// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Length-prefix framing and JSON encoding.

use crate::{Request, Response};
use lattice_core::SyncEvent;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Upper bound on a single frame. Configs and artifact maps stay far below
/// this; anything larger is a protocol violation.
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Errors from framing, encoding, or the underlying stream.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("connection closed")]
    ConnectionClosed,

    #[error("timed out waiting for message")]
    Timeout,

    #[error("message too large: {0} bytes")]
    TooLarge(usize),

    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serialize a value to its raw JSON bytes (no length prefix).
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, ProtocolError> {
    Ok(serde_json::to_vec(value)?)
}

/// Deserialize a value from raw JSON bytes.
pub fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(data)?)
}

fn map_eof(e: std::io::Error) -> ProtocolError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        ProtocolError::ConnectionClosed
    } else {
        ProtocolError::Io(e)
    }
}

/// Read one length-prefixed message from the stream.
pub async fn read_message<R>(reader: &mut R) -> Result<Vec<u8>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await.map_err(map_eof)?;

    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::TooLarge(len));
    }

    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await.map_err(map_eof)?;
    Ok(buf)
}

/// Write one length-prefixed message to the stream.
pub async fn write_message<W>(writer: &mut W, data: &[u8]) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    if data.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::TooLarge(data.len()));
    }

    writer.write_all(&(data.len() as u32).to_be_bytes()).await?;
    writer.write_all(data).await?;
    writer.flush().await?;
    Ok(())
}

async fn read_framed<R, T>(reader: &mut R, timeout: Duration) -> Result<T, ProtocolError>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    match tokio::time::timeout(timeout, read_message(reader)).await {
        Ok(data) => decode(&data?),
        Err(_) => Err(ProtocolError::Timeout),
    }
}

async fn write_framed<W, T>(writer: &mut W, value: &T) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    write_message(writer, &encode(value)?).await
}

/// Read a framed [`Request`], failing after `timeout`.
pub async fn read_request<R>(reader: &mut R, timeout: Duration) -> Result<Request, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    read_framed(reader, timeout).await
}

/// Write a framed [`Request`].
pub async fn write_request<W>(writer: &mut W, request: &Request) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    write_framed(writer, request).await
}

/// Read a framed [`Response`], failing after `timeout`.
pub async fn read_response<R>(reader: &mut R, timeout: Duration) -> Result<Response, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    read_framed(reader, timeout).await
}

/// Write a framed [`Response`].
pub async fn write_response<W>(writer: &mut W, response: &Response) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    write_framed(writer, response).await
}

/// Read a framed [`SyncEvent`]. No timeout: sync streams idle between events.
pub async fn read_event<R>(reader: &mut R) -> Result<SyncEvent, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let data = read_message(reader).await?;
    decode(&data)
}

/// Write a framed [`SyncEvent`].
pub async fn write_event<W>(writer: &mut W, event: &SyncEvent) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    write_framed(writer, event).await
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
