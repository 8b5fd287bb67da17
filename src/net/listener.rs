//! Bound TCP socket that caps the number of live connections.
//!
//! # Design Decisions
//! - A connection slot is taken before `accept`, so at the cap the listener
//!   stops pulling sockets off the backlog
//! - The slot travels with the connection as a `ConnectionPermit` and is
//!   returned when the handler task drops it

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::ListenerConfig;

#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("cannot bind listener: {0}")]
    Bind(std::io::Error),

    #[error("cannot accept connection: {0}")]
    Accept(std::io::Error),
}

pub struct Listener {
    socket: TcpListener,
    slots: Arc<Semaphore>,
}

impl Listener {
    /// Bind `listener.bind_address` with room for `listener.max_connections`.
    pub async fn bind(config: &ListenerConfig) -> Result<Self, ListenerError> {
        let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
            ListenerError::Bind(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
        })?;
        let socket = TcpListener::bind(addr).await.map_err(ListenerError::Bind)?;
        Self::from_tcp(socket, config.max_connections)
    }

    pub fn from_tcp(socket: TcpListener, max_connections: usize) -> Result<Self, ListenerError> {
        let address = socket.local_addr().map_err(ListenerError::Bind)?;
        tracing::info!(%address, max_connections, "Listening");

        Ok(Self {
            socket,
            slots: Arc::new(Semaphore::new(max_connections)),
        })
    }

    /// Wait for a free slot, then for the next connection.
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr, ConnectionPermit), ListenerError> {
        // The semaphore is owned here and never closed, so this only fails if
        // that changes.
        let slot = Arc::clone(&self.slots)
            .acquire_owned()
            .await
            .map_err(|e| ListenerError::Accept(std::io::Error::other(e)))?;

        let (stream, peer) = self.socket.accept().await.map_err(ListenerError::Accept)?;
        tracing::debug!(
            peer_addr = %peer,
            free_slots = self.slots.available_permits(),
            "Accepted connection"
        );

        Ok((stream, peer, ConnectionPermit { _slot: slot }))
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

/// One occupied connection slot.
#[derive(Debug)]
pub struct ConnectionPermit {
    _slot: OwnedSemaphorePermit,
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn local(max_connections: usize) -> ListenerConfig {
        ListenerConfig {
            bind_address: "127.0.0.1:0".into(),
            max_connections,
        }
    }

    #[tokio::test]
    async fn bind_rejects_bad_address() {
        let config = ListenerConfig {
            bind_address: "nowhere".into(),
            ..local(1)
        };
        assert!(matches!(Listener::bind(&config).await, Err(ListenerError::Bind(_))));
    }

    #[tokio::test]
    async fn permit_holds_slot_until_dropped() {
        let listener = Listener::bind(&local(2)).await.unwrap();
        let addr = listener.local_addr().unwrap();

        let _client = TcpStream::connect(addr).await.unwrap();
        let (_stream, _, permit) = listener.accept().await.unwrap();
        assert_eq!(listener.slots.available_permits(), 1);

        drop(permit);
        assert_eq!(listener.slots.available_permits(), 2);
    }

    #[tokio::test]
    async fn accept_waits_while_all_slots_are_taken() {
        let listener = Listener::bind(&local(1)).await.unwrap();
        let addr = listener.local_addr().unwrap();

        let _first = TcpStream::connect(addr).await.unwrap();
        let (_stream, _, permit) = listener.accept().await.unwrap();

        let _second = TcpStream::connect(addr).await.unwrap();
        let blocked = tokio::time::timeout(Duration::from_millis(100), listener.accept()).await;
        assert!(blocked.is_err());

        drop(permit);
        let accepted = tokio::time::timeout(Duration::from_secs(2), listener.accept()).await;
        assert!(matches!(accepted, Ok(Ok(_))));
    }
}
