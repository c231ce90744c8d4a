//! The customer's end of an order: where its status updates are sent.
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

use orders::order_status::OrderStatus;
use orders::wire::{self, WireError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("connection already closed")]
    Closed,
    #[error("customer hung up")]
    HungUp,
    #[error(transparent)]
    Wire(#[from] WireError),
}

/// Connection owned by an order. Only used while the shop state lock is held.
#[cfg_attr(test, mockall::automock)]
pub trait OrderConnection: Send {
    /// Sends one status code to the customer
    fn send_status(&mut self, status: OrderStatus) -> Result<(), EmitError>;

    /// Closes the connection. Later sends fail with `EmitError::Closed`.
    fn close(&mut self);

    fn is_open(&self) -> bool;
}

/// A customer connected over TCP. The socket is shared with the thread that
/// listens for the customer cancelling, so each order holds a single descriptor.
pub struct TcpOrderConnection {
    stream: Option<Arc<TcpStream>>,
    peer: Option<SocketAddr>,
}

impl TcpOrderConnection {
    pub fn new(stream: Arc<TcpStream>) -> Self {
        let peer = stream.peer_addr().ok();
        TcpOrderConnection {
            stream: Some(stream),
            peer,
        }
    }

    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }
}

impl OrderConnection for TcpOrderConnection {
    fn send_status(&mut self, status: OrderStatus) -> Result<(), EmitError> {
        let mut stream: &TcpStream = self.stream.as_deref().ok_or(EmitError::Closed)?;
        wire::write_status(&mut stream, status)?;
        Ok(())
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            // wakes up the reading side too; the peer may be gone already
            let _ = stream.shutdown(Shutdown::Both);
        }
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}

/// A customer living in the same process, fed through a channel.
/// Dropping the receiving end is the same as hanging up.
pub struct ChannelConnection {
    sender: Option<Sender<OrderStatus>>,
}

impl ChannelConnection {
    pub fn pair() -> (ChannelConnection, Receiver<OrderStatus>) {
        let (sender, receiver) = mpsc::channel();
        (ChannelConnection { sender: Some(sender) }, receiver)
    }
}

impl OrderConnection for ChannelConnection {
    fn send_status(&mut self, status: OrderStatus) -> Result<(), EmitError> {
        let sender = self.sender.as_ref().ok_or(EmitError::Closed)?;
        sender.send(status).map_err(|_| EmitError::HungUp)
    }

    fn close(&mut self) {
        self.sender = None;
    }

    fn is_open(&self) -> bool {
        self.sender.is_some()
    }
}
