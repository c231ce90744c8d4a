//! One hungry customer: places an order and follows it until it ends one way or another.
use std::future::Future;
use std::sync::Arc;

use orders::coordinates::Coordinates;
use orders::order_status::OrderStatus;
use orders::wire::{self, WireError, CODE_WIDTH};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::ClientError;

/// How an order ended for its customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Delivered,
    Canceled,
    /// The shop closed the connection without a final status
    Dropped,
    /// The customer canceled because everybody was told to leave
    Abandoned,
}

/// Shared "everybody cancel and go home" flag.
/// Raised on Ctrl-C, on SIGQUIT, or as soon as the shop drops one customer.
#[derive(Clone, Debug)]
pub struct LeaveSignal {
    sender: Arc<watch::Sender<bool>>,
}

impl Default for LeaveSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl LeaveSignal {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        LeaveSignal {
            sender: Arc::new(sender),
        }
    }

    pub fn raise(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_raised(&self) -> bool {
        *self.sender.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }
}

/// Raises `leave` once `interrupted` completes
pub async fn leave_on<F: Future<Output = ()>>(interrupted: F, leave: LeaveSignal) {
    interrupted.await;
    println!("Client shutting down...");
    leave.raise();
}

/// What a customer prints when its order reaches `status`
pub fn status_lines(client: usize, status: OrderStatus) -> Vec<String> {
    match status {
        OrderStatus::Received => vec![format!("Order placed for client {}", client)],
        OrderStatus::Preparing => vec![format!("Order for client {} is being prepared", client)],
        OrderStatus::Cooking => vec![
            format!("Order for client {} is get order into apparatus", client),
            format!("Order for client {} is being cooked", client),
        ],
        OrderStatus::ReadyForDelivery => vec![
            format!("Order for client {} is get order into apparatus", client),
            format!("Order for client {} is ready for delivery", client),
        ],
        OrderStatus::OutForDelivery => vec![format!("Order for client {} is out for delivery", client)],
        OrderStatus::Delivered => vec![format!("Order for client {} has been delivered", client)],
        OrderStatus::Canceled => vec![format!("Order for client {} has been canceled", client)],
    }
}

async fn read_code<R: AsyncRead + Unpin>(reader: &mut R) -> Result<i32, WireError> {
    let mut bytes = [0u8; CODE_WIDTH];
    match reader.read_exact(&mut bytes).await {
        Ok(_) => Ok(wire::decode_code(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Err(WireError::Closed),
        Err(e) => Err(WireError::Io(e)),
    }
}

async fn write_code<W: AsyncWrite + Unpin>(writer: &mut W, code: i32) -> Result<(), WireError> {
    writer.write_all(&wire::encode_code(code)).await?;
    writer.flush().await?;
    Ok(())
}

/// Connects to the shop and sends the coordinates of a new order.
pub async fn place_order(addr: &str, coordinates: Coordinates) -> Result<TcpStream, ClientError> {
    let mut stream = TcpStream::connect(addr).await.map_err(|source| ClientError::Connect {
        addr: addr.to_owned(),
        source,
    })?;
    write_code(&mut stream, coordinates.x()).await?;
    write_code(&mut stream, coordinates.y()).await?;
    Ok(stream)
}

/// Reads status updates until the order ends or the customer is told to leave.
/// # Arguments
/// * `client` - number of the customer, starting at 1
/// * `stream` - connection returned by [`place_order`]
/// * `leave` - raised when every customer must cancel; this customer raises it if the shop drops it
pub async fn follow_order(client: usize, mut stream: TcpStream, leave: LeaveSignal) -> Outcome {
    let mut leaving = leave.subscribe();
    loop {
        if *leaving.borrow_and_update() {
            return abandon(client, &mut stream).await;
        }
        tokio::select! {
            changed = leaving.changed() => {
                if changed.is_err() {
                    // the signal is owned by whoever runs the customers, it outlives them
                    return abandon(client, &mut stream).await;
                }
            }
            code = read_code(&mut stream) => match code {
                Ok(code) => match OrderStatus::from_code(code) {
                    Some(status) => {
                        for line in status_lines(client, status) {
                            println!("{}", line);
                        }
                        match status {
                            OrderStatus::Delivered => return Outcome::Delivered,
                            OrderStatus::Canceled => return Outcome::Canceled,
                            _ => {}
                        }
                    }
                    None => println!("Unknown status for order of client {}", client),
                },
                Err(e) => {
                    debug!("Client {} lost the shop: {}", client, e);
                    println!("RIP PIDE SHOP ...");
                    leave.raise();
                    return Outcome::Dropped;
                }
            }
        }
    }
}

async fn abandon(client: usize, stream: &mut TcpStream) -> Outcome {
    println!("Order {} is canceled", client);
    if let Err(e) = write_code(stream, OrderStatus::Canceled.code()).await {
        warn!("Client {} could not cancel: {}", client, e);
    }
    let _ = stream.shutdown().await;
    Outcome::Abandoned
}
