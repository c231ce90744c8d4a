//! Append-only record of every status change, one line per transition.
//!
//! The shop only sees the [`TransitionRecorder`] trait. Recording never fails from
//! the point of view of the pipeline: the file writer reports its own errors and
//! carries on.
use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use actix::{Actor, Addr, Context, Handler, Message};
use actix_rt::System;
use chrono::{DateTime, Local};
use orders::coordinates::Coordinates;
use orders::order::Order;
use orders::order_status::OrderStatus;
use tracing::{error, warn};

use crate::error::ShopError;

/// Who made an order change status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Agent {
    Manager,
    Cook(usize),
    DeliveryPerson(usize),
    Customer,
    /// The shop itself: failed announcements and closing time
    Shop,
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Agent::Manager => write!(f, "manager"),
            Agent::Cook(id) => write!(f, "cook {}", id),
            Agent::DeliveryPerson(id) => write!(f, "delivery person {}", id),
            Agent::Customer => write!(f, "customer"),
            Agent::Shop => write!(f, "shop"),
        }
    }
}

#[derive(Message, Debug, Clone, PartialEq, Eq)]
#[rtype(result = "()")]
pub struct TransitionRecord {
    pub order_id: usize,
    pub coordinates: Coordinates,
    pub status: OrderStatus,
    pub agent: Agent,
    pub at: DateTime<Local>,
    pub ordered_at: DateTime<Local>,
}

impl TransitionRecord {
    /// Record of `order` having just moved to its current status
    pub fn of(order: &Order, agent: Agent) -> Self {
        TransitionRecord {
            order_id: order.id(),
            coordinates: order.coordinates(),
            status: order.status(),
            agent,
            at: Local::now(),
            ordered_at: order.ordered_at(),
        }
    }
}

impl fmt::Display for TransitionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Order {} at {}: {} by {} at {} (ordered at {})",
            self.order_id,
            self.coordinates,
            self.status,
            self.agent,
            self.at.format("%Y-%m-%d %H:%M:%S%.3f"),
            self.ordered_at.format("%H:%M:%S"),
        )
    }
}

/// Sink for status changes. Called with the shop state lock held, once per transition.
pub trait TransitionRecorder: Send + Sync {
    fn record(&self, record: TransitionRecord);
}

/// Keeps every record in memory
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    records: Mutex<Vec<TransitionRecord>>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<TransitionRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Statuses recorded for one order, oldest first
    pub fn statuses_of(&self, order_id: usize) -> Vec<OrderStatus> {
        self.records()
            .into_iter()
            .filter(|record| record.order_id == order_id)
            .map(|record| record.status)
            .collect()
    }
}

impl TransitionRecorder for MemoryRecorder {
    fn record(&self, record: TransitionRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }
}

/// Actor owning the log file
pub struct TransitionLogWriter {
    file: File,
}

impl Actor for TransitionLogWriter {
    type Context = Context<Self>;
}

impl Handler<TransitionRecord> for TransitionLogWriter {
    type Result = ();

    fn handle(&mut self, record: TransitionRecord, _ctx: &mut Self::Context) {
        if let Err(e) = writeln!(self.file, "{}", record) {
            error!("[LOG] Failed to record order {}: {}", record.order_id, e);
        }
    }
}

/// Answered once every record sent before it is on disk
#[derive(Message)]
#[rtype(result = "()")]
pub struct Flush;

impl Handler<Flush> for TransitionLogWriter {
    type Result = ();

    fn handle(&mut self, _msg: Flush, _ctx: &mut Self::Context) {
        if let Err(e) = self.file.sync_data() {
            error!("[LOG] Failed to flush transition log: {}", e);
        }
    }
}

/// Records transitions by mailing them to the file writer.
/// The mailbox keeps the order in which the shop produced them.
#[derive(Clone)]
pub struct ActorRecorder {
    writer: Addr<TransitionLogWriter>,
}

impl TransitionRecorder for ActorRecorder {
    fn record(&self, record: TransitionRecord) {
        self.writer.do_send(record);
    }
}

/// The transition log file, written from its own actor system thread
pub struct FileTransitionLog {
    path: PathBuf,
    writer: Addr<TransitionLogWriter>,
    system: System,
    thread: Option<JoinHandle<io::Result<()>>>,
}

impl FileTransitionLog {
    /// Creates (or truncates) the log file and starts its writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or the writer thread cannot start.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ShopError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|source| ShopError::LogOpen {
            path: path.clone(),
            source,
        })?;

        let (ready_tx, ready_rx) = mpsc::channel();
        let thread = thread::Builder::new()
            .name("transition-log".to_owned())
            .spawn(move || {
                let system = System::new();
                system.block_on(async move {
                    let writer = TransitionLogWriter { file }.start();
                    let _ = ready_tx.send((writer, System::current()));
                });
                system.run()
            })
            .map_err(|source| ShopError::Spawn {
                name: "transition log".to_owned(),
                source,
            })?;

        let (writer, system) = ready_rx.recv().map_err(|_| ShopError::Spawn {
            name: "transition log".to_owned(),
            source: io::Error::new(io::ErrorKind::Other, "log writer exited before starting"),
        })?;

        Ok(FileTransitionLog {
            path,
            writer,
            system,
            thread: Some(thread),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn recorder(&self) -> ActorRecorder {
        ActorRecorder {
            writer: self.writer.clone(),
        }
    }

    /// Writes every pending record and stops the writer
    pub fn close(mut self) {
        if let Err(e) = futures::executor::block_on(self.writer.send(Flush)) {
            warn!("[LOG] Transition log writer was gone before closing: {}", e);
        }
        self.system.stop();
        if let Some(thread) = self.thread.take() {
            match thread.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!("[LOG] Transition log system failed: {}", e),
                Err(_) => error!("[LOG] Transition log thread panicked"),
            }
        }
    }
}
