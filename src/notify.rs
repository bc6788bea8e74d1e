//! Completion notifications sent to the application owning a process.

use std::collections::HashMap;
use std::sync::mpsc::Sender;

use thiserror::Error;

use crate::process::Pid;

pub type ChannelId = u32;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CompletionKind {
    Done
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Completion {
    pub pid: Pid,
    pub kind: CompletionKind,
    pub time_ms: u64,
}

impl Completion {
    pub fn done(pid: Pid, time_ms: u64) -> Completion {
        Completion { pid: pid, kind: CompletionKind::Done, time_ms: time_ms }
    }
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum NotifyError {
    #[error("no mailbox registered for channel {0}")]
    UnknownChannel(ChannelId),
    #[error("receiver on channel {0} hung up")]
    Disconnected(ChannelId),
}

/// Transport for completion events. Delivery is fire-and-forget: the
/// scheduler logs a failed delivery and retires the process anyway.
pub trait Notifier {
    fn notify(&mut self, channel: ChannelId, completion: Completion) -> Result<(), NotifyError>;
}

/// Keeps every completion in delivery order.
#[derive(Debug, Default)]
pub struct Outbox {
    pub sent: Vec<(ChannelId, Completion)>,
}

impl Outbox {
    pub fn new() -> Outbox {
        Outbox { sent: Vec::new() }
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, (ChannelId, Completion)> {
        self.sent.drain(..)
    }
}

impl Notifier for Outbox {
    fn notify(&mut self, channel: ChannelId, completion: Completion) -> Result<(), NotifyError> {
        self.sent.push((channel, completion));
        Ok(())
    }
}

/// One `mpsc` sender per registered channel.
#[derive(Debug, Default)]
pub struct Mailboxes {
    senders: HashMap<ChannelId, Sender<Completion>>,
}

impl Mailboxes {
    pub fn new() -> Mailboxes {
        Mailboxes { senders: HashMap::new() }
    }

    pub fn register(&mut self, channel: ChannelId, tx: Sender<Completion>) {
        self.senders.insert(channel, tx);
    }
}

impl Notifier for Mailboxes {
    fn notify(&mut self, channel: ChannelId, completion: Completion) -> Result<(), NotifyError> {
        let tx = self.senders.get(&channel).ok_or(NotifyError::UnknownChannel(channel))?;
        tx.send(completion).map_err(|_| NotifyError::Disconnected(channel))
    }
}
