//! memory requests
//!
//! a request is created at submission, decoded, lives in exactly one
//! scheduler slot until issued, and is destroyed after its callback fires.

use std::fmt::{self, Debug};

use serde::{Deserialize, Serialize};

use super::address::DecodedAddress;
use super::{Address, Cycle};

/// unique request identifier, monotonically increasing over a controller
/// lifetime
pub type RequestId = u64;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    Read,
    Write,
}

impl RequestType {
    pub fn other(self) -> Self {
        match self {
            RequestType::Read => RequestType::Write,
            RequestType::Write => RequestType::Read,
        }
    }
}

/// request priority for qos aware scheduling. ordering follows urgency.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Low,
    Normal,
    High,
    Realtime,
}

/// row buffer outcome of a request, fixed at the first command issued on its
/// behalf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageClass {
    Hit,
    Empty,
    Conflict,
}

/// invoked with the completion latency in cycles, at most once
pub type CompletionCallback = Box<dyn FnOnce(Cycle)>;

/// submit-time errors
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// the scheduler buffer is full; retry after a tick
    #[error("request queue is full")]
    QueueFull,
    /// the address decodes out of range. caller bug.
    #[error("invalid address {address:#x}: {reason}")]
    InvalidAddress { address: Address, reason: &'static str },
}

/// a memory request
pub struct Request {
    pub id: RequestId,
    pub address: Address,
    /// transfer size in bytes
    pub size: u32,
    pub ty: RequestType,
    pub priority: Priority,
    pub submit_cycle: Cycle,
    /// decoded address components, filled by the controller at submit
    pub loc: DecodedAddress,
    pub(crate) callback: Option<CompletionCallback>,
    pub(crate) class: Option<PageClass>,
}

impl Request {
    pub fn new(address: Address, size: u32, ty: RequestType) -> Self {
        Self {
            id: 0,
            address,
            size,
            ty,
            priority: Priority::Normal,
            submit_cycle: 0,
            loc: DecodedAddress::default(),
            callback: None,
            class: None,
        }
    }

    pub fn read(address: Address, size: u32) -> Self {
        Self::new(address, size, RequestType::Read)
    }

    pub fn write(address: Address, size: u32) -> Self {
        Self::new(address, size, RequestType::Write)
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn on_complete(mut self, callback: impl FnOnce(Cycle) + 'static) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }

    /// move the callback out so it runs at most once and its captures are
    /// released promptly
    pub(crate) fn take_callback(&mut self) -> Option<CompletionCallback> {
        self.callback.take()
    }
}

impl Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("id", &self.id)
            .field("address", &format_args!("{:#x}", self.address))
            .field("size", &self.size)
            .field("ty", &self.ty)
            .field("priority", &self.priority)
            .field("submit_cycle", &self.submit_cycle)
            .field("loc", &self.loc)
            .finish()
    }
}

/// hands out request ids. the counter is never rewound, not even by reset.
#[derive(Debug)]
pub(crate) struct IdGen {
    next: RequestId,
}

impl Default for IdGen {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdGen {
    pub fn alloc(&mut self) -> RequestId {
        let id = self.next;
        self.next += 1;
        id
    }
}
