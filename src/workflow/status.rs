//! Visible upload status guarded by a generation token.
//!
//! Each upload takes a [`Ticket`]. Only the holder of the newest ticket may
//! change what the user sees, so a slow response to an older upload can no
//! longer overwrite the result of a newer one.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

/// Generation token identifying one upload attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// What the user currently sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Idle,
    Converting { ticket: Ticket, file: String },
    Delivered { ticket: Ticket, path: PathBuf },
    Failed { ticket: Ticket },
}

impl Status {
    /// Status label text.
    pub fn label(&self) -> &'static str {
        match self {
            Status::Idle => "Upload or capture sheet music",
            Status::Converting { .. } => "Converting...",
            Status::Delivered { .. } => "Download ready",
            Status::Failed { .. } => "Conversion failed",
        }
    }
}

#[derive(Debug)]
struct Board {
    generation: u64,
    status: Status,
}

/// Shared visible status of a client.
#[derive(Debug)]
pub struct StatusBoard {
    board: Mutex<Board>,
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self {
            board: Mutex::new(Board {
                generation: 0,
                status: Status::Idle,
            }),
        }
    }
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Board> {
        self.board.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Issues a new ticket and shows the file as converting.
    pub fn begin(&self, file: &str) -> Ticket {
        let mut board = self.lock();
        board.generation += 1;
        let ticket = Ticket(board.generation);
        board.status = Status::Converting {
            ticket,
            file: file.to_string(),
        };
        ticket
    }

    /// Whether `ticket` is the newest one issued.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.lock().generation == ticket.0
    }

    /// Runs `deliver` and records its result, unless `ticket` is stale.
    ///
    /// The board stays locked while `deliver` runs, so a newer upload
    /// cannot begin between the freshness check and the recorded status.
    /// Returns `None` without calling `deliver` for a stale ticket.
    pub fn deliver_with<E>(
        &self,
        ticket: Ticket,
        deliver: impl FnOnce() -> Result<PathBuf, E>,
    ) -> Option<Result<PathBuf, E>> {
        let mut board = self.lock();
        if board.generation != ticket.0 {
            return None;
        }
        let result = deliver();
        board.status = match &result {
            Ok(path) => Status::Delivered {
                ticket,
                path: path.clone(),
            },
            Err(_) => Status::Failed { ticket },
        };
        Some(result)
    }

    /// Records a failed result. Returns false for a stale ticket.
    pub fn fail(&self, ticket: Ticket) -> bool {
        self.settle(ticket, Status::Failed { ticket })
    }

    fn settle(&self, ticket: Ticket, status: Status) -> bool {
        let mut board = self.lock();
        if board.generation != ticket.0 {
            return false;
        }
        board.status = status;
        true
    }

    /// Current status.
    pub fn status(&self) -> Status {
        self.lock().status.clone()
    }

    /// Current label text.
    pub fn label(&self) -> &'static str {
        self.lock().status.label()
    }
}
