use uuid::Uuid;

use crate::domain::logs::dto::log_lines_batch::LogLinesBatch;

/// Caller-owned continuation state of a tail: lines consumed so far, the
/// accumulated content and the last reported modification time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TailState {
    pub offset: u64,
    pub lines: Vec<String>,
    pub last_modified: Option<String>,
}

impl TailState {
    /// New state with `batch` applied. The offset moves by `batch.count`,
    /// never by the number of kept lines.
    pub fn advanced(&self, batch: &LogLinesBatch) -> TailState {
        let mut lines = self.lines.clone();
        lines.extend(batch.content.iter().cloned());

        TailState {
            offset: self.offset + batch.count,
            lines,
            last_modified: batch
                .last_modified
                .clone()
                .or_else(|| self.last_modified.clone()),
        }
    }
}

/// Identity of one issued poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTicket {
    pub session: Uuid,
    pub seq: u64,
    pub from_line: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// Issued for a log the caller has since moved away from.
    StaleSession,
    /// A later poll was already applied.
    OutOfOrder,
    /// Issued from an offset the state has since moved past.
    StaleOffset,
}

/// Tail of one `(route, log)` pair with monotonic poll sequencing.
///
/// Polls may overlap and complete in any order. A result is applied only if
/// it belongs to this session, carries the highest sequence number seen so
/// far and was issued from the current offset.
#[derive(Debug, Clone)]
pub struct TailSession {
    id: Uuid,
    route: String,
    log: String,
    state: TailState,
    next_seq: u64,
    last_applied_seq: Option<u64>,
}

impl TailSession {
    pub fn new(route: impl Into<String>, log: impl Into<String>) -> Self {
        Self::resume(route, log, TailState::default())
    }

    pub fn resume(route: impl Into<String>, log: impl Into<String>, state: TailState) -> Self {
        Self {
            id: Uuid::new_v4(),
            route: route.into(),
            log: log.into(),
            state,
            next_seq: 0,
            last_applied_seq: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn log(&self) -> &str {
        &self.log
    }

    pub fn state(&self) -> &TailState {
        &self.state
    }

    pub fn issue(&mut self) -> PollTicket {
        let ticket = PollTicket {
            session: self.id,
            seq: self.next_seq,
            from_line: self.state.offset,
        };
        self.next_seq += 1;
        ticket
    }

    pub fn apply(&mut self, ticket: &PollTicket, batch: &LogLinesBatch) -> ApplyOutcome {
        if ticket.session != self.id {
            return ApplyOutcome::StaleSession;
        }
        if self.last_applied_seq.is_some_and(|last| ticket.seq <= last) {
            return ApplyOutcome::OutOfOrder;
        }
        if ticket.from_line != self.state.offset {
            return ApplyOutcome::StaleOffset;
        }

        self.state = self.state.advanced(batch);
        self.last_applied_seq = Some(ticket.seq);
        ApplyOutcome::Applied
    }
}
