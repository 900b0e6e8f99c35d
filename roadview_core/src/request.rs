//! Sequence-number gating of provider responses.
//!
//! Every request gets a monotonically increasing sequence number. When the
//! response arrives it is applied only if no newer request of the same kind
//! was issued in the meantime (last issued wins). A record request also
//! supersedes every outstanding scenario request, since those scenarios
//! belong to the record being replaced.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    /// Loading a record file
    Record,

    /// Fetching one scenario
    Scenario,
}

/// Handle of an issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RequestTicket {
    pub kind: RequestKind,
    pub seq: u64,
}

#[derive(Debug, Clone, Default)]
pub struct RequestGate {
    next_seq: u64,
    latest_record: Option<u64>,
    latest_scenario: Option<u64>,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a ticket, superseding every earlier ticket of the same kind.
    ///
    /// Record tickets additionally supersede all scenario tickets.
    pub fn issue(&mut self, kind: RequestKind) -> RequestTicket {
        self.next_seq += 1;
        let seq = self.next_seq;
        *self.latest_mut(kind) = Some(seq);
        if kind == RequestKind::Record {
            self.latest_scenario = None;
        }
        RequestTicket { kind, seq }
    }

    /// True if `ticket` is the latest issued for its kind.
    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        let latest = match ticket.kind {
            RequestKind::Record => self.latest_record,
            RequestKind::Scenario => self.latest_scenario,
        };
        latest == Some(ticket.seq)
    }

    fn latest_mut(&mut self, kind: RequestKind) -> &mut Option<u64> {
        match kind {
            RequestKind::Record => &mut self.latest_record,
            RequestKind::Scenario => &mut self.latest_scenario,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_issued_wins() {
        let mut gate = RequestGate::new();
        let first = gate.issue(RequestKind::Scenario);
        let second = gate.issue(RequestKind::Scenario);
        assert!(!gate.is_current(first));
        assert!(gate.is_current(second));
    }

    #[test]
    fn test_kinds_are_independent() {
        let mut gate = RequestGate::new();
        let record = gate.issue(RequestKind::Record);
        let scenario = gate.issue(RequestKind::Scenario);
        assert!(gate.is_current(record));
        assert!(gate.is_current(scenario));
        assert!(scenario.seq > record.seq);
    }

    #[test]
    fn test_record_request_supersedes_scenario() {
        let mut gate = RequestGate::new();
        let scenario = gate.issue(RequestKind::Scenario);
        let record = gate.issue(RequestKind::Record);
        assert!(!gate.is_current(scenario));
        assert!(gate.is_current(record));

        let next = gate.issue(RequestKind::Scenario);
        assert!(gate.is_current(next));
        assert!(gate.is_current(record));
    }

    #[test]
    fn test_foreign_ticket_rejected() {
        let gate = RequestGate::new();
        let forged = RequestTicket {
            kind: RequestKind::Record,
            seq: 1,
        };
        assert!(!gate.is_current(forged));
    }
}
