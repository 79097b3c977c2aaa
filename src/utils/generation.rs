/// Ticket handed out when a load cycle starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(pub u64);

/// Monotonic counter of load cycles.
/// Only the most recently issued ticket is current; results carrying an
/// older ticket must not be rendered.
#[derive(Debug, Default)]
pub struct Generation {
    latest: u64,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new cycle, invalidating every earlier ticket
    pub fn begin(&mut self) -> Ticket {
        self.latest += 1;
        Ticket(self.latest)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }

    pub fn latest(&self) -> u64 {
        self.latest
    }
}
