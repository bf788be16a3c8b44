//! Resource identity table: maps the token echoed back by the multiplexer to
//! the logical role a registered descriptor plays.

use std::collections::HashMap;
use std::fmt;
use std::os::unix::io::RawFd;

use crate::readiness::{Interest, Token};

/// Logical role of a watched resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceRole {
    /// The kernel device-event (uevent) broadcast channel.
    DeviceEvents,
}

impl fmt::Display for ResourceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceRole::DeviceEvents => f.write_str("device-events"),
        }
    }
}

/// A registered resource as the loop knows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resource {
    pub token: Token,
    pub fd: RawFd,
    pub role: ResourceRole,
    /// Interest used at registration; reused verbatim when re-arming.
    pub interest: Interest,
}

#[derive(Debug, Default)]
pub struct ResourceTable {
    entries: HashMap<Token, Resource>,
    next_token: u64,
}

impl ResourceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the token the next inserted resource should be registered under.
    pub fn next_token(&self) -> Token {
        Token(self.next_token)
    }

    pub fn insert(&mut self, fd: RawFd, role: ResourceRole, interest: Interest) -> Resource {
        let token = Token(self.next_token);
        self.next_token += 1;
        let resource = Resource {
            token,
            fd,
            role,
            interest,
        };
        self.entries.insert(token, resource);
        resource
    }

    pub fn get(&self, token: Token) -> Option<&Resource> {
        self.entries.get(&token)
    }

    pub fn find_role(&self, role: ResourceRole) -> Option<&Resource> {
        self.entries.values().find(|r| r.role == role)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readiness::CHANNEL_INTEREST;

    #[test]
    fn tokens_are_unique_and_resolve_back_to_resource() {
        let mut table = ResourceTable::new();
        let expected = table.next_token();
        let first = table.insert(5, ResourceRole::DeviceEvents, CHANNEL_INTEREST);
        let second = table.insert(6, ResourceRole::DeviceEvents, CHANNEL_INTEREST);

        assert_eq!(first.token, expected);
        assert_ne!(first.token, second.token);
        assert_eq!(table.get(first.token).map(|r| r.fd), Some(5));
        assert_eq!(table.get(second.token).map(|r| r.fd), Some(6));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn unknown_token_has_no_resource() {
        let mut table = ResourceTable::new();
        table.insert(5, ResourceRole::DeviceEvents, CHANNEL_INTEREST);
        assert!(table.get(Token(999)).is_none());
    }

    #[test]
    fn find_role_returns_registered_entry() {
        let mut table = ResourceTable::new();
        assert!(table.find_role(ResourceRole::DeviceEvents).is_none());
        table.insert(9, ResourceRole::DeviceEvents, CHANNEL_INTEREST);
        assert_eq!(
            table.find_role(ResourceRole::DeviceEvents).map(|r| r.fd),
            Some(9)
        );
    }
}
