use std::{
    fmt::{
        Display,
        Formatter,
    },
    str::FromStr,
};

use serde::{
    Deserialize,
    Serialize,
};
use tokio::sync::watch;

/// How a datagram port treats sources other than its configured peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeerMode {
    /// Accept any source; always send to the configured peer.
    #[default]
    Permissive,
    /// Accept any source; send to whichever source spoke last.
    Learn,
    /// Drop datagrams that do not come from the configured peer.
    Strict,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown peer mode {0:?} (expected permissive, learn or strict)")]
pub struct ParsePeerModeError(String);

impl FromStr for PeerMode {
    type Err = ParsePeerModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "permissive" => Ok(PeerMode::Permissive),
            "learn" => Ok(PeerMode::Learn),
            "strict" => Ok(PeerMode::Strict),
            _ => Err(ParsePeerModeError(s.to_owned())),
        }
    }
}

impl Display for PeerMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            PeerMode::Permissive => "permissive",
            PeerMode::Learn => "learn",
            PeerMode::Strict => "strict",
        })
    }
}

/// Remote endpoint of a datagram port, shared by its reader and writer.
#[derive(Debug)]
pub struct Peer<A> {
    mode:       PeerMode,
    configured: A,
    current:    watch::Sender<A>,
}

impl<A> Peer<A>
where
    A: Clone + PartialEq,
{
    pub fn new(configured: A, mode: PeerMode) -> Self {
        let (current, _) = watch::channel(configured.clone());

        Self {
            mode,
            configured,
            current,
        }
    }

    #[inline]
    pub fn mode(&self) -> PeerMode {
        self.mode
    }

    /// Whether a datagram from `source` should be parsed.
    pub fn accept(&self, source: &A) -> bool {
        match self.mode {
            PeerMode::Permissive => true,
            PeerMode::Learn => {
                if *self.current.borrow() != *source {
                    self.current.send_replace(source.clone());
                }
                true
            },
            PeerMode::Strict => *source == self.configured,
        }
    }

    /// Where outbound datagrams go.
    #[inline]
    pub fn target(&self) -> A {
        self.current.borrow().clone()
    }
}

#[cfg(test)]
mod test {
    use std::net::SocketAddr;

    use super::*;

    fn addrs() -> (SocketAddr, SocketAddr) {
        ("127.0.0.1:14560".parse().unwrap(), "127.0.0.1:40000".parse().unwrap())
    }

    #[test]
    fn permissive_keeps_target() {
        let (configured, other) = addrs();
        let peer = Peer::new(configured, PeerMode::Permissive);

        assert!(peer.accept(&other));
        assert_eq!(peer.target(), configured);
    }

    #[test]
    fn learn_follows_source() {
        let (configured, other) = addrs();
        let peer = Peer::new(configured, PeerMode::Learn);

        assert_eq!(peer.target(), configured);
        assert!(peer.accept(&other));
        assert_eq!(peer.target(), other);
    }

    #[test]
    fn strict_filters() {
        let (configured, other) = addrs();
        let peer = Peer::new(configured, PeerMode::Strict);

        assert!(peer.accept(&configured));
        assert!(!peer.accept(&other));
        assert_eq!(peer.target(), configured);
    }

    #[test]
    fn parse() {
        assert_eq!("Strict".parse::<PeerMode>(), Ok(PeerMode::Strict));
        assert!("loose".parse::<PeerMode>().is_err());
    }
}
