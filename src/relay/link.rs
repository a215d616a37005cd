//! Connectivity state tracked by the supervisor.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkState {
    Down,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerState {
    Disconnected,
    Connecting,
    Connected,
}

/// The supervisor's view of connectivity.
///
/// The broker session can only be `Connecting`/`Connected` while the
/// network is `Up`; losing the network forces the session down with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkState {
    pub network: NetworkState,
    pub broker: BrokerState,
}

impl LinkState {
    pub fn new() -> Self {
        Self {
            network: NetworkState::Down,
            broker: BrokerState::Disconnected,
        }
    }

    pub fn network_up(&mut self) {
        self.network = NetworkState::Up;
    }

    pub fn network_lost(&mut self) {
        self.network = NetworkState::Down;
        self.broker = BrokerState::Disconnected;
    }

    pub fn broker_connecting(&mut self) {
        debug_assert_eq!(self.network, NetworkState::Up);
        self.broker = BrokerState::Connecting;
    }

    pub fn broker_connected(&mut self) {
        debug_assert_eq!(self.network, NetworkState::Up);
        self.broker = BrokerState::Connected;
    }

    pub fn broker_dropped(&mut self) {
        self.broker = BrokerState::Disconnected;
    }
}

impl Default for LinkState {
    fn default() -> Self {
        Self::new()
    }
}
