// crates/fluxion-token/src/pause.rs
//
// Process-wide pause switch checked by balance-mutating user operations.

use serde::{Deserialize, Serialize};

use fluxion_core::{LedgerError, LedgerResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PauseSwitch {
    paused: bool,
}

impl PauseSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Fail with `Paused` while the switch is on.
    pub fn ensure_not_paused(&self) -> LedgerResult<()> {
        if self.paused {
            Err(LedgerError::Paused)
        } else {
            Ok(())
        }
    }

    /// Set the switch. Returns `true` if the state changed.
    pub fn set(&mut self, paused: bool) -> bool {
        let changed = self.paused != paused;
        self.paused = paused;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_unpaused() {
        let switch = PauseSwitch::new();
        assert!(!switch.is_paused());
        assert!(switch.ensure_not_paused().is_ok());
    }

    #[test]
    fn test_pause_and_unpause() {
        let mut switch = PauseSwitch::new();
        assert!(switch.set(true));
        assert!(!switch.set(true));
        assert_eq!(switch.ensure_not_paused(), Err(LedgerError::Paused));
        assert!(switch.set(false));
        assert!(switch.ensure_not_paused().is_ok());
    }
}
