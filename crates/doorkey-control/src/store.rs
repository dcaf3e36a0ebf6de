//! Password store backed by persistent storage.
//!
//! Holds the active password and a staging slot used while a new password
//! is confirmed. A staged password only becomes active once it has been
//! written and read back intact; a failed confirmation leaves the active
//! password as it was.

use doorkey_core::{Candidate, Password, constants::PASSWORD_LENGTH};
use doorkey_hardware::PersistentStorage;
use tracing::{error, info, warn};

use crate::error::{ControlError, Result};

#[derive(Debug)]
pub struct PasswordStore<P> {
    storage: P,
    address: u16,
    active: Option<Password>,
    staged: Option<Password>,
}

impl<P: PersistentStorage> PasswordStore<P> {
    pub fn new(storage: P, address: u16) -> Self {
        Self {
            storage,
            address,
            active: None,
            staged: None,
        }
    }

    pub fn is_provisioned(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&Password> {
        self.active.as_ref()
    }

    pub fn address(&self) -> u16 {
        self.address
    }

    pub fn storage(&self) -> &P {
        &self.storage
    }

    /// Hold `password` until it is confirmed.
    pub fn stage(&mut self, password: Password) {
        self.staged = Some(password);
    }

    /// Confirm the staged password against `confirmation`.
    ///
    /// On a match the staged password is persisted, verified and made
    /// active, and `Ok(true)` is returned. On a mismatch the staged password
    /// is discarded and `Ok(false)` is returned.
    ///
    /// # Errors
    ///
    /// - `ControlError::Hardware` if the storage write or read fails
    /// - `ControlError::StorageNotConfirmed` if the read-back differs
    pub async fn confirm(&mut self, confirmation: &Candidate) -> Result<bool> {
        let Some(staged) = self.staged.take() else {
            warn!("Confirmation without a staged password");
            return Ok(false);
        };

        if !staged.matches(confirmation) {
            warn!("Password confirmation mismatch");
            return Ok(false);
        }

        self.persist(&staged).await?;
        self.active = Some(staged);
        info!(address = self.address, "Password stored");
        Ok(true)
    }

    /// The active password, required by every privileged operation.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::NotProvisioned` if no password was ever set.
    pub fn active_or_err(&self) -> Result<&Password> {
        self.active.as_ref().ok_or(ControlError::NotProvisioned)
    }

    async fn persist(&mut self, password: &Password) -> Result<()> {
        let written = password.to_bytes();
        self.storage.write_bytes(self.address, &written).await?;

        let mut read_back = [0u8; PASSWORD_LENGTH];
        self.storage.read_bytes(self.address, &mut read_back).await?;
        if read_back != written {
            error!(address = self.address, "Password read-back mismatch");
            return Err(ControlError::StorageNotConfirmed {
                address: self.address,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doorkey_hardware::mock::{MockStorage, StorageFault};

    const ADDRESS: u16 = 0x0311;

    fn password(digits: [u8; 5]) -> Password {
        Password::new(digits).unwrap()
    }

    #[tokio::test]
    async fn test_confirmed_password_persisted_and_active() {
        let mut store = PasswordStore::new(MockStorage::new(), ADDRESS);
        assert!(!store.is_provisioned());

        store.stage(password([1, 2, 3, 4, 5]));
        assert!(store.confirm(&password([1, 2, 3, 4, 5])).await.unwrap());

        assert_eq!(store.active(), Some(&password([1, 2, 3, 4, 5])));
        assert_eq!(store.storage().peek(ADDRESS, 5), Some(&[1, 2, 3, 4, 5][..]));
    }

    #[tokio::test]
    async fn test_mismatch_keeps_active_password() {
        let mut store = PasswordStore::new(MockStorage::new(), ADDRESS);
        store.stage(password([1, 2, 3, 4, 5]));
        store.confirm(&password([1, 2, 3, 4, 5])).await.unwrap();

        store.stage(password([6, 6, 6, 6, 6]));
        assert!(!store.confirm(&password([6, 6, 6, 6, 7])).await.unwrap());

        assert_eq!(store.active(), Some(&password([1, 2, 3, 4, 5])));
        assert_eq!(store.storage().peek(ADDRESS, 5), Some(&[1, 2, 3, 4, 5][..]));
    }

    #[tokio::test]
    async fn test_confirm_without_stage() {
        let mut store = PasswordStore::new(MockStorage::new(), ADDRESS);
        assert!(!store.confirm(&password([1, 2, 3, 4, 5])).await.unwrap());
    }

    #[tokio::test]
    async fn test_dropped_write_reported() {
        let storage = MockStorage::new().with_fault(StorageFault::DropWrites);
        let mut store = PasswordStore::new(storage, ADDRESS);
        store.stage(password([1, 2, 3, 4, 5]));

        let err = store.confirm(&password([1, 2, 3, 4, 5])).await.unwrap_err();

        assert!(matches!(
            err,
            ControlError::StorageNotConfirmed { address: ADDRESS }
        ));
        assert!(!store.is_provisioned());
    }

    #[tokio::test]
    async fn test_failed_write_reported() {
        let storage = MockStorage::new().with_fault(StorageFault::FailWrites);
        let mut store = PasswordStore::new(storage, ADDRESS);
        store.stage(password([1, 2, 3, 4, 5]));

        let err = store.confirm(&password([1, 2, 3, 4, 5])).await.unwrap_err();
        assert!(matches!(err, ControlError::Hardware(_)));
    }

    #[test]
    fn test_not_provisioned() {
        let store = PasswordStore::new(MockStorage::new(), ADDRESS);
        assert!(matches!(
            store.active_or_err().unwrap_err(),
            ControlError::NotProvisioned
        ));
    }
}
