use soroban_sdk::{Address, Env};

use crate::{storage, Error};

/// Single-capability check guarding every administrative operation.
pub trait AccessGate {
    fn require_admin(&self, env: &Env, caller: &Address) -> Result<(), Error>;
}

/// Grants the capability to the admin recorded at `init`.
#[derive(Clone, Copy, Default)]
pub struct StoredAdmin;

impl AccessGate for StoredAdmin {
    fn require_admin(&self, env: &Env, caller: &Address) -> Result<(), Error> {
        let admin = storage::get_admin(env)?;
        caller.require_auth();
        if caller != &admin {
            return Err(Error::NotAuthorized);
        }
        Ok(())
    }
}
