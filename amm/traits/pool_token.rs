use ink::prelude::string::String;
use ink::primitives::AccountId;
use psp22::PSP22Error;

/// Share token of a stable pool.
///
/// A fresh instance is bound to its pool by `initialize`, after which only the
/// pool may change the supply.
#[ink::trait_definition]
pub trait PoolToken {
    /// Sets metadata and the account allowed to mint and burn.
    /// Fails if the token has already been initialized.
    #[ink(message)]
    fn initialize(
        &mut self,
        name: String,
        symbol: String,
        owner: AccountId,
    ) -> Result<(), PSP22Error>;

    /// Mints `value` shares to `to`. Owner only.
    #[ink(message)]
    fn mint(&mut self, to: AccountId, value: u128) -> Result<(), PSP22Error>;

    /// Burns `value` shares of `from`. Owner only.
    #[ink(message)]
    fn burn(&mut self, from: AccountId, value: u128) -> Result<(), PSP22Error>;

    /// Account allowed to mint and burn, `None` before initialization.
    #[ink(message)]
    fn owner(&self) -> Option<AccountId>;
}
