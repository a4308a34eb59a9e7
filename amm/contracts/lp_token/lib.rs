#![cfg_attr(not(feature = "std"), no_std, no_main)]

#[ink::contract]
pub mod lp_token {
    use amm_helpers::{constants::stable_pool::POOL_TOKEN_DECIMALS, ensure};
    use ink::prelude::{string::String, vec::Vec};
    use psp22::{PSP22Data, PSP22Error, PSP22Event, PSP22Metadata, PSP22};
    use traits::PoolToken;

    #[ink(event)]
    pub struct Approval {
        /// Account providing allowance.
        #[ink(topic)]
        pub owner: AccountId,
        /// Allowance beneficiary.
        #[ink(topic)]
        pub spender: AccountId,
        /// New allowance amount.
        pub amount: u128,
    }

    /// Event emitted when transfer of tokens occurs.
    #[ink(event)]
    pub struct Transfer {
        /// Transfer sender. `None` in case of minting new tokens.
        #[ink(topic)]
        pub from: Option<AccountId>,
        /// Transfer recipient. `None` in case of burning tokens.
        #[ink(topic)]
        pub to: Option<AccountId>,
        /// Amount of tokens transferred (or minted/burned).
        pub value: u128,
    }

    #[ink(storage)]
    #[derive(Default)]
    pub struct LpToken {
        psp22: PSP22Data,
        name: Option<String>,
        symbol: Option<String>,
        /// Pool allowed to mint and burn.
        owner: Option<AccountId>,
    }

    fn custom_error(reason: &str) -> PSP22Error {
        PSP22Error::Custom(String::from(reason))
    }

    impl LpToken {
        /// Creates an uninitialized token with no supply.
        #[ink(constructor)]
        pub fn new() -> Self {
            Self::default()
        }

        /// A helper function emitting events contained in a vector of PSP22Events.
        fn emit_events(&self, events: Vec<PSP22Event>) {
            for event in events {
                match event {
                    PSP22Event::Transfer { from, to, value } => {
                        self.env().emit_event(Transfer { from, to, value })
                    }
                    PSP22Event::Approval {
                        owner,
                        spender,
                        amount,
                    } => self.env().emit_event(Approval {
                        owner,
                        spender,
                        amount,
                    }),
                }
            }
        }

        fn ensure_owner(&self) -> Result<(), PSP22Error> {
            ensure!(
                self.owner == Some(self.env().caller()),
                custom_error("Ownable: caller is not the owner")
            );
            Ok(())
        }

        fn ensure_not_self(&self, to: AccountId) -> Result<(), PSP22Error> {
            ensure!(
                to != self.env().account_id(),
                custom_error("LPToken: cannot send to itself")
            );
            Ok(())
        }
    }

    impl PoolToken for LpToken {
        #[ink(message)]
        fn initialize(
            &mut self,
            name: String,
            symbol: String,
            owner: AccountId,
        ) -> Result<(), PSP22Error> {
            ensure!(
                self.owner.is_none(),
                custom_error("Initializable: contract is already initialized")
            );
            self.name = Some(name);
            self.symbol = Some(symbol);
            self.owner = Some(owner);
            Ok(())
        }

        #[ink(message)]
        fn mint(&mut self, to: AccountId, value: u128) -> Result<(), PSP22Error> {
            self.ensure_owner()?;
            ensure!(value != 0, custom_error("LPToken: cannot mint 0"));
            let events = self.psp22.mint(to, value)?;
            self.emit_events(events);
            Ok(())
        }

        #[ink(message)]
        fn burn(&mut self, from: AccountId, value: u128) -> Result<(), PSP22Error> {
            self.ensure_owner()?;
            let events = self.psp22.burn(from, value)?;
            self.emit_events(events);
            Ok(())
        }

        #[ink(message)]
        fn owner(&self) -> Option<AccountId> {
            self.owner
        }
    }

    impl PSP22 for LpToken {
        #[ink(message)]
        fn total_supply(&self) -> u128 {
            self.psp22.total_supply()
        }

        #[ink(message)]
        fn balance_of(&self, owner: AccountId) -> u128 {
            self.psp22.balance_of(owner)
        }

        #[ink(message)]
        fn allowance(&self, owner: AccountId, spender: AccountId) -> u128 {
            self.psp22.allowance(owner, spender)
        }

        #[ink(message)]
        fn transfer(
            &mut self,
            to: AccountId,
            value: u128,
            _data: Vec<u8>,
        ) -> Result<(), PSP22Error> {
            self.ensure_not_self(to)?;
            let events = self.psp22.transfer(self.env().caller(), to, value)?;
            self.emit_events(events);
            Ok(())
        }

        #[ink(message)]
        fn transfer_from(
            &mut self,
            from: AccountId,
            to: AccountId,
            value: u128,
            _data: Vec<u8>,
        ) -> Result<(), PSP22Error> {
            self.ensure_not_self(to)?;
            let events = self
                .psp22
                .transfer_from(self.env().caller(), from, to, value)?;
            self.emit_events(events);
            Ok(())
        }

        #[ink(message)]
        fn approve(&mut self, spender: AccountId, value: u128) -> Result<(), PSP22Error> {
            let events = self.psp22.approve(self.env().caller(), spender, value)?;
            self.emit_events(events);
            Ok(())
        }

        #[ink(message)]
        fn increase_allowance(
            &mut self,
            spender: AccountId,
            delta_value: u128,
        ) -> Result<(), PSP22Error> {
            let events =
                self.psp22
                    .increase_allowance(self.env().caller(), spender, delta_value)?;
            self.emit_events(events);
            Ok(())
        }

        #[ink(message)]
        fn decrease_allowance(
            &mut self,
            spender: AccountId,
            delta_value: u128,
        ) -> Result<(), PSP22Error> {
            let events =
                self.psp22
                    .decrease_allowance(self.env().caller(), spender, delta_value)?;
            self.emit_events(events);
            Ok(())
        }
    }

    impl PSP22Metadata for LpToken {
        #[ink(message)]
        fn token_name(&self) -> Option<String> {
            self.name.clone()
        }

        #[ink(message)]
        fn token_symbol(&self) -> Option<String> {
            self.symbol.clone()
        }

        #[ink(message)]
        fn token_decimals(&self) -> u8 {
            POOL_TOKEN_DECIMALS
        }
    }

}
