#![cfg_attr(not(feature = "std"), no_std, no_main)]
mod amp_coef;
mod pool;

#[ink::contract]
pub mod stable_pool {
    use crate::pool::{ensure_deadline, StablePoolData};
    use amm_helpers::constants::stable_pool::N_COINS;
    use ink::codegen::{EmitEvent, TraitCallBuilder};
    use ink::contract_ref;
    use ink::prelude::{string::String, vec};
    use ink::ToAccountId;
    use lp_token_contract::lp_token::LpTokenRef;
    use psp22::PSP22;
    use traits::{PoolToken, RampState, StablePool, StablePoolError, StablePoolView};

    #[ink(event)]
    pub struct AddLiquidity {
        #[ink(topic)]
        pub provider: AccountId,
        pub token_amounts: [u128; N_COINS],
        pub fees: [u128; N_COINS],
        pub invariant: u128,
        pub lp_token_supply: u128,
    }

    #[ink(event)]
    pub struct RemoveLiquidity {
        #[ink(topic)]
        pub provider: AccountId,
        pub token_amounts: [u128; N_COINS],
        pub lp_token_supply: u128,
    }

    #[ink(event)]
    pub struct RemoveLiquidityOne {
        #[ink(topic)]
        pub provider: AccountId,
        pub lp_token_amount: u128,
        pub lp_token_supply: u128,
        #[ink(topic)]
        pub token_out: AccountId,
        pub amount_out: u128,
    }

    #[ink(event)]
    pub struct RemoveLiquidityImbalance {
        #[ink(topic)]
        pub provider: AccountId,
        pub token_amounts: [u128; N_COINS],
        pub fees: [u128; N_COINS],
        pub invariant: u128,
        pub lp_token_supply: u128,
    }

    #[ink(event)]
    pub struct Swap {
        #[ink(topic)]
        pub buyer: AccountId,
        #[ink(topic)]
        pub token_in: AccountId,
        pub amount_in: u128,
        #[ink(topic)]
        pub token_out: AccountId,
        pub amount_out: u128,
    }

    #[ink(event)]
    pub struct NewSwapFee {
        pub new_swap_fee: u64,
    }

    #[ink(event)]
    pub struct NewAdminFee {
        pub new_admin_fee: u64,
    }

    #[ink(event)]
    pub struct RampA {
        pub old_a: u128,
        pub new_a: u128,
        pub initial_time: u64,
        pub future_time: u64,
    }

    #[ink(event)]
    pub struct StopRampA {
        pub current_a: u128,
        pub time: u64,
    }

    #[ink(event)]
    pub struct OwnerChanged {
        #[ink(topic)]
        pub new_owner: AccountId,
    }

    #[ink(event)]
    pub struct WithdrawAdminFees {
        #[ink(topic)]
        pub to: AccountId,
        pub token_amounts: [u128; N_COINS],
    }

    #[ink(storage)]
    pub struct StablePoolContract {
        pool: StablePoolData,
        /// Share token minted to liquidity providers.
        lp_token: AccountId,
    }

    impl StablePoolContract {
        /// Creates the pool and deploys its share token from `lp_token_code_hash`.
        /// The caller becomes the owner.
        #[ink(constructor)]
        pub fn new(
            token0: AccountId,
            token1: AccountId,
            lp_name: String,
            lp_symbol: String,
            a: u128,
            swap_fee: u64,
            admin_fee: u64,
            lp_token_code_hash: Hash,
        ) -> Result<Self, StablePoolError> {
            let pool = StablePoolData::new(
                token0,
                token1,
                a,
                swap_fee,
                admin_fee,
                Self::env().caller(),
                Self::env().block_timestamp(),
            )?;
            let this = Self::env().account_id();
            let salt: [u8; 32] = *AsRef::<[u8; 32]>::as_ref(&this);
            let lp_token_ref = LpTokenRef::new()
                .code_hash(lp_token_code_hash)
                .endowment(0)
                .salt_bytes(salt)
                .try_instantiate()
                .map_err(|_| StablePoolError::LpTokenInitFailed)?
                .map_err(|_| StablePoolError::LpTokenInitFailed)?;
            let lp_token = lp_token_ref.to_account_id();

            let mut lp: contract_ref!(PoolToken) = lp_token.into();
            match lp
                .call_mut()
                .initialize(lp_name, lp_symbol, this)
                .try_invoke()
            {
                Ok(Ok(Ok(()))) => {}
                _ => return Err(StablePoolError::LpTokenInitFailed),
            }
            Ok(Self { pool, lp_token })
        }

        #[inline]
        fn token_by_address(&self, address: AccountId) -> contract_ref!(PSP22) {
            address.into()
        }

        #[inline]
        fn lp_token_ref(&self) -> contract_ref!(PoolToken) {
            self.lp_token.into()
        }

        fn lp_token_supply(&self) -> u128 {
            self.token_by_address(self.lp_token).total_supply()
        }

        fn ensure_deadline(&self, deadline: u64) -> Result<(), StablePoolError> {
            ensure_deadline(self.env().block_timestamp(), deadline)
        }

        /// Moves `amounts` of pooled tokens from the caller to the pool.
        fn pull_tokens(&self, amounts: [u128; N_COINS]) -> Result<(), StablePoolError> {
            for (&token, &amount) in self.pool.tokens().iter().zip(amounts.iter()) {
                if amount > 0 {
                    self.token_by_address(token).transfer_from(
                        self.env().caller(),
                        self.env().account_id(),
                        amount,
                        vec![],
                    )?;
                }
            }
            Ok(())
        }

        /// Moves `amounts` of pooled tokens from the pool to `to`.
        fn push_tokens(&self, to: AccountId, amounts: [u128; N_COINS]) -> Result<(), StablePoolError> {
            for (&token, &amount) in self.pool.tokens().iter().zip(amounts.iter()) {
                if amount > 0 {
                    self.token_by_address(token).transfer(to, amount, vec![])?;
                }
            }
            Ok(())
        }

        fn invariant(&self) -> Result<u128, StablePoolError> {
            let amp_coef = self.pool.amp_coef(self.env().block_timestamp())?;
            Ok(amm_helpers::stable_swap_math::compute_d(&self.pool.reserves(), amp_coef)?
                .try_into()
                .map_err(|_| traits::MathError::CastOverflow(101))?)
        }
    }

    impl StablePool for StablePoolContract {
        #[ink(message)]
        fn swap(
            &mut self,
            token_from: AccountId,
            dx: u128,
            min_dy: u128,
            deadline: u64,
        ) -> Result<u128, StablePoolError> {
            self.ensure_deadline(deadline)?;
            let token_in_id = self.pool.token_id(token_from)?;
            let outcome = self
                .pool
                .swap(token_in_id, dx, min_dy, self.env().block_timestamp())?;
            let token_out = self.pool.tokens()[outcome.token_out_id];

            // transfer token_in
            self.token_by_address(token_from).transfer_from(
                self.env().caller(),
                self.env().account_id(),
                dx,
                vec![],
            )?;
            // transfer token_out
            self.token_by_address(token_out)
                .transfer(self.env().caller(), outcome.amount_out, vec![])?;

            EmitEvent::<StablePoolContract>::emit_event(self.env(), Swap {
                buyer: self.env().caller(),
                token_in: token_from,
                amount_in: dx,
                token_out,
                amount_out: outcome.amount_out,
            });
            Ok(outcome.amount_out)
        }

        #[ink(message)]
        fn add_liquidity(
            &mut self,
            amounts: [u128; N_COINS],
            min_mint_amount: u128,
            deadline: u64,
        ) -> Result<u128, StablePoolError> {
            self.ensure_deadline(deadline)?;
            let supply = self.lp_token_supply();
            let (shares, fees) = self.pool.add_liquidity(
                amounts,
                min_mint_amount,
                supply,
                self.env().block_timestamp(),
            )?;

            self.pull_tokens(amounts)?;
            self.lp_token_ref().mint(self.env().caller(), shares)?;

            EmitEvent::<StablePoolContract>::emit_event(self.env(), AddLiquidity {
                provider: self.env().caller(),
                token_amounts: amounts,
                fees,
                invariant: self.invariant()?,
                lp_token_supply: supply + shares,
            });
            Ok(shares)
        }

        #[ink(message)]
        fn remove_liquidity(
            &mut self,
            amount: u128,
            min_amounts: [u128; N_COINS],
            deadline: u64,
        ) -> Result<[u128; N_COINS], StablePoolError> {
            self.ensure_deadline(deadline)?;
            let supply = self.lp_token_supply();
            let amounts = self.pool.remove_liquidity(amount, min_amounts, supply)?;

            self.lp_token_ref().burn(self.env().caller(), amount)?;
            self.push_tokens(self.env().caller(), amounts)?;

            EmitEvent::<StablePoolContract>::emit_event(self.env(), RemoveLiquidity {
                provider: self.env().caller(),
                token_amounts: amounts,
                lp_token_supply: supply - amount,
            });
            Ok(amounts)
        }

        #[ink(message)]
        fn remove_liquidity_imbalance(
            &mut self,
            amounts: [u128; N_COINS],
            max_burn_amount: u128,
            deadline: u64,
        ) -> Result<u128, StablePoolError> {
            self.ensure_deadline(deadline)?;
            let supply = self.lp_token_supply();
            let (burned, fees) = self.pool.remove_liquidity_imbalance(
                amounts,
                max_burn_amount,
                supply,
                self.env().block_timestamp(),
            )?;

            // fails if the caller does not own enough shares
            self.lp_token_ref().burn(self.env().caller(), burned)?;
            self.push_tokens(self.env().caller(), amounts)?;

            EmitEvent::<StablePoolContract>::emit_event(self.env(), RemoveLiquidityImbalance {
                provider: self.env().caller(),
                token_amounts: amounts,
                fees,
                invariant: self.invariant()?,
                lp_token_supply: supply - burned,
            });
            Ok(burned)
        }

        #[ink(message)]
        fn remove_liquidity_one_token(
            &mut self,
            amount: u128,
            token_out: AccountId,
            min_amount: u128,
            deadline: u64,
        ) -> Result<u128, StablePoolError> {
            self.ensure_deadline(deadline)?;
            let token_out_id = self.pool.token_id(token_out)?;
            let supply = self.lp_token_supply();
            let (amount_out, _) = self.pool.remove_liquidity_one_token(
                amount,
                token_out_id,
                min_amount,
                supply,
                self.env().block_timestamp(),
            )?;

            self.lp_token_ref().burn(self.env().caller(), amount)?;
            self.token_by_address(token_out)
                .transfer(self.env().caller(), amount_out, vec![])?;

            EmitEvent::<StablePoolContract>::emit_event(self.env(), RemoveLiquidityOne {
                provider: self.env().caller(),
                lp_token_amount: amount,
                lp_token_supply: supply - amount,
                token_out,
                amount_out,
            });
            Ok(amount_out)
        }

        #[ink(message)]
        fn set_swap_fee(&mut self, swap_fee: u64) -> Result<(), StablePoolError> {
            self.pool.set_swap_fee(self.env().caller(), swap_fee)?;
            EmitEvent::<StablePoolContract>::emit_event(self.env(), NewSwapFee {
                new_swap_fee: swap_fee,
            });
            Ok(())
        }

        #[ink(message)]
        fn set_admin_fee(&mut self, admin_fee: u64) -> Result<(), StablePoolError> {
            self.pool.set_admin_fee(self.env().caller(), admin_fee)?;
            EmitEvent::<StablePoolContract>::emit_event(self.env(), NewAdminFee {
                new_admin_fee: admin_fee,
            });
            Ok(())
        }

        #[ink(message)]
        fn ramp_a(&mut self, future_a: u128, future_time: u64) -> Result<(), StablePoolError> {
            let current_time = self.env().block_timestamp();
            self.pool
                .ramp_a(self.env().caller(), future_a, future_time, current_time)?;
            let (initial_a, future_a, initial_time, future_time) = self.pool.amp_params();
            EmitEvent::<StablePoolContract>::emit_event(self.env(), RampA {
                old_a: initial_a,
                new_a: future_a,
                initial_time,
                future_time,
            });
            Ok(())
        }

        #[ink(message)]
        fn stop_ramp_a(&mut self) -> Result<(), StablePoolError> {
            let current_time = self.env().block_timestamp();
            let current_a = self.pool.stop_ramp_a(self.env().caller(), current_time)?;
            EmitEvent::<StablePoolContract>::emit_event(self.env(), StopRampA {
                current_a,
                time: current_time,
            });
            Ok(())
        }

        #[ink(message)]
        fn withdraw_admin_fees(&mut self) -> Result<(), StablePoolError> {
            let owner = self.env().caller();
            let amounts = self.pool.take_admin_fees(owner)?;
            self.push_tokens(owner, amounts)?;
            EmitEvent::<StablePoolContract>::emit_event(self.env(), WithdrawAdminFees {
                to: owner,
                token_amounts: amounts,
            });
            Ok(())
        }

        #[ink(message)]
        fn set_owner(&mut self, new_owner: AccountId) -> Result<(), StablePoolError> {
            self.pool.set_owner(self.env().caller(), new_owner)?;
            EmitEvent::<StablePoolContract>::emit_event(self.env(), OwnerChanged { new_owner });
            Ok(())
        }
    }

    impl StablePoolView for StablePoolContract {
        #[ink(message)]
        fn token0(&self) -> AccountId {
            self.pool.tokens()[0]
        }

        #[ink(message)]
        fn token1(&self) -> AccountId {
            self.pool.tokens()[1]
        }

        // Actual token balances can be higher, they also hold admin fees.
        #[ink(message)]
        fn token0_balance(&self) -> u128 {
            self.pool.reserves()[0]
        }

        #[ink(message)]
        fn token1_balance(&self) -> u128 {
            self.pool.reserves()[1]
        }

        #[ink(message)]
        fn lp_token(&self) -> AccountId {
            self.lp_token
        }

        #[ink(message)]
        fn owner(&self) -> AccountId {
            self.pool.owner()
        }

        #[ink(message)]
        fn get_a(&self) -> Result<u128, StablePoolError> {
            Ok(self
                .pool
                .amp_coef_rounded(self.env().block_timestamp())?)
        }

        #[ink(message)]
        fn get_a_precise(&self) -> Result<u128, StablePoolError> {
            Ok(self.pool.amp_coef(self.env().block_timestamp())?)
        }

        #[ink(message)]
        fn ramp_state(&self) -> RampState {
            self.pool.ramp_state(self.env().block_timestamp())
        }

        #[ink(message)]
        fn fee_params(&self) -> (u64, u64) {
            let fees = self.pool.fees();
            (fees.swap_fee, fees.admin_fee)
        }

        #[ink(message)]
        fn amplification_params(&self) -> (u128, u128, u64, u64) {
            self.pool.amp_params()
        }

        #[ink(message)]
        fn admin_balance(&self, token: AccountId) -> Result<u128, StablePoolError> {
            let token_id = self.pool.token_id(token)?;
            Ok(self.pool.admin_fees()[token_id])
        }

        #[ink(message)]
        fn virtual_price(&self) -> Result<u128, StablePoolError> {
            self.pool
                .virtual_price(self.lp_token_supply(), self.env().block_timestamp())
        }

        #[ink(message)]
        fn calculate_swap(&self, token_from: AccountId, dx: u128) -> Result<u128, StablePoolError> {
            let token_in_id = self.pool.token_id(token_from)?;
            let (amount_out, _) =
                self.pool
                    .calculate_swap(token_in_id, dx, self.env().block_timestamp())?;
            Ok(amount_out)
        }

        #[ink(message)]
        fn calculate_token_amount(
            &self,
            amounts: [u128; N_COINS],
            deposit: bool,
        ) -> Result<u128, StablePoolError> {
            self.pool.calculate_token_amount(
                amounts,
                deposit,
                self.lp_token_supply(),
                self.env().block_timestamp(),
            )
        }

        #[ink(message)]
        fn calculate_remove_liquidity(
            &self,
            amount: u128,
        ) -> Result<[u128; N_COINS], StablePoolError> {
            self.pool
                .calculate_remove_liquidity(amount, self.lp_token_supply())
        }

        #[ink(message)]
        fn calculate_remove_liquidity_one_token(
            &self,
            amount: u128,
            token_out: AccountId,
        ) -> Result<(u128, u128), StablePoolError> {
            let token_out_id = self.pool.token_id(token_out)?;
            self.pool.calculate_remove_liquidity_one_token(
                amount,
                token_out_id,
                self.lp_token_supply(),
                self.env().block_timestamp(),
            )
        }
    }

}
