use crate::amp_coef::{AmplificationCoefficient, Timestamp};
use amm_helpers::{
    constants::stable_pool::N_COINS,
    ensure,
    stable_swap_math::{self as math, fees::Fees},
};
use ink::primitives::AccountId;
use traits::{MathError, RampState, StablePoolError};

/// Fails if the operation is executed after `deadline`.
pub fn ensure_deadline(current_time: Timestamp, deadline: Timestamp) -> Result<(), StablePoolError> {
    ensure!(current_time <= deadline, StablePoolError::DeadlineNotMet);
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapOutcome {
    pub token_in_id: usize,
    pub token_out_id: usize,
    /// Amount sent to the trader, swap fee deducted.
    pub amount_out: u128,
    pub fee: u128,
    /// Part of `fee` set aside for the owner.
    pub admin_fee: u128,
}

/// State of a two-token stable pool.
///
/// It does not interact with the environment: the caller supplies the current
/// time, the caller account and the share supply, moves the tokens and mints or
/// burns shares according to the returned values. Every operation validates all
/// of its bounds before it mutates anything.
#[derive(Debug, Clone, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct StablePoolData {
    /// Account allowed to change fees and ramp the amplification coefficient.
    owner: AccountId,
    /// Pooled tokens.
    tokens: [AccountId; N_COINS],
    /// Reserves backing the shares. Admin fees are not included.
    reserves: [u128; N_COINS],
    /// Admin fees collected and not yet withdrawn.
    admin_fees: [u128; N_COINS],
    /// Amplification coefficient.
    amp_coef: AmplificationCoefficient,
    /// Fees
    fees: Fees,
}

impl StablePoolData {
    pub fn new(
        token0: AccountId,
        token1: AccountId,
        a: u128,
        swap_fee: u64,
        admin_fee: u64,
        owner: AccountId,
        current_time: Timestamp,
    ) -> Result<Self, StablePoolError> {
        let zero_address = AccountId::from([0u8; 32]);
        ensure!(token0 != zero_address, StablePoolError::Token0ZeroAddress);
        ensure!(token1 != zero_address, StablePoolError::Token1ZeroAddress);
        ensure!(token0 != token1, StablePoolError::DuplicateTokens);
        let amp_coef = AmplificationCoefficient::new(a, current_time)?;
        let fees = Fees::new(swap_fee, 0).ok_or(StablePoolError::SwapFeeTooHigh)?;
        let fees = Fees::new(fees.swap_fee, admin_fee).ok_or(StablePoolError::AdminFeeTooHigh)?;
        Ok(Self {
            owner,
            tokens: [token0, token1],
            reserves: [0; N_COINS],
            admin_fees: [0; N_COINS],
            amp_coef,
            fees,
        })
    }

    pub fn owner(&self) -> AccountId {
        self.owner
    }

    pub fn tokens(&self) -> [AccountId; N_COINS] {
        self.tokens
    }

    pub fn reserves(&self) -> [u128; N_COINS] {
        self.reserves
    }

    pub fn admin_fees(&self) -> [u128; N_COINS] {
        self.admin_fees
    }

    pub fn fees(&self) -> Fees {
        self.fees
    }

    /// Returns (initial_a, future_a, initial_a_time, future_a_time).
    pub fn amp_params(&self) -> (u128, u128, Timestamp, Timestamp) {
        self.amp_coef.params()
    }

    /// Amplification coefficient with precision.
    pub fn amp_coef(&self, current_time: Timestamp) -> Result<u128, MathError> {
        self.amp_coef.compute_amp_coef(current_time)
    }

    /// Amplification coefficient without precision.
    pub fn amp_coef_rounded(&self, current_time: Timestamp) -> Result<u128, MathError> {
        self.amp_coef.compute_amp_coef_rounded(current_time)
    }

    pub fn ramp_state(&self, current_time: Timestamp) -> RampState {
        self.amp_coef.state(current_time)
    }

    pub fn ensure_owner(&self, caller: AccountId) -> Result<(), StablePoolError> {
        ensure!(caller == self.owner, StablePoolError::OnlyOwner);
        Ok(())
    }

    pub fn token_id(&self, token: AccountId) -> Result<usize, StablePoolError> {
        self.tokens
            .iter()
            .position(|&id| id == token)
            .ok_or(StablePoolError::InvalidTokenId(token))
    }

    /// Calculates (amount_out, fee) for swapping `token_in_amount` of `token_in_id`.
    pub fn calculate_swap(
        &self,
        token_in_id: usize,
        token_in_amount: u128,
        current_time: Timestamp,
    ) -> Result<(u128, u128), StablePoolError> {
        ensure!(token_in_amount > 0, StablePoolError::InsufficientInputAmount);
        Ok(math::swap_to(
            token_in_id,
            token_in_amount,
            other_token(token_in_id),
            &self.reserves,
            &self.fees,
            self.amp_coef(current_time)?,
        )?)
    }

    /// - calculates token_out amount
    /// - calculates swap fee
    /// - sets aside admin fee
    /// - updates reserves
    pub fn swap(
        &mut self,
        token_in_id: usize,
        token_in_amount: u128,
        min_token_out_amount: u128,
        current_time: Timestamp,
    ) -> Result<SwapOutcome, StablePoolError> {
        let token_out_id = other_token(token_in_id);
        let (amount_out, fee) = self.calculate_swap(token_in_id, token_in_amount, current_time)?;
        // Check if swapped amount is not less than min_token_out_amount
        ensure!(
            amount_out >= min_token_out_amount,
            StablePoolError::InsufficientOutputAmount
        );
        let admin_fee = self.fees.admin_part(fee)?;
        let new_reserve_in = self.reserves[token_in_id]
            .checked_add(token_in_amount)
            .ok_or(MathError::AddOverflow(101))?;
        let new_reserve_out = self.reserves[token_out_id]
            .checked_sub(amount_out)
            .and_then(|reserve| reserve.checked_sub(admin_fee))
            .ok_or(MathError::SubUnderflow(101))?;

        self.reserves[token_in_id] = new_reserve_in;
        self.reserves[token_out_id] = new_reserve_out;
        self.admin_fees[token_out_id] = self.admin_fees[token_out_id]
            .checked_add(admin_fee)
            .ok_or(MathError::AddOverflow(102))?;
        Ok(SwapOutcome {
            token_in_id,
            token_out_id,
            amount_out,
            fee,
            admin_fee,
        })
    }

    /// Deposits `amounts`. Returns (minted_shares, fees_per_token).
    pub fn add_liquidity(
        &mut self,
        amounts: [u128; N_COINS],
        min_mint_amount: u128,
        pool_token_supply: u128,
        current_time: Timestamp,
    ) -> Result<(u128, [u128; N_COINS]), StablePoolError> {
        if pool_token_supply == 0 {
            ensure!(
                amounts.iter().all(|&amount| amount > 0),
                StablePoolError::MustSupplyAllTokens
            );
        }
        let change = math::compute_lp_amount_for_deposit(
            &amounts,
            &self.reserves,
            pool_token_supply,
            &self.fees,
            self.amp_coef(current_time)?,
        )?;
        ensure!(
            change.d_1 > change.d_0,
            StablePoolError::InvariantNotIncreased
        );
        ensure!(
            change.shares >= min_mint_amount,
            StablePoolError::InsufficientLiquidityMinted
        );

        let fees = to_pair(&change.fees);
        let mut new_reserves = self.reserves;
        let mut new_admin_fees = self.admin_fees;
        for i in 0..N_COINS {
            let admin_fee = self.fees.admin_part(fees[i])?;
            new_reserves[i] = new_reserves[i]
                .checked_add(amounts[i])
                .and_then(|reserve| reserve.checked_sub(admin_fee))
                .ok_or(MathError::AddOverflow(103))?;
            new_admin_fees[i] = new_admin_fees[i]
                .checked_add(admin_fee)
                .ok_or(MathError::AddOverflow(104))?;
        }
        self.reserves = new_reserves;
        self.admin_fees = new_admin_fees;
        Ok((change.shares, fees))
    }

    /// Shares minted (`deposit`) or burned for `amounts`, fees ignored.
    pub fn calculate_token_amount(
        &self,
        amounts: [u128; N_COINS],
        deposit: bool,
        pool_token_supply: u128,
        current_time: Timestamp,
    ) -> Result<u128, StablePoolError> {
        if !deposit {
            ensure!(
                amounts
                    .iter()
                    .zip(self.reserves.iter())
                    .all(|(amount, reserve)| amount <= reserve),
                StablePoolError::AmountExceedsSupply
            );
        }
        Ok(math::compute_lp_amount_no_fee(
            &amounts,
            &self.reserves,
            pool_token_supply,
            deposit,
            self.amp_coef(current_time)?,
        )?)
    }

    /// Amounts paid out for burning `shares` proportionally.
    pub fn calculate_remove_liquidity(
        &self,
        shares: u128,
        pool_token_supply: u128,
    ) -> Result<[u128; N_COINS], StablePoolError> {
        ensure!(
            shares <= pool_token_supply,
            StablePoolError::SharesExceedTotalSupply
        );
        let amounts = math::compute_amounts_given_lp(shares, &self.reserves, pool_token_supply)?;
        Ok(to_pair(&amounts))
    }

    pub fn remove_liquidity(
        &mut self,
        shares: u128,
        min_amounts: [u128; N_COINS],
        pool_token_supply: u128,
    ) -> Result<[u128; N_COINS], StablePoolError> {
        let amounts = self.calculate_remove_liquidity(shares, pool_token_supply)?;
        // Check if enough tokens are withdrawn
        ensure!(
            amounts
                .iter()
                .zip(min_amounts.iter())
                .all(|(amount, min_amount)| amount >= min_amount),
            StablePoolError::InsufficientOutputAmount
        );
        for (reserve, amount) in self.reserves.iter_mut().zip(amounts.iter()) {
            // amount <= reserve, as shares <= supply
            *reserve -= amount;
        }
        Ok(amounts)
    }

    /// Withdraws exactly `amounts`. Returns (burned_shares, fees_per_token).
    pub fn remove_liquidity_imbalance(
        &mut self,
        amounts: [u128; N_COINS],
        max_burn_amount: u128,
        pool_token_supply: u128,
        current_time: Timestamp,
    ) -> Result<(u128, [u128; N_COINS]), StablePoolError> {
        ensure!(
            amounts
                .iter()
                .zip(self.reserves.iter())
                .all(|(amount, reserve)| amount <= reserve),
            StablePoolError::AmountExceedsBalance
        );
        let change = math::compute_lp_amount_for_withdraw(
            &amounts,
            &self.reserves,
            pool_token_supply,
            &self.fees,
            self.amp_coef(current_time)?,
        )?;
        ensure!(change.shares != 0, StablePoolError::ZeroBurnAmount);
        // round against the withdrawer
        let shares = change
            .shares
            .checked_add(1)
            .ok_or(MathError::AddOverflow(105))?;
        ensure!(
            shares <= max_burn_amount,
            StablePoolError::InsufficientLiquidityBurned
        );

        let fees = to_pair(&change.fees);
        let mut new_reserves = self.reserves;
        let mut new_admin_fees = self.admin_fees;
        for i in 0..N_COINS {
            let admin_fee = self.fees.admin_part(fees[i])?;
            new_reserves[i] = new_reserves[i]
                .checked_sub(amounts[i])
                .and_then(|reserve| reserve.checked_sub(admin_fee))
                .ok_or(MathError::SubUnderflow(102))?;
            new_admin_fees[i] = new_admin_fees[i]
                .checked_add(admin_fee)
                .ok_or(MathError::AddOverflow(106))?;
        }
        self.reserves = new_reserves;
        self.admin_fees = new_admin_fees;
        Ok((shares, fees))
    }

    /// Calculates (amount_out, fee) for burning `shares` into `token_out_id` only.
    pub fn calculate_remove_liquidity_one_token(
        &self,
        shares: u128,
        token_out_id: usize,
        pool_token_supply: u128,
        current_time: Timestamp,
    ) -> Result<(u128, u128), StablePoolError> {
        let (amount_out, fee, _) =
            self.withdraw_one_token(shares, token_out_id, pool_token_supply, current_time)?;
        Ok((amount_out, fee))
    }

    /// Returns (amount_out, fee, new_reserve) of a single-token withdrawal.
    /// The admin part of the fee leaves the reserve together with `amount_out`.
    fn withdraw_one_token(
        &self,
        shares: u128,
        token_out_id: usize,
        pool_token_supply: u128,
        current_time: Timestamp,
    ) -> Result<(u128, u128, u128), StablePoolError> {
        ensure!(
            shares <= pool_token_supply,
            StablePoolError::SharesExceedTotalSupply
        );
        let (amount_out, fee) = math::compute_withdraw_one_token(
            shares,
            token_out_id,
            &self.reserves,
            pool_token_supply,
            &self.fees,
            self.amp_coef(current_time)?,
        )?;
        let new_reserve = amount_out
            .checked_add(self.fees.admin_part(fee)?)
            .and_then(|total| self.reserves[token_out_id].checked_sub(total))
            .ok_or(StablePoolError::AmountExceedsAvailable)?;
        Ok((amount_out, fee, new_reserve))
    }

    /// Burns `shares` into `token_out_id` only. Returns (amount_out, fee).
    pub fn remove_liquidity_one_token(
        &mut self,
        shares: u128,
        token_out_id: usize,
        min_amount: u128,
        pool_token_supply: u128,
        current_time: Timestamp,
    ) -> Result<(u128, u128), StablePoolError> {
        let (amount_out, fee, new_reserve) =
            self.withdraw_one_token(shares, token_out_id, pool_token_supply, current_time)?;
        ensure!(
            amount_out >= min_amount,
            StablePoolError::InsufficientOutputAmount
        );
        let admin_fee = self.fees.admin_part(fee)?;
        self.reserves[token_out_id] = new_reserve;
        self.admin_fees[token_out_id] = self.admin_fees[token_out_id]
            .checked_add(admin_fee)
            .ok_or(MathError::AddOverflow(107))?;
        Ok((amount_out, fee))
    }

    pub fn virtual_price(
        &self,
        pool_token_supply: u128,
        current_time: Timestamp,
    ) -> Result<u128, StablePoolError> {
        Ok(math::compute_virtual_price(
            &self.reserves,
            pool_token_supply,
            self.amp_coef(current_time)?,
        )?)
    }

    pub fn set_swap_fee(&mut self, caller: AccountId, swap_fee: u64) -> Result<(), StablePoolError> {
        self.ensure_owner(caller)?;
        self.fees = Fees::new(swap_fee, self.fees.admin_fee).ok_or(StablePoolError::SwapFeeTooHigh)?;
        Ok(())
    }

    pub fn set_admin_fee(
        &mut self,
        caller: AccountId,
        admin_fee: u64,
    ) -> Result<(), StablePoolError> {
        self.ensure_owner(caller)?;
        self.fees =
            Fees::new(self.fees.swap_fee, admin_fee).ok_or(StablePoolError::AdminFeeTooHigh)?;
        Ok(())
    }

    pub fn ramp_a(
        &mut self,
        caller: AccountId,
        future_a: u128,
        future_time: Timestamp,
        current_time: Timestamp,
    ) -> Result<(), StablePoolError> {
        self.ensure_owner(caller)?;
        self.amp_coef
            .ramp_amp_coef(future_a, future_time, current_time)
    }

    /// Returns the coefficient (with precision) the ramp was stopped at.
    pub fn stop_ramp_a(
        &mut self,
        caller: AccountId,
        current_time: Timestamp,
    ) -> Result<u128, StablePoolError> {
        self.ensure_owner(caller)?;
        self.amp_coef.stop_ramp_amp_coef(current_time)
    }

    /// Resets collected admin fees and returns them.
    pub fn take_admin_fees(&mut self, caller: AccountId) -> Result<[u128; N_COINS], StablePoolError> {
        self.ensure_owner(caller)?;
        Ok(core::mem::replace(&mut self.admin_fees, [0; N_COINS]))
    }

    pub fn set_owner(&mut self, caller: AccountId, new_owner: AccountId) -> Result<(), StablePoolError> {
        self.ensure_owner(caller)?;
        self.owner = new_owner;
        Ok(())
    }
}

fn other_token(token_id: usize) -> usize {
    N_COINS - 1 - token_id
}

fn to_pair(values: &[u128]) -> [u128; N_COINS] {
    [values[0], values[1]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use amm_helpers::constants::stable_pool::{
        MAX_A, MAX_ADMIN_FEE, MAX_SWAP_FEE, MIN_RAMP_TIME, ONE_DAY,
    };
    use amm_helpers::stable_swap_math::compute_d;

    const ONE: u128 = 10u128.pow(18);
    const START: Timestamp = 1_700_000_000_000;
    /// 0.1%
    const SWAP_FEE: u64 = 10_000_000;

    fn account(id: u8) -> AccountId {
        AccountId::from([id; 32])
    }

    fn owner() -> AccountId {
        account(1)
    }

    fn token0() -> AccountId {
        account(10)
    }

    fn token1() -> AccountId {
        account(11)
    }

    /// Pool together with the share supply the contract would have minted.
    struct Harness {
        pool: StablePoolData,
        supply: u128,
    }

    impl Harness {
        fn new(a: u128, swap_fee: u64, admin_fee: u64) -> Self {
            Self {
                pool: StablePoolData::new(token0(), token1(), a, swap_fee, admin_fee, owner(), START)
                    .expect("Should create pool"),
                supply: 0,
            }
        }

        fn seeded(admin_fee: u64) -> Self {
            let mut harness = Self::new(50, SWAP_FEE, admin_fee);
            harness.add(ONE, ONE);
            harness
        }

        fn add(&mut self, amount0: u128, amount1: u128) -> u128 {
            let (shares, _) = self
                .pool
                .add_liquidity([amount0, amount1], 0, self.supply, START)
                .expect("Should add liquidity");
            self.supply += shares;
            shares
        }

        fn d(&self) -> u128 {
            compute_d(&self.pool.reserves(), self.pool.amp_coef(START).unwrap())
                .unwrap()
                .as_u128()
        }

        fn virtual_price(&self) -> u128 {
            self.pool.virtual_price(self.supply, START).unwrap()
        }
    }

    #[test]
    fn new_validates_tokens() {
        let zero = AccountId::from([0u8; 32]);
        assert_eq!(
            StablePoolData::new(zero, token1(), 50, 0, 0, owner(), START),
            Err(StablePoolError::Token0ZeroAddress)
        );
        assert_eq!(
            StablePoolData::new(token0(), zero, 50, 0, 0, owner(), START),
            Err(StablePoolError::Token1ZeroAddress)
        );
        assert_eq!(
            StablePoolData::new(token0(), token0(), 50, 0, 0, owner(), START),
            Err(StablePoolError::DuplicateTokens)
        );
    }

    #[test]
    fn new_validates_parameters() {
        assert_eq!(
            StablePoolData::new(token0(), token1(), MAX_A + 1, 0, 0, owner(), START),
            Err(StablePoolError::AmpTooHigh)
        );
        assert_eq!(
            StablePoolData::new(token0(), token1(), 50, MAX_SWAP_FEE + 1, 0, owner(), START),
            Err(StablePoolError::SwapFeeTooHigh)
        );
        assert_eq!(
            StablePoolData::new(token0(), token1(), 50, 0, MAX_ADMIN_FEE + 1, owner(), START),
            Err(StablePoolError::AdminFeeTooHigh)
        );
        let pool = StablePoolData::new(
            token0(),
            token1(),
            MAX_A,
            MAX_SWAP_FEE,
            MAX_ADMIN_FEE,
            owner(),
            START,
        )
        .unwrap();
        assert_eq!(pool.fees(), Fees::new(MAX_SWAP_FEE, MAX_ADMIN_FEE).unwrap());
        assert_eq!(pool.amp_coef_rounded(START), Ok(MAX_A));
        assert_eq!(pool.amp_params(), (MAX_A * 100, MAX_A * 100, START, START));
    }

    #[test]
    fn deadline() {
        assert_eq!(ensure_deadline(START, START), Ok(()));
        assert_eq!(
            ensure_deadline(START + 1, START),
            Err(StablePoolError::DeadlineNotMet)
        );
    }

    #[test]
    fn token_ids() {
        let harness = Harness::new(50, SWAP_FEE, 0);
        assert_eq!(harness.pool.token_id(token0()), Ok(0));
        assert_eq!(harness.pool.token_id(token1()), Ok(1));
        assert_eq!(
            harness.pool.token_id(account(12)),
            Err(StablePoolError::InvalidTokenId(account(12)))
        );
    }

    #[test]
    fn first_deposit_sets_ratio() {
        let mut harness = Harness::new(50, SWAP_FEE, 0);
        assert_eq!(
            harness.pool.add_liquidity([ONE, 0], 0, 0, START),
            Err(StablePoolError::MustSupplyAllTokens)
        );
        let shares = harness.add(ONE, ONE);
        assert_eq!(shares, 2 * ONE);
        assert_eq!(harness.pool.reserves(), [ONE, ONE]);
        assert_eq!(harness.virtual_price(), ONE);
    }

    #[test]
    fn calculate_swap_regression() {
        let harness = Harness::seeded(0);
        assert_eq!(
            harness.pool.calculate_swap(0, ONE / 10, START),
            Ok((99702611562565289, 99802413976541))
        );
        assert_eq!(
            harness.pool.calculate_swap(0, 0, START),
            Err(StablePoolError::InsufficientInputAmount)
        );
    }

    #[test]
    fn imbalanced_deposit_regression() {
        let mut harness = Harness::seeded(0);
        let (shares, fees) = harness
            .pool
            .add_liquidity([ONE, 3 * ONE], 0, harness.supply, START)
            .unwrap();
        harness.supply += shares;
        assert_eq!(shares, 3991672211258372957);
        assert_eq!(fees, [498168424469519, 501831575530480]);
        assert_eq!(harness.pool.reserves(), [2 * ONE, 4 * ONE]);
        assert_eq!(harness.virtual_price(), 1000167146429977312);
    }

    #[test]
    fn imbalanced_deposit_sets_admin_fees_aside() {
        let mut harness = Harness::seeded(5_000_000_000);
        harness.add(ONE, 3 * ONE);
        // half of the fee is kept for the owner
        assert_eq!(harness.pool.admin_fees(), [249084212234759, 250915787765240]);
        assert_eq!(
            harness.pool.reserves(),
            [2 * ONE - 249084212234759, 4 * ONE - 250915787765240]
        );
    }

    #[test]
    fn swap_updates_reserves() {
        let mut harness = Harness::seeded(0);
        let outcome = harness.pool.swap(0, ONE / 10, 0, START).unwrap();
        assert_eq!(
            outcome,
            SwapOutcome {
                token_in_id: 0,
                token_out_id: 1,
                amount_out: 99702611562565289,
                fee: 99802413976541,
                admin_fee: 0,
            }
        );
        assert_eq!(
            harness.pool.reserves(),
            [ONE + ONE / 10, ONE - 99702611562565289]
        );
        assert_eq!(harness.pool.admin_fees(), [0, 0]);
    }

    #[test]
    fn swap_with_admin_fee() {
        let mut harness = Harness::seeded(5_000_000_000);
        let outcome = harness.pool.swap(0, ONE / 10, 0, START).unwrap();
        assert_eq!(outcome.amount_out, 99702611562565289);
        assert_eq!(outcome.admin_fee, 49901206988270);
        assert_eq!(
            harness.pool.reserves(),
            [ONE + ONE / 10, 900247487230446441]
        );
        assert_eq!(harness.pool.admin_fees(), [0, 49901206988270]);
        assert_eq!(harness.virtual_price(), 1000025002938996598);

        assert_eq!(
            harness.pool.take_admin_fees(account(2)),
            Err(StablePoolError::OnlyOwner)
        );
        assert_eq!(harness.pool.take_admin_fees(owner()), Ok([0, 49901206988270]));
        assert_eq!(harness.pool.admin_fees(), [0, 0]);
    }

    #[test]
    fn swap_slippage() {
        let mut harness = Harness::seeded(0);
        let before = harness.pool.clone();
        assert_eq!(
            harness.pool.swap(0, ONE / 10, 99702611562565290, START),
            Err(StablePoolError::InsufficientOutputAmount)
        );
        assert_eq!(harness.pool, before);
        assert!(harness.pool.swap(0, ONE / 10, 99702611562565289, START).is_ok());
    }

    #[test]
    fn virtual_price_does_not_decrease_on_swaps() {
        let mut harness = Harness::seeded(0);
        let mut last_price = harness.virtual_price();
        for i in 0..10 {
            harness.pool.swap(i % 2, ONE / 7, 0, START).unwrap();
            let price = harness.virtual_price();
            assert!(price >= last_price, "Virtual price decreased");
            last_price = price;
        }
        assert_eq!(last_price, 1000715397242423029);
    }

    #[test]
    fn add_liquidity_slippage() {
        let mut harness = Harness::seeded(0);
        let before = harness.pool.clone();
        assert_eq!(
            harness
                .pool
                .add_liquidity([ONE, 3 * ONE], 3991672211258372958, harness.supply, START),
            Err(StablePoolError::InsufficientLiquidityMinted)
        );
        assert_eq!(harness.pool, before);
    }

    #[test]
    fn deposit_increases_invariant() {
        let mut harness = Harness::seeded(0);
        let d_before = harness.d();
        harness.add(ONE / 3, ONE / 5);
        assert!(harness.d() > d_before);
        assert_eq!(
            harness.pool.add_liquidity([0, 0], 0, harness.supply, START),
            Err(StablePoolError::InvariantNotIncreased)
        );
    }

    #[test]
    fn proportional_withdrawal() {
        let mut harness = Harness::seeded(0);
        assert_eq!(
            harness.pool.calculate_remove_liquidity(harness.supply + 1, harness.supply),
            Err(StablePoolError::SharesExceedTotalSupply)
        );
        let d_before = harness.d();
        let amounts = harness
            .pool
            .remove_liquidity(ONE / 2, [0, 0], harness.supply)
            .unwrap();
        assert_eq!(amounts, [ONE / 4, ONE / 4]);
        assert_eq!(harness.pool.reserves(), [3 * ONE / 4, 3 * ONE / 4]);
        harness.supply -= ONE / 2;
        let d_after = harness.d();
        // D shrinks with the supply
        assert!(d_after < d_before);
        assert!(d_after.abs_diff(d_before * harness.supply / (harness.supply + ONE / 2)) <= 1);
        assert_eq!(harness.virtual_price(), ONE);
    }

    #[test]
    fn proportional_withdrawal_slippage() {
        let mut harness = Harness::seeded(0);
        let before = harness.pool.clone();
        assert_eq!(
            harness
                .pool
                .remove_liquidity(ONE / 2, [ONE / 4, ONE / 4 + 1], harness.supply),
            Err(StablePoolError::InsufficientOutputAmount)
        );
        assert_eq!(harness.pool, before);
    }

    #[test]
    fn imbalanced_withdrawal() {
        let mut harness = Harness::seeded(0);
        assert_eq!(
            harness
                .pool
                .remove_liquidity_imbalance([ONE + 1, 0], u128::MAX, harness.supply, START),
            Err(StablePoolError::AmountExceedsBalance)
        );
        let before = harness.pool.clone();
        assert_eq!(
            harness.pool.remove_liquidity_imbalance(
                [ONE / 10, 0],
                100101740076005336,
                harness.supply,
                START
            ),
            Err(StablePoolError::InsufficientLiquidityBurned)
        );
        assert_eq!(harness.pool, before);
        let (burned, fees) = harness
            .pool
            .remove_liquidity_imbalance([ONE / 10, 0], 100101740076005337, harness.supply, START)
            .unwrap();
        assert_eq!(burned, 100101740076005337);
        assert_eq!(fees, [24987065316519, 25012934683480]);
        assert_eq!(harness.pool.reserves(), [ONE - ONE / 10, ONE]);
    }

    #[test]
    fn imbalanced_withdrawal_of_nothing_fails() {
        let mut harness = Harness::seeded(0);
        assert_eq!(
            harness
                .pool
                .remove_liquidity_imbalance([0, 0], u128::MAX, harness.supply, START),
            Err(StablePoolError::ZeroBurnAmount)
        );
    }

    #[test]
    fn single_token_withdrawal() {
        let mut harness = Harness::seeded(0);
        assert_eq!(
            harness
                .pool
                .calculate_remove_liquidity_one_token(ONE / 10, 0, harness.supply, START),
            Ok((99898393914147000, 49922376610129))
        );
        assert_eq!(
            harness.pool.calculate_remove_liquidity_one_token(
                harness.supply + 1,
                0,
                harness.supply,
                START
            ),
            Err(StablePoolError::SharesExceedTotalSupply)
        );
        let before = harness.pool.clone();
        assert_eq!(
            harness.pool.remove_liquidity_one_token(
                ONE / 10,
                1,
                99898393914147001,
                harness.supply,
                START
            ),
            Err(StablePoolError::InsufficientOutputAmount)
        );
        assert_eq!(harness.pool, before);
        let (amount, _) = harness
            .pool
            .remove_liquidity_one_token(ONE / 10, 1, 0, harness.supply, START)
            .unwrap();
        assert_eq!(amount, 99898393914147000);
        assert_eq!(harness.pool.reserves(), [ONE, ONE - 99898393914147000]);
    }

    #[test]
    fn calculate_token_amount() {
        let harness = Harness::seeded(0);
        assert_eq!(
            harness
                .pool
                .calculate_token_amount([ONE + 1, 0], false, harness.supply, START),
            Err(StablePoolError::AmountExceedsSupply)
        );
        assert_eq!(
            harness
                .pool
                .calculate_token_amount([ONE / 10, 0], false, harness.supply, START),
            Ok(100051738733921990)
        );
        let fresh = Harness::new(50, SWAP_FEE, 0);
        assert_eq!(
            fresh.pool.calculate_token_amount([ONE, ONE], true, 0, START),
            Ok(2 * ONE)
        );
    }

    #[test]
    fn quote_round_trip() {
        let harness = Harness::seeded(0);
        let amounts = [ONE / 4, ONE / 4];
        let shares = harness
            .pool
            .calculate_token_amount(amounts, true, harness.supply, START)
            .unwrap();
        assert_eq!(shares, ONE / 2);
        assert_eq!(
            harness.pool.calculate_remove_liquidity(shares, harness.supply),
            Ok(amounts)
        );
    }

    #[test]
    fn fee_setters_are_owner_only_and_bounded() {
        let mut harness = Harness::new(50, SWAP_FEE, 0);
        assert_eq!(
            harness.pool.set_swap_fee(account(2), 0),
            Err(StablePoolError::OnlyOwner)
        );
        assert_eq!(
            harness.pool.set_swap_fee(owner(), MAX_SWAP_FEE + 1),
            Err(StablePoolError::SwapFeeTooHigh)
        );
        assert_eq!(
            harness.pool.set_admin_fee(owner(), MAX_ADMIN_FEE + 1),
            Err(StablePoolError::AdminFeeTooHigh)
        );
        assert_eq!(harness.pool.set_swap_fee(owner(), MAX_SWAP_FEE), Ok(()));
        assert_eq!(harness.pool.set_admin_fee(owner(), MAX_ADMIN_FEE), Ok(()));
        assert_eq!(
            harness.pool.fees(),
            Fees::new(MAX_SWAP_FEE, MAX_ADMIN_FEE).unwrap()
        );
    }

    #[test]
    fn ownership_transfer() {
        let mut harness = Harness::new(50, SWAP_FEE, 0);
        assert_eq!(
            harness.pool.set_owner(account(2), account(2)),
            Err(StablePoolError::OnlyOwner)
        );
        assert_eq!(harness.pool.set_owner(owner(), account(2)), Ok(()));
        assert_eq!(harness.pool.owner(), account(2));
        assert_eq!(
            harness.pool.set_swap_fee(owner(), 0),
            Err(StablePoolError::OnlyOwner)
        );
    }

    #[test]
    fn ramp_is_owner_only() {
        let mut harness = Harness::seeded(0);
        let now = START + ONE_DAY;
        assert_eq!(
            harness.pool.ramp_a(account(2), 100, now + MIN_RAMP_TIME, now),
            Err(StablePoolError::OnlyOwner)
        );
        assert_eq!(
            harness.pool.stop_ramp_a(account(2), now),
            Err(StablePoolError::OnlyOwner)
        );
    }

    #[test]
    fn ramp_changes_pricing() {
        let mut harness = Harness::seeded(0);
        let now = START + ONE_DAY;
        let end = now + MIN_RAMP_TIME;
        let (quote_before, _) = harness.pool.calculate_swap(0, ONE / 10, now).unwrap();
        harness.pool.ramp_a(owner(), 100, end, now).unwrap();
        assert_eq!(harness.pool.ramp_state(now), RampState::Ramping);
        assert_eq!(harness.pool.amp_coef_rounded(now + MIN_RAMP_TIME / 2), Ok(75));
        let (quote_after, _) = harness.pool.calculate_swap(0, ONE / 10, end).unwrap();
        // flatter curve, less slippage
        assert!(quote_after > quote_before);
        assert_eq!(harness.pool.ramp_state(end), RampState::Stable);
        assert_eq!(harness.pool.amp_coef_rounded(end), Ok(100));
    }

    #[test]
    fn stop_ramp_freezes_coefficient() {
        let mut harness = Harness::seeded(0);
        let now = START + ONE_DAY;
        harness
            .pool
            .ramp_a(owner(), 100, now + MIN_RAMP_TIME, now)
            .unwrap();
        let halfway = now + MIN_RAMP_TIME / 2;
        assert_eq!(harness.pool.stop_ramp_a(owner(), halfway), Ok(7_500));
        assert_eq!(harness.pool.amp_coef(halfway + MIN_RAMP_TIME), Ok(7_500));
        assert_eq!(
            harness.pool.stop_ramp_a(owner(), halfway),
            Err(StablePoolError::RampAlreadyStopped)
        );
    }

    #[test]
    fn virtual_price_holds_with_full_admin_fee() {
        let mut harness = Harness::new(50, SWAP_FEE, MAX_ADMIN_FEE);
        harness.add(ONE, ONE);
        let mut last_price = harness.virtual_price();
        for i in 0..10 {
            let outcome = harness.pool.swap(i % 2, ONE / 7, 0, START).unwrap();
            // the owner takes at most the whole fee
            assert_eq!(outcome.admin_fee, outcome.fee);
            let price = harness.virtual_price();
            assert!(price >= last_price, "Virtual price decreased");
            last_price = price;
        }
        assert_eq!(last_price, ONE);
        assert_eq!(harness.pool.admin_fees(), [716297053930421, 712274295314288]);
    }

    #[test]
    fn single_token_quote_matches_withdrawal() {
        let mut harness = Harness::new(50, MAX_SWAP_FEE, MAX_ADMIN_FEE);
        harness.add(ONE, ONE);
        let shares = harness.supply * 99 / 100;
        let quote = harness
            .pool
            .calculate_remove_liquidity_one_token(shares, 0, harness.supply, START);
        assert_eq!(quote, Ok((999499978411887308, 500001184113933)));
        let (amount_out, _) = *quote.as_ref().unwrap();
        assert_eq!(
            harness
                .pool
                .remove_liquidity_one_token(shares, 0, amount_out, harness.supply, START),
            quote
        );
        assert_eq!(harness.pool.reserves(), [20403998759, ONE]);
        assert_eq!(harness.pool.admin_fees(), [500001184113933, 0]);
    }
}
