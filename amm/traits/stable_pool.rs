use ink::primitives::AccountId;
use ink::LangError;
use psp22::PSP22Error;

use crate::MathError;

/// State of the amplification coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub enum RampState {
    /// Coefficient is constant.
    Stable,
    /// Coefficient moves linearly towards the ramp target.
    Ramping,
}

#[ink::trait_definition]
pub trait StablePoolView {
    /// Returns the first pooled token.
    #[ink(message)]
    fn token0(&self) -> AccountId;

    /// Returns the second pooled token.
    #[ink(message)]
    fn token1(&self) -> AccountId;

    /// Returns the reserve of the first pooled token.
    #[ink(message)]
    fn token0_balance(&self) -> u128;

    /// Returns the reserve of the second pooled token.
    #[ink(message)]
    fn token1_balance(&self) -> u128;

    /// Returns the share token of the pool.
    #[ink(message)]
    fn lp_token(&self) -> AccountId;

    #[ink(message)]
    fn owner(&self) -> AccountId;

    /// Returns current value of amplification coefficient.
    #[ink(message)]
    fn get_a(&self) -> Result<u128, StablePoolError>;

    /// Returns current value of amplification coefficient, with A_PRECISION.
    #[ink(message)]
    fn get_a_precise(&self) -> Result<u128, StablePoolError>;

    #[ink(message)]
    fn ramp_state(&self) -> RampState;

    /// Returns (swap_fee, admin_fee).
    #[ink(message)]
    fn fee_params(&self) -> (u64, u64);

    /// Returns (initial_a, future_a, initial_a_time, future_a_time).
    /// Coefficients are given with A_PRECISION.
    #[ink(message)]
    fn amplification_params(&self) -> (u128, u128, u64, u64);

    /// Admin fees collected in `token` and not withdrawn yet.
    #[ink(message)]
    fn admin_balance(&self, token: AccountId) -> Result<u128, StablePoolError>;

    /// Value of a single share, with the share token precision.
    #[ink(message)]
    fn virtual_price(&self) -> Result<u128, StablePoolError>;

    /// Calculate amount of the other token received for `dx` of `token_from`.
    /// Swap fee is already deducted.
    #[ink(message)]
    fn calculate_swap(&self, token_from: AccountId, dx: u128) -> Result<u128, StablePoolError>;

    /// Calculate how many shares are minted (`deposit`) or burned (`!deposit`)
    /// for `amounts`. Fees are not included, so it is only a quote for slippage bounds.
    #[ink(message)]
    fn calculate_token_amount(
        &self,
        amounts: [u128; 2],
        deposit: bool,
    ) -> Result<u128, StablePoolError>;

    /// Calculate amounts of both tokens withdrawn for burning `amount` shares.
    #[ink(message)]
    fn calculate_remove_liquidity(&self, amount: u128) -> Result<[u128; 2], StablePoolError>;

    /// Calculate amount of `token_out` withdrawn for burning `amount` shares.
    /// Returns (amount_out, fee)
    #[ink(message)]
    fn calculate_remove_liquidity_one_token(
        &self,
        amount: u128,
        token_out: AccountId,
    ) -> Result<(u128, u128), StablePoolError>;
}

#[ink::trait_definition]
pub trait StablePool {
    /// Swaps `dx` of `token_from` for the other token.
    /// Caller must allow enough spending allowance of `token_from` for this contract.
    /// Returns an error if the received amount is less than `min_dy`.
    /// Returns the received amount.
    #[ink(message)]
    fn swap(
        &mut self,
        token_from: AccountId,
        dx: u128,
        min_dy: u128,
        deadline: u64,
    ) -> Result<u128, StablePoolError>;

    /// Deposits `amounts` of both tokens and mints shares to the caller.
    /// Returns an error if minted shares are less than `min_mint_amount`.
    /// Returns minted shares.
    #[ink(message)]
    fn add_liquidity(
        &mut self,
        amounts: [u128; 2],
        min_mint_amount: u128,
        deadline: u64,
    ) -> Result<u128, StablePoolError>;

    /// Burns `amount` shares and withdraws both tokens proportionally.
    /// Fails if any of the amounts received is less than in `min_amounts`.
    #[ink(message)]
    fn remove_liquidity(
        &mut self,
        amount: u128,
        min_amounts: [u128; 2],
        deadline: u64,
    ) -> Result<[u128; 2], StablePoolError>;

    /// Withdraws exactly `amounts` and burns shares accordingly.
    /// Returns an error if more than `max_burn_amount` shares would be burned.
    /// Returns burned shares.
    #[ink(message)]
    fn remove_liquidity_imbalance(
        &mut self,
        amounts: [u128; 2],
        max_burn_amount: u128,
        deadline: u64,
    ) -> Result<u128, StablePoolError>;

    /// Burns `amount` shares and withdraws only `token_out`.
    /// Returns withdrawn amount.
    #[ink(message)]
    fn remove_liquidity_one_token(
        &mut self,
        amount: u128,
        token_out: AccountId,
        min_amount: u128,
        deadline: u64,
    ) -> Result<u128, StablePoolError>;

    #[ink(message)]
    fn set_swap_fee(&mut self, swap_fee: u64) -> Result<(), StablePoolError>;

    #[ink(message)]
    fn set_admin_fee(&mut self, admin_fee: u64) -> Result<(), StablePoolError>;

    /// Starts moving the amplification coefficient towards `future_a`
    /// (without precision), reaching it at `future_time`.
    #[ink(message)]
    fn ramp_a(&mut self, future_a: u128, future_time: u64) -> Result<(), StablePoolError>;

    /// Freezes the amplification coefficient at its current value.
    #[ink(message)]
    fn stop_ramp_a(&mut self) -> Result<(), StablePoolError>;

    /// Transfers collected admin fees to the owner.
    #[ink(message)]
    fn withdraw_admin_fees(&mut self) -> Result<(), StablePoolError>;

    #[ink(message)]
    fn set_owner(&mut self, new_owner: AccountId) -> Result<(), StablePoolError>;
}

#[derive(Debug, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub enum StablePoolError {
    MathError(MathError),
    PSP22Error(PSP22Error),
    LangError(LangError),
    Token0ZeroAddress,
    Token1ZeroAddress,
    DuplicateTokens,
    InvalidTokenId(AccountId),
    AmpTooLow,
    AmpTooHigh,
    SwapFeeTooHigh,
    AdminFeeTooHigh,
    LpTokenInitFailed,
    OnlyOwner,
    DeadlineNotMet,
    InsufficientInputAmount,
    InsufficientOutputAmount,
    InsufficientLiquidityMinted,
    InsufficientLiquidityBurned,
    MustSupplyAllTokens,
    InvariantNotIncreased,
    ZeroBurnAmount,
    AmountExceedsSupply,
    AmountExceedsAvailable,
    AmountExceedsBalance,
    SharesExceedTotalSupply,
    RampCooldown,
    InsufficientRampTime,
    FutureAOutOfRange,
    FutureATooSmall,
    FutureATooLarge,
    RampAlreadyStopped,
}

impl StablePoolError {
    /// Failure reason as known to clients.
    pub fn reason(&self) -> &'static str {
        match self {
            StablePoolError::MathError(_) => "Math error",
            StablePoolError::PSP22Error(_) => "Token transfer failed",
            StablePoolError::LangError(_) => "Cross-contract call failed",
            StablePoolError::Token0ZeroAddress => "TOKEN0_ZEROADDRESS",
            StablePoolError::Token1ZeroAddress => "TOKEN1_ZEROADDRESS",
            StablePoolError::DuplicateTokens => "DUPLICATE_TOKENS",
            StablePoolError::InvalidTokenId(_) => "Token not found",
            StablePoolError::AmpTooLow => "_a below minimum",
            StablePoolError::AmpTooHigh => "_a exceeds maximum",
            StablePoolError::SwapFeeTooHigh => "_fee exceeds maximum",
            StablePoolError::AdminFeeTooHigh => "_adminFee exceeds maximum",
            StablePoolError::LpTokenInitFailed => "could not init lpToken clone",
            StablePoolError::OnlyOwner => "Ownable: caller is not the owner",
            StablePoolError::DeadlineNotMet => "Deadline not met",
            StablePoolError::InsufficientInputAmount => "Cannot swap zero amount",
            StablePoolError::InsufficientOutputAmount => "dy < minAmount",
            StablePoolError::InsufficientLiquidityMinted => "Couldn't mint min requested",
            StablePoolError::InsufficientLiquidityBurned => "tokenAmount > maxBurnAmount",
            StablePoolError::MustSupplyAllTokens => "Must supply all tokens in pool",
            StablePoolError::InvariantNotIncreased => "D should increase",
            StablePoolError::ZeroBurnAmount => "Burnt amount cannot be zero",
            StablePoolError::AmountExceedsSupply => "AMOUNT_EXCEEDS_SUPPLY",
            StablePoolError::AmountExceedsAvailable => "AMOUNT_EXCEEDS_AVAILABLE",
            StablePoolError::AmountExceedsBalance => "AMOUNT_EXCEEDS_BALANCE",
            StablePoolError::SharesExceedTotalSupply => "Cannot exceed total supply",
            StablePoolError::RampCooldown => "Wait 1 day before starting ramp",
            StablePoolError::InsufficientRampTime => "Insufficient ramp time",
            StablePoolError::FutureAOutOfRange => "futureA_ must be > 0 and < MAX_A",
            StablePoolError::FutureATooSmall => "futureA_ is too small",
            StablePoolError::FutureATooLarge => "futureA_ is too large",
            StablePoolError::RampAlreadyStopped => "Ramp is already stopped",
        }
    }
}

impl core::fmt::Display for StablePoolError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.reason())
    }
}

impl From<PSP22Error> for StablePoolError {
    fn from(error: PSP22Error) -> Self {
        StablePoolError::PSP22Error(error)
    }
}

impl From<LangError> for StablePoolError {
    fn from(error: LangError) -> Self {
        StablePoolError::LangError(error)
    }
}

impl From<MathError> for StablePoolError {
    fn from(error: MathError) -> Self {
        StablePoolError::MathError(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ink::prelude::string::ToString;

    #[test]
    fn reasons_match_client_strings() {
        assert_eq!(StablePoolError::Token0ZeroAddress.reason(), "TOKEN0_ZEROADDRESS");
        assert_eq!(StablePoolError::DeadlineNotMet.to_string(), "Deadline not met");
        assert_eq!(
            StablePoolError::FutureAOutOfRange.to_string(),
            "futureA_ must be > 0 and < MAX_A"
        );
        assert_eq!(
            StablePoolError::RampCooldown.to_string(),
            "Wait 1 day before starting ramp"
        );
    }

    #[test]
    fn math_errors_convert() {
        let err: StablePoolError = MathError::DivByZero(3).into();
        assert_eq!(err, StablePoolError::MathError(MathError::DivByZero(3)));
    }
}
