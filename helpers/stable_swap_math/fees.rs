use crate::constants::stable_pool::{FEE_DENOMINATOR, MAX_ADMIN_FEE, MAX_SWAP_FEE};
use crate::math::{casted_mul, MathError};

/// Fee parameters, both given with `FEE_DENOMINATOR` precision.
///
/// `swap_fee` is charged on the output of a swap and on the imbalanced part of
/// liquidity operations. `admin_fee` is the part of every charged fee that is
/// kept aside for the pool owner instead of staying with liquidity providers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct Fees {
    pub swap_fee: u64,
    pub admin_fee: u64,
}

impl Fees {
    pub fn new(swap_fee: u64, admin_fee: u64) -> Option<Self> {
        if swap_fee > MAX_SWAP_FEE || admin_fee > MAX_ADMIN_FEE {
            None
        } else {
            Some(Self {
                swap_fee,
                admin_fee,
            })
        }
    }

    pub fn zero() -> Self {
        Self {
            swap_fee: 0,
            admin_fee: 0,
        }
    }

    /// Swap fee charged on the gross `amount`.
    pub fn swap_fee_from_gross(&self, amount: u128) -> Result<u128, MathError> {
        u128_ratio(amount, self.swap_fee, FEE_DENOMINATOR)
    }

    /// Part of the already charged `fee` that goes to the pool owner.
    /// Never more than `fee` itself, even for `admin_fee > FEE_DENOMINATOR`.
    pub fn admin_part(&self, fee: u128) -> Result<u128, MathError> {
        Ok(u128_ratio(fee, self.admin_fee, FEE_DENOMINATOR)?.min(fee))
    }

    /// Fee charged on the difference between the actual and the ideal (proportional)
    /// reserve of a single token. For two coins it is `swap_fee / 2` per token.
    ///
    /// https://github.com/curvefi/curve-contract/blob/e5fb8c0e0bcd2fe2e03634135806c0f36b245511/tests/simulation.py#L124
    pub fn normalized_trade_fee(&self, num_coins: u32, amount: u128) -> Result<u128, MathError> {
        let num_coins = u64::from(num_coins);
        let adjusted_trade_fee = self
            .swap_fee
            .checked_mul(num_coins)
            .ok_or(MathError::MulOverflow(61))?
            .checked_div(
                num_coins
                    .checked_sub(1)
                    .ok_or(MathError::SubUnderflow(61))?
                    .checked_mul(4)
                    .ok_or(MathError::MulOverflow(62))?,
            )
            .ok_or(MathError::DivByZero(61))?;
        u128_ratio(amount, adjusted_trade_fee, FEE_DENOMINATOR)
    }
}

fn u128_ratio(amount: u128, num: u64, denom: u64) -> Result<u128, MathError> {
    casted_mul(amount, num.into())
        .checked_div(denom.into())
        .ok_or(MathError::DivByZero(62))?
        .try_into()
        .map_err(|_| MathError::CastOverflow(61))
}
