pub mod fees;

use crate::constants::stable_pool::{A_PRECISION, POOL_TOKEN_PRECISION};
use crate::math::{abs_diff, casted_mul, MathError};
use ink::prelude::{vec, vec::Vec};
use primitive_types::U256;

use fees::Fees;

/// Max number of iterations for curve computation using Newton–Raphson method
pub const MAX_ITERATIONS: u8 = 255;

/// Outcome of an imbalanced liquidity change (deposit or withdrawal by amounts).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidityChange {
    /// Shares to mint (deposit) or to burn (withdrawal).
    pub shares: u128,
    /// Imbalance fee charged on each token.
    pub fees: Vec<u128>,
    /// Invariant before the change.
    pub d_0: U256,
    /// Invariant after the change, before fees.
    pub d_1: U256,
}

/// Computes stable swap invariant (D)
///
/// `amp_coef` is expected with `A_PRECISION`.
pub fn compute_d(amounts: &[u128], amp_coef: u128) -> Result<U256, MathError> {
    // SUM{x_i}
    let amount_sum = amounts.iter().try_fold(U256::from(0), |acc, &amount| {
        acc.checked_add(amount.into())
            .ok_or(MathError::AddOverflow(1))
    })?;
    if amount_sum == 0.into() {
        return Ok(0.into());
    }
    let n = amounts.len() as u32;
    // A * n
    let ann: U256 = casted_mul(amp_coef, n.into());
    // A * n * SUM{x_i} / A_PRECISION
    let ann_sum = ann
        .checked_mul(amount_sum)
        .ok_or(MathError::MulOverflow(1))?
        .checked_div(A_PRECISION.into())
        .ok_or(MathError::DivByZero(1))?;
    // A * n - A_PRECISION
    let ann_sub_one = ann
        .checked_sub(A_PRECISION.into())
        .ok_or(MathError::SubUnderflow(1))?;
    // n + 1
    let n_add_one = n.checked_add(1).ok_or(MathError::AddOverflow(2))?;
    let mut d = amount_sum;
    // Computes next D until satisfying precision is reached
    for _ in 0..MAX_ITERATIONS {
        let d_next = compute_d_next(d, n, amounts, ann_sum, ann_sub_one, n_add_one)?;
        if abs_diff(d_next, d) <= 1.into() {
            return Ok(d_next);
        }
        d = d_next;
    }
    Err(MathError::NoConvergence(1))
}

fn compute_d_next(
    d_prev: U256,
    n: u32,
    amounts: &[u128],
    ann_sum: U256,
    ann_sub_one: U256,
    n_add_one: u32,
) -> Result<U256, MathError> {
    let mut d_prod = d_prev;
    // d_prod = ... * [d_prev / (x_(i) * n)] * ...
    // where i in (0,n)
    for &amount in amounts {
        d_prod = d_prod
            .checked_mul(d_prev)
            .ok_or(MathError::MulOverflow(2))?
            .checked_div(casted_mul(amount, n.into()))
            .ok_or(MathError::DivByZero(2))?;
    }
    let numerator = d_prod
        .checked_mul(n.into())
        .ok_or(MathError::MulOverflow(3))?
        .checked_add(ann_sum)
        .ok_or(MathError::AddOverflow(3))?
        .checked_mul(d_prev)
        .ok_or(MathError::MulOverflow(4))?;
    let denominator = ann_sub_one
        .checked_mul(d_prev)
        .ok_or(MathError::MulOverflow(5))?
        .checked_div(A_PRECISION.into())
        .ok_or(MathError::DivByZero(3))?
        .checked_add(
            d_prod
                .checked_mul(n_add_one.into())
                .ok_or(MathError::MulOverflow(6))?,
        )
        .ok_or(MathError::AddOverflow(4))?;
    numerator
        .checked_div(denominator)
        .ok_or(MathError::DivByZero(4))
}

/// Returns new reserve of `y` tokens
/// given new reserve of `x` tokens, keeping the invariant of `reserves`.
///
/// NOTICE: it does not check if `token_x_id` != `token_y_id` and if tokens' `id`s are out of bounds
pub fn compute_y(
    new_reserve_x: u128,
    reserves: &[u128],
    token_x_id: usize,
    token_y_id: usize,
    amp_coef: u128,
) -> Result<u128, MathError> {
    let d = compute_d(reserves, amp_coef)?;
    let mut new_reserves = reserves.to_vec();
    new_reserves[token_x_id] = new_reserve_x;
    compute_y_given_d(token_y_id, &new_reserves, d, amp_coef)
}

/// Returns the reserve of `token_y_id` for which the invariant of `reserves`
/// (with the `token_y_id` entry ignored) equals `d`.
pub fn compute_y_given_d(
    token_y_id: usize,
    reserves: &[u128],
    d: U256,
    amp_coef: u128,
) -> Result<u128, MathError> {
    let n = reserves.len() as u32;
    let ann: U256 = casted_mul(amp_coef, n.into());

    let mut c = d;
    let mut reserves_sum = U256::from(0);
    // reserves_sum = ... + x_(i') + ...
    // c = ... * d / (x_(i') * n) * ...
    // where  i' in (0,n) AND i' != token_y_id
    for (idx, &reserve) in reserves.iter().enumerate() {
        if idx != token_y_id {
            reserves_sum = reserves_sum
                .checked_add(reserve.into())
                .ok_or(MathError::AddOverflow(5))?;
            c = c
                .checked_mul(d)
                .ok_or(MathError::MulOverflow(7))?
                .checked_div(casted_mul(reserve, n.into()))
                .ok_or(MathError::DivByZero(5))?;
        }
    }
    // c = c * d / (A * n^2)
    c = c
        .checked_mul(d)
        .ok_or(MathError::MulOverflow(8))?
        .checked_mul(A_PRECISION.into())
        .ok_or(MathError::MulOverflow(9))?
        .checked_div(ann.checked_mul(n.into()).ok_or(MathError::MulOverflow(10))?)
        .ok_or(MathError::DivByZero(6))?;
    // reserves_sum + d / (A * n)
    let b: U256 = d
        .checked_mul(A_PRECISION.into())
        .ok_or(MathError::MulOverflow(11))?
        .checked_div(ann)
        .ok_or(MathError::DivByZero(7))?
        .checked_add(reserves_sum)
        .ok_or(MathError::AddOverflow(6))?; // d will be subtracted later

    let mut y = d;
    for _ in 0..MAX_ITERATIONS {
        let y_next = compute_y_next(y, b, c, d)?;
        if abs_diff(y_next, y) <= 1.into() {
            return y_next.try_into().map_err(|_| MathError::CastOverflow(1));
        }
        y = y_next;
    }
    Err(MathError::NoConvergence(2))
}

fn compute_y_next(y_prev: U256, b: U256, c: U256, d: U256) -> Result<U256, MathError> {
    let numerator = y_prev
        .checked_mul(y_prev)
        .ok_or(MathError::MulOverflow(12))?
        .checked_add(c)
        .ok_or(MathError::AddOverflow(7))?;
    let denominator = y_prev
        .checked_mul(2.into())
        .ok_or(MathError::MulOverflow(13))?
        .checked_add(b)
        .ok_or(MathError::AddOverflow(8))?
        .checked_sub(d)
        .ok_or(MathError::SubUnderflow(2))?;
    numerator
        .checked_div(denominator)
        .ok_or(MathError::DivByZero(8))
}

/// Compute SwapResult after an exchange given `amount_in` of the `token_in_id`.
/// panics if token ids are out of bounds.
/// NOTICE: it does not check if `token_in_id` != `token_out_id`.
/// Returns (amount_out, fee_amount)
pub fn swap_to(
    token_in_idx: usize,
    token_in_amount: u128,
    token_out_idx: usize,
    current_reserves: &[u128],
    fees: &Fees,
    amp_coef: u128,
) -> Result<(u128, u128), MathError> {
    let y = compute_y(
        token_in_amount
            .checked_add(current_reserves[token_in_idx])
            .ok_or(MathError::AddOverflow(9))?,
        current_reserves,
        token_in_idx,
        token_out_idx,
        amp_coef,
    )?;
    // sub 1 in case there are any rounding errors
    // https://github.com/curvefi/curve-contract/blob/b0bbf77f8f93c9c5f4e415bce9cd71f0cdee960e/contracts/pool-templates/base/SwapTemplateBase.vy#L466
    let dy = current_reserves[token_out_idx]
        .checked_sub(y)
        .ok_or(MathError::SubUnderflow(3))?
        .checked_sub(1)
        .ok_or(MathError::SubUnderflow(4))?;
    // fees are applied to "token_out" amount
    let fee = fees.swap_fee_from_gross(dy)?;
    let amount_swapped = dy.checked_sub(fee).ok_or(MathError::SubUnderflow(5))?;

    Ok((amount_swapped, fee))
}

/// Charges the imbalance fee on every entry of `new_reserves`.
///
/// The ideal reserve of a token is its old reserve scaled by `d_1 / d_0`. The fee is
/// taken from the distance between the ideal and the actual new reserve, so a
/// proportional change pays nothing.
/// Returns fees charged per token, `new_reserves` are reduced by them.
fn charge_imbalance_fees(
    old_reserves: &[u128],
    new_reserves: &mut [u128],
    d_0: U256,
    d_1: U256,
    fees: &Fees,
) -> Result<Vec<u128>, MathError> {
    let n_coins = old_reserves.len() as u32;
    let mut charged = Vec::with_capacity(old_reserves.len());
    for (new_reserve, &old_reserve) in new_reserves.iter_mut().zip(old_reserves.iter()) {
        let ideal_reserve: u128 = d_1
            .checked_mul(old_reserve.into())
            .ok_or(MathError::MulOverflow(14))?
            .checked_div(d_0)
            .ok_or(MathError::DivByZero(9))?
            .try_into()
            .map_err(|_| MathError::CastOverflow(2))?;
        let difference = ideal_reserve.abs_diff(*new_reserve);
        let fee = fees.normalized_trade_fee(n_coins, difference)?;
        *new_reserve = new_reserve
            .checked_sub(fee)
            .ok_or(MathError::SubUnderflow(6))?;
        charged.push(fee);
    }
    Ok(charged)
}

/// `supply * (d_a - d_b) / d_0`
fn shares_for_invariant_change(
    pool_token_supply: u128,
    d_a: U256,
    d_b: U256,
    d_0: U256,
) -> Result<u128, MathError> {
    U256::from(pool_token_supply)
        .checked_mul(d_a.checked_sub(d_b).ok_or(MathError::SubUnderflow(7))?)
        .ok_or(MathError::MulOverflow(15))?
        .checked_div(d_0)
        .ok_or(MathError::DivByZero(10))?
        .try_into()
        .map_err(|_| MathError::CastOverflow(3))
}

/// Compute the amount of LP tokens to mint after a deposit.
///
/// The first deposit (`pool_token_supply == 0`) mints the invariant of the
/// deposited amounts and pays no fee.
/// Caller has to check that the invariant increases (`d_1 > d_0`).
pub fn compute_lp_amount_for_deposit(
    deposit_amounts: &[u128],
    old_reserves: &[u128],
    pool_token_supply: u128,
    fees: &Fees,
    amp_coef: u128,
) -> Result<LiquidityChange, MathError> {
    let mut new_reserves = old_reserves
        .iter()
        .zip(deposit_amounts.iter())
        .map(|(reserve, &amount)| {
            reserve
                .checked_add(amount)
                .ok_or(MathError::AddOverflow(10))
        })
        .collect::<Result<Vec<u128>, MathError>>()?;
    // Invariant after change
    let d_1 = compute_d(&new_reserves, amp_coef)?;
    if pool_token_supply == 0 {
        return Ok(LiquidityChange {
            shares: d_1.try_into().map_err(|_| MathError::CastOverflow(4))?,
            fees: vec![0; old_reserves.len()],
            d_0: 0.into(),
            d_1,
        });
    }
    // Initial invariant
    let d_0 = compute_d(old_reserves, amp_coef)?;
    if d_1 <= d_0 {
        return Ok(LiquidityChange {
            shares: 0,
            fees: vec![0; old_reserves.len()],
            d_0,
            d_1,
        });
    }
    // Recalculate the invariant accounting for fees
    let charged = charge_imbalance_fees(old_reserves, &mut new_reserves, d_0, d_1, fees)?;
    let d_2 = compute_d(&new_reserves, amp_coef)?;
    // d1 >= d2 > d0, (d2-d0) => minted shares
    let shares = shares_for_invariant_change(pool_token_supply, d_2, d_0, d_0)?;
    Ok(LiquidityChange {
        shares,
        fees: charged,
        d_0,
        d_1,
    })
}

/// Compute the amount of LP tokens to burn for withdrawing `withdraw_amounts`.
///
/// Returned `shares` are not rounded up, caller should add a unit against the withdrawer.
pub fn compute_lp_amount_for_withdraw(
    withdraw_amounts: &[u128],
    old_reserves: &[u128],
    pool_token_supply: u128,
    fees: &Fees,
    amp_coef: u128,
) -> Result<LiquidityChange, MathError> {
    // Initial invariant, D0
    let d_0 = compute_d(old_reserves, amp_coef)?;

    // real invariant after withdraw, D1
    let mut new_reserves = old_reserves
        .iter()
        .zip(withdraw_amounts.iter())
        .map(|(reserve, &amount)| {
            reserve
                .checked_sub(amount)
                .ok_or(MathError::SubUnderflow(8))
        })
        .collect::<Result<Vec<u128>, MathError>>()?;
    let d_1 = compute_d(&new_reserves, amp_coef)?;

    // Recalculate the invariant accounting for fees
    let charged = charge_imbalance_fees(old_reserves, &mut new_reserves, d_0, d_1, fees)?;
    let d_2 = compute_d(&new_reserves, amp_coef)?;
    // d0 > d1 >= d2, (d0-d2) => burned shares (fee included)
    let shares = shares_for_invariant_change(pool_token_supply, d_0, d_2, d_0)?;
    Ok(LiquidityChange {
        shares,
        fees: charged,
        d_0,
        d_1,
    })
}

/// Computes the change of LP supply for depositing or withdrawing `amounts`,
/// ignoring fees. Meant for quoting slippage bounds.
pub fn compute_lp_amount_no_fee(
    amounts: &[u128],
    reserves: &[u128],
    pool_token_supply: u128,
    deposit: bool,
    amp_coef: u128,
) -> Result<u128, MathError> {
    let d_0 = compute_d(reserves, amp_coef)?;
    let new_reserves = reserves
        .iter()
        .zip(amounts.iter())
        .map(|(&reserve, &amount)| {
            if deposit {
                reserve
                    .checked_add(amount)
                    .ok_or(MathError::AddOverflow(11))
            } else {
                reserve
                    .checked_sub(amount)
                    .ok_or(MathError::SubUnderflow(9))
            }
        })
        .collect::<Result<Vec<u128>, MathError>>()?;
    let d_1 = compute_d(&new_reserves, amp_coef)?;
    if pool_token_supply == 0 {
        return d_1.try_into().map_err(|_| MathError::CastOverflow(5));
    }
    if deposit {
        shares_for_invariant_change(pool_token_supply, d_1, d_0, d_0)
    } else {
        shares_for_invariant_change(pool_token_supply, d_0, d_1, d_0)
    }
}

/// Computes proportional amounts of `reserves` backing `lp_amount` shares.
pub fn compute_amounts_given_lp(
    lp_amount: u128,
    reserves: &[u128],
    pool_token_supply: u128,
) -> Result<Vec<u128>, MathError> {
    reserves
        .iter()
        .map(|&reserve| {
            casted_mul(reserve, lp_amount)
                .checked_div(pool_token_supply.into())
                .ok_or(MathError::DivByZero(11))?
                .try_into()
                .map_err(|_| MathError::CastOverflow(6))
        })
        .collect()
}

/// Computes how much of `token_id` is paid out for burning `lp_amount` shares.
///
/// The invariant is reduced proportionally to the burned shares and the whole
/// value leaves through a single token. The other tokens are charged the
/// imbalance fee on the amounts they would have paid out proportionally.
/// Returns (amount_out, fee_amount)
pub fn compute_withdraw_one_token(
    lp_amount: u128,
    token_id: usize,
    reserves: &[u128],
    pool_token_supply: u128,
    fees: &Fees,
    amp_coef: u128,
) -> Result<(u128, u128), MathError> {
    let n_coins = reserves.len() as u32;
    let d_0 = compute_d(reserves, amp_coef)?;
    let d_1 = d_0
        .checked_sub(
            U256::from(lp_amount)
                .checked_mul(d_0)
                .ok_or(MathError::MulOverflow(16))?
                .checked_div(pool_token_supply.into())
                .ok_or(MathError::DivByZero(12))?,
        )
        .ok_or(MathError::SubUnderflow(10))?;
    let new_y = compute_y_given_d(token_id, reserves, d_1, amp_coef)?;

    let mut reduced_reserves = Vec::with_capacity(reserves.len());
    for (idx, &reserve) in reserves.iter().enumerate() {
        let scaled: u128 = U256::from(reserve)
            .checked_mul(d_1)
            .ok_or(MathError::MulOverflow(17))?
            .checked_div(d_0)
            .ok_or(MathError::DivByZero(13))?
            .try_into()
            .map_err(|_| MathError::CastOverflow(7))?;
        // amount that would leave the pool in a proportional withdrawal
        let expected_dx = if idx == token_id {
            scaled.checked_sub(new_y).ok_or(MathError::SubUnderflow(11))?
        } else {
            reserve.checked_sub(scaled).ok_or(MathError::SubUnderflow(12))?
        };
        let fee = fees.normalized_trade_fee(n_coins, expected_dx)?;
        reduced_reserves.push(reserve.checked_sub(fee).ok_or(MathError::SubUnderflow(13))?);
    }

    let reduced_y = compute_y_given_d(token_id, &reduced_reserves, d_1, amp_coef)?;
    // sub 1 in case there are any rounding errors
    let dy = reduced_reserves[token_id]
        .checked_sub(reduced_y)
        .ok_or(MathError::SubUnderflow(14))?
        .checked_sub(1)
        .ok_or(MathError::SubUnderflow(15))?;
    let fee = reserves[token_id]
        .checked_sub(new_y)
        .ok_or(MathError::SubUnderflow(16))?
        .checked_sub(dy)
        .ok_or(MathError::SubUnderflow(17))?;
    Ok((dy, fee))
}

/// Value of a single share denominated in the pool precision, `0` for an empty pool.
pub fn compute_virtual_price(
    reserves: &[u128],
    pool_token_supply: u128,
    amp_coef: u128,
) -> Result<u128, MathError> {
    if pool_token_supply == 0 {
        return Ok(0);
    }
    compute_d(reserves, amp_coef)?
        .checked_mul(POOL_TOKEN_PRECISION.into())
        .ok_or(MathError::MulOverflow(18))?
        .checked_div(pool_token_supply.into())
        .ok_or(MathError::DivByZero(14))?
        .try_into()
        .map_err(|_| MathError::CastOverflow(8))
}
