use amm_helpers::{
    constants::stable_pool::{
        A_PRECISION, MAX_A, MAX_A_CHANGE, MIN_A, MIN_RAMP_TIME, RAMP_COOLDOWN,
    },
    ensure,
};
use traits::{MathError, RampState, StablePoolError};

pub type Timestamp = u64;

/// Amplification coefficient, linearly ramped between two points in time.
///
/// Both coefficients are kept with `A_PRECISION`.
#[derive(Default, Debug, scale::Encode, scale::Decode, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct AmplificationCoefficient {
    /// Coefficient at the start of the ramp.
    initial_a: u128,
    /// Target of the ramp.
    future_a: u128,
    /// Start of the ramp.
    initial_a_time: Timestamp,
    /// End of the ramp.
    future_a_time: Timestamp,
}

impl AmplificationCoefficient {
    /// `a` is given without precision.
    pub fn new(a: u128, current_time: Timestamp) -> Result<Self, StablePoolError> {
        ensure!(a >= MIN_A, StablePoolError::AmpTooLow);
        ensure!(a <= MAX_A, StablePoolError::AmpTooHigh);
        let a_precise = a.checked_mul(A_PRECISION).ok_or(MathError::MulOverflow(31))?;
        Ok(Self {
            initial_a: a_precise,
            future_a: a_precise,
            initial_a_time: current_time,
            future_a_time: current_time,
        })
    }

    /// Returns (initial_a, future_a, initial_a_time, future_a_time).
    pub fn params(&self) -> (u128, u128, Timestamp, Timestamp) {
        (
            self.initial_a,
            self.future_a,
            self.initial_a_time,
            self.future_a_time,
        )
    }

    pub fn state(&self, current_time: Timestamp) -> RampState {
        if current_time < self.future_a_time {
            RampState::Ramping
        } else {
            RampState::Stable
        }
    }

    /// Coefficient at `current_time`, with `A_PRECISION`.
    pub fn compute_amp_coef(&self, current_time: Timestamp) -> Result<u128, MathError> {
        interpolate(
            current_time,
            self.initial_a,
            self.initial_a_time,
            self.future_a,
            self.future_a_time,
        )
    }

    /// Coefficient at `current_time`, without precision.
    pub fn compute_amp_coef_rounded(&self, current_time: Timestamp) -> Result<u128, MathError> {
        Ok(self.compute_amp_coef(current_time)? / A_PRECISION)
    }

    /// Starts a new ramp from the current coefficient to `future_a` (without precision).
    pub fn ramp_amp_coef(
        &mut self,
        future_a: u128,
        future_time: Timestamp,
        current_time: Timestamp,
    ) -> Result<(), StablePoolError> {
        ensure!(
            current_time
                >= self
                    .initial_a_time
                    .checked_add(RAMP_COOLDOWN)
                    .ok_or(MathError::AddOverflow(31))?,
            StablePoolError::RampCooldown
        );
        ensure!(
            future_time
                >= current_time
                    .checked_add(MIN_RAMP_TIME)
                    .ok_or(MathError::AddOverflow(32))?,
            StablePoolError::InsufficientRampTime
        );
        ensure!(
            future_a > 0 && future_a < MAX_A,
            StablePoolError::FutureAOutOfRange
        );

        let initial_a = self.compute_amp_coef(current_time)?;
        let future_a = future_a
            .checked_mul(A_PRECISION)
            .ok_or(MathError::MulOverflow(32))?;
        if future_a < initial_a {
            ensure!(
                future_a
                    .checked_mul(MAX_A_CHANGE)
                    .ok_or(MathError::MulOverflow(33))?
                    >= initial_a,
                StablePoolError::FutureATooSmall
            );
        } else {
            ensure!(
                future_a
                    <= initial_a
                        .checked_mul(MAX_A_CHANGE)
                        .ok_or(MathError::MulOverflow(34))?,
                StablePoolError::FutureATooLarge
            );
        }

        self.initial_a = initial_a;
        self.future_a = future_a;
        self.initial_a_time = current_time;
        self.future_a_time = future_time;
        Ok(())
    }

    /// Freezes the coefficient at its current value.
    pub fn stop_ramp_amp_coef(&mut self, current_time: Timestamp) -> Result<u128, StablePoolError> {
        ensure!(
            self.state(current_time) == RampState::Ramping,
            StablePoolError::RampAlreadyStopped
        );
        let current_a = self.compute_amp_coef(current_time)?;
        self.initial_a = current_a;
        self.future_a = current_a;
        self.initial_a_time = current_time;
        self.future_a_time = current_time;
        Ok(current_a)
    }
}

/// Linear interpolation of the coefficient between `(initial_a_time, initial_a)` and
/// `(future_a_time, future_a)`, clamped outside of this time range.
/// from https://github.com/ref-finance/ref-contracts/blob/752f42d7ec67b66fadda7756ed7eb3d312fb6473/ref-exchange/src/stable_swap/math.rs#L100-L101
pub fn interpolate(
    current_time: Timestamp,
    initial_a: u128,
    initial_a_time: Timestamp,
    future_a: u128,
    future_a_time: Timestamp,
) -> Result<u128, MathError> {
    if current_time >= future_a_time {
        return Ok(future_a);
    }
    if current_time <= initial_a_time {
        return Ok(initial_a);
    }
    let time_range = future_a_time
        .checked_sub(initial_a_time)
        .ok_or(MathError::SubUnderflow(31))?;
    let time_delta = current_time
        .checked_sub(initial_a_time)
        .ok_or(MathError::SubUnderflow(32))?;

    if future_a >= initial_a {
        // Ramp up
        let amp_delta = (future_a - initial_a)
            .checked_mul(time_delta as u128)
            .ok_or(MathError::MulOverflow(35))?
            .checked_div(time_range as u128)
            .ok_or(MathError::DivByZero(31))?;
        initial_a
            .checked_add(amp_delta)
            .ok_or(MathError::AddOverflow(33))
    } else {
        // Ramp down
        let amp_delta = (initial_a - future_a)
            .checked_mul(time_delta as u128)
            .ok_or(MathError::MulOverflow(36))?
            .checked_div(time_range as u128)
            .ok_or(MathError::DivByZero(32))?;
        initial_a
            .checked_sub(amp_delta)
            .ok_or(MathError::SubUnderflow(33))
    }
}
