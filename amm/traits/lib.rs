#![cfg_attr(not(feature = "std"), no_std, no_main)]

mod pool_token;
mod stable_pool;

pub use amm_helpers::math::MathError;
pub use pool_token::PoolToken;
pub use stable_pool::{RampState, StablePool, StablePoolError, StablePoolView};
