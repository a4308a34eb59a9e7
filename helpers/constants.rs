pub mod stable_pool {
    /// Number of tokens held by a pool.
    pub const N_COINS: usize = 2;

    // Amplification coefficient is stored with A_PRECISION, i.e. A = 50 is kept as 5000.
    pub const A_PRECISION: u128 = 100;
    /// Min amplification coefficient (without precision).
    pub const MIN_A: u128 = 1;
    /// Max amplification coefficient (without precision).
    pub const MAX_A: u128 = 10_000_000;
    /// Max factor by which a single ramp can move the amplification coefficient.
    pub const MAX_A_CHANGE: u128 = 2;

    /// One day, in milisec.
    pub const ONE_DAY: u64 = 86_400_000;
    /// Time that has to pass between the starts of two ramps.
    pub const RAMP_COOLDOWN: u64 = ONE_DAY;
    /// Minimum ramp duration.
    pub const MIN_RAMP_TIME: u64 = 14 * ONE_DAY;

    /// Fee denominator, fees are given as an integer with 1e10 precision.
    pub const FEE_DENOMINATOR: u64 = 10_000_000_000;
    /// 10% of the swapped amount.
    pub const MAX_SWAP_FEE: u64 = 1_000_000_000;
    pub const MAX_ADMIN_FEE: u64 = 100_000_000_000;

    pub const POOL_TOKEN_DECIMALS: u8 = 18;
    pub const POOL_TOKEN_PRECISION: u128 = 10u128.pow(POOL_TOKEN_DECIMALS as u32);
}
