/// Compile-time sizing of a pool and of the buffers built on it.
pub trait PoolConfig {
    /// Number of slots in the pool.
    const SLOT_COUNT: usize;

    /// Element capacity used when the caller has no better value.
    const DEFAULT_CAPACITY: usize;
}

pub struct DefaultPoolConfig {}

impl PoolConfig for DefaultPoolConfig {
    const SLOT_COUNT: usize = 8;
    const DEFAULT_CAPACITY: usize = 20;
}

pub struct TestingPoolConfig {}

impl PoolConfig for TestingPoolConfig {
    const SLOT_COUNT: usize = 4;
    const DEFAULT_CAPACITY: usize = 4;
}

pub type DefaultPool<'a, T> = crate::Pool<'a, T, { DefaultPoolConfig::SLOT_COUNT }>;
