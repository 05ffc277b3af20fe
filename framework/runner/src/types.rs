/// Recommended error type for a scenario `main` function. It is compatible with everything the
/// runner returns so you can use `?` to propagate errors.
pub type FibTunnelResult<T> = anyhow::Result<T>;
