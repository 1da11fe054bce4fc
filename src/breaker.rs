use failsafe::backoff::EqualJittered;
use failsafe::failure_policy::{ConsecutiveFailures, OrElse, SuccessRateOverTimeWindow};
use failsafe::{Config, StateMachine};

/// Circuit breaker guarding database work behind the shopping-list download.
pub type CircuitBreakerType = StateMachine<
    OrElse<SuccessRateOverTimeWindow<EqualJittered>, ConsecutiveFailures<EqualJittered>>,
    (),
>;

pub fn circuit_breaker() -> CircuitBreakerType {
    Config::new().build()
}
