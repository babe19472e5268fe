//! Policy trait and implementations.

pub mod random;
pub mod steering;
pub mod trait_;

pub use random::RandomPolicy;
pub use steering::SteeringPolicy;
pub use trait_::Policy;
