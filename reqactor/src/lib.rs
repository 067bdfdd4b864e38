mod action;
mod actor;
mod actor_inner;

// re-export
pub use action::Action;
pub use actor::Actor;
pub use raiko_reqpool::{
    AggregationRequestEntity, AggregationRequestKey, Pool, RequestEntity, RequestKey,
    SingleProofRequestEntity, SingleProofRequestKey, StatusWithContext,
};
