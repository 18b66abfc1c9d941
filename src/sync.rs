mod batch;
mod coordinator;
mod visibility;

pub use batch::PendingBatch;
pub use coordinator::{DEFAULT_REFETCH_DELAY, FlushCoordinator, FlushMode, FlushOutcome};
pub use visibility::{DEFAULT_VISIBILITY_THRESHOLD, VisibilityTracker};
