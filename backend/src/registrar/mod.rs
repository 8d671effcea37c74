//! One-time lifecycle registration
//!
//! Run once, from the host's compile-time check of `$tick`, to subscribe the
//! manager's start and end handlers to the host's lifecycle events. The
//! subscriptions persist for the whole run; the handles the host returns are
//! released straight away.
//!
//! There is no guard against running it twice. A second call subscribes
//! both handlers again, which the host would then deliver twice.

use serde::{Deserialize, Serialize};

/// Host lifecycle events the bridge subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackReason {
    StartOfSimulation,
    EndOfSimulation,
}

impl CallbackReason {
    /// `cbStartOfSimulation` / `cbEndOfSimulation` from `vpi_user.h`
    pub fn vpi_code(self) -> i32 {
        match self {
            CallbackReason::StartOfSimulation => 11,
            CallbackReason::EndOfSimulation => 12,
        }
    }
}

/// Manager handler bound to a lifecycle event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleHook {
    OnSimulationStart,
    OnSimulationEnd,
}

/// Binding of a host event to a handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subscription {
    pub reason: CallbackReason,
    pub hook: LifecycleHook,
}

/// The two subscriptions registered, in registration order
pub const LIFECYCLE_SUBSCRIPTIONS: [Subscription; 2] = [
    Subscription {
        reason: CallbackReason::StartOfSimulation,
        hook: LifecycleHook::OnSimulationStart,
    },
    Subscription {
        reason: CallbackReason::EndOfSimulation,
        hook: LifecycleHook::OnSimulationEnd,
    },
];

/// Host-side callback table
pub trait CallbackRegistry {
    /// Handle the host returns for a registered callback
    type Handle;

    fn register(&mut self, subscription: Subscription) -> Self::Handle;

    /// Drop the handle; the subscription itself stays registered
    fn release_handle(&mut self, handle: Self::Handle);
}

/// Subscribe the start and end handlers
///
/// Returns the subscriptions made.
pub fn register_lifecycle_callbacks<R>(registry: &mut R) -> [Subscription; 2]
where
    R: CallbackRegistry + ?Sized,
{
    for subscription in LIFECYCLE_SUBSCRIPTIONS {
        let handle = registry.register(subscription);
        registry.release_handle(handle);
    }
    tracing::debug!("lifecycle callbacks registered");
    LIFECYCLE_SUBSCRIPTIONS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Table {
        subscribed: Vec<Subscription>,
        live_handles: usize,
    }

    impl CallbackRegistry for Table {
        type Handle = usize;

        fn register(&mut self, subscription: Subscription) -> usize {
            self.subscribed.push(subscription);
            self.live_handles += 1;
            self.subscribed.len()
        }

        fn release_handle(&mut self, _handle: usize) {
            self.live_handles -= 1;
        }
    }

    #[test]
    fn test_registers_start_then_end_and_frees_handles() {
        let mut table = Table::default();
        register_lifecycle_callbacks(&mut table);

        assert_eq!(table.subscribed, LIFECYCLE_SUBSCRIPTIONS.to_vec());
        assert_eq!(table.live_handles, 0);
    }

    #[test]
    fn test_vpi_codes() {
        assert_eq!(CallbackReason::StartOfSimulation.vpi_code(), 11);
        assert_eq!(CallbackReason::EndOfSimulation.vpi_code(), 12);
    }
}
