// Current-customer context, threaded explicitly through customer-scoped calls.
//
// Kept separate from `TrackClient` so the client itself stays immutable:
// identifying or resetting the customer is a session concern, and every
// call site that needs a customer id says so in its signature.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::error::Error;

/// Handle to the currently identified customer, shared between the app
/// code that identifies/resets the user and the hooks that track events.
///
/// Cheap to clone — all clones observe the same slot. Reads are lock-free.
#[derive(Clone, Default)]
pub struct Session {
    customer: Arc<ArcSwapOption<String>>,
}

impl Session {
    /// A session with no identified customer.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session pre-identified with the given customer id.
    pub fn identified(customer_id: impl Into<String>) -> Self {
        let session = Self::default();
        session.identify(customer_id);
        session
    }

    /// Set the current customer id. Called after the user authenticates,
    /// before any customer-scoped tracking.
    pub fn identify(&self, customer_id: impl Into<String>) {
        self.customer.store(Some(Arc::new(customer_id.into())));
    }

    /// Clear the current customer (logout).
    pub fn reset(&self) {
        self.customer.store(None);
    }

    /// Snapshot of the current customer id, if one is identified.
    pub fn customer_id(&self) -> Option<Arc<String>> {
        self.customer.load_full()
    }

    pub fn is_identified(&self) -> bool {
        self.customer.load().is_some()
    }

    /// Precondition gate for customer-scoped operations.
    ///
    /// Fails with [`Error::CustomerRequired`] naming the operation; never
    /// touches the network.
    pub fn require_customer(&self, operation: &'static str) -> Result<Arc<String>, Error> {
        self.customer_id()
            .ok_or(Error::CustomerRequired { operation })
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("customer", &self.customer_id())
            .finish()
    }
}
