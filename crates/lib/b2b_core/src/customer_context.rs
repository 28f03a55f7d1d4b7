//! The customer a sales rep is acting on behalf of.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::models::ActiveCustomer;
use crate::storage::{KeyValueStore, StorageError, keys};

pub struct ActiveCustomerContext {
    store: Arc<dyn KeyValueStore>,
    current: Option<ActiveCustomer>,
}

impl ActiveCustomerContext {
    /// Restore the persisted active customer.
    ///
    /// Never fails. An unreadable or malformed value is removed and the
    /// context starts empty.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let current = match store.get(keys::ACTIVE_CUSTOMER) {
            Ok(Some(raw)) => match serde_json::from_str::<ActiveCustomer>(&raw) {
                Ok(customer) => {
                    debug!(customer_id = customer.id, "restored active customer");
                    Some(customer)
                }
                Err(e) => {
                    warn!(error = %e, "discarding malformed active customer");
                    if let Err(e) = store.remove(keys::ACTIVE_CUSTOMER) {
                        warn!(error = %e, "could not remove active customer");
                    }
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "could not read active customer");
                None
            }
        };
        Self { store, current }
    }

    pub fn get(&self) -> Option<&ActiveCustomer> {
        self.current.as_ref()
    }

    pub fn id(&self) -> Option<i64> {
        self.current.as_ref().map(|c| c.id)
    }

    /// Replace the active customer. The value is persisted before it
    /// becomes current.
    pub fn set(&mut self, customer: ActiveCustomer) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&customer)?;
        self.store.set(keys::ACTIVE_CUSTOMER, &raw)?;
        info!(customer_id = customer.id, "active customer set");
        self.current = Some(customer);
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.current = None;
        self.store.remove(keys::ACTIVE_CUSTOMER)
    }
}
