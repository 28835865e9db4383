//! Name-based driver lookup.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::driver::{Connection, Driver};
use crate::error::{Error, Result};
use crate::timer::Timer;
use crate::timer_driver::{TimerDriver, TIMER_DRIVER_NAME};

/// Drivers keyed by the name callers open them with.
///
/// Cloning takes a snapshot: drivers registered afterwards are not visible to the clone.
#[derive(Clone, Default)]
pub struct Registry {
    drivers: HashMap<String, Arc<dyn Driver>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `driver` under `name`, returning the driver it replaces, if any.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        driver: impl Driver + 'static,
    ) -> Option<Arc<dyn Driver>> {
        self.drivers.insert(name.into(), Arc::new(driver))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.drivers.contains_key(name)
    }

    /// Look up a driver by name.
    pub fn driver(&self, name: &str) -> Result<Arc<dyn Driver>> {
        self.drivers
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownDriver(name.to_string()))
    }

    /// Sorted names of the registered drivers.
    pub fn drivers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.drivers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Open a connection with the driver registered as `driver`.
    pub async fn open(&self, driver: &str, name: &str) -> Result<Box<dyn Connection>> {
        self.driver(driver)?.open(name).await
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("drivers", &self.drivers())
            .finish()
    }
}

/// Register a [`TimerDriver`] as [`TIMER_DRIVER_NAME`], wrapping the drivers registered
/// so far.
pub fn register_timer(registry: &mut Registry, timer: Timer) {
    let driver = TimerDriver::new(registry.clone(), timer);
    registry.register(TIMER_DRIVER_NAME, driver);
}
