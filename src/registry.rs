//! Named values shared between items.
//!
//! Items bind to an entry by key (their `data_source`) and read it while
//! drawing; editable items write back to it. The registry is one store for
//! the whole process, so any thread may write a value the render thread
//! picks up on its next frame. It must be set up with [`init`] before use
//! and released with [`teardown`].

use std::collections::HashMap;
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};

use crate::error::RegistryError;
use crate::item::ConfigValue;

#[derive(Default)]
struct Store {
    /// Outstanding `init` calls
    users: usize,
    values: HashMap<String, ConfigValue>,
}

static STORE: LazyLock<Mutex<Store>> = LazyLock::new(|| Mutex::new(Store::default()));

fn lock() -> MutexGuard<'static, Store> {
    STORE.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Make the registry usable. Calls nest: each one needs a matching
/// [`teardown`].
pub fn init() {
    let mut store = lock();
    if store.users == 0 {
        log::debug!("Data registry initialized");
    }
    store.users += 1;
}

/// Release one [`init`]. The last release drops every stored value.
pub fn teardown() {
    let mut store = lock();
    match store.users {
        0 => {}
        1 => {
            store.users = 0;
            let old = std::mem::take(&mut store.values);
            log::debug!("Data registry released ({} values)", old.len());
        }
        _ => store.users -= 1,
    }
}

pub fn is_initialized() -> bool {
    lock().users > 0
}

/// Store `value` under `key`, replacing any previous value.
pub fn set_value(key: &str, value: ConfigValue) -> Result<(), RegistryError> {
    let mut store = lock();
    if store.users == 0 {
        return Err(RegistryError::NotInitialized);
    }
    log::trace!("Registry \"{}\" = {}", key, value);
    store.values.insert(key.to_string(), value);
    Ok(())
}

/// The value stored under `key`. `None` if absent or not initialized.
pub fn value(key: &str) -> Option<ConfigValue> {
    lock().values.get(key).cloned()
}

pub fn remove_value(key: &str) -> Option<ConfigValue> {
    lock().values.remove(key)
}

/// All keys, sorted.
pub fn keys() -> Vec<String> {
    let mut keys: Vec<String> = lock().values.keys().cloned().collect();
    keys.sort();
    keys
}

/// Serializes unit tests that initialize or tear down the shared store.
#[cfg(test)]
pub(crate) fn exclusive() -> MutexGuard<'static, ()> {
    static EXCLUSIVE: Mutex<()> = Mutex::new(());
    EXCLUSIVE.lock().unwrap_or_else(PoisonError::into_inner)
}
