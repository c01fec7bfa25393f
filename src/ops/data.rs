//! Persistent data operations.

use anyhow::{Context, Result};

use crate::core::data::DataValue;
use crate::core::key::NamespacedKey;
use crate::dispatch::CapabilityHandle;
use crate::host::HolderId;

pub fn data_get(
    handle: &CapabilityHandle,
    holder: &HolderId,
    key: &NamespacedKey,
) -> Result<Option<DataValue>> {
    handle
        .read_data(holder, key)
        .with_context(|| format!("failed to read `{}` on {}", key, holder))
}

/// Store `value`, returning whatever was there before.
pub fn data_set(
    handle: &CapabilityHandle,
    holder: &HolderId,
    key: &NamespacedKey,
    value: &DataValue,
) -> Result<Option<DataValue>> {
    let previous = data_get(handle, holder, key)?;
    handle
        .write_data(holder, key, value)
        .with_context(|| format!("failed to write `{}` on {}", key, holder))?;
    Ok(previous)
}

pub fn data_remove(handle: &CapabilityHandle, holder: &HolderId, key: &NamespacedKey) -> Result<bool> {
    handle
        .remove_data(holder, key)
        .with_context(|| format!("failed to remove `{}` on {}", key, holder))
}

/// Every key on `holder` with its value, sorted by key.
pub fn data_list(
    handle: &CapabilityHandle,
    holder: &HolderId,
) -> Result<Vec<(NamespacedKey, DataValue)>> {
    let keys = handle
        .data_keys(holder)
        .with_context(|| format!("failed to list data on {}", holder))?;

    let mut entries = Vec::with_capacity(keys.len());
    for key in keys {
        if let Some(value) = data_get(handle, holder, &key)? {
            entries.push((key, value));
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::dispatch::{Dispatcher, ShimRegistry};
    use crate::host::MemoryHost;

    fn handle() -> CapabilityHandle {
        Dispatcher::new(ShimRegistry::builtin())
            .resolve(Arc::new(MemoryHost::new("1.21.1")))
            .unwrap()
    }

    #[test]
    fn test_set_returns_previous_and_list_is_sorted() {
        let handle = handle();
        let holder = HolderId::entity("zombie-1");
        let b = NamespacedKey::parse("demo:b").unwrap();
        let a = NamespacedKey::parse("demo:a").unwrap();

        assert_eq!(data_set(&handle, &holder, &b, &DataValue::Int(1)).unwrap(), None);
        assert_eq!(
            data_set(&handle, &holder, &b, &DataValue::Int(2)).unwrap(),
            Some(DataValue::Int(1))
        );
        data_set(&handle, &holder, &a, &DataValue::Bool(true)).unwrap();

        let listed = data_list(&handle, &holder).unwrap();
        assert_eq!(
            listed,
            vec![(a.clone(), DataValue::Bool(true)), (b, DataValue::Int(2))]
        );

        assert!(data_remove(&handle, &holder, &a).unwrap());
        assert!(!data_remove(&handle, &holder, &a).unwrap());
        assert_eq!(data_get(&handle, &holder, &a).unwrap(), None);
    }
}
