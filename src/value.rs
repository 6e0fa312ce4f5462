//! Bounded value store attached to a [`crate::session::Session`].

use static_assertions::const_assert;

use crate::error::{ProbeError, Result};

/// Max bytes stored per value, including any NUL terminator.
pub const VAL_BUF: usize = 128;
/// Max number of values a single session can hold between `step()` calls.
pub const MAX_VALUES: usize = 16;

const_assert!(VAL_BUF >= 40); // must fit a hyphenated UUID string plus NUL

/// A single tagged attribute, e.g. `{name: "UUID", bytes: b"...", len: 37}`.
#[derive(Clone)]
pub struct Value {
    pub name: &'static str,
    bytes: [u8; VAL_BUF],
    pub len: usize,
}

impl Value {
    fn empty(name: &'static str) -> Self {
        Value {
            name,
            bytes: [0; VAL_BUF],
            len: 0,
        }
    }

    /// The meaningful bytes of this value (`bytes[..len]`).
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Interpret the value as UTF-8 text, trimming a single trailing NUL if present.
    pub fn as_str(&self) -> Option<&str> {
        let mut b = self.as_bytes();
        if b.last() == Some(&0) {
            b = &b[..b.len() - 1];
        }
        std::str::from_utf8(b).ok()
    }
}

/// Bounded (name, bytes) store. Values are cleared at the start of every `step()`.
#[derive(Default)]
pub struct ValueStore {
    values: Vec<Value>,
}

impl ValueStore {
    pub fn new() -> Self {
        ValueStore { values: Vec::with_capacity(MAX_VALUES) }
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&Value> {
        self.values.get(i)
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.values.iter().find(|v| v.name == name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Allocate a new slot for `name`, truncating to capacity.
    ///
    /// Returns `Err(ValueStoreFull)` if the store is at `MAX_VALUES` capacity.
    pub(crate) fn assign(&mut self, name: &'static str) -> Result<&mut Value> {
        if self.values.len() >= MAX_VALUES {
            return Err(ProbeError::ValueStoreFull);
        }
        self.values.push(Value::empty(name));
        Ok(self.values.last_mut().unwrap())
    }

    /// Remove the most recently assigned slot. Used to roll back a failed
    /// formatted write (the "sprintf" setters).
    pub(crate) fn rollback_last(&mut self) {
        self.values.pop();
    }

    /// Assign a slot and fill it with `data`, reporting `len` as the
    /// meaningful length (which may differ from `data.len()`, e.g. to
    /// include/exclude a terminator per the setter's convention).
    pub(crate) fn assign_raw(&mut self, name: &'static str, data: &[u8], len: usize) -> Result<()> {
        let slot = self.assign(name)?;
        let n = data.len().min(VAL_BUF);
        slot.bytes[..n].copy_from_slice(&data[..n]);
        slot.len = len.min(VAL_BUF);
        Ok(())
    }

    /// Set the raw bytes of `name`, truncating silently to `VAL_BUF`.
    pub(crate) fn set_value(&mut self, name: &'static str, bytes: &[u8]) -> Result<()> {
        let slot = self.assign(name)?;
        let n = bytes.len().min(VAL_BUF);
        slot.bytes[..n].copy_from_slice(&bytes[..n]);
        slot.len = n;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_respects_capacity() {
        let mut store = ValueStore::new();
        for i in 0..MAX_VALUES {
            store.set_value("TYPE", format!("v{i}").as_bytes()).unwrap();
        }
        assert_eq!(store.len(), MAX_VALUES);
        assert!(store.set_value("TYPE", b"overflow").is_err());
    }

    #[test]
    fn set_value_truncates_silently() {
        let mut store = ValueStore::new();
        let big = vec![b'x'; VAL_BUF + 10];
        store.set_value("LABEL", &big).unwrap();
        assert_eq!(store.get(0).unwrap().len, VAL_BUF);
    }

    #[test]
    fn lookup_and_has() {
        let mut store = ValueStore::new();
        store.set_value("TYPE", b"ext4").unwrap();
        assert!(store.has("TYPE"));
        assert!(!store.has("UUID"));
        assert_eq!(store.lookup("TYPE").unwrap().as_bytes(), b"ext4");
    }

    #[test]
    fn clear_empties_store() {
        let mut store = ValueStore::new();
        store.set_value("TYPE", b"ext4").unwrap();
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn rollback_removes_last() {
        let mut store = ValueStore::new();
        store.set_value("TYPE", b"ext4").unwrap();
        store.assign("UUID").unwrap();
        store.rollback_last();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(0).unwrap().name, "TYPE");
    }
}
