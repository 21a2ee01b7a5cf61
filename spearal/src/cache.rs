//! Encoder-side caches.
//!
//! The two reference tables hand out indices in first-seen order, which is
//! exactly the order a decoder registers definitions in. Strings are keyed
//! by value, objects by the address of their shared allocation. Rendered
//! bean descriptors are kept per class-name list.

use std::collections::HashMap;
use std::rc::Rc;

use crate::value::Value;

/// Reference index space is exhausted. The wire format caps indices at
/// [`u32::MAX`].
#[derive(Debug)]
pub(crate) struct IndexOverflow;

/// Value-keyed table for strings, big-number representations, and class
/// descriptors.
#[derive(Debug, Default)]
pub(crate) struct StringCache {
    map: HashMap<Rc<str>, u32>,
}

impl StringCache {
    pub fn get(&self, s: &str) -> Option<u32> {
        self.map.get(s).copied()
    }

    /// Assigns the next index to `s`. The caller has checked [`Self::get`].
    pub fn insert(&mut self, s: Rc<str>) -> Result<u32, IndexOverflow> {
        debug_assert!(!s.is_empty(), "the empty string is never cached");
        let index = u32::try_from(self.map.len()).map_err(|_| IndexOverflow)?;
        self.map.insert(s, index);
        Ok(index)
    }
}

/// Identity-keyed table for byte arrays, collections, maps, and beans.
///
/// Keys are allocation addresses, so every inserted value is also kept alive
/// here: a dropped allocation could otherwise be recycled at the same address
/// and alias an unrelated earlier entry.
#[derive(Debug, Default)]
pub(crate) struct ObjectCache {
    map: HashMap<usize, u32>,
    anchors: Vec<Value>,
    count: u32,
}

impl ObjectCache {
    pub fn get(&self, addr: usize) -> Option<u32> {
        self.map.get(&addr).copied()
    }

    /// Assigns the next index to the allocation at `addr`.
    pub fn insert(&mut self, addr: usize, anchor: Value) -> Result<u32, IndexOverflow> {
        let index = self.count;
        self.count = self.count.checked_add(1).ok_or(IndexOverflow)?;
        self.map.insert(addr, index);
        self.anchors.push(anchor);
        Ok(index)
    }

    /// Burns the next index without an address to key it by.
    ///
    /// Needed when raw data is written without a shareable handle: the
    /// decoder still registers the definition, so this side has to count it
    /// too or later indices would drift apart.
    pub fn insert_anonymous(&mut self) -> Result<u32, IndexOverflow> {
        let index = self.count;
        self.count = self.count.checked_add(1).ok_or(IndexOverflow)?;
        Ok(index)
    }
}

/// Rendered bean descriptors, keyed by class-name list.
///
/// Instances of one class may define different property sets, so an entry
/// only answers when the written names match the ones it was rendered for.
#[derive(Debug, Default)]
pub(crate) struct DescriptorCache {
    map: HashMap<Box<[Rc<str>]>, (Box<[Rc<str>]>, Rc<str>)>,
}

impl DescriptorCache {
    pub fn get(&self, class_names: &[Rc<str>], names: &[Rc<str>]) -> Option<Rc<str>> {
        let (cached, text) = self.map.get(class_names)?;
        (**cached == *names).then(|| Rc::clone(text))
    }

    /// Remembers the text rendered for this class list and name set,
    /// replacing whatever shape was seen before.
    pub fn insert(&mut self, class_names: &[Rc<str>], names: &[Rc<str>], text: Rc<str>) {
        self.map.insert(class_names.into(), (names.into(), text));
    }
}
