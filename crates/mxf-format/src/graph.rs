//! Object graph: an arena mapping instance identifier -> `DataSet`, with a
//! separate visitor set for cycle-safe traversal.
//!
//! Replaces the reference implementation's pattern of mutating a shared
//! `klv_hash` map with a `used` flag while walking it: here, edges are
//! plain UUID lookups into an arena, and traversal state lives in its own
//! `HashSet`, never touching the arena itself.

use std::collections::HashSet;

use uuid::Uuid;

use crate::dataset::DataSet;

#[derive(Debug, Default)]
pub struct ObjectGraph {
    arena: std::collections::HashMap<Uuid, DataSet>,
}

impl ObjectGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes `set` under its instance identifier, if it has one.
    /// Dark sets or sets missing `InstanceUID` are simply not addressable
    /// by reference and are skipped.
    pub fn insert(&mut self, set: DataSet) {
        if let Some(uid) = set.instance_uid() {
            self.arena.insert(Uuid::from_bytes(uid), set);
        }
    }

    pub fn get(&self, uid: &Uuid) -> Option<&DataSet> {
        self.arena.get(uid)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Depth-first walk over strong references starting at `root`,
    /// calling `visit` once per newly-discovered node. Weak/cross-link
    /// cycles never cause revisits because `visited` is consulted before
    /// recursing, independent of any mutation to the arena itself.
    pub fn walk_strong<F: FnMut(&Uuid, &DataSet)>(&self, root: &Uuid, mut visit: F) {
        let mut visited = HashSet::new();
        let mut stack = vec![*root];
        while let Some(uid) = stack.pop() {
            if !visited.insert(uid) {
                continue;
            }
            let Some(set) = self.arena.get(&uid) else {
                tracing::warn!(%uid, "broken reference: instance id not present in object graph");
                continue;
            };
            visit(&uid, set);
            for child in set.get_strong_references() {
                stack.push(Uuid::from_bytes(child));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mxf_core::Ul;
    use mxf_dict::Rp210Dictionary;
    use mxf_primer::PrimerPack;
    use std::sync::Arc;

    fn primer() -> PrimerPack {
        let dict = Arc::new(Rp210Dictionary::from_rows(vec![
            (
                Ul::from_hex("060e2b34010101010101150200000000").unwrap(),
                "StrongReference".to_string(),
                "Instance UID".to_string(),
                String::new(),
            ),
            (
                Ul::from_hex("060e2b34010101010101150200000001").unwrap(),
                "StrongReference".to_string(),
                "Next".to_string(),
                String::new(),
            ),
        ]));
        let mut primer = PrimerPack::new(dict);
        primer.inject([
            (0x3c0a, Ul::from_hex("060e2b34010101010101150200000000").unwrap()),
            (0x0101, Ul::from_hex("060e2b34010101010101150200000001").unwrap()),
        ]);
        primer
    }

    fn field(tag: u16, value: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend(tag.to_be_bytes());
        out.extend((value.len() as u16).to_be_bytes());
        out.extend(value);
        out
    }

    #[test]
    fn cyclic_strong_references_terminate_traversal() {
        let primer = primer();
        let a_uid = [1u8; 16];
        let b_uid = [2u8; 16];

        let mut a_bytes = field(0x3c0a, &a_uid);
        a_bytes.extend(field(0x0101, &b_uid));
        let mut b_bytes = field(0x3c0a, &b_uid);
        b_bytes.extend(field(0x0101, &a_uid));

        let key = Ul::from_hex("060e2b34025301010d01010101010900").unwrap();
        let a = DataSet::decode(key, 0, "Filler".to_string(), false, &a_bytes, &primer).unwrap();
        let b = DataSet::decode(key, 16, "Filler".to_string(), false, &b_bytes, &primer).unwrap();

        let mut graph = ObjectGraph::new();
        graph.insert(a);
        graph.insert(b);

        let mut visited = Vec::new();
        graph.walk_strong(&Uuid::from_bytes(a_uid), |uid, _| visited.push(*uid));
        assert_eq!(visited.len(), 2);
    }

    #[test]
    fn broken_reference_is_skipped_not_fatal() {
        let primer = primer();
        let a_uid = [9u8; 16];
        let missing_uid = [8u8; 16];
        let mut a_bytes = field(0x3c0a, &a_uid);
        a_bytes.extend(field(0x0101, &missing_uid));

        let key = Ul::from_hex("060e2b34025301010d01010101010900").unwrap();
        let a = DataSet::decode(key, 0, "Filler".to_string(), false, &a_bytes, &primer).unwrap();

        let mut graph = ObjectGraph::new();
        graph.insert(a);

        let mut visited = Vec::new();
        graph.walk_strong(&Uuid::from_bytes(a_uid), |uid, _| visited.push(*uid));
        assert_eq!(visited.len(), 1);
    }
}
