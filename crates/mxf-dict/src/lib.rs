//! SMPTE RP 210 metadata dictionary: Universal Label -> (type, element name, definition).
//!
//! Loading the RP 210 CSV itself is an external collaborator's job (see the
//! crate-level docs); this crate only holds the in-memory table and the
//! handful of synthetic/Avid entries that real-world Avid files depend on
//! but that are missing from the published RP 210 table.

use indexmap::IndexMap;
use mxf_core::Ul;

/// One RP 210 dictionary row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// RP 210 type string, e.g. `"UInt32"`, `"StrongReference"`, `"16 bit Unicode String"`.
    pub type_name: String,
    /// Normalized, lowercase, underscore-joined element name.
    pub element_name: String,
    pub definition: String,
}

/// Immutable UL -> RP 210 entry table.
///
/// Built once (typically at process startup) from an external row source
/// and shared read-only; see `mxf-primer::PrimerPack::customize` for how a
/// sub-context layers extra mappings on top of a shared dictionary instead
/// of mutating this one.
#[derive(Debug, Clone, Default)]
pub struct Rp210Dictionary {
    entries: IndexMap<Ul, Entry>,
}

impl Rp210Dictionary {
    /// Builds a dictionary from already-parsed RP 210 CSV rows
    /// `(ul, type_name, element_name, definition)`. Rows with any empty
    /// field are expected to already have been dropped by the caller, per
    /// the RP 210 loading rules (null fields in the source CSV disqualify
    /// the row).
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (Ul, String, String, String)>,
    {
        let mut entries = IndexMap::new();
        for (ul, type_name, element_name, definition) in rows {
            entries.insert(
                ul,
                Entry {
                    type_name,
                    element_name: flat_style(&element_name),
                    definition,
                },
            );
        }
        Self { entries }
    }

    /// A dictionary containing only the baseline synthetic entries (no
    /// real RP 210 rows). Useful for tests and as the seed a real loader
    /// builds on top of.
    pub fn synthetic_only() -> Self {
        let mut entries = IndexMap::new();
        insert_seed(&mut entries, synthetic_seed());
        Self { entries }
    }

    /// Returns a new dictionary with the synthetic Avid short-tag/Avid-type
    /// entries layered in, real rows inserted last so a literal UL
    /// collision always favors the caller's real RP 210 data.
    #[must_use]
    pub fn with_avid_extensions(mut self) -> Self {
        insert_seed(&mut self.entries, avid_seed());
        self
    }

    /// Merges the synthetic seed entries into an existing dictionary
    /// (real rows win on collision since they were inserted first and
    /// `IndexMap::insert` on an existing key updates the value in place
    /// without moving its position -- synthetic entries inserted here
    /// only fill in ULs that are not already present).
    #[must_use]
    pub fn with_synthetic_seed(mut self) -> Self {
        for (ul, entry) in synthetic_seed() {
            self.entries.entry(ul).or_insert(entry);
        }
        self
    }

    /// Inserts or overwrites a single row. Used by a sub-context (e.g.
    /// `mxf-primer::PrimerPack::customize`) to layer an explicit mapping on
    /// top of a dictionary without touching the shared instance it was
    /// cloned from.
    #[must_use]
    pub fn with_extra_row(mut self, ul: Ul, type_name: String, element_name: String, definition: String) -> Self {
        self.entries.insert(
            ul,
            Entry {
                type_name,
                element_name: flat_style(&element_name),
                definition,
            },
        );
        self
    }

    pub fn get(&self, ul: &Ul) -> Option<&Entry> {
        self.entries.get(ul)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn insert_seed(entries: &mut IndexMap<Ul, Entry>, seed: Vec<(Ul, Entry)>) {
    for (ul, entry) in seed {
        entries.insert(ul, entry);
    }
}

/// PEP-style flattening of an RP 210 "Data Element Name" column into a
/// lowercase, underscore-joined identifier.
fn flat_style(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

fn entry(type_name: &str, element_name: &str, definition: &str) -> Entry {
    Entry {
        type_name: type_name.to_string(),
        element_name: flat_style(element_name),
        definition: definition.to_string(),
    }
}

/// Hacks from short tags supposed to be present in a Primer Pack for AAF
/// compatibility but missing from real-world Avid OP files. All-zero
/// prefixed so they can never collide with a real SMPTE-administered UL.
fn synthetic_seed() -> Vec<(Ul, Entry)> {
    vec![
        (
            Ul::from_hex("00000000000000000000000000000001").unwrap(),
            entry("StrongReference", "AAF Metadata", "Avid AAF Metadata Reference"),
        ),
        (
            Ul::from_hex("00000000000000000000000000000002").unwrap(),
            entry("StrongReference", "Preface", "Avid Preface Reference"),
        ),
        (
            Ul::from_hex("00000000000000000000000000000003").unwrap(),
            entry(
                "StrongReferenceArray",
                "Avid StrongReferenceArray to Composited Types",
                "",
            ),
        ),
        (
            Ul::from_hex("00000000000000000000000000000004").unwrap(),
            entry(
                "StrongReferenceArray",
                "Avid StrongReferenceArray to Simple Types",
                "",
            ),
        ),
        (
            Ul::from_hex("00000000000000000000000000000010").unwrap(),
            entry("Boolean", "Signedness", ""),
        ),
        (
            Ul::from_hex("0000000000000000000000000000000f").unwrap(),
            entry("UInt8", "Length in bytes", ""),
        ),
        (
            Ul::from_hex("0000000000000000000000000000001b").unwrap(),
            entry("Reference", "Unknown data 1", ""),
        ),
        (
            // Looks like a regular SMPTE label but is absent from RP210v10.
            Ul::from_hex("060e2b34010101050e0b01030101010a").unwrap(),
            entry("UInt16", "SMPTE UInt16", "Unknown format 1"),
        ),
    ]
}

/// Avid-private ULs observed in real files, with reverse-engineered
/// (best-guess) RP 210 types.
fn avid_seed() -> Vec<(Ul, Entry)> {
    vec![
        (
            Ul::from_hex("8b4ebaf0ca0940b554405d72bfbd4b0e").unwrap(),
            entry("Int32", "Avid Int32? 1", ""),
        ),
        (
            Ul::from_hex("8bb3ad5a842b0585f6e59f10248e494c").unwrap(),
            entry("Int16", "Avid Int16? 2", ""),
        ),
        (
            Ul::from_hex("93c0b44a156ed52a945df2faf4654771").unwrap(),
            entry("Int16", "Avid Int16? 3", ""),
        ),
        (
            Ul::from_hex("a01c0004ac969f506095818347b111d4").unwrap(),
            entry("StrongReferenceArray", "Avid Metadata 1", "AvidDef1"),
        ),
        (
            Ul::from_hex("a01c0004ac969f506095818547b111d4").unwrap(),
            entry("StrongReferenceArray", "Avid Metadata 2", "AvidDef2"),
        ),
        (
            Ul::from_hex("a024006094eb75cbce2aca4d51ab11d3").unwrap(),
            entry("Int32", "Avid Int32? 4", ""),
        ),
        (
            Ul::from_hex("a024006094eb75cbce2aca4f51ab11d3").unwrap(),
            entry("Int32", "Avid Int32? 5", ""),
        ),
        (
            Ul::from_hex("a024006094eb75cbce2aca5051ab11d3").unwrap(),
            entry("Int32", "Avid Int32? 6", ""),
        ),
        (
            Ul::from_hex("a029006094eb75cb9d15fca354c511d3").unwrap(),
            entry("Int32", "Avid Int32? 7", ""),
        ),
        (
            Ul::from_hex("a9bac6e98e92018d36a2806248054b21").unwrap(),
            entry("Int32", "Avid Int32? 8", ""),
        ),
        (
            Ul::from_hex("a573fa765aa6468a06e929b37d154fd7").unwrap(),
            entry("Int16", "Avid Int16? 9", ""),
        ),
        (
            Ul::from_hex("a577a500581c9f050fbf8f904d984e06").unwrap(),
            entry("Int8", "Avid Int8? 10", ""),
        ),
        (
            Ul::from_hex("b1f07750aad8875d7839ba85999b4d60").unwrap(),
            entry("Int16", "Avid Int16? 11", ""),
        ),
        (
            Ul::from_hex("b94a62f973fe6063f3e9dc41bbec46bd").unwrap(),
            entry("Int8", "Avid Int8? 12", ""),
        ),
        (
            Ul::from_hex("bf734ae52b16b9eaf8fd061dea7e46ba").unwrap(),
            entry("Int16", "Avid Int16? 13", ""),
        ),
        (
            Ul::from_hex("82149f0b14ba0ce0473f46bf562e49b6").unwrap(),
            entry("Int32", "Avid Int32? 14", ""),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_entries_are_queryable() {
        let dict = Rp210Dictionary::synthetic_only();
        let ul = Ul::from_hex("00000000000000000000000000000001").unwrap();
        let e = dict.get(&ul).unwrap();
        assert_eq!(e.type_name, "StrongReference");
        assert_eq!(e.element_name, "aaf_metadata");
    }

    #[test]
    fn avid_extensions_layer_without_clobbering_synthetic() {
        let dict = Rp210Dictionary::synthetic_only().with_avid_extensions();
        assert!(dict.get(&Ul::from_hex("00000000000000000000000000000001").unwrap()).is_some());
        assert!(dict
            .get(&Ul::from_hex("8b4ebaf0ca0940b554405d72bfbd4b0e").unwrap())
            .is_some());
    }

    #[test]
    fn real_rows_win_over_synthetic_seed_on_collision() {
        let ul = Ul::from_hex("00000000000000000000000000000001").unwrap();
        let dict = Rp210Dictionary::from_rows(vec![(
            ul,
            "Int8".to_string(),
            "Real Row".to_string(),
            "from the published table".to_string(),
        )])
        .with_synthetic_seed();
        assert_eq!(dict.get(&ul).unwrap().type_name, "Int8");
    }
}
