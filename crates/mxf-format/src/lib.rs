//! DataSet/Partition/Random Index Pack decoding, the operational-pattern
//! driver, and the Avid extensions, built on top of `mxf-core`'s KLV/BER
//! framing, `mxf-dict`'s RP 210 table and `mxf-primer`'s local-tag lookup.
//!
//! [`driver`] is the entry point: [`driver::parse`] reads a full file into
//! a [`driver::ParsedMxf`], [`driver::write`] re-serializes one with the
//! Avid/OP-1a back-patch sequence applied.

pub mod avid;
pub mod dataset;
pub mod driver;
pub mod graph;
pub mod keys;
pub mod partition;

pub use avid::AvidObjectDirectory;
pub use dataset::DataSet;
pub use driver::{ParsedMxf, Truncate, Walker};
pub use graph::ObjectGraph;
pub use partition::{Dark, KlvFill, Partition, PartitionKind, RandomIndexPack};
