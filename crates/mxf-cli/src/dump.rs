//! Renders a parsed file into the `serde_json` structure the CLI prints.
//! `mxf-types::RpValue` carries no `Serialize` impl of its own (the wire
//! codecs have no use for one); this is the one place that needs a textual
//! rendering, so it lives here rather than on the type.

use serde_json::{json, Value};

use mxf_format::driver::{HeaderKlv, ParsedMxf};
use mxf_format::{DataSet, Partition};
use mxf_types::{AvidEscapeKind, ReferenceKind, RpValue, StringValue};

fn reference_kind_str(kind: &ReferenceKind) -> String {
    match kind {
        ReferenceKind::StrongReference => "StrongReference".to_string(),
        ReferenceKind::WeakReference => "WeakReference".to_string(),
        ReferenceKind::Other(s) => s.clone(),
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

pub fn value_to_json(value: &RpValue) -> Value {
    match value {
        RpValue::Reference { bytes, kind } => json!({
            "type": "Reference",
            "kind": reference_kind_str(kind),
            "value": hex(bytes),
        }),
        RpValue::Version(parts) => json!({ "type": "Version", "value": parts }),
        RpValue::Integer { width, value } => json!({ "type": "Integer", "width": width, "value": value }),
        RpValue::Boolean(b) => json!({ "type": "Boolean", "value": b }),
        RpValue::TimeStamp(Some(ts)) => json!({
            "type": "TimeStamp",
            "value": format!(
                "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:06}",
                ts.year, ts.month, ts.day, ts.hour, ts.minute, ts.second, ts.microsecond
            ),
        }),
        RpValue::TimeStamp(None) => json!({ "type": "TimeStamp", "value": null }),
        RpValue::String(StringValue::Unicode(s)) => json!({ "type": "String", "value": s }),
        RpValue::String(StringValue::AvidEscaped { kind, payload }) => json!({
            "type": "String",
            "avid_escape": match kind {
                AvidEscapeKind::Utf16Le => "Utf16Le",
                AvidEscapeKind::Int32 => "Int32",
            },
            "value": payload,
        }),
        RpValue::String(StringValue::Unencodable { avid_type_hex, raw }) => json!({
            "type": "String",
            "unencodable": true,
            "avid_type": avid_type_hex,
            "raw": hex(raw),
        }),
        RpValue::Rational { numerator, denominator } => json!({
            "type": "Rational",
            "value": format!("{numerator}/{denominator}"),
        }),
        RpValue::Length(n) => json!({ "type": "Length", "value": n }),
        RpValue::XID(n) => json!({ "type": "XID", "value": n }),
        RpValue::Array { subtype, items } => json!({
            "type": "Array",
            "subtype": subtype,
            "items": items.iter().map(value_to_json).collect::<Vec<_>>(),
        }),
        RpValue::VariableArray { subtype, items } => json!({
            "type": "VariableArray",
            "subtype": subtype,
            "items": items.iter().map(value_to_json).collect::<Vec<_>>(),
        }),
        RpValue::AvidOffset(n) => json!({ "type": "AvidOffset", "value": n }),
        RpValue::AvidVersion(parts) => json!({ "type": "AvidVersion", "value": parts }),
        RpValue::Raw(bytes) => json!({ "type": "Raw", "value": hex(bytes) }),
    }
}

fn dataset_json(set: &DataSet) -> Value {
    let mut elements = serde_json::Map::new();
    for (name, value) in set.elements() {
        elements.insert(name.to_string(), value_to_json(value));
    }
    json!({
        "key": set.key.hex(),
        "set_type": set.set_type,
        "dark": set.dark,
        "pos": set.pos,
        "elements": elements,
    })
}

fn partition_json(partition: &Partition) -> Value {
    json!({
        "pos": partition.pos,
        "major_version": partition.major_version,
        "minor_version": partition.minor_version,
        "this_partition": partition.this_partition,
        "previous_partition": partition.previous_partition,
        "footer_partition": partition.footer_partition,
        "header_byte_count": partition.header_byte_count,
        "index_byte_count": partition.index_byte_count,
        "index_sid": partition.index_sid,
        "body_offset": partition.body_offset,
        "body_sid": partition.body_sid,
        "operational_pattern": partition.operational_pattern.hex(),
        "essence_containers": partition.essence_containers.iter().map(|ul| ul.hex()).collect::<Vec<_>>(),
    })
}

/// Builds the top-level dump. `verbose` additionally includes every decoded
/// header DataSet's full element table; without it only counts are shown.
pub fn to_json(parsed: &ParsedMxf, verbose: bool) -> Value {
    let operational_pattern = parsed.header_partition.operational_pattern.hex();

    let structural_count = parsed
        .header_klvs
        .iter()
        .filter(|k| matches!(k, HeaderKlv::Structural(_) | HeaderKlv::AafDefinition(_)))
        .count();
    let dark_count = parsed.header_klvs.iter().filter(|k| matches!(k, HeaderKlv::Dark(_))).count();

    let mut dump = json!({
        "operational_pattern": operational_pattern,
        "has_object_directory": parsed.has_object_directory,
        "header_partition": partition_json(&parsed.header_partition),
        "footer_partition": partition_json(&parsed.footer_partition),
        "body_klv_count": parsed.body_klvs.len(),
        "header_klv_count": parsed.header_klvs.len(),
        "header_structural_count": structural_count,
        "header_dark_count": dark_count,
        "random_index_pack": parsed.random_index_pack.entries.iter().map(|(sid, off)| json!({"body_sid": sid, "byte_offset": off})).collect::<Vec<_>>(),
        "preface": parsed.preface().map(dataset_json),
    });

    if verbose {
        let sets: Vec<Value> = parsed
            .header_klvs
            .iter()
            .filter_map(|k| match k {
                HeaderKlv::Preface(d) | HeaderKlv::AvidPreface(d) | HeaderKlv::Structural(d) | HeaderKlv::AafDefinition(d) => {
                    Some(dataset_json(d))
                }
                _ => None,
            })
            .collect();
        dump["header_datasets"] = json!(sets);
    }

    dump
}
