//! CLI presentation: text tables and JSON for command results.

use crate::cli::parse::OutputFormat;
use crate::query::EntryInfo;
use crate::tree::node::NodeKind;
use crate::types::Timestamp;
use chrono::{DateTime, SecondsFormat};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use serde_json::json;

fn format_mtime(mtime: Timestamp) -> String {
    DateTime::from_timestamp(mtime, 0)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| mtime.to_string())
}

fn kind_label(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::File => "file",
        NodeKind::Directory => "dir",
    }
}

/// Directory listing: one row per entry.
pub fn format_listing(rows: &[(String, EntryInfo)], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            let entries: Vec<_> = rows
                .iter()
                .map(|(name, info)| {
                    json!({
                        "name": name,
                        "kind": info.kind,
                        "size": info.size,
                        "permissions": format!("{:04o}", info.permissions),
                        "mtime": info.mtime,
                        "id": info.id.to_hex(),
                    })
                })
                .collect();
            serde_json::to_string_pretty(&entries).unwrap_or_default()
        }
        OutputFormat::Text => {
            let mut table = Table::new();
            table.load_preset(UTF8_BORDERS_ONLY);
            table.set_header(vec!["Name", "Kind", "Size", "Mode", "Modified", "Id"]);
            for (name, info) in rows {
                table.add_row(vec![
                    name.clone(),
                    kind_label(info.kind).to_string(),
                    info.size.to_string(),
                    format!("{:04o}", info.permissions),
                    format_mtime(info.mtime),
                    info.id.short(),
                ]);
            }
            table.to_string()
        }
    }
}

/// A list of tree paths, one per line or as a JSON array.
pub fn format_paths(paths: &[String], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(paths).unwrap_or_default(),
        OutputFormat::Text => paths.join("\n"),
    }
}

pub fn format_copy_summary(dest: &std::path::Path, digest: &str, wiped: bool) -> String {
    let mode = if wiped { "mirrored" } else { "merged" };
    format!("{} into {}\n{}", mode, dest.display(), digest)
}
