//! Record selection for delete-by-name.

use crate::error::{DnsError, Result};
use crate::types::{DnsRecord, RecordType};

/// Select the record to delete for a `(name, type)` query.
///
/// Records are scanned in the order the provider returned them and the first
/// one whose name and type both match wins. Later duplicates are left alone;
/// their presence is logged. Names compare ASCII case-insensitively.
///
/// # Errors
///
/// Returns `DnsError::RecordNotFound` if no record matches.
pub fn select_record<'a>(
    records: &'a [DnsRecord],
    name: &str,
    record_type: &RecordType,
) -> Result<&'a DnsRecord> {
    let mut matches = records
        .iter()
        .filter(|r| r.record_type == *record_type && r.name.eq_ignore_ascii_case(name));

    let selected = matches.next().ok_or_else(|| DnsError::RecordNotFound {
        name: name.to_string(),
        record_type: record_type.clone(),
    })?;

    let duplicates = matches.count();
    if duplicates > 0 {
        tracing::warn!(
            name = %name,
            record_type = %record_type,
            record_id = %selected.id,
            duplicates,
            "Multiple records match; only the first is selected"
        );
    }

    Ok(selected)
}
