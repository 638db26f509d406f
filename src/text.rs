use crate::ir::{AttributeMap, MetadataTable};

pub const MISSING_VALUE: &str = "NA";

/// Value of `key` at `date_index`, if the key is reported and the date has a value.
pub fn value_at(data: &AttributeMap, key: &str, date_index: usize) -> Option<f64> {
    data.get(key)
        .and_then(|values| values.get(date_index))
        .copied()
        .flatten()
}

/// Rounds to the nearest integer, halves away from zero.
pub fn format_rounded(value: f64) -> String {
    let rounded = value.round();
    if rounded == 0.0 {
        // avoid "-0"
        return "0".to_string();
    }
    format!("{rounded}")
}

pub fn format_value(value: Option<f64>) -> String {
    value
        .map(format_rounded)
        .unwrap_or_else(|| MISSING_VALUE.to_string())
}

/// One `"<label> <value> <unit>"` line per reported key, in input order.
pub fn tooltip_text(data: &AttributeMap, date_index: usize, metadata: &MetadataTable) -> String {
    data.keys()
        .map(|key| {
            format!(
                "{} {} {}",
                metadata.label(key),
                format_value(value_at(data, key, date_index)),
                metadata.unit(key)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::MetadataEntry;

    fn metadata() -> MetadataTable {
        MetadataTable::new(
            &[MetadataEntry::new("oilrate", "Oil Rate", Some("Sm3/day"))],
            &[MetadataEntry::new("pressure", "Pressure", Some("bar"))],
        )
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(format_rounded(2.5), "3");
        assert_eq!(format_rounded(-2.5), "-3");
        assert_eq!(format_rounded(-0.2), "0");
        assert_eq!(format_rounded(1234.4), "1234");
    }

    #[test]
    fn tooltip_lists_every_key_and_marks_gaps() {
        let mut data = AttributeMap::new();
        data.insert("oilrate".into(), vec![Some(12.6), Some(13.0)]);
        data.insert("watercut".into(), vec![None, Some(0.4)]);
        let text = tooltip_text(&data, 0, &metadata());
        assert_eq!(text, "Oil Rate 13 Sm3/day\n NA ");
    }

    #[test]
    fn tooltip_for_short_series_is_na() {
        let mut data = AttributeMap::new();
        data.insert("pressure".into(), vec![Some(100.0)]);
        assert_eq!(tooltip_text(&data, 3, &metadata()), "Pressure NA bar");
    }

    #[test]
    fn tooltip_without_data_is_empty() {
        assert_eq!(tooltip_text(&AttributeMap::new(), 0, &metadata()), "");
    }
}
