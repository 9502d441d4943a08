//! Field name cleaning for BigQuery-compatible column names
//!
//! BigQuery columns must contain only letters, numbers and underscores,
//! start with a letter or underscore, and be at most 300 characters long.

use crate::types::Record;

/// Maximum length of a cleaned field name
pub const MAX_FIELD_NAME_LEN: usize = 300;

/// Substitution for a character that is not ASCII alphanumeric
fn substitute(c: char) -> &'static str {
    match c {
        '€' => "_euro",
        '$' => "_money",
        '%' => "_avg",
        _ => "_",
    }
}

/// Clean up a field name so it matches BigQuery naming conventions
///
/// Alphanumeric characters are kept as-is (case preserved). Everything else
/// is replaced: `€` becomes `_euro`, `$` becomes `_money`, `%` becomes
/// `_avg` and any other character becomes `_`. A leading digit gets an underscore
/// prepended, and the result is cut to [`MAX_FIELD_NAME_LEN`] characters.
///
/// An empty name cleans to `"_"`.
///
/// ```
/// use solidafy_target_gcs::naming::sanitize_field_name;
///
/// assert_eq!(sanitize_field_name("price%"), "price_avg");
/// assert_eq!(sanitize_field_name("2fast"), "_2fast");
/// ```
pub fn sanitize_field_name(field_name: &str) -> String {
    let mut cleaned = String::with_capacity(field_name.len() + 1);

    for c in field_name.chars() {
        if c.is_ascii_alphanumeric() {
            cleaned.push(c);
        } else {
            cleaned.push_str(substitute(c));
        }
    }

    if cleaned.is_empty() || cleaned.starts_with(|c: char| c.is_ascii_digit()) {
        cleaned.insert(0, '_');
    }

    // Output is pure ASCII, so byte length equals char count
    cleaned.truncate(MAX_FIELD_NAME_LEN);
    cleaned
}

/// Rebuild a record with every top-level key cleaned
///
/// Values and insertion order are preserved. Keys that clean to the same
/// name are not disambiguated: the later value wins and the key keeps the
/// position of its first occurrence.
pub fn sanitize_record_keys(record: Record) -> Record {
    let mut clean = Record::new();
    for (key, value) in record {
        clean.insert(sanitize_field_name(&key), value);
    }
    clean
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use test_case::test_case;

    fn is_legal(name: &str) -> bool {
        name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            && !name.starts_with(|c: char| c.is_ascii_digit())
            && name.len() <= MAX_FIELD_NAME_LEN
    }

    #[test_case("price%", "price_avg" ; "percent")]
    #[test_case("cost$", "cost_money" ; "dollar")]
    #[test_case("total€", "total_euro" ; "euro")]
    #[test_case("2fast", "_2fast" ; "leading digit")]
    #[test_case("a b-c", "a_b_c" ; "space and dash")]
    #[test_case("User Name", "User_Name" ; "case preserved")]
    #[test_case("2cost%", "_2cost_avg" ; "digit and percent")]
    #[test_case("", "_" ; "empty")]
    #[test_case("_id", "_id" ; "leading underscore")]
    #[test_case("café", "caf_" ; "non ascii letter")]
    #[test_case("a.b.c", "a_b_c" ; "dots")]
    #[test_case("$", "_money" ; "only dollar")]
    #[test_case("9", "_9" ; "single digit")]
    #[test_case("€5", "_euro5" ; "euro then digit")]
    fn test_sanitize_field_name(input: &str, expected: &str) {
        assert_eq!(sanitize_field_name(input), expected);
    }

    #[test_case("plain" ; "letters")]
    #[test_case("with space and % and $" ; "symbols")]
    #[test_case("日本語のカラム" ; "cjk")]
    #[test_case("1️⃣ emoji 🎉" ; "emoji")]
    #[test_case("\t\n\r" ; "control")]
    #[test_case("123456" ; "digits")]
    fn test_output_is_legal(input: &str) {
        assert!(is_legal(&sanitize_field_name(input)));
    }

    #[test]
    fn test_truncates_to_max_len() {
        let long = "a".repeat(500);
        assert_eq!(sanitize_field_name(&long).len(), MAX_FIELD_NAME_LEN);

        // Expansion happens before truncation
        let expanding = "%".repeat(200);
        let cleaned = sanitize_field_name(&expanding);
        assert_eq!(cleaned.len(), MAX_FIELD_NAME_LEN);
        assert!(cleaned.starts_with("_avg_avg"));

        let digits = "1".repeat(300);
        let cleaned = sanitize_field_name(&digits);
        assert_eq!(cleaned.len(), MAX_FIELD_NAME_LEN);
        assert!(cleaned.starts_with('_'));
    }

    #[test_case(&format!("{}€", "a".repeat(299)), "a" ; "expansion past limit")]
    #[test_case(&format!("{}%", "1".repeat(298)), "_" ; "digits and expansion past limit")]
    #[test_case(&format!("{}$", "b".repeat(294)), "b" ; "expansion ends at limit")]
    #[test_case(&"9".repeat(300), "_" ; "leading underscore pushes past limit")]
    #[test_case(&"€".repeat(100), "_" ; "only expansions")]
    #[test_case(&format!("{} x", "z".repeat(298)), "z" ; "substitution at limit")]
    fn test_truncation_boundaries(input: &str, first: &str) {
        let cleaned = sanitize_field_name(input);
        assert_eq!(cleaned.len(), MAX_FIELD_NAME_LEN);
        assert!(cleaned.starts_with(first));
        assert!(is_legal(&cleaned));
    }

    #[test_case("already_clean" ; "snake")]
    #[test_case("_9lives" ; "underscore digit")]
    #[test_case("price_avg" ; "substituted word")]
    #[test_case("CamelCase123" ; "camel")]
    #[test_case("_" ; "underscore")]
    fn test_idempotent_on_legal_names(name: &str) {
        let once = sanitize_field_name(name);
        assert_eq!(once, name);
        assert_eq!(sanitize_field_name(&once), once);
    }

    #[test]
    fn test_sanitize_record_keys_preserves_order_and_values() {
        let record = json!({"User Name": "a", "2cost%": 5, "nested obj": {"x y": 1}});
        let record = record.as_object().cloned().unwrap();

        let clean = sanitize_record_keys(record);
        let keys: Vec<&str> = clean.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["User_Name", "_2cost_avg", "nested_obj"]);
        // Only top-level keys are cleaned
        assert_eq!(clean["nested_obj"], json!({"x y": 1}));
    }

    #[test]
    fn test_collision_last_write_wins() {
        let record = json!({"a ": 1, "b": 2, "a-": 3});
        let record = record.as_object().cloned().unwrap();

        let clean = sanitize_record_keys(record);
        assert_eq!(clean.len(), 2);
        assert_eq!(clean["a_"], json!(3));
        assert_eq!(clean.keys().next().map(String::as_str), Some("a_"));
    }
}
