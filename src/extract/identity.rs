// src/extract/identity.rs

use serde_json::Value;

use super::json::{field, first, keys, map_entry, text};
use super::names::NameList;
use super::ExtractResult;
use crate::table::ResultTable;

/// Whether the display name and username look like they carry a real first name.
/// Only the two booleans leave this function; the names themselves are not reported.
pub fn extract_personal_information(record: &Value, names: &NameList) -> ExtractResult {
    let profile = first(field(record, "profile_user")?)?;
    let name = text(field(map_entry(profile, keys::NAME)?, "value")?)?;
    let username = text(field(map_entry(profile, keys::USERNAME)?, "value")?)?;

    let mut table = ResultTable::new(["name_is_first_name", "username_contains_first_name"]);
    table.push_row(vec![
        names.looks_like_name(&name).into(),
        names.looks_like_name(&username).into(),
    ]);
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractionError;
    use crate::table::Cell;
    use serde_json::json;

    fn profile(name: &str, username: &str) -> Value {
        json!({"media_map_data": {}, "string_map_data": {
            "Email": {"value": "a@b.c"},
            "Name": {"value": name},
            "Username": {"value": username}
        }})
    }

    #[test]
    fn flags_real_first_names() {
        let names = NameList::from_names(["Anna"]);
        let record = json!({"profile_user": [profile("Anna Smith", "sk8r.boi")]});
        let t = extract_personal_information(&record, &names).expect("table");
        assert_eq!(t.rows, vec![vec![Cell::Bool(true), Cell::Bool(false)]]);
    }

    #[test]
    fn username_tokens_are_checked() {
        let names = NameList::from_names(["Anna"]);
        let record = json!({"profile_user": profile("xx", "the_Anna.official")});
        let t = extract_personal_information(&record, &names).expect("table");
        assert_eq!(t.rows, vec![vec![Cell::Bool(false), Cell::Bool(true)]]);
    }

    #[test]
    fn german_username_key() {
        let names = NameList::from_names(["Jan"]);
        let record = json!({"profile_user": [{"string_map_data": {
            "Name": {"value": "Jan"},
            "Benutzername": {"value": "jan"}
        }}]});
        let t = extract_personal_information(&record, &names).expect("table");
        assert_eq!(t.rows, vec![vec![Cell::Bool(true), Cell::Bool(false)]]);
    }

    #[test]
    fn empty_profile_list_fails() {
        let names = NameList::default();
        assert!(matches!(
            extract_personal_information(&json!({"profile_user": []}), &names),
            Err(ExtractionError::SchemaMismatch(_))
        ));
    }
}
