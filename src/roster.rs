//! Student records and the roster assembler.
//!
//! A [`StudentRecord`] is produced once by the extractor and never mutated.
//! [`assemble`] concatenates the per-document batches in input order and
//! sorts the result by the selected [`SortKey`].

use crate::error::RosterError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One extracted (name, email, photo) triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    /// Name as printed in the roster, e.g. `"Doe, Jane"`.
    pub name: String,
    pub email: String,
    /// Extracted photo on disk.
    pub image_path: PathBuf,
}

impl StudentRecord {
    /// Sort key for this record under `key`.
    ///
    /// Names are split on whitespace; a name without any token sorts first.
    pub fn sort_key(&self, key: SortKey) -> &str {
        let mut tokens = self.name.split_whitespace();
        let token = match key {
            SortKey::GivenName => tokens.next(),
            SortKey::Surname => tokens.next_back(),
        };
        token.unwrap_or("")
    }
}

/// Which name token orders the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortKey {
    /// First whitespace-delimited token of the name. (default)
    #[default]
    GivenName,
    /// Last whitespace-delimited token of the name.
    Surname,
}

/// Sort `records` in place by `key`. Stable: equal keys keep input order.
pub fn sort_roster(records: &mut [StudentRecord], key: SortKey) {
    records.sort_by(|a, b| a.sort_key(key).cmp(b.sort_key(key)));
}

/// Merge per-document batches (in the order given) into one sorted roster.
///
/// Duplicates across documents are kept.
///
/// # Errors
/// [`RosterError::NoRecordsExtracted`] when every batch is empty.
pub fn assemble(
    batches: Vec<Vec<StudentRecord>>,
    key: SortKey,
) -> Result<Vec<StudentRecord>, RosterError> {
    let documents = batches.len();
    let mut roster: Vec<StudentRecord> = batches.into_iter().flatten().collect();
    if roster.is_empty() {
        return Err(RosterError::NoRecordsExtracted { documents });
    }
    sort_roster(&mut roster, key);
    Ok(roster)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(name: &str) -> StudentRecord {
        StudentRecord {
            name: name.to_string(),
            email: format!("{}@example.edu", name.replace(' ', ".").to_lowercase()),
            image_path: PathBuf::from(format!("{}.png", name.replace(' ', "_"))),
        }
    }

    fn names(records: &[StudentRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn sort_by_given_name() {
        let mut r = vec![rec("Zoe Adams"), rec("Amy Young"), rec("Mark Brown")];
        sort_roster(&mut r, SortKey::GivenName);
        assert_eq!(names(&r), vec!["Amy Young", "Mark Brown", "Zoe Adams"]);
    }

    #[test]
    fn sort_by_surname() {
        let mut r = vec![rec("Zoe Adams"), rec("Amy Young"), rec("Mark Brown")];
        sort_roster(&mut r, SortKey::Surname);
        assert_eq!(names(&r), vec!["Zoe Adams", "Mark Brown", "Amy Young"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let mut r = vec![rec("Sam Lee"), rec("Ana Lee"), rec("Bo Kim"), rec("Al Lee")];
        sort_roster(&mut r, SortKey::Surname);
        assert_eq!(names(&r), vec!["Bo Kim", "Sam Lee", "Ana Lee", "Al Lee"]);
    }

    #[test]
    fn sorting_is_idempotent() {
        let mut r = vec![rec("Cy Dunn"), rec("Ava Best"), rec("Ava Abel"), rec("Bea Cole")];
        sort_roster(&mut r, SortKey::GivenName);
        let once = r.clone();
        sort_roster(&mut r, SortKey::GivenName);
        assert_eq!(r, once);
    }

    #[test]
    fn comma_names_use_literal_tokens() {
        // "Doe, Jane" sorts on "Doe," by given name and "Jane" by surname.
        let r = rec("Doe, Jane");
        assert_eq!(r.sort_key(SortKey::GivenName), "Doe,");
        assert_eq!(r.sort_key(SortKey::Surname), "Jane");
    }

    #[test]
    fn blank_name_sorts_first() {
        let mut r = vec![rec("Al Bo"), rec("  ")];
        sort_roster(&mut r, SortKey::Surname);
        assert_eq!(r[0].name, "  ");
    }

    #[test]
    fn assemble_concatenates_and_keeps_duplicates() {
        let roster = assemble(
            vec![vec![rec("Bea X"), rec("Al Y")], vec![rec("Al Y")]],
            SortKey::GivenName,
        )
        .unwrap();
        assert_eq!(names(&roster), vec!["Al Y", "Al Y", "Bea X"]);
    }

    #[test]
    fn assemble_empty_is_fatal() {
        let err = assemble(vec![vec![], vec![]], SortKey::GivenName).unwrap_err();
        assert!(matches!(err, RosterError::NoRecordsExtracted { documents: 2 }));
    }
}
