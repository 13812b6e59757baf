//! Tests for the `#[derive(Record)]` macro output.
//!
//! These tests verify that the derive macro generates:
//! - A `FIELDS` table in declaration order, with column tags
//! - A `decode_field` hook that converts values into each field type
//! - A `decode_unmatched` hook for `#[column(unmatched)]` fields

use namedsql_core::record::{ColumnPlan, FieldMapping, Record};
use namedsql_core::{Error, ResultSet, RowCursor, SqlValue};
use namedsql_derive::Record;

// =============================================================================
// Test: Field table
// =============================================================================

#[derive(Debug, Default, PartialEq, Record)]
struct Account {
    id: i64,
    #[column(name = "display_name")]
    name: String,
    balance: f64,
    active: bool,
    note: Option<String>,
    avatar: Vec<u8>,
}

#[derive(Debug, Default, PartialEq, Record)]
struct Keyword {
    r#type: String,
}

#[derive(Debug, Default, PartialEq, Record)]
struct Loose {
    id: i64,
    #[column(unmatched)]
    extra: Vec<(String, SqlValue)>,
    name: String,
}

#[test]
fn test_fields_in_declaration_order() {
    assert_eq!(
        Account::FIELDS,
        &[
            FieldMapping::new("id"),
            FieldMapping::tagged("name", "display_name"),
            FieldMapping::new("balance"),
            FieldMapping::new("active"),
            FieldMapping::new("note"),
            FieldMapping::new("avatar"),
        ]
    );
}

#[test]
fn test_raw_identifier_field_name() {
    assert_eq!(Keyword::FIELDS, &[FieldMapping::new("type")]);
}

// =============================================================================
// Test: Decoding
// =============================================================================

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| (*s).to_string()).collect()
}

#[test]
fn test_decode_all_field_types() {
    let cols = columns(&["ID", "display_name", "balance", "active", "note", "avatar"]);
    let plan = ColumnPlan::new::<Account>(&cols);
    let account: Account = plan
        .decode(
            &cols,
            &[
                SqlValue::Int32(7),
                SqlValue::Bytes(b"ada".to_vec()),
                SqlValue::Int64(12),
                SqlValue::Bytes(b"true".to_vec()),
                SqlValue::Null,
                SqlValue::Text(String::from("png")),
            ],
        )
        .unwrap();

    assert_eq!(
        account,
        Account {
            id: 7,
            name: String::from("ada"),
            balance: 12.0,
            active: true,
            note: None,
            avatar: b"png".to_vec(),
        }
    );
}

#[test]
fn test_untagged_name_does_not_match_tagged_field() {
    let cols = columns(&["id", "name"]);
    let plan = ColumnPlan::new::<Account>(&cols);
    assert_eq!(plan.target(0), Some(0));
    assert_eq!(plan.target(1), Some(1));

    let cols = columns(&["id", "nickname"]);
    let plan = ColumnPlan::new::<Account>(&cols);
    assert_eq!(plan.target(1), None);
}

#[test]
fn test_short_result_leaves_defaults() {
    let cols = columns(&["id"]);
    let account: Account = ColumnPlan::new::<Account>(&cols)
        .decode(&cols, &[SqlValue::Int64(3)])
        .unwrap();
    assert_eq!(account.id, 3);
    assert!(account.name.is_empty());
    assert!(!account.active);
}

#[test]
fn test_decode_error_reports_column_and_types() {
    let cols = columns(&["id", "display_name", "balance"]);
    let err = ColumnPlan::new::<Account>(&cols)
        .decode::<Account>(
            &cols,
            &[
                SqlValue::Int64(1),
                SqlValue::Text(String::from("ada")),
                SqlValue::Text(String::from("lots")),
            ],
        )
        .unwrap_err();
    assert_eq!(
        err,
        Error::CannotConvert {
            column: String::from("balance"),
            kind: "TEXT",
            target: "f64",
        }
    );
}

#[test]
fn test_unmatched_field_takes_no_position() {
    assert_eq!(
        Loose::FIELDS,
        &[FieldMapping::new("id"), FieldMapping::new("name")]
    );
}

#[test]
fn test_unmatched_field_collects_leftover_columns() {
    let cols = columns(&["id", "nickname", "age"]);
    let loose: Loose = ColumnPlan::new::<Loose>(&cols)
        .decode(
            &cols,
            &[
                SqlValue::Int64(1),
                SqlValue::Text(String::from("ada")),
                SqlValue::Int64(36),
            ],
        )
        .unwrap();

    assert_eq!(
        loose,
        Loose {
            id: 1,
            extra: vec![
                (String::from("nickname"), SqlValue::Text(String::from("ada"))),
                (String::from("age"), SqlValue::Int64(36)),
            ],
            name: String::new(),
        }
    );
}

// =============================================================================
// Test: Typed fetch through a cursor
// =============================================================================

struct VecCursor {
    columns: Vec<String>,
    rows: std::vec::IntoIter<Vec<SqlValue>>,
}

impl RowCursor for VecCursor {
    type Error = Error;

    fn columns(&self) -> &[String] {
        &self.columns
    }

    async fn next_row(&mut self, buffer: &mut [SqlValue]) -> Result<bool, Error> {
        match self.rows.next() {
            Some(row) => {
                buffer.clone_from_slice(&row);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn close(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

#[tokio::test]
async fn test_fetch_typed_from_result_set() {
    let cursor = VecCursor {
        columns: columns(&["type"]),
        rows: vec![
            vec![SqlValue::Text(String::from("a"))],
            vec![SqlValue::Int64(2)],
        ]
        .into_iter(),
    };
    let mut rs = ResultSet::new(cursor);
    let keywords: Vec<Keyword> = rs.fetch_typed().await.unwrap();
    assert_eq!(
        keywords,
        vec![
            Keyword {
                r#type: String::from("a")
            },
            Keyword {
                r#type: String::from("2")
            },
        ]
    );
    assert_eq!(
        rs.fetch_typed::<Keyword>().await.unwrap_err(),
        Error::ResultClosed
    );
}
