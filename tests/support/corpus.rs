use std::path::Path;

use rusqlite::{Connection, params};

pub const CATEGORIES: [&str; 3] = ["water", "food", "medical_help"];

const WATER: [&str; 3] = [
    "we have no clean water",
    "need drinking water",
    "water is running out",
];
const FOOD: [&str; 3] = [
    "no food for days",
    "we need food rations",
    "the children are hungry and need food",
];
const MEDICAL: [&str; 3] = [
    "need a doctor urgently",
    "medical supplies and medicine",
    "injured people need medical care",
];
const FILLER: [&str; 6] = [
    "please help us",
    "in the north district",
    "since the storm",
    "our family of five",
    "near the old market",
    "thank you",
];

/// Message `i` of the synthetic corpus and its `(water, food, medical_help)` labels.
///
/// Label bits follow `i % 8`, so every combination appears and each category has its own
/// vocabulary.
pub fn message(i: usize) -> (String, [u8; 3]) {
    let bits = i % 8;
    let mut parts = Vec::new();
    if bits & 1 != 0 {
        parts.push(WATER[i % 3]);
    }
    if bits & 2 != 0 {
        parts.push(FOOD[(i / 2) % 3]);
    }
    if bits & 4 != 0 {
        parts.push(MEDICAL[(i / 4) % 3]);
    }
    parts.push(FILLER[i % 6]);
    let labels = [(bits & 1) as u8, ((bits >> 1) & 1) as u8, ((bits >> 2) & 1) as u8];
    (parts.join(" "), labels)
}

/// Create `table` in a new database at `path` holding `rows` synthetic messages.
pub fn write_corpus_db(path: &Path, table: &str, rows: usize) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(&format!(
        "CREATE TABLE {table} (id INTEGER PRIMARY KEY, message TEXT, original TEXT, genre TEXT, \
         water INTEGER, food INTEGER, medical_help INTEGER);"
    ))
    .unwrap();
    let mut stmt = conn
        .prepare(&format!(
            "INSERT INTO {table} (id, message, original, genre, water, food, medical_help) \
             VALUES (?1, ?2, NULL, 'direct', ?3, ?4, ?5)"
        ))
        .unwrap();
    for i in 0..rows {
        let (text, labels) = message(i);
        stmt.execute(params![i as i64, text, labels[0], labels[1], labels[2]])
            .unwrap();
    }
}
