//! Rules every reorder request must satisfy before (and while) it is applied.

use std::collections::HashSet;

use uuid::Uuid;

use super::DatabaseError;

/// Rejects a list naming the same row twice.
pub fn ensure_unique(ids: &[Uuid]) -> Result<(), DatabaseError> {
    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(id) {
            return Err(DatabaseError::Validation(format!(
                "orderedIds contains duplicate id {}",
                id
            )));
        }
    }
    Ok(())
}

/// The new order must be total: one entry per existing row.
pub fn ensure_complete(given: usize, existing: i64) -> Result<(), DatabaseError> {
    if given as i64 != existing {
        return Err(DatabaseError::Validation(format!(
            "orderedIds must list every item exactly once (expected {}, got {})",
            existing, given
        )));
    }
    Ok(())
}

pub fn unknown_id(label: &str, id: Uuid) -> DatabaseError {
    DatabaseError::NotFound(format!("{} {} not found", label, id))
}

/// 1-based `order_index` for the entry at `position`.
pub fn order_index_at(position: usize) -> i32 {
    position as i32 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_distinct_ids() {
        let ids = vec![Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        assert!(ensure_unique(&ids).is_ok());
        assert!(ensure_unique(&[]).is_ok());
    }

    #[test]
    fn rejects_duplicates() {
        let a = Uuid::new_v4();
        let err = ensure_unique(&[a, Uuid::new_v4(), a]).unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(msg) if msg.contains(&a.to_string())));
    }

    #[test]
    fn completeness_compares_against_row_count() {
        assert!(ensure_complete(3, 3).is_ok());
        assert!(ensure_complete(0, 0).is_ok());
        assert!(matches!(ensure_complete(2, 3), Err(DatabaseError::Validation(_))));
        assert!(matches!(ensure_complete(4, 3), Err(DatabaseError::Validation(_))));
    }

    #[test]
    fn positions_are_one_based() {
        assert_eq!(order_index_at(0), 1);
        assert_eq!(order_index_at(2), 3);
    }
}
