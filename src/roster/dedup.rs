// src/roster/dedup.rs

use std::collections::HashSet;

use super::types::MemberRecord;

/// Drop records whose (name, role, category) repeats an earlier one,
/// ignoring case. The first spelling wins and order is kept.
pub fn dedup_members(records: Vec<MemberRecord>) -> Vec<MemberRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|r| {
            seen.insert((
                r.name.to_lowercase(),
                r.role.to_lowercase(),
                r.category.as_str().to_lowercase(),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::types::Category;

    #[test]
    fn keeps_first_casing() {
        let records = vec![
            MemberRecord::new("Bob Lee", "Quiz Night Coordinator", Category::Technical),
            MemberRecord::new("BOB LEE", "quiz night coordinator", Category::Technical),
            MemberRecord::new("Bob Lee", "Quiz Night Coordinator", Category::Cultural),
            MemberRecord::new("Ann", "Host", Category::Core),
        ];
        let unique = dedup_members(records);
        assert_eq!(unique.len(), 3);
        assert_eq!(unique[0].name, "Bob Lee");
        assert_eq!(unique[1].category, Category::Cultural);
        assert_eq!(unique[2].name, "Ann");
    }

    #[test]
    fn empty_in_empty_out() {
        assert!(dedup_members(Vec::new()).is_empty());
    }
}
