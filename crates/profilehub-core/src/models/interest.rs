use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// An entry of the interest catalogue (`GET /interests/`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Interest {
    pub id: i64,
    pub name: String,
    pub category_name: String,
}

/// An interest selected by the user (`GET /user-interests/`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct UserInterest {
    pub interest_id: i64,
    pub interest_name: String,
    pub category_name: String,
}

impl From<&Interest> for UserInterest {
    fn from(interest: &Interest) -> Self {
        Self {
            interest_id: interest.id,
            interest_name: interest.name.clone(),
            category_name: interest.category_name.clone(),
        }
    }
}

/// Entry of the bulk-update request body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct UpdatedUserInterest {
    pub interest_id: i64,
}

impl UpdatedUserInterest {
    pub fn from_ids(ids: &[i64]) -> Vec<Self> {
        ids.iter().map(|&interest_id| Self { interest_id }).collect()
    }
}

/// Anything that belongs to a named interest category
pub trait Categorized {
    fn category_name(&self) -> &str;
}

impl Categorized for Interest {
    fn category_name(&self) -> &str {
        &self.category_name
    }
}

impl Categorized for UserInterest {
    fn category_name(&self) -> &str {
        &self.category_name
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterestGroup<'a, T> {
    pub category: &'a str,
    pub items: Vec<&'a T>,
}

/// Group items by category.
/// Categories keep the order of their first appearance, items keep input order.
pub fn group_by_category<T: Categorized>(items: &[T]) -> Vec<InterestGroup<'_, T>> {
    let mut groups: Vec<InterestGroup<'_, T>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for item in items {
        let category = item.category_name();
        match index.get(category) {
            Some(&i) => groups[i].items.push(item),
            None => {
                index.insert(category, groups.len());
                groups.push(InterestGroup {
                    category,
                    items: vec![item],
                });
            }
        }
    }

    groups
}

/// Build the user's interest list from the catalogue and a set of selected ids.
/// Result follows catalogue order; ids missing from the catalogue are dropped.
pub fn selected_interests(catalogue: &[Interest], selected: &[i64]) -> Vec<UserInterest> {
    catalogue
        .iter()
        .filter(|interest| selected.contains(&interest.id))
        .map(UserInterest::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interest(id: i64, name: &str, category: &str) -> Interest {
        Interest {
            id,
            name: name.to_string(),
            category_name: category.to_string(),
        }
    }

    fn catalogue() -> Vec<Interest> {
        vec![
            interest(1, "Climbing", "Outdoors"),
            interest(2, "Chess", "Games"),
            interest(3, "Hiking", "Outdoors"),
            interest(4, "Go", "Games"),
            interest(5, "Jazz", "Music"),
        ]
    }

    #[test]
    fn test_group_by_category_first_appearance_order() {
        let all = catalogue();
        let groups = group_by_category(&all);

        let categories: Vec<&str> = groups.iter().map(|g| g.category).collect();
        assert_eq!(categories, vec!["Outdoors", "Games", "Music"]);

        let outdoors: Vec<&str> = groups[0].items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(outdoors, vec!["Climbing", "Hiking"]);
    }

    #[test]
    fn test_group_by_category_empty() {
        let empty: Vec<UserInterest> = Vec::new();
        assert!(group_by_category(&empty).is_empty());
    }

    #[test]
    fn test_selected_interests_follows_catalogue_order() {
        let all = catalogue();
        let picked = selected_interests(&all, &[5, 1, 99]);

        assert_eq!(picked.len(), 2);
        assert_eq!(picked[0].interest_id, 1);
        assert_eq!(picked[0].interest_name, "Climbing");
        assert_eq!(picked[0].category_name, "Outdoors");
        assert_eq!(picked[1].interest_id, 5);
    }

    #[test]
    fn test_updated_user_interest_wire_format() {
        let body = UpdatedUserInterest::from_ids(&[3, 4]);
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!([{ "interest_id": 3 }, { "interest_id": 4 }])
        );
    }

    #[test]
    fn test_parse_user_interests() {
        let json = r#"[{"interest_id": 2, "interest_name": "Chess", "category_name": "Games"}]"#;
        let parsed: Vec<UserInterest> = serde_json::from_str(json).expect("Failed to parse user interests");
        assert_eq!(parsed[0].interest_name, "Chess");
    }
}
