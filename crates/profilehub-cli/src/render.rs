//! Plain-text rendering of profiles and interests.

use std::fmt::Write;

use profilehub_core::models::{group_by_category, Interest, UserInterest, UserProfile};
use profilehub_core::utils::truncate_string;

/// Longest interest name shown in the catalogue listing
const MAX_INTEREST_NAME_WIDTH: usize = 40;

pub fn render_user_interests(interests: &[UserInterest]) -> String {
    if interests.is_empty() {
        return "No interests selected.\n".to_string();
    }

    let mut out = String::new();
    for group in group_by_category(interests) {
        let _ = writeln!(out, "{}", group.category);
        for interest in group.items {
            let _ = writeln!(out, "  - {}", interest.interest_name);
        }
    }
    out
}

pub fn render_profile(profile: &UserProfile, interests: &[UserInterest]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Email: {}", profile.email);
    let _ = writeln!(out, "Bio:   {}", profile.bio_display());
    let _ = writeln!(out);
    let _ = writeln!(out, "Interests");
    out.push_str(&render_user_interests(interests));
    out
}

/// Catalogue grouped by category, with ids and a mark for selected entries
pub fn render_catalogue(catalogue: &[Interest], selected: &[i64]) -> String {
    if catalogue.is_empty() {
        return "No interests available.\n".to_string();
    }

    let mut out = String::new();
    for group in group_by_category(catalogue) {
        let _ = writeln!(out, "{}", group.category);
        for interest in group.items {
            let mark = if selected.contains(&interest.id) { "x" } else { " " };
            let _ = writeln!(
                out,
                "  [{}] {:>4}  {}",
                mark,
                interest.id,
                truncate_string(&interest.name, MAX_INTEREST_NAME_WIDTH)
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_interest(id: i64, name: &str, category: &str) -> UserInterest {
        UserInterest {
            interest_id: id,
            interest_name: name.to_string(),
            category_name: category.to_string(),
        }
    }

    #[test]
    fn test_render_user_interests_grouped() {
        let interests = vec![
            user_interest(1, "Climbing", "Outdoors"),
            user_interest(2, "Chess", "Games"),
            user_interest(3, "Hiking", "Outdoors"),
        ];
        assert_eq!(
            render_user_interests(&interests),
            "Outdoors\n  - Climbing\n  - Hiking\nGames\n  - Chess\n"
        );
    }

    #[test]
    fn test_render_empty_interests() {
        assert_eq!(render_user_interests(&[]), "No interests selected.\n");
    }

    #[test]
    fn test_render_profile() {
        let profile = UserProfile {
            email: "a@b.com".to_string(),
            bio: String::new(),
        };
        let out = render_profile(&profile, &[]);
        assert!(out.starts_with("Email: a@b.com\nBio:   (no bio)\n"));
        assert!(out.ends_with("No interests selected.\n"));
    }

    #[test]
    fn test_render_catalogue_marks_selection() {
        let catalogue = vec![
            Interest {
                id: 1,
                name: "Climbing".to_string(),
                category_name: "Outdoors".to_string(),
            },
            Interest {
                id: 12,
                name: "Hiking".to_string(),
                category_name: "Outdoors".to_string(),
            },
        ];
        assert_eq!(
            render_catalogue(&catalogue, &[12]),
            "Outdoors\n  [ ]    1  Climbing\n  [x]   12  Hiking\n"
        );
    }
}
