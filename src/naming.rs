//! Naming conventions derived from the entity name.

use convert_case::{Boundary, Case, Casing};

const IRREGULAR: [(&str, &str); 6] = [
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("foot", "feet"),
];

const UNCOUNTABLE: [&str; 6] = ["data", "equipment", "information", "media", "news", "series"];

/// Names for one scaffolded entity, all derived from its PascalCase model name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityNames {
    /// `BlogPost`
    pub model: String,
    /// `blogPost`
    pub variable: String,
    /// `blog_posts`
    pub table: String,
    /// `blog-posts`
    pub route: String,
    /// `BlogPostController`
    pub controller: String,
}

impl EntityNames {
    pub fn new(model: &str) -> Self {
        let plural = pluralize(model);
        Self {
            model: model.to_string(),
            variable: from_model_name(model, Case::Camel),
            table: from_model_name(&plural, Case::Snake),
            route: from_model_name(&plural, Case::Kebab),
            controller: format!("{}Controller", model),
        }
    }
}

/// Split only before an uppercase letter, so digits stay on the word they
/// follow: `BlogPost2s` -> `blog_post2s`, `Oauth2Clients` -> `oauth2_clients`.
fn from_model_name(name: &str, case: Case) -> String {
    name.from_case(Case::Pascal)
        .remove_boundaries(&[
            Boundary::LowerDigit,
            Boundary::UpperDigit,
            Boundary::DigitLower,
        ])
        .to_case(case)
}

/// PascalCase identifier: ASCII letter first, then ASCII alphanumerics.
pub fn is_valid_model_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_uppercase() => chars.all(|c| c.is_ascii_alphanumeric()),
        _ => false,
    }
}

/// Model class inferred from a table name: `blog_posts` -> `BlogPost`.
pub fn related_model(table: &str) -> String {
    singularize(table).to_case(Case::Pascal)
}

/// Method name for a column: `published_at` -> `publishedAt`.
pub fn method_name(column: &str) -> String {
    column.to_case(Case::Camel)
}

/// Byte offset where the last word of a snake_case or PascalCase name starts.
fn last_word_start(s: &str) -> usize {
    s.char_indices()
        .rev()
        .find_map(|(i, c)| {
            if c == '_' || c == '-' {
                Some(i + 1)
            } else if c.is_uppercase() {
                Some(i)
            } else {
                None
            }
        })
        .unwrap_or(0)
}

fn match_case(template: &str, word: &str) -> String {
    if template.starts_with(|c: char| c.is_uppercase()) {
        let mut chars = word.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    } else {
        word.to_string()
    }
}

fn swap_last_word(s: &str, lookup: impl Fn(&str) -> Option<&'static str>) -> Option<String> {
    let start = last_word_start(s);
    let word = &s[start..];
    let replacement = lookup(&word.to_lowercase())?;
    Some(format!("{}{}", &s[..start], match_case(word, replacement)))
}

/// Very small heuristic pluralizer, case preserving.
pub fn pluralize(s: &str) -> String {
    let last = s[last_word_start(s)..].to_lowercase();
    if UNCOUNTABLE.contains(&last.as_str()) {
        return s.to_string();
    }
    if let Some(irregular) = swap_last_word(s, |w| {
        IRREGULAR.iter().find(|(one, _)| *one == w).map(|(_, many)| *many)
    }) {
        return irregular;
    }

    let lower = s.to_ascii_lowercase();
    let mut base = s.to_string();
    if lower.ends_with('y')
        && !matches!(
            lower
                .as_bytes()
                .get(lower.len().saturating_sub(2))
                .map(|c| *c as char),
            Some('a' | 'e' | 'i' | 'o' | 'u')
        )
    {
        base.pop();
        base.push_str("ies");
    } else if lower.ends_with('s')
        || lower.ends_with('x')
        || lower.ends_with('z')
        || lower.ends_with("ch")
        || lower.ends_with("sh")
    {
        base.push_str("es");
    } else {
        base.push('s');
    }
    base
}

/// Inverse of [`pluralize`] for the common suffixes.
pub fn singularize(s: &str) -> String {
    let last = s[last_word_start(s)..].to_lowercase();
    if UNCOUNTABLE.contains(&last.as_str()) {
        return s.to_string();
    }
    if let Some(irregular) = swap_last_word(s, |w| {
        IRREGULAR.iter().find(|(_, many)| *many == w).map(|(one, _)| *one)
    }) {
        return irregular;
    }

    let lower = s.to_ascii_lowercase();
    if lower.ends_with("ies") && lower.len() > 3 {
        return format!("{}y", &s[..s.len() - 3]);
    }
    let cut = if ["sses", "xes", "zes", "ches", "shes"]
        .iter()
        .any(|suffix| lower.ends_with(suffix))
    {
        2
    } else if lower.ends_with('s') && !lower.ends_with("ss") {
        1
    } else {
        0
    };
    s[..s.len() - cut].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_names() {
        let names = EntityNames::new("BlogPost");
        assert_eq!(names.variable, "blogPost");
        assert_eq!(names.table, "blog_posts");
        assert_eq!(names.route, "blog-posts");
        assert_eq!(names.controller, "BlogPostController");

        let names = EntityNames::new("BlogPost2");
        assert_eq!(names.variable, "blogPost2");
        assert_eq!(names.table, "blog_post2s");
        assert_eq!(names.route, "blog-post2s");

        let names = EntityNames::new("Oauth2Client");
        assert_eq!(names.table, "oauth2_clients");
        assert_eq!(names.route, "oauth2-clients");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("Category"), "Categories");
        assert_eq!(pluralize("Day"), "Days");
        assert_eq!(pluralize("Address"), "Addresses");
        assert_eq!(pluralize("Box"), "Boxes");
        assert_eq!(pluralize("Branch"), "Branches");
        assert_eq!(pluralize("Post"), "Posts");
        assert_eq!(pluralize("SalesPerson"), "SalesPeople");
        assert_eq!(pluralize("News"), "News");
    }

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("users"), "user");
        assert_eq!(singularize("categories"), "category");
        assert_eq!(singularize("addresses"), "address");
        assert_eq!(singularize("branches"), "branch");
        assert_eq!(singularize("blog_posts"), "blog_post");
        assert_eq!(singularize("people"), "person");
    }

    #[test]
    fn test_related_model() {
        assert_eq!(related_model("users"), "User");
        assert_eq!(related_model("blog_posts"), "BlogPost");
        assert_eq!(related_model("categories"), "Category");
    }

    #[test]
    fn test_method_name() {
        assert_eq!(method_name("published_at"), "publishedAt");
        assert_eq!(method_name("title"), "title");
    }

    #[test]
    fn test_model_name_validation() {
        assert!(is_valid_model_name("Post"));
        assert!(is_valid_model_name("BlogPost2"));
        assert!(!is_valid_model_name("post"));
        assert!(!is_valid_model_name("Blog-Post"));
        assert!(!is_valid_model_name(""));
        assert!(!is_valid_model_name("../Post"));
    }
}
