//! Unique identifier allocation for generated code.

use std::collections::{HashMap, HashSet};

/// Identifiers that generated page modules must never shadow.
pub const RESERVED_IDENTIFIERS: [&str; 6] = [
    "useState",
    "Fragment",
    "useResource",
    "useVariableState",
    "Page",
    "_props",
];

/// Allocates stable, collision-free JavaScript identifiers.
///
/// Each id gets one name for the lifetime of the scope. Preferred names are
/// normalized to valid identifiers and suffixed with `_1`, `_2`, ... when
/// already taken.
#[derive(Debug, Default)]
pub struct Scope {
    names: HashMap<String, String>,
    used: HashSet<String>,
}

impl Scope {
    /// Create a scope with `reserved` names already taken.
    #[must_use]
    pub fn new<'a>(reserved: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            names: HashMap::new(),
            used: reserved.into_iter().map(str::to_owned).collect(),
        }
    }

    /// Scope pre-seeded with [`RESERVED_IDENTIFIERS`].
    #[must_use]
    pub fn for_page() -> Self {
        Self::new(RESERVED_IDENTIFIERS)
    }

    /// Name allocated to `id`, allocating one from `preferred` on first use.
    pub fn name_for(&mut self, id: &str, preferred: &str) -> String {
        if let Some(name) = self.names.get(id) {
            return name.clone();
        }
        let base = normalize_identifier(preferred);
        let mut name = base.clone();
        let mut index = 0;
        while self.used.contains(&name) {
            index += 1;
            name = format!("{base}_{index}");
        }
        self.used.insert(name.clone());
        self.names.insert(id.to_owned(), name.clone());
        name
    }

    /// Name already allocated to `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }
}

/// Replace characters outside `[A-Za-z0-9_$]` with `_` and prefix a leading digit.
#[must_use]
pub fn normalize_identifier(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if out.is_empty() {
        out.push('_');
    } else if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_is_stable_per_id() {
        let mut scope = Scope::new([]);

        let first = scope.name_for("a", "count");
        let again = scope.name_for("a", "other");

        assert_eq!(first, "count");
        assert_eq!(again, "count");
    }

    #[test]
    fn test_collisions_get_suffixes() {
        let mut scope = Scope::new([]);

        assert_eq!(scope.name_for("a", "item"), "item");
        assert_eq!(scope.name_for("b", "item"), "item_1");
        assert_eq!(scope.name_for("c", "item"), "item_2");
    }

    #[test]
    fn test_reserved_names_are_avoided() {
        let mut scope = Scope::for_page();

        assert_eq!(scope.name_for("x", "Fragment"), "Fragment_1");
        assert_eq!(scope.name_for("y", "Page"), "Page_1");
        assert_eq!(scope.get("y"), Some("Page_1"));
        assert_eq!(scope.get("z"), None);
    }

    #[test]
    fn test_normalize_identifier() {
        assert_eq!(normalize_identifier("my-var"), "my_var");
        assert_eq!(normalize_identifier("1st"), "_1st");
        assert_eq!(normalize_identifier("$ok"), "$ok");
        assert_eq!(normalize_identifier(""), "_");
        assert_eq!(normalize_identifier("héllo"), "h_llo");
    }
}
