//! Relative import paths and per-module import tables.

use std::fmt::Write;

/// Relative import path from `importer` to `importee`.
///
/// Both arguments are `/`-separated paths relative to the site root. The
/// result starts with `./` when no parent traversal is needed.
///
/// ```
/// use sitepack_export::import_from;
///
/// assert_eq!(import_from("app/a/b.ts", "app/a/c.ts"), "./b.ts");
/// assert_eq!(import_from("app/x.ts", "app/a/b/c.ts"), "../../x.ts");
/// ```
#[must_use]
pub fn import_from(importee: &str, importer: &str) -> String {
    let mut importer_dirs: Vec<&str> = importer.split('/').collect();
    importer_dirs.pop();
    let importee_parts: Vec<&str> = importee.split('/').collect();

    let common = importer_dirs
        .iter()
        .zip(&importee_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let up = importer_dirs.len() - common;
    let rest = importee_parts[common..].join("/");
    if up == 0 {
        format!("./{rest}")
    } else {
        format!("{}{rest}", "../".repeat(up))
    }
}

/// Named imports grouped by module, in first-seen order.
#[derive(Debug, Default)]
pub struct ImportTable {
    modules: Vec<(String, Vec<(String, String)>)>,
}

impl ImportTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that component `id` is exported from `module` as `specifier`.
    pub fn add(&mut self, module: &str, id: &str, specifier: &str) {
        let index = match self.modules.iter().position(|(name, _)| name == module) {
            Some(index) => index,
            None => {
                self.modules.push((module.to_owned(), Vec::new()));
                self.modules.len() - 1
            }
        };
        let specifiers = &mut self.modules[index].1;
        match specifiers.iter_mut().find(|(existing, _)| existing == id) {
            Some(entry) => specifier.clone_into(&mut entry.1),
            None => specifiers.push((id.to_owned(), specifier.to_owned())),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Render one `import { A as B, ... } from "module";` line per module.
    ///
    /// `alias` maps a component id and its specifier to the local name.
    pub fn render(&self, mut alias: impl FnMut(&str, &str) -> String) -> String {
        let mut out = String::new();
        for (module, specifiers) in &self.modules {
            let list = specifiers
                .iter()
                .map(|(id, specifier)| format!("{specifier} as {}", alias(id, specifier)))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(out, "import {{ {list} }} from \"{module}\";");
        }
        out
    }
}
