use crate::app::cleaner::{read_cleaned, ReadError};
use crate::app::models::{FileEntry, ProjectTree};

pub const TREE_HEADER: &str = "=== PROJE DOSYA AĞACI ===";
pub const CONTENT_HEADER: &str = "=== DOSYA İÇERİKLERİ ===";
pub const PATH_LABEL: &str = "DOSYA YOLU: .\\";
const INDENT: &str = "    ";
const SEPARATOR_WIDTH: usize = 50;

pub struct OutputGenerator;

impl OutputGenerator {
    /// Renders the tree section: the root as `./`, then every directory
    /// followed by its included files one level deeper.
    pub fn generate_tree(tree: &ProjectTree) -> String {
        let mut output = format!("{}\n./\n", TREE_HEADER);

        for node in tree.preorder() {
            if node.depth > 0 {
                output.push_str(&format!("{}{}/\n", INDENT.repeat(node.depth), node.name));
            }
            let file_indent = INDENT.repeat(node.depth + 1);
            for file in &node.files {
                output.push_str(&format!("{}{}\n", file_indent, file.name));
            }
        }

        output
    }

    /// Renders one block per included file, reading and cleaning it on the
    /// way. Unreadable files get an error marker instead of content.
    pub fn generate_content(tree: &ProjectTree) -> (String, usize) {
        let mut output = String::new();
        let mut failures = 0;

        for entry in tree.files() {
            let content = match read_cleaned(&entry.path) {
                Ok(content) => {
                    log::info!("Okundu: {}", entry.relative_path);
                    content
                }
                Err(err) => {
                    log::warn!("⚠️ Could not read {} ({}): {}", entry.relative_path, err.kind, err);
                    failures += 1;
                    error_marker(&err)
                }
            };
            output.push_str(&Self::format_block(entry, &content));
        }

        (output, failures)
    }

    pub fn format_block(entry: &FileEntry, content: &str) -> String {
        let separator = "=".repeat(SEPARATOR_WIDTH);
        format!(
            "\n{sep}\n{label}{path}\n{sep}\n{content}\n",
            sep = separator,
            label = PATH_LABEL,
            path = entry.relative_path,
            content = content
        )
    }

    pub fn format_full_output(tree: &str, content: &str) -> String {
        let mut out = String::with_capacity(tree.len() + content.len() + 64);
        out.push_str(tree);
        out.push_str(&format!("\n\n{}\n\n", CONTENT_HEADER));
        out.push_str(content);
        out
    }
}

/// Text placed in the artifact where an unreadable file's content would go.
pub fn error_marker(err: &ReadError) -> String {
    format!("!!! HATA: Dosya okunamadı ({}) !!!", err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::{ExclusionRules, WalkOptions};
    use crate::app::scanner::Scanner;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn write_file(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn render(root: &Path) -> String {
        let scanner = Scanner::new(
            root.to_path_buf(),
            ExclusionRules::concat_defaults(),
            WalkOptions::default(),
        )
        .unwrap();
        let (tree, _) = scanner.scan();
        let (content, _) = OutputGenerator::generate_content(&tree);
        OutputGenerator::format_full_output(&OutputGenerator::generate_tree(&tree), &content)
    }

    #[test]
    fn test_full_output_layout() {
        let dir = tempdir().unwrap();
        write_file(dir.path(), "src/app.ts", "const a = 1;   \nexport default a;\n");
        write_file(dir.path(), "node_modules/x.js", "nope");
        write_file(dir.path(), ".env", "SECRET=1");
        write_file(dir.path(), "README.md", "# Title\n");
        fs::create_dir(dir.path().join("empty")).unwrap();

        let expected = "=== PROJE DOSYA AĞACI ===\n\
./\n\
\x20   README.md\n\
\x20   empty/\n\
\x20   src/\n\
\x20       app.ts\n\
\n\
\n\
=== DOSYA İÇERİKLERİ ===\n\
\n\
\n\
==================================================\n\
DOSYA YOLU: .\\README.md\n\
==================================================\n\
# Title\n\
\n\
==================================================\n\
DOSYA YOLU: .\\src/app.ts\n\
==================================================\n\
const a = 1;\n\
export default a;\n";

        assert_eq!(render(dir.path()), expected);
    }

    #[test]
    fn test_output_is_reproducible() {
        let dir = tempdir().unwrap();
        for name in ["b.ts", "a.ts", "lib/z.py", "lib/a.py", "docs/x.md"] {
            write_file(dir.path(), name, "content  \n");
        }

        let first = render(dir.path());
        let second = render(dir.path());
        assert_eq!(first, second);
        assert_eq!(first.matches("DOSYA YOLU:").count(), 5);
    }

    #[test]
    fn test_nested_tree_indentation() {
        let dir = tempdir().unwrap();
        write_file(dir.path(), "a/b/c.json", "{}");

        let scanner = Scanner::new(
            dir.path().to_path_buf(),
            ExclusionRules::concat_defaults(),
            WalkOptions::default(),
        )
        .unwrap();
        let (tree, _) = scanner.scan();

        assert_eq!(
            OutputGenerator::generate_tree(&tree),
            "=== PROJE DOSYA AĞACI ===\n./\n    a/\n        b/\n            c.json\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_gets_marker_and_run_continues() {
        let dir = tempdir().unwrap();
        write_file(dir.path(), "a.ts", "first");
        std::os::unix::fs::symlink(dir.path().join("missing"), dir.path().join("b.ts")).unwrap();
        write_file(dir.path(), "c.ts", "last");

        let scanner = Scanner::new(
            dir.path().to_path_buf(),
            ExclusionRules::concat_defaults(),
            WalkOptions::default(),
        )
        .unwrap();
        let (tree, _) = scanner.scan();
        let (content, failures) = OutputGenerator::generate_content(&tree);

        assert_eq!(failures, 1);
        assert_eq!(content.matches("DOSYA YOLU:").count(), 3);
        let b_block = content.split("DOSYA YOLU: .\\b.ts").nth(1).unwrap();
        assert!(b_block.contains("!!! HATA: Dosya okunamadı ("));
        assert!(content.ends_with("last\n"));
    }
}
