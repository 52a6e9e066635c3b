use super::*;
use crate::kernel::services::ports::formatting::{EndOfLine, IndentSize, IndentStyle, Rule};
use std::fs;
use tempfile::tempdir;

fn glob_matches(pattern: &str, path: &str) -> bool {
    Glob::new(pattern, "/ws").unwrap().is_match(path)
}

#[test]
fn test_star_matches_basename_anywhere() {
    assert!(glob_matches("*.rs", "/ws/main.rs"));
    assert!(glob_matches("*.rs", "/ws/src/kernel/mod.rs"));
    assert!(!glob_matches("*.rs", "/ws/main.rs.bak"));
    assert!(!glob_matches("*.rs", "/other/main.rs"));
}

#[test]
fn test_slash_anchors_to_config_dir() {
    assert!(glob_matches("src/*.rs", "/ws/src/lib.rs"));
    assert!(!glob_matches("src/*.rs", "/ws/src/nested/lib.rs"));
    assert!(glob_matches("/src/**.rs", "/ws/src/nested/lib.rs"));
    assert!(glob_matches("lib/**/*.js", "/ws/lib/a/b/c.js"));
}

#[test]
fn test_question_mark_and_classes() {
    assert!(glob_matches("file?.txt", "/ws/file1.txt"));
    assert!(!glob_matches("file?.txt", "/ws/file12.txt"));
    assert!(glob_matches("[abc].md", "/ws/b.md"));
    assert!(!glob_matches("[abc].md", "/ws/d.md"));
    assert!(glob_matches("[!abc].md", "/ws/d.md"));
    assert!(!glob_matches("[!abc].md", "/ws/a.md"));
}

#[test]
fn test_braces() {
    assert!(glob_matches("*.{js,ts}", "/ws/app.ts"));
    assert!(glob_matches("*.{js,ts}", "/ws/app.js"));
    assert!(!glob_matches("*.{js,ts}", "/ws/app.rs"));
    assert!(glob_matches("{package.json,.travis.yml}", "/ws/package.json"));
    assert!(glob_matches("{single}", "/ws/{single}"));
}

#[test]
fn test_numeric_range() {
    assert!(glob_matches("file{1..3}.txt", "/ws/file2.txt"));
    assert!(!glob_matches("file{1..3}.txt", "/ws/file4.txt"));
    assert!(glob_matches("v{-5..5}", "/ws/v-3"));
}

#[test]
fn test_parse_sections_in_order() {
    let text = "\
root = true

# comment
[*]
indent_style = space
indent_size = 4

[*.go]
indent_style = tab
";
    let file = EditorConfigFile::parse(text, Path::new("/ws"));
    assert!(file.is_root());

    let mut rules = RuleSet::default();
    file.apply("/ws/main.go", &mut rules);
    assert_eq!(rules.indent_style, Rule::Value(IndentStyle::Tab));
    assert_eq!(rules.indent_size, Rule::Value(IndentSize::Columns(4)));

    let mut rules = RuleSet::default();
    file.apply("/ws/main.rs", &mut rules);
    assert_eq!(rules.indent_style, Rule::Value(IndentStyle::Space));
}

#[test]
fn test_keys_and_values_case_insensitive() {
    let file = EditorConfigFile::parse("[*]\nEnd_Of_Line = CRLF\nfoo = bar\n", Path::new("/ws"));
    let mut rules = RuleSet::default();
    file.apply("/ws/a.txt", &mut rules);
    assert_eq!(rules.end_of_line, Rule::Value(EndOfLine::Crlf));
}

#[test]
fn test_resolve_merges_nearer_files_last() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let nested = root.join("pkg");
    fs::create_dir_all(&nested).unwrap();

    fs::write(
        root.join(CONFIG_FILE_NAME),
        "root = true\n[*]\nindent_style = space\ntrim_trailing_whitespace = true\ninsert_final_newline = true\n",
    )
    .unwrap();
    fs::write(
        nested.join(CONFIG_FILE_NAME),
        "[*.rs]\nindent_style = tab\ninsert_final_newline = unset\n",
    )
    .unwrap();

    let rules = resolve_rules(&nested.join("lib.rs")).unwrap();
    assert_eq!(rules.indent_style, Rule::Value(IndentStyle::Tab));
    assert_eq!(rules.trim_trailing_whitespace, Rule::Value(true));
    assert_eq!(rules.insert_final_newline, Rule::Unset);

    let rules = resolve_rules(&nested.join("notes.md")).unwrap();
    assert_eq!(rules.indent_style, Rule::Value(IndentStyle::Space));
    assert_eq!(rules.insert_final_newline, Rule::Value(true));
}

#[test]
fn test_root_stops_lookup() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let nested = root.join("pkg");
    fs::create_dir_all(&nested).unwrap();

    fs::write(root.join(CONFIG_FILE_NAME), "[*]\nend_of_line = crlf\n").unwrap();
    fs::write(nested.join(CONFIG_FILE_NAME), "root = true\n[*]\ntab_width = 8\n").unwrap();

    let rules = resolve_rules(&nested.join("a.txt")).unwrap();
    assert_eq!(rules.tab_width, Rule::Value(8));
    assert_eq!(rules.end_of_line, Rule::Absent);
}

#[test]
fn test_resolver_runs_on_runtime() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "root = true\n[*.txt]\nindent_size = 2\n",
    )
    .unwrap();

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let rules = rt
        .block_on(EditorConfigResolver.resolve(dir.path().join("a.txt")))
        .unwrap();
    assert_eq!(rules.indent_size, Rule::Value(IndentSize::Columns(2)));
    assert_eq!(rules.effective_tab_width(), Some(2));
}
