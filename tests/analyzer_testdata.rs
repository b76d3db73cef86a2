/// Fixture tests: every `.go` file under tests/testdata is checked and the
/// reported diagnostics must match its `// want "regex"` comments exactly,
/// one diagnostic per expectation, on the same line.
use httpreturncheck::domain::analyzer::Analyzer;
use httpreturncheck::domain::diagnostic::Diagnostic;
use httpreturncheck::infrastructure::parser::parse_source;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

struct Expectation {
    line: u32,
    pattern: Regex,
}

fn testdata_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("testdata")
}

fn expectations(source: &str) -> Vec<Expectation> {
    let want = Regex::new(r#"//\s*want\s+"((?:[^"\\]|\\.)*)""#).unwrap();
    source
        .lines()
        .enumerate()
        .flat_map(|(i, line)| {
            want.captures_iter(line)
                .map(|caps| Expectation {
                    line: i as u32 + 1,
                    pattern: Regex::new(&caps[1]).unwrap(),
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

fn check_fixture(path: &Path) -> Vec<Diagnostic> {
    let source = fs::read_to_string(path).unwrap();
    let name = path.display().to_string();
    let file = parse_source(&name, &source)
        .unwrap_or_else(|e| panic!("fixture does not parse: {}", e));
    let mut diagnostics = Vec::new();
    Analyzer::default().check_file(&file, &mut diagnostics);

    let mut unmatched: Vec<Expectation> = expectations(&source);
    let mut unexpected = Vec::new();
    for diagnostic in &diagnostics {
        let found = unmatched.iter().position(|e| {
            e.line == diagnostic.position.line && e.pattern.is_match(&diagnostic.message)
        });
        match found {
            Some(index) => {
                unmatched.remove(index);
            }
            None => unexpected.push(diagnostic.to_string()),
        }
    }

    let missing: Vec<String> = unmatched
        .iter()
        .map(|e| format!("{}:{}: want {:?}", name, e.line, e.pattern.as_str()))
        .collect();
    assert!(
        unexpected.is_empty() && missing.is_empty(),
        "unexpected diagnostics: {:#?}\nmissing diagnostics: {:#?}",
        unexpected,
        missing
    );
    diagnostics
}

#[test]
fn basic_fixture() {
    let diagnostics = check_fixture(&testdata_dir().join("basic.go"));
    assert_eq!(diagnostics.len(), 4);
}

#[test]
fn idioms_fixture() {
    let diagnostics = check_fixture(&testdata_dir().join("idioms.go"));
    assert_eq!(diagnostics.len(), 11);
}

#[test]
fn all_fixtures_match_their_expectations() {
    let mut fixtures: Vec<PathBuf> = fs::read_dir(testdata_dir())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "go"))
        .collect();
    fixtures.sort();
    assert!(!fixtures.is_empty());
    for fixture in fixtures {
        check_fixture(&fixture);
    }
}

#[test]
fn diagnostics_are_positioned_at_the_write() {
    let diagnostics = check_fixture(&testdata_dir().join("basic.go"));
    let first = &diagnostics[0];
    assert_eq!(first.position.line, 21);
    assert_eq!(first.position.column, 2);
    assert!(first.position.filename.ends_with("basic.go"));
}
