//! Resolution of a directive's path into the files it refers to.

use super::diagnostic::Diagnostic;
use super::spec::{dir_part, file_name_part, IncludeDirective};
use globset::{GlobBuilder, GlobMatcher};
use std::path::{Component, Path, PathBuf};

/// One file matched by a directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Normalized absolute (or base-relative, if the base was relative) path.
    pub absolute_path: PathBuf,
    /// The path as written in the directive.
    pub source_directive_path: String,
}

impl ResolvedTarget {
    /// File name used in diagnostics.
    pub fn display_name(&self) -> String {
        self.absolute_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source_directive_path.clone())
    }
}

/// Resolves `directive` against `base_dir`.
///
/// A literal path always yields exactly one target, whether or not the file
/// exists; existence is checked when the target is read. A glob lists the
/// regular files of a single directory level whose names match the pattern,
/// sorted by their upper-cased names, then ordinally.
pub fn resolve_targets(
    base_dir: &Path,
    directive: &IncludeDirective,
) -> Result<Vec<ResolvedTarget>, Diagnostic> {
    if !directive.is_glob {
        return Ok(vec![ResolvedTarget {
            absolute_path: normalize(&base_dir.join(&directive.path)),
            source_directive_path: directive.path.clone(),
        }]);
    }

    let spec_dir = dir_part(&directive.path);
    let pattern = file_name_part(&directive.path);
    let search_dir = normalize(&base_dir.join(spec_dir));

    if !search_dir.is_dir() {
        return Err(Diagnostic::GlobDirNotFound {
            dir: spec_dir.to_string(),
        });
    }

    let Some(matcher) = file_name_matcher(pattern) else {
        tracing::warn!(pattern, "Invalid include glob, treating as no match");
        return Ok(Vec::new());
    };

    let entries = match std::fs::read_dir(&search_dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(?err, dir = %search_dir.display(), "Failed to list include glob dir");
            return Err(Diagnostic::GlobDirNotFound {
                dir: spec_dir.to_string(),
            });
        }
    };

    let mut files = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_file())
        .filter(|entry| matcher.is_match(Path::new(&entry.file_name())))
        .map(|entry| entry.path())
        .collect::<Vec<_>>();

    files.sort_by_cached_key(|path| {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        (name.to_uppercase(), name)
    });

    Ok(files
        .into_iter()
        .map(|absolute_path| ResolvedTarget {
            absolute_path,
            source_directive_path: directive.path.clone(),
        })
        .collect())
}

/// Builds a case-insensitive matcher for a single file-name pattern.
fn file_name_matcher(pattern: &str) -> Option<GlobMatcher> {
    GlobBuilder::new(&wildcard_glob(pattern))
        .case_insensitive(true)
        .literal_separator(true)
        .backslash_escape(false)
        .build()
        .ok()
        .map(|glob| glob.compile_matcher())
}

/// Rewrites `pattern` into glob syntax where only `*` and `?` are wildcards.
///
/// Class and alternation brackets are wrapped in single-character classes so
/// they match themselves. Runs of `*` collapse into one.
fn wildcard_glob(pattern: &str) -> String {
    let mut glob = String::with_capacity(pattern.len());
    let mut prev_star = false;
    for c in pattern.chars() {
        match c {
            '*' if prev_star => continue,
            '[' | ']' | '{' | '}' => {
                glob.push('[');
                glob.push(c);
                glob.push(']');
            }
            _ => glob.push(c),
        }
        prev_star = c == '*';
    }
    glob
}

/// Lexically resolves `.` and `..` components without touching the file system.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize(Path::new("/docs/a/../b/./c.md")),
            PathBuf::from("/docs/b/c.md")
        );
        assert_eq!(normalize(Path::new("../x.md")), PathBuf::from("../x.md"));
    }

    #[test]
    fn test_literal_target_is_not_checked_for_existence() {
        let directive = IncludeDirective::parse("sub/../missing.md#id", "");
        let targets = resolve_targets(Path::new("/nowhere"), &directive).unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].absolute_path, PathBuf::from("/nowhere/missing.md"));
        assert_eq!(targets[0].source_directive_path, "sub/../missing.md");
        assert_eq!(targets[0].display_name(), "missing.md");
    }

    #[test]
    fn test_wildcard_glob() {
        assert_eq!(wildcard_glob("*.md"), "*.md");
        assert_eq!(wildcard_glob("a**b?.md"), "a*b?.md");
        assert_eq!(wildcard_glob("notes[draft]*.md"), "notes[[]draft[]]*.md");
        assert_eq!(wildcard_glob("{a,b}*.md"), "[{]a,b[}]*.md");
    }

    #[test]
    fn test_glob_treats_brackets_literally() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["notes[draft]1.md", "notes[a.md", "notesd1.md", "a.md", "b.md"] {
            std::fs::write(tmp.path().join(name), name).unwrap();
        }

        let names = |spec: &str| -> Vec<String> {
            resolve_targets(tmp.path(), &IncludeDirective::parse(spec, ""))
                .unwrap()
                .iter()
                .map(ResolvedTarget::display_name)
                .collect()
        };

        assert_eq!(names("notes[draft]*.md"), vec!["notes[draft]1.md"]);
        assert_eq!(names("notes[*.md"), vec!["notes[a.md"]);
        assert_eq!(names("{a,b}*.md"), Vec::<String>::new());
    }

    #[test]
    fn test_missing_glob_dir() {
        let directive = IncludeDirective::parse("parts/*.md", "");
        let err = resolve_targets(Path::new("/definitely/not/here"), &directive).unwrap_err();
        assert_eq!(
            err,
            Diagnostic::GlobDirNotFound {
                dir: "parts".into()
            }
        );
    }

    #[test]
    fn test_glob_matching_is_case_insensitive_and_single_level() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("b.MD"), "b").unwrap();
        std::fs::write(tmp.path().join("a.md"), "a").unwrap();
        std::fs::write(tmp.path().join("C.md"), "c").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "x").unwrap();
        std::fs::create_dir(tmp.path().join("nested.md")).unwrap();
        std::fs::write(tmp.path().join("nested.md").join("deep.md"), "d").unwrap();

        let directive = IncludeDirective::parse("*.md", "");
        let names: Vec<_> = resolve_targets(tmp.path(), &directive)
            .unwrap()
            .iter()
            .map(ResolvedTarget::display_name)
            .collect();
        assert_eq!(names, vec!["a.md", "b.MD", "C.md"]);
    }

    #[test]
    fn test_question_mark_glob() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("ch")).unwrap();
        for name in ["p1.md", "p2.md", "p10.md"] {
            std::fs::write(tmp.path().join("ch").join(name), name).unwrap();
        }

        let directive = IncludeDirective::parse("ch/p?.md", "");
        let names: Vec<_> = resolve_targets(tmp.path(), &directive)
            .unwrap()
            .iter()
            .map(ResolvedTarget::display_name)
            .collect();
        assert_eq!(names, vec!["p1.md", "p2.md"]);
    }

    #[test]
    fn test_glob_sorts_by_upper_case_name() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["part_1.md", "partA.md", "partb.md"] {
            std::fs::write(tmp.path().join(name), name).unwrap();
        }

        let directive = IncludeDirective::parse("part*.md", "");
        let names: Vec<_> = resolve_targets(tmp.path(), &directive)
            .unwrap()
            .iter()
            .map(ResolvedTarget::display_name)
            .collect();
        assert_eq!(names, vec!["partA.md", "partb.md", "part_1.md"]);
    }
}
