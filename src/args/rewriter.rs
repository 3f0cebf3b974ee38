//! Single-pass argv rewriter
//!
//! Walks the arguments once. The first values-file flag is kept and pointed
//! at the synthesized file; every later one is dropped along with its value.
//! All other tokens are copied in their original order, byte for byte.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use super::matcher::{match_flag, FlagMatch};

/// A values file referenced on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueFileRef {
    pub path: PathBuf,
    /// Index of the flag token in the original argument list.
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    /// Referenced files in command-line order; later ones override earlier ones.
    pub sources: Vec<ValueFileRef>,
    pub args: Vec<OsString>,
    /// Position of a trailing `-f`/`--values` that had no value.
    pub dangling_flag: Option<usize>,
}

impl Rewrite {
    pub fn source_paths(&self) -> impl Iterator<Item = &Path> {
        self.sources.iter().map(|source| source.path.as_path())
    }
}

/// Read position over the argument list. Every token is consumed by
/// exactly one `advance`, so a flag's value is never looked at as a flag.
struct Cursor<'a> {
    tokens: &'a [OsString],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [OsString]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn current(&self) -> Option<&'a OsStr> {
        self.tokens.get(self.pos).map(OsString::as_os_str)
    }

    fn peek(&self, offset: usize) -> Option<&'a OsStr> {
        self.tokens.get(self.pos + offset).map(OsString::as_os_str)
    }

    fn advance(&mut self, step: usize) {
        self.pos += step;
    }
}

/// Classify a raw token. Flags are plain ASCII, so a token that is not
/// UTF-8 is never one.
fn classify(token: &OsStr) -> FlagMatch<'_> {
    token.to_str().map_or(FlagMatch::NoMatch, match_flag)
}

/// Rewrite `args` so at most one values-file flag remains, pointing at
/// `synthetic_path`.
///
/// With no values-file flags the returned args equal the input.
pub fn rewrite(args: &[OsString], synthetic_path: &Path) -> Rewrite {
    let mut cursor = Cursor::new(args);
    let mut sources = Vec::new();
    let mut out = Vec::with_capacity(args.len());
    let mut dangling_flag = None;

    while let Some(token) = cursor.current() {
        let position = cursor.pos;
        let first = sources.is_empty();

        match classify(token) {
            FlagMatch::NoMatch => {
                out.push(token.to_os_string());
                cursor.advance(1);
            }
            FlagMatch::Inline { flag, value } => {
                sources.push(ValueFileRef { path: PathBuf::from(value), position });
                if first {
                    let mut inline = OsString::from(format!("{flag}="));
                    inline.push(synthetic_path);
                    out.push(inline);
                }
                cursor.advance(1);
            }
            FlagMatch::NeedsValue { flag } => {
                let Some(value) = cursor.peek(1) else {
                    tracing::warn!(
                        "ignoring trailing '{}' without a values file (argument {})",
                        flag,
                        position
                    );
                    dangling_flag = Some(position);
                    break;
                };
                sources.push(ValueFileRef { path: PathBuf::from(value), position });
                if first {
                    out.push(OsString::from(flag));
                    out.push(synthetic_path.as_os_str().to_os_string());
                }
                cursor.advance(2);
            }
        }
    }

    Rewrite { sources, args: out, dangling_flag }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYNTH: &str = "/tmp/helm.x1/values.yaml";

    fn argv(tokens: &[&str]) -> Vec<OsString> {
        tokens.iter().map(OsString::from).collect()
    }

    fn run(args: &[OsString]) -> Rewrite {
        rewrite(args, Path::new(SYNTH))
    }

    fn paths(rewrite: &Rewrite) -> Vec<&str> {
        rewrite.source_paths().map(|p| p.to_str().expect("utf8 path")).collect()
    }

    #[test]
    fn test_no_values_flags_leaves_args_untouched() {
        let args = argv(&["upgrade", "--install", "rel", "./chart", "--set", "a=b", "--", "-x"]);
        let rewrite = run(&args);
        assert_eq!(rewrite.args, args);
        assert!(rewrite.sources.is_empty());
        assert!(rewrite.dangling_flag.is_none());
    }

    #[test]
    fn test_empty_args() {
        let rewrite = run(&[]);
        assert!(rewrite.args.is_empty());
        assert!(rewrite.sources.is_empty());
    }

    #[test]
    fn test_mixed_forms_keep_first_flag_only() {
        let args =
            argv(&["template", "-f", "base.yaml", "--values=override.yaml", "--set", "x=1"]);
        let rewrite = run(&args);

        assert_eq!(rewrite.args, argv(&["template", "-f", SYNTH, "--set", "x=1"]));
        assert_eq!(
            rewrite.sources,
            vec![
                ValueFileRef { path: "base.yaml".into(), position: 1 },
                ValueFileRef { path: "override.yaml".into(), position: 3 },
            ]
        );
    }

    #[test]
    fn test_first_inline_flag_keeps_inline_form() {
        let args = argv(&["--values=a.yaml", "install", "-f", "b.yaml", "chart"]);
        let rewrite = run(&args);

        assert_eq!(rewrite.args, argv(&[format!("--values={SYNTH}").as_str(), "install", "chart"]));
        assert_eq!(paths(&rewrite), vec!["a.yaml", "b.yaml"]);
    }

    #[test]
    fn test_flag_value_is_never_rescanned_as_flag() {
        // The value of the first -f is literally "-f"; it must not be treated
        // as a second flag.
        let args = argv(&["-f", "-f", "--values", "--values=x", "chart"]);
        let rewrite = run(&args);

        assert_eq!(paths(&rewrite), vec!["-f", "--values=x"]);
        assert_eq!(rewrite.args, argv(&["-f", SYNTH, "chart"]));
    }

    #[test]
    fn test_later_references_are_elided_with_their_values() {
        let args =
            argv(&["a", "-f", "1.yaml", "b", "-f", "2.yaml", "c", "--values", "3.yaml", "d"]);
        let rewrite = run(&args);

        assert_eq!(rewrite.args, argv(&["a", "-f", SYNTH, "b", "c", "d"]));
        assert_eq!(paths(&rewrite), vec!["1.yaml", "2.yaml", "3.yaml"]);
        let positions: Vec<_> = rewrite.sources.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![1, 4, 7]);
    }

    #[test]
    fn test_repeated_same_file_is_kept_in_sources() {
        let args = argv(&["-f", "a.yaml", "-f", "a.yaml"]);
        let rewrite = run(&args);
        assert_eq!(paths(&rewrite), vec!["a.yaml", "a.yaml"]);
        assert_eq!(rewrite.args, argv(&["-f", SYNTH]));
    }

    #[test]
    fn test_dangling_flag_stops_scan() {
        let args = argv(&["template", "chart", "--values"]);
        let rewrite = run(&args);

        assert_eq!(rewrite.args, argv(&["template", "chart"]));
        assert!(rewrite.sources.is_empty());
        assert_eq!(rewrite.dangling_flag, Some(2));
    }

    #[test]
    fn test_dangling_flag_after_real_reference() {
        let args = argv(&["-f", "a.yaml", "chart", "-f"]);
        let rewrite = run(&args);

        assert_eq!(rewrite.args, argv(&["-f", SYNTH, "chart"]));
        assert_eq!(paths(&rewrite), vec!["a.yaml"]);
        assert_eq!(rewrite.dangling_flag, Some(3));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_tokens_pass_through() {
        use std::os::unix::ffi::OsStringExt;

        let chart = OsString::from_vec(b"./ch\xffrt".to_vec());
        let values = OsString::from_vec(b"v\xfe.yaml".to_vec());
        let args = vec![
            OsString::from("template"),
            chart.clone(),
            OsString::from("-f"),
            values.clone(),
            OsString::from("--set"),
            OsString::from_vec(b"name=\xff".to_vec()),
        ];
        let rewrite = run(&args);

        let mut expected = vec![OsString::from("template"), chart];
        expected.extend(argv(&["-f", SYNTH, "--set"]));
        expected.push(OsString::from_vec(b"name=\xff".to_vec()));
        assert_eq!(rewrite.args, expected);
        assert_eq!(rewrite.source_paths().collect::<Vec<_>>(), vec![Path::new(&values)]);
    }

    #[test]
    fn test_exactly_one_flag_remains_for_any_count() {
        for n in 1..6 {
            let mut args = vec![OsString::from("install")];
            for i in 0..n {
                if i % 2 == 0 {
                    args.push("-f".into());
                    args.push(format!("{i}.yaml").into());
                } else {
                    args.push(format!("--values={i}.yaml").into());
                }
                args.push(format!("pos{i}").into());
            }
            let rewrite = run(&args);

            let flags = rewrite
                .args
                .iter()
                .filter(|t| !matches!(classify(t), FlagMatch::NoMatch))
                .count();
            assert_eq!(flags, 1, "n = {n}");
            assert_eq!(rewrite.sources.len(), n);

            let others: Vec<_> = rewrite
                .args
                .iter()
                .filter_map(|t| t.to_str())
                .filter(|t| t.starts_with("pos"))
                .collect();
            let expected: Vec<_> = (0..n).map(|i| format!("pos{i}")).collect();
            assert_eq!(others, expected.iter().map(String::as_str).collect::<Vec<_>>());
        }
    }
}
