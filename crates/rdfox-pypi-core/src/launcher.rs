//! Launcher stub generation.
//!
//! The wheel's console script points at a small Python module that finds
//! the bundled executable next to itself and hands over to it. How it hands
//! over depends on the host it ends up installed on, which is only known
//! when the stub runs, so the stub carries every [`ProcessLaunch`] strategy
//! and picks one at launch time.

use std::fmt::Write as _;

/// How the stub transfers control to the bundled executable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessLaunch {
    /// Replace the Python process with the executable (`execv`). POSIX only.
    Replace,
    /// Run the executable as a child and exit with its status.
    SpawnAndForward,
}

impl ProcessLaunch {
    /// Strategies in the order the stub tests them; the last one is the fallback.
    pub const ORDER: [Self; 2] = [Self::Replace, Self::SpawnAndForward];

    /// Python condition under which this strategy is chosen, `None` for the fallback.
    pub fn condition(self) -> Option<&'static str> {
        match self {
            Self::Replace => Some("os.name == 'posix'"),
            Self::SpawnAndForward => None,
        }
    }

    /// Python statement that launches `argv`.
    pub fn statement(self) -> &'static str {
        match self {
            Self::Replace => "os.execv(argv[0], argv)",
            Self::SpawnAndForward => "import subprocess; sys.exit(subprocess.call(argv))",
        }
    }
}

/// Render the launcher module for an executable at `executable`, relative
/// to the package directory.
///
/// The output is pure ASCII and depends only on `executable`.
pub fn render(executable: &str) -> String {
    let mut out = String::from("import os, sys\ndef main():\n");
    let _ = writeln!(
        out,
        "    argv = [os.path.join(os.path.dirname(__file__), {}), *sys.argv[1:]]",
        python_string(executable)
    );

    for (i, launch) in ProcessLaunch::ORDER.iter().enumerate() {
        let keyword = match (i, launch.condition()) {
            (0, Some(cond)) => format!("if {cond}:"),
            (_, Some(cond)) => format!("elif {cond}:"),
            (_, None) => "else:".to_string(),
        };
        let _ = writeln!(out, "    {keyword}");
        let _ = writeln!(out, "        {}", launch.statement());
    }

    out.push_str("if __name__ == \"__main__\":\n    main()\n");
    out
}

/// Quote `s` as a double-quoted Python string literal using only ASCII.
fn python_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            c if u32::from(c) <= 0xFFFF => {
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            }
            c => {
                let _ = write!(out, "\\U{:08x}", u32::from(c));
            }
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_matches_template() {
        let expected = "\
import os, sys
def main():
    argv = [os.path.join(os.path.dirname(__file__), \"RDFox\"), *sys.argv[1:]]
    if os.name == 'posix':
        os.execv(argv[0], argv)
    else:
        import subprocess; sys.exit(subprocess.call(argv))
if __name__ == \"__main__\":
    main()
";
        assert_eq!(render("RDFox"), expected);
    }

    #[test]
    fn test_render_nested_executable() {
        let stub = render("bin/RDFox.exe");
        assert!(stub.contains("os.path.dirname(__file__), \"bin/RDFox.exe\")"));
    }

    #[test]
    fn test_python_string_escapes() {
        assert_eq!(python_string(r#"a"b\c"#), r#""a\"b\\c""#);
        assert_eq!(python_string("caf\u{e9}"), r#""caf\u00e9""#);
        assert_eq!(python_string("\u{1F600}"), r#""\U0001f600""#);
        assert!(render("Ω/RDFox").is_ascii());
    }

    #[test]
    fn test_fallback_is_last() {
        assert_eq!(ProcessLaunch::ORDER.last().unwrap().condition(), None);
    }
}
