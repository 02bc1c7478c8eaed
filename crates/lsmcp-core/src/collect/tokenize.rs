//! Command-line tokenization.
//!
//! Process listings report a command line as one string. It is split the
//! way a shell would for the common cases: quotes group words, the quote
//! characters themselves are dropped, and a quote only closes on the same
//! character that opened it (`"it's"` stays one token).

/// Split a command line into tokens.
pub fn parse_command_line(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(open) if c == open => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c.is_whitespace() => flush(&mut tokens, &mut current),
            None => current.push(c),
        }
    }
    flush(&mut tokens, &mut current);

    tokens
}

fn flush(tokens: &mut Vec<String>, current: &mut String) {
    let token = current.trim();
    if !token.is_empty() {
        tokens.push(token.to_string());
    }
    current.clear();
}

/// Windows launcher extensions, matched without regard to case.
const EXECUTABLE_SUFFIXES: [&str; 3] = [".exe", ".cmd", ".bat"];

/// Executable base name: the last `/` or `\` segment, without a Windows
/// launcher extension (`.exe`, `.cmd`, `.bat`).
pub fn base_command_name(command: &str) -> &str {
    let base = command
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(command);
    EXECUTABLE_SUFFIXES
        .iter()
        .find_map(|suffix| strip_suffix_ignore_case(base, suffix))
        .unwrap_or(base)
}

fn strip_suffix_ignore_case<'a>(text: &'a str, suffix: &str) -> Option<&'a str> {
    let cut = text.len().checked_sub(suffix.len())?;
    (text.is_char_boundary(cut) && text[cut..].eq_ignore_ascii_case(suffix)).then(|| &text[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_simple_split() {
        assert_eq!(parse_command_line("npx -y pkg"), vec!["npx", "-y", "pkg"]);
    }

    #[test]
    fn test_double_quotes_group() {
        assert_eq!(parse_command_line("a \"b c\" d"), vec!["a", "b c", "d"]);
    }

    #[test]
    fn test_single_quotes_group() {
        assert_eq!(
            parse_command_line("python -c 'print(1)' --flag"),
            vec!["python", "-c", "print(1)", "--flag"]
        );
    }

    #[test]
    fn test_mismatched_quote_is_literal() {
        assert_eq!(parse_command_line("echo \"it's here\""), vec!["echo", "it's here"]);
    }

    #[test]
    fn test_quotes_inside_word_are_dropped() {
        assert_eq!(parse_command_line("--path=\"/a b\"/c"), vec!["--path=/a b/c"]);
    }

    #[test]
    fn test_runs_of_whitespace_and_empty_quotes() {
        assert_eq!(parse_command_line("  a \t  b  \"\"  "), vec!["a", "b"]);
        assert!(parse_command_line("").is_empty());
    }

    #[test]
    fn test_unterminated_quote_runs_to_end() {
        assert_eq!(parse_command_line("a \"b c"), vec!["a", "b c"]);
    }

    #[test]
    fn test_base_command_name() {
        assert_eq!(base_command_name("/usr/local/bin/node"), "node");
        assert_eq!(base_command_name("C:\\Program Files\\nodejs\\node.exe"), "node");
        assert_eq!(base_command_name("Python.EXE"), "Python");
        assert_eq!(base_command_name("uv"), "uv");
        assert_eq!(base_command_name(".exe"), "");
        assert_eq!(base_command_name(""), "");
    }

    #[test]
    fn test_base_command_name_windows_launchers() {
        assert_eq!(base_command_name("C:\\Program Files\\nodejs\\npx.cmd"), "npx");
        assert_eq!(base_command_name("NPX.CMD"), "NPX");
        assert_eq!(base_command_name("run-server.bat"), "run-server");
        assert_eq!(base_command_name("Docker.Exe"), "Docker");
        assert_eq!(base_command_name("server.cmdline"), "server.cmdline");
        assert_eq!(base_command_name("été.bat"), "été");
    }

    proptest! {
        #[test]
        fn unquoted_words_roundtrip(words in proptest::collection::vec("[A-Za-z0-9@/._=-]{1,12}", 0..8)) {
            let line = words.join(" ");
            prop_assert_eq!(parse_command_line(&line), words);
        }

        #[test]
        fn tokens_are_never_empty(line in "\\PC{0,60}") {
            for token in parse_command_line(&line) {
                prop_assert!(!token.is_empty());
            }
        }
    }
}
