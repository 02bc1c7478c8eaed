//! Package version pinning analysis.
//!
//! Servers launched through a package runner fetch their code at start-up.
//! Without an explicit version the runner resolves "latest", so the code
//! that runs can change between launches. Three runner idioms are analyzed:
//!
//! - `npx [-y|--yes] <pkg>[@version]`
//! - `uvx <pkg>[@version]`
//! - `uv run <pkg>[@version]`

use serde::Serialize;

/// Default npx options whose following argument is an option value.
pub const DEFAULT_NPX_VALUE_OPTIONS: &[&str] = &["--registry", "-r", "--package", "-p"];

/// Version information for a runner-launched package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageVersionInfo {
    pub package_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub is_pinned: bool,
    /// Always the complement of `is_pinned`.
    pub is_latest: bool,
}

/// Extracts package specifiers from runner command lines.
#[derive(Debug, Clone)]
pub struct VersionAnalyzer {
    value_options: Vec<String>,
}

impl Default for VersionAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_NPX_VALUE_OPTIONS.iter().map(|s| s.to_string()).collect())
    }
}

impl VersionAnalyzer {
    /// Build with a custom list of value-taking npx options.
    pub fn new(value_options: Vec<String>) -> Self {
        Self { value_options }
    }

    /// Version information for a server, or `None` when the command is not
    /// a recognized runner or no package can be identified.
    pub fn analyze_server_version<S: AsRef<str>>(
        &self,
        command: &str,
        args: &[S],
    ) -> Option<PackageVersionInfo> {
        let spec = self.extract_package_specifier(command, args)?;
        if spec.is_empty() {
            return None;
        }
        Some(parse_package_version(spec))
    }

    /// Raw package specifier for the runner idiom, version included.
    pub fn extract_package_specifier<'a, S: AsRef<str>>(
        &self,
        command: &str,
        args: &'a [S],
    ) -> Option<&'a str> {
        if args.is_empty() {
            return None;
        }
        match command {
            "npx" => self.npx_specifier(args),
            "uvx" => uvx_specifier(args),
            "uv" => uv_run_specifier(args),
            _ => None,
        }
    }

    /// Package name (version stripped) for an npx invocation.
    pub fn npx_package_name<S: AsRef<str>>(&self, args: &[S]) -> Option<String> {
        self.npx_specifier(args)
            .filter(|spec| !spec.is_empty())
            .map(|spec| parse_package_version(spec).package_name)
    }

    /// Specifier after `-y`, else after `--yes`, else the first positional
    /// argument that is not the value of a value-taking option.
    pub fn npx_specifier<'a, S: AsRef<str>>(&self, args: &'a [S]) -> Option<&'a str> {
        for flag in ["-y", "--yes"] {
            if let Some(idx) = args.iter().position(|a| a.as_ref() == flag) {
                if let Some(next) = args.get(idx + 1) {
                    return Some(next.as_ref());
                }
            }
        }

        args.iter().enumerate().find_map(|(i, arg)| {
            let arg = arg.as_ref();
            if arg.starts_with('-') {
                return None;
            }
            let follows_value_option = i > 0
                && self
                    .value_options
                    .iter()
                    .any(|opt| opt == args[i - 1].as_ref());
            if follows_value_option {
                None
            } else {
                Some(arg)
            }
        })
    }
}

/// `uvx` takes the package as its first argument.
pub fn uvx_specifier<S: AsRef<str>>(args: &[S]) -> Option<&str> {
    args.first().map(|a| a.as_ref())
}

/// The argument following the first literal `run`.
pub fn uv_run_specifier<S: AsRef<str>>(args: &[S]) -> Option<&str> {
    let idx = args.iter().position(|a| a.as_ref() == "run")?;
    args.get(idx + 1).map(|a| a.as_ref())
}

/// Split a specifier on its last `@` (ignoring a leading scope `@`).
pub fn parse_package_version(spec: &str) -> PackageVersionInfo {
    let (package_name, version) = match spec.rfind('@') {
        Some(idx) if idx > 0 => (&spec[..idx], Some(&spec[idx + 1..])),
        _ => (spec, None),
    };
    let version = version.filter(|v| !v.is_empty()).map(str::to_string);
    let is_pinned = is_pinned_version(version.as_deref());

    PackageVersionInfo {
        package_name: package_name.to_string(),
        version,
        is_pinned,
        is_latest: !is_pinned,
    }
}

/// Pinned unless absent, empty, or the literal `latest`.
pub fn is_pinned_version(version: Option<&str>) -> bool {
    !matches!(version, None | Some("") | Some("latest"))
}
