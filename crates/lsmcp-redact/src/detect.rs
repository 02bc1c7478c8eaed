//! Credential analysis over env, args and headers.

use crate::mask::mask_value;
use crate::patterns::{is_substitution, PatternSet};
use serde::{Deserialize, Serialize};

/// Risk of a single finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    High,
}

/// Aggregate risk across findings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OverallRisk {
    #[default]
    None,
    Low,
    High,
}

impl From<RiskLevel> for OverallRisk {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Low => OverallRisk::Low,
            RiskLevel::High => OverallRisk::High,
        }
    }
}

impl std::fmt::Display for OverallRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverallRisk::None => write!(f, "none"),
            OverallRisk::Low => write!(f, "low"),
            OverallRisk::High => write!(f, "high"),
        }
    }
}

/// Where a finding was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingSource {
    Env,
    Args,
    Headers,
}

/// A credential-bearing entry. Only the masked value is retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialFinding {
    pub name: String,
    pub masked_value: String,
    pub risk_level: RiskLevel,
    pub source: FindingSource,
}

/// Result of analyzing one or more sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialAnalysis {
    pub has_credentials: bool,
    pub findings: Vec<CredentialFinding>,
    pub overall_risk_level: OverallRisk,
}

impl CredentialAnalysis {
    pub fn from_findings(findings: Vec<CredentialFinding>) -> Self {
        let overall_risk_level = findings
            .iter()
            .map(|f| OverallRisk::from(f.risk_level))
            .max()
            .unwrap_or_default();
        CredentialAnalysis {
            has_credentials: !findings.is_empty(),
            findings,
            overall_risk_level,
        }
    }

    /// Combine several analyses, keeping finding order.
    pub fn merge(parts: impl IntoIterator<Item = CredentialAnalysis>) -> Self {
        let findings = parts.into_iter().flat_map(|p| p.findings).collect();
        Self::from_findings(findings)
    }

    pub fn is_high_risk(&self) -> bool {
        self.overall_risk_level == OverallRisk::High
    }
}

/// A credential value located in an argument list.
struct ArgValue<'a> {
    flag: &'a str,
    value: &'a str,
    /// Index of the token holding the value.
    index: usize,
    /// Whether the value shares its token with the flag (`--flag=value`).
    inline: bool,
    risk_level: RiskLevel,
}

/// Flags credential-bearing names in server declarations.
#[derive(Debug, Clone, Default)]
pub struct CredentialAnalyzer {
    patterns: PatternSet,
}

impl CredentialAnalyzer {
    pub fn new(patterns: PatternSet) -> Self {
        Self { patterns }
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    pub fn is_potential_credential(&self, name: &str) -> bool {
        self.patterns.is_potential_credential(name)
    }

    /// Analyze environment variables.
    pub fn analyze_env<I, K, V>(&self, env: I) -> CredentialAnalysis
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.analyze_pairs(env, FindingSource::Env)
    }

    /// Analyze HTTP headers.
    pub fn analyze_headers<I, K, V>(&self, headers: I) -> CredentialAnalysis
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.analyze_pairs(headers, FindingSource::Headers)
    }

    /// Analyze command-line arguments.
    ///
    /// Recognizes `--flag value` pairs and `--flag=value` tokens. A flag
    /// followed by another flag, or by nothing, carries no value.
    pub fn analyze_args<S: AsRef<str>>(&self, args: &[S]) -> CredentialAnalysis {
        let findings = self
            .arg_values(args)
            .into_iter()
            .map(|found| CredentialFinding {
                name: found.flag.to_string(),
                masked_value: mask_value(found.value),
                risk_level: found.risk_level,
                source: FindingSource::Args,
            })
            .collect();
        CredentialAnalysis::from_findings(findings)
    }

    /// Copy of `args` with every credential value masked.
    ///
    /// Uses the same pairing rules as [`analyze_args`](Self::analyze_args).
    /// An inline `--flag=value` keeps its flag, so `--token=abcdef` becomes
    /// `--token=a****f`.
    pub fn redact_args<S: AsRef<str>>(&self, args: &[S]) -> Vec<String> {
        let mut out: Vec<String> = args.iter().map(|a| a.as_ref().to_string()).collect();
        for found in self.arg_values(args) {
            out[found.index] = if found.inline {
                format!("{}={}", found.flag, mask_value(found.value))
            } else {
                mask_value(found.value)
            };
        }
        out
    }

    /// Mask credential values in a whitespace-separated command line.
    ///
    /// A line without credentials is returned untouched. Otherwise the tokens
    /// are rejoined with single spaces.
    pub fn redact_command_line(&self, line: &str) -> String {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let redacted = self.redact_args(&tokens);
        if redacted.iter().zip(&tokens).all(|(r, t)| r == t) {
            line.to_string()
        } else {
            redacted.join(" ")
        }
    }

    fn arg_values<'a, S: AsRef<str>>(&self, args: &'a [S]) -> Vec<ArgValue<'a>> {
        let mut found = Vec::new();

        for (i, token) in args.iter().enumerate() {
            let token = token.as_ref();
            if !token.starts_with('-') {
                continue;
            }

            let (flag, value, index, inline) = match token.split_once('=') {
                Some((flag, value)) => (flag, Some(value), i, true),
                None => (
                    token,
                    args.get(i + 1)
                        .map(|next| next.as_ref())
                        .filter(|next| !next.starts_with('-')),
                    i + 1,
                    false,
                ),
            };

            let Some(value) = value.filter(|v| !v.is_empty()) else {
                continue;
            };
            let Some(risk_level) = self.patterns.classify(flag.trim_start_matches('-')) else {
                continue;
            };
            if is_substitution(value) {
                continue;
            }

            found.push(ArgValue {
                flag,
                value,
                index,
                inline,
                risk_level,
            });
        }

        found
    }

    /// Analyze all three sources of one server.
    pub fn analyze_server<E, EK, EV, H, HK, HV, S>(
        &self,
        env: E,
        args: &[S],
        headers: H,
    ) -> CredentialAnalysis
    where
        E: IntoIterator<Item = (EK, EV)>,
        EK: AsRef<str>,
        EV: AsRef<str>,
        H: IntoIterator<Item = (HK, HV)>,
        HK: AsRef<str>,
        HV: AsRef<str>,
        S: AsRef<str>,
    {
        CredentialAnalysis::merge([
            self.analyze_env(env),
            self.analyze_args(args),
            self.analyze_headers(headers),
        ])
    }

    fn analyze_pairs<I, K, V>(&self, pairs: I, source: FindingSource) -> CredentialAnalysis
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let findings = pairs
            .into_iter()
            .filter_map(|(name, value)| {
                let (name, value) = (name.as_ref(), value.as_ref());
                let risk_level = self.patterns.classify(name)?;
                if is_substitution(value) {
                    return None;
                }
                Some(CredentialFinding {
                    name: name.to_string(),
                    masked_value: mask_value(value),
                    risk_level,
                    source,
                })
            })
            .collect();
        CredentialAnalysis::from_findings(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_PAIRS: [(&str, &str); 0] = [];

    #[test]
    fn test_env_detection_and_masking() {
        let analyzer = CredentialAnalyzer::default();
        let result = analyzer.analyze_env([("API_KEY", "very-long-secret-key-value"), ("NODE_ENV", "production")]);
        assert!(result.has_credentials);
        assert_eq!(result.findings.len(), 1);
        let finding = &result.findings[0];
        assert_eq!(finding.name, "API_KEY");
        assert_eq!(finding.masked_value, "v********e");
        assert_eq!(finding.risk_level, RiskLevel::High);
        assert_eq!(finding.source, FindingSource::Env);
    }

    #[test]
    fn test_env_unrelated_names_only() {
        let analyzer = CredentialAnalyzer::default();
        let result = analyzer.analyze_env([("LOG_LEVEL", "debug"), ("NODE_ENV", "dev"), ("PORT", "3000")]);
        assert!(!result.has_credentials);
        assert_eq!(result.overall_risk_level, OverallRisk::None);
    }

    #[test]
    fn test_env_substitution_skipped() {
        let analyzer = CredentialAnalyzer::default();
        let result = analyzer.analyze_env([("GITHUB_TOKEN", "${env:GITHUB_TOKEN}")]);
        assert!(!result.has_credentials);
    }

    #[test]
    fn test_low_risk_only() {
        let analyzer = CredentialAnalyzer::default();
        let result = analyzer.analyze_env([("OPENAI_ORG_ID", "org-123456")]);
        assert_eq!(result.overall_risk_level, OverallRisk::Low);
    }

    #[test]
    fn test_headers() {
        let analyzer = CredentialAnalyzer::default();
        let result = analyzer.analyze_headers([
            ("Authorization", "Bearer sk-1234567890abcdef"),
            ("Content-Type", "application/json"),
            ("X-Org-ID", "org-42"),
        ]);
        assert_eq!(result.findings.len(), 2);
        assert_eq!(result.findings[0].masked_value, "B********f");
        assert_eq!(result.findings[0].source, FindingSource::Headers);
        assert_eq!(result.findings[1].risk_level, RiskLevel::Low);
        assert_eq!(result.overall_risk_level, OverallRisk::High);
    }

    #[test]
    fn test_args_empty_and_unpaired() {
        let analyzer = CredentialAnalyzer::default();
        let empty: [&str; 0] = [];
        assert!(!analyzer.analyze_args(&empty).has_credentials);
        assert!(!analyzer.analyze_args(&["--api-key"]).has_credentials);
        assert!(!analyzer.analyze_args(&["--api-key", "--another-flag"]).has_credentials);
    }

    #[test]
    fn test_args_flag_value_pair() {
        let analyzer = CredentialAnalyzer::default();
        let result = analyzer.analyze_args(&["-y", "@upstash/context7-mcp", "--api-key", "TOKEN123"]);
        assert_eq!(result.findings.len(), 1);
        let finding = &result.findings[0];
        assert_eq!(finding.name, "--api-key");
        assert_eq!(finding.masked_value, "T******3");
        assert_eq!(finding.source, FindingSource::Args);
    }

    #[test]
    fn test_args_inline_value() {
        let analyzer = CredentialAnalyzer::default();
        let result = analyzer.analyze_args(&["--token=abcdef", "--port=8080", "--password="]);
        assert_eq!(result.findings.len(), 1);
        assert_eq!(result.findings[0].name, "--token");
        assert_eq!(result.findings[0].masked_value, "a****f");
    }

    #[test]
    fn test_args_non_credential_flags() {
        let analyzer = CredentialAnalyzer::default();
        let result = analyzer.analyze_args(&["--help", "x", "--version", "1", "--port", "80", "--verbose", "yes"]);
        assert!(!result.has_credentials);
    }

    #[test]
    fn test_args_org_id_is_low() {
        let analyzer = CredentialAnalyzer::default();
        let result = analyzer.analyze_args(&["--org-id", "org-123"]);
        assert_eq!(result.overall_risk_level, OverallRisk::Low);
    }

    #[test]
    fn test_args_substitution_value_skipped() {
        let analyzer = CredentialAnalyzer::default();
        let result = analyzer.analyze_args(&["--token", "${input:token}"]);
        assert!(!result.has_credentials);
    }

    #[test]
    fn test_redact_args_masks_values_only() {
        let analyzer = CredentialAnalyzer::default();
        let args = [
            "-y",
            "@upstash/context7-mcp",
            "--api-key",
            "sk-live-SUPERSECRET",
            "--token=abcdef",
            "--port",
            "8080",
            "--password",
            "${env:PW}",
        ];
        let redacted = analyzer.redact_args(&args);
        assert_eq!(
            redacted,
            vec![
                "-y",
                "@upstash/context7-mcp",
                "--api-key",
                "s********T",
                "--token=a****f",
                "--port",
                "8080",
                "--password",
                "${env:PW}",
            ]
        );
    }

    #[test]
    fn test_redact_command_line() {
        let analyzer = CredentialAnalyzer::default();
        let line = "node  /opt/server.js --auth-token tok-1234567890 --verbose";
        let redacted = analyzer.redact_command_line(line);
        assert_eq!(redacted, "node /opt/server.js --auth-token t********0 --verbose");
        assert!(!redacted.contains("1234567890"));

        let clean = "npx  -y @modelcontextprotocol/server-everything";
        assert_eq!(analyzer.redact_command_line(clean), clean);
    }

    #[test]
    fn test_server_combines_sources() {
        let analyzer = CredentialAnalyzer::default();
        let result = analyzer.analyze_server(
            [("ORG_ID", "org-123")],
            &["--secret", "s3cr3t-value"],
            [("Authorization", "${input:pat}")],
        );
        assert_eq!(result.findings.len(), 2);
        assert_eq!(result.findings[0].source, FindingSource::Env);
        assert_eq!(result.findings[1].source, FindingSource::Args);
        assert_eq!(result.overall_risk_level, OverallRisk::High);
    }

    #[test]
    fn test_server_low_overall() {
        let analyzer = CredentialAnalyzer::default();
        let empty: [&str; 0] = [];
        let result = analyzer.analyze_server(
            [("ORG_ID", "org-123")],
            &empty,
            [("Authorization", "${input:github_mcp_pat}")],
        );
        assert_eq!(result.overall_risk_level, OverallRisk::Low);
        assert!(!analyzer.analyze_server(NO_PAIRS, &empty, NO_PAIRS).has_credentials);
    }

    #[test]
    fn test_finding_serialization() {
        let analyzer = CredentialAnalyzer::default();
        let result = analyzer.analyze_env([("PASSWORD", "hunter22")]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["hasCredentials"], true);
        assert_eq!(json["overallRiskLevel"], "high");
        assert_eq!(json["findings"][0]["maskedValue"], "h******2");
        assert_eq!(json["findings"][0]["riskLevel"], "high");
        assert_eq!(json["findings"][0]["source"], "env");
    }
}
