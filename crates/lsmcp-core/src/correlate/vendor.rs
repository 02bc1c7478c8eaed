//! Vendor attribution from a parent command line.

use lsmcp_config::VendorRuleSetting;
use serde::Serialize;

/// One attribution rule: a case-insensitive substring of the parent
/// command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VendorRule {
    /// Lower-cased needle.
    pub needle: String,
    pub vendor: String,
    pub product: String,
}

impl VendorRule {
    pub fn new(
        needle: impl Into<String>,
        vendor: impl Into<String>,
        product: impl Into<String>,
    ) -> Self {
        Self {
            needle: needle.into().to_lowercase(),
            vendor: vendor.into(),
            product: product.into(),
        }
    }

    fn hits(&self, haystack_lower: &str) -> bool {
        !self.needle.is_empty() && haystack_lower.contains(&self.needle)
    }
}

impl From<&VendorRuleSetting> for VendorRule {
    fn from(setting: &VendorRuleSetting) -> Self {
        VendorRule::new(&setting.needle, &setting.vendor, &setting.product)
    }
}

/// Ordered vendor rules. The first hit wins.
#[derive(Debug, Clone, Default)]
pub struct VendorDatabase {
    rules: Vec<VendorRule>,
}

impl VendorDatabase {
    /// Create a new empty database.
    pub fn new() -> Self {
        Self { rules: vec![] }
    }

    /// Create with default rules.
    pub fn with_defaults() -> Self {
        let mut db = Self::new();
        db.add_default_rules();
        db
    }

    /// Settings rules first, then the defaults.
    pub fn with_settings(rules: &[VendorRuleSetting]) -> Self {
        let mut db = Self::new();
        for rule in rules {
            db.add(rule.into());
        }
        db.add_default_rules();
        db
    }

    /// Add a rule after the existing ones.
    pub fn add(&mut self, rule: VendorRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[VendorRule] {
        &self.rules
    }

    /// Add all default rules. More specific needles come first.
    pub fn add_default_rules(&mut self) {
        // Claude Desktop
        self.add(VendorRule::new("Claude.app", "Anthropic", "Claude Desktop"));
        self.add(VendorRule::new("AnthropicClaude", "Anthropic", "Claude Desktop"));
        self.add(VendorRule::new("claude-desktop", "Anthropic", "Claude Desktop"));
        self.add(VendorRule::new("com.anthropic", "Anthropic", "Claude Desktop"));

        // Claude Code
        self.add(VendorRule::new("@anthropic-ai/claude-code", "Anthropic", "Claude Code"));
        self.add(VendorRule::new("claude-code", "Anthropic", "Claude Code"));

        // Cursor
        self.add(VendorRule::new("Cursor.app", "Anysphere", "Cursor"));
        self.add(VendorRule::new("Cursor Helper", "Anysphere", "Cursor"));
        self.add(VendorRule::new("cursor", "Anysphere", "Cursor"));

        // Windsurf
        self.add(VendorRule::new("Windsurf", "Codeium", "Windsurf"));

        // VS Code
        self.add(VendorRule::new("Code - Insiders", "Microsoft", "VS Code Insiders"));
        self.add(VendorRule::new("code-insiders", "Microsoft", "VS Code Insiders"));
        self.add(VendorRule::new("Visual Studio Code", "Microsoft", "VS Code"));
        self.add(VendorRule::new("Code Helper", "Microsoft", "VS Code"));
        self.add(VendorRule::new("Microsoft VS Code", "Microsoft", "VS Code"));
        self.add(VendorRule::new("/share/code/", "Microsoft", "VS Code"));
        self.add(VendorRule::new("Code.exe", "Microsoft", "VS Code"));

        // Zed
        self.add(VendorRule::new("Zed.app", "Zed Industries", "Zed"));
        self.add(VendorRule::new("zed-editor", "Zed Industries", "Zed"));
        self.add(VendorRule::new("Zed.exe", "Zed Industries", "Zed"));

        // Gemini CLI
        self.add(VendorRule::new("@google/gemini-cli", "Google", "Gemini CLI"));
        self.add(VendorRule::new("gemini", "Google", "Gemini CLI"));

        // JetBrains
        self.add(VendorRule::new("IntelliJ IDEA", "JetBrains", "IntelliJ IDEA"));
        self.add(VendorRule::new("idea64.exe", "JetBrains", "IntelliJ IDEA"));
        self.add(VendorRule::new("JetBrains", "JetBrains", "JetBrains IDE"));

        // Generic Claude CLI last so the desktop app wins
        self.add(VendorRule::new("claude", "Anthropic", "Claude Code"));
    }

    /// First rule whose needle appears in the command line.
    pub fn identify(&self, command_line: &str) -> Option<&VendorRule> {
        let lower = command_line.to_lowercase();
        self.rules.iter().find(|rule| rule.hits(&lower))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(db: &VendorDatabase, line: &str) -> Option<String> {
        db.identify(line).map(|r| r.product.clone())
    }

    #[test]
    fn test_default_attribution() {
        let db = VendorDatabase::with_defaults();
        assert_eq!(
            product(&db, "/Applications/Claude.app/Contents/MacOS/Claude"),
            Some("Claude Desktop".into())
        );
        assert_eq!(
            product(&db, "C:\\Users\\me\\AppData\\Local\\AnthropicClaude\\app-0.9.3\\claude.exe"),
            Some("Claude Desktop".into())
        );
        assert_eq!(
            product(&db, "/Applications/Cursor.app/Contents/Frameworks/Cursor Helper (Plugin).app/Contents/MacOS/Cursor Helper (Plugin)"),
            Some("Cursor".into())
        );
        assert_eq!(
            product(&db, "/Applications/Visual Studio Code.app/Contents/Frameworks/Code Helper (Plugin).app/Contents/MacOS/Code Helper (Plugin)"),
            Some("VS Code".into())
        );
        assert_eq!(product(&db, "/usr/share/code/code --type=utility"), Some("VS Code".into()));
        assert_eq!(product(&db, "node /usr/local/bin/claude"), Some("Claude Code".into()));
        assert_eq!(product(&db, "node /usr/lib/node_modules/@google/gemini-cli/dist/index.js"), Some("Gemini CLI".into()));
        assert_eq!(product(&db, "/bin/bash"), None);
    }

    #[test]
    fn test_case_insensitive() {
        let db = VendorDatabase::with_defaults();
        assert_eq!(db.identify("/opt/WINDSURF/windsurf").map(|r| r.vendor.as_str()), Some("Codeium"));
    }

    #[test]
    fn test_settings_rules_take_precedence() {
        let rules = vec![VendorRuleSetting {
            needle: "Cursor".into(),
            vendor: "Acme".into(),
            product: "Forked Editor".into(),
        }];
        let db = VendorDatabase::with_settings(&rules);
        assert_eq!(product(&db, "/opt/cursor/cursor"), Some("Forked Editor".into()));
        assert_eq!(db.rules().len(), VendorDatabase::with_defaults().rules().len() + 1);
    }

    #[test]
    fn test_empty_needle_never_hits() {
        let mut db = VendorDatabase::new();
        db.add(VendorRule::new("", "Nobody", "Nothing"));
        assert!(db.identify("anything").is_none());
    }
}
