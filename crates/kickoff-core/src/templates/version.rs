//! CLI/template version compatibility

use semver::Version;

/// Compare the running CLI version against the version a template asks for
///
/// Returns a warning when the CLI is older. Versions that do not parse (a
/// leading `v` is accepted) never produce a warning.
pub fn check_compatibility(
    cli_version: &str,
    template_version: &str,
    upgrade_command: &str,
) -> Option<String> {
    let cli_ver = parse_version(cli_version)?;
    let template_ver = parse_version(template_version)?;

    (cli_ver < template_ver).then(|| {
        format!(
            "This template was written for CLI version {} or newer.\n\
             You are running version {}.\n\
             Consider updating: {}",
            template_version, cli_version, upgrade_command
        )
    })
}

fn parse_version(version_str: &str) -> Option<Version> {
    let cleaned = version_str.trim();
    let cleaned = cleaned.strip_prefix('v').unwrap_or(cleaned);
    Version::parse(cleaned).ok()
}
