//! Frontend: JavaScript packages and the Vite plugin configuration

use crate::host::{CommandRunner, CommandSpec, Placement, RailsApp};
use crate::recipe::StepReport;
use anyhow::{Context, Result};

/// Packages installed with a single `yarn add`
pub const PACKAGES: [&str; 11] = [
    "trix",
    "@rails/actiontext",
    "@rails/ujs",
    "@rails/activestorage",
    "@hotwired/stimulus",
    "stimulus-vite-helpers",
    "vite-plugin-stimulus-hmr",
    "vite-plugin-full-reload",
    "typescript",
    "vite-plugin-windicss",
    "windicss",
];

pub const VITE_CONFIG: &str = "vite.config.ts";

pub const IMPORT_ANCHOR: &str = "from 'vite'\n";
pub const PLUGINS_ANCHOR: &str = "plugins: [";

/// Plugin imports, in injection order
///
/// Each one lands directly after the `vite` import, so the last one injected
/// ends up first in the file.
pub const PLUGIN_IMPORTS: [&str; 3] = [
    "import FullReload from 'vite-plugin-full-reload'\n",
    "import StimulusHMR from 'vite-plugin-stimulus-hmr'\n",
    "import WindiCSS from 'vite-plugin-windicss'\n",
];

/// Plugin invocations, in injection order
pub const PLUGIN_CALLS: [&str; 3] = [
    "\n    FullReload(['config/routes.rb', 'app/views/**/*']),",
    "\n    StimulusHMR(),",
    "\n    WindiCSS({
      root: __dirname,
      scan: {
        fileExtensions: ['erb', 'haml', 'html', 'vue', 'js', 'ts', 'jsx', 'tsx'],
        dirs: ['app/views', 'app/frontend'], // or app/javascript, or app/packs
      },
    }),",
];

pub fn yarn_add() -> CommandSpec {
    CommandSpec::new("yarn").arg("add").args(PACKAGES)
}

pub async fn add_javascript<R: CommandRunner>(app: &RailsApp<R>) -> Result<()> {
    app.run(yarn_add())
        .await
        .context("Failed to install frontend packages")
}

/// Install Vite Ruby, then wire the plugins into `vite.config.ts`
pub async fn add_vite<R: CommandRunner>(app: &RailsApp<R>) -> Result<StepReport> {
    app.run(CommandSpec::new("bundle").args(["exec", "vite", "install"]))
        .await
        .context("vite install failed")?;

    let mut report = StepReport::default();
    for import in PLUGIN_IMPORTS {
        report.record(
            app.inject_into_file(VITE_CONFIG, import, Placement::After(IMPORT_ANCHOR))
                .await?,
        );
    }
    for call in PLUGIN_CALLS {
        report.record(
            app.inject_into_file(VITE_CONFIG, call, Placement::After(PLUGINS_ANCHOR))
                .await?,
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yarn_add_is_one_invocation_with_every_package() {
        let spec = yarn_add();
        assert_eq!(spec.program, "yarn");
        assert_eq!(spec.args[0], "add");
        assert_eq!(spec.args[1..], PACKAGES);
    }

    #[test]
    fn test_imports_and_calls_name_the_same_plugins() {
        for (import, name) in PLUGIN_IMPORTS.iter().zip(["FullReload", "StimulusHMR", "WindiCSS"]) {
            assert!(import.starts_with(&format!("import {} from", name)));
        }
        for (call, name) in PLUGIN_CALLS.iter().zip(["FullReload(", "StimulusHMR(", "WindiCSS("]) {
            assert!(call.trim_start().starts_with(name));
        }
    }
}
