//! Common test utilities for agent-packager integration tests
//!
//! Integration tests run the real binary against stub `virtualenv`/`pip`
//! executables placed on PATH, so the whole pipeline (ordering, exclusion,
//! validation, archiving) runs hermetically. The stub pip appends every call
//! to a log file named by `PIP_STUB_LOG` and keeps a `freeze.txt` state file
//! inside the environment; env vars tune its behavior:
//!
//! - `PIP_STUB_OMIT`: space-separated locators that install "successfully"
//!   but never land in the freeze listing (validation-failure scenarios)
//! - `PIP_STUB_TRANSITIVE`: entries appended to the freeze listing whenever
//!   the agent module is installed (transitive-install scenarios)

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

/// Stub standing in for the virtualenv tool. Creates the directory layout a
/// real virtualenv would have and drops the stub pip into its bin dir.
const VIRTUALENV_STUB: &str = r#"#!/usr/bin/env bash
set -e
venv=""
for arg in "$@"; do venv="$arg"; done
mkdir -p "$venv/bin" "$venv/lib/python3.11/site-packages"
touch "$venv/bin/activate"
cat > "$venv/bin/pip" <<'PIPEOF'
#!/usr/bin/env bash
venv_dir="$(cd "$(dirname "$0")/.." && pwd)"
state="$venv_dir/freeze.txt"
log="${PIP_STUB_LOG:-$venv_dir/pip.log}"
cmd="$1"
shift
case "$cmd" in
  install)
    if [ "$1" = "-r" ]; then
      echo "install -r $2" >> "$log"
      exit 0
    fi
    locator="$1"
    echo "install $locator" >> "$log"
    case "$locator" in
      *fail-locator*)
        echo "stub: cannot install $locator" >&2
        exit 1
        ;;
    esac
    omitted=0
    for omit in $PIP_STUB_OMIT; do
      [ "$locator" = "$omit" ] && omitted=1
    done
    [ "$omitted" = "0" ] && echo "$locator" >> "$state"
    if [ -n "$PIP_STUB_TRANSITIVE" ]; then
      case "$locator" in
        *cloudify-agent*)
          for extra in $PIP_STUB_TRANSITIVE; do echo "$extra" >> "$state"; done
          ;;
      esac
    fi
    ;;
  uninstall)
    name=""
    for arg in "$@"; do [ "$arg" = "-y" ] || name="$arg"; done
    echo "uninstall $name" >> "$log"
    if [ -f "$state" ]; then
      grep -v "$name" "$state" > "$state.tmp" || true
      mv "$state.tmp" "$state"
    fi
    ;;
  freeze)
    [ -f "$state" ] && cat "$state"
    ;;
esac
exit 0
PIPEOF
chmod +x "$venv/bin/pip"
"#;

/// A test workspace with stub tools on PATH
#[allow(dead_code)]
pub struct TestWorkspace {
    /// Temporary directory
    pub temp: TempDir,
    /// Path to workspace root
    pub path: PathBuf,
    /// Directory holding the stub tools
    pub stub_bin: PathBuf,
}

#[allow(dead_code)]
impl TestWorkspace {
    /// Create a new test workspace with the stub toolchain installed
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();

        let stub_bin = path.join("stub-bin");
        fs::create_dir_all(&stub_bin).expect("Failed to create stub bin directory");
        let virtualenv = stub_bin.join("virtualenv");
        fs::write(&virtualenv, VIRTUALENV_STUB).expect("Failed to write virtualenv stub");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&virtualenv, fs::Permissions::from_mode(0o755))
                .expect("Failed to mark virtualenv stub executable");
        }

        Self {
            temp,
            path,
            stub_bin,
        }
    }

    /// Write the config file and return its path
    pub fn write_config(&self, yaml: &str) -> PathBuf {
        let config_path = self.path.join("config.yaml");
        fs::write(&config_path, yaml).expect("Failed to write config file");
        config_path
    }

    /// Path of the virtualenv used by [`Self::base_config`]
    pub fn venv_path(&self) -> PathBuf {
        self.path.join("cloudify/env")
    }

    /// Path of the output archive used by [`Self::base_config`]
    pub fn tar_path(&self) -> PathBuf {
        self.path.join("agent.tar.gz")
    }

    /// Config preamble pinning target identity and workspace-local paths
    pub fn base_config(&self) -> String {
        format!(
            "distribution: ubuntu\nrelease: trusty\nvenv: {}\noutput_tar: {}\n",
            self.venv_path().display(),
            self.tar_path().display()
        )
    }

    /// Command for the packager binary wired to the stub toolchain
    pub fn packager_cmd(&self) -> Command {
        let path_var = std::env::var("PATH").unwrap_or_default();
        let mut cmd = Command::cargo_bin("agent-packager").expect("binary under test");
        cmd.current_dir(&self.path);
        cmd.env("PATH", format!("{}:{}", self.stub_bin.display(), path_var));
        cmd.env("PIP_STUB_LOG", self.path.join("install.log"));
        cmd.env_remove("PIP_STUB_OMIT");
        cmd.env_remove("PIP_STUB_TRANSITIVE");
        cmd.env_remove("VERSION");
        cmd.env_remove("PRERELEASE");
        cmd.env_remove("BUILD");
        cmd.env_remove("RUST_LOG");
        cmd
    }

    /// Every pip call recorded by the stub, in order
    pub fn install_log(&self) -> Vec<String> {
        match fs::read_to_string(self.path.join("install.log")) {
            Ok(content) => content.lines().map(ToString::to_string).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// The stub environment's freeze listing
    pub fn freeze_state(&self) -> String {
        fs::read_to_string(self.venv_path().join("freeze.txt")).unwrap_or_default()
    }

    /// Check if a path exists in the workspace
    pub fn file_exists(&self, relative: &str) -> bool {
        self.path.join(relative).exists()
    }

    /// Read a file from the workspace
    pub fn read_file(&self, relative: &str) -> String {
        fs::read_to_string(self.path.join(relative)).expect("Failed to read file")
    }
}
