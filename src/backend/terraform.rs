// src/backend/terraform.rs

//! Terraform CLI backend
//!
//! Runs the `terraform` binary in the source or target working directory.
//! Terraform reports import problems only as text, so the output is
//! classified here and nowhere else.

use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

use super::{ClaimError, ExecutionBackend};
use crate::error::{Error, Result};

/// Default binary name looked up on PATH
const TERRAFORM_BINARY: &str = "terraform";

/// Output fragment Terraform prints when the address is already in state
const ALREADY_MANAGED_MARKER: &str = "Resource already managed by Terraform";

/// Output fragment Terraform prints for resource types without import support
const IMPORT_UNSUPPORTED_MARKER: &str = "does not support import";

/// Arguments of `terraform import`, shared by execution and dry-run rendering
fn import_args<'a>(target_address: &'a str, identifier: &'a str) -> [&'a str; 5] {
    ["import", "-input=false", "-no-color", target_address, identifier]
}

/// Arguments of `terraform state rm`
fn remove_args(source_address: &str) -> [&str; 3] {
    ["state", "rm", source_address]
}

/// Captured result of one terraform invocation
#[derive(Debug)]
struct CommandOutput {
    success: bool,
    stdout: String,
    /// stdout followed by stderr
    combined: String,
}

/// Backend that shells out to the Terraform CLI
#[derive(Debug, Clone)]
pub struct TerraformBackend {
    /// Resolved path of the binary that gets executed
    binary: PathBuf,
    /// Name used when rendering dry-run commands
    display_name: String,
}

impl TerraformBackend {
    /// Use a specific terraform binary without checking that it exists
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        let binary = binary.into();
        let display_name = binary.display().to_string();
        Self {
            binary,
            display_name,
        }
    }

    /// Resolve the terraform binary, either the one given or the first
    /// `terraform` on PATH
    pub fn locate(binary: Option<&Path>) -> Result<Self> {
        let requested = binary.unwrap_or_else(|| Path::new(TERRAFORM_BINARY));
        let resolved = which::which(requested).map_err(|e| {
            Error::BackendError(format!(
                "terraform binary '{}' not found: {}",
                requested.display(),
                e
            ))
        })?;

        debug!("Using terraform binary at {}", resolved.display());
        Ok(Self {
            binary: resolved,
            display_name: requested.display().to_string(),
        })
    }

    /// Path of the binary that gets executed
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn run(&self, args: &[&str], dir: &Path) -> Result<CommandOutput> {
        debug!("Running {} {} in {}", self.display_name, args.join(" "), dir.display());

        let output = Command::new(&self.binary)
            .args(args)
            .current_dir(dir)
            .env("TF_IN_AUTOMATION", "1")
            .output()
            .map_err(|e| {
                Error::BackendError(format!(
                    "Failed to run {}: {}. Is terraform installed?",
                    self.display_name, e
                ))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);
        let combined = format!("{}{}", stdout, stderr);

        Ok(CommandOutput {
            success: output.status.success(),
            stdout,
            combined,
        })
    }

    fn render(&self, dir: &Path, args: &[&str]) -> String {
        let mut parts = vec![
            shell_quote(&self.display_name),
            format!("-chdir={}", shell_quote(&dir.display().to_string())),
        ];
        parts.extend(args.iter().map(|a| shell_quote(a)));
        parts.join(" ")
    }
}

impl Default for TerraformBackend {
    fn default() -> Self {
        Self::new(TERRAFORM_BINARY)
    }
}

impl ExecutionBackend for TerraformBackend {
    fn pull_state(&self, dir: &Path) -> Result<String> {
        let output = self.run(&["state", "pull"], dir)?;
        if !output.success {
            return Err(Error::StateQueryError {
                dir: dir.display().to_string(),
                message: output.combined.trim().to_string(),
            });
        }
        Ok(output.stdout)
    }

    fn claim(
        &self,
        target_address: &str,
        identifier: &str,
        dir: &Path,
    ) -> std::result::Result<(), ClaimError> {
        let output = self
            .run(&import_args(target_address, identifier), dir)
            .map_err(|e| ClaimError::Other(e.to_string()))?;

        if output.success {
            info!("Imported {} as {}", identifier, target_address);
            return Ok(());
        }

        Err(classify_import_failure(&output.combined))
    }

    fn remove(&self, source_address: &str, dir: &Path) -> Result<()> {
        let output = self.run(&remove_args(source_address), dir)?;
        if !output.success {
            warn!("terraform state rm {} failed", source_address);
            return Err(Error::RemovalError {
                address: source_address.to_string(),
                message: output.combined.trim().to_string(),
            });
        }
        info!("Removed {} from {}", source_address, dir.display());
        Ok(())
    }

    fn claim_command(&self, target_address: &str, identifier: &str, dir: &Path) -> String {
        self.render(dir, &import_args(target_address, identifier))
    }

    fn remove_command(&self, source_address: &str, dir: &Path) -> String {
        self.render(dir, &remove_args(source_address))
    }
}

/// Turn the output of a failed `terraform import` into a [`ClaimError`]
pub fn classify_import_failure(output: &str) -> ClaimError {
    if output.contains(ALREADY_MANAGED_MARKER) {
        ClaimError::AlreadyOwned
    } else if output.contains(IMPORT_UNSUPPORTED_MARKER) {
        ClaimError::Unimportable
    } else {
        let message = output
            .lines()
            .map(str::trim)
            .find(|l| l.starts_with("Error:"))
            .or_else(|| output.lines().map(str::trim).find(|l| !l.is_empty()))
            .unwrap_or("terraform import failed")
            .to_string();
        ClaimError::Other(message)
    }
}

/// Quote a word for POSIX shells, leaving simple words untouched
pub fn shell_quote(word: &str) -> String {
    let is_plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:@,+%".contains(c));

    if is_plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_already_managed() {
        let output = "Error: Resource already managed by Terraform\n\nTerraform is already managing a remote object for\naws_s3_bucket.logs.";
        assert_eq!(classify_import_failure(output), ClaimError::AlreadyOwned);
    }

    #[test]
    fn test_classify_unsupported_import() {
        let output = "Error: resource aws_s3_object: This resource does not support import.";
        assert_eq!(classify_import_failure(output), ClaimError::Unimportable);
    }

    #[test]
    fn test_classify_other_keeps_error_line() {
        let output = "\naws_iam_role.r: Importing from ID \"bad\"...\nError: Cannot import non-existent remote object\n";
        assert_eq!(
            classify_import_failure(output),
            ClaimError::Other("Error: Cannot import non-existent remote object".to_string())
        );
        assert_eq!(
            classify_import_failure(""),
            ClaimError::Other("terraform import failed".to_string())
        );
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("aws_s3_bucket.logs"), "aws_s3_bucket.logs");
        assert_eq!(shell_quote(r#"aws_iam_role.y["foo"]"#), r#"'aws_iam_role.y["foo"]'"#);
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote(""), "''");
    }

    #[test]
    fn test_rendered_commands() {
        let backend = TerraformBackend::default();
        let dir = Path::new("/work/target");

        assert_eq!(
            backend.claim_command(r#"module.x.aws_iam_role.y["foo"]"#, "role-foo", dir),
            r#"terraform -chdir=/work/target import -input=false -no-color 'module.x.aws_iam_role.y["foo"]' role-foo"#
        );
        assert_eq!(
            backend.remove_command("module.x", Path::new("/work/my source")),
            "terraform -chdir='/work/my source' state rm module.x"
        );
    }

    #[test]
    fn test_rendered_import_matches_executed_args() {
        let backend = TerraformBackend::default();
        let rendered = backend.claim_command("aws_iam_role.r", "role-r", Path::new("/w"));
        assert_eq!(
            rendered,
            format!("terraform -chdir=/w {}", import_args("aws_iam_role.r", "role-r").join(" "))
        );
    }
}
