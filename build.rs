// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Mirror of the clap derive definition in src/cli.rs
fn build_cli() -> Command {
    Command::new("tfstate-transfer")
        .version(env!("CARGO_PKG_VERSION"))
        .author("tfstate-transfer Contributors")
        .about("Move resources between Terraform states")
        .arg(
            Arg::new("source_dir")
                .long("source-dir")
                .value_name("DIR")
                .help("Terraform working directory holding the source state"),
        )
        .arg(
            Arg::new("target_dir")
                .long("target-dir")
                .value_name("DIR")
                .help("Terraform working directory holding the target state"),
        )
        .arg(
            Arg::new("config_file")
                .long("config-file")
                .value_name("FILE")
                .help("JSON transfer file with directories and resources"),
        )
        .arg(
            Arg::new("resource")
                .short('r')
                .long("resource")
                .value_name("SOURCE[:TARGET]")
                .action(ArgAction::Append)
                .help("Resource to transfer, as `source` or `source:target` (repeatable)"),
        )
        .arg(
            Arg::new("dry_run")
                .long("dry-run")
                .action(ArgAction::SetTrue)
                .help("Print the commands that would be executed without running them"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print the run report as JSON"),
        )
        .arg(
            Arg::new("terraform_bin")
                .long("terraform-bin")
                .value_name("PATH")
                .help("Terraform binary to use (default: `terraform` on PATH)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("tfstate-transfer.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
