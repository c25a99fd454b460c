use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{exit, Command, ExitStatus};

use calendar_setup_core::arn::{calendar_arn, calendar_policy_statement};
use calendar_setup_core::contract::ResourceProperties;
use clap::{Parser, Subcommand, ValueEnum};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const LAMBDA_PACKAGE: &str = "calendar_setup_lambda";
const LAMBDA_BINARY: &str = "calendar_setup";
const DIST_DIR: &str = "dist";

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the change-calendar setup workspace",
    long_about = "A unified CLI for CI checks, Lambda packaging, and IAM policy\n\
                  and resource-property rendering in the change-calendar setup workspace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run CI checks (fmt, clippy, tests)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
    /// Build and package the calendar setup Lambda as a bootstrap zip
    Package {
        /// Compilation target triple for the Lambda binary
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        /// Build profile used for the binary
        #[arg(value_enum, long, default_value_t = BuildProfile::Release)]
        profile: BuildProfile,
    },
    /// Print the IAM statement the handler needs for one calendar
    CalendarPolicy {
        /// Calendar (SSM document) name
        #[arg(long)]
        name: String,
        #[arg(long, env = "AWS_REGION")]
        region: String,
        #[arg(long, env = "AWS_ACCOUNT_ID")]
        account: String,
        #[arg(long, default_value = "aws")]
        partition: String,
    },
    /// Print the custom-resource properties for a local or S3-hosted calendar
    CalendarProperties {
        /// Calendar (SSM document) name; also the file name or object key
        #[arg(long)]
        name: String,
        /// Directory holding the calendar file; the body is inlined
        #[arg(long, required_unless_present = "bucket")]
        #[arg(conflicts_with_all = ["bucket", "role_arn"])]
        path: Option<PathBuf>,
        /// Bucket holding the calendar object
        #[arg(long)]
        bucket: Option<String>,
        /// Role assumed before reading the object
        #[arg(long, requires = "bucket")]
        role_arn: Option<String>,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting and clippy
    Lint,
    /// Workspace tests
    Test,
    /// Run lint + test
    Check,
}

#[derive(Clone, Copy, ValueEnum)]
enum BuildProfile {
    Debug,
    Release,
}

impl BuildProfile {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }

    fn as_cargo_flag(self) -> Option<&'static str> {
        match self {
            Self::Debug => None,
            Self::Release => Some("--release"),
        }
    }
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn package_calendar_lambda(target: &str, profile: BuildProfile) {
    ensure_rust_target_installed(target);

    step("Build calendar setup lambda binary");

    let mut cargo_args = vec![
        "build",
        "-p",
        LAMBDA_PACKAGE,
        "--target",
        target,
        "--bin",
        LAMBDA_BINARY,
    ];
    if let Some(flag) = profile.as_cargo_flag() {
        cargo_args.push(flag);
    }
    run_cargo(&cargo_args);

    step("Package lambda zip artifact");
    let target_dir = Path::new("target").join(target).join(profile.dir_name());
    let dist_dir = Path::new(DIST_DIR);
    fs::create_dir_all(dist_dir).expect("failed to create lambda dist directory");

    let zip_path = dist_dir.join(format!("{LAMBDA_BINARY}.zip"));
    package_lambda_zip(
        &target_dir.join(binary_name(LAMBDA_BINARY, target)),
        &zip_path,
    );

    eprintln!("\nPackaged artifact:\n- {}", zip_path.display());
}

fn ensure_rust_target_installed(target: &str) {
    let output = Command::new("rustup")
        .args(["target", "list", "--installed"])
        .output();

    let output = match output {
        Ok(value) => value,
        Err(error) => {
            eprintln!(
                "warning: failed to run `rustup target list --installed` ({error}); continuing without target preflight"
            );
            return;
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!(
            "failed to list installed rust targets; run `rustup target list --installed` manually. details: {}",
            stderr.trim()
        );
    }

    let installed = String::from_utf8_lossy(&output.stdout);
    if !installed.lines().any(|line| line.trim() == target) {
        panic!(
            "required rust target `{target}` is not installed. install it with `rustup target add {target}` and re-run `cargo run -p xtask -- package`"
        );
    }
}

fn binary_name(bin_name: &str, target: &str) -> String {
    if target.contains("windows") {
        format!("{bin_name}.exe")
    } else {
        bin_name.to_string()
    }
}

fn package_lambda_zip(binary_path: &Path, zip_path: &Path) {
    if !binary_path.exists() {
        panic!("expected lambda binary at '{}'", binary_path.display());
    }

    let binary = fs::read(binary_path).expect("failed to read lambda binary");
    let file = fs::File::create(zip_path).expect("failed to create lambda zip");
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    zip.start_file("bootstrap", options)
        .expect("failed to start bootstrap entry in lambda zip");
    zip.write_all(&binary)
        .expect("failed to write bootstrap entry");
    zip.finish().expect("failed to finish lambda zip");
}

fn print_calendar_policy(partition: &str, region: &str, account: &str, name: &str) {
    let arn = calendar_arn(partition, region, account, name);
    let statement = calendar_policy_statement(&arn);
    let rendered =
        serde_json::to_string_pretty(&statement).expect("policy statement should serialize");
    println!("{rendered}");
}

fn print_calendar_properties(
    name: &str,
    path: Option<&Path>,
    bucket: Option<&str>,
    role_arn: Option<&str>,
) {
    let properties = if let Some(dir) = path {
        ResourceProperties::from_local_path(dir, name)
            .unwrap_or_else(|error| panic!("failed to read calendar '{name}': {error}"))
    } else if let Some(bucket) = bucket {
        ResourceProperties::s3_location(bucket, name, role_arn)
    } else {
        eprintln!("either --path or --bucket is required");
        exit(2);
    };
    let rendered =
        serde_json::to_string_pretty(&properties).expect("resource properties should serialize");
    println!("{rendered}");
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_lint() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);
}

fn ci_test() {
    step("Test calendar_setup_core");
    run_cargo(&["test", "-p", "calendar_setup_core"]);

    step("Test calendar_setup_lambda");
    run_cargo(&["test", "-p", LAMBDA_PACKAGE]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci { job } => {
            match job {
                CiJob::Lint => ci_lint(),
                CiJob::Test => ci_test(),
                CiJob::Check => {
                    ci_lint();
                    ci_test();
                }
            }
            eprintln!("\nCI job passed.");
        }
        Commands::Package { target, profile } => {
            package_calendar_lambda(&target, profile);
        }
        Commands::CalendarPolicy {
            name,
            region,
            account,
            partition,
        } => {
            print_calendar_policy(&partition, &region, &account, &name);
        }
        Commands::CalendarProperties {
            name,
            path,
            bucket,
            role_arn,
        } => {
            print_calendar_properties(
                &name,
                path.as_deref(),
                bucket.as_deref(),
                role_arn.as_deref(),
            );
        }
    }
}
