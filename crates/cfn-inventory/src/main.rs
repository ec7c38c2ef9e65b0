//! cfn-inventory: reconcile CloudFormation stacks against a resource inventory
//!
//! Writes a CSV report listing every stack and stack resource (enriched from
//! the inventory where possible) followed by the inventory records, IAM
//! roles and log groups that no stack accounts for.

use anyhow::Result;
use cfn_inventory::aws::AwsError;
use cfn_inventory::reconcile::Numbering;
use cfn_inventory::retry::RetryConfig;
use cfn_inventory::walker::TraversalLimits;
use cfn_inventory::{config, orchestrator};
use cfn_inventory_common::defaults::{
    DEFAULT_CALL_TIMEOUT_SECS, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_PAGES, DEFAULT_MAX_STACK_DEPTH,
    DEFAULT_OUTPUT_FILE,
};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cfn-inventory")]
#[command(about = "Reconcile CloudFormation stacks, IAM roles and log groups against a resource inventory")]
#[command(version)]
#[command(arg_required_else_help = true)]
struct Args {
    /// AWS profile to use (AWS_PROFILE is honoured when omitted)
    #[arg(long)]
    profile: Option<String>,

    /// AWS region (AWS_REGION or the profile's region when omitted)
    #[arg(long)]
    region: Option<String>,

    /// Exported inventory CSV: identifier, name, service, type, region
    #[arg(long, visible_alias = "catalog")]
    csvfile: Option<PathBuf>,

    /// Skip the first row of the inventory file
    #[arg(long)]
    catalog_has_header: bool,

    /// Report file to write
    #[arg(default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,

    /// Maximum nested-stack depth below a root stack
    #[arg(long, default_value_t = DEFAULT_MAX_STACK_DEPTH)]
    max_stack_depth: usize,

    /// Maximum pages fetched from any paginated listing
    #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
    max_pages: usize,

    /// Maximum attempts per AWS call, first try included
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: usize,

    /// Per-call timeout in seconds
    #[arg(long, default_value_t = DEFAULT_CALL_TIMEOUT_SECS)]
    call_timeout_secs: u64,

    /// Number every resource row by its position, matched or not
    #[arg(long)]
    sequential_numbering: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl From<Args> for config::RunConfig {
    fn from(args: Args) -> Self {
        Self {
            aws: config::AwsConfig {
                profile: args.profile,
                region: args.region,
            },
            catalog: config::CatalogConfig {
                path: args.csvfile,
                has_header: args.catalog_has_header,
            },
            limits: TraversalLimits {
                max_depth: args.max_stack_depth,
                max_pages: args.max_pages,
            },
            retry: RetryConfig {
                max_attempts: args.max_attempts,
                call_timeout: Duration::from_secs(args.call_timeout_secs),
                ..Default::default()
            },
            report: config::ReportConfig {
                output: args.output,
                numbering: if args.sequential_numbering {
                    Numbering::Sequential
                } else {
                    Numbering::Observed
                },
            },
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print error in a user-friendly way
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();

    let _ = writeln!(stderr, "\n\x1b[1;31mError:\x1b[0m {e}");

    // Print error chain (causes)
    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  \x1b[33mCaused by:\x1b[0m {cause}");
        source = cause.source();
    }

    let suggestion = e
        .chain()
        .find_map(|cause| cause.downcast_ref::<AwsError>())
        .and_then(AwsError::suggestion);
    if let Some(hint) = suggestion {
        let _ = writeln!(stderr, "\n\x1b[36mHint:\x1b[0m {hint}");
    }
}

/// SDK targets kept at warn unless RUST_LOG says otherwise
const SDK_TARGETS: &[&str] = &[
    "aws_config",
    "aws_smithy_runtime",
    "aws_sdk_cloudformation",
    "aws_sdk_cloudwatchlogs",
    "aws_sdk_iam",
    "aws_sdk_sts",
];

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        EnvFilter::from_default_env()
    } else {
        let mut directives = vec![level.to_string()];
        directives.extend(SDK_TARGETS.iter().map(|target| format!("{target}=warn")));
        EnvFilter::new(directives.join(","))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Some(profile) = &args.profile {
        info!(profile = %profile, "Using AWS profile");
    }

    let config: config::RunConfig = args.into();
    let summary = orchestrator::run(config).await?;
    info!(
        stacks = summary.root_stacks,
        unmatched = summary.unmatched_resources,
        "Done"
    );
    Ok(())
}
