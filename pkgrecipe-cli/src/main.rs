mod config;
mod properties;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use config::{MergedConfig, load_merged, parse_key_val};
use pkgrecipe_core::adapters::{CmakeOrchestrator, FsWritePort};
use pkgrecipe_core::pipeline::{
    ToolError, package_info, report_path, run_build, run_clean, run_package,
};
use pkgrecipe_core::settings::{CleanSettings, PackageSettings, RecipeSettings};
use pkgrecipe_types::RECIPE_FILE_NAME;
use pkgrecipe_types::report::ToolInfo;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "pkgrecipe",
    version,
    about = "Materialize a package recipe: mirror a module, build it, and package its artifacts."
)]
struct Cli {
    /// Enable debug logging.
    #[arg(long, global = true, default_value_t = false)]
    debug: bool,

    /// Enable trace logging (implies --debug).
    #[arg(long, global = true, default_value_t = false)]
    trace: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Mirror the module into the workspace, write the manifest, configure and build.
    Build(BuildArgs),
    /// Copy headers and libraries from the build output into include/, lib/ and bin/.
    Package(PackageArgs),
    /// Show the resolved recipe and what downstream consumers link against.
    Info(InfoArgs),
    /// Remove the orchestrator build directory and the manifest.
    Clean(CleanArgs),
    /// List all recipe properties.
    Properties(PropertiesArgs),
    /// Explain one recipe property.
    Explain(ExplainArgs),
}

#[derive(Debug, clap::Args)]
struct RecipeArgs {
    /// Workspace directory (default: current directory).
    #[arg(long, default_value = ".")]
    workspace: Utf8PathBuf,

    /// Recipe file (default: <workspace>/recipe.toml if present).
    #[arg(long)]
    recipe: Option<Utf8PathBuf>,

    /// Override a recipe value, e.g. `--set version=1.2.0`. Repeatable; later wins.
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    sets: Vec<(String, String)>,
}

impl RecipeArgs {
    fn load(&self, build_type: Option<&str>, shared: bool) -> anyhow::Result<MergedConfig> {
        let merged = load_merged(
            &self.workspace,
            self.recipe.as_deref(),
            &self.sets,
            build_type,
            shared,
        )?;
        merged
            .inputs
            .check_known_keys()
            .map_err(ToolError::Config)?;
        debug!(
            "merged recipe: recipe_dir={}, keys={:?}, settings={:?}",
            merged.recipe_dir,
            merged.inputs.iter().map(|(k, _)| k).collect::<Vec<_>>(),
            merged.orchestrator
        );
        Ok(merged)
    }
}

#[derive(Debug, Parser)]
struct BuildArgs {
    #[command(flatten)]
    recipe: RecipeArgs,

    /// CMake executable used to configure and build.
    #[arg(long, env = "PKGRECIPE_CMAKE", default_value = "cmake")]
    cmake: String,

    /// Build type passed to the orchestrator (default: from recipe, else Release).
    #[arg(long)]
    build_type: Option<String>,

    /// Build shared libraries.
    #[arg(long, default_value_t = false)]
    shared: bool,

    /// Do not write .pkgrecipe/report.json.
    #[arg(long, default_value_t = false)]
    no_report: bool,
}

#[derive(Debug, Parser)]
struct PackageArgs {
    #[command(flatten)]
    recipe: RecipeArgs,

    /// Package root (default: <workspace>/package). Relative paths are taken from the workspace.
    #[arg(long)]
    package_root: Option<Utf8PathBuf>,

    /// Do not write .pkgrecipe/report.json.
    #[arg(long, default_value_t = false)]
    no_report: bool,
}

#[derive(Debug, Parser)]
struct InfoArgs {
    #[command(flatten)]
    recipe: RecipeArgs,

    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Parser)]
struct CleanArgs {
    /// Workspace directory (default: current directory).
    #[arg(long, default_value = ".")]
    workspace: Utf8PathBuf,
}

#[derive(Debug, Parser)]
struct PropertiesArgs {
    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Parser)]
struct ExplainArgs {
    /// Property key to explain (e.g., "requires", "conan.artifact_type").
    key: String,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug, cli.trace);

    match real_main(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            let code = e
                .downcast_ref::<ToolError>()
                .map(ToolError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

fn init_tracing(debug: bool, trace: bool) {
    let filter = if trace {
        EnvFilter::new("trace")
    } else if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn real_main(cli: Cli) -> anyhow::Result<()> {
    match cli.cmd {
        Command::Build(args) => cmd_build(args),
        Command::Package(args) => cmd_package(args),
        Command::Info(args) => cmd_info(args),
        Command::Clean(args) => cmd_clean(args),
        Command::Properties(args) => cmd_properties(args),
        Command::Explain(args) => cmd_explain(args),
    }
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "pkgrecipe".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    }
}

fn cmd_build(args: BuildArgs) -> anyhow::Result<()> {
    let merged = args
        .recipe
        .load(args.build_type.as_deref(), args.shared)
        .context("load recipe")?;
    let settings = RecipeSettings {
        workspace: args.recipe.workspace.clone(),
        recipe_dir: merged.recipe_dir,
        recipe_file_name: recipe_file_name(args.recipe.recipe.as_deref()),
        inputs: merged.inputs,
        orchestrator: merged.orchestrator,
        write_report: !args.no_report,
    };

    let orchestrator = CmakeOrchestrator::new(args.cmake);
    let out = run_build(&settings, &orchestrator, &FsWritePort, tool_info())?;

    info!(
        "built {} {} in {} ({} source files)",
        out.recipe.metadata.name,
        out.recipe.metadata.version,
        out.workspace,
        out.manifest.len()
    );
    if settings.write_report {
        info!("wrote report to {}", report_path(&out.workspace));
    }
    Ok(())
}

/// The module entry that must not be mirrored: the recipe file's own name.
fn recipe_file_name(explicit: Option<&Utf8Path>) -> String {
    explicit
        .and_then(Utf8Path::file_name)
        .unwrap_or(RECIPE_FILE_NAME)
        .to_string()
}

fn cmd_package(args: PackageArgs) -> anyhow::Result<()> {
    let merged = args.recipe.load(None, false).context("load recipe")?;
    let settings = PackageSettings {
        workspace: args.recipe.workspace.clone(),
        recipe_dir: merged.recipe_dir,
        inputs: merged.inputs,
        package_root: args.package_root,
        write_report: !args.no_report,
    };

    let out = run_package(&settings, &FsWritePort, tool_info())?;
    for failure in &out.outcome.failures {
        warn!("not packaged: {} -> {}: {}", failure.source, failure.dest, failure.message);
    }
    info!(
        "packaged {} artifact(s) into {}",
        out.outcome.packaged.len(),
        out.plan.package_root
    );
    if !out.info.libs.is_empty() {
        info!("libs: {}", out.info.libs.join(", "));
    }
    Ok(())
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let merged = args.recipe.load(None, false).context("load recipe")?;
    let recipe = merged
        .inputs
        .validate(&merged.recipe_dir)
        .map_err(ToolError::Config)?;
    let pkg = package_info(&recipe.metadata);
    let requires: Vec<&str> = recipe
        .requirements
        .as_ref()
        .map(|r| r.iter().collect())
        .unwrap_or_default();

    match args.format {
        OutputFormat::Text => {
            let meta = &recipe.metadata;
            println!("name:          {}", meta.name);
            println!("version:       {}", meta.version);
            if !meta.description.is_empty() {
                println!("description:   {}", meta.description);
            }
            if !meta.license.is_empty() {
                println!("license:       {}", meta.license);
            }
            println!("module_path:   {}", recipe.module_path);
            println!("artifact_type: {}", meta.artifact_type);
            if requires.is_empty() {
                println!("requires:      (none)");
            } else {
                println!("requires:      {}", requires.join(", "));
            }
            if pkg.libs.is_empty() {
                println!("libs:          (none)");
            } else {
                println!("libs:          {}", pkg.libs.join(", "));
            }
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "metadata": recipe.metadata,
                "module_path": recipe.module_path,
                "requires": recipe.requirements,
                "package_info": pkg,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}

fn cmd_clean(args: CleanArgs) -> anyhow::Result<()> {
    let out = run_clean(&CleanSettings {
        workspace: args.workspace,
    })?;
    if out.removed.is_empty() {
        info!("nothing to clean");
    }
    Ok(())
}

fn cmd_properties(args: PropertiesArgs) -> anyhow::Result<()> {
    use properties::PROPERTY_REGISTRY;

    match args.format {
        OutputFormat::Text => {
            println!("Recipe properties:\n");
            println!("  {:<16} {:<18} SUMMARY", "KEY", "PRESENCE");
            println!("  {:<16} {:<18} -------", "---", "--------");
            for p in PROPERTY_REGISTRY {
                println!("  {:<16} {:<18} {}", p.key, p.presence.label(), p.summary);
            }
            println!();
            println!("Use 'pkgrecipe explain <key>' for details.");
        }
        OutputFormat::Json => {
            let props: Vec<_> = PROPERTY_REGISTRY
                .iter()
                .map(|p| {
                    serde_json::json!({
                        "key": p.key,
                        "presence": p.presence.label(),
                        "summary": p.summary,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&props)?);
        }
    }
    Ok(())
}

fn cmd_explain(args: ExplainArgs) -> anyhow::Result<()> {
    use properties::{list_property_keys, lookup_property};

    let Some(p) = lookup_property(&args.key) else {
        anyhow::bail!(
            "Unknown property: '{}'\n\nAvailable properties: {}",
            args.key,
            list_property_keys().join(", ")
        );
    };

    println!("PROPERTY: {}", p.key);
    println!("--------------------------------------------------------------------------------");
    println!("Presence: {}", p.presence.label());
    println!();
    println!("{}", p.description);
    println!();
    println!("Example:");
    println!("    {}", p.example);
    Ok(())
}
