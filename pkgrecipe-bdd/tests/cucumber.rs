use camino::Utf8PathBuf;
use cucumber::{World, given, then, when};
use fs_err as fs;
use pkgrecipe_bdd::Layout;
use pkgrecipe_core::RecipeInputs;
use pkgrecipe_core::adapters::{FsWritePort, RecordingOrchestrator};
use pkgrecipe_core::pipeline::{
    BuildOutcome, PackageRunOutcome, report_path, run_build, run_package,
};
use pkgrecipe_core::settings::{PackageSettings, RecipeSettings};
use pkgrecipe_types::report::{Phase, ToolInfo};

#[derive(Debug, Default, World)]
pub struct RecipeWorld {
    layout: Option<Layout>,
    inputs: RecipeInputs,
    orchestrator: RecordingOrchestrator,
    build: Option<BuildOutcome>,
    package: Option<PackageRunOutcome>,
    /// Exit code of the last failed run.
    exit_code: Option<u8>,
}

fn layout(world: &RecipeWorld) -> &Layout {
    world.layout.as_ref().expect("layout set")
}

fn workspace(world: &RecipeWorld) -> Utf8PathBuf {
    layout(world).workspace.clone()
}

fn tool() -> ToolInfo {
    ToolInfo {
        name: "pkgrecipe".to_string(),
        version: Some("0.0.0-bdd".to_string()),
    }
}

// ============================================================================
// Given
// ============================================================================

#[given(expr = "a module {string} with sources")]
async fn module_with_sources(world: &mut RecipeWorld, name: String) {
    let layout = Layout::new(&name).unwrap();
    layout
        .module_file("CMakeLists.txt", &format!("project({name} C)\n"))
        .unwrap();
    layout.module_file("recipe.toml", "[recipe]\n").unwrap();
    layout
        .module_file("src/hello.c", "int hello(void) { return 1; }\n")
        .unwrap();
    layout.module_file("src/hello.h", "int hello(void);\n").unwrap();
    world.layout = Some(layout);
}

#[given(expr = "a library recipe named {string}")]
async fn library_recipe(world: &mut RecipeWorld, name: String) {
    world.inputs.insert("version", "1.0.0");
    world.inputs.insert("artifact_type", "lib");
    world.inputs.insert("artifact_name", name);
}

#[given(expr = "a recipe with artifact type {string} and no artifact name")]
async fn recipe_without_artifact_name(world: &mut RecipeWorld, artifact_type: String) {
    world.inputs.insert("version", "1.0.0");
    world.inputs.insert("artifact_type", artifact_type);
}

#[given(expr = "the recipe requires {string}")]
async fn recipe_requires(world: &mut RecipeWorld, requires: String) {
    world.inputs.insert("requires", requires);
}

#[given(expr = "the workspace contains a stale file {string}")]
async fn stale_workspace_file(world: &mut RecipeWorld, rel: String) {
    layout(world).workspace_file(&rel, "stale\n").unwrap();
}

#[given("an orchestrator that fails to configure")]
async fn failing_orchestrator(world: &mut RecipeWorld) {
    world.orchestrator = RecordingOrchestrator::failing(Phase::Configure);
}

// ============================================================================
// When
// ============================================================================

#[when("I build the recipe")]
async fn build_recipe(world: &mut RecipeWorld) {
    let layout = layout(world);
    let settings = RecipeSettings {
        workspace: layout.workspace.clone(),
        recipe_dir: layout.module.clone(),
        inputs: world.inputs.clone(),
        ..RecipeSettings::default()
    };
    match run_build(&settings, &world.orchestrator, &FsWritePort, tool()) {
        Ok(out) => {
            world.build = Some(out);
            world.exit_code = None;
        }
        Err(e) => {
            world.build = None;
            world.exit_code = Some(e.exit_code());
        }
    }
}

#[when(expr = "the build produced {string}")]
async fn build_produced(world: &mut RecipeWorld, rel: String) {
    layout(world)
        .workspace_file(&format!("build/{rel}"), "artifact")
        .unwrap();
}

#[when("I package the recipe")]
async fn package_recipe(world: &mut RecipeWorld) {
    let layout = layout(world);
    let settings = PackageSettings {
        workspace: layout.workspace.clone(),
        recipe_dir: layout.module.clone(),
        inputs: world.inputs.clone(),
        ..PackageSettings::default()
    };
    world.package = Some(run_package(&settings, &FsWritePort, tool()).expect("package"));
}

// ============================================================================
// Then
// ============================================================================

#[then("the build succeeds")]
async fn build_succeeds(world: &mut RecipeWorld) {
    assert!(
        world.build.is_some(),
        "expected success, got exit code {:?}",
        world.exit_code
    );
}

#[then(expr = "the build fails with exit code {int}")]
async fn build_fails(world: &mut RecipeWorld, code: u8) {
    assert!(world.build.is_none(), "expected the build to fail");
    assert_eq!(world.exit_code, Some(code));
}

#[then("the workspace mirrors the module without its recipe file")]
async fn workspace_mirrors_module(world: &mut RecipeWorld) {
    let ws = workspace(world);
    assert!(ws.join("CMakeLists.txt").is_file());
    assert!(ws.join("src/hello.c").is_file());
    assert!(ws.join("src/hello.h").is_file());
    assert!(!ws.join("recipe.toml").exists());
}

#[then(expr = "the manifest lists {int} source files")]
async fn manifest_lists(world: &mut RecipeWorld, count: usize) {
    let manifest = fs::read_to_string(workspace(world).join("filelist.txt")).unwrap();
    assert_eq!(manifest.lines().count(), count);
    assert!(manifest.lines().all(|l| l.contains("/src/")));
}

#[then(expr = "the workspace has no file {string}")]
async fn workspace_lacks(world: &mut RecipeWorld, rel: String) {
    assert!(!workspace(world).join(rel).exists());
}

#[then("the workspace was not populated")]
async fn workspace_not_populated(world: &mut RecipeWorld) {
    assert!(!workspace(world).join("src").exists());
}

#[then("the orchestrator ran configure then build")]
async fn orchestrator_ran_both(world: &mut RecipeWorld) {
    assert_eq!(world.orchestrator.phases(), vec![Phase::Configure, Phase::Build]);
}

#[then("the orchestrator ran configure only")]
async fn orchestrator_ran_configure(world: &mut RecipeWorld) {
    assert_eq!(world.orchestrator.phases(), vec![Phase::Configure]);
}

#[then("the orchestrator was not called")]
async fn orchestrator_not_called(world: &mut RecipeWorld) {
    assert!(world.orchestrator.calls().is_empty());
}

#[then(expr = "the report verdict is {string} at phase {string}")]
async fn report_verdict(world: &mut RecipeWorld, status: String, phase: String) {
    let report = fs::read_to_string(report_path(&workspace(world))).unwrap();
    let v: serde_json::Value = serde_json::from_str(&report).unwrap();
    assert_eq!(v["verdict"]["status"], status.as_str());
    assert_eq!(v["verdict"]["phase"], phase.as_str());
}

#[then(expr = "the resolved requirements are {string} and {string}")]
async fn resolved_requirements(world: &mut RecipeWorld, first: String, second: String) {
    let build = world.build.as_ref().expect("build outcome");
    let requires: Vec<&str> = build
        .recipe
        .requirements
        .as_ref()
        .map(|r| r.iter().collect())
        .unwrap_or_default();
    assert_eq!(requires, vec![first.as_str(), second.as_str()]);
}

#[then(expr = "the package contains {string}")]
async fn package_contains(world: &mut RecipeWorld, rel: String) {
    let package = world.package.as_ref().expect("package outcome");
    assert!(package.plan.package_root.join(&rel).is_file(), "missing {rel}");
}

#[then(expr = "consumers link against {string}")]
async fn consumers_link(world: &mut RecipeWorld, lib: String) {
    let package = world.package.as_ref().expect("package outcome");
    assert_eq!(package.info.libs, vec![lib]);
}

#[tokio::main]
async fn main() {
    let features_path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("features");
    RecipeWorld::cucumber().run(features_path).await;
}
