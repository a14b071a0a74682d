//! Default port implementations.

use crate::ports::{BuildContext, Orchestrator, WritePort};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use pkgrecipe_types::report::Phase;
use std::process::Command;
use std::sync::Mutex;
use tracing::{debug, info};

/// Drives CMake: `cmake -S <ws> -B <build>` to configure, `cmake --build <build>` to build.
#[derive(Debug, Clone)]
pub struct CmakeOrchestrator {
    pub program: String,
}

impl Default for CmakeOrchestrator {
    fn default() -> Self {
        Self {
            program: "cmake".to_string(),
        }
    }
}

impl CmakeOrchestrator {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn configure_command(&self, ctx: &BuildContext<'_>) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-S")
            .arg(ctx.workspace)
            .arg("-B")
            .arg(ctx.build_dir)
            .arg(format!("-DCMAKE_BUILD_TYPE={}", ctx.settings.build_type))
            .arg(format!(
                "-DBUILD_SHARED_LIBS={}",
                if ctx.settings.shared { "ON" } else { "OFF" }
            ))
            .current_dir(ctx.workspace);
        cmd
    }

    pub fn build_command(&self, ctx: &BuildContext<'_>) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--build")
            .arg(ctx.build_dir)
            .arg("--config")
            .arg(&ctx.settings.build_type)
            .current_dir(ctx.workspace);
        cmd
    }
}

fn run(mut cmd: Command, phase: Phase) -> anyhow::Result<()> {
    debug!(?cmd, %phase, "running orchestrator");
    let status = cmd
        .status()
        .with_context(|| format!("spawn {phase} command {:?}", cmd))?;
    if !status.success() {
        anyhow::bail!("{phase} command {:?} exited with {}", cmd, status);
    }
    Ok(())
}

impl Orchestrator for CmakeOrchestrator {
    fn configure(&self, ctx: &BuildContext<'_>) -> anyhow::Result<()> {
        info!(
            build_type = %ctx.settings.build_type,
            shared = ctx.settings.shared,
            os = ctx.settings.os.as_deref().unwrap_or("-"),
            compiler = ctx.settings.compiler.as_deref().unwrap_or("-"),
            arch = ctx.settings.arch.as_deref().unwrap_or("-"),
            "configuring {}", ctx.metadata.name
        );
        run(self.configure_command(ctx), Phase::Configure)
    }

    fn build(&self, ctx: &BuildContext<'_>) -> anyhow::Result<()> {
        info!("building {}", ctx.metadata.name);
        run(self.build_command(ctx), Phase::Build)
    }
}

/// One lifecycle call seen by [`RecordingOrchestrator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub phase: Phase,
    pub workspace: Utf8PathBuf,
    pub build_type: String,
}

/// Records lifecycle calls instead of running anything. Can be primed to fail one phase.
#[derive(Debug, Default)]
pub struct RecordingOrchestrator {
    calls: Mutex<Vec<RecordedCall>>,
    fail_on: Option<Phase>,
}

impl RecordingOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(phase: Phase) -> Self {
        Self {
            calls: Mutex::default(),
            fail_on: Some(phase),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn phases(&self) -> Vec<Phase> {
        self.calls().into_iter().map(|c| c.phase).collect()
    }

    fn record(&self, phase: Phase, ctx: &BuildContext<'_>) -> anyhow::Result<()> {
        self.calls
            .lock()
            .map_err(|_| anyhow::anyhow!("recording orchestrator lock poisoned"))?
            .push(RecordedCall {
                phase,
                workspace: ctx.workspace.to_path_buf(),
                build_type: ctx.settings.build_type.clone(),
            });
        if self.fail_on == Some(phase) {
            anyhow::bail!("{phase} failed (primed)");
        }
        Ok(())
    }
}

impl Orchestrator for RecordingOrchestrator {
    fn configure(&self, ctx: &BuildContext<'_>) -> anyhow::Result<()> {
        self.record(Phase::Configure, ctx)
    }

    fn build(&self, ctx: &BuildContext<'_>) -> anyhow::Result<()> {
        self.record(Phase::Build, ctx)
    }
}

/// Filesystem write operations.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;
        Ok(())
    }

    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        fs::create_dir_all(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::OrchestratorSettings;
    use pkgrecipe_types::recipe::{ArtifactType, RecipeMetadata};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn metadata() -> RecipeMetadata {
        RecipeMetadata {
            name: "hello".to_string(),
            version: "1.0.0".to_string(),
            description: String::new(),
            license: String::new(),
            artifact_type: ArtifactType::Lib,
            artifact_name: "hello".to_string(),
            user: None,
            channel: None,
            url: None,
        }
    }

    fn args(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn cmake_commands_carry_build_type_and_shared_flag() {
        let meta = metadata();
        let settings = OrchestratorSettings {
            shared: true,
            build_type: "Debug".to_string(),
            ..OrchestratorSettings::default()
        };
        let ctx = BuildContext {
            metadata: &meta,
            requirements: None,
            workspace: Utf8Path::new("/ws"),
            build_dir: Utf8Path::new("/ws/build"),
            settings: &settings,
        };
        let cmake = CmakeOrchestrator::default();

        assert_eq!(
            args(&cmake.configure_command(&ctx)),
            vec![
                "-S",
                "/ws",
                "-B",
                "/ws/build",
                "-DCMAKE_BUILD_TYPE=Debug",
                "-DBUILD_SHARED_LIBS=ON",
            ]
        );
        assert_eq!(
            args(&cmake.build_command(&ctx)),
            vec!["--build", "/ws/build", "--config", "Debug"]
        );
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let temp = TempDir::new().unwrap();
        let ws = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        let meta = metadata();
        let settings = OrchestratorSettings::default();
        let build_dir = ws.join("build");
        let ctx = BuildContext {
            metadata: &meta,
            requirements: None,
            workspace: &ws,
            build_dir: &build_dir,
            settings: &settings,
        };
        let err = CmakeOrchestrator::new("pkgrecipe-no-such-cmake")
            .configure(&ctx)
            .unwrap_err();
        assert!(format!("{err:#}").contains("spawn configure command"));
    }

    #[test]
    fn recording_orchestrator_fails_primed_phase() {
        let meta = metadata();
        let settings = OrchestratorSettings::default();
        let ctx = BuildContext {
            metadata: &meta,
            requirements: None,
            workspace: Utf8Path::new("/ws"),
            build_dir: Utf8Path::new("/ws/build"),
            settings: &settings,
        };
        let orch = RecordingOrchestrator::failing(Phase::Build);
        assert!(orch.configure(&ctx).is_ok());
        assert!(orch.build(&ctx).is_err());
        assert_eq!(orch.phases(), vec![Phase::Configure, Phase::Build]);
        assert_eq!(orch.calls()[0].build_type, "Release");
    }

    #[test]
    fn fs_write_port_creates_parents() {
        let temp = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        let path = root.join(".pkgrecipe").join("report.json");
        FsWritePort.write_file(&path, b"{}").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn fs_write_port_errors_name_the_path() {
        let temp = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        std::fs::write(root.join("blocker"), "").unwrap();

        let path = root.join("blocker").join("report.json");
        let err = FsWritePort.write_file(&path, b"{}").unwrap_err();
        assert!(format!("{err:#}").contains("blocker"), "{err:#}");
    }
}
