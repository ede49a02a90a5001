//! Recording fakes shared by the integration tests.
#![allow(dead_code)]

use kodegen_bundler_setup::bundler::{
    Result,
    platform::macos::{CodeSigner, PlistBuddy, prefpane::NestedBuild},
    process::{ProcessExecutor, ProcessOutput},
    settings::{
        CodeSignSettings, IconSpec, ProjectMetadata, SetupConfiguration, SetupTask, TaskKind,
    },
};
use kodegen_bundler_setup::bundler::Collaborators;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Every external invocation, in call order.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn record(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.entries().iter().filter(|e| e.starts_with(prefix)).count()
    }
}

/// Records commands instead of running them.
#[derive(Debug, Clone, Default)]
pub struct RecordingExecutor {
    pub journal: Journal,
    answers: Vec<(String, ProcessOutput)>,
}

impl RecordingExecutor {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            answers: Vec::new(),
        }
    }

    /// Answers invocations of `program` with `output`; everything else
    /// succeeds with empty output.
    pub fn answer(mut self, program: &str, output: ProcessOutput) -> Self {
        self.answers.push((program.to_string(), output));
        self
    }
}

impl ProcessExecutor for RecordingExecutor {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        _working_dir: Option<&Path>,
    ) -> Result<ProcessOutput> {
        self.journal
            .record(format!("exec {} {}", program, args.join(" ")));
        Ok(self
            .answers
            .iter()
            .find(|(answered, _)| answered == program)
            .map(|(_, output)| output.clone())
            .unwrap_or_else(|| ProcessOutput::ok("")))
    }
}

/// Records the nested build and optionally leaves a compiled pane behind.
#[derive(Debug, Clone)]
pub struct FakeNestedBuild {
    pub journal: Journal,
    /// Internal name of the pane to produce; `None` produces nothing.
    pub produce: Option<String>,
}

impl NestedBuild for FakeNestedBuild {
    async fn run(&self, build_file: &Path, tasks: &[&str]) -> Result<()> {
        self.journal
            .record(format!("nested {} {}", build_file.display(), tasks.join(",")));

        if let Some(name) = &self.produce {
            let template = build_file.parent().unwrap();
            let pane = template
                .join("build/sym/Release")
                .join(format!("{name}.prefPane"));
            std::fs::create_dir_all(pane.join("Contents/MacOS")).unwrap();
            std::fs::create_dir_all(pane.join("Contents/Resources")).unwrap();
            std::fs::write(pane.join("Contents/Info.plist"), "<plist/>").unwrap();
            std::fs::write(pane.join("Contents/Resources/service.plist"), "<plist/>").unwrap();
            std::fs::write(pane.join("Contents/MacOS").join(name), "binary").unwrap();
        }
        Ok(())
    }
}

/// Records signing requests.
#[derive(Debug, Clone)]
pub struct RecordingSigner {
    pub journal: Journal,
}

impl CodeSigner for RecordingSigner {
    async fn sign(&self, bundle: &Path, settings: &CodeSignSettings) -> Result<()> {
        self.journal
            .record(format!("sign {} {}", bundle.display(), settings.identity));
        Ok(())
    }
}

pub type Fakes =
    Collaborators<RecordingExecutor, PlistBuddy<RecordingExecutor>, FakeNestedBuild, RecordingSigner>;

/// Collaborators that all record into `journal`.
pub fn fakes(journal: &Journal, produce: Option<&str>) -> Fakes {
    let executor = RecordingExecutor::new(journal);
    Collaborators {
        applier: PlistBuddy::new(executor.clone()),
        executor,
        nested: FakeNestedBuild {
            journal: journal.clone(),
            produce: produce.map(str::to_string),
        },
        signer: RecordingSigner {
            journal: journal.clone(),
        },
    }
}

/// A scratch project with an icon, a jar and a template on disk.
pub struct Project {
    pub dir: tempfile::TempDir,
}

impl Project {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("assets")).unwrap();
        std::fs::write(root.join("assets/reports.icns"), b"icns").unwrap();
        std::fs::create_dir_all(root.join("libs")).unwrap();
        std::fs::write(root.join("libs/reports.jar"), b"jar").unwrap();

        let template = root.join("template");
        std::fs::create_dir_all(template.join("SetupBuilderOSXPrefPane")).unwrap();
        std::fs::write(
            template.join("build.gradle"),
            "xcodebuild { target = 'SetupBuilderOSXPrefPane' }",
        )
        .unwrap();
        std::fs::write(
            template.join("SetupBuilderOSXPrefPane/SetupBuilderOSXPrefPane.m"),
            "@implementation SetupBuilderOSXPrefPane",
        )
        .unwrap();

        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn build_dir(&self) -> PathBuf {
        self.root().join("build/dmg")
    }

    pub fn template(&self) -> PathBuf {
        self.root().join("template")
    }

    /// A setup with icon, main class and main jar configured.
    pub fn setup(&self) -> SetupConfiguration {
        let mut project = ProjectMetadata::new("reports", self.root());
        project.version = Some("2.0.1".into());
        let mut setup = SetupConfiguration::new(project);
        setup.set_vendor("Example Inc.");
        setup.set_application("Report Suite");
        setup.set_app_identifier("com.example.reports");
        setup.set_icons(IconSpec::Single("assets/reports.icns".into()));
        setup.set_main_class("com.example.Main");
        setup.set_main_jar("reports.jar");
        setup
    }

    pub fn task(&self, kind: TaskKind) -> SetupTask {
        SetupTask::new(kind, self.build_dir())
    }
}
