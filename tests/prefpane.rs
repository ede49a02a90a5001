mod common;

use common::{Journal, Project, fakes};
use kodegen_bundler_setup::bundler::{
    ArtifactKind, run_pipeline,
    platform::macos::{
        BundleAssembler, PaneHost, PrefPaneOrchestrator,
        prefpane::DirectoryTemplateStore,
    },
    settings::{Application, CodeSignSettings, PreferencesLink, Service, TaskKind},
};

fn service() -> Service {
    Service {
        application: Application::named("Report Server"),
        keep_alive: true,
        ..Default::default()
    }
}

fn links() -> Vec<PreferencesLink> {
    vec![
        PreferencesLink::new("Open Console", "http://localhost:9000", false),
        PreferencesLink::new("Restart", "restart", true),
    ]
}

#[tokio::test]
async fn stages_run_in_order_and_sign_last() {
    let project = Project::new();
    let setup = project.setup();
    let mut task = project.task(TaskKind::Pkg);
    task.preferences_links = links();
    task.code_sign = Some(CodeSignSettings {
        identity: "-".into(),
        entitlements: None,
        hardened_runtime: true,
    });
    let journal = Journal::default();
    let templates = DirectoryTemplateStore::new(project.template());

    let artifacts = run_pipeline(
        &setup,
        &task,
        &[],
        &[service()],
        Some(&templates),
        &fakes(&journal, Some("ReportServer")),
    )
    .await
    .unwrap();

    let bundle = project.build_dir().join("Report Server.app");
    let pane = bundle.join("Contents/Resources/Report Server.prefPane");
    assert_eq!(artifacts.len(), 2);
    assert_eq!(artifacts[0].kind, ArtifactKind::Application);
    assert_eq!(artifacts[0].path, bundle);
    assert_eq!(artifacts[1].kind, ArtifactKind::PreferencePane);
    assert_eq!(artifacts[1].path, pane);

    assert!(pane.join("Contents/Resources/ProductIcon.icns").is_file());
    assert!(pane.join("Contents/MacOS/ReportServer").is_file());
    assert!(!project.build_dir().join("tmp/prefpane/ReportServer").exists());

    let entries = journal.entries();
    let work_dir = project.build_dir().join("tmp/prefpane/ReportServer");
    assert_eq!(
        entries[0],
        format!("nested {} clean,xcodebuild", work_dir.join("build.gradle").display())
    );
    assert!(entries[1].starts_with("exec chmod -R a+r"));
    assert!(entries[2].starts_with("exec find"));
    assert_eq!(entries.last().unwrap(), &format!("sign {} -", pane.display()));

    let info = pane.join("Contents/Info.plist").display().to_string();
    assert_eq!(
        entries[3],
        format!(
            "exec /usr/libexec/PlistBuddy -c Set :CFBundleIdentifier \
             com.example.reports.ReportServer.prefPane {info}"
        )
    );

    let service_plist = format!(
        " {}",
        pane.join("Contents/Resources/service.plist").display()
    );
    let commands: Vec<&str> = entries
        .iter()
        .filter_map(|e| e.strip_prefix("exec /usr/libexec/PlistBuddy -c "))
        .filter_map(|e| e.strip_suffix(service_plist.as_str()))
        .filter(|e| e.contains(":starter"))
        .collect();
    assert_eq!(
        commands,
        [
            "Delete :starter",
            "Add :starter array",
            "Add :starter: dict",
            "Add :starter:0:title string Open Console",
            "Add :starter:0:action string http://localhost:9000",
            "Add :starter:0:asuser string root",
            "Add :starter:0:asroot bool NO",
            "Add :starter: dict",
            "Add :starter:1:title string Restart",
            "Add :starter:1:action string restart",
            "Add :starter:1:asuser string root",
            "Add :starter:1:asroot bool YES",
        ]
    );
    assert_eq!(journal.count("sign "), 1);
}

#[tokio::test]
async fn template_is_materialized_with_internal_name() {
    let project = Project::new();
    let setup = project.setup();
    let task = project.task(TaskKind::Pkg);
    let service = service();
    let journal = Journal::default();
    let collaborators = fakes(&journal, Some("ReportServer"));

    let pane = PrefPaneOrchestrator::new(
        &setup,
        &task,
        &service,
        &collaborators.applier,
        &collaborators.nested,
        &collaborators.signer,
    );
    assert_eq!(pane.internal_name(), "ReportServer");

    let state = pane
        .init(&DirectoryTemplateStore::new(project.template()))
        .await
        .unwrap();
    let source = state.template_dir().join("ReportServer/ReportServer.m");
    assert_eq!(
        std::fs::read_to_string(source).unwrap(),
        "@implementation ReportServer"
    );
    assert_eq!(
        std::fs::read_to_string(state.build_file()).unwrap(),
        "xcodebuild { target = 'ReportServer' }"
    );
    assert!(!state.template_dir().join("SetupBuilderOSXPrefPane").exists());

    pane.build(&state).await.unwrap();
    let mut assembler = BundleAssembler::new(&setup, &task, &collaborators.executor);
    assembler.assemble(&service.application).await.unwrap();
    let host = PaneHost::of(&assembler).unwrap();
    pane.create(state, &host).await.unwrap();

    // unsigned without code_sign
    assert_eq!(journal.count("sign "), 0);
}

#[tokio::test]
async fn missing_pane_stops_before_patching() {
    let project = Project::new();
    let setup = project.setup();
    let mut task = project.task(TaskKind::Pkg);
    task.code_sign = Some(CodeSignSettings {
        identity: "-".into(),
        entitlements: None,
        hardened_runtime: true,
    });
    let journal = Journal::default();

    let err = run_pipeline(
        &setup,
        &task,
        &[],
        &[service()],
        Some(&DirectoryTemplateStore::new(project.template())),
        &fakes(&journal, None),
    )
    .await
    .unwrap_err();

    assert!(err.is_missing_artifact(), "{err}");
    assert_eq!(journal.count("nested "), 1);
    assert_eq!(journal.count("exec /usr/libexec/PlistBuddy"), 0);
    assert_eq!(journal.count("sign "), 0);
}

#[tokio::test]
async fn services_without_template_are_rejected_up_front() {
    let project = Project::new();
    let setup = project.setup();
    let task = project.task(TaskKind::Pkg);
    let journal = Journal::default();

    let err = run_pipeline(
        &setup,
        &task,
        &[Application::named("Report Designer")],
        &[service()],
        None::<&DirectoryTemplateStore>,
        &fakes(&journal, Some("ReportServer")),
    )
    .await
    .unwrap_err();

    assert!(err.is_configuration());
    assert!(journal.entries().is_empty());
    assert!(!project.build_dir().join("Report Designer.app").exists());
}

#[tokio::test]
async fn unnamed_service_cannot_derive_a_pane_name() {
    let project = Project::new();
    let mut setup = project.setup();
    setup.set_application("***");
    let task = project.task(TaskKind::Pkg);
    let journal = Journal::default();

    let err = run_pipeline(
        &setup,
        &task,
        &[],
        &[Service::default()],
        Some(&DirectoryTemplateStore::new(project.template())),
        &fakes(&journal, Some("x")),
    )
    .await
    .unwrap_err();

    assert!(err.is_configuration());
    assert!(journal.entries().is_empty());
}

#[tokio::test]
async fn service_name_with_separators_is_rejected() {
    let project = Project::new();
    let setup = project.setup();
    let task = project.task(TaskKind::Pkg);
    let journal = Journal::default();
    let service = Service {
        application: Application::named("../Evil"),
        ..Default::default()
    };

    let err = run_pipeline(
        &setup,
        &task,
        &[],
        &[service],
        Some(&DirectoryTemplateStore::new(project.template())),
        &fakes(&journal, Some("Evil")),
    )
    .await
    .unwrap_err();

    assert!(err.is_configuration(), "{err}");
    assert!(journal.entries().is_empty());
    assert!(!project.build_dir().join("tmp/prefpane/Evil").exists());
}
