//! Writes a Java application bundle from a collected [`AppBundlerTask`].
//!
//! The assembler only fills in an [`AppBundlerTask`]; [`AppBundler::execute`]
//! turns it into `<Name>.app/Contents/{MacOS,Resources,Java,PlugIns}` with an
//! `Info.plist`, the icon, a launcher and the embedded runtime.

use crate::bundler::{
    error::{Context, Error, ErrorExt, Result},
    settings::Arch,
    utils::fs,
};
use handlebars::Handlebars;
use plist::Value;
use std::path::{Path, PathBuf};

/// Shell launcher used when no native launcher stub is configured.
///
/// Every interpolated value is single-quoted by [`shell_quote`].
const LAUNCHER_TEMPLATE: &str = r#"#!/bin/sh
APP_ROOT="$(cd "$(dirname "$0")/../.." && pwd)"
{{#if app_directory}}cd "$APP_ROOT"/{{app_directory}} || exit 1
{{else}}{{#if working_directory}}cd {{working_directory}} || exit 1
{{else}}cd "$APP_ROOT/Contents/Java" || exit 1
{{/if}}{{/if}}{{#if runtime}}JAVA="$APP_ROOT/Contents/PlugIns"/{{runtime}}/bin/java
{{else}}JAVA="${JAVA_HOME:+$JAVA_HOME/bin/}java"
{{/if}}{{#if library_path}}export DYLD_LIBRARY_PATH="$APP_ROOT/Contents/MacOS${DYLD_LIBRARY_PATH:+:$DYLD_LIBRARY_PATH}"
{{/if}}exec "$JAVA"{{#each options}} {{this}}{{/each}} -Xdock:name={{name}}{{#if main_jar}} -cp "$APP_ROOT/Contents/Java"/{{main_jar}}{{/if}}{{#if main_class}} {{main_class}}{{/if}}{{#each arguments}} {{this}}{{/each}} "$@"
"#;

/// Prefix of working directories inside the bundle.
const APP_ROOT_PREFIX: &str = "$APP_ROOT/";

/// Quotes `value` as one POSIX shell word.
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// A document type association.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleDocument {
    /// Comma separated file extensions.
    pub extensions: String,
    pub name: String,
    /// `Viewer` or `Editor`.
    pub role: String,
    /// Icon file shown for the documents.
    pub icon: PathBuf,
}

/// The runtime to embed with its copy filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleRuntime {
    pub dir: PathBuf,
    /// Glob patterns relative to `dir`; empty embeds everything.
    pub includes: Vec<String>,
    /// Glob patterns relative to `dir` left out after includes.
    pub excludes: Vec<String>,
}

/// Everything the bundle writer needs, collected phase by phase.
#[derive(Debug, Clone, Default)]
pub struct AppBundlerTask {
    pub output_directory: PathBuf,
    pub name: String,
    pub display_name: String,
    pub version: String,
    pub short_version: String,
    pub identifier: String,
    pub executable_name: String,
    pub working_directory: Option<String>,
    pub main_class_name: Option<String>,
    pub jar_launcher_name: Option<String>,
    pub options: Vec<String>,
    pub arguments: Vec<String>,
    pub ignore_psn: bool,
    pub copyright: String,
    pub icon: Option<PathBuf>,
    pub documents: Vec<BundleDocument>,
    pub schemes: Vec<String>,
    pub architectures: Vec<Arch>,
    pub library_paths: Vec<PathBuf>,
    pub runtime: Option<BundleRuntime>,
    /// Directory name of the runtime below `Contents/PlugIns`.
    pub runtime_target: String,
    /// Native launcher stub; a shell launcher is rendered when unset.
    pub launcher: Option<PathBuf>,
}

impl AppBundlerTask {
    /// Path of the bundle this task produces.
    pub fn bundle_path(&self) -> PathBuf {
        self.output_directory.join(format!("{}.app", self.name))
    }
}

#[derive(serde::Serialize)]
struct LauncherContext<'a> {
    name: &'a str,
    /// Working directory relative to the bundle root.
    app_directory: Option<&'a str>,
    working_directory: Option<&'a str>,
    runtime: Option<&'a str>,
    library_path: bool,
    options: &'a [String],
    main_jar: Option<&'a str>,
    main_class: Option<&'a str>,
    arguments: &'a [String],
}

/// Writes application bundles.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppBundler;

impl AppBundler {
    /// Creates the bundle described by `task`, replacing an existing one.
    pub async fn execute(&self, task: &AppBundlerTask) -> Result<PathBuf> {
        if task.name.is_empty() {
            return Err(Error::GenericError("bundle name is required".into()));
        }

        let app_path = task.bundle_path();
        log::info!("Writing bundle {}", app_path.display());

        let contents_dir = app_path.join("Contents");
        let macos_dir = contents_dir.join("MacOS");
        let resources_dir = contents_dir.join("Resources");
        let java_dir = contents_dir.join("Java");
        let plugins_dir = contents_dir.join("PlugIns");

        fs::create_dir_all(&app_path, true).await?;
        for dir in [&macos_dir, &resources_dir, &java_dir, &plugins_dir] {
            fs::create_dir_all(dir, false).await?;
        }

        if let Some(icon) = &task.icon {
            let name = icon
                .file_name()
                .with_context(|| format!("invalid icon path {}", icon.display()))?;
            fs::copy_file(icon, &resources_dir.join(name)).await?;
        }

        for library in &task.library_paths {
            let name = library
                .file_name()
                .with_context(|| format!("invalid library path {}", library.display()))?;
            fs::copy_path(library, &macos_dir.join(name))
                .await
                .with_context(|| format!("copying native library {}", library.display()))?;
        }

        if let Some(runtime) = &task.runtime {
            copy_runtime(runtime, &plugins_dir.join(&task.runtime_target)).await?;
        }

        write_launcher(task, &macos_dir.join(&task.executable_name)).await?;

        let plist_path = contents_dir.join("Info.plist");
        Value::Dictionary(info_plist(task))
            .to_file_xml(&plist_path)
            .map_err(Error::Plist)?;

        tokio::fs::write(contents_dir.join("PkgInfo"), b"APPL????")
            .await
            .fs_context("writing PkgInfo", &contents_dir)?;

        Ok(app_path)
    }
}

/// Builds the bundle's `Info.plist` dictionary.
pub fn info_plist(task: &AppBundlerTask) -> plist::Dictionary {
    let strings = |values: &[String]| {
        Value::Array(values.iter().cloned().map(Value::String).collect())
    };
    let file_name = |path: &Path| {
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    };

    let mut dict = plist::Dictionary::new();

    dict.insert("CFBundleDevelopmentRegion".into(), "English".into());
    dict.insert("CFBundleExecutable".into(), task.executable_name.clone().into());
    dict.insert("CFBundleIdentifier".into(), task.identifier.clone().into());
    dict.insert("CFBundleDisplayName".into(), task.display_name.clone().into());
    dict.insert("CFBundleName".into(), task.name.clone().into());
    dict.insert("CFBundleInfoDictionaryVersion".into(), "6.0".into());
    dict.insert("CFBundlePackageType".into(), "APPL".into());
    dict.insert("CFBundleSignature".into(), "????".into());
    dict.insert("CFBundleShortVersionString".into(), task.short_version.clone().into());
    dict.insert("CFBundleVersion".into(), task.version.clone().into());
    dict.insert("NSHumanReadableCopyright".into(), task.copyright.clone().into());
    dict.insert("NSHighResolutionCapable".into(), true.into());

    if let Some(icon) = &task.icon {
        dict.insert("CFBundleIconFile".into(), file_name(icon).into());
    }

    if !task.architectures.is_empty() {
        dict.insert(
            "LSArchitecturePriority".into(),
            Value::Array(
                task.architectures
                    .iter()
                    .map(|arch| Value::String(arch.plist_name().to_string()))
                    .collect(),
            ),
        );
    }

    if task.runtime.is_some() {
        dict.insert("JVMRuntime".into(), task.runtime_target.clone().into());
    }
    if let Some(main_class) = &task.main_class_name {
        dict.insert("JVMMainClassName".into(), main_class.clone().into());
    }
    if let Some(jar) = &task.jar_launcher_name {
        dict.insert("JVMJarLauncherName".into(), jar.clone().into());
    }
    if let Some(dir) = &task.working_directory {
        dict.insert("WorkingDirectory".into(), dir.clone().into());
    }
    if !task.library_paths.is_empty() {
        dict.insert("JVMLibraryPath".into(), "$APP_ROOT/Contents/MacOS".into());
    }
    dict.insert("JVMOptions".into(), strings(&task.options));
    dict.insert("JVMArguments".into(), strings(&task.arguments));
    dict.insert("IgnorePSN".into(), task.ignore_psn.into());

    if !task.documents.is_empty() {
        let documents = task
            .documents
            .iter()
            .map(|doc| {
                let mut entry = plist::Dictionary::new();
                let extensions: Vec<String> = doc
                    .extensions
                    .split(',')
                    .map(str::trim)
                    .filter(|ext| !ext.is_empty())
                    .map(str::to_string)
                    .collect();
                entry.insert("CFBundleTypeExtensions".into(), strings(&extensions));
                entry.insert("CFBundleTypeName".into(), doc.name.clone().into());
                entry.insert("CFBundleTypeRole".into(), doc.role.clone().into());
                entry.insert("CFBundleTypeIconFile".into(), file_name(&doc.icon).into());
                Value::Dictionary(entry)
            })
            .collect();
        dict.insert("CFBundleDocumentTypes".into(), Value::Array(documents));
    }

    if !task.schemes.is_empty() {
        let mut url_type = plist::Dictionary::new();
        url_type.insert("CFBundleURLName".into(), task.identifier.clone().into());
        url_type.insert("CFBundleURLSchemes".into(), strings(&task.schemes));
        dict.insert(
            "CFBundleURLTypes".into(),
            Value::Array(vec![Value::Dictionary(url_type)]),
        );
    }

    dict
}

/// Copies the runtime honouring its include and exclude filters.
async fn copy_runtime(runtime: &BundleRuntime, target: &Path) -> Result<()> {
    let includes = compile_patterns(&runtime.includes)?;
    let excludes = compile_patterns(&runtime.excludes)?;

    log::info!(
        "Embedding runtime {} into {}",
        runtime.dir.display(),
        target.display()
    );

    fs::copy_dir_filtered(&runtime.dir, target, move |rel| {
        (includes.is_empty() || matches_any(&includes, rel)) && !matches_any(&excludes, rel)
    })
    .await
    .context("copying runtime")
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<glob::Pattern>> {
    patterns
        .iter()
        .map(|pattern| glob::Pattern::new(pattern).map_err(Error::from))
        .collect()
}

/// A path matches when a pattern matches it or one of its parent directories.
fn matches_any(patterns: &[glob::Pattern], rel: &Path) -> bool {
    rel.ancestors()
        .filter(|path| !path.as_os_str().is_empty())
        .any(|path| patterns.iter().any(|pattern| pattern.matches_path(path)))
}

async fn write_launcher(task: &AppBundlerTask, target: &Path) -> Result<()> {
    match &task.launcher {
        Some(stub) => fs::copy_file(stub, target)
            .await
            .with_context(|| format!("copying launcher stub {}", stub.display()))?,
        None => {
            let mut handlebars = Handlebars::new();
            handlebars.register_escape_fn(shell_quote);
            handlebars.register_template_string("launcher", LAUNCHER_TEMPLATE)?;

            let working_directory = task.working_directory.as_deref();
            let app_directory =
                working_directory.and_then(|dir| dir.strip_prefix(APP_ROOT_PREFIX));
            let context = LauncherContext {
                name: &task.display_name,
                app_directory,
                working_directory: working_directory.filter(|_| app_directory.is_none()),
                runtime: task.runtime.as_ref().map(|_| task.runtime_target.as_str()),
                library_path: !task.library_paths.is_empty(),
                options: &task.options,
                main_jar: task.jar_launcher_name.as_deref(),
                main_class: task.main_class_name.as_deref(),
                arguments: &task.arguments,
            };
            let script = handlebars.render("launcher", &context)?;
            tokio::fs::write(target, script)
                .await
                .fs_context("writing launcher", target)?;
        }
    }

    fs::set_executable(target).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(output: &Path) -> AppBundlerTask {
        AppBundlerTask {
            output_directory: output.to_path_buf(),
            name: "Report Designer".into(),
            display_name: "Report Designer".into(),
            version: "2.0.1".into(),
            short_version: "2.0".into(),
            identifier: "com.example.designer".into(),
            executable_name: "designer".into(),
            main_class_name: Some("com.example.Designer".into()),
            jar_launcher_name: Some("designer.jar".into()),
            options: vec!["-Xmx1g".into()],
            arguments: vec!["--open-last".into()],
            ignore_psn: true,
            copyright: "© Copyright 2026 by Example".into(),
            schemes: vec!["designer".into()],
            runtime_target: "jre".into(),
            ..Default::default()
        }
    }

    #[test]
    fn info_plist_carries_identity_and_jvm_keys() {
        let mut task = task(Path::new("/tmp"));
        task.documents.push(BundleDocument {
            extensions: "rpt,rptx".into(),
            name: "Report".into(),
            role: "Editor".into(),
            icon: PathBuf::from("/build/designer.icns"),
        });
        task.architectures = vec![Arch::Arm64, Arch::X86_64];

        let dict = info_plist(&task);
        assert_eq!(
            dict.get("CFBundleIdentifier").and_then(Value::as_string),
            Some("com.example.designer")
        );
        assert_eq!(
            dict.get("CFBundleShortVersionString").and_then(Value::as_string),
            Some("2.0")
        );
        assert_eq!(
            dict.get("JVMMainClassName").and_then(Value::as_string),
            Some("com.example.Designer")
        );
        assert!(dict.get("JVMRuntime").is_none());

        let docs = dict.get("CFBundleDocumentTypes").and_then(Value::as_array).unwrap();
        let doc = docs[0].as_dictionary().unwrap();
        let extensions = doc.get("CFBundleTypeExtensions").and_then(Value::as_array).unwrap();
        assert_eq!(extensions.len(), 2);
        assert_eq!(
            doc.get("CFBundleTypeIconFile").and_then(Value::as_string),
            Some("designer.icns")
        );

        let archs = dict.get("LSArchitecturePriority").and_then(Value::as_array).unwrap();
        assert_eq!(archs[0].as_string(), Some("arm64"));
    }

    #[test]
    fn ancestors_match_directory_patterns() {
        let patterns = compile_patterns(&["lib".to_string(), "bin/java".to_string()]).unwrap();
        assert!(matches_any(&patterns, Path::new("lib/server/libjvm.dylib")));
        assert!(matches_any(&patterns, Path::new("bin/java")));
        assert!(!matches_any(&patterns, Path::new("bin/jshell")));
    }

    #[tokio::test]
    async fn execute_writes_layout_and_launcher() {
        let out = tempfile::tempdir().unwrap();
        let runtime = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(runtime.path().join("bin")).unwrap();
        std::fs::write(runtime.path().join("bin/java"), b"#!java").unwrap();
        std::fs::write(runtime.path().join("bin/jshell"), b"#!jshell").unwrap();

        let mut task = task(out.path());
        task.runtime = Some(BundleRuntime {
            dir: runtime.path().to_path_buf(),
            includes: vec!["bin/java".into()],
            excludes: vec![],
        });

        let app = AppBundler.execute(&task).await.unwrap();

        assert_eq!(app, out.path().join("Report Designer.app"));
        for dir in ["MacOS", "Resources", "Java", "PlugIns"] {
            assert!(app.join("Contents").join(dir).is_dir(), "{dir} missing");
        }
        assert!(app.join("Contents/PlugIns/jre/bin/java").is_file());
        assert!(!app.join("Contents/PlugIns/jre/bin/jshell").exists());

        let launcher = std::fs::read_to_string(app.join("Contents/MacOS/designer")).unwrap();
        assert!(launcher.contains("\"$APP_ROOT/Contents/PlugIns\"/'jre'/bin/java"));
        assert!(launcher.contains(" 'com.example.Designer' "));
        assert!(launcher.contains(" '--open-last' \"$@\""));

        let plist = Value::from_file(app.join("Contents/Info.plist")).unwrap();
        let dict = plist.as_dictionary().unwrap();
        assert_eq!(dict.get("JVMRuntime").and_then(Value::as_string), Some("jre"));
    }

    #[test]
    fn shell_quote_survives_single_quotes() {
        assert_eq!(shell_quote("plain"), "'plain'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote("$HOME `id`"), "'$HOME `id`'");
    }

    #[tokio::test]
    async fn launcher_quotes_configured_values() {
        let out = tempfile::tempdir().unwrap();
        let mut task = task(out.path());
        task.display_name = "Bob's \"Reports\"".into();
        task.working_directory = Some("$APP_ROOT/Contents/Java/lib dir".into());
        task.options = vec!["-Dgreeting=\"hello world\"".into(), "-Dcmd=`id`".into()];
        task.arguments = vec!["--name=a\"b".into(), "$HOME".into()];

        let app = AppBundler.execute(&task).await.unwrap();
        let launcher_path = app.join("Contents/MacOS/designer");
        let launcher = std::fs::read_to_string(&launcher_path).unwrap();

        assert!(launcher.contains("cd \"$APP_ROOT\"/'Contents/Java/lib dir' || exit 1"));
        assert!(launcher.contains(" '-Dgreeting=\"hello world\"' '-Dcmd=`id`' "));
        assert!(launcher.contains(r#"-Xdock:name='Bob'\''s "Reports"'"#));
        assert!(launcher.contains(" '--name=a\"b' '$HOME' \"$@\""));

        let syntax = std::process::Command::new("sh")
            .arg("-n")
            .arg(&launcher_path)
            .status()
            .unwrap();
        assert!(syntax.success(), "{launcher}");
    }
}
