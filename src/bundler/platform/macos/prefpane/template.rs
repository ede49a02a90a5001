//! Materializing the preference pane source template.
//!
//! A template is a tree of files read from a [`TemplateStore`]. It is written
//! out in two passes: every entry name is run through the [`Substitutions`]
//! (rename pass), then every file body is streamed through a
//! [`ReplacingReader`] into its renamed location (content pass).

use crate::bundler::error::{Error, ErrorExt, Result};
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Component, Path, PathBuf};

/// Token in the template that stands for the pane's internal name.
pub const PLACEHOLDER: &str = "SetupBuilderOSXPrefPane";

/// Ordered string replacements applied to names and file contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitutions {
    pairs: Vec<(String, String)>,
}

impl Substitutions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces `from` with `to`; empty patterns are ignored.
    pub fn with(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        let from = from.into();
        if !from.is_empty() {
            self.pairs.push((from, to.into()));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Applies every replacement to an entry name.
    pub fn rename(&self, name: &str) -> String {
        self.pairs
            .iter()
            .fold(name.to_string(), |name, (from, to)| name.replace(from, to))
    }

    /// Wraps `inner` so that every replacement is applied while reading.
    pub fn reader<R: Read>(&self, inner: R) -> ReplacingReader<R> {
        ReplacingReader::new(inner, self.clone())
    }
}

/// A [`Read`] adapter replacing byte patterns on the fly.
///
/// Input is consumed in chunks; a tail that could still grow into a pattern
/// is held back until more input arrives or the source is exhausted.
pub struct ReplacingReader<R> {
    inner: R,
    table: Substitutions,
    pending: Vec<u8>,
    output: Vec<u8>,
    position: usize,
    eof: bool,
}

impl<R: Read> ReplacingReader<R> {
    pub fn new(inner: R, table: Substitutions) -> Self {
        Self {
            inner,
            table,
            pending: Vec::new(),
            output: Vec::new(),
            position: 0,
            eof: false,
        }
    }

    fn process(&mut self) {
        let Self {
            table,
            pending,
            output,
            eof,
            ..
        } = self;

        let mut i = 0;
        'scan: while i < pending.len() {
            let rest = &pending[i..];

            for (from, to) in &table.pairs {
                if rest.starts_with(from.as_bytes()) {
                    output.extend_from_slice(to.as_bytes());
                    i += from.len();
                    continue 'scan;
                }
            }
            if !*eof
                && table
                    .pairs
                    .iter()
                    .any(|(from, _)| from.as_bytes().starts_with(rest))
            {
                break;
            }

            output.push(pending[i]);
            i += 1;
        }

        pending.drain(..i);
    }
}

impl<R: Read> Read for ReplacingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.position == self.output.len() {
            if self.eof && self.pending.is_empty() {
                return Ok(0);
            }

            self.output.clear();
            self.position = 0;

            if !self.eof {
                let mut chunk = [0u8; 8192];
                let read = self.inner.read(&mut chunk)?;
                if read == 0 {
                    self.eof = true;
                } else {
                    self.pending.extend_from_slice(&chunk[..read]);
                }
            }
            self.process();
        }

        let count = buf.len().min(self.output.len() - self.position);
        buf[..count].copy_from_slice(&self.output[self.position..self.position + count]);
        self.position += count;
        Ok(count)
    }
}

/// A source of template files addressed by `/`-separated relative names.
pub trait TemplateStore {
    /// Names of all files in the template.
    fn manifest(&self) -> Result<Vec<String>>;

    /// Opens the file `name` from the manifest.
    fn open(&self, name: &str) -> Result<Box<dyn Read + '_>>;
}

/// Template stored as a plain directory tree.
#[derive(Debug, Clone)]
pub struct DirectoryTemplateStore {
    root: PathBuf,
}

impl DirectoryTemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TemplateStore for DirectoryTemplateStore {
    fn manifest(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in walkdir::WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry.path().strip_prefix(&self.root)?;
            let name: Vec<_> = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            names.push(name.join("/"));
        }
        Ok(names)
    }

    fn open(&self, name: &str) -> Result<Box<dyn Read + '_>> {
        let path = self.root.join(name);
        let file = File::open(&path).fs_context("opening template file", &path)?;
        Ok(Box::new(file))
    }
}

/// Template stored below a prefix inside a zip archive.
#[derive(Debug, Clone)]
pub struct ZipTemplateStore {
    archive: PathBuf,
    prefix: String,
}

impl ZipTemplateStore {
    /// `prefix` selects the sub tree of the archive holding the template;
    /// an empty prefix uses the whole archive.
    pub fn new(archive: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            archive: archive.into(),
            prefix: prefix.into().trim_matches('/').to_string(),
        }
    }

    fn open_archive(&self) -> Result<zip::ZipArchive<File>> {
        let file = File::open(&self.archive).fs_context("opening template archive", &self.archive)?;
        Ok(zip::ZipArchive::new(file)?)
    }

    fn entry_name(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.prefix, name)
        }
    }
}

impl TemplateStore for ZipTemplateStore {
    fn manifest(&self) -> Result<Vec<String>> {
        let archive = self.open_archive()?;
        let prefix = if self.prefix.is_empty() {
            String::new()
        } else {
            format!("{}/", self.prefix)
        };

        let mut names: Vec<String> = archive
            .file_names()
            .filter(|name| !name.ends_with('/'))
            .filter_map(|name| name.strip_prefix(prefix.as_str()))
            .map(str::to_string)
            .collect();
        names.sort();
        Ok(names)
    }

    fn open(&self, name: &str) -> Result<Box<dyn Read + '_>> {
        let mut archive = self.open_archive()?;
        let mut entry = archive.by_name(&self.entry_name(name))?;
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut bytes)?;
        Ok(Box::new(Cursor::new(bytes)))
    }
}

/// Writes the template into `destination` applying `substitutions` to
/// every entry name and every file body. Returns the written files.
pub fn materialize<T: TemplateStore + ?Sized>(
    store: &T,
    substitutions: &Substitutions,
    destination: &Path,
) -> Result<Vec<PathBuf>> {
    let manifest = store.manifest()?;

    // rename pass
    let mut plan = Vec::with_capacity(manifest.len());
    for name in manifest {
        let renamed = substitutions.rename(&name);
        let target = destination.join(checked_relative(&renamed)?);
        plan.push((name, target));
    }

    // content pass
    for (name, target) in &plan {
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).fs_context("creating directory", parent)?;
        }
        let mut reader = substitutions.reader(store.open(name)?);
        let mut file = File::create(target).fs_context("creating template file", target)?;
        io::copy(&mut reader, &mut file).fs_context("writing template file", target)?;
    }

    log::debug!(
        "Materialized {} template files into {}",
        plan.len(),
        destination.display()
    );
    Ok(plan.into_iter().map(|(_, target)| target).collect())
}

/// Rejects names that would escape the destination directory.
fn checked_relative(name: &str) -> Result<&Path> {
    let path = Path::new(name);
    if name.is_empty()
        || path
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
    {
        return Err(Error::GenericError(format!(
            "template entry '{name}' is not a plain relative path"
        )));
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn table() -> Substitutions {
        Substitutions::new().with(PLACEHOLDER, "ReportServer")
    }

    /// Yields one byte per read to exercise patterns split across chunks.
    struct Trickle<'a>(&'a [u8]);

    impl<'a> Read for Trickle<'a> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let data: &'a [u8] = self.0;
            match data.split_first() {
                Some((first, rest)) if !buf.is_empty() => {
                    buf[0] = *first;
                    self.0 = rest;
                    Ok(1)
                }
                _ => Ok(0),
            }
        }
    }

    #[test]
    fn replaces_patterns_split_across_reads() {
        let input = b"PRODUCT_NAME = SetupBuilderOSXPrefPane; // SetupBuilderOSX";
        let mut out = String::new();
        table()
            .reader(Trickle(input))
            .read_to_string(&mut out)
            .unwrap();
        assert_eq!(out, "PRODUCT_NAME = ReportServer; // SetupBuilderOSX");
    }

    #[test]
    fn renames_every_occurrence() {
        assert_eq!(
            table().rename("SetupBuilderOSXPrefPane/SetupBuilderOSXPrefPane.m"),
            "ReportServer/ReportServer.m"
        );
        assert_eq!(table().rename("build.gradle"), "build.gradle");
    }

    #[test]
    fn rejects_escaping_names() {
        assert!(checked_relative("../outside").is_err());
        assert!(checked_relative("/etc/passwd").is_err());
        assert!(checked_relative("a/b.txt").is_ok());
    }

    #[test]
    fn directory_template_is_renamed_and_rewritten() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(src.path().join("SetupBuilderOSXPrefPane")).unwrap();
        std::fs::write(
            src.path().join("SetupBuilderOSXPrefPane/SetupBuilderOSXPrefPane.h"),
            "@interface SetupBuilderOSXPrefPane : NSPreferencePane",
        )
        .unwrap();
        std::fs::write(src.path().join("build.gradle"), "target = 'SetupBuilderOSXPrefPane'").unwrap();

        let store = DirectoryTemplateStore::new(src.path());
        let written = materialize(&store, &table(), dst.path()).unwrap();

        assert_eq!(written.len(), 2);
        let header = dst.path().join("ReportServer/ReportServer.h");
        assert_eq!(
            std::fs::read_to_string(header).unwrap(),
            "@interface ReportServer : NSPreferencePane"
        );
        assert_eq!(
            std::fs::read_to_string(dst.path().join("build.gradle")).unwrap(),
            "target = 'ReportServer'"
        );
    }

    #[test]
    fn zip_template_is_read_below_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("templates.zip");
        {
            let file = File::create(&archive).unwrap();
            let mut zip = zip::ZipWriter::new(file);
            let options = zip::write::SimpleFileOptions::default();
            zip.add_directory("preferences/", options).unwrap();
            zip.start_file("preferences/build.gradle", options).unwrap();
            zip.write_all(b"name = 'SetupBuilderOSXPrefPane'").unwrap();
            zip.start_file("other/ignored.txt", options).unwrap();
            zip.write_all(b"ignored").unwrap();
            zip.finish().unwrap();
        }

        let store = ZipTemplateStore::new(&archive, "/preferences/");
        assert_eq!(store.manifest().unwrap(), ["build.gradle"]);

        let out = dir.path().join("out");
        materialize(&store, &table(), &out).unwrap();
        assert_eq!(
            std::fs::read_to_string(out.join("build.gradle")).unwrap(),
            "name = 'ReportServer'"
        );
    }
}
