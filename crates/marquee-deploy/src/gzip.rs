//! Gzip mirror of the built site.
//!
//! Every file under the source tree is mirrored into the destination. Files
//! whose extension is listed in `deploy.gzip_types` are stored gzipped under
//! the same name; everything else is copied as is.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;

use crate::builder::{BuildError, write_file};

/// Counts from one mirror run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GzipReport {
    pub compressed: usize,
    pub copied: usize,
}

/// Whether a file with this path is stored gzipped.
#[must_use]
pub fn is_gzip_type(path: &Path, gzip_types: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| gzip_types.iter().any(|t| t.eq_ignore_ascii_case(ext)))
}

/// Mirror `source` into `destination`, gzipping text types.
///
/// Existing destination files are overwritten; files no longer present in
/// `source` are left alone.
pub fn gzip_tree(
    source: &Path,
    destination: &Path,
    gzip_types: &[String],
) -> Result<GzipReport, BuildError> {
    let mut report = GzipReport::default();

    for (relative, path) in collect_files(source)? {
        let target = destination.join(&relative);
        let bytes = fs::read(&path)?;
        if is_gzip_type(&path, gzip_types) {
            write_file(&target, &compress(&bytes)?)?;
            report.compressed += 1;
        } else {
            write_file(&target, &bytes)?;
            report.copied += 1;
        }
    }

    tracing::info!(
        compressed = report.compressed,
        copied = report.copied,
        destination = %destination.display(),
        "Gzipped site"
    );
    Ok(report)
}

fn compress(bytes: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    encoder.finish()
}

/// Files under `directory` as `(relative path with '/' separators, absolute path)`.
pub(crate) fn collect_files(directory: &Path) -> io::Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();
    walk_dir(directory, directory, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk_dir(base: &Path, current: &Path, files: &mut Vec<(String, PathBuf)>) -> io::Result<()> {
    for entry in fs::read_dir(current)? {
        let path = entry?.path();
        if path.is_dir() {
            walk_dir(base, &path, files)?;
        } else if let Ok(relative) = path.strip_prefix(base) {
            let relative = relative.to_string_lossy().replace('\\', "/");
            files.push((relative, path));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use flate2::read::GzDecoder;
    use pretty_assertions::assert_eq;

    use super::*;

    fn types() -> Vec<String> {
        ["html", "js", "json", "css"].map(str::to_owned).to_vec()
    }

    #[test]
    fn test_is_gzip_type() {
        assert!(is_gzip_type(Path::new("index.html"), &types()));
        assert!(is_gzip_type(Path::new("js/app.JS"), &types()));
        assert!(!is_gzip_type(Path::new("img/argo.jpg"), &types()));
        assert!(!is_gzip_type(Path::new("README"), &types()));
    }

    #[test]
    fn test_gzip_tree_mirrors_and_compresses() {
        let dir = tempfile::tempdir().unwrap();
        let www = dir.path().join("www");
        let gzip = dir.path().join("gzip");
        fs::create_dir_all(www.join("img")).unwrap();
        fs::create_dir_all(www.join("live-data")).unwrap();
        fs::write(www.join("index.html"), "<h1>Oscars</h1>").unwrap();
        fs::write(www.join("live-data/awards.json"), "{}").unwrap();
        fs::write(www.join("img/argo.jpg"), [0xffu8, 0xd8, 0xff]).unwrap();

        let report = gzip_tree(&www, &gzip, &types()).unwrap();
        assert_eq!(
            report,
            GzipReport {
                compressed: 2,
                copied: 1
            }
        );

        let mut html = String::new();
        GzDecoder::new(fs::File::open(gzip.join("index.html")).unwrap())
            .read_to_string(&mut html)
            .unwrap();
        assert_eq!(html, "<h1>Oscars</h1>");
        assert_eq!(fs::read(gzip.join("img/argo.jpg")).unwrap(), vec![0xffu8, 0xd8, 0xff]);
    }

    #[test]
    fn test_collect_files_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("css")).unwrap();
        fs::write(dir.path().join("css/app.css"), "").unwrap();
        fs::write(dir.path().join("index.html"), "").unwrap();

        let relative: Vec<_> = collect_files(dir.path())
            .unwrap()
            .into_iter()
            .map(|(relative, _)| relative)
            .collect();
        assert_eq!(relative, vec!["css/app.css", "index.html"]);
    }
}
