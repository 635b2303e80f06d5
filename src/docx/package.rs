//! Moving between a `.docx` archive and the unpacked directory layout.
//!
//! A `.docx` file is a ZIP archive of XML parts. The editor works on the
//! unpacked directory; these helpers extract an archive into one and
//! recreate the archive from it.

use crate::error::{DocxError, Result};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use zip::CompressionMethod;
use zip::ZipArchive;
use zip::write::{SimpleFileOptions, ZipWriter};

/// Extract a `.docx` archive into `dest_dir`.
///
/// Creates the destination (and any entry parent directories) as needed.
/// Entry names that would escape the destination are rejected.
pub fn unpack<P: AsRef<Path>, Q: AsRef<Path>>(docx_path: P, dest_dir: Q) -> Result<()> {
    let docx_path = docx_path.as_ref();
    let dest_dir = dest_dir.as_ref();

    if !docx_path.exists() {
        return Err(DocxError::PartNotFound(format!(
            "file not found: {}",
            docx_path.display()
        )));
    }
    require_docx_extension(docx_path)?;

    let mut archive = ZipArchive::new(File::open(docx_path)?)?;
    fs::create_dir_all(dest_dir)?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let relative = entry.enclosed_name().ok_or_else(|| {
            DocxError::Validation(format!("unsafe archive entry name: {}", entry.name()))
        })?;
        let target = dest_dir.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)?;
        io::copy(&mut entry, &mut out)?;
    }

    Ok(())
}

/// Recreate a `.docx` archive from an unpacked directory.
///
/// Entries are deflate-compressed and written in a deterministic order:
/// `[Content_Types].xml` first, then the remaining files sorted by their
/// forward-slash relative path.
pub fn pack<P: AsRef<Path>, Q: AsRef<Path>>(src_dir: P, docx_path: Q) -> Result<()> {
    let src_dir = src_dir.as_ref();
    let docx_path = docx_path.as_ref();

    if !src_dir.is_dir() {
        return Err(DocxError::PartNotFound(format!(
            "directory not found: {}",
            src_dir.display()
        )));
    }
    require_docx_extension(docx_path)?;

    let mut files = Vec::new();
    collect_files(src_dir, src_dir, &mut files)?;
    files.sort();
    if let Some(index) = files.iter().position(|name| name == "[Content_Types].xml") {
        let content_types = files.remove(index);
        files.insert(0, content_types);
    }

    let mut writer = ZipWriter::new(File::create(docx_path)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for name in &files {
        writer.start_file(name.as_str(), options)?;
        writer.write_all(&fs::read(src_dir.join(path_from_entry(name)))?)?;
    }
    writer.finish()?;
    Ok(())
}

fn require_docx_extension(path: &Path) -> Result<()> {
    let is_docx = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("docx"));
    if !is_docx {
        return Err(DocxError::Validation(format!(
            "not a .docx file: {}",
            path.display()
        )));
    }
    Ok(())
}

/// Collect relative entry names (forward slashes) for every file under `dir`.
fn collect_files(base: &Path, dir: &Path, out: &mut Vec<String>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(base, &path, out)?;
        } else if let Ok(relative) = path.strip_prefix(base) {
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            out.push(name);
        }
    }
    Ok(())
}

fn path_from_entry(name: &str) -> PathBuf {
    name.split('/').collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("[Content_Types].xml"), "<Types/>").unwrap();
        fs::create_dir_all(dir.path().join("word")).unwrap();
        fs::write(
            dir.path().join("word/document.xml"),
            "<w:document xmlns:w=\"ns\"/>",
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("_rels")).unwrap();
        fs::write(dir.path().join("_rels/.rels"), "<Relationships/>").unwrap();
        dir
    }

    #[test]
    fn test_pack_then_unpack_round_trips() {
        let src = sample_dir();
        let work = TempDir::new().unwrap();
        let docx = work.path().join("out.docx");

        pack(src.path(), &docx).unwrap();
        assert!(docx.exists());

        let dest = work.path().join("unpacked");
        unpack(&docx, &dest).unwrap();

        let doc = fs::read_to_string(dest.join("word/document.xml")).unwrap();
        assert_eq!(doc, "<w:document xmlns:w=\"ns\"/>");
        let rels = fs::read_to_string(dest.join("_rels/.rels")).unwrap();
        assert_eq!(rels, "<Relationships/>");
        assert!(dest.join("[Content_Types].xml").exists());
    }

    #[test]
    fn test_content_types_entry_is_first() {
        let src = sample_dir();
        let work = TempDir::new().unwrap();
        let docx = work.path().join("out.docx");
        pack(src.path(), &docx).unwrap();

        let mut archive = ZipArchive::new(File::open(&docx).unwrap()).unwrap();
        let first = archive.by_index(0).unwrap();
        assert_eq!(first.name(), "[Content_Types].xml");
    }

    #[test]
    fn test_unpack_missing_archive_is_not_found() {
        let work = TempDir::new().unwrap();
        let result = unpack(work.path().join("absent.docx"), work.path().join("out"));
        assert!(matches!(result, Err(DocxError::PartNotFound(_))));
    }

    #[test]
    fn test_wrong_extension_is_rejected() {
        let work = TempDir::new().unwrap();
        let not_docx = work.path().join("file.zip");
        fs::write(&not_docx, "").unwrap();
        assert!(matches!(
            unpack(&not_docx, work.path().join("out")),
            Err(DocxError::Validation(_))
        ));
        assert!(matches!(
            pack(work.path(), work.path().join("file.zip")),
            Err(DocxError::Validation(_))
        ));
    }
}
