use std::fs;

use camino::Utf8PathBuf;
use tempfile::tempdir;

use pdb_summary::metadata::MetadataRecord;
use pdb_summary::output::JsonOutput;

fn record(pdb_id: &str) -> MetadataRecord {
    MetadataRecord {
        pdb_id: pdb_id.to_string(),
        protein_name: "Lysozyme C".to_string(),
        organism: "Gallus gallus".to_string(),
        resolution: Some(1.5),
        method: "X-RAY DIFFRACTION".to_string(),
        release_date: None,
        structure_title: "Lysozyme C".to_string(),
        molecular_weight: None,
        keywords: vec!["HYDROLASE".to_string()],
        classification: "HYDROLASE".to_string(),
        authors: vec![],
    }
}

#[test]
fn creates_parent_and_writes_array() {
    let dir = tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    let path = root.join("public").join("pdb-summary.json");

    JsonOutput::write_records(&[record("2LYZ"), record("1LYZ")], &path).unwrap();

    let written: Vec<MetadataRecord> =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written.len(), 2);
    assert_eq!(written[0].pdb_id, "2LYZ");

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.starts_with("[\n  {"));
}

#[test]
fn overwrites_existing_file() {
    let dir = tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    let path = root.join("pdb-summary.json");
    fs::write(&path, "stale").unwrap();

    JsonOutput::write_records(&[], &path).unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    assert_eq!(raw.trim(), "[]");
}

#[test]
fn prepare_fails_when_parent_is_a_file() {
    let dir = tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    fs::write(root.join("public"), "not a dir").unwrap();

    let result = JsonOutput::prepare(&root.join("public").join("pdb-summary.json"));
    assert!(result.is_err());
}

#[cfg(unix)]
#[test]
fn new_file_is_world_readable() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    let path = root.join("public").join("pdb-summary.json");

    JsonOutput::write_records(&[record("1LYZ")], &path).unwrap();

    let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o644);
}

#[cfg(unix)]
#[test]
fn replacing_keeps_existing_mode() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    let path = root.join("pdb-summary.json");
    fs::write(&path, "[]").unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o664)).unwrap();

    JsonOutput::write_records(&[], &path).unwrap();

    let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o664);
}
