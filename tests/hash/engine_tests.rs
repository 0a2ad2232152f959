// Tests for the checksum engine

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use hashwatch::hash::walker::collect_files;
use hashwatch::hash::{AlgorithmChoice, ChecksumEngine, FixedAlgorithm, HashComputer};
use tempfile::TempDir;

const HELLO_SHA256: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

fn sha256() -> AlgorithmChoice {
    AlgorithmChoice::Fixed(FixedAlgorithm::Sha256)
}

/// Tree with two small files and one 2 MiB file
fn build_tree() -> (TempDir, Vec<PathBuf>) {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("nested")).unwrap();
    fs::write(root.join("hello.txt"), b"hello world").unwrap();
    fs::write(root.join("big.bin"), vec![7u8; 2 * 1024 * 1024]).unwrap();
    fs::write(root.join("nested/small.txt"), b"small").unwrap();

    let files = collect_files(root, Vec::<String>::new()).unwrap();
    (dir, files)
}

#[test]
fn test_compute_all_hashes_every_file() {
    let (_dir, files) = build_tree();
    let mapping = ChecksumEngine::new().compute_all(files.clone(), &sha256(), None);

    assert_eq!(mapping.len(), 3);
    let hello = files.iter().find(|p| p.ends_with("hello.txt")).unwrap();
    assert_eq!(mapping.get(hello), Some(HELLO_SHA256));
}

#[test]
fn test_oversized_file_is_omitted_and_batch_continues() {
    let (_dir, files) = build_tree();
    let outcome = ChecksumEngine::new().compute_records(files.clone(), &sha256(), Some(1.0));

    assert_eq!(outcome.records.len(), 3);
    assert_eq!(outcome.stats.files_hashed, 2);
    assert_eq!(outcome.stats.files_oversize, 1);
    assert_eq!(outcome.stats.files_failed, 0);

    let big = outcome.records.iter().find(|r| r.path.ends_with("big.bin")).unwrap();
    assert_eq!(big.digest, None);

    let mapping = outcome.into_mapping();
    assert_eq!(mapping.len(), 2);
    assert!(mapping.paths().all(|p| !p.ends_with("big.bin")));
}

#[test]
fn test_cap_at_file_size_keeps_file() {
    let (_dir, files) = build_tree();
    let mapping = ChecksumEngine::new().compute_all(files, &sha256(), Some(2.0));
    assert_eq!(mapping.len(), 3);
}

#[test]
fn test_unreadable_file_does_not_abort_batch() {
    let (dir, mut files) = build_tree();
    // Enumerated earlier, deleted before hashing
    let vanished = dir.path().join("vanished.txt");
    files.insert(1, vanished.clone());

    let outcome = ChecksumEngine::new().compute_records(files, &sha256(), None);
    assert_eq!(outcome.stats.files_failed, 1);
    assert_eq!(outcome.stats.files_hashed, 3);

    let mapping = outcome.into_mapping();
    assert_eq!(mapping.len(), 3);
    assert!(!mapping.contains(&vanished));
}

#[test]
fn test_unreadable_file_with_cap_does_not_abort_batch() {
    let (dir, mut files) = build_tree();
    files.push(dir.path().join("vanished.txt"));

    let outcome = ChecksumEngine::new().compute_records(files, &sha256(), Some(1.0));
    assert_eq!(outcome.stats.files_failed, 1);
    assert_eq!(outcome.stats.files_oversize, 1);
    assert_eq!(outcome.stats.files_hashed, 2);
}

#[test]
fn test_mapping_follows_input_order() {
    let (_dir, mut files) = build_tree();
    files.reverse();

    let mapping = ChecksumEngine::new().compute_all(files.clone(), &sha256(), None);
    let order: Vec<PathBuf> = mapping.paths().map(|p| p.to_path_buf()).collect();
    assert_eq!(order, files);
}

#[test]
fn test_parallel_matches_sequential() {
    let dir = TempDir::new().unwrap();
    for i in 0..40 {
        fs::write(dir.path().join(format!("file{:02}.txt", i)), format!("contents {}", i)).unwrap();
    }
    let files = collect_files(dir.path(), Vec::<String>::new()).unwrap();
    let choice = AlgorithmChoice::blake2b(32);

    let sequential = ChecksumEngine::new().compute_all(files.clone(), &choice, None);
    let parallel = ChecksumEngine::new()
        .with_parallel(true)
        .compute_all(files, &choice, None);

    assert_eq!(sequential, parallel);
}

#[test]
fn test_duplicate_paths_last_write_wins() {
    let (_dir, files) = build_tree();
    let hello = files.iter().find(|p| p.ends_with("hello.txt")).unwrap().clone();
    let doubled = vec![hello.clone(), hello.clone()];

    let mapping = ChecksumEngine::new().compute_all(doubled, &sha256(), None);
    assert_eq!(mapping.len(), 1);
    assert_eq!(mapping.get(&hello), Some(HELLO_SHA256));
}

#[test]
fn test_engine_digest_matches_hash_computer() {
    let (_dir, files) = build_tree();
    let choice = AlgorithmChoice::blake2b(48);
    let mapping = ChecksumEngine::new()
        .with_chunk_blocks(3)
        .compute_all(files.clone(), &choice, None);

    for path in &files {
        let direct = HashComputer::new().digest_with(path, &choice).unwrap();
        assert_eq!(mapping.get(path), Some(direct.as_str()));
    }
}

#[test]
fn test_progress_callback_sees_every_file() {
    let (_dir, files) = build_tree();
    let seen = Arc::new(AtomicUsize::new(0));
    let seen_clone = Arc::clone(&seen);

    let engine = ChecksumEngine::new().with_progress_callback(move |progress| {
        assert_eq!(progress.files_total, 3);
        seen_clone.fetch_add(1, Ordering::SeqCst);
    });
    engine.compute_all(files, &sha256(), Some(1.0));

    assert_eq!(seen.load(Ordering::SeqCst), 3);
}

#[test]
fn test_scan_directory_excludes_and_counts_bytes() {
    let (dir, _files) = build_tree();
    fs::write(dir.path().join("checksum.json"), b"{}").unwrap();

    let outcome = ChecksumEngine::new()
        .scan_directory(dir.path(), ["checksum.json", "big.bin"], &sha256(), None)
        .unwrap();

    assert_eq!(outcome.stats.files_hashed, 2);
    assert_eq!(outcome.stats.total_bytes, 11 + 5);
    assert!(outcome.records.iter().all(|r| !r.path.ends_with("checksum.json")));
}

#[test]
fn test_empty_input_gives_empty_mapping() {
    let mapping = ChecksumEngine::new().compute_all(Vec::new(), &sha256(), Some(1.0));
    assert!(mapping.is_empty());
}
