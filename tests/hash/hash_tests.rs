// Tests for streaming file digests

use std::fs;
use std::path::Path;

use hashwatch::hash::{AlgorithmChoice, AlgorithmFactory, ChecksumError, FixedAlgorithm, HashComputer};
use tempfile::TempDir;

const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
const HELLO_SHA256: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";
const EMPTY_MD5: &str = "d41d8cd98f00b204e9800998ecf8427e";
const HELLO_MD5: &str = "5eb63bbbe01eeed093cb22bb8f5acdc3";
const EMPTY_SHA1: &str = "da39a3ee5e6b4b0d3255bfef95601890afd80709";
const EMPTY_BLAKE2B_512: &str = "786a02f742015903c6c6fd852552d272912f4740e15847618a86e217f71f5419d25e1031afee585313896444934eb04b903a685b1448b755d56f701afe9be2ce";
const EMPTY_SHA3_512: &str = "a69f73cca23a9ac5c8b567dc185a756e97c982164fe25859e0d1dcc1475c80a615b2123af1f5f94c11e3e9402c3ac558f500199d95b6d3e301758586281dcd26";
const EMPTY_BLAKE3: &str = "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262";

fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn digest_file(path: &Path, choice: AlgorithmChoice) -> String {
    HashComputer::new().digest_with(path, &choice).unwrap()
}

#[test]
fn test_known_answers_hello_world() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "hello.txt", b"hello world");

    assert_eq!(digest_file(&path, AlgorithmChoice::Fixed(FixedAlgorithm::Sha256)), HELLO_SHA256);
    assert_eq!(digest_file(&path, AlgorithmChoice::Fixed(FixedAlgorithm::Md5)), HELLO_MD5);
}

#[test]
fn test_zero_byte_file_gives_empty_input_digest() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "empty.bin", b"");

    assert_eq!(digest_file(&path, AlgorithmChoice::Fixed(FixedAlgorithm::Sha256)), EMPTY_SHA256);
    assert_eq!(digest_file(&path, AlgorithmChoice::Fixed(FixedAlgorithm::Md5)), EMPTY_MD5);
    assert_eq!(digest_file(&path, AlgorithmChoice::Fixed(FixedAlgorithm::Sha1)), EMPTY_SHA1);
    assert_eq!(digest_file(&path, AlgorithmChoice::Fixed(FixedAlgorithm::Sha3_512)), EMPTY_SHA3_512);
    assert_eq!(digest_file(&path, AlgorithmChoice::Fixed(FixedAlgorithm::Blake3)), EMPTY_BLAKE3);
    assert_eq!(digest_file(&path, AlgorithmChoice::blake2b(64)), EMPTY_BLAKE2B_512);
}

#[test]
fn test_chunk_size_does_not_change_digest() {
    let dir = TempDir::new().unwrap();
    // Not a multiple of any block size, and spans many chunks
    let contents: Vec<u8> = (0..300_001u32).map(|i| (i.wrapping_mul(31) % 256) as u8).collect();
    let path = write_file(&dir, "data.bin", &contents);

    let choices = [
        AlgorithmChoice::blake2b(64),
        AlgorithmChoice::blake2b(20),
        AlgorithmChoice::blake2s(32),
        AlgorithmChoice::Fixed(FixedAlgorithm::Sha256),
        AlgorithmChoice::Fixed(FixedAlgorithm::Sha3_512),
        AlgorithmChoice::Fixed(FixedAlgorithm::Blake3),
    ];

    for choice in choices {
        let reference = HashComputer::with_chunk_blocks(128).digest_with(&path, &choice).unwrap();
        for blocks in [1, 2, 3, 64, 256, 4096] {
            let n = HashComputer::with_chunk_blocks(blocks).digest_with(&path, &choice).unwrap();
            let doubled = HashComputer::with_chunk_blocks(blocks * 2).digest_with(&path, &choice).unwrap();
            assert_eq!(n, doubled, "{} with {} blocks", choice.name(), blocks);
            assert_eq!(n, reference, "{} with {} blocks", choice.name(), blocks);
        }
    }
}

#[test]
fn test_file_digest_matches_in_memory_digest() {
    let dir = TempDir::new().unwrap();
    let contents = vec![b'a'; 100 * 1024];
    let path = write_file(&dir, "large.txt", &contents);
    let choice = AlgorithmChoice::Fixed(FixedAlgorithm::Sha512);

    let from_file = HashComputer::new().digest_with(&path, &choice).unwrap();
    let from_memory = HashComputer::new()
        .digest_reader(&contents[..], choice.create().unwrap())
        .unwrap();

    assert_eq!(from_file, from_memory);
    assert_eq!(from_file.len(), 128);
}

#[test]
fn test_output_is_lowercase_hex_of_requested_length() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "x.txt", b"Some Content");

    let hex = digest_file(&path, AlgorithmChoice::blake2b(16));
    assert_eq!(hex.len(), 32);
    assert!(hex.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
}

#[test]
fn test_digest_counted_reports_bytes() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "count.txt", b"0123456789");
    let choice = AlgorithmChoice::Fixed(FixedAlgorithm::Sha256);

    let (_, bytes) = HashComputer::with_chunk_blocks(1)
        .digest_counted(&path, choice.create().unwrap())
        .unwrap();
    assert_eq!(bytes, 10);
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.txt");
    let choice = AlgorithmChoice::Fixed(FixedAlgorithm::Sha256);

    match HashComputer::new().digest_with(&missing, &choice) {
        Err(ChecksumError::FileNotFound { path }) => assert_eq!(path, missing),
        other => panic!("Expected FileNotFound, got {:?}", other),
    }
}

#[test]
fn test_directory_cannot_be_hashed() {
    let dir = TempDir::new().unwrap();
    let choice = AlgorithmChoice::Fixed(FixedAlgorithm::Sha256);

    assert!(HashComputer::new().digest_with(dir.path(), &choice).is_err());
}
