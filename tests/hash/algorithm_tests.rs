// Tests for algorithm selection and the digest capability trait

use hashwatch::hash::algorithm::{clamp_blake2b_size, Blake2bDigest};
use hashwatch::hash::{AlgorithmChoice, AlgorithmFactory, AlgorithmRegistry, ChecksumError, FixedAlgorithm};

#[test]
fn test_effective_digest_size_is_clamped() {
    for requested in [0usize, 1, 15, 16, 17, 32, 63, 64, 65, 128, 1000] {
        let expected = requested.clamp(16, 64);
        let choice = AlgorithmChoice::blake2b(requested);
        let instance = choice.create().unwrap();

        assert_eq!(clamp_blake2b_size(requested), expected);
        assert_eq!(choice.digest_size(), expected);
        assert_eq!(instance.digest_size(), expected);
        assert_eq!(instance.finalize().len(), expected);
    }
}

#[test]
fn test_unclamped_enum_is_clamped_at_creation() {
    // Built directly, bypassing the clamping constructor
    let choice = AlgorithmChoice::Blake2b { digest_size: 4 };
    assert_eq!(choice.create().unwrap().digest_size(), 16);

    let direct = Blake2bDigest::new(500).unwrap();
    assert_eq!(hashwatch::hash::DigestAlgorithm::digest_size(&direct), 64);
}

#[test]
fn test_blake2s_clamped_to_its_own_maximum() {
    let choice = AlgorithmChoice::from_name("blake2s", 64).unwrap();
    assert_eq!(choice.digest_size(), 32);
    assert_eq!(choice.create().unwrap().finalize().len(), 32);
}

#[test]
fn test_from_name_case_insensitive() {
    assert_eq!(
        AlgorithmChoice::from_name("SHA-256", 64).unwrap(),
        AlgorithmChoice::Fixed(FixedAlgorithm::Sha256)
    );
    assert_eq!(
        AlgorithmChoice::from_name("Sha3_512", 64).unwrap(),
        AlgorithmChoice::Fixed(FixedAlgorithm::Sha3_512)
    );
    assert_eq!(
        AlgorithmChoice::from_name("BLAKE2B", 20).unwrap(),
        AlgorithmChoice::Blake2b { digest_size: 20 }
    );
}

#[test]
fn test_unknown_name_rejected() {
    match AlgorithmChoice::from_name("whirlpool", 64) {
        Err(ChecksumError::UnsupportedAlgorithm { algorithm }) => assert_eq!(algorithm, "whirlpool"),
        other => panic!("Expected UnsupportedAlgorithm, got {:?}", other),
    }
    assert!(!AlgorithmRegistry::is_supported("whirlpool"));
    assert!(AlgorithmRegistry::is_supported("md5"));
}

#[test]
fn test_registry_lists_block_and_digest_sizes() {
    let list = AlgorithmRegistry::list();
    let find = |name: &str| list.iter().find(|info| info.name == name).unwrap().clone();

    assert_eq!(list.len(), 13);
    assert_eq!((find("sha256").block_size, find("sha256").digest_size), (64, 32));
    assert_eq!((find("sha512").block_size, find("sha512").digest_size), (128, 64));
    assert_eq!((find("sha3-512").block_size, find("sha3-512").digest_size), (72, 64));
    assert_eq!((find("md5").block_size, find("md5").digest_size), (64, 16));
    assert!(find("blake2b").variable_length);
    assert!(!find("blake3").variable_length);
}

#[test]
fn test_default_choice_is_full_blake2b() {
    assert_eq!(AlgorithmChoice::default(), AlgorithmChoice::Blake2b { digest_size: 64 });
}

#[test]
fn test_native_blake2_follows_pointer_width() {
    let choice = AlgorithmChoice::native_blake2(64);
    if cfg!(target_pointer_width = "64") {
        assert_eq!(choice.name(), "blake2b");
        assert_eq!(choice.digest_size(), 64);
    } else {
        assert_eq!(choice.name(), "blake2s");
        assert_eq!(choice.digest_size(), 32);
    }
}

#[test]
fn test_blake2_alias_picks_native_width() {
    let choice = AlgorithmChoice::from_name("Blake2", 64).unwrap();
    assert_eq!(choice, AlgorithmChoice::native_blake2(64));

    // Explicit names never depend on the host
    assert_eq!(AlgorithmChoice::from_name("blake2b", 64).unwrap(), AlgorithmChoice::blake2b(64));
    assert_eq!(AlgorithmChoice::from_name("blake2s", 32).unwrap(), AlgorithmChoice::blake2s(32));
}
