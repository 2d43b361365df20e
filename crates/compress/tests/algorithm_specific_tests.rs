//! Tests for the compression algorithm enum and its interaction with the zlib codec.

#[test]
fn handles_empty_data() {
    use compress::zlib;

    let compressed = zlib::compress_to_vec(&[], zlib::CompressionLevel::Default).unwrap();
    let decompressed = zlib::decompress_to_vec(&compressed).unwrap();
    assert!(decompressed.is_empty());
}

#[test]
fn compresses_repetitive_data_well() {
    use compress::zlib;

    let data = vec![b'R'; 10_000];

    let compressed = zlib::compress_to_vec(&data, zlib::CompressionLevel::Best).unwrap();
    assert!(compressed.len() < data.len() / 10);
}

#[test]
fn roundtrips_correctly() {
    use compress::zlib;

    let test_data = b"round trip test data".repeat(50);

    let compressed = zlib::compress_to_vec(&test_data, zlib::CompressionLevel::Default).unwrap();
    let decompressed = zlib::decompress_to_vec(&compressed).unwrap();
    assert_eq!(decompressed, test_data);
}

#[test]
fn compression_algorithm_enum_coverage() {
    use compress::algorithm::CompressionAlgorithm;

    let zlib = CompressionAlgorithm::Zlib;
    assert_eq!(zlib.name(), "zlib");

    let available = CompressionAlgorithm::available();
    assert!(!available.is_empty());
    assert!(available.contains(&CompressionAlgorithm::Zlib));
}
