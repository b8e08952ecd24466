use std::fs;

use proptest::prelude::*;
use tempfile::tempdir;

use huffstream::{
    decode, decode_bytes, encode, encode_bytes, CodeTable, CodecConfig, FileReader, FileWriter,
    FrequencyTable, HuffmanTree, MemoryReader, MemoryWriter,
};

fn expected_container_len(data: &[u8]) -> u64 {
    let freq = FrequencyTable::from_bytes(data).unwrap();
    let body_bits = HuffmanTree::build(&freq)
        .map(|tree| CodeTable::from_tree(&tree).body_bits(&freq))
        .unwrap_or(0);
    4 + 5 * freq.len() as u64 + 4 + body_bits.div_ceil(8)
}

proptest! {
    #[test]
    fn decode_inverts_encode(data in prop::collection::vec(any::<u8>(), 0..2000)) {
        let container = encode_bytes(&data).unwrap();
        prop_assert_eq!(decode_bytes(&container).unwrap(), data);
    }

    #[test]
    fn small_alphabet_round_trips(
        data in prop::collection::vec(prop::sample::select(vec![b'a', b'b', b'c']), 0..500)
    ) {
        let container = encode_bytes(&data).unwrap();
        prop_assert_eq!(decode_bytes(&container).unwrap(), data);
    }

    #[test]
    fn counts_sum_to_input_length(data in prop::collection::vec(any::<u8>(), 0..2000)) {
        let mut r = MemoryReader::new(&data);
        let freq = FrequencyTable::tabulate(&mut r).unwrap();
        prop_assert_eq!(freq.total(), data.len() as u64);
    }

    #[test]
    fn codes_are_prefix_free(data in prop::collection::vec(any::<u8>(), 1..2000)) {
        let freq = FrequencyTable::from_bytes(&data).unwrap();
        prop_assume!(freq.len() >= 2);
        let table = CodeTable::from_tree(&HuffmanTree::build(&freq).unwrap());
        prop_assert!(table.is_prefix_free());
    }

    #[test]
    fn container_size_formula(data in prop::collection::vec(any::<u8>(), 0..2000)) {
        let container = encode_bytes(&data).unwrap();
        prop_assert_eq!(container.len() as u64, expected_container_len(&data));
    }

    #[test]
    fn encoding_is_deterministic(data in prop::collection::vec(any::<u8>(), 0..500)) {
        prop_assert_eq!(encode_bytes(&data).unwrap(), encode_bytes(&data).unwrap());
    }
}

#[test]
fn full_alphabet_round_trips() {
    let data: Vec<u8> = (0..=255u8).cycle().take(256 * 7 + 13).collect();
    let container = encode_bytes(&data).unwrap();
    assert_eq!(decode_bytes(&container).unwrap(), data);
    assert_eq!(container.len() as u64, expected_container_len(&data));
}

#[test]
fn long_single_byte_run() {
    let data = vec![0u8; 100_000];
    let container = encode_bytes(&data).unwrap();
    assert_eq!(container.len(), 13);
    assert_eq!(decode_bytes(&container).unwrap(), data);
}

// Memory and file stream pairs must produce the same bytes in both directions.
#[test]
fn file_and_memory_streams_agree() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("plain.txt");
    let container_path = dir.path().join("plain.huff");
    let output = dir.path().join("plain.out");

    let data: Vec<u8> = "It was the best of times, it was the worst of times. "
        .repeat(200)
        .into_bytes();
    fs::write(&input, &data).unwrap();

    let mut source = FileReader::with_block_size(&input, 100).unwrap();
    let mut sink = FileWriter::with_block_size(&container_path, 37).unwrap();
    let file_report = encode(&mut source, &mut sink).unwrap();
    drop(sink);

    let mut mem_sink = MemoryWriter::new();
    let mem_report = encode(&mut MemoryReader::new(&data), &mut mem_sink).unwrap();
    let mem_container = mem_sink.into_bytes();

    assert_eq!(file_report, mem_report);
    assert_eq!(fs::read(&container_path).unwrap(), mem_container);

    let mut source = FileReader::open(&container_path).unwrap();
    let mut sink = FileWriter::create(&output).unwrap();
    decode(&mut source, &mut sink).unwrap();
    drop(sink);

    assert_eq!(fs::read(&output).unwrap(), data);
    assert_eq!(decode_bytes(&mem_container).unwrap(), data);
}

#[test]
fn streams_work_as_trait_objects() {
    let data = b"dyn dispatch keeps the codec store-agnostic";
    let mut source = MemoryReader::new(data);
    let mut sink = MemoryWriter::new();
    {
        let source: &mut dyn huffstream::BitRead = &mut source;
        let sink: &mut dyn huffstream::BitWrite = &mut sink;
        encode(source, sink).unwrap();
    }
    assert_eq!(sink.into_bytes(), encode_bytes(data).unwrap());
}

#[test]
fn empty_file_round_trip() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("empty");
    let output = dir.path().join("empty.out");
    fs::write(&input, b"").unwrap();

    let (container, report) =
        huffstream::round_trip_file(&input, &output, &CodecConfig::default()).unwrap();
    assert_eq!(report.original_bytes, 0);
    assert_eq!(fs::read(container).unwrap(), vec![0; 8]);
    assert_eq!(fs::read(&output).unwrap(), Vec::<u8>::new());
}
