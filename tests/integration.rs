/// Integration tests for fluxtrack

use fluxtrack::*;

/// Generate a revolution with a handler from seeded metadata
fn generate(registry: &Registry, mut ti: TrackInfo) -> Bitcells {
    let handler = registry.handler(ti.track_type).expect("Unregistered track type");
    ti.len = ti.dat.len();
    let mut tbuf = TrackBuffer::new(ti.total_bits, ti.data_bitoff);
    handler.encode(&ti, &mut tbuf);
    tbuf.finish()
}

fn seeded(registry: &Registry, track_type: TrackType, total_bits: u32, dat: Vec<u8>) -> TrackInfo {
    let mut ti = TrackInfo::new(track_type, registry.geometry(track_type));
    ti.total_bits = total_bits;
    ti.data_bitoff = 3000;
    ti.dat = dat;
    ti
}

fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 + i / 251) as u8).collect()
}

#[test]
fn test_protec_example() {
    // Sync, 1200 repeats of 0x77, and a 108000 bit revolution
    let mut tbuf = TrackBuffer::new(108_000, 0);
    tbuf.bits(BitcellEncoding::Raw, 16, 0x4454);
    for _ in 0..1200 {
        tbuf.bits(BitcellEncoding::Mfm, 8, 0x77);
    }
    let cells = tbuf.finish();

    let registry = Registry::new();
    let mut disk = Disk::new(160);
    let track = disk
        .decode_track(0, TrackType::ProtecLongtrack, &cells, &registry)
        .expect("Failed to decode PROTEC track");
    assert_eq!(track.dat, vec![0x77]);
    assert_eq!(track.total_bits, 110_000);
    assert_eq!(track.data_bitoff, 0);
}

#[test]
fn test_round_trip_every_type() {
    let registry = Registry::new();
    let cases = [
        seeded(&registry, TrackType::ProtecLongtrack, 110_000, vec![0x5A]),
        seeded(&registry, TrackType::GremlinLongtrack, 105_500, Vec::new()),
        seeded(&registry, TrackType::TiertexLongtrack, 100_150, Vec::new()),
        seeded(&registry, TrackType::CrystalsOfArboreaLongtrack, 110_000, Vec::new()),
        seeded(&registry, TrackType::InfogramesLongtrack, 105_500, Vec::new()),
        seeded(&registry, TrackType::BatLongtrack, 110_000, Vec::new()),
        seeded(&registry, TrackType::AppLongtrack, 111_000, Vec::new()),
        seeded(&registry, TrackType::EmptyLongtrack, 110_000, Vec::new()),
        seeded(&registry, TrackType::RTypeA, 100_150, payload(5968)),
        seeded(&registry, TrackType::RTypeB, 105_500, payload(6552)),
    ];

    for (tracknr, ti) in cases.into_iter().enumerate() {
        let track_type = ti.track_type;
        let cells = generate(&registry, ti.clone());

        let mut disk = Disk::new(16);
        let first = disk
            .decode_track(tracknr, track_type, &cells, &registry)
            .unwrap_or_else(|e| panic!("{} failed to decode: {}", track_type, e))
            .clone();
        assert_eq!(first.dat, ti.dat, "{} data", track_type);

        let regenerated = disk
            .encode_track(tracknr, &registry)
            .expect("Failed to encode track");
        assert_eq!(regenerated.len(), first.total_bits, "{} length", track_type);

        let mut copy = Disk::new(16);
        let second = copy
            .decode_track(tracknr, track_type, &regenerated, &registry)
            .unwrap_or_else(|e| panic!("{} failed to decode again: {}", track_type, e));
        assert_eq!(&first, second, "{} round trip", track_type);
    }
}

#[test]
fn test_empty_track_threshold() {
    let registry = Registry::new();
    let mut disk = Disk::new(2);

    let short = TrackBuffer::new(104_999, 0).finish();
    let err = disk
        .decode_track(0, TrackType::EmptyLongtrack, &short, &registry)
        .unwrap_err();
    assert!(err.is_unrecognised());
    assert!(!disk.get_track(0).expect("Missing track").is_formatted());

    let long = TrackBuffer::new(105_000, 0).finish();
    let track = disk
        .decode_track(0, TrackType::EmptyLongtrack, &long, &registry)
        .expect("Failed to decode empty long track");
    assert_eq!(track.total_bits, 110_000);
}

#[test]
fn test_rtype_a_checksum_mismatch() {
    let dat = payload(5968);
    let mut tbuf = TrackBuffer::new(100_150, 0);
    tbuf.bits(BitcellEncoding::Raw, 16, 0x9521);
    tbuf.bits(BitcellEncoding::Mfm, 8, 0);
    tbuf.bits(
        BitcellEncoding::MfmOdd,
        32,
        checksum::amigados_checksum(&dat) ^ 0x0100_0000,
    );
    tbuf.bytes(BitcellEncoding::MfmEvenOdd, &dat);

    let registry = Registry::new();
    let mut disk = Disk::new(20);
    let err = disk
        .decode_track(10, TrackType::RTypeA, &tbuf.finish(), &registry)
        .unwrap_err();
    assert!(matches!(err, TrackError::NoMatch { track_type: TrackType::RTypeA }));
}

#[test]
fn test_identify_falls_back() {
    let registry = Registry::new();
    let cells = generate(
        &registry,
        seeded(&registry, TrackType::RTypeB, 105_500, payload(6552)),
    );

    let mut disk = Disk::new(160);
    let found = disk
        .identify_track(
            70,
            &[TrackType::RTypeA, TrackType::RTypeB, TrackType::EmptyLongtrack],
            &cells,
            &registry,
        )
        .expect("Identify failed");
    assert_eq!(found, Some(TrackType::RTypeB));
    let track = disk.get_track(70).expect("Missing track");
    assert_eq!(track.valid_sectors, 1);
    assert_eq!(track.total_bits, 105_500);
}

#[test]
fn test_detect_from_dump_file() {
    let registry = Registry::new();
    let cells = generate(
        &registry,
        seeded(&registry, TrackType::AppLongtrack, 111_000, Vec::new()),
    );

    let path = std::env::temp_dir().join(format!("fluxtrack_it_{}.raw", std::process::id()));
    io::write_bitcells(&cells, &path).expect("Failed to write dump");
    let read = io::read_bitcells(&path).expect("Failed to read dump");
    std::fs::remove_file(&path).ok();

    assert_eq!(read, cells);
    let result = detect(&read).expect("No protection detected");
    assert_eq!(result.track_type, TrackType::AppLongtrack);
    assert_eq!(result.track.total_bits, 111_000);
}

#[test]
fn test_registry_types() {
    let registry = Registry::new();
    let names: Vec<&str> = registry.track_types().iter().map(|t| t.name()).collect();
    assert_eq!(
        names,
        vec![
            "protec_longtrack",
            "gremlin_longtrack",
            "tiertex_longtrack",
            "crystals_of_arborea_longtrack",
            "infogrames_longtrack",
            "bat_longtrack",
            "app_longtrack",
            "sevencities_longtrack",
            "empty_longtrack",
            "rtype_a",
            "rtype_b",
        ]
    );
    for name in names {
        let track_type: TrackType = name.parse().expect("Failed to parse track type");
        assert!(registry.get(track_type).is_some());
    }
}
