use narc::{BuilderSource, Error, NarcBuilder};
use narc_core::{ArchiveMode, Entry, FatEntry, FntEntry, NarcSrc, FNT_FLAT_SIZE, HEADER_SIZE};

fn file(name: &str, data: &[u8]) -> Entry<BuilderSource> {
    Entry::file(name, data.len() as u64, BuilderSource::Buffer(data.to_vec()))
}

fn eprint_chunk(label: &str, chunk: &[u8]) {
    eprintln!("{:>8}: {:02x?}", label, chunk);
}

// Dump each chunk to stderr so a failing comparison is readable
fn format_print_archive(archive: &[u8]) {
    let u32_at = |offset: usize| {
        let mut bytes = [0; 4];
        bytes.copy_from_slice(&archive[offset..offset + 4]);
        u32::from_le_bytes(bytes) as usize
    };
    let fat = HEADER_SIZE;
    let fnt = fat + u32_at(fat + 4);
    let fimg = fnt + u32_at(fnt + 4);

    eprint_chunk("Header", &archive[..fat]);
    eprint_chunk("FAT", &archive[fat..fnt]);
    eprint_chunk("FNT", &archive[fnt..fimg]);
    eprint_chunk("FIMG", &archive[fimg..]);
}

fn build(root: Entry<BuilderSource>) -> Result<Vec<u8>, Error> {
    let mut archive = Vec::new();
    let size = NarcBuilder::new(root).write_archive(&mut archive)?;
    assert_eq!(size, archive.len() as u64);
    format_print_archive(&archive);
    Ok(archive)
}

#[test]
fn writes_known_archive() -> Result<(), Error> {
    let archive = build(Entry::directory(
        "",
        vec![
            Entry::directory("sub", vec![file("b.txt", b"yyyyy")]),
            file("a.txt", b"xxx"),
        ],
    ))?;

    let mut expected = Vec::new();
    // Header
    expected.extend_from_slice(b"NARC");
    expected.extend_from_slice(&[0xFE, 0xFF, 0x00, 0x01]);
    expected.extend_from_slice(&108u32.to_le_bytes());
    expected.extend_from_slice(&[0x10, 0x00, 0x03, 0x00]);
    // FAT
    expected.extend_from_slice(b"BTAF");
    expected.extend_from_slice(&28u32.to_le_bytes());
    expected.extend_from_slice(&[0x02, 0x00, 0x00, 0x00]);
    for value in [0u32, 3, 4, 9] {
        expected.extend_from_slice(&value.to_le_bytes());
    }
    // FNT
    expected.extend_from_slice(b"BTNF");
    expected.extend_from_slice(&44u32.to_le_bytes());
    expected.extend_from_slice(&[0x10, 0, 0, 0, 0x00, 0x00, 0x02, 0x00]);
    expected.extend_from_slice(&[0x1D, 0, 0, 0, 0x01, 0x00, 0x00, 0xF0]);
    expected.extend_from_slice(b"\x05a.txt\x83sub\x01\xF0\x00");
    expected.extend_from_slice(b"\x05b.txt\x00");
    // FIMG
    expected.extend_from_slice(b"GMIF");
    expected.extend_from_slice(&20u32.to_le_bytes());
    expected.extend_from_slice(b"xxx\xFFyyyyy\xFF\xFF\xFF");

    assert_eq!(archive, expected);
    Ok(())
}

#[test]
fn content_is_aligned_and_padded() -> Result<(), Error> {
    let root = Entry::directory(
        "",
        (1..=7u8)
            .map(|size| file(&format!("f{}", size), &vec![size; usize::from(size)]))
            .collect(),
    );
    let mut archive = build(root)?;
    let layout = archive.read_layout()?;
    let content = layout.content_offset() as usize;

    let mut previous_end = 0;
    for (range, size) in layout.ranges.iter().zip(1..=7u8) {
        assert_eq!(range.start() % 4, 0);
        assert_eq!(range.len(), u32::from(size));

        let start = content + range.start() as usize;
        let end = content + range.end() as usize;
        let padding = &archive[content + previous_end..start];
        assert!(padding.len() < 4);
        assert!(padding.iter().all(|b| *b == 0xFF), "{:02x?}", padding);
        assert!(archive[start..end].iter().all(|b| *b == size));
        previous_end = range.end() as usize;
    }
    assert!(archive[content + previous_end..].iter().all(|b| *b == 0xFF));
    assert_eq!(archive.len() % 4, 0);
    Ok(())
}

#[test]
fn flat_archive_has_no_names() -> Result<(), Error> {
    let root = Entry::directory(
        "",
        (0..4u8)
            .map(|i| file(&format!("archive_0000000{}.bin", i), &[i; 2]))
            .collect(),
    );
    assert_eq!(NarcBuilder::new(root.clone()).mode(), ArchiveMode::Flat);

    let mut archive = build(root)?;
    let layout = archive.read_layout()?;
    assert_eq!(layout.mode, ArchiveMode::Flat);
    assert_eq!(layout.fnt.chunk_size(), FNT_FLAT_SIZE);
    assert_eq!(layout.name_index, vec![FntEntry::new(4, 0, 1)]);
    assert_eq!(
        layout.ranges,
        vec![
            FatEntry::new(0, 2),
            FatEntry::new(4, 6),
            FatEntry::new(8, 10),
            FatEntry::new(12, 14),
        ]
    );
    assert_eq!(archive.read_file(&layout, 3)?, vec![3, 3]);
    Ok(())
}

#[test]
fn empty_tree_is_a_valid_archive() -> Result<(), Error> {
    let mut archive = build(Entry::directory("", vec![]))?;
    let layout = archive.read_layout()?;
    assert_eq!(layout.mode, ArchiveMode::Tree);
    assert!(layout.ranges.is_empty());
    assert_eq!(layout.name_index, vec![FntEntry::new(8, 0, 1)]);
    Ok(())
}

#[test]
fn overlong_names_are_refused() {
    let name = "n".repeat(128);
    let err = build(Entry::directory("", vec![file(&name, b"x")])).unwrap_err();
    assert!(matches!(
        err,
        Error::Core(narc_core::Error::InvalidNameLength(128))
    ));
}
