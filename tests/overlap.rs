// tests/overlap.rs
//
// Overlap-запросы по bounding box ключам: полный скан (FullScanIndex), подключаемый
// SpatialIndex с кандидатными диапазонами, skip_filters, записи без bbox, обратные операции.
//
// Запуск:
//   cargo test --test overlap -- --nocapture

mod common;

use std::ops::Range;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use common::{build_data, cleanup, ikey, opts, write_image, MODES};
use RtreeTable::key::extract_user_key;
use RtreeTable::{
    assemble_table, InternalIterator, InternalKeyComparator, KeyLayout, LowxComparator, Mbr,
    ReadOptions, SpatialIndex, TableReader, ValueKind,
};

fn bx(x0: f64, x1: f64, y0: f64, y1: f64) -> Mbr {
    Mbr::new(vec![(x0, x1), (y0, y1)]).expect("valid box")
}

fn lowx() -> InternalKeyComparator {
    InternalKeyComparator::new(Arc::new(LowxComparator))
}

/// Сетка 10x10 единичных квадратов + одна запись с не-bbox ключом.
fn write_grid(prefix: &str) -> Result<PathBuf> {
    let cmp = lowx();
    let mut entries = Vec::new();
    for i in 0..10 {
        for j in 0..10 {
            let m = bx(i as f64, i as f64 + 1.0, j as f64, j as f64 + 1.0);
            entries.push((ikey(&m.encode(), 1, ValueKind::Value), format!("{i},{j}").into_bytes()));
        }
    }
    entries.push((ikey(b"plain-key-not-a-bbox", 1, ValueKind::Value), b"plain".to_vec()));
    entries.sort_by(|a, b| cmp.compare(&a.0, &b.0));
    let (data, props) = build_data(&entries, KeyLayout::LengthPrefixed, "rtree.LowxComparator")?;
    write_image(prefix, &assemble_table(&data, &props)?)
}

fn open_lowx(path: &PathBuf, mmap: bool) -> Result<TableReader> {
    Ok(TableReader::open_path(path, opts(mmap), lowx())?)
}

fn overlap_values(t: &TableReader, ro: &ReadOptions, q: Mbr) -> Result<Vec<String>> {
    let mut it = t.new_overlap_iterator(ro, q)?;
    it.seek_to_first();
    let mut out = Vec::new();
    while it.valid() {
        out.push(String::from_utf8(it.value().to_vec())?);
        it.next();
    }
    it.status()?;
    out.sort();
    Ok(out)
}

#[test]
fn full_scan_returns_exactly_intersecting_boxes() -> Result<()> {
    let path = write_grid("ovl-full")?;
    for mmap in MODES {
        let t = open_lowx(&path, mmap)?;
        // [2.5, 3.5] x [7.0, 7.5]: клетки i∈{2,3}, j∈{6,7} (граница j=6 касается y=7)
        let got = overlap_values(&t, &ReadOptions::default(), bx(2.5, 3.5, 7.0, 7.5))?;
        assert_eq!(got, vec!["2,6", "2,7", "3,6", "3,7"]);

        let none = overlap_values(&t, &ReadOptions::default(), bx(20.0, 21.0, 0.0, 1.0))?;
        assert!(none.is_empty());

        let all = overlap_values(&t, &ReadOptions::default(), bx(-1.0, 11.0, -1.0, 11.0))?;
        assert_eq!(all.len(), 100, "non-box record is skipped");
    }
    cleanup(&path);
    Ok(())
}

#[test]
fn overlap_results_match_brute_force() -> Result<()> {
    let path = write_grid("ovl-brute")?;
    let t = open_lowx(&path, true)?;
    let queries = [
        bx(0.0, 0.0, 0.0, 0.0),
        bx(4.2, 4.3, 0.0, 10.0),
        bx(9.5, 30.0, 9.5, 30.0),
        bx(1.0, 8.0, 3.0, 3.0),
    ];
    for q in queries {
        let mut expected = Vec::new();
        let mut it = t.new_iterator(&ReadOptions::default());
        it.seek_to_first();
        while it.valid() {
            if let Some(m) = Mbr::decode(extract_user_key(it.key())) {
                if m.intersects(&q) {
                    expected.push(String::from_utf8(it.value().to_vec())?);
                }
            }
            it.next();
        }
        expected.sort();
        assert_eq!(overlap_values(&t, &ReadOptions::default(), q.clone())?, expected, "{:?}", q);
    }
    cleanup(&path);
    Ok(())
}

/// Индекс с заранее вычисленными диапазонами.
struct FixedRanges(Vec<Range<u64>>);

impl SpatialIndex for FixedRanges {
    fn find_candidate_ranges(&self, _query: &Mbr) -> RtreeTable::Result<Vec<Range<u64>>> {
        Ok(self.0.clone())
    }
}

/// Смещения начала записей и конец data region.
fn record_offsets(t: &TableReader) -> Vec<u64> {
    let mut slot = None;
    let it = t.new_iterator_in(&ReadOptions::default(), &mut slot);
    it.seek_to_first();
    let mut offs = Vec::new();
    while it.valid() {
        offs.push(it.offset());
        it.next();
    }
    offs.push(t.data_end_offset());
    offs
}

#[test]
fn candidate_ranges_restrict_scan_and_skip_filters_bypasses() -> Result<()> {
    let path = write_grid("ovl-index")?;
    for mmap in MODES {
        let mut t = open_lowx(&path, mmap)?;
        let offs = record_offsets(&t);
        // записи отсортированы по min x: первые 10 — столбец i=0, записи 20..30 — столбец i=2
        t.set_spatial_index(Box::new(FixedRanges(vec![offs[0]..offs[10], offs[20]..offs[30]])));

        let q = bx(-1.0, 11.0, 4.5, 4.5);
        let indexed = overlap_values(&t, &ReadOptions::default(), q.clone())?;
        assert_eq!(indexed, vec!["0,4", "2,4"]);

        let full = overlap_values(&t, &ReadOptions::default().with_skip_filters(true), q)?;
        assert_eq!(full.len(), 10);
    }
    cleanup(&path);
    Ok(())
}

#[test]
fn bad_candidate_ranges_are_corruption() -> Result<()> {
    let path = write_grid("ovl-badrange")?;
    let mut t = open_lowx(&path, false)?;
    let end = t.data_end_offset();
    t.set_spatial_index(Box::new(FixedRanges(vec![0..end + 1])));
    let e = t
        .new_overlap_iterator(&ReadOptions::default(), bx(0.0, 1.0, 0.0, 1.0))
        .err()
        .expect("range past data region");
    assert!(e.is_corruption());
    cleanup(&path);
    Ok(())
}

#[test]
fn overlap_seek_and_reverse_ops() -> Result<()> {
    let path = write_grid("ovl-seek")?;
    let t = open_lowx(&path, true)?;
    let q = bx(0.0, 10.0, 5.5, 5.5);
    let mut it = t.new_overlap_iterator(&ReadOptions::default(), q)?;
    // seek к записям с min x ≥ 7
    it.seek(&ikey(&bx(7.0, 7.0, -100.0, -100.0).encode(), u64::MAX >> 8, ValueKind::Value));
    let mut got = Vec::new();
    while it.valid() {
        got.push(String::from_utf8(it.value().to_vec())?);
        it.next();
    }
    assert_eq!(got, vec!["7,5", "8,5", "9,5"]);

    it.prev();
    assert!(!it.valid());
    assert!(it.status().unwrap_err().is_not_supported());
    it.seek_to_first();
    assert!(it.valid());
    it.status()?;
    it.seek_to_last();
    assert!(it.status().unwrap_err().is_not_supported());
    cleanup(&path);
    Ok(())
}

#[test]
fn range_starting_inside_record_surfaces_corruption() -> Result<()> {
    let path = write_grid("ovl-midrecord")?;
    for mmap in MODES {
        let mut t = open_lowx(&path, mmap)?;
        // запись столбца i=0: ключ начинается с min x = 0.0 (восемь нулевых байт)
        let start = {
            let mut slot = None;
            let it = t.new_iterator_in(&ReadOptions::default(), &mut slot);
            it.seek_to_first();
            while it.valid()
                && Mbr::decode(extract_user_key(it.key())).map_or(true, |m| m.bounds()[0].0 != 0.0)
            {
                it.next();
            }
            assert!(it.valid(), "grid has a column at x = 0");
            it.offset()
        };
        let end = t.data_end_offset();

        // со сдвигом на байт длина ключа читается как 0: пустой internal key
        t.set_spatial_index(Box::new(FixedRanges(vec![start + 1..end])));
        let mut ov = t.new_overlap_iterator(&ReadOptions::default(), bx(-1.0, 11.0, -1.0, 11.0))?;
        ov.seek_to_first();
        assert!(!ov.valid(), "mmap={mmap}");
        assert!(ov.status().unwrap_err().is_corruption());
    }
    cleanup(&path);
    Ok(())
}
