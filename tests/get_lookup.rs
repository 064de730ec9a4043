// tests/get_lookup.rs
//
// Точечный Get: сборщик видит только записи ≥ цели и по возрастанию, ранняя остановка,
// GetContext (значение/удаление/merge/снимки), ошибки разбора цели и декодирования.
//
// Запуск:
//   cargo test --test get_lookup -- --nocapture

mod common;

use anyhow::Result;

use common::{build_data, cleanup, ikey, open, put, write_image, write_table, MODES};
use RtreeTable::{
    assemble_table, lookup_key, GetContext, GetState, KeyLayout, ParsedInternalKey, ReadOptions,
    ValueKind,
};

type Seen = Vec<(Vec<u8>, u64, Vec<u8>)>;

fn collect_all<'a>(seen: &'a mut Seen) -> impl FnMut(&ParsedInternalKey<'_>, &[u8]) -> bool + 'a {
    move |k, v| {
        seen.push((k.user_key.to_vec(), k.sequence, v.to_vec()));
        true
    }
}

#[test]
fn get_b_sees_b_then_c_never_a() -> Result<()> {
    let path = write_table(
        "get-abc",
        &[put(b"A", 1, b"valA"), put(b"B", 1, b"valB"), put(b"C", 1, b"valC")],
    )?;
    for mmap in MODES {
        let t = open(&path, mmap)?;
        let mut seen = Seen::new();
        let mut f = collect_all(&mut seen);
        t.get(&ReadOptions::default(), &ikey(b"B", 1, ValueKind::Value), &mut f)?;
        drop(f);
        assert_eq!(
            seen,
            vec![
                (b"B".to_vec(), 1, b"valB".to_vec()),
                (b"C".to_vec(), 1, b"valC".to_vec()),
            ]
        );
    }
    cleanup(&path);
    Ok(())
}

#[test]
fn empty_table_never_calls_collector() -> Result<()> {
    let path = write_table("get-empty", &[])?;
    for mmap in MODES {
        let t = open(&path, mmap)?;
        let mut calls = 0;
        let mut f = |_: &ParsedInternalKey<'_>, _: &[u8]| {
            calls += 1;
            true
        };
        t.get(&ReadOptions::default(), lookup_key(b"k", 1).encoded(), &mut f)?;
        assert_eq!(calls, 0);
    }
    cleanup(&path);
    Ok(())
}

#[test]
fn collector_false_stops_scan() -> Result<()> {
    let entries: Vec<_> = (0..50u8).map(|i| put(&[b'k', i], 1, &[i])).collect();
    let path = write_table("get-stop", &entries)?;
    for mmap in MODES {
        let t = open(&path, mmap)?;
        let mut seen = Vec::new();
        let mut f = |k: &ParsedInternalKey<'_>, _: &[u8]| {
            seen.push(k.user_key.to_vec());
            seen.len() < 3
        };
        t.get(&ReadOptions::default(), lookup_key(&[b'k', 10], 1).encoded(), &mut f)?;
        assert_eq!(seen, vec![vec![b'k', 10], vec![b'k', 11], vec![b'k', 12]]);
    }
    cleanup(&path);
    Ok(())
}

#[test]
fn target_past_last_key_sees_nothing() -> Result<()> {
    let path = write_table("get-past", &[put(b"a", 1, b"1"), put(b"b", 1, b"2")])?;
    for mmap in MODES {
        let t = open(&path, mmap)?;
        let mut seen = Seen::new();
        let mut f = collect_all(&mut seen);
        t.get(&ReadOptions::default(), lookup_key(b"c", 100).encoded(), &mut f)?;
        drop(f);
        assert!(seen.is_empty());
    }
    cleanup(&path);
    Ok(())
}

#[test]
fn get_context_resolves_versions_by_snapshot() -> Result<()> {
    let entries = vec![
        put(b"k", 30, b"new"),
        (ikey(b"k", 20, ValueKind::Deletion), Vec::new()),
        put(b"k", 10, b"old"),
        put(b"m", 5, b"other"),
    ];
    let path = write_table("get-ctx", &entries)?;
    for mmap in MODES {
        let t = open(&path, mmap)?;
        let ucmp = t.comparator().user_comparator();
        let ro = ReadOptions::default();

        let mut ctx = GetContext::new(ucmp, b"k");
        t.get(&ro, lookup_key(b"k", 100).encoded(), &mut ctx)?;
        assert_eq!(ctx.state(), &GetState::Found);
        assert_eq!(ctx.value(), Some(&b"new"[..]));
        assert_eq!(ctx.records_seen(), 1);

        let mut ctx = GetContext::new(ucmp, b"k");
        t.get(&ro, lookup_key(b"k", 25).encoded(), &mut ctx)?;
        assert_eq!(ctx.state(), &GetState::Deleted);

        let mut ctx = GetContext::new(ucmp, b"k");
        t.get(&ro, lookup_key(b"k", 15).encoded(), &mut ctx)?;
        assert_eq!(ctx.into_value(), Some(b"old".to_vec()));

        // версий ≤ 5 у k нет: первая запись уже чужой ключ
        let mut ctx = GetContext::new(ucmp, b"k");
        t.get(&ro, lookup_key(b"k", 5).encoded(), &mut ctx)?;
        assert_eq!(ctx.state(), &GetState::NotFound);
        assert_eq!(ctx.records_seen(), 1);

        let mut ctx = GetContext::new(ucmp, b"l");
        t.get(&ro, lookup_key(b"l", 100).encoded(), &mut ctx)?;
        assert_eq!(ctx.state(), &GetState::NotFound);
    }
    cleanup(&path);
    Ok(())
}

#[test]
fn get_context_collects_merge_operands() -> Result<()> {
    let entries = vec![
        (ikey(b"ctr", 9, ValueKind::Merge), b"+3".to_vec()),
        (ikey(b"ctr", 8, ValueKind::Merge), b"+2".to_vec()),
        put(b"ctr", 7, b"40"),
        (ikey(b"solo", 4, ValueKind::Merge), b"x".to_vec()),
    ];
    let path = write_table("get-merge", &entries)?;
    for mmap in MODES {
        let t = open(&path, mmap)?;
        let ucmp = t.comparator().user_comparator();
        let ro = ReadOptions::default();

        let mut ctx = GetContext::new(ucmp, b"ctr");
        t.get(&ro, lookup_key(b"ctr", 100).encoded(), &mut ctx)?;
        assert_eq!(ctx.state(), &GetState::Found);
        assert_eq!(ctx.value(), Some(&b"40"[..]));
        assert_eq!(ctx.merge_operands(), &[b"+3".to_vec(), b"+2".to_vec()]);

        // операнды до конца data region, базы нет
        let mut ctx = GetContext::new(ucmp, b"solo");
        t.get(&ro, lookup_key(b"solo", 100).encoded(), &mut ctx)?;
        assert_eq!(ctx.state(), &GetState::Merge);
        assert_eq!(ctx.merge_operands().len(), 1);
    }
    cleanup(&path);
    Ok(())
}

#[test]
fn malformed_target_is_corruption() -> Result<()> {
    let path = write_table("get-badtarget", &[put(b"a", 1, b"1")])?;
    for mmap in MODES {
        let t = open(&path, mmap)?;
        let mut f = |_: &ParsedInternalKey<'_>, _: &[u8]| true;
        let e = t.get(&ReadOptions::default(), b"short", &mut f).unwrap_err();
        assert!(e.is_corruption(), "{e}");
    }
    cleanup(&path);
    Ok(())
}

#[test]
fn decode_error_propagates_after_visited_prefix() -> Result<()> {
    let entries = vec![put(b"a", 1, b"1"), put(b"b", 1, b"2"), put(b"c", 1, b"333333")];
    let (data, mut props) = build_data(&entries, KeyLayout::LengthPrefixed, "")?;
    props.data_size = data.len() as u64 - 3;
    let path = write_image("get-corrupt", &assemble_table(&data, &props)?)?;
    for mmap in MODES {
        let t = open(&path, mmap)?;
        let mut seen = Seen::new();
        let mut f = collect_all(&mut seen);
        let e = t
            .get(&ReadOptions::default(), lookup_key(b"a", 1).encoded(), &mut f)
            .unwrap_err();
        drop(f);
        assert!(e.is_corruption());
        assert_eq!(seen.len(), 2);

        // остановка до повреждённой записи — Ok
        let mut ctx = GetContext::new(t.comparator().user_comparator(), b"a");
        t.get(&ReadOptions::default(), lookup_key(b"a", 1).encoded(), &mut ctx)?;
        assert_eq!(ctx.state(), &GetState::Found);
    }
    cleanup(&path);
    Ok(())
}
