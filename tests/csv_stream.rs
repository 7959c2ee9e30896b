//! End-to-end tests for the streaming CSV tokenizer

use pretty_assertions::assert_eq;
use textstream::csv::{CsvEvent, CsvOptions, CsvStream, Dialect, EscapeMode};
use textstream::{Error, Result};

/// Feed the chunks and collect events as readable strings
fn collect(options: CsvOptions, chunks: &[&[u8]]) -> Result<Vec<String>> {
    let mut events = Vec::new();
    let mut stream = CsvStream::new(options, |event| {
        events.push(match event {
            CsvEvent::RecordBegin => "BEGIN".to_string(),
            CsvEvent::Field(bytes) => format!("FIELD({})", String::from_utf8_lossy(bytes)),
            CsvEvent::RecordEnd => "END".to_string(),
        });
        Ok(())
    });
    for chunk in chunks {
        stream.process_chunk(chunk)?;
    }
    stream.finish()?;
    drop(stream);
    Ok(events)
}

/// Collect parsed rows as string fields
fn collect_rows(options: CsvOptions, chunks: &[&[u8]]) -> Result<Vec<Vec<String>>> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut stream = CsvStream::new(options, |event| {
        match event {
            CsvEvent::RecordBegin => rows.push(Vec::new()),
            CsvEvent::Field(bytes) => rows
                .last_mut()
                .expect("field before record begin")
                .push(String::from_utf8_lossy(bytes).into_owned()),
            CsvEvent::RecordEnd => {}
        }
        Ok(())
    });
    for chunk in chunks {
        stream.process_chunk(chunk)?;
    }
    stream.finish()?;
    drop(stream);
    Ok(rows)
}

#[test]
fn doubled_quote_across_chunks() {
    // a doubled-quote escape straddling the chunk boundary
    let events = collect(CsvOptions::default(), &[b"\"he\"", b"\"llo\",world\n"]).unwrap();
    assert_eq!(
        events,
        vec!["BEGIN", "FIELD(he\"llo)", "FIELD(world)", "END"]
    );

    let mut stream = CsvStream::new(CsvOptions::default(), |_| Ok(()));
    stream.process_chunk(b"\"he\"").unwrap();
    stream.process_chunk(b"\"llo\",world\n").unwrap();
    stream.finish().unwrap();
    assert_eq!(stream.row_count(), 1);
}

#[test]
fn crlf_and_trailing_empty_field() {
    let events = collect(CsvOptions::default(), &[b"a,,b\r\n"]).unwrap();
    assert_eq!(
        events,
        vec!["BEGIN", "FIELD(a)", "FIELD()", "FIELD(b)", "END"]
    );

    let mut stream = CsvStream::new(CsvOptions::default(), |_| Ok(()));
    stream.process_chunk(b"a,,b\r\n").unwrap();
    assert_eq!(stream.position().line, 2);
}

#[test]
fn field_exceeding_cap_emits_no_event() {
    let mut options = CsvOptions::default();
    options.max_field_bytes = 4;

    let mut field_events = 0usize;
    let mut stream = CsvStream::new(options, |event| {
        if matches!(event, CsvEvent::Field(_)) {
            field_events += 1;
        }
        Ok(())
    });
    let err = stream.process_chunk(b"abcde,").unwrap_err();
    assert!(matches!(err, Error::LimitExceeded { .. }));
    drop(stream);
    assert_eq!(field_events, 0);
}

#[test]
fn field_at_exact_cap_is_fine() {
    let mut options = CsvOptions::default();
    options.max_field_bytes = 4;
    let rows = collect_rows(options, &[b"abcd,x\n"]).unwrap();
    assert_eq!(rows, vec![vec!["abcd", "x"]]);
}

#[test]
fn round_trip_without_escapes() {
    let input = "one,two,three\nfour,five,six\n";
    let rows = collect_rows(CsvOptions::default(), &[input.as_bytes()]).unwrap();
    let rejoined: String = rows
        .iter()
        .map(|row| row.join(",") + "\n")
        .collect();
    assert_eq!(rejoined, input);
}

#[test]
fn one_byte_chunks_match_single_feed() {
    let corpus: &[&[u8]] = &[
        b"a,b,c\n1,2,3\n",
        b"\"q,uo\",plain\r\n",
        b"\"he\"\"llo\",\"wor\"\"\"\"ld\"\n",
        b"a,,\n,,b\n",
        b"\"multi\r\nline\",x\n",
        b"last,no,newline",
        b"\"a\"\"\"\"b\"\n",
    ];
    for input in corpus {
        let whole = collect(CsvOptions::default(), &[input]).unwrap();
        let bytes: Vec<&[u8]> = input.chunks(1).collect();
        let split = collect(CsvOptions::default(), &bytes).unwrap();
        assert_eq!(whole, split, "input {:?}", String::from_utf8_lossy(input));
    }
}

#[test]
fn quoted_field_spanning_three_chunks() {
    let events = collect(
        CsvOptions::default(),
        &[b"\"start ", b"middle ", b"end\",tail\n"],
    )
    .unwrap();
    assert_eq!(
        events,
        vec!["BEGIN", "FIELD(start middle end)", "FIELD(tail)", "END"]
    );
}

#[test]
fn promotion_preserves_bytes_at_every_split() {
    let input = b"\"he\"\"llo\",world\n";
    let expected = collect(CsvOptions::default(), &[input.as_slice()]).unwrap();
    for split in 1..input.len() {
        let (a, b) = input.split_at(split);
        let events = collect(CsvOptions::default(), &[a, b]).unwrap();
        assert_eq!(events, expected, "split at {}", split);
    }
}

#[test]
fn semicolon_dialect_with_comments() {
    let mut options = CsvOptions::default();
    options.dialect = Dialect::with_delimiter(b';');
    options.dialect.allow_comments = true;
    let rows = collect_rows(options, &[b"# header comment\nx;y\n"]).unwrap();
    assert_eq!(rows, vec![vec!["x", "y"]]);
}

#[test]
fn backslash_escape_mode() {
    let mut options = CsvOptions::default();
    options.dialect.escape_mode = EscapeMode::Backslash;
    let rows = collect_rows(options, &[b"\"line\\none\",\"tab\\there\"\n"]).unwrap();
    assert_eq!(rows, vec![vec!["line\none", "tab\there"]]);
}

#[test]
fn unexpected_quote_reports_position() {
    let err = collect(CsvOptions::default(), &[b"ab\"c\n"]).unwrap_err();
    match err {
        Error::UnexpectedQuote { position } => {
            assert_eq!(position.line, 1);
            assert_eq!(position.column, 3);
        }
        other => panic!("expected UnexpectedQuote, got {:?}", other),
    }
}

#[test]
fn sticky_error_replays_on_every_call() {
    let mut options = CsvOptions::default();
    options.max_cols = 1;
    let mut stream = CsvStream::new(options, |_| Ok(()));
    let first = stream.process_chunk(b"a,b\n").unwrap_err();
    let second = stream.process_chunk(b"c,d\n").unwrap_err();
    let third = stream.finish().unwrap_err();
    assert_eq!(first, second);
    assert_eq!(first, third);
}

#[test]
fn offsets_are_monotonic() {
    let mut last = 0usize;
    let mut ok = true;
    let mut stream = CsvStream::new(CsvOptions::default(), |_| Ok(()));
    for chunk in [b"a,b\n".as_slice(), b"c,d\n".as_slice()] {
        stream.process_chunk(chunk).unwrap();
        let index = stream.position().index;
        ok &= index >= last;
        last = index;
    }
    stream.finish().unwrap();
    assert!(ok);
    assert_eq!(stream.total_bytes(), 8);
}

#[test]
fn max_record_bytes_enforced() {
    let mut options = CsvOptions::default();
    options.max_record_bytes = 6;
    let err = collect(options, &[b"abcdefgh,x\n"]).unwrap_err();
    assert!(matches!(err, Error::LimitExceeded { .. }));
}

#[test]
fn bom_is_transparent() {
    let rows = collect_rows(CsvOptions::default(), &[b"\xEF\xBB\xBFa,b\n"]).unwrap();
    assert_eq!(rows, vec![vec!["a", "b"]]);

    let mut options = CsvOptions::default();
    options.dialect.allow_bom = false;
    let rows = collect_rows(options, &[b"a,b\n"]).unwrap();
    assert_eq!(rows, vec![vec!["a", "b"]]);
}

#[test]
fn empty_input_produces_no_events() {
    let events = collect(CsvOptions::default(), &[b""]).unwrap();
    assert!(events.is_empty());

    let events = collect(CsvOptions::default(), &[]).unwrap();
    assert!(events.is_empty());
}

#[test]
fn quoted_empty_field() {
    let rows = collect_rows(CsvOptions::default(), &[b"\"\",x\n"]).unwrap();
    assert_eq!(rows, vec![vec!["", "x"]]);
}
