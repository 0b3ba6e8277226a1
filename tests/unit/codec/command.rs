use super::*;
use proptest::prelude::*;

#[test]
fn decodes_plain_text() {
    assert_eq!(decode("AB").unwrap(), vec![0x1306, 0x0A8F]);
    assert_eq!(decode("").unwrap(), Vec::<u16>::new());
}

#[test]
fn decodes_modifiers_and_literals() {
    assert_eq!(decode("A:").unwrap(), vec![0x1306 | COLON_BIT]);
    assert_eq!(decode("A!").unwrap(), vec![0x1306 | UNDERLINE_BIT]);
    assert_eq!(decode("{0x1}{0b11}").unwrap(), vec![0x0001, 0x0003]);
    assert_eq!(decode("{0xFFFF}").unwrap(), vec![0xFFFF]);
}

#[test]
fn underline_run_marks_every_code() {
    assert_eq!(
        decode("{!AB}C").unwrap(),
        vec![0x1306 | UNDERLINE_BIT, 0x0A8F | UNDERLINE_BIT, 0x0039]
    );
    // A colon inside the run still modifies the previous code.
    assert_eq!(
        decode("{!1:2}").unwrap(),
        vec![0x0106 | UNDERLINE_BIT | COLON_BIT, 0x221B | UNDERLINE_BIT]
    );
}

#[test]
fn leading_bang_is_a_glyph() {
    assert_eq!(decode("!").unwrap(), vec![0x4880]);
    assert_eq!(decode("!!").unwrap(), vec![0x4880 | UNDERLINE_BIT]);
}

#[test]
fn leading_colon_is_an_unknown_glyph() {
    let err = decode(":A").unwrap_err();
    assert_eq!(err.position, 0);
    assert_eq!(err.message, "unknown glyph");
}

#[test]
fn errors_carry_position_and_token() {
    let err = decode("AB~").unwrap_err();
    assert_eq!((err.position, err.token.as_str()), (2, "~"));

    let err = decode("A{0x1").unwrap_err();
    assert_eq!(err.position, 1);
    assert_eq!(err.message, "unterminated token");

    let err = decode("A{!BC").unwrap_err();
    assert_eq!(err.message, "unterminated token");

    let err = decode("A{zz}").unwrap_err();
    assert_eq!((err.position, err.token.as_str()), (1, "{zz}"));
    assert_eq!(err.message, "invalid token");

    assert_eq!(decode("{}").unwrap_err().message, "invalid token");
    assert_eq!(
        decode("{0x10000}").unwrap_err().message,
        "literal does not fit in 16 bits"
    );
    assert_eq!(decode("{0x}").unwrap_err().message, "invalid literal");
}

#[test]
fn modifier_without_code_fails() {
    let err = decode("{!}:").unwrap_err();
    assert_eq!(err.position, 3);
}

#[test]
fn cmd_len_counts_positions() {
    assert_eq!(cmd_len("12:30"), 4);
    assert_eq!(cmd_len("{!AB}C!"), 3);
    assert_eq!(cmd_len("{0x1}{0x2}"), 2);
    assert_eq!(cmd_len(""), 0);
}

#[test]
fn truncate_keeps_modifiers_and_closes_runs() {
    assert_eq!(truncate("12:30", 2), "12:");
    assert_eq!(truncate("{!ABC}", 2), "{!AB}");
    assert_eq!(truncate("{!AB}:C", 2), "{!AB}:");
    assert_eq!(truncate("{0x1}{0x2}", 1), "{0x1}");
    assert_eq!(truncate("ABC", 0), "");
    assert_eq!(truncate("ABC", 5), "ABC");
}

#[test]
fn format_raw_is_lowercase_hex() {
    assert_eq!(format_raw(0x113F), "{0x113f}");
    assert_eq!(format_raw(0), "{0x0}");
}

proptest! {
    #[test]
    fn plain_text_decodes_one_code_per_char(text in "[A-Za-z0-9 $%*+,./<>|_-]{0,24}") {
        let codes = decode(&text).unwrap();
        prop_assert_eq!(codes.len(), text.chars().count());
        prop_assert_eq!(cmd_len(&text), codes.len());
    }

    #[test]
    fn raw_codes_survive_formatting(codes in prop::collection::vec(any::<u16>(), 0..16)) {
        let cmd: String = codes.iter().map(|&c| format_raw(c)).collect();
        prop_assert_eq!(decode(&cmd).unwrap(), codes);
    }

    #[test]
    fn truncated_command_decodes_to_prefix(text in "[A-Z0-9]{0,12}", n in 0usize..16) {
        let codes = decode(&text).unwrap();
        let cut = decode(&truncate(&text, n)).unwrap();
        prop_assert_eq!(&cut[..], &codes[..n.min(codes.len())]);
    }
}
